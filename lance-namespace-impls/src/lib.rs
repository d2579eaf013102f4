// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Lance Namespace implementations.
//!
//! This crate provides implementations of the Lance Namespace trait that
//! catalog Lance tables in external metadata services.
//!
//! ## Features
//!
//! - `gravitino`: Gravitino REST namespace implementation
//! - `iceberg`: Iceberg REST catalog namespace implementation
//! - `hive`: Hive metastore namespace implementation (transport injected
//!   through [`hive::MetastoreClient`])
//!
//! ## Usage
//!
//! The recommended way to connect to a namespace is using
//! [`ConnectBuilder`]:
//!
//! ```no_run
//! # use lance_namespace_impls::ConnectBuilder;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let namespace = ConnectBuilder::new("gravitino")
//!     .property("endpoint", "http://localhost:9101")
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod connect;
pub mod filter;
pub mod ident;

#[cfg(feature = "rest")]
pub mod rest_client;

#[cfg(feature = "gravitino")]
pub mod gravitino;

#[cfg(feature = "iceberg")]
pub mod iceberg;

#[cfg(feature = "hive")]
pub mod hive;

// Re-export connect function and builder
pub use connect::{connect, ConnectBuilder};
pub use ident::{IdentifierDefaults, ObjectIdentifier};

#[cfg(feature = "gravitino")]
pub use gravitino::{GravitinoNamespace, GravitinoNamespaceBuilder};

#[cfg(feature = "iceberg")]
pub use iceberg::{IcebergNamespace, IcebergNamespaceBuilder};

#[cfg(feature = "hive")]
pub use hive::{HiveNamespace, HiveNamespaceBuilder, MetastoreClient};
