// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Lance Namespace base interface.
//!
//! A Lance namespace is a metadata catalog that organizes Lance tables
//! into a hierarchy of namespaces. This crate defines the interface shared
//! by all backend implementations: the [`LanceNamespace`] trait, the
//! request/response models, and the [`NamespaceError`] taxonomy every
//! backend translates its native failures into.

pub mod error;
pub mod models;
pub mod namespace;

pub use error::{ErrorCode, NamespaceError, Result};
pub use namespace::LanceNamespace;
