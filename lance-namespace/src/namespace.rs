// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Lance Namespace base trait.

use async_trait::async_trait;

use crate::error::{Result, UnsupportedSnafu};
use crate::models::{
    CreateNamespaceRequest, CreateNamespaceResponse, DeclareTableRequest, DeclareTableResponse,
    DeregisterTableRequest, DeregisterTableResponse, DescribeNamespaceRequest,
    DescribeNamespaceResponse, DescribeTableRequest, DescribeTableResponse, DropNamespaceRequest,
    DropNamespaceResponse, ListNamespacesRequest, ListNamespacesResponse, ListTablesRequest,
    ListTablesResponse, NamespaceExistsRequest, TableExistsRequest,
};

/// Base trait for Lance Namespace implementations.
///
/// Each method corresponds to a single synchronous request/response
/// operation against one backend catalog; there is no multi-step protocol
/// and no shared mutable state beyond the adapter's immutable configuration
/// and pooled transport resources. Implementations may be called
/// concurrently from multiple tasks.
///
/// # Error Handling
///
/// All operations return [`crate::NamespaceError`]. Operations a backend
/// does not support return [`crate::ErrorCode::Unsupported`]; the default
/// method bodies do exactly that, so an adapter only implements the subset
/// its backend can serve.
#[async_trait]
pub trait LanceNamespace: Send + Sync + std::fmt::Debug {
    /// List child namespaces of the given (possibly root) namespace.
    async fn list_namespaces(
        &self,
        _request: ListNamespacesRequest,
    ) -> Result<ListNamespacesResponse> {
        UnsupportedSnafu {
            message: "list_namespaces not implemented",
        }
        .fail()
    }

    /// Create a new namespace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorCode::NamespaceAlreadyExists`] if a namespace
    /// with the same name already exists and the mode is strict create.
    async fn create_namespace(
        &self,
        _request: CreateNamespaceRequest,
    ) -> Result<CreateNamespaceResponse> {
        UnsupportedSnafu {
            message: "create_namespace not implemented",
        }
        .fail()
    }

    /// Describe a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorCode::NamespaceNotFound`] if the namespace
    /// does not exist.
    async fn describe_namespace(
        &self,
        _request: DescribeNamespaceRequest,
    ) -> Result<DescribeNamespaceResponse> {
        UnsupportedSnafu {
            message: "describe_namespace not implemented",
        }
        .fail()
    }

    /// Drop a namespace.
    ///
    /// Dropping an absent namespace succeeds (idempotent).
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorCode::NamespaceNotEmpty`] if the namespace
    /// still contains tables or child namespaces.
    async fn drop_namespace(
        &self,
        _request: DropNamespaceRequest,
    ) -> Result<DropNamespaceResponse> {
        UnsupportedSnafu {
            message: "drop_namespace not implemented",
        }
        .fail()
    }

    /// Check if a namespace exists.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorCode::NamespaceNotFound`] if the namespace
    /// does not exist.
    async fn namespace_exists(&self, _request: NamespaceExistsRequest) -> Result<()> {
        UnsupportedSnafu {
            message: "namespace_exists not implemented",
        }
        .fail()
    }

    /// List Lance-managed tables in a namespace.
    ///
    /// Backends whose native table concept is broader than Lance must
    /// filter out foreign-format entries before returning.
    async fn list_tables(&self, _request: ListTablesRequest) -> Result<ListTablesResponse> {
        UnsupportedSnafu {
            message: "list_tables not implemented",
        }
        .fail()
    }

    /// Declare (register) an existing table location in the catalog.
    ///
    /// Metadata-only: no data is written.
    async fn declare_table(&self, _request: DeclareTableRequest) -> Result<DeclareTableResponse> {
        UnsupportedSnafu {
            message: "declare_table not implemented",
        }
        .fail()
    }

    /// Describe a Lance-managed table.
    async fn describe_table(
        &self,
        _request: DescribeTableRequest,
    ) -> Result<DescribeTableResponse> {
        UnsupportedSnafu {
            message: "describe_table not implemented",
        }
        .fail()
    }

    /// Check if a Lance-managed table exists.
    async fn table_exists(&self, _request: TableExistsRequest) -> Result<()> {
        UnsupportedSnafu {
            message: "table_exists not implemented",
        }
        .fail()
    }

    /// Remove a table's catalog entry without deleting the underlying data.
    ///
    /// Deregistering an absent table succeeds (idempotent); when the entry
    /// existed, the response carries its prior location.
    async fn deregister_table(
        &self,
        _request: DeregisterTableRequest,
    ) -> Result<DeregisterTableResponse> {
        UnsupportedSnafu {
            message: "deregister_table not implemented",
        }
        .fail()
    }

    /// Release pooled transport resources held by this namespace.
    ///
    /// Callers invoke this exactly once per instance; operations issued
    /// after close are undefined.
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Return a human-readable unique identifier for this namespace
    /// instance.
    ///
    /// Two instances with the same ID are considered equal and may share
    /// cached resources, so the ID should include all configuration that
    /// uniquely identifies the backend connection. For example:
    /// `"GravitinoNamespace { endpoint: \"http://localhost:9101\" }"`.
    fn namespace_id(&self) -> String;
}
