// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Request and response models for Lance Namespace operations.
//!
//! An object identifier is an ordered list of non-empty name segments,
//! outermost first. How many segments an operation accepts is backend
//! policy; adapters validate depth before issuing any wire call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Idempotency mode for create operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateMode {
    /// Fail if the object already exists.
    Create,
    /// Succeed without change if the object already exists.
    ExistOk,
    /// Replace the object if it already exists.
    Overwrite,
}

impl CreateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::ExistOk => "exist_ok",
            Self::Overwrite => "overwrite",
        }
    }
}

/// Drop behavior for namespace drop operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DropBehavior {
    /// Also remove child objects, where the backend natively supports it.
    Cascade,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListNamespacesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListNamespacesResponse {
    pub namespaces: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNamespaceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<CreateMode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNamespaceResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeNamespaceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeNamespaceResponse {
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropNamespaceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior: Option<DropBehavior>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropNamespaceResponse {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceExistsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTablesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTablesResponse {
    pub tables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Declare (register) an existing table location in the catalog.
///
/// No data is written; the backend records `location` and marks the entry
/// as Lance-managed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclareTableRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclareTableResponse {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeTableRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
    /// Request full table metadata. Backends that cannot provide it must
    /// reject the request with `InvalidInput` rather than ignore the flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_detailed_metadata: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeTableResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub storage_options: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, String>>,
}

/// Remove a table's catalog entry without deleting the underlying data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeregisterTableRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeregisterTableResponse {
    /// The location the catalog entry pointed at before removal, when the
    /// entry existed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableExistsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CreateMode::ExistOk).unwrap(),
            "\"exist_ok\""
        );
        assert_eq!(CreateMode::Overwrite.as_str(), "overwrite");
    }

    #[test]
    fn test_drop_behavior_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&DropBehavior::Cascade).unwrap(),
            "\"CASCADE\""
        );
    }

    #[test]
    fn test_describe_table_response_defaults() {
        let resp: DescribeTableResponse =
            serde_json::from_str(r#"{"location": "/data/t1"}"#).unwrap();
        assert_eq!(resp.location.as_deref(), Some("/data/t1"));
        assert!(resp.storage_options.is_empty());
    }
}
