// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Iceberg REST catalog namespace implementation.
//!
//! Catalogs Lance tables as Iceberg table entries whose properties carry
//! the `table_type=lance` marker. Namespaces nest arbitrarily; table
//! identifiers are a namespace plus a final table-name segment (at least
//! two levels). Listing returns only the Lance-managed subset, which
//! costs one metadata fetch per candidate (see [`crate::filter`]).
//!
//! Registered entries carry a single-column placeholder Iceberg schema
//! since the catalog requires one, but the Lance dataset at `location`
//! remains the source of truth for the real schema.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use lance_namespace::error::{
    InternalSnafu, InvalidInputSnafu, NamespaceAlreadyExistsSnafu, NamespaceNotFoundSnafu,
    Result, TableAlreadyExistsSnafu, TableNotFoundSnafu,
};
use lance_namespace::models::{
    CreateMode, CreateNamespaceRequest, CreateNamespaceResponse, DeclareTableRequest,
    DeclareTableResponse,
    DeregisterTableRequest, DeregisterTableResponse, DescribeNamespaceRequest,
    DescribeNamespaceResponse, DescribeTableRequest, DescribeTableResponse, DropNamespaceRequest,
    DropNamespaceResponse, ListNamespacesRequest, ListNamespacesResponse, ListTablesRequest,
    ListTablesResponse, NamespaceExistsRequest, TableExistsRequest,
};
use lance_namespace::LanceNamespace;
use serde::Deserialize;

use crate::codec::{encode_segment, encode_unit_sep_path};
use crate::filter::is_lance_table;
use crate::ident::ObjectIdentifier;
use crate::rest_client::{RestClient, RestClientError};

/// Builder for creating an [`IcebergNamespace`].
///
/// # Examples
///
/// ```no_run
/// # use lance_namespace_impls::IcebergNamespaceBuilder;
/// let namespace = IcebergNamespaceBuilder::new("http://localhost:8181/v1")
///     .warehouse("s3://bucket/warehouse")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct IcebergNamespaceBuilder {
    endpoint: String,
    prefix: Option<String>,
    warehouse: Option<String>,
    auth_token: Option<String>,
    credential: Option<String>,
    connect_timeout_millis: u64,
    read_timeout_millis: u64,
    max_retries: u32,
    root: String,
}

impl IcebergNamespaceBuilder {
    /// Required property: Iceberg REST catalog endpoint.
    pub const ENDPOINT: &'static str = "iceberg.endpoint";
    /// Optional property: URL prefix appended to the endpoint.
    pub const PREFIX: &'static str = "iceberg.prefix";
    /// Optional property: warehouse location; enables credential vending.
    pub const WAREHOUSE: &'static str = "iceberg.warehouse";
    /// Optional property: bearer token attached to every request.
    pub const AUTH_TOKEN: &'static str = "iceberg.auth_token";
    /// Optional property: credential used as the bearer token when no
    /// `auth_token` is configured.
    pub const CREDENTIAL: &'static str = "iceberg.credential";
    /// Optional property: connect timeout in milliseconds.
    pub const CONNECT_TIMEOUT: &'static str = "iceberg.connect_timeout_millis";
    /// Optional property: read timeout in milliseconds.
    pub const READ_TIMEOUT: &'static str = "iceberg.read_timeout_millis";
    /// Optional property: maximum transport retry attempts.
    pub const MAX_RETRIES: &'static str = "iceberg.max_retries";
    /// Optional property: root path under which default table locations
    /// are derived.
    pub const ROOT: &'static str = "iceberg.root";

    const DEFAULT_CONNECT_TIMEOUT_MILLIS: u64 = 10_000;
    const DEFAULT_READ_TIMEOUT_MILLIS: u64 = 30_000;
    const DEFAULT_MAX_RETRIES: u32 = 3;
    const DEFAULT_ROOT: &'static str = "/tmp/lance";

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            prefix: None,
            warehouse: None,
            auth_token: None,
            credential: None,
            connect_timeout_millis: Self::DEFAULT_CONNECT_TIMEOUT_MILLIS,
            read_timeout_millis: Self::DEFAULT_READ_TIMEOUT_MILLIS,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            root: Self::DEFAULT_ROOT.to_string(),
        }
    }

    /// Parse builder configuration from a properties map.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `iceberg.endpoint` is missing or a
    /// numeric property does not parse.
    pub fn from_properties(properties: HashMap<String, String>) -> Result<Self> {
        let endpoint = properties.get(Self::ENDPOINT).cloned().ok_or_else(|| {
            InvalidInputSnafu {
                message: format!(
                    "Missing required property '{}' for Iceberg namespace",
                    Self::ENDPOINT
                ),
            }
            .build()
        })?;

        let mut builder = Self::new(endpoint);
        builder.prefix = properties.get(Self::PREFIX).cloned();
        builder.warehouse = properties.get(Self::WAREHOUSE).cloned();
        builder.auth_token = properties.get(Self::AUTH_TOKEN).cloned();
        builder.credential = properties.get(Self::CREDENTIAL).cloned();
        builder.connect_timeout_millis = parse_u64(
            &properties,
            Self::CONNECT_TIMEOUT,
            Self::DEFAULT_CONNECT_TIMEOUT_MILLIS,
        )?;
        builder.read_timeout_millis = parse_u64(
            &properties,
            Self::READ_TIMEOUT,
            Self::DEFAULT_READ_TIMEOUT_MILLIS,
        )?;
        builder.max_retries =
            parse_u32(&properties, Self::MAX_RETRIES, Self::DEFAULT_MAX_RETRIES)?;
        if let Some(root) = properties.get(Self::ROOT) {
            builder.root = root.clone();
        }
        Ok(builder)
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn connect_timeout_millis(mut self, millis: u64) -> Self {
        self.connect_timeout_millis = millis;
        self
    }

    pub fn read_timeout_millis(mut self, millis: u64) -> Self {
        self.read_timeout_millis = millis;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Build the [`IcebergNamespace`].
    pub fn build(self) -> IcebergNamespace {
        let mut base_url = self.endpoint.trim_end_matches('/').to_string();
        if let Some(prefix) = &self.prefix {
            base_url = format!("{}/{}", base_url, prefix.trim_matches('/'));
        }

        let mut client = RestClient::builder(base_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .connect_timeout_millis(self.connect_timeout_millis)
            .read_timeout_millis(self.read_timeout_millis)
            .max_retries(self.max_retries);
        if let Some(token) = self.auth_token.as_ref().or(self.credential.as_ref()) {
            client = client.bearer_token(token);
        }
        if self.warehouse.is_some() {
            client = client.header("X-Iceberg-Access-Delegation", "vended-credentials");
        }

        log::info!(
            "Initialized Iceberg namespace with endpoint: {}",
            self.endpoint
        );

        IcebergNamespace {
            endpoint: self.endpoint,
            root: self.root,
            client: client.build(),
        }
    }
}

fn parse_u64(properties: &HashMap<String, String>, key: &str, default: u64) -> Result<u64> {
    match properties.get(key) {
        None => Ok(default),
        Some(value) => value.parse::<u64>().map_err(|_| {
            InvalidInputSnafu {
                message: format!(
                    "Property '{}' must be a non-negative integer, got {:?}",
                    key, value
                ),
            }
            .build()
        }),
    }
}

fn parse_u32(properties: &HashMap<String, String>, key: &str, default: u32) -> Result<u32> {
    match properties.get(key) {
        None => Ok(default),
        Some(value) => value.parse::<u32>().map_err(|_| {
            InvalidInputSnafu {
                message: format!(
                    "Property '{}' must be a non-negative integer, got {:?}",
                    key, value
                ),
            }
            .build()
        }),
    }
}

/// Placeholder single-column schema sent on table registration. The
/// catalog requires an Iceberg schema; the Lance dataset holds the real
/// one.
fn placeholder_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "struct",
        "schema-id": 0,
        "fields": [
            {"id": 1, "name": "dummy", "required": false, "type": "string"}
        ]
    })
}

/// Explicit wire schemas for the Iceberg REST catalog API.
mod wire {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    pub struct NamespaceList {
        #[serde(default)]
        pub namespaces: Vec<Vec<String>>,
        #[serde(default, rename = "next-page-token")]
        pub next_page_token: Option<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct NamespaceProperties {
        #[serde(default)]
        pub properties: HashMap<String, String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct TableIdentifier {
        #[serde(default)]
        pub namespace: Vec<String>,
        pub name: String,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct TableIdentifierList {
        #[serde(default)]
        pub identifiers: Vec<TableIdentifier>,
        #[serde(default, rename = "next-page-token")]
        pub next_page_token: Option<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct TableMetadata {
        #[serde(default)]
        pub location: Option<String>,
        #[serde(default)]
        pub properties: HashMap<String, String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct LoadTableResult {
        #[serde(default)]
        pub metadata: Option<TableMetadata>,
    }
}

/// Iceberg REST catalog namespace implementation.
///
/// Namespace ID format: one or more levels. Table ID format: namespace
/// levels plus the table name (at least two levels total).
pub struct IcebergNamespace {
    endpoint: String,
    root: String,
    client: RestClient,
}

impl std::fmt::Debug for IcebergNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.namespace_id())
    }
}

impl IcebergNamespace {
    fn internal(context: &str, e: RestClientError) -> lance_namespace::NamespaceError {
        InternalSnafu {
            message: format!("{}: {}", context, e),
        }
        .build()
    }

    fn table_path(namespace: &[String], table: &str) -> String {
        format!(
            "/namespaces/{}/tables/{}",
            encode_unit_sep_path(namespace),
            encode_segment(table)
        )
    }

    /// Fetch a table's catalog metadata, or `None` when absent.
    async fn load_table_metadata(
        &self,
        namespace: &[String],
        table: &str,
    ) -> Result<Option<wire::TableMetadata>> {
        let path = Self::table_path(namespace, table);
        match self.client.get::<wire::LoadTableResult>(&path, &[]).await {
            Ok(result) => Ok(result.metadata),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(Self::internal("Failed to load table metadata", e)),
        }
    }
}

#[async_trait]
impl LanceNamespace for IcebergNamespace {
    async fn list_namespaces(
        &self,
        request: ListNamespacesRequest,
    ) -> Result<ListNamespacesResponse> {
        let id = ObjectIdentifier::validate(&request.id, 0, usize::MAX, "namespace")?;

        let parent = encode_unit_sep_path(id.levels());
        let mut query: Vec<(&str, &str)> = Vec::new();
        if !id.is_root() {
            query.push(("parent", parent.as_str()));
        }
        if let Some(token) = &request.page_token {
            query.push(("pageToken", token.as_str()));
        }

        let response: wire::NamespaceList = self
            .client
            .get("/namespaces", &query)
            .await
            .map_err(|e| Self::internal("Failed to list namespaces", e))?;

        // The wire carries full multi-level identifiers; report only the
        // child name at this level.
        let namespaces: BTreeSet<String> = response
            .namespaces
            .into_iter()
            .filter_map(|levels| levels.last().cloned())
            .collect();

        Ok(ListNamespacesResponse {
            namespaces: namespaces.into_iter().collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn create_namespace(
        &self,
        request: CreateNamespaceRequest,
    ) -> Result<CreateNamespaceResponse> {
        let id = ObjectIdentifier::validate(&request.id, 1, usize::MAX, "namespace")?;

        // The catalog has no atomic replace; overwrite cannot be honored.
        let mode = request.mode.unwrap_or(CreateMode::Create);
        if mode == CreateMode::Overwrite {
            return InvalidInputSnafu {
                message: "overwrite mode is not supported for this implementation",
            }
            .fail();
        }

        let body = serde_json::json!({
            "namespace": id.levels(),
            "properties": request.properties.clone().unwrap_or_default(),
        });

        let response: Option<wire::NamespaceProperties> =
            match self.client.post("/namespaces", &body).await {
                Ok(response) => response,
                Err(e) if e.is_conflict() && mode == CreateMode::ExistOk => None,
                Err(e) if e.is_conflict() => {
                    return NamespaceAlreadyExistsSnafu {
                        message: id.dotted(),
                    }
                    .fail()
                }
                Err(e) => return Err(Self::internal("Failed to create namespace", e)),
            };

        log::info!("Created namespace: {}", id.dotted());
        Ok(CreateNamespaceResponse {
            properties: response.map(|r| r.properties),
        })
    }

    async fn describe_namespace(
        &self,
        request: DescribeNamespaceRequest,
    ) -> Result<DescribeNamespaceResponse> {
        let id = ObjectIdentifier::validate(&request.id, 1, usize::MAX, "namespace")?;

        let path = format!("/namespaces/{}", encode_unit_sep_path(id.levels()));
        let response: Option<wire::NamespaceProperties> = match self.client.get(&path, &[]).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                return NamespaceNotFoundSnafu {
                    message: id.dotted(),
                }
                .fail()
            }
            Err(e) => return Err(Self::internal("Failed to describe namespace", e)),
        };

        Ok(DescribeNamespaceResponse {
            properties: response.map(|r| r.properties).unwrap_or_default(),
        })
    }

    /// Drop a namespace. Dropping an already-absent namespace succeeds.
    async fn drop_namespace(&self, request: DropNamespaceRequest) -> Result<DropNamespaceResponse> {
        let id = ObjectIdentifier::validate(&request.id, 1, usize::MAX, "namespace")?;

        let path = format!("/namespaces/{}", encode_unit_sep_path(id.levels()));
        match self.client.delete(&path, &[]).await {
            Ok(()) => {
                log::info!("Dropped namespace: {}", id.dotted());
                Ok(DropNamespaceResponse {})
            }
            Err(e) if e.is_not_found() => Ok(DropNamespaceResponse {}),
            Err(e) if e.is_conflict() => lance_namespace::error::NamespaceNotEmptySnafu {
                message: id.dotted(),
            }
            .fail(),
            Err(e) => Err(Self::internal("Failed to drop namespace", e)),
        }
    }

    async fn namespace_exists(&self, request: NamespaceExistsRequest) -> Result<()> {
        self.describe_namespace(DescribeNamespaceRequest { id: request.id })
            .await?;
        Ok(())
    }

    /// List Lance tables in a namespace.
    ///
    /// The catalog lists tables of every format, so each candidate costs
    /// one extra metadata fetch to check the Lance marker.
    async fn list_tables(&self, request: ListTablesRequest) -> Result<ListTablesResponse> {
        let id = ObjectIdentifier::validate(&request.id, 1, usize::MAX, "namespace")?;

        let path = format!("/namespaces/{}/tables", encode_unit_sep_path(id.levels()));
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(token) = &request.page_token {
            query.push(("pageToken", token.as_str()));
        }

        let response: wire::TableIdentifierList = match self.client.get(&path, &query).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                return NamespaceNotFoundSnafu {
                    message: id.dotted(),
                }
                .fail()
            }
            Err(e) => return Err(Self::internal("Failed to list tables", e)),
        };

        let mut tables = BTreeSet::new();
        for identifier in response.identifiers {
            let metadata = self.load_table_metadata(id.levels(), &identifier.name).await?;
            if let Some(metadata) = metadata {
                if is_lance_table(&metadata.properties) {
                    tables.insert(identifier.name);
                }
            }
        }

        Ok(ListTablesResponse {
            tables: tables.into_iter().collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn declare_table(&self, request: DeclareTableRequest) -> Result<DeclareTableResponse> {
        let id = ObjectIdentifier::validate(&request.id, 2, usize::MAX, "table")?;
        let namespace = id.parent();
        let table = id.name();

        let location = if request.location.is_empty() {
            format!("{}/{}/{}", self.root, namespace.join("/"), table)
        } else {
            request.location.clone()
        };

        let mut properties: HashMap<String, String> = HashMap::new();
        properties.insert(
            crate::filter::TABLE_TYPE_KEY.to_string(),
            crate::filter::LANCE_TABLE_FORMAT.to_string(),
        );
        if let Some(extra) = &request.properties {
            properties.extend(extra.clone());
        }

        let path = format!("/namespaces/{}/tables", encode_unit_sep_path(namespace));
        let body = serde_json::json!({
            "name": table,
            "location": location,
            "schema": placeholder_schema(),
            "properties": properties,
        });

        let response: Option<wire::LoadTableResult> = match self.client.post(&path, &body).await {
            Ok(response) => response,
            Err(e) if e.is_conflict() => {
                return TableAlreadyExistsSnafu {
                    message: id.dotted(),
                }
                .fail()
            }
            Err(e) if e.is_not_found() => {
                return NamespaceNotFoundSnafu {
                    message: namespace.join("."),
                }
                .fail()
            }
            Err(e) => return Err(Self::internal("Failed to declare table", e)),
        };

        log::info!("Declared table: {}", id.dotted());
        let properties = response
            .and_then(|r| r.metadata)
            .map(|m| m.properties)
            .filter(|p| !p.is_empty());
        Ok(DeclareTableResponse {
            location,
            properties,
        })
    }

    /// Describe a Lance table.
    ///
    /// An entry of a foreign table format reports `TableNotFound`, since
    /// it is not visible through this interface.
    async fn describe_table(&self, request: DescribeTableRequest) -> Result<DescribeTableResponse> {
        if request.load_detailed_metadata == Some(true) {
            return InvalidInputSnafu {
                message: "load_detailed_metadata=true is not supported for this implementation",
            }
            .fail();
        }

        let id = ObjectIdentifier::validate(&request.id, 2, usize::MAX, "table")?;
        let metadata = self
            .load_table_metadata(id.parent(), id.name())
            .await?
            .ok_or_else(|| {
                TableNotFoundSnafu {
                    message: id.dotted(),
                }
                .build()
            })?;

        if !is_lance_table(&metadata.properties) {
            return TableNotFoundSnafu {
                message: format!("{} is not a Lance-managed table", id.dotted()),
            }
            .fail();
        }

        Ok(DescribeTableResponse {
            location: metadata.location,
            storage_options: HashMap::new(),
            properties: Some(metadata.properties),
        })
    }

    async fn table_exists(&self, request: TableExistsRequest) -> Result<()> {
        self.describe_table(DescribeTableRequest {
            id: request.id,
            load_detailed_metadata: None,
        })
        .await?;
        Ok(())
    }

    /// Remove a table's catalog entry without purging data.
    ///
    /// Deregistering an absent table succeeds and reports no location.
    async fn deregister_table(
        &self,
        request: DeregisterTableRequest,
    ) -> Result<DeregisterTableResponse> {
        let id = ObjectIdentifier::validate(&request.id, 2, usize::MAX, "table")?;
        let namespace = id.parent();
        let table = id.name();

        let metadata = self.load_table_metadata(namespace, table).await?;
        let Some(metadata) = metadata else {
            return Ok(DeregisterTableResponse { location: None });
        };
        // Entries of foreign table formats are invisible here and must
        // never be deleted through this interface.
        if !is_lance_table(&metadata.properties) {
            return TableNotFoundSnafu {
                message: format!("{} is not a Lance-managed table", id.dotted()),
            }
            .fail();
        }

        let path = Self::table_path(namespace, table);
        match self.client.delete(&path, &[("purgeRequested", "false")]).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                return Ok(DeregisterTableResponse { location: None })
            }
            Err(e) => return Err(Self::internal("Failed to deregister table", e)),
        }

        log::info!("Deregistered table: {}", id.dotted());
        Ok(DeregisterTableResponse {
            location: metadata.location,
        })
    }

    async fn close(&self) -> Result<()> {
        // Dropping the pooled reqwest client releases its connections.
        Ok(())
    }

    fn namespace_id(&self) -> String {
        format!("IcebergNamespace {{ endpoint: {:?} }}", self.endpoint)
    }
}
