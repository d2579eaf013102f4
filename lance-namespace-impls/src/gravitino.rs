// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Gravitino REST namespace implementation.
//!
//! Integrates with Apache Gravitino's Lance REST service, which exposes a
//! three-level hierarchy:
//!
//! - Catalog (first identifier segment)
//! - Schema (second identifier segment)
//! - Table (third identifier segment)
//!
//! Namespace identifiers are therefore 1-2 levels deep and table
//! identifiers exactly 3. On the wire, multi-level identifiers are joined
//! into a single path component with a `$` delimiter rendered through
//! percent-encoding, and the root namespace is the `%2E` sentinel (see
//! [`crate::codec`]).

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use lance_namespace::error::{
    InternalSnafu, InvalidInputSnafu, NamespaceAlreadyExistsSnafu, NamespaceNotFoundSnafu,
    Result, TableAlreadyExistsSnafu, TableNotFoundSnafu,
};
use lance_namespace::models::{
    CreateMode, CreateNamespaceRequest, CreateNamespaceResponse, DeclareTableRequest,
    DeclareTableResponse, DeregisterTableRequest, DeregisterTableResponse,
    DescribeNamespaceRequest, DescribeNamespaceResponse, DescribeTableRequest,
    DescribeTableResponse, DropNamespaceRequest, DropNamespaceResponse, ListNamespacesRequest,
    ListNamespacesResponse, ListTablesRequest, ListTablesResponse, NamespaceExistsRequest,
    TableExistsRequest,
};
use lance_namespace::LanceNamespace;
use serde::Deserialize;

use crate::codec::{encode_dollar_path, encode_segment, ROOT_PATH_TOKEN};
use crate::ident::ObjectIdentifier;
use crate::rest_client::{RestClient, RestClientError};

/// Builder for creating a [`GravitinoNamespace`].
///
/// # Examples
///
/// ```no_run
/// # use lance_namespace_impls::GravitinoNamespaceBuilder;
/// let namespace = GravitinoNamespaceBuilder::new("http://localhost:9101")
///     .auth_token("token")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct GravitinoNamespaceBuilder {
    endpoint: String,
    auth_token: Option<String>,
    connect_timeout_millis: u64,
    read_timeout_millis: u64,
    max_retries: u32,
}

impl GravitinoNamespaceBuilder {
    /// Required property: Gravitino server endpoint, e.g.
    /// `http://localhost:9101`.
    pub const ENDPOINT: &'static str = "endpoint";
    /// Optional property: bearer token attached to every request.
    pub const AUTH_TOKEN: &'static str = "auth_token";
    /// Optional property: connect timeout in milliseconds.
    pub const CONNECT_TIMEOUT: &'static str = "connect_timeout";
    /// Optional property: read timeout in milliseconds.
    pub const READ_TIMEOUT: &'static str = "read_timeout";
    /// Optional property: maximum transport retry attempts.
    pub const MAX_RETRIES: &'static str = "max_retries";

    const DEFAULT_CONNECT_TIMEOUT_MILLIS: u64 = 10_000;
    const DEFAULT_READ_TIMEOUT_MILLIS: u64 = 30_000;
    const DEFAULT_MAX_RETRIES: u32 = 3;

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: None,
            connect_timeout_millis: Self::DEFAULT_CONNECT_TIMEOUT_MILLIS,
            read_timeout_millis: Self::DEFAULT_READ_TIMEOUT_MILLIS,
            max_retries: Self::DEFAULT_MAX_RETRIES,
        }
    }

    /// Parse builder configuration from a properties map.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `endpoint` is missing or a numeric
    /// property does not parse.
    pub fn from_properties(properties: HashMap<String, String>) -> Result<Self> {
        let endpoint = properties
            .get(Self::ENDPOINT)
            .cloned()
            .ok_or_else(|| {
                InvalidInputSnafu {
                    message: format!(
                        "Missing required property '{}' for Gravitino namespace",
                        Self::ENDPOINT
                    ),
                }
                .build()
            })?;

        let mut builder = Self::new(endpoint);
        builder.auth_token = properties.get(Self::AUTH_TOKEN).cloned();
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
        Ok(builder)
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
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

    /// Build the [`GravitinoNamespace`].
    pub fn build(self) -> GravitinoNamespace {
        let base_url = format!("{}/lance/v1", self.endpoint.trim_end_matches('/'));
        let mut client = RestClient::builder(base_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .connect_timeout_millis(self.connect_timeout_millis)
            .read_timeout_millis(self.read_timeout_millis)
            .max_retries(self.max_retries);
        if let Some(token) = &self.auth_token {
            client = client.bearer_token(token);
        }

        log::info!(
            "Initialized Gravitino namespace with endpoint: {}",
            self.endpoint
        );

        GravitinoNamespace {
            endpoint: self.endpoint,
            client: client.build(),
        }
    }
}

fn parse_u64(properties: &HashMap<String, String>, key: &str, default: u64) -> Result<u64> {
    match properties.get(key) {
        None => Ok(default),
        Some(value) => value.parse::<u64>().map_err(|_| {
            InvalidInputSnafu {
                message: format!("Property '{}' must be a non-negative integer, got {:?}", key, value),
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
                message: format!("Property '{}' must be a non-negative integer, got {:?}", key, value),
            }
            .build()
        }),
    }
}

/// Explicit wire schemas for the Gravitino Lance REST service.
mod wire {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    pub struct NamespaceList {
        #[serde(default)]
        pub namespaces: Vec<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct NamespaceProperties {
        #[serde(default)]
        pub properties: HashMap<String, String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct TableList {
        #[serde(default)]
        pub tables: Vec<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct TableLocation {
        #[serde(default)]
        pub location: Option<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct TableExists {
        #[serde(default)]
        pub exists: bool,
    }
}

/// Gravitino REST namespace implementation.
///
/// Namespace ID format: `[catalog]` or `[catalog, schema]`.
/// Table ID format: `[catalog, schema, table]`.
pub struct GravitinoNamespace {
    endpoint: String,
    client: RestClient,
}

impl std::fmt::Debug for GravitinoNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.namespace_id())
    }
}

impl GravitinoNamespace {
    fn internal(context: &str, e: RestClientError) -> lance_namespace::NamespaceError {
        InternalSnafu {
            message: format!("{}: {}", context, e),
        }
        .build()
    }
}

#[async_trait]
impl LanceNamespace for GravitinoNamespace {
    /// List namespaces.
    ///
    /// Root lists catalogs; a 1-level identifier lists schemas in that
    /// catalog. There is nothing below schema level, so deeper
    /// identifiers list as empty rather than failing.
    async fn list_namespaces(
        &self,
        request: ListNamespacesRequest,
    ) -> Result<ListNamespacesResponse> {
        let id = ObjectIdentifier::validate(&request.id, 0, usize::MAX, "namespace")?;

        let outcome: std::result::Result<wire::NamespaceList, RestClientError> = match id.levels() {
            [] => {
                let path = format!("/namespace/{}/list", ROOT_PATH_TOKEN);
                self.client.get(&path, &[("delimiter", ".")]).await
            }
            [catalog] => {
                let path = format!("/namespace/{}/list", encode_segment(catalog));
                self.client.get(&path, &[]).await
            }
            _ => {
                return Ok(ListNamespacesResponse {
                    namespaces: Vec::new(),
                    next_page_token: None,
                })
            }
        };

        let listed = match outcome {
            Ok(response) => response.namespaces,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(Self::internal("Failed to list namespaces", e)),
        };

        // Schemas are reported as dotted children of their catalog.
        let namespaces: BTreeSet<String> = listed
            .into_iter()
            .filter(|ns| !ns.is_empty())
            .map(|ns| match id.levels() {
                [catalog] => format!("{}.{}", catalog, ns),
                _ => ns,
            })
            .collect();

        Ok(ListNamespacesResponse {
            namespaces: namespaces.into_iter().collect(),
            next_page_token: None,
        })
    }

    async fn create_namespace(
        &self,
        request: CreateNamespaceRequest,
    ) -> Result<CreateNamespaceResponse> {
        let id = ObjectIdentifier::validate(&request.id, 1, 2, "namespace")?;
        let mode = request.mode.unwrap_or(CreateMode::Create);

        let path = format!("/namespace/{}/create", encode_dollar_path(id.levels()));
        let body = serde_json::json!({
            "id": id.levels(),
            "mode": mode.as_str(),
            "properties": request.properties.clone().unwrap_or_default(),
        });

        let response: Option<wire::NamespaceProperties> =
            match self.client.post(&path, &body).await {
                Ok(response) => response,
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
        let id = ObjectIdentifier::validate(&request.id, 1, 2, "namespace")?;

        let path = format!("/namespace/{}/describe", encode_dollar_path(id.levels()));
        let body = serde_json::json!({ "id": id.levels() });

        let response: Option<wire::NamespaceProperties> =
            match self.client.post(&path, &body).await {
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
        let id = ObjectIdentifier::validate(&request.id, 1, 2, "namespace")?;

        let path = format!("/namespace/{}/drop", encode_dollar_path(id.levels()));
        let mut body = serde_json::json!({ "id": id.levels() });
        if let Some(behavior) = request.behavior {
            body["behavior"] = serde_json::to_value(behavior).map_err(|e| {
                InternalSnafu {
                    message: format!("Failed to serialize drop behavior: {}", e),
                }
                .build()
            })?;
        }

        match self.client.post::<_, Option<serde_json::Value>>(&path, &body).await {
            Ok(_) => {
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

    /// List Lance tables in a schema. The namespace must be exactly
    /// `catalog.schema`.
    async fn list_tables(&self, request: ListTablesRequest) -> Result<ListTablesResponse> {
        let id = ObjectIdentifier::validate(&request.id, 2, 2, "namespace")?;

        let path = format!("/namespace/{}/table/list", encode_dollar_path(id.levels()));
        let response: wire::TableList = match self.client.get(&path, &[]).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                return NamespaceNotFoundSnafu {
                    message: id.dotted(),
                }
                .fail()
            }
            Err(e) => return Err(Self::internal("Failed to list tables", e)),
        };

        // The service may render composite identifiers like
        // `catalog$schema$table`; keep only the table name.
        let tables: BTreeSet<String> = response
            .tables
            .into_iter()
            .map(|t| match t.rsplit_once('$') {
                Some((_, name)) => name.to_string(),
                None => t,
            })
            .collect();

        Ok(ListTablesResponse {
            tables: tables.into_iter().collect(),
            next_page_token: None,
        })
    }

    async fn declare_table(&self, request: DeclareTableRequest) -> Result<DeclareTableResponse> {
        let id = ObjectIdentifier::validate(&request.id, 3, 3, "table")?;

        let path = format!("/table/{}/register", encode_dollar_path(id.levels()));
        let body = serde_json::json!({
            "id": id.levels(),
            "location": request.location,
            "mode": "CREATE",
        });

        let response: Option<wire::TableLocation> = match self.client.post(&path, &body).await {
            Ok(response) => response,
            Err(e) if e.is_conflict() => {
                return TableAlreadyExistsSnafu {
                    message: id.dotted(),
                }
                .fail()
            }
            Err(e) if e.is_not_found() => {
                return NamespaceNotFoundSnafu {
                    message: id.parent().join("."),
                }
                .fail()
            }
            Err(e) => return Err(Self::internal("Failed to declare table", e)),
        };

        log::info!("Declared table: {}", id.dotted());
        let location = response
            .and_then(|r| r.location)
            .unwrap_or(request.location);
        Ok(DeclareTableResponse {
            location,
            properties: None,
        })
    }

    /// Describe a table.
    ///
    /// The Gravitino Lance REST service has no dedicated describe
    /// endpoint; this verifies existence and returns an empty location,
    /// and rejects detailed-metadata requests up front.
    async fn describe_table(&self, request: DescribeTableRequest) -> Result<DescribeTableResponse> {
        if request.load_detailed_metadata == Some(true) {
            return InvalidInputSnafu {
                message: "load_detailed_metadata=true is not supported for this implementation",
            }
            .fail();
        }

        let id = ObjectIdentifier::validate(&request.id, 3, 3, "table")?;
        self.check_table_exists(&id).await?;

        Ok(DescribeTableResponse {
            location: None,
            storage_options: HashMap::new(),
            properties: None,
        })
    }

    async fn table_exists(&self, request: TableExistsRequest) -> Result<()> {
        let id = ObjectIdentifier::validate(&request.id, 3, 3, "table")?;
        self.check_table_exists(&id).await
    }

    async fn deregister_table(
        &self,
        request: DeregisterTableRequest,
    ) -> Result<DeregisterTableResponse> {
        let id = ObjectIdentifier::validate(&request.id, 3, 3, "table")?;

        let path = format!("/table/{}/deregister", encode_dollar_path(id.levels()));
        let body = serde_json::json!({ "id": id.levels() });

        let response: Option<wire::TableLocation> = match self.client.post(&path, &body).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                return Ok(DeregisterTableResponse { location: None });
            }
            Err(e) => return Err(Self::internal("Failed to deregister table", e)),
        };

        log::info!("Deregistered table: {}", id.dotted());
        Ok(DeregisterTableResponse {
            location: response.and_then(|r| r.location),
        })
    }

    async fn close(&self) -> Result<()> {
        // Dropping the pooled reqwest client releases its connections.
        Ok(())
    }

    fn namespace_id(&self) -> String {
        format!("GravitinoNamespace {{ endpoint: {:?} }}", self.endpoint)
    }
}

impl GravitinoNamespace {
    async fn check_table_exists(&self, id: &ObjectIdentifier) -> Result<()> {
        let path = format!("/table/{}/exists", encode_dollar_path(id.levels()));
        let body = serde_json::json!({ "id": id.levels() });

        let response: Option<wire::TableExists> = match self.client.post(&path, &body).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                return TableNotFoundSnafu {
                    message: id.dotted(),
                }
                .fail()
            }
            Err(e) => return Err(Self::internal("Failed to check table existence", e)),
        };

        match response {
            Some(wire::TableExists { exists: true }) => Ok(()),
            _ => TableNotFoundSnafu {
                message: id.dotted(),
            }
            .fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lance_namespace::ErrorCode;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn namespace_for(server: &MockServer) -> GravitinoNamespace {
        GravitinoNamespaceBuilder::new(server.uri()).build()
    }

    fn ids(parts: &[&str]) -> Option<Vec<String>> {
        Some(parts.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_from_properties_requires_endpoint() {
        let err = GravitinoNamespaceBuilder::from_properties(HashMap::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }

    #[test]
    fn test_from_properties_parses_timeouts() {
        let mut props = HashMap::new();
        props.insert("endpoint".to_string(), "http://localhost:9101".to_string());
        props.insert("connect_timeout".to_string(), "5000".to_string());
        props.insert("max_retries".to_string(), "1".to_string());

        let builder = GravitinoNamespaceBuilder::from_properties(props).unwrap();
        assert_eq!(builder.connect_timeout_millis, 5000);
        assert_eq!(builder.read_timeout_millis, 30_000);
        assert_eq!(builder.max_retries, 1);
    }

    #[test]
    fn test_from_properties_rejects_bad_number() {
        let mut props = HashMap::new();
        props.insert("endpoint".to_string(), "http://localhost:9101".to_string());
        props.insert("read_timeout".to_string(), "soon".to_string());
        let err = GravitinoNamespaceBuilder::from_properties(props).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }

    #[test]
    fn test_from_properties_rejects_bad_retry_count() {
        let mut props = HashMap::new();
        props.insert("endpoint".to_string(), "http://localhost:9101".to_string());
        props.insert("max_retries".to_string(), "-1".to_string());
        let err = GravitinoNamespaceBuilder::from_properties(props).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_list_root_namespaces_uses_sentinel_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lance/v1/namespace/%2E/list"))
            .and(query_param("delimiter", "."))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "namespaces": ["cat2", "cat1", "cat2"]
            })))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let response = namespace
            .list_namespaces(ListNamespacesRequest::default())
            .await
            .unwrap();
        // Sorted and de-duplicated.
        assert_eq!(response.namespaces, vec!["cat1", "cat2"]);
    }

    #[tokio::test]
    async fn test_list_schemas_renders_dotted_children() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lance/v1/namespace/cat1/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "namespaces": ["sch1", "sch0"]
            })))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let response = namespace
            .list_namespaces(ListNamespacesRequest {
                id: ids(&["cat1"]),
                page_token: None,
            })
            .await
            .unwrap();
        assert_eq!(response.namespaces, vec!["cat1.sch0", "cat1.sch1"]);
    }

    #[tokio::test]
    async fn test_list_below_schema_level_is_empty() {
        // No mock mounted: no wire call may be issued.
        let server = MockServer::start().await;
        let namespace = namespace_for(&server);
        let response = namespace
            .list_namespaces(ListNamespacesRequest {
                id: ids(&["cat1", "sch1"]),
                page_token: None,
            })
            .await
            .unwrap();
        assert!(response.namespaces.is_empty());
    }

    #[tokio::test]
    async fn test_create_namespace_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lance/v1/namespace/cat1/create"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let err = namespace
            .create_namespace(CreateNamespaceRequest {
                id: ids(&["cat1"]),
                properties: None,
                mode: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NamespaceAlreadyExists);
    }

    #[tokio::test]
    async fn test_create_namespace_rejects_deep_identifier() {
        let server = MockServer::start().await;
        let namespace = namespace_for(&server);
        let err = namespace
            .create_namespace(CreateNamespaceRequest {
                id: ids(&["a", "b", "c"]),
                properties: None,
                mode: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_create_schema_encodes_dollar_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lance/v1/namespace/cat1%24sch1/create"))
            .and(body_partial_json(serde_json::json!({
                "id": ["cat1", "sch1"],
                "mode": "create",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": {"owner": "me"}
            })))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let response = namespace
            .create_namespace(CreateNamespaceRequest {
                id: ids(&["cat1", "sch1"]),
                properties: None,
                mode: None,
            })
            .await
            .unwrap();
        assert_eq!(
            response.properties.unwrap().get("owner").map(String::as_str),
            Some("me")
        );
    }

    #[tokio::test]
    async fn test_describe_namespace_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lance/v1/namespace/ghost/describe"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let err = namespace
            .describe_namespace(DescribeNamespaceRequest {
                id: ids(&["ghost"]),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NamespaceNotFound);
    }

    #[tokio::test]
    async fn test_drop_absent_namespace_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lance/v1/namespace/ghost/drop"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        namespace
            .drop_namespace(DropNamespaceRequest {
                id: ids(&["ghost"]),
                behavior: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_drop_non_empty_namespace() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lance/v1/namespace/cat1%24sch1/drop"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let err = namespace
            .drop_namespace(DropNamespaceRequest {
                id: ids(&["cat1", "sch1"]),
                behavior: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NamespaceNotEmpty);
    }

    #[tokio::test]
    async fn test_list_tables_strips_composite_identifiers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lance/v1/namespace/cat1%24sch1/table/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tables": ["cat1$sch1$t2", "t1", "cat1$sch1$t1"]
            })))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let response = namespace
            .list_tables(ListTablesRequest {
                id: ids(&["cat1", "sch1"]),
                page_token: None,
            })
            .await
            .unwrap();
        assert_eq!(response.tables, vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_list_tables_requires_two_levels() {
        let server = MockServer::start().await;
        let namespace = namespace_for(&server);
        for id in [ids(&["cat1"]), ids(&["a", "b", "c"])] {
            let err = namespace
                .list_tables(ListTablesRequest {
                    id,
                    page_token: None,
                })
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);
        }
    }

    #[tokio::test]
    async fn test_declare_table_conflict_and_missing_namespace() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lance/v1/table/cat1%24sch1%24t1/register"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/lance/v1/table/cat1%24ghost%24t1/register"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let err = namespace
            .declare_table(DeclareTableRequest {
                id: ids(&["cat1", "sch1", "t1"]),
                location: "/data/t1".to_string(),
                properties: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TableAlreadyExists);

        let err = namespace
            .declare_table(DeclareTableRequest {
                id: ids(&["cat1", "ghost", "t1"]),
                location: "/data/t1".to_string(),
                properties: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NamespaceNotFound);
    }

    #[tokio::test]
    async fn test_declare_table_returns_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lance/v1/table/cat1%24sch1%24t1/register"))
            .and(body_partial_json(serde_json::json!({
                "location": "/data/t1",
                "mode": "CREATE",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": "/data/t1"
            })))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let response = namespace
            .declare_table(DeclareTableRequest {
                id: ids(&["cat1", "sch1", "t1"]),
                location: "/data/t1".to_string(),
                properties: None,
            })
            .await
            .unwrap();
        assert_eq!(response.location, "/data/t1");
    }

    #[tokio::test]
    async fn test_describe_table_rejects_detailed_metadata_before_wire_call() {
        // No mock mounted: rejection happens before any request.
        let server = MockServer::start().await;
        let namespace = namespace_for(&server);
        let err = namespace
            .describe_table(DescribeTableRequest {
                id: ids(&["cat1", "sch1", "t1"]),
                load_detailed_metadata: Some(true),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_describe_table_checks_existence() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lance/v1/table/cat1%24sch1%24t1/exists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "exists": false
            })))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let err = namespace
            .describe_table(DescribeTableRequest {
                id: ids(&["cat1", "sch1", "t1"]),
                load_detailed_metadata: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_deregister_table_returns_prior_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lance/v1/table/cat1%24sch1%24t1/deregister"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": "/data/t1"
            })))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let response = namespace
            .deregister_table(DeregisterTableRequest {
                id: ids(&["cat1", "sch1", "t1"]),
            })
            .await
            .unwrap();
        assert_eq!(response.location.as_deref(), Some("/data/t1"));
    }

    #[tokio::test]
    async fn test_deregister_absent_table_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lance/v1/table/cat1%24sch1%24ghost/deregister"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let namespace = namespace_for(&server);
        let response = namespace
            .deregister_table(DeregisterTableRequest {
                id: ids(&["cat1", "sch1", "ghost"]),
            })
            .await
            .unwrap();
        assert!(response.location.is_none());
    }
}
