// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Hive metastore namespace implementation.
//!
//! Catalogs Lance tables as external Hive tables whose parameters carry
//! the `table_type=lance` marker. The metastore hierarchy is fixed at
//! three levels (catalog, database, table); shorter identifiers are
//! left-padded with the configured default catalog and database.
//!
//! The Thrift transport is injected through [`MetastoreClient`], keeping
//! this adapter independent of any particular Thrift runtime. Catalog
//! objects exist in Hive 3 metastores but cannot be created or dropped
//! through the standard client API, so catalog-level create and drop
//! report `Unsupported`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use lance_namespace::error::{
    InternalSnafu, InvalidInputSnafu, NamespaceAlreadyExistsSnafu, NamespaceNotEmptySnafu,
    NamespaceNotFoundSnafu, Result, TableAlreadyExistsSnafu, TableNotFoundSnafu, UnsupportedSnafu,
};
use lance_namespace::models::{
    CreateMode, CreateNamespaceRequest, CreateNamespaceResponse, DeclareTableRequest,
    DeclareTableResponse, DeregisterTableRequest, DeregisterTableResponse,
    DescribeNamespaceRequest, DescribeNamespaceResponse, DescribeTableRequest,
    DescribeTableResponse, DropNamespaceRequest, DropNamespaceResponse, ListNamespacesRequest,
    ListNamespacesResponse, ListTablesRequest, ListTablesResponse, NamespaceExistsRequest,
    TableExistsRequest,
};
use lance_namespace::{LanceNamespace, NamespaceError};
use snafu::Snafu;

use crate::filter::{
    is_lance_table, LANCE_TABLE_FORMAT, MANAGED_BY_KEY, TABLE_TYPE_KEY, VERSION_KEY,
};
use crate::ident::{IdentifierDefaults, ObjectIdentifier};

/// Failure reported by a [`MetastoreClient`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MetastoreError {
    /// The named database or table does not exist.
    #[snafu(display("No such object: {message}"))]
    NoSuchObject { message: String },

    /// The object to create already exists.
    #[snafu(display("Already exists: {message}"))]
    AlreadyExists { message: String },

    /// The metastore rejected the operation.
    #[snafu(display("Invalid operation: {message}"))]
    InvalidOperation { message: String },

    /// A metastore-side failure.
    #[snafu(display("Metastore error: {message}"))]
    Meta { message: String },

    /// The request never reached the metastore.
    #[snafu(display("Transport error: {message}"))]
    Transport { message: String },
}

pub type MetastoreResult<T> = std::result::Result<T, MetastoreError>;

/// A Hive database as seen through the metastore client.
#[derive(Debug, Clone, Default)]
pub struct MetastoreDatabase {
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub location_uri: Option<String>,
    pub parameters: HashMap<String, String>,
}

/// A Hive table as seen through the metastore client.
///
/// Lance entries are always `EXTERNAL_TABLE` with the Lance marker in
/// `parameters`; `location` points at the Lance dataset root.
#[derive(Debug, Clone, Default)]
pub struct MetastoreTable {
    pub db_name: String,
    pub table_name: String,
    pub owner: Option<String>,
    pub table_type: String,
    pub location: Option<String>,
    pub parameters: HashMap<String, String>,
}

/// Wire transport to a Hive metastore.
///
/// Implementations wrap a Thrift client pool (or an in-memory fake in
/// tests) and surface raw metastore outcomes; the adapter translates
/// them into the shared error taxonomy.
#[async_trait]
pub trait MetastoreClient: Send + Sync + std::fmt::Debug {
    async fn get_catalogs(&self) -> MetastoreResult<Vec<String>>;
    async fn get_all_databases(&self) -> MetastoreResult<Vec<String>>;
    async fn get_database(&self, name: &str) -> MetastoreResult<MetastoreDatabase>;
    async fn create_database(&self, database: MetastoreDatabase) -> MetastoreResult<()>;
    async fn drop_database(
        &self,
        name: &str,
        delete_data: bool,
        cascade: bool,
    ) -> MetastoreResult<()>;
    async fn get_all_tables(&self, database: &str) -> MetastoreResult<Vec<String>>;
    async fn get_table(&self, database: &str, table: &str) -> MetastoreResult<MetastoreTable>;
    async fn create_table(&self, table: MetastoreTable) -> MetastoreResult<()>;
    async fn drop_table(
        &self,
        database: &str,
        table: &str,
        delete_data: bool,
    ) -> MetastoreResult<()>;
    async fn close(&self) -> MetastoreResult<()>;
}

const EXTERNAL_TABLE: &str = "EXTERNAL_TABLE";
const MANAGED_BY_STORAGE: &str = "storage";
const MANAGED_BY_IMPL: &str = "impl";

/// Builder for creating a [`HiveNamespace`].
///
/// The Thrift transport is supplied by the caller:
///
/// ```no_run
/// # use std::sync::Arc;
/// # use lance_namespace_impls::hive::{HiveNamespaceBuilder, MetastoreClient};
/// # fn client() -> Arc<dyn MetastoreClient> { unimplemented!() }
/// let namespace = HiveNamespaceBuilder::new("thrift://localhost:9083", client())
///     .root("s3://bucket/warehouse")
///     .build();
/// ```
#[derive(Debug)]
pub struct HiveNamespaceBuilder {
    uri: String,
    client: Arc<dyn MetastoreClient>,
    root: String,
    ugi: Option<String>,
    storage_options: HashMap<String, String>,
    pool_size: u32,
    defaults: IdentifierDefaults,
}

impl HiveNamespaceBuilder {
    /// Property: metastore Thrift URI, e.g. `thrift://localhost:9083`.
    pub const URI: &'static str = "uri";
    /// Property: storage root under which default table locations are
    /// derived.
    pub const ROOT: &'static str = "root";
    /// Property: user/group information, `user:group1,group2`.
    pub const UGI: &'static str = "ugi";
    /// Property prefix: keys under `storage.` are stripped of the prefix
    /// and passed through as table storage options.
    pub const STORAGE_PREFIX: &'static str = "storage.";
    /// Property: connection pool size, read by the transport factory
    /// that constructs the injected [`MetastoreClient`].
    pub const CLIENT_POOL_SIZE: &'static str = "client.pool-size";
    /// Property: catalog segment used to left-pad short identifiers.
    pub const DEFAULT_CATALOG: &'static str = "default_catalog";
    /// Property: database segment used to left-pad one-level identifiers.
    pub const DEFAULT_DATABASE: &'static str = "default_database";

    const DEFAULT_CATALOG_NAME: &'static str = "hive";
    const DEFAULT_DATABASE_NAME: &'static str = "default";
    const DEFAULT_ROOT: &'static str = "/tmp/lance";
    const DEFAULT_POOL_SIZE: u32 = 3;

    pub fn new(uri: impl Into<String>, client: Arc<dyn MetastoreClient>) -> Self {
        Self {
            uri: uri.into(),
            client,
            root: Self::DEFAULT_ROOT.to_string(),
            ugi: None,
            storage_options: HashMap::new(),
            pool_size: Self::DEFAULT_POOL_SIZE,
            defaults: IdentifierDefaults {
                catalog: Self::DEFAULT_CATALOG_NAME.to_string(),
                database: Self::DEFAULT_DATABASE_NAME.to_string(),
            },
        }
    }

    /// Parse builder configuration from a properties map.
    pub fn from_properties(
        properties: HashMap<String, String>,
        client: Arc<dyn MetastoreClient>,
    ) -> Result<Self> {
        let uri = properties.get(Self::URI).cloned().ok_or_else(|| {
            InvalidInputSnafu {
                message: format!("Missing required property '{}' for Hive namespace", Self::URI),
            }
            .build()
        })?;

        let mut builder = Self::new(uri, client);
        if let Some(root) = properties.get(Self::ROOT) {
            builder.root = root.clone();
        }
        builder.ugi = properties.get(Self::UGI).cloned();
        if let Some(catalog) = properties.get(Self::DEFAULT_CATALOG) {
            builder.defaults.catalog = catalog.clone();
        }
        if let Some(database) = properties.get(Self::DEFAULT_DATABASE) {
            builder.defaults.database = database.clone();
        }
        if let Some(value) = properties.get(Self::CLIENT_POOL_SIZE) {
            builder.pool_size = value.parse::<u32>().map_err(|_| {
                InvalidInputSnafu {
                    message: format!(
                        "Property '{}' must be a positive integer, got {:?}",
                        Self::CLIENT_POOL_SIZE,
                        value
                    ),
                }
                .build()
            })?;
        }
        for (key, value) in &properties {
            if let Some(stripped) = key.strip_prefix(Self::STORAGE_PREFIX) {
                builder
                    .storage_options
                    .insert(stripped.to_string(), value.clone());
            }
        }
        Ok(builder)
    }

    /// Configured connection pool size, for the transport factory that
    /// constructs the injected [`MetastoreClient`].
    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn ugi(mut self, ugi: impl Into<String>) -> Self {
        self.ugi = Some(ugi.into());
        self
    }

    pub fn storage_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.storage_options.insert(key.into(), value.into());
        self
    }

    pub fn default_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.defaults.catalog = catalog.into();
        self
    }

    pub fn default_database(mut self, database: impl Into<String>) -> Self {
        self.defaults.database = database.into();
        self
    }

    /// Build the [`HiveNamespace`].
    pub fn build(self) -> HiveNamespace {
        log::info!("Initialized Hive namespace with uri: {}", self.uri);
        HiveNamespace {
            uri: self.uri,
            client: self.client,
            root: self.root,
            ugi: self.ugi,
            storage_options: self.storage_options,
            defaults: self.defaults,
        }
    }
}

/// Hive metastore namespace implementation.
///
/// Namespace ID format: `[catalog]` or `[catalog, database]`.
/// Table ID format: 1-3 levels, left-padded with the configured
/// defaults.
pub struct HiveNamespace {
    uri: String,
    client: Arc<dyn MetastoreClient>,
    root: String,
    ugi: Option<String>,
    storage_options: HashMap<String, String>,
    defaults: IdentifierDefaults,
}

impl std::fmt::Debug for HiveNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.namespace_id())
    }
}

impl HiveNamespace {
    fn default_table_location(&self, database: &str, table: &str) -> String {
        format!("{}/{}/{}.lance", self.root.trim_end_matches('/'), database, table)
    }

    fn translate(context: &str, e: MetastoreError) -> NamespaceError {
        InternalSnafu {
            message: format!("{}: {}", context, e),
        }
        .build()
    }

    /// Fetch a table entry, or `None` when absent.
    async fn load_table(&self, database: &str, table: &str) -> Result<Option<MetastoreTable>> {
        match self.client.get_table(database, table).await {
            Ok(entry) => Ok(Some(entry)),
            Err(MetastoreError::NoSuchObject { .. }) => Ok(None),
            Err(e) => Err(Self::translate("Failed to load table", e)),
        }
    }

    /// Resolve a table identifier to metastore names. Hive stores
    /// database names lowercased.
    fn resolve_table_names(&self, id: &ObjectIdentifier) -> Result<(String, String)> {
        let (_, database, table) = self.defaults.resolve_table(id)?;
        Ok((database.to_lowercase(), table))
    }

    /// Fetch a Lance table entry; a foreign-format entry is reported as
    /// absent.
    async fn load_lance_table(&self, id: &ObjectIdentifier) -> Result<MetastoreTable> {
        let (database, table) = self.resolve_table_names(id)?;
        let entry = self.load_table(&database, &table).await?.ok_or_else(|| {
            TableNotFoundSnafu {
                message: id.dotted(),
            }
            .build()
        })?;
        if !is_lance_table(&entry.parameters) {
            return TableNotFoundSnafu {
                message: format!("{} is not a Lance-managed table", id.dotted()),
            }
            .fail();
        }
        Ok(entry)
    }

    fn build_database(&self, name: &str, properties: &HashMap<String, String>) -> MetastoreDatabase {
        MetastoreDatabase {
            name: name.to_string(),
            description: properties.get("comment").cloned(),
            owner: properties.get("owner").cloned(),
            location_uri: Some(
                properties
                    .get("location")
                    .cloned()
                    .unwrap_or_else(|| format!("{}/{}", self.root.trim_end_matches('/'), name)),
            ),
            parameters: properties
                .iter()
                .filter(|(k, _)| !matches!(k.as_str(), "comment" | "owner" | "location"))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl LanceNamespace for HiveNamespace {
    /// List namespaces.
    ///
    /// Root lists catalogs; a catalog identifier lists its databases,
    /// excluding the default database. There is nothing below database
    /// level, so deeper identifiers list as empty.
    async fn list_namespaces(
        &self,
        request: ListNamespacesRequest,
    ) -> Result<ListNamespacesResponse> {
        let id = ObjectIdentifier::validate(&request.id, 0, usize::MAX, "namespace")?;

        let namespaces: BTreeSet<String> = match id.levels() {
            [] => match self.client.get_catalogs().await {
                Ok(catalogs) if !catalogs.is_empty() => catalogs.into_iter().collect(),
                // Older metastores predate catalog objects; report the
                // implied default catalog.
                Ok(_) | Err(_) => std::iter::once(self.defaults.catalog.clone()).collect(),
            },
            [_catalog] => {
                let databases = self
                    .client
                    .get_all_databases()
                    .await
                    .map_err(|e| Self::translate("Failed to list databases", e))?;
                databases
                    .into_iter()
                    .filter(|db| db != &self.defaults.database)
                    .collect()
            }
            _ => BTreeSet::new(),
        };

        Ok(ListNamespacesResponse {
            namespaces: namespaces.into_iter().collect(),
            next_page_token: None,
        })
    }

    async fn describe_namespace(
        &self,
        request: DescribeNamespaceRequest,
    ) -> Result<DescribeNamespaceResponse> {
        let id = ObjectIdentifier::validate(&request.id, 0, 2, "namespace")?;

        let properties = match id.levels() {
            [] => {
                let mut properties = HashMap::new();
                properties.insert("location".to_string(), self.root.clone());
                if let Some(ugi) = &self.ugi {
                    properties.insert("ugi".to_string(), ugi.clone());
                }
                properties
            }
            [catalog] => {
                let mut properties = HashMap::new();
                properties.insert(
                    "catalog.location.uri".to_string(),
                    format!("{}/{}", self.root.trim_end_matches('/'), catalog),
                );
                properties
            }
            [_catalog, database] => {
                let entry = match self.client.get_database(&database.to_lowercase()).await {
                    Ok(entry) => entry,
                    Err(MetastoreError::NoSuchObject { .. }) => {
                        return NamespaceNotFoundSnafu {
                            message: id.dotted(),
                        }
                        .fail()
                    }
                    Err(e) => return Err(Self::translate("Failed to describe namespace", e)),
                };
                let mut properties = entry.parameters;
                if let Some(comment) = entry.description {
                    properties.insert("comment".to_string(), comment);
                }
                if let Some(owner) = entry.owner {
                    properties.insert("owner".to_string(), owner);
                }
                if let Some(location) = entry.location_uri {
                    properties.insert("location".to_string(), location);
                }
                properties
            }
            _ => unreachable!("depth validated above"),
        };

        Ok(DescribeNamespaceResponse { properties })
    }

    /// Create a namespace.
    ///
    /// Only databases can be created; the metastore client API offers no
    /// catalog creation, so catalog-level requests report `Unsupported`.
    async fn create_namespace(
        &self,
        request: CreateNamespaceRequest,
    ) -> Result<CreateNamespaceResponse> {
        let id = ObjectIdentifier::validate(&request.id, 1, 2, "namespace")?;
        let mode = request.mode.unwrap_or(CreateMode::Create);

        let [_catalog, database] = id.levels() else {
            return UnsupportedSnafu {
                message: "Catalog creation is not supported by the Hive metastore client API",
            }
            .fail();
        };

        let database = database.to_lowercase();
        let properties = request.properties.clone().unwrap_or_default();
        let entry = self.build_database(&database, &properties);

        match self.client.create_database(entry.clone()).await {
            Ok(()) => {}
            Err(MetastoreError::AlreadyExists { .. }) => match mode {
                CreateMode::Create => {
                    return NamespaceAlreadyExistsSnafu {
                        message: id.dotted(),
                    }
                    .fail()
                }
                CreateMode::ExistOk => {}
                CreateMode::Overwrite => {
                    self.client
                        .drop_database(&database, true, true)
                        .await
                        .map_err(|e| Self::translate("Failed to replace namespace", e))?;
                    self.client
                        .create_database(entry)
                        .await
                        .map_err(|e| Self::translate("Failed to replace namespace", e))?;
                }
            },
            Err(e) => return Err(Self::translate("Failed to create namespace", e)),
        }

        log::info!("Created namespace: {}", id.dotted());
        Ok(CreateNamespaceResponse { properties: None })
    }

    /// Drop a database. Only restrict semantics are offered: a database
    /// holding any table reports `NamespaceNotEmpty`. Dropping an absent
    /// database succeeds.
    async fn drop_namespace(&self, request: DropNamespaceRequest) -> Result<DropNamespaceResponse> {
        let id = ObjectIdentifier::validate(&request.id, 1, 2, "namespace")?;

        let [_catalog, database] = id.levels() else {
            return UnsupportedSnafu {
                message: "Catalog drop is not supported by the Hive metastore client API",
            }
            .fail();
        };

        let database = database.to_lowercase();
        let tables = match self.client.get_all_tables(&database).await {
            Ok(tables) => tables,
            Err(MetastoreError::NoSuchObject { .. }) => return Ok(DropNamespaceResponse {}),
            Err(e) => return Err(Self::translate("Failed to drop namespace", e)),
        };
        if !tables.is_empty() {
            return NamespaceNotEmptySnafu {
                message: id.dotted(),
            }
            .fail();
        }

        match self.client.drop_database(&database, true, false).await {
            Ok(()) => {
                log::info!("Dropped namespace: {}", id.dotted());
                Ok(DropNamespaceResponse {})
            }
            Err(MetastoreError::NoSuchObject { .. }) => Ok(DropNamespaceResponse {}),
            Err(e) => Err(Self::translate("Failed to drop namespace", e)),
        }
    }

    async fn namespace_exists(&self, request: NamespaceExistsRequest) -> Result<()> {
        let id = ObjectIdentifier::validate(&request.id, 0, 2, "namespace")?;

        match id.levels() {
            // Root and catalogs always exist in the fixed hierarchy.
            [] | [_] => Ok(()),
            [_catalog, database] => match self.client.get_database(&database.to_lowercase()).await
            {
                Ok(_) => Ok(()),
                Err(MetastoreError::NoSuchObject { .. }) => NamespaceNotFoundSnafu {
                    message: id.dotted(),
                }
                .fail(),
                Err(e) => Err(Self::translate("Failed to check namespace existence", e)),
            },
            _ => unreachable!("depth validated above"),
        }
    }

    /// List Lance tables in a database.
    ///
    /// The metastore lists tables of every format, so each candidate
    /// costs one extra `get_table` call to check the Lance marker.
    async fn list_tables(&self, request: ListTablesRequest) -> Result<ListTablesResponse> {
        let id = ObjectIdentifier::validate(&request.id, 1, 2, "namespace")?;
        let (_, database) = self.defaults.resolve_database(&id)?;
        let database = database.to_lowercase();

        let names = match self.client.get_all_tables(&database).await {
            Ok(names) => names,
            Err(MetastoreError::NoSuchObject { .. }) => {
                return NamespaceNotFoundSnafu {
                    message: id.dotted(),
                }
                .fail()
            }
            Err(e) => return Err(Self::translate("Failed to list tables", e)),
        };

        let mut tables = BTreeSet::new();
        for name in names {
            if let Some(entry) = self.load_table(&database, &name).await? {
                if is_lance_table(&entry.parameters) {
                    tables.insert(name);
                }
            }
        }

        Ok(ListTablesResponse {
            tables: tables.into_iter().collect(),
            next_page_token: None,
        })
    }

    /// Register an existing Lance dataset as an external table.
    ///
    /// The entry carries the Lance marker plus the version-management
    /// convention: `managed_by=storage` (the default) leaves versioning
    /// to the dataset; `managed_by=impl` pins the version in the catalog
    /// and requires a `version` property.
    async fn declare_table(&self, request: DeclareTableRequest) -> Result<DeclareTableResponse> {
        let id = ObjectIdentifier::validate(&request.id, 1, 3, "table")?;
        let (database, table) = self.resolve_table_names(&id)?;

        let request_properties = request.properties.clone().unwrap_or_default();
        let managed_by = request_properties
            .get(MANAGED_BY_KEY)
            .cloned()
            .unwrap_or_else(|| MANAGED_BY_STORAGE.to_string());

        let location = if request.location.is_empty() {
            self.default_table_location(&database, &table)
        } else {
            request.location.clone()
        };

        let mut parameters = HashMap::new();
        parameters.insert(TABLE_TYPE_KEY.to_string(), LANCE_TABLE_FORMAT.to_string());
        parameters.insert(MANAGED_BY_KEY.to_string(), managed_by.clone());
        if managed_by == MANAGED_BY_IMPL {
            let version = request_properties.get(VERSION_KEY).ok_or_else(|| {
                InvalidInputSnafu {
                    message: format!(
                        "Property '{}' is required when '{}' is '{}'",
                        VERSION_KEY, MANAGED_BY_KEY, MANAGED_BY_IMPL
                    ),
                }
                .build()
            })?;
            parameters.insert(VERSION_KEY.to_string(), version.clone());
        }
        for (key, value) in &request_properties {
            if !matches!(key.as_str(), TABLE_TYPE_KEY | MANAGED_BY_KEY | VERSION_KEY) {
                parameters.insert(key.clone(), value.clone());
            }
        }

        let entry = MetastoreTable {
            db_name: database.clone(),
            table_name: table.clone(),
            owner: request_properties.get("owner").cloned(),
            table_type: EXTERNAL_TABLE.to_string(),
            location: Some(location.clone()),
            parameters,
        };

        match self.client.create_table(entry).await {
            Ok(()) => {}
            Err(MetastoreError::AlreadyExists { .. }) => {
                return TableAlreadyExistsSnafu {
                    message: id.dotted(),
                }
                .fail()
            }
            Err(MetastoreError::NoSuchObject { .. }) => {
                return NamespaceNotFoundSnafu { message: database }.fail()
            }
            Err(e) => return Err(Self::translate("Failed to declare table", e)),
        }

        log::info!("Declared table: {}", id.dotted());
        Ok(DeclareTableResponse {
            location,
            properties: request.properties,
        })
    }

    /// Describe a Lance table.
    ///
    /// An entry of a foreign table format reports `TableNotFound`, since
    /// it is not visible through this interface. A Lance entry without a
    /// location is corrupt and reports `Internal`.
    async fn describe_table(&self, request: DescribeTableRequest) -> Result<DescribeTableResponse> {
        if request.load_detailed_metadata == Some(true) {
            return InvalidInputSnafu {
                message: "load_detailed_metadata=true is not supported for this implementation",
            }
            .fail();
        }

        let id = ObjectIdentifier::validate(&request.id, 1, 3, "table")?;
        let entry = self.load_lance_table(&id).await?;

        let location = entry.location.ok_or_else(|| {
            InternalSnafu {
                message: format!("Table {} has no location", id.dotted()),
            }
            .build()
        })?;

        Ok(DescribeTableResponse {
            location: Some(location),
            storage_options: self.storage_options.clone(),
            properties: Some(entry.parameters),
        })
    }

    async fn table_exists(&self, request: TableExistsRequest) -> Result<()> {
        let id = ObjectIdentifier::validate(&request.id, 1, 3, "table")?;
        self.load_lance_table(&id).await?;
        Ok(())
    }

    /// Remove a table's metastore entry without deleting data.
    ///
    /// Deregistering an absent table succeeds and reports no location.
    async fn deregister_table(
        &self,
        request: DeregisterTableRequest,
    ) -> Result<DeregisterTableResponse> {
        let id = ObjectIdentifier::validate(&request.id, 1, 3, "table")?;
        let (database, table) = self.resolve_table_names(&id)?;

        let Some(entry) = self.load_table(&database, &table).await? else {
            return Ok(DeregisterTableResponse { location: None });
        };
        if !is_lance_table(&entry.parameters) {
            return TableNotFoundSnafu {
                message: format!("{} is not a Lance-managed table", id.dotted()),
            }
            .fail();
        }

        match self.client.drop_table(&database, &table, false).await {
            Ok(()) => {}
            Err(MetastoreError::NoSuchObject { .. }) => {
                return Ok(DeregisterTableResponse { location: None })
            }
            Err(e) => return Err(Self::translate("Failed to deregister table", e)),
        }

        log::info!("Deregistered table: {}", id.dotted());
        Ok(DeregisterTableResponse {
            location: entry.location,
        })
    }

    async fn close(&self) -> Result<()> {
        self.client
            .close()
            .await
            .map_err(|e| Self::translate("Failed to close metastore client", e))
    }

    fn namespace_id(&self) -> String {
        format!("HiveNamespace {{ uri: {:?} }}", self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lance_namespace::ErrorCode;
    use std::sync::Mutex;

    /// In-memory metastore standing in for the Thrift transport.
    #[derive(Debug, Default)]
    struct FakeMetastore {
        state: Mutex<FakeState>,
    }

    #[derive(Debug, Default)]
    struct FakeState {
        catalogs: Vec<String>,
        databases: HashMap<String, MetastoreDatabase>,
        tables: HashMap<(String, String), MetastoreTable>,
    }

    impl FakeMetastore {
        fn with_database(name: &str) -> Arc<Self> {
            let fake = Self::default();
            fake.state.lock().unwrap().databases.insert(
                name.to_string(),
                MetastoreDatabase {
                    name: name.to_string(),
                    ..Default::default()
                },
            );
            Arc::new(fake)
        }
    }

    #[async_trait]
    impl MetastoreClient for FakeMetastore {
        async fn get_catalogs(&self) -> MetastoreResult<Vec<String>> {
            Ok(self.state.lock().unwrap().catalogs.clone())
        }

        async fn get_all_databases(&self) -> MetastoreResult<Vec<String>> {
            Ok(self.state.lock().unwrap().databases.keys().cloned().collect())
        }

        async fn get_database(&self, name: &str) -> MetastoreResult<MetastoreDatabase> {
            self.state
                .lock()
                .unwrap()
                .databases
                .get(name)
                .cloned()
                .ok_or_else(|| MetastoreError::NoSuchObject {
                    message: name.to_string(),
                })
        }

        async fn create_database(&self, database: MetastoreDatabase) -> MetastoreResult<()> {
            let mut state = self.state.lock().unwrap();
            if state.databases.contains_key(&database.name) {
                return Err(MetastoreError::AlreadyExists {
                    message: database.name,
                });
            }
            state.databases.insert(database.name.clone(), database);
            Ok(())
        }

        async fn drop_database(
            &self,
            name: &str,
            _delete_data: bool,
            cascade: bool,
        ) -> MetastoreResult<()> {
            let mut state = self.state.lock().unwrap();
            if state.databases.remove(name).is_none() {
                return Err(MetastoreError::NoSuchObject {
                    message: name.to_string(),
                });
            }
            if cascade {
                state.tables.retain(|(db, _), _| db != name);
            }
            Ok(())
        }

        async fn get_all_tables(&self, database: &str) -> MetastoreResult<Vec<String>> {
            let state = self.state.lock().unwrap();
            if !state.databases.contains_key(database) {
                return Err(MetastoreError::NoSuchObject {
                    message: database.to_string(),
                });
            }
            Ok(state
                .tables
                .keys()
                .filter(|(db, _)| db == database)
                .map(|(_, table)| table.clone())
                .collect())
        }

        async fn get_table(&self, database: &str, table: &str) -> MetastoreResult<MetastoreTable> {
            self.state
                .lock()
                .unwrap()
                .tables
                .get(&(database.to_string(), table.to_string()))
                .cloned()
                .ok_or_else(|| MetastoreError::NoSuchObject {
                    message: format!("{}.{}", database, table),
                })
        }

        async fn create_table(&self, table: MetastoreTable) -> MetastoreResult<()> {
            let mut state = self.state.lock().unwrap();
            if !state.databases.contains_key(&table.db_name) {
                return Err(MetastoreError::NoSuchObject {
                    message: table.db_name,
                });
            }
            let key = (table.db_name.clone(), table.table_name.clone());
            if state.tables.contains_key(&key) {
                return Err(MetastoreError::AlreadyExists {
                    message: table.table_name,
                });
            }
            state.tables.insert(key, table);
            Ok(())
        }

        async fn drop_table(
            &self,
            database: &str,
            table: &str,
            _delete_data: bool,
        ) -> MetastoreResult<()> {
            let mut state = self.state.lock().unwrap();
            state
                .tables
                .remove(&(database.to_string(), table.to_string()))
                .map(|_| ())
                .ok_or_else(|| MetastoreError::NoSuchObject {
                    message: format!("{}.{}", database, table),
                })
        }

        async fn close(&self) -> MetastoreResult<()> {
            Ok(())
        }
    }

    fn namespace_with(client: Arc<FakeMetastore>) -> HiveNamespace {
        HiveNamespaceBuilder::new("thrift://localhost:9083", client)
            .root("/warehouse")
            .build()
    }

    fn ids(parts: &[&str]) -> Option<Vec<String>> {
        Some(parts.iter().map(|s| s.to_string()).collect())
    }

    fn declare(db: &str, table: &str) -> DeclareTableRequest {
        DeclareTableRequest {
            id: ids(&["hive", db, table]),
            location: format!("/data/{}", table),
            properties: None,
        }
    }

    #[tokio::test]
    async fn test_list_root_falls_back_to_default_catalog() {
        let namespace = namespace_with(Arc::new(FakeMetastore::default()));
        let response = namespace
            .list_namespaces(ListNamespacesRequest::default())
            .await
            .unwrap();
        assert_eq!(response.namespaces, vec!["hive"]);
    }

    #[tokio::test]
    async fn test_list_databases_excludes_default() {
        let client = FakeMetastore::with_database("default");
        client.state.lock().unwrap().databases.insert(
            "sales".to_string(),
            MetastoreDatabase {
                name: "sales".to_string(),
                ..Default::default()
            },
        );
        let namespace = namespace_with(client);
        let response = namespace
            .list_namespaces(ListNamespacesRequest {
                id: ids(&["hive"]),
                page_token: None,
            })
            .await
            .unwrap();
        assert_eq!(response.namespaces, vec!["sales"]);
    }

    #[tokio::test]
    async fn test_catalog_create_and_drop_are_unsupported() {
        let namespace = namespace_with(Arc::new(FakeMetastore::default()));

        let err = namespace
            .create_namespace(CreateNamespaceRequest {
                id: ids(&["spark_catalog"]),
                properties: None,
                mode: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unsupported);

        let err = namespace
            .drop_namespace(DropNamespaceRequest {
                id: ids(&["spark_catalog"]),
                behavior: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unsupported);
    }

    #[tokio::test]
    async fn test_create_database_modes() {
        let client = Arc::new(FakeMetastore::default());
        let namespace = namespace_with(client.clone());
        let request = CreateNamespaceRequest {
            id: ids(&["hive", "sales"]),
            properties: None,
            mode: None,
        };

        namespace.create_namespace(request.clone()).await.unwrap();

        // Strict create conflicts on the second attempt.
        let err = namespace.create_namespace(request.clone()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NamespaceAlreadyExists);

        // exist_ok tolerates the existing database.
        namespace
            .create_namespace(CreateNamespaceRequest {
                mode: Some(CreateMode::ExistOk),
                ..request.clone()
            })
            .await
            .unwrap();

        // overwrite drops children and recreates.
        namespace.declare_table(declare("sales", "orders")).await.unwrap();
        namespace
            .create_namespace(CreateNamespaceRequest {
                mode: Some(CreateMode::Overwrite),
                ..request
            })
            .await
            .unwrap();
        let tables = namespace
            .list_tables(ListTablesRequest {
                id: ids(&["hive", "sales"]),
                page_token: None,
            })
            .await
            .unwrap();
        assert!(tables.tables.is_empty());
    }

    #[tokio::test]
    async fn test_create_database_maps_reserved_properties() {
        let client = Arc::new(FakeMetastore::default());
        let namespace = namespace_with(client.clone());

        let mut properties = HashMap::new();
        properties.insert("comment".to_string(), "sales data".to_string());
        properties.insert("owner".to_string(), "me".to_string());
        properties.insert("team".to_string(), "finance".to_string());
        namespace
            .create_namespace(CreateNamespaceRequest {
                id: ids(&["hive", "sales"]),
                properties: Some(properties),
                mode: None,
            })
            .await
            .unwrap();

        let described = namespace
            .describe_namespace(DescribeNamespaceRequest {
                id: ids(&["hive", "sales"]),
            })
            .await
            .unwrap();
        assert_eq!(described.properties.get("comment").map(String::as_str), Some("sales data"));
        assert_eq!(described.properties.get("owner").map(String::as_str), Some("me"));
        assert_eq!(described.properties.get("team").map(String::as_str), Some("finance"));
        assert_eq!(
            described.properties.get("location").map(String::as_str),
            Some("/warehouse/sales")
        );
    }

    #[tokio::test]
    async fn test_drop_database_restrict_semantics() {
        let client = FakeMetastore::with_database("sales");
        let namespace = namespace_with(client);
        namespace.declare_table(declare("sales", "orders")).await.unwrap();

        let err = namespace
            .drop_namespace(DropNamespaceRequest {
                id: ids(&["hive", "sales"]),
                behavior: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NamespaceNotEmpty);

        namespace
            .deregister_table(DeregisterTableRequest {
                id: ids(&["hive", "sales", "orders"]),
            })
            .await
            .unwrap();
        namespace
            .drop_namespace(DropNamespaceRequest {
                id: ids(&["hive", "sales"]),
                behavior: None,
            })
            .await
            .unwrap();

        // Dropping again is idempotent.
        namespace
            .drop_namespace(DropNamespaceRequest {
                id: ids(&["hive", "sales"]),
                behavior: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_declare_describe_round_trip() {
        let client = FakeMetastore::with_database("sales");
        let namespace = namespace_with(client);

        let declared = namespace.declare_table(declare("sales", "orders")).await.unwrap();
        assert_eq!(declared.location, "/data/orders");

        let described = namespace
            .describe_table(DescribeTableRequest {
                id: ids(&["hive", "sales", "orders"]),
                load_detailed_metadata: None,
            })
            .await
            .unwrap();
        assert_eq!(described.location.as_deref(), Some("/data/orders"));
        let properties = described.properties.unwrap();
        assert_eq!(properties.get(TABLE_TYPE_KEY).map(String::as_str), Some("lance"));
        assert_eq!(properties.get(MANAGED_BY_KEY).map(String::as_str), Some("storage"));
    }

    #[tokio::test]
    async fn test_declare_table_defaults_location() {
        let client = FakeMetastore::with_database("sales");
        let namespace = namespace_with(client);

        let declared = namespace
            .declare_table(DeclareTableRequest {
                id: ids(&["hive", "sales", "orders"]),
                location: String::new(),
                properties: None,
            })
            .await
            .unwrap();
        assert_eq!(declared.location, "/warehouse/sales/orders.lance");
    }

    #[tokio::test]
    async fn test_declare_table_impl_managed_requires_version() {
        let client = FakeMetastore::with_database("sales");
        let namespace = namespace_with(client.clone());

        let mut properties = HashMap::new();
        properties.insert(MANAGED_BY_KEY.to_string(), "impl".to_string());
        let err = namespace
            .declare_table(DeclareTableRequest {
                properties: Some(properties.clone()),
                ..declare("sales", "orders")
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);

        properties.insert(VERSION_KEY.to_string(), "7".to_string());
        namespace
            .declare_table(DeclareTableRequest {
                properties: Some(properties),
                ..declare("sales", "orders")
            })
            .await
            .unwrap();
        let entry = client
            .get_table("sales", "orders")
            .await
            .unwrap();
        assert_eq!(entry.parameters.get(VERSION_KEY).map(String::as_str), Some("7"));
    }

    #[tokio::test]
    async fn test_declare_table_conflicts() {
        let client = FakeMetastore::with_database("sales");
        let namespace = namespace_with(client);

        namespace.declare_table(declare("sales", "orders")).await.unwrap();
        let err = namespace
            .declare_table(declare("sales", "orders"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TableAlreadyExists);

        let err = namespace.declare_table(declare("ghost", "orders")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NamespaceNotFound);
    }

    #[tokio::test]
    async fn test_short_identifiers_left_pad_defaults() {
        let client = FakeMetastore::with_database("default");
        let namespace = namespace_with(client);

        namespace
            .declare_table(DeclareTableRequest {
                id: ids(&["orders"]),
                location: "/data/orders".to_string(),
                properties: None,
            })
            .await
            .unwrap();

        namespace
            .table_exists(TableExistsRequest {
                id: ids(&["default", "orders"]),
            })
            .await
            .unwrap();
        namespace
            .table_exists(TableExistsRequest {
                id: ids(&["hive", "default", "orders"]),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_tables_filters_foreign_formats() {
        let client = FakeMetastore::with_database("sales");
        client.state.lock().unwrap().tables.insert(
            ("sales".to_string(), "parquet_native".to_string()),
            MetastoreTable {
                db_name: "sales".to_string(),
                table_name: "parquet_native".to_string(),
                table_type: EXTERNAL_TABLE.to_string(),
                ..Default::default()
            },
        );
        let namespace = namespace_with(client);
        namespace.declare_table(declare("sales", "orders")).await.unwrap();

        let response = namespace
            .list_tables(ListTablesRequest {
                id: ids(&["hive", "sales"]),
                page_token: None,
            })
            .await
            .unwrap();
        assert_eq!(response.tables, vec!["orders"]);
    }

    #[tokio::test]
    async fn test_describe_foreign_table_reports_not_found() {
        let client = FakeMetastore::with_database("sales");
        client.state.lock().unwrap().tables.insert(
            ("sales".to_string(), "parquet_native".to_string()),
            MetastoreTable {
                db_name: "sales".to_string(),
                table_name: "parquet_native".to_string(),
                table_type: EXTERNAL_TABLE.to_string(),
                location: Some("/data/native".to_string()),
                ..Default::default()
            },
        );
        let namespace = namespace_with(client);

        let err = namespace
            .describe_table(DescribeTableRequest {
                id: ids(&["hive", "sales", "parquet_native"]),
                load_detailed_metadata: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_describe_table_returns_storage_options() {
        let client = FakeMetastore::with_database("sales");
        let mut props = HashMap::new();
        props.insert(HiveNamespaceBuilder::URI.to_string(), "thrift://localhost:9083".to_string());
        props.insert("storage.aws_region".to_string(), "us-east-1".to_string());
        let namespace = HiveNamespaceBuilder::from_properties(props, client)
            .unwrap()
            .build();
        namespace.declare_table(declare("sales", "orders")).await.unwrap();

        let described = namespace
            .describe_table(DescribeTableRequest {
                id: ids(&["hive", "sales", "orders"]),
                load_detailed_metadata: None,
            })
            .await
            .unwrap();
        assert_eq!(
            described.storage_options.get("aws_region").map(String::as_str),
            Some("us-east-1")
        );
    }

    #[tokio::test]
    async fn test_deregister_table_keeps_data_and_is_idempotent() {
        let client = FakeMetastore::with_database("sales");
        let namespace = namespace_with(client);
        namespace.declare_table(declare("sales", "orders")).await.unwrap();

        let response = namespace
            .deregister_table(DeregisterTableRequest {
                id: ids(&["hive", "sales", "orders"]),
            })
            .await
            .unwrap();
        assert_eq!(response.location.as_deref(), Some("/data/orders"));

        let response = namespace
            .deregister_table(DeregisterTableRequest {
                id: ids(&["hive", "sales", "orders"]),
            })
            .await
            .unwrap();
        assert!(response.location.is_none());
    }

    #[tokio::test]
    async fn test_describe_table_rejects_detailed_metadata() {
        let namespace = namespace_with(Arc::new(FakeMetastore::default()));
        let err = namespace
            .describe_table(DescribeTableRequest {
                id: ids(&["hive", "sales", "orders"]),
                load_detailed_metadata: Some(true),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }
}
