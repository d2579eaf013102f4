// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Connect functionality for Lance Namespace implementations.

use std::collections::HashMap;
use std::sync::Arc;

use lance_namespace::error::{InvalidInputSnafu, Result, UnsupportedSnafu};
use lance_namespace::LanceNamespace;

/// Connect to a Lance namespace implementation.
///
/// # Arguments
///
/// * `impl_name` - Implementation identifier. Supported values:
///   - "gravitino": Gravitino REST implementation (requires "gravitino"
///     feature)
///   - "iceberg": Iceberg REST catalog implementation (requires "iceberg"
///     feature)
///
///   The Hive implementation needs an injected metastore transport and is
///   constructed through
///   [`HiveNamespaceBuilder`](crate::hive::HiveNamespaceBuilder) instead.
///
/// * `properties` - Configuration properties specific to the
///   implementation:
///   - For Gravitino: "endpoint" (server URL), "auth_token",
///     "connect_timeout", "read_timeout", "max_retries"
///   - For Iceberg: "iceberg.endpoint" (catalog URL), "iceberg.prefix",
///     "iceberg.warehouse", "iceberg.auth_token", "iceberg.root"
///
/// # Examples
///
/// ```no_run
/// use lance_namespace_impls::connect;
/// use std::collections::HashMap;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut props = HashMap::new();
/// props.insert("endpoint".to_string(), "http://localhost:9101".to_string());
/// let namespace = connect("gravitino", props).await?;
/// # Ok(())
/// # }
/// ```
pub async fn connect(
    impl_name: &str,
    #[allow(unused)] properties: HashMap<String, String>,
) -> Result<Arc<dyn LanceNamespace>> {
    match impl_name {
        #[cfg(feature = "gravitino")]
        "gravitino" => {
            let builder = crate::gravitino::GravitinoNamespaceBuilder::from_properties(properties)?;
            Ok(Arc::new(builder.build()))
        }
        #[cfg(not(feature = "gravitino"))]
        "gravitino" => UnsupportedSnafu {
            message:
                "Gravitino namespace implementation requires 'gravitino' feature to be enabled",
        }
        .fail(),
        #[cfg(feature = "iceberg")]
        "iceberg" => {
            let builder = crate::iceberg::IcebergNamespaceBuilder::from_properties(properties)?;
            Ok(Arc::new(builder.build()))
        }
        #[cfg(not(feature = "iceberg"))]
        "iceberg" => UnsupportedSnafu {
            message: "Iceberg namespace implementation requires 'iceberg' feature to be enabled",
        }
        .fail(),
        "hive" => UnsupportedSnafu {
            message: "Hive namespace needs an injected metastore transport; \
                      construct it through HiveNamespaceBuilder instead",
        }
        .fail(),
        _ => InvalidInputSnafu {
            message: format!(
                "Implementation '{}' is not available. Supported: {}",
                impl_name,
                ["gravitino", "iceberg"]
                    .iter()
                    .filter(|name| match **name {
                        "gravitino" => cfg!(feature = "gravitino"),
                        "iceberg" => cfg!(feature = "iceberg"),
                        _ => false,
                    })
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
        .fail(),
    }
}

/// Builder-style entry point for [`connect`].
///
/// # Examples
///
/// ```no_run
/// # use lance_namespace_impls::ConnectBuilder;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let namespace = ConnectBuilder::new("iceberg")
///     .property("iceberg.endpoint", "http://localhost:8181/v1")
///     .connect()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConnectBuilder {
    impl_name: String,
    properties: HashMap<String, String>,
}

impl ConnectBuilder {
    pub fn new(impl_name: impl Into<String>) -> Self {
        Self {
            impl_name: impl_name.into(),
            properties: HashMap::new(),
        }
    }

    /// Set a single configuration property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Merge a map of configuration properties.
    pub fn properties(mut self, properties: HashMap<String, String>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub async fn connect(self) -> Result<Arc<dyn LanceNamespace>> {
        connect(&self.impl_name, self.properties).await
    }
}
