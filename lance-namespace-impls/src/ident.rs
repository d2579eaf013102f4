// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Hierarchical object identifiers.
//!
//! A namespace or table is located by an ordered list of name segments,
//! outermost first. How deep an identifier may be is backend policy: the
//! Gravitino REST backend caps namespaces at two levels
//! (catalog.schema), while metastore-style backends always resolve to
//! three (catalog.database.table) by left-padding short identifiers with
//! configured defaults.

use lance_namespace::error::{InvalidInputSnafu, Result};

/// A validated hierarchical identifier for a namespace or table.
///
/// Segments are opaque non-empty strings. The empty identifier denotes
/// the root namespace, which only exists for backends that define a root
/// level; root can be listed and described but never created or dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    levels: Vec<String>,
}

impl ObjectIdentifier {
    /// The root identifier (zero levels).
    pub fn root() -> Self {
        Self { levels: Vec::new() }
    }

    /// Validate a request identifier against an operation's depth bounds.
    ///
    /// Rejects empty segments and out-of-range depth with `InvalidInput`
    /// before any wire call is issued. A missing identifier is treated as
    /// root (depth 0).
    pub fn validate(
        id: &Option<Vec<String>>,
        min_depth: usize,
        max_depth: usize,
        what: &str,
    ) -> Result<Self> {
        let levels = id.clone().unwrap_or_default();
        if levels.iter().any(|segment| segment.is_empty()) {
            return InvalidInputSnafu {
                message: format!("{} identifier contains an empty segment: {:?}", what, levels),
            }
            .fail();
        }
        if levels.len() < min_depth || levels.len() > max_depth {
            return InvalidInputSnafu {
                message: format!(
                    "{} identifier must have {} to {} levels, got {}: {:?}",
                    what,
                    min_depth,
                    max_depth,
                    levels.len(),
                    levels
                ),
            }
            .fail();
        }
        Ok(Self { levels })
    }

    pub fn is_root(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of levels in this identifier.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// The last segment, or the empty string for root.
    pub fn name(&self) -> &str {
        self.levels
            .last()
            .map(|s| s.as_str())
            .unwrap_or_default()
    }

    /// All segments except the last.
    pub fn parent(&self) -> &[String] {
        if self.levels.is_empty() {
            &[]
        } else {
            &self.levels[..self.levels.len() - 1]
        }
    }

    /// Human-readable dotted rendering, e.g. `cat1.sch1.t1`.
    pub fn dotted(&self) -> String {
        self.levels.join(".")
    }
}

impl From<Vec<String>> for ObjectIdentifier {
    fn from(levels: Vec<String>) -> Self {
        Self { levels }
    }
}

/// Default segments used to left-pad identifiers for backends whose
/// native hierarchy is deeper than the caller-supplied identifier.
///
/// This is backend policy, carried in each adapter's configuration rather
/// than hardcoded, so callers against one backend are not coupled to
/// another backend's conventions.
#[derive(Debug, Clone)]
pub struct IdentifierDefaults {
    pub catalog: String,
    pub database: String,
}

impl IdentifierDefaults {
    /// Resolve a 1-3 level identifier to `(catalog, database, table)`.
    ///
    /// A single segment is a bare table name in the default
    /// catalog/database; two segments are database.table in the default
    /// catalog.
    pub fn resolve_table(&self, id: &ObjectIdentifier) -> Result<(String, String, String)> {
        match id.levels() {
            [table] => Ok((self.catalog.clone(), self.database.clone(), table.clone())),
            [database, table] => Ok((self.catalog.clone(), database.clone(), table.clone())),
            [catalog, database, table] => Ok((catalog.clone(), database.clone(), table.clone())),
            other => InvalidInputSnafu {
                message: format!("table identifier must have 1 to 3 levels, got {:?}", other),
            }
            .fail(),
        }
    }

    /// Resolve a 1-2 level namespace identifier to `(catalog, database)`.
    pub fn resolve_database(&self, id: &ObjectIdentifier) -> Result<(String, String)> {
        match id.levels() {
            [database] => Ok((self.catalog.clone(), database.clone())),
            [catalog, database] => Ok((catalog.clone(), database.clone())),
            other => InvalidInputSnafu {
                message: format!(
                    "namespace identifier must have 1 to 2 levels, got {:?}",
                    other
                ),
            }
            .fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lance_namespace::ErrorCode;

    fn id(parts: &[&str]) -> Option<Vec<String>> {
        Some(parts.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_validate_depth_bounds() {
        let ok = ObjectIdentifier::validate(&id(&["cat", "sch"]), 1, 2, "namespace").unwrap();
        assert_eq!(ok.depth(), 2);
        assert_eq!(ok.dotted(), "cat.sch");

        let too_deep = ObjectIdentifier::validate(&id(&["a", "b", "c"]), 1, 2, "namespace");
        assert_eq!(too_deep.unwrap_err().code(), ErrorCode::InvalidInput);

        let too_shallow = ObjectIdentifier::validate(&None, 1, 2, "namespace");
        assert_eq!(too_shallow.unwrap_err().code(), ErrorCode::InvalidInput);
    }

    #[test]
    fn test_validate_rejects_empty_segment() {
        let err = ObjectIdentifier::validate(&id(&["cat", ""]), 1, 2, "namespace");
        assert_eq!(err.unwrap_err().code(), ErrorCode::InvalidInput);
    }

    #[test]
    fn test_root_identifier() {
        let root = ObjectIdentifier::validate(&None, 0, 1, "namespace").unwrap();
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.dotted(), "");
    }

    #[test]
    fn test_parent_and_name() {
        let table = ObjectIdentifier::validate(&id(&["cat", "sch", "t1"]), 3, 3, "table").unwrap();
        assert_eq!(table.name(), "t1");
        assert_eq!(table.parent(), &["cat".to_string(), "sch".to_string()]);
    }

    #[test]
    fn test_resolve_table_left_pads_defaults() {
        let defaults = IdentifierDefaults {
            catalog: "hive".to_string(),
            database: "default".to_string(),
        };

        let one = ObjectIdentifier::from(vec!["t1".to_string()]);
        assert_eq!(
            defaults.resolve_table(&one).unwrap(),
            ("hive".into(), "default".into(), "t1".into())
        );

        let two = ObjectIdentifier::from(vec!["db".to_string(), "t1".to_string()]);
        assert_eq!(
            defaults.resolve_table(&two).unwrap(),
            ("hive".into(), "db".into(), "t1".into())
        );

        let three = ObjectIdentifier::from(vec![
            "cat".to_string(),
            "db".to_string(),
            "t1".to_string(),
        ]);
        assert_eq!(
            defaults.resolve_table(&three).unwrap(),
            ("cat".into(), "db".into(), "t1".into())
        );
    }

    #[test]
    fn test_resolve_database() {
        let defaults = IdentifierDefaults {
            catalog: "hive".to_string(),
            database: "default".to_string(),
        };
        let one = ObjectIdentifier::from(vec!["db".to_string()]);
        assert_eq!(
            defaults.resolve_database(&one).unwrap(),
            ("hive".into(), "db".into())
        );
    }
}
