// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Lance table filtering for backends with a broader table concept.
//!
//! Hive- and Iceberg-style catalogs hold tables of any format; a catalog
//! entry counts as Lance-managed only when its stored properties carry the
//! reserved `table_type` marker. List operations against such backends
//! must return only the Lance-managed subset, which costs one describe
//! call per candidate table since neither wire protocol offers a batched
//! property lookup.

use std::collections::HashMap;

/// Reserved property key marking an entry's table format.
pub const TABLE_TYPE_KEY: &str = "table_type";

/// Property value identifying a Lance-managed table.
pub const LANCE_TABLE_FORMAT: &str = "lance";

/// Reserved property key recording who manages table versions.
pub const MANAGED_BY_KEY: &str = "managed_by";

/// Reserved property key recording the pinned table version when the
/// catalog manages versions (`managed_by=impl`).
pub const VERSION_KEY: &str = "version";

/// Whether stored properties mark an entry as a Lance-managed table.
///
/// The comparison is case-insensitive on the value; a missing key means
/// the entry belongs to a foreign format.
pub fn is_lance_table(properties: &HashMap<String, String>) -> bool {
    properties
        .get(TABLE_TYPE_KEY)
        .map(|v| v.eq_ignore_ascii_case(LANCE_TABLE_FORMAT))
        .unwrap_or(false)
}
