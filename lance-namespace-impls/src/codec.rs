// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Backend path encoding codecs.
//!
//! Each REST backend renders a multi-level identifier into a single URL
//! path component with its own delimiter and escaping convention:
//!
//! - Gravitino joins percent-encoded segments with a literal `%24` (an
//!   encoded `$`), and renders the root namespace as `%2E` (an encoded
//!   `.`). A literal `$` inside a segment stays raw, so the delimiter
//!   never collides with segment content and decoding splits exactly.
//! - Iceberg-style catalogs percent-encode each segment, join with the
//!   non-printable unit separator `\x1F`, then percent-encode the joined
//!   string as a whole.
//!
//! Decoding is the exact inverse of encoding, so composite identifiers
//! returned in listing responses round-trip back to their segments.

use lance_namespace::error::{InvalidInputSnafu, Result};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Percent-encode everything except unreserved characters (RFC 3986),
/// matching `urllib.parse.quote(s, safe="")`.
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'-')
    .remove(b'.')
    .remove(b'~');

/// Segment set for dollar-joined paths. `$` stays raw: every other
/// occurrence of `%24` in an encoded segment is impossible (`%` itself
/// is escaped to `%25`), so splitting on the delimiter is unambiguous.
const DOLLAR_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'-')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$');

/// Delimiter joining Gravitino path segments: a percent-encoded `$`.
const DOLLAR_DELIMITER: &str = "%24";

/// Path token for the root namespace in Gravitino: a percent-encoded `.`.
pub const ROOT_PATH_TOKEN: &str = "%2E";

/// Unit separator joining Iceberg namespace segments before the final
/// whole-string encoding pass.
const UNIT_SEPARATOR: char = '\u{1F}';

/// Percent-encode a single path segment with an empty safe set.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT_ENCODE_SET).to_string()
}

/// Inverse of [`encode_segment`].
pub fn decode_segment(segment: &str) -> Result<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.to_string())
        .map_err(|e| {
            InvalidInputSnafu {
                message: format!("invalid percent-encoded segment {:?}: {}", segment, e),
            }
            .build()
        })
}

/// Encode an identifier into a Gravitino wire path: percent-encoded
/// segments joined with `%24`, root rendered as `%2E`.
pub fn encode_dollar_path(segments: &[String]) -> String {
    if segments.is_empty() {
        return ROOT_PATH_TOKEN.to_string();
    }
    segments
        .iter()
        .map(|s| utf8_percent_encode(s, DOLLAR_SEGMENT_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join(DOLLAR_DELIMITER)
}

/// Inverse of [`encode_dollar_path`]. The root token decodes to an empty
/// segment list.
pub fn decode_dollar_path(path: &str) -> Result<Vec<String>> {
    if path.is_empty() || path == ROOT_PATH_TOKEN {
        return Ok(Vec::new());
    }
    path.split(DOLLAR_DELIMITER)
        .map(decode_segment)
        .collect()
}

/// Encode an identifier into an Iceberg wire path: percent-encode each
/// segment, join with the unit separator, percent-encode the whole.
pub fn encode_unit_sep_path(segments: &[String]) -> String {
    let joined = segments
        .iter()
        .map(|s| encode_segment(s))
        .collect::<Vec<_>>()
        .join(&UNIT_SEPARATOR.to_string());
    utf8_percent_encode(&joined, SEGMENT_ENCODE_SET).to_string()
}

/// Inverse of [`encode_unit_sep_path`].
pub fn decode_unit_sep_path(path: &str) -> Result<Vec<String>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let joined = decode_segment(path)?;
    joined
        .split(UNIT_SEPARATOR)
        .map(decode_segment)
        .collect()
}

/// Join decoded segments into the human-readable dotted rendering used in
/// listing responses, e.g. `parent.child`.
pub fn dotted(segments: &[String]) -> String {
    segments.join(".")
}
