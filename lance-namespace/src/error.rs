// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Lance Namespace error types.
//!
//! This module defines the error taxonomy shared by all Lance Namespace
//! backends. Each backend adapter translates its native failure signals
//! (HTTP status codes, metastore exception types, sentinel response shapes)
//! into exactly one of these variants; once raised, a [`NamespaceError`]
//! propagates to the caller unchanged.
//!
//! Each error kind has a stable numeric [`ErrorCode`] so callers can handle
//! errors programmatically across language boundaries.

use snafu::Snafu;

/// Lance Namespace error codes.
///
/// These codes are stable across all Lance Namespace implementations.
/// Use them for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    /// Operation not supported by this backend
    Unsupported = 0,
    /// The specified namespace does not exist
    NamespaceNotFound = 1,
    /// A namespace with this name already exists
    NamespaceAlreadyExists = 2,
    /// Namespace contains tables or child namespaces
    NamespaceNotEmpty = 3,
    /// The specified table does not exist
    TableNotFound = 4,
    /// A table with this name already exists
    TableAlreadyExists = 5,
    /// Malformed request or invalid parameters
    InvalidInput = 6,
    /// Unexpected backend or implementation error
    Internal = 7,
}

impl ErrorCode {
    /// Returns the numeric code value.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Creates an ErrorCode from a numeric code.
    ///
    /// Returns `None` if the code is not recognized.
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Unsupported),
            1 => Some(Self::NamespaceNotFound),
            2 => Some(Self::NamespaceAlreadyExists),
            3 => Some(Self::NamespaceNotEmpty),
            4 => Some(Self::TableNotFound),
            5 => Some(Self::TableAlreadyExists),
            6 => Some(Self::InvalidInput),
            7 => Some(Self::Internal),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unsupported => "Unsupported",
            Self::NamespaceNotFound => "NamespaceNotFound",
            Self::NamespaceAlreadyExists => "NamespaceAlreadyExists",
            Self::NamespaceNotEmpty => "NamespaceNotEmpty",
            Self::TableNotFound => "TableNotFound",
            Self::TableAlreadyExists => "TableAlreadyExists",
            Self::InvalidInput => "InvalidInput",
            Self::Internal => "Internal",
        };
        write!(f, "{}", name)
    }
}

/// Lance Namespace error type.
///
/// Every variant corresponds to one shared error condition; the associated
/// [`ErrorCode`] is accessible via [`code()`](NamespaceError::code).
///
/// Translation policy: backend-native errors are converted exactly once at
/// the adapter boundary. Adapters must check whether an error is already a
/// `NamespaceError` before wrapping, so a translated error is never
/// double-wrapped into `Internal`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum NamespaceError {
    /// Operation not supported by this backend.
    #[snafu(display("Unsupported: {message}"))]
    Unsupported { message: String },

    /// The specified namespace does not exist.
    #[snafu(display("Namespace not found: {message}"))]
    NamespaceNotFound { message: String },

    /// A namespace with this name already exists.
    #[snafu(display("Namespace already exists: {message}"))]
    NamespaceAlreadyExists { message: String },

    /// Namespace contains tables or child namespaces.
    #[snafu(display("Namespace not empty: {message}"))]
    NamespaceNotEmpty { message: String },

    /// The specified table does not exist.
    #[snafu(display("Table not found: {message}"))]
    TableNotFound { message: String },

    /// A table with this name already exists.
    #[snafu(display("Table already exists: {message}"))]
    TableAlreadyExists { message: String },

    /// Malformed request or invalid parameters.
    #[snafu(display("Invalid input: {message}"))]
    InvalidInput { message: String },

    /// Unexpected backend or implementation error.
    #[snafu(display("Internal error: {message}"))]
    Internal { message: String },
}

impl NamespaceError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unsupported { .. } => ErrorCode::Unsupported,
            Self::NamespaceNotFound { .. } => ErrorCode::NamespaceNotFound,
            Self::NamespaceAlreadyExists { .. } => ErrorCode::NamespaceAlreadyExists,
            Self::NamespaceNotEmpty { .. } => ErrorCode::NamespaceNotEmpty,
            Self::TableNotFound { .. } => ErrorCode::TableNotFound,
            Self::TableAlreadyExists { .. } => ErrorCode::TableAlreadyExists,
            Self::InvalidInput { .. } => ErrorCode::InvalidInput,
            Self::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Creates a NamespaceError from an error code and message.
    ///
    /// Useful when receiving errors from a REST server or another language
    /// binding. Unknown codes map to `Internal`.
    pub fn from_code(code: u32, message: impl Into<String>) -> Self {
        let message = message.into();
        match ErrorCode::from_u32(code) {
            Some(ErrorCode::Unsupported) => Self::Unsupported { message },
            Some(ErrorCode::NamespaceNotFound) => Self::NamespaceNotFound { message },
            Some(ErrorCode::NamespaceAlreadyExists) => Self::NamespaceAlreadyExists { message },
            Some(ErrorCode::NamespaceNotEmpty) => Self::NamespaceNotEmpty { message },
            Some(ErrorCode::TableNotFound) => Self::TableNotFound { message },
            Some(ErrorCode::TableAlreadyExists) => Self::TableAlreadyExists { message },
            Some(ErrorCode::InvalidInput) => Self::InvalidInput { message },
            Some(ErrorCode::Internal) | None => Self::Internal { message },
        }
    }
}

/// Result type for namespace operations.
pub type Result<T> = std::result::Result<T, NamespaceError>;
