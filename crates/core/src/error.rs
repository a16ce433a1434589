//! Error types for Flowdex.

use thiserror::Error;

/// Result type alias for Flowdex operations.
pub type Result<T> = core::result::Result<T, Error>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error types for cache, query and storage operations.
///
/// Every variant fails the whole operation it was raised from; no caller
/// ever receives a partial result set alongside an error.
#[derive(Debug, Error)]
pub enum Error {
    /// A filter, sort or translation referenced a field the record schema does not declare.
    #[error("field `{field}` not found in record `{record}`")]
    FieldNotFound { record: String, field: String },

    /// An operand is incompatible with the declared type or shape of its field.
    #[error("type mismatch on field `{field}`: expected {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// An `and`/`or` composite was built without children.
    #[error("`{combinator}` requires at least one child expression")]
    EmptyComposite { combinator: &'static str },

    /// A filter leaf was built with the wrong operand arity.
    #[error("invalid filter: {message}")]
    InvalidFilter { message: String },

    /// Invalid record schema definition.
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    /// The persistent backend could not execute an operation.
    #[error("storage unavailable: {message}")]
    StorageUnavailable {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A value could not be converted to or from its storage representation.
    #[error("codec error: {message}")]
    Codec {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A cache was bound twice to the same collection.
    #[error("cache `{name}` is already registered")]
    DuplicateCache { name: String },

    /// Invalid service configuration.
    #[error("invalid configuration: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl Error {
    /// Creates a field not found error.
    pub fn field_not_found(record: impl Into<String>, field: impl Into<String>) -> Self {
        Error::FieldNotFound {
            record: record.into(),
            field: field.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates an empty composite error.
    pub fn empty_composite(combinator: &'static str) -> Self {
        Error::EmptyComposite { combinator }
    }

    /// Creates an invalid filter error.
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Error::InvalidFilter {
            message: message.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a storage unavailable error without an underlying cause.
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Error::StorageUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a storage unavailable error wrapping the backend failure.
    pub fn storage(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::StorageUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a codec error wrapping the conversion failure.
    pub fn codec(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Codec {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a duplicate cache error.
    pub fn duplicate_cache(name: impl Into<String>) -> Self {
        Error::DuplicateCache { name: name.into() }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error wrapping the read or parse failure.
    pub fn config_from(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true for errors caused by the request itself rather than the backend.
    ///
    /// Request errors are not retryable: the caller has to fix the request.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Error::FieldNotFound { .. }
                | Error::TypeMismatch { .. }
                | Error::EmptyComposite { .. }
                | Error::InvalidFilter { .. }
        )
    }
}
