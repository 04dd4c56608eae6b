use apstore_types::TypeError;

/// Errors from storage operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StorageError {
    /// The requested key is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// The stored value is not the expected variant.
    #[error("type mismatch at {iri}: expected {expected}, found {found}")]
    TypeMismatch {
        iri: String,
        expected: &'static str,
        found: String,
    },

    /// Empty or bare item, or malformed IRI.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Credentials did not match.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Encoding failure, poisoned lock, or another broken internal invariant.
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    pub(crate) fn not_found(what: &str, key: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{what} {key}"))
    }

    pub(crate) fn mismatch(iri: impl std::fmt::Display, expected: &'static str, found: &str) -> Self {
        Self::TypeMismatch {
            iri: iri.to_string(),
            expected,
            found: found.to_string(),
        }
    }

    pub(crate) fn poisoned(what: impl std::fmt::Display) -> Self {
        Self::Internal(format!("lock poisoned for {what}"))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<TypeError> for StorageError {
    fn from(value: TypeError) -> Self {
        match value {
            TypeError::TypeMismatch { expected, found } => Self::TypeMismatch {
                iri: String::new(),
                expected,
                found,
            },
            other => Self::InvalidArgument(other.to_string()),
        }
    }
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from loading a [`StoreConfig`](crate::StoreConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
