use apstore_types::TypeError;

/// Errors from building, encoding, or decoding filter checks.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    /// The query string could not be decoded into checks.
    #[error("invalid filter query: {0}")]
    InvalidQuery(String),

    /// The check has no IRI query form.
    #[error("check has no query representation: {0}")]
    Unrepresentable(String),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;
