use thiserror::Error;

/// Errors produced by item model operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid IRI {iri:?}: {reason}")]
    InvalidIri { iri: String, reason: String },

    /// An apply-if-variant helper was called on the wrong variant.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("unknown vocabulary type: {0}")]
    UnknownType(String),
}

impl TypeError {
    pub(crate) fn invalid_iri(iri: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIri {
            iri: iri.to_string(),
            reason: reason.into(),
        }
    }
}
