use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The ActivityStreams public audience namespace.
pub const PUBLIC_NS: &str = "https://www.w3.org/ns/activitystreams#Public";

/// Opaque identifier for every stored item and collection.
///
/// The store treats IRIs as keys and never interprets them beyond the
/// syntactic check in [`Iri::validate`]. Construction through [`Iri::new`] is
/// unchecked so fixtures and deserialized values stay cheap; the store
/// validates at its boundary.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    /// Wrap a string without validation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parse and validate an IRI.
    pub fn parse(value: impl Into<String>) -> Result<Self, TypeError> {
        let iri = Self(value.into());
        iri.validate()?;
        Ok(iri)
    }

    /// The public audience IRI.
    pub fn public() -> Self {
        Self(PUBLIC_NS.to_string())
    }

    /// Check that the IRI is non-empty, carries a scheme, and contains no
    /// whitespace or control characters.
    pub fn validate(&self) -> Result<(), TypeError> {
        let s = self.0.as_str();
        if s.is_empty() {
            return Err(TypeError::invalid_iri(s, "empty"));
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::invalid_iri(s, "contains whitespace or control characters"));
        }
        let Some((scheme, rest)) = s.split_once(':') else {
            return Err(TypeError::invalid_iri(s, "missing scheme"));
        };
        let mut chars = scheme.chars();
        let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !scheme_ok {
            return Err(TypeError::invalid_iri(s, "malformed scheme"));
        }
        if rest.is_empty() {
            return Err(TypeError::invalid_iri(s, "nothing after scheme"));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a path segment, e.g. `https://example.com/~jdoe` + `inbox`.
    pub fn add_path(&self, segment: &str) -> Self {
        let base = self.without_query().trim_end_matches('/');
        let segment = segment.trim_start_matches('/');
        Self(format!("{base}/{segment}"))
    }

    /// The IRI with any query component removed.
    pub fn without_query(&self) -> &str {
        match self.0.split_once('?') {
            Some((base, _)) => base,
            None => &self.0,
        }
    }

    /// The raw query component, if any.
    pub fn query(&self) -> Option<&str> {
        self.0.split_once('?').map(|(_, q)| q)
    }

    /// Replace the query component. An empty query strips it.
    pub fn with_query(&self, query: &str) -> Self {
        let base = self.without_query();
        if query.is_empty() {
            Self(base.to_string())
        } else {
            Self(format!("{base}?{query}"))
        }
    }
}

impl fmt::Debug for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Iri({})", self.0)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Iri {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_http_iris() {
        let iri = Iri::parse("https://example.com/~jdoe").unwrap();
        assert_eq!(iri.as_str(), "https://example.com/~jdoe");
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "no-scheme", "https:", "1http://x", "https://exa mple.com", ":x"] {
            assert!(
                matches!(Iri::parse(bad), Err(TypeError::InvalidIri { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn add_path_joins_single_slash() {
        let base = Iri::new("https://example.com/~jdoe/");
        assert_eq!(base.add_path("inbox").as_str(), "https://example.com/~jdoe/inbox");
        assert_eq!(base.add_path("/outbox").as_str(), "https://example.com/~jdoe/outbox");
    }

    #[test]
    fn add_path_drops_query() {
        let base = Iri::new("https://example.com/~jdoe?x=1");
        assert_eq!(base.add_path("liked").as_str(), "https://example.com/~jdoe/liked");
    }

    #[test]
    fn query_accessors() {
        let iri = Iri::new("https://example.com/outbox?type=Note");
        assert_eq!(iri.query(), Some("type=Note"));
        assert_eq!(iri.without_query(), "https://example.com/outbox");
        assert_eq!(iri.with_query("").as_str(), "https://example.com/outbox");
        assert_eq!(
            iri.with_query("maxItems=2").as_str(),
            "https://example.com/outbox?maxItems=2"
        );
    }

    #[test]
    fn serde_is_transparent() {
        let iri = Iri::new("https://example.com/a");
        let json = serde_json::to_string(&iri).unwrap();
        assert_eq!(json, "\"https://example.com/a\"");
        let back: Iri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, iri);
    }
}
