//! Well-known collection paths hanging off actors and objects.

use std::fmt;

use crate::iri::Iri;

/// A named sub-collection of an actor or object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionPath {
    Inbox,
    Outbox,
    Followers,
    Following,
    Liked,
    Likes,
    Shares,
    Replies,
    /// Hidden: actors this actor blocked.
    Blocked,
    /// Hidden: actors this actor ignores.
    Ignored,
}

/// Collections declared on an actor.
pub const ACTOR_COLLECTIONS: &[CollectionPath] = &[
    CollectionPath::Inbox,
    CollectionPath::Outbox,
    CollectionPath::Followers,
    CollectionPath::Following,
    CollectionPath::Liked,
];

/// Collections never declared on the actor document but always derivable
/// from its IRI.
pub const HIDDEN_COLLECTIONS: &[CollectionPath] =
    &[CollectionPath::Blocked, CollectionPath::Ignored];

/// Collections declared on any object.
pub const OBJECT_COLLECTIONS: &[CollectionPath] = &[
    CollectionPath::Replies,
    CollectionPath::Likes,
    CollectionPath::Shares,
];

impl CollectionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Outbox => "outbox",
            Self::Followers => "followers",
            Self::Following => "following",
            Self::Liked => "liked",
            Self::Likes => "likes",
            Self::Shares => "shares",
            Self::Replies => "replies",
            Self::Blocked => "blocked",
            Self::Ignored => "ignored",
        }
    }

    /// The collection IRI for `owner`, e.g. `<owner>/inbox`.
    pub fn of(&self, owner: &Iri) -> Iri {
        owner.add_path(self.as_str())
    }

    pub fn is_hidden(&self) -> bool {
        HIDDEN_COLLECTIONS.contains(self)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_appends_suffix() {
        let owner = Iri::new("https://example.com/~root");
        assert_eq!(
            CollectionPath::Blocked.of(&owner).as_str(),
            "https://example.com/~root/blocked"
        );
        assert!(CollectionPath::Ignored.is_hidden());
        assert!(!CollectionPath::Inbox.is_hidden());
    }
}
