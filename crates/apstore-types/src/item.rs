use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::iri::Iri;
use crate::paths::{CollectionPath, ACTOR_COLLECTIONS, HIDDEN_COLLECTIONS, OBJECT_COLLECTIONS};
use crate::vocabulary::ItemType;

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// Properties shared by every object-role item (objects, actors, activities).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub id: Iri,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub attributed_to: Option<Iri>,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub media_type: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub url: Option<Iri>,
    pub to: Vec<Iri>,
    pub cc: Vec<Iri>,
    pub in_reply_to: Option<Iri>,
    pub replies: Option<Iri>,
    pub likes: Option<Iri>,
    pub shares: Option<Iri>,
}

impl Object {
    pub fn new(id: Iri, kind: ItemType) -> Self {
        Self {
            id,
            kind,
            ..Default::default()
        }
    }

    /// Declared replies/likes/shares collection IRIs.
    pub fn declared_collections(&self) -> Vec<(CollectionPath, Iri)> {
        OBJECT_COLLECTIONS
            .iter()
            .filter_map(|path| {
                let declared = match path {
                    CollectionPath::Replies => self.replies.as_ref(),
                    CollectionPath::Likes => self.likes.as_ref(),
                    CollectionPath::Shares => self.shares.as_ref(),
                    _ => None,
                };
                declared.map(|iri| (*path, iri.clone()))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Public half of an actor's key pair, as published on the actor document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub id: Iri,
    pub owner: Iri,
    pub public_key_pem: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub base: Object,
    pub inbox: Option<Iri>,
    pub outbox: Option<Iri>,
    pub followers: Option<Iri>,
    pub following: Option<Iri>,
    pub liked: Option<Iri>,
    pub preferred_username: Option<String>,
    pub public_key: Option<PublicKey>,
}

impl Actor {
    pub fn new(id: Iri, kind: ItemType) -> Self {
        Self {
            base: Object::new(id, kind),
            ..Default::default()
        }
    }

    /// An actor declaring inbox, outbox, followers, following and liked at
    /// their conventional paths below its own IRI.
    pub fn with_standard_collections(id: Iri, kind: ItemType) -> Self {
        let mut actor = Self::new(id, kind);
        let id = &actor.base.id;
        actor.inbox = Some(CollectionPath::Inbox.of(id));
        actor.outbox = Some(CollectionPath::Outbox.of(id));
        actor.followers = Some(CollectionPath::Followers.of(id));
        actor.following = Some(CollectionPath::Following.of(id));
        actor.liked = Some(CollectionPath::Liked.of(id));
        actor
    }

    /// Declared actor collections plus the hidden blocked/ignored ones,
    /// which are always derivable from the actor IRI.
    pub fn declared_collections(&self) -> Vec<(CollectionPath, Iri)> {
        let mut out: Vec<(CollectionPath, Iri)> = ACTOR_COLLECTIONS
            .iter()
            .filter_map(|path| {
                let declared = match path {
                    CollectionPath::Inbox => self.inbox.as_ref(),
                    CollectionPath::Outbox => self.outbox.as_ref(),
                    CollectionPath::Followers => self.followers.as_ref(),
                    CollectionPath::Following => self.following.as_ref(),
                    CollectionPath::Liked => self.liked.as_ref(),
                    _ => None,
                };
                declared.map(|iri| (*path, iri.clone()))
            })
            .collect();
        out.extend(
            HIDDEN_COLLECTIONS
                .iter()
                .map(|path| (*path, path.of(&self.base.id))),
        );
        out
    }
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub base: Object,
    pub actor: Option<Box<Item>>,
    /// May hold a bare [`Item::Iri`] reference.
    pub object: Option<Box<Item>>,
    pub target: Option<Box<Item>>,
}

impl Activity {
    pub fn new(id: Iri, kind: ItemType) -> Self {
        Self {
            base: Object::new(id, kind),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: Iri,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub href: Iri,
    pub name: Option<String>,
    pub href_lang: Option<String>,
    pub media_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Iri,
    #[serde(rename = "type")]
    pub kind: ItemType,
    /// Owner of the collection.
    pub attributed_to: Option<Iri>,
    pub published: Option<DateTime<Utc>>,
    pub cc: Vec<Iri>,
    pub items: Vec<Item>,
    pub total_items: usize,
    pub first: Option<Iri>,
    pub next: Option<Iri>,
    pub prev: Option<Iri>,
    pub part_of: Option<Iri>,
}

impl Collection {
    /// An empty `OrderedCollection`.
    pub fn ordered(id: Iri, owner: Option<Iri>) -> Self {
        Self {
            id,
            kind: ItemType::OrderedCollection,
            attributed_to: owner,
            ..Default::default()
        }
    }

    /// An empty unordered `Collection`.
    pub fn unordered(id: Iri, owner: Option<Iri>) -> Self {
        Self {
            id,
            kind: ItemType::Collection,
            attributed_to: owner,
            ..Default::default()
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.kind.is_ordered_collection()
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// Any addressable entity.
///
/// A closed union: every store operation pattern-matches on the variant
/// instead of probing for capabilities at runtime. [`Item::Iri`] is a bare
/// reference that has not been dereferenced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Object(Object),
    Actor(Actor),
    Activity(Activity),
    Link(Link),
    Collection(Collection),
    Iri(Iri),
}

impl Item {
    /// The identifying IRI of any variant.
    pub fn iri(&self) -> &Iri {
        match self {
            Self::Object(o) => &o.id,
            Self::Actor(a) => &a.base.id,
            Self::Activity(a) => &a.base.id,
            Self::Link(l) => &l.id,
            Self::Collection(c) => &c.id,
            Self::Iri(iri) => iri,
        }
    }

    /// Concrete vocabulary type; `None` for a bare reference.
    pub fn item_type(&self) -> Option<ItemType> {
        match self {
            Self::Object(o) => Some(o.kind),
            Self::Actor(a) => Some(a.base.kind),
            Self::Activity(a) => Some(a.base.kind),
            Self::Link(l) => Some(l.kind),
            Self::Collection(c) => Some(c.kind),
            Self::Iri(_) => None,
        }
    }

    /// Variant name for diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Object(_) => "Object",
            Self::Actor(_) => "Actor",
            Self::Activity(_) => "Activity",
            Self::Link(_) => "Link",
            Self::Collection(_) => "Collection",
            Self::Iri(_) => "IRI",
        }
    }

    pub fn attributed_to(&self) -> Option<&Iri> {
        match self {
            Self::Collection(c) => c.attributed_to.as_ref(),
            _ => self.as_object().and_then(|o| o.attributed_to.as_ref()),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Iri(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link(_))
    }

    /// The object-role base of objects, actors, and activities.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            Self::Actor(a) => Some(&a.base),
            Self::Activity(a) => Some(&a.base),
            _ => None,
        }
    }

    pub fn as_actor(&self) -> Option<&Actor> {
        match self {
            Self::Actor(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_activity(&self) -> Option<&Activity> {
        match self {
            Self::Activity(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Self::Link(l) => Some(l),
            _ => None,
        }
    }

    fn mismatch(&self, expected: &'static str) -> TypeError {
        TypeError::TypeMismatch {
            expected,
            found: self.variant_name().to_string(),
        }
    }

    /// Run `f` on the object-role base; fails on links, collections, and
    /// bare references.
    pub fn on_object<R, E, F>(&mut self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Object) -> Result<R, E>,
        E: From<TypeError>,
    {
        match self {
            Self::Object(o) => f(o),
            Self::Actor(a) => f(&mut a.base),
            Self::Activity(a) => f(&mut a.base),
            other => Err(other.mismatch("Object").into()),
        }
    }

    pub fn on_actor<R, E, F>(&mut self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Actor) -> Result<R, E>,
        E: From<TypeError>,
    {
        match self {
            Self::Actor(a) => f(a),
            other => Err(other.mismatch("Actor").into()),
        }
    }

    pub fn on_activity<R, E, F>(&mut self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Activity) -> Result<R, E>,
        E: From<TypeError>,
    {
        match self {
            Self::Activity(a) => f(a),
            other => Err(other.mismatch("Activity").into()),
        }
    }

    pub fn on_collection<R, E, F>(&mut self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Collection) -> Result<R, E>,
        E: From<TypeError>,
    {
        match self {
            Self::Collection(c) => f(c),
            other => Err(other.mismatch("Collection").into()),
        }
    }

    pub fn on_link<R, E, F>(&mut self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Link) -> Result<R, E>,
        E: From<TypeError>,
    {
        match self {
            Self::Link(l) => f(l),
            other => Err(other.mismatch("Link").into()),
        }
    }

    /// Consume into a collection, failing on any other variant.
    pub fn into_collection(self) -> Result<Collection, TypeError> {
        match self {
            Self::Collection(c) => Ok(c),
            other => Err(other.mismatch("Collection")),
        }
    }
}

impl From<Object> for Item {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Actor> for Item {
    fn from(value: Actor) -> Self {
        Self::Actor(value)
    }
}

impl From<Activity> for Item {
    fn from(value: Activity) -> Self {
        Self::Activity(value)
    }
}

impl From<Link> for Item {
    fn from(value: Link) -> Self {
        Self::Link(value)
    }
}

impl From<Collection> for Item {
    fn from(value: Collection) -> Self {
        Self::Collection(value)
    }
}

impl From<Iri> for Item {
    fn from(value: Iri) -> Self {
        Self::Iri(value)
    }
}
