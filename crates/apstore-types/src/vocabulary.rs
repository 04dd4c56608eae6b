use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! vocabulary {
    ($($variant:ident),+ $(,)?) => {
        /// ActivityStreams 2.0 vocabulary type of an item.
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ItemType {
            #[default]
            $($variant),+
        }

        impl ItemType {
            /// Every known vocabulary type.
            pub const ALL: &'static [ItemType] = &[$(ItemType::$variant),+];

            /// The canonical ActivityStreams name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

vocabulary! {
    // Object types
    Object, Article, Audio, Document, Event, Image, Note, Page, Place, Profile,
    Relationship, Tombstone, Video,
    // Link types
    Link, Mention,
    // Actor types
    Application, Group, Organization, Person, Service,
    // Activity types
    Accept, Add, Announce, Arrive, Block, Create, Delete, Dislike, Flag, Follow,
    Ignore, Invite, Join, Leave, Like, Listen, Move, Offer, Question, Read, Reject,
    Remove, TentativeAccept, TentativeReject, Travel, Undo, Update, View,
    // Collection types
    Collection, OrderedCollection, CollectionPage, OrderedCollectionPage,
}

pub const OBJECT_TYPES: &[ItemType] = &[
    ItemType::Object,
    ItemType::Article,
    ItemType::Audio,
    ItemType::Document,
    ItemType::Event,
    ItemType::Image,
    ItemType::Note,
    ItemType::Page,
    ItemType::Place,
    ItemType::Profile,
    ItemType::Relationship,
    ItemType::Tombstone,
    ItemType::Video,
];

pub const LINK_TYPES: &[ItemType] = &[ItemType::Link, ItemType::Mention];

pub const ACTOR_TYPES: &[ItemType] = &[
    ItemType::Application,
    ItemType::Group,
    ItemType::Organization,
    ItemType::Person,
    ItemType::Service,
];

pub const ACTIVITY_TYPES: &[ItemType] = &[
    ItemType::Accept,
    ItemType::Add,
    ItemType::Announce,
    ItemType::Arrive,
    ItemType::Block,
    ItemType::Create,
    ItemType::Delete,
    ItemType::Dislike,
    ItemType::Flag,
    ItemType::Follow,
    ItemType::Ignore,
    ItemType::Invite,
    ItemType::Join,
    ItemType::Leave,
    ItemType::Like,
    ItemType::Listen,
    ItemType::Move,
    ItemType::Offer,
    ItemType::Question,
    ItemType::Read,
    ItemType::Reject,
    ItemType::Remove,
    ItemType::TentativeAccept,
    ItemType::TentativeReject,
    ItemType::Travel,
    ItemType::Undo,
    ItemType::Update,
    ItemType::View,
];

pub const COLLECTION_TYPES: &[ItemType] = &[
    ItemType::Collection,
    ItemType::OrderedCollection,
    ItemType::CollectionPage,
    ItemType::OrderedCollectionPage,
];

impl ItemType {
    pub fn is_actor(&self) -> bool {
        ACTOR_TYPES.contains(self)
    }

    pub fn is_activity(&self) -> bool {
        ACTIVITY_TYPES.contains(self)
    }

    pub fn is_link(&self) -> bool {
        LINK_TYPES.contains(self)
    }

    pub fn is_collection(&self) -> bool {
        COLLECTION_TYPES.contains(self)
    }

    /// Ordered collections and their pages.
    pub fn is_ordered_collection(&self) -> bool {
        matches!(self, Self::OrderedCollection | Self::OrderedCollectionPage)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TypeError::UnknownType(s.to_string()))
    }
}
