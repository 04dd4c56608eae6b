//! Random item generation.

use std::collections::HashMap;

use apstore_types::{
    Activity, Actor, Collection, CollectionPath, Iri, Item, ItemType, Link, Object, ACTOR_TYPES,
    LINK_TYPES,
};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::content::{self, Sample, SAMPLES};
use crate::names::random_name;

/// Content of Block, Flag and Ignore activities.
pub const REASON: &str = "A random reason for a stupid activity";

const ACTOR_ACTIVITIES: &[ItemType] = &[
    ItemType::Update,
    ItemType::Like,
    ItemType::Dislike,
    ItemType::Flag,
    ItemType::Block,
    ItemType::Follow,
    ItemType::Ignore,
];

const OBJECT_ACTIVITIES: &[ItemType] = &[
    ItemType::Update,
    ItemType::Like,
    ItemType::Dislike,
    ItemType::Delete,
    ItemType::Flag,
    ItemType::Block,
    ItemType::Follow,
    ItemType::Ignore,
];

const ACTIVITY_ACTIVITIES: &[ItemType] = &[ItemType::Undo];

const NEEDS_REASON: &[ItemType] = &[ItemType::Block, ItemType::Flag, ItemType::Ignore];

/// Publication date of the root actor.
pub fn root_published() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1999, 4, 1, 6, 6, 6)
        .single()
        .unwrap_or_default()
}

/// Source of random items.
///
/// Owns its RNG and its per-type id counters, so two contexts built from the
/// same seed produce identical sequences and never share state.
pub struct GeneratorContext {
    config: GeneratorConfig,
    rng: StdRng,
    counters: HashMap<ItemType, usize>,
}

impl GeneratorContext {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng,
            counters: HashMap::new(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(GeneratorConfig::seeded(seed))
    }

    pub fn root(&self) -> &Iri {
        &self.config.root
    }

    /// `<owner>/<lowercase type>/<n>`, counting per type.
    fn next_id(&mut self, owner: &Iri, kind: ItemType) -> Iri {
        let n = self.counters.entry(kind).or_insert(0);
        *n += 1;
        owner
            .add_path(&kind.as_str().to_lowercase())
            .add_path(&n.to_string())
    }

    /// A timestamp in 1900..=2098, whole seconds.
    pub fn random_time(&mut self) -> DateTime<Utc> {
        let year = self.rng.gen_range(1900..=2098);
        let month = self.rng.gen_range(1..=12);
        let day = self.rng.gen_range(1..=28);
        let hour = self.rng.gen_range(0..24);
        let minute = self.rng.gen_range(0..60);
        let second = self.rng.gen_range(0..60);
        Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
            .single()
            .unwrap_or_else(root_published)
    }

    /// The actor every generated item is attributed to.
    pub fn root_actor(&self) -> Actor {
        let id = self.config.root.clone();
        let mut actor = Actor::with_standard_collections(id.clone(), ItemType::Person);
        let base = &mut actor.base;
        base.published = Some(root_published());
        base.name = Some("Rooty McRootface".into());
        base.summary = Some("The base actor for generated fixtures".into());
        base.content = Some("<p>The base actor for generated fixtures</p>".into());
        base.url = Some(id.clone());
        base.to = vec![Iri::public()];
        base.likes = Some(CollectionPath::Likes.of(&id));
        base.shares = Some(CollectionPath::Shares.of(&id));
        actor.preferred_username = Some("root".into());
        actor
    }

    /// An object built from a random sample payload.
    pub fn random_object(&mut self, owner: &Iri) -> Object {
        let sample = SAMPLES.choose(&mut self.rng).copied();
        let mut ob = Object::new(Iri::default(), ItemType::Note);
        ob.attributed_to = Some(owner.clone());
        ob.published = Some(self.random_time());
        ob.content = Some("no data".into());
        if let Some(sample) = sample {
            apply_sample(&mut ob, &sample);
        }
        ob.id = self.next_id(owner, ob.kind);
        ob
    }

    /// An `Image` carrying the first sample of `media_type`.
    pub fn random_image(&mut self, media_type: &str, owner: &Iri) -> Object {
        let mut img = Object::new(Iri::default(), ItemType::Image);
        img.attributed_to = Some(owner.clone());
        img.media_type = Some(media_type.to_string());
        let body = content::by_media_type(media_type)
            .map(|s| s.body)
            .unwrap_or_default();
        img.content = Some(STANDARD_NO_PAD.encode(body));
        img.id = self.next_id(owner, ItemType::Image);
        img
    }

    pub fn random_actor(&mut self, owner: &Iri) -> Actor {
        let kind = ACTOR_TYPES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(ItemType::Person);
        let id = self.next_id(owner, kind);
        let name = random_name(&mut self.rng);
        let mut actor = Actor::with_standard_collections(id, kind);
        actor.base.attributed_to = Some(owner.clone());
        actor.base.name = Some(name.clone());
        actor.preferred_username = Some(name);
        actor
    }

    /// An activity whose type suits `object`'s role.
    pub fn random_activity(&mut self, object: Option<Item>, owner: &Iri) -> Activity {
        let choices = match object.as_ref().and_then(Item::item_type) {
            Some(kind) if kind.is_activity() => ACTIVITY_ACTIVITIES,
            Some(kind) if kind.is_actor() => ACTOR_ACTIVITIES,
            _ => OBJECT_ACTIVITIES,
        };
        let kind = choices
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(ItemType::Update);

        let mut act = Activity::new(Iri::default(), kind);
        act.object = object.map(Box::new);
        act.actor = Some(Box::new(Item::Iri(owner.clone())));
        act.base.attributed_to = Some(owner.clone());
        act.base.to = vec![self.config.root.clone(), Iri::public()];
        if NEEDS_REASON.contains(&kind) {
            act.base.content = Some(REASON.into());
            act.base.summary = Some(REASON.into());
        }
        act.base.id = self.next_id(owner, kind);
        act
    }

    /// A link with a random `https://example.com/<adjective>/<surname>` href.
    pub fn random_link(&mut self, owner: &Iri) -> Link {
        let kind = LINK_TYPES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(ItemType::Link);
        let name = random_name(&mut self.rng);
        let href = name
            .split('_')
            .fold(Iri::new("https://example.com"), |iri, part| iri.add_path(part));
        Link {
            id: self.next_id(owner, kind),
            kind,
            href,
            name: Some(name),
            href_lang: Some("en".into()),
            media_type: None,
        }
    }

    pub fn random_collection(&mut self, owner: &Iri) -> Collection {
        let mut col = Collection::ordered(Iri::default(), Some(owner.clone()));
        col.published = Some(self.random_time());
        col.id = self.next_id(owner, ItemType::OrderedCollection);
        col
    }

    /// An object, actor, activity wrapping a fresh object, or link.
    pub fn random_item(&mut self, owner: &Iri) -> Item {
        match self.rng.gen_range(0..4) {
            0 => self.random_object(owner).into(),
            1 => self.random_actor(owner).into(),
            2 => {
                let object = self.random_object(owner).into();
                self.random_activity(Some(object), owner).into()
            }
            _ => self.random_link(owner).into(),
        }
    }

    /// `count` random items attributed to the root actor, generated lazily.
    pub fn items(&mut self, count: usize) -> impl Iterator<Item = Item> + '_ {
        let root = self.config.root.clone();
        (0..count).map(move |_| self.random_item(&root))
    }

    /// `count` random items attributed to the root actor, sorted by IRI.
    pub fn item_collection(&mut self, count: usize) -> Vec<Item> {
        let mut items: Vec<Item> = self.items(count).collect();
        items.sort_by(|a, b| a.iri().cmp(b.iri()));
        debug!(count, "generated item collection");
        items
    }
}

fn apply_sample(ob: &mut Object, sample: &Sample) {
    ob.kind = sample.object_type();
    ob.media_type = Some(sample.media_type.to_string());
    if sample.is_text() {
        ob.summary = sample.summary();
        ob.content = Some(String::from_utf8_lossy(sample.body).into_owned());
    } else {
        ob.content = Some(STANDARD_NO_PAD.encode(sample.body));
    }
}
