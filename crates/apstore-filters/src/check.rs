use apstore_types::{Iri, Item, ItemType};

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Dereferences bare IRI references during nested-object checks.
///
/// The store implements this over its object table. Returning `None` makes
/// the nested predicate fail; it is never an error.
pub trait Resolver {
    fn resolve(&self, iri: &Iri) -> Option<Item>;
}

impl<F> Resolver for F
where
    F: Fn(&Iri) -> Option<Item>,
{
    fn resolve(&self, iri: &Iri) -> Option<Item> {
        self(iri)
    }
}

/// A resolver that never dereferences anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResolver;

impl Resolver for NoResolver {
    fn resolve(&self, _iri: &Iri) -> Option<Item> {
        None
    }
}

/// Replace a bare reference in `slot` with the resolved item.
///
/// Returns `false` when `slot` is still a bare reference afterwards.
fn dereference(slot: &mut Item, resolver: &dyn Resolver) -> bool {
    if let Item::Iri(iri) = slot {
        match resolver.resolve(iri) {
            Some(full) => *slot = full,
            None => return false,
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// A single named predicate or pagination directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Check {
    /// Item's concrete type is one of the set.
    HasType(Vec<ItemType>),
    SameId(Iri),
    AttributedTo(Iri),
    /// All sub-checks hold for an activity's (dereferenced) object.
    Object(Checks),
    /// All sub-checks hold for an activity's (dereferenced) actor.
    Actor(Checks),
    Any(Vec<Check>),
    All(Vec<Check>),
    Not(Box<Check>),
    /// Cap on the page length. Top level only. Zero asks for the count alone.
    MaxCount(usize),
    /// Resume after this member IRI. Top level only.
    After(Iri),
}

impl Check {
    pub fn has_type(types: impl IntoIterator<Item = ItemType>) -> Self {
        Self::HasType(types.into_iter().collect())
    }

    pub fn object(checks: impl IntoIterator<Item = Check>) -> Self {
        Self::Object(Checks::new(checks))
    }

    pub fn actor(checks: impl IntoIterator<Item = Check>) -> Self {
        Self::Actor(Checks::new(checks))
    }

    pub fn any(checks: impl IntoIterator<Item = Check>) -> Self {
        Self::Any(checks.into_iter().collect())
    }

    pub fn all(checks: impl IntoIterator<Item = Check>) -> Self {
        Self::All(checks.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(check: Check) -> Self {
        Self::Not(Box::new(check))
    }

    pub fn max_count(n: usize) -> Self {
        Self::MaxCount(n)
    }

    pub fn after(iri: Iri) -> Self {
        Self::After(iri)
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::HasType(_) => "type",
            Self::SameId(_) => "id",
            Self::AttributedTo(_) => "attributedTo",
            Self::Object(_) => "object",
            Self::Actor(_) => "actor",
            Self::Any(_) => "any",
            Self::All(_) => "all",
            Self::Not(_) => "not",
            Self::MaxCount(_) => "maxItems",
            Self::After(_) => "after",
        }
    }

    pub fn is_pagination(&self) -> bool {
        matches!(self, Self::MaxCount(_) | Self::After(_))
    }

    /// Evaluate against `item`.
    ///
    /// Nested-object checks substitute the dereferenced object into `item`.
    /// Pagination checks always match here; the pipeline applies them.
    pub fn matches(&self, item: &mut Item, resolver: &dyn Resolver) -> bool {
        match self {
            Self::HasType(types) => item.item_type().is_some_and(|t| types.contains(&t)),
            Self::SameId(iri) => item.iri() == iri,
            Self::AttributedTo(iri) => item.attributed_to() == Some(iri),
            Self::Object(checks) => match item {
                Item::Activity(act) => match act.object.as_deref_mut() {
                    Some(object) => {
                        dereference(object, resolver) && checks.matches(object, resolver)
                    }
                    None => false,
                },
                _ => false,
            },
            Self::Actor(checks) => match item {
                Item::Activity(act) => match act.actor.as_deref_mut() {
                    Some(actor) => {
                        dereference(actor, resolver) && checks.matches(actor, resolver)
                    }
                    None => false,
                },
                _ => false,
            },
            Self::Any(checks) => checks.iter().any(|c| c.matches(&mut *item, resolver)),
            Self::All(checks) => checks.iter().all(|c| c.matches(&mut *item, resolver)),
            Self::Not(check) => check.is_pagination() || !check.matches(item, resolver),
            Self::MaxCount(_) | Self::After(_) => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// An ordered sequence of checks combined with short-circuit AND.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Checks(Vec<Check>);

impl Checks {
    pub fn new(checks: impl IntoIterator<Item = Check>) -> Self {
        Self(checks.into_iter().collect())
    }

    pub fn push(&mut self, check: Check) {
        self.0.push(check);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Check> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Check] {
        &self.0
    }

    /// Non-pagination checks, in order.
    pub fn predicates(&self) -> impl Iterator<Item = &Check> {
        self.0.iter().filter(|c| !c.is_pagination())
    }

    /// The smallest top-level `MaxCount`.
    pub fn max_count(&self) -> Option<usize> {
        self.0
            .iter()
            .filter_map(|c| match c {
                Check::MaxCount(n) => Some(*n),
                _ => None,
            })
            .min()
    }

    /// The last top-level `After` anchor.
    pub fn after(&self) -> Option<&Iri> {
        self.0.iter().rev().find_map(|c| match c {
            Check::After(iri) => Some(iri),
            _ => None,
        })
    }

    /// AND of all predicates against one item.
    pub fn matches(&self, item: &mut Item, resolver: &dyn Resolver) -> bool {
        self.predicates().all(|c| c.matches(&mut *item, resolver))
    }
}

impl From<Vec<Check>> for Checks {
    fn from(value: Vec<Check>) -> Self {
        Self(value)
    }
}

impl FromIterator<Check> for Checks {
    fn from_iter<T: IntoIterator<Item = Check>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Checks {
    type Item = Check;
    type IntoIter = std::vec::IntoIter<Check>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Checks {
    type Item = &'a Check;
    type IntoIter = std::slice::Iter<'a, Check>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
