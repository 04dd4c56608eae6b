//! Filter pipeline evaluation over collection membership.
//!
//! Evaluation is two-phase. Every non-pagination predicate runs first, in
//! order, keeping the relative order of surviving members. Pagination runs
//! last on the filtered sequence: the `After` anchor skips up to and including
//! the anchor, then `MaxCount` caps the page and yields a [`Cursor`] when
//! filtered members remain. `MaxCount(0)` is a count-only query: no items and
//! no cursor, with the filtered count in [`Page::matched`].

use apstore_types::{Iri, Item};
use tracing::debug;

use crate::check::{Check, Checks, Resolver};
use crate::error::FilterResult;
use crate::query;

/// One page of filtered members.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Item>,
    /// Number of members that passed the predicates, before pagination.
    pub matched: usize,
    /// Descriptor of the following page, if filtered members remain.
    pub next: Option<Cursor>,
}

/// Resumable pagination state: the predicates that produced a page, the
/// last member returned, and the page size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    predicates: Checks,
    after: Iri,
    max_count: usize,
}

impl Cursor {
    pub fn new(predicates: Checks, after: Iri, max_count: usize) -> Self {
        let predicates = predicates.into_iter().filter(|c| !c.is_pagination()).collect();
        Self {
            predicates,
            after,
            max_count,
        }
    }

    pub fn after(&self) -> &Iri {
        &self.after
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn predicates(&self) -> &Checks {
        &self.predicates
    }

    /// The full check sequence that loads the next page.
    pub fn checks(&self) -> Checks {
        let mut checks = self.predicates.clone();
        checks.push(Check::After(self.after.clone()));
        checks.push(Check::MaxCount(self.max_count));
        checks
    }

    /// Encode as `<collection>?<query>`.
    pub fn to_iri(&self, collection: &Iri) -> FilterResult<Iri> {
        query::to_iri(collection, &self.checks())
    }

    /// Decode a next-page IRI produced by [`Cursor::to_iri`].
    ///
    /// Returns `None` when the query carries no `after`/`maxItems` pair.
    pub fn from_iri(iri: &Iri) -> FilterResult<Option<Self>> {
        let checks = query::from_iri(iri)?;
        Ok(match (checks.after(), checks.max_count()) {
            (Some(after), Some(max)) => Some(Self::new(checks.clone(), after.clone(), max)),
            _ => None,
        })
    }
}

impl Checks {
    /// Run the pipeline over `members`, in their stored order.
    pub fn run(&self, members: Vec<Item>, resolver: &dyn Resolver) -> Page {
        let candidates = members.len();
        let filtered: Vec<Item> = members
            .into_iter()
            .filter_map(|mut item| self.matches(&mut item, resolver).then_some(item))
            .collect();
        let matched = filtered.len();

        let start = match self.after() {
            Some(anchor) => filtered
                .iter()
                .position(|item| item.iri() == anchor)
                .map_or(filtered.len(), |pos| pos + 1),
            None => 0,
        };
        let mut items: Vec<Item> = filtered.into_iter().skip(start).collect();

        let mut next = None;
        if let Some(max) = self.max_count() {
            // A zero cap has no last item to anchor a cursor on.
            if items.len() > max {
                items.truncate(max);
                next = items
                    .last()
                    .map(|last| Cursor::new(self.clone(), last.iri().clone(), max));
            }
        }

        debug!(
            candidates,
            matched,
            returned = items.len(),
            has_next = next.is_some(),
            "filter pipeline evaluated"
        );

        Page {
            items,
            matched,
            next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::NoResolver;
    use apstore_types::{ItemType, Object};
    use proptest::prelude::*;

    fn object(n: usize, kind: ItemType) -> Item {
        Object::new(Iri::new(format!("https://example.com/o/{n}")), kind).into()
    }

    fn mixed(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| {
                let kind = if i % 3 == 2 {
                    ItemType::Image
                } else {
                    ItemType::Note
                };
                object(i, kind)
            })
            .collect()
    }

    fn iris(items: &[Item]) -> Vec<String> {
        items.iter().map(|i| i.iri().to_string()).collect()
    }

    #[test]
    fn empty_checks_return_everything() {
        let page = Checks::default().run(mixed(4), &NoResolver);
        assert_eq!(page.items.len(), 4);
        assert_eq!(page.matched, 4);
        assert!(page.next.is_none());
    }

    #[test]
    fn predicates_preserve_relative_order() {
        let checks = Checks::new([Check::has_type([ItemType::Note])]);
        let page = checks.run(mixed(6), &NoResolver);
        assert_eq!(
            iris(&page.items),
            vec![
                "https://example.com/o/0",
                "https://example.com/o/1",
                "https://example.com/o/3",
                "https://example.com/o/4",
            ]
        );
    }

    #[test]
    fn pagination_applies_after_filtering() {
        // MaxCount placed before the predicate still caps the filtered set.
        let checks = Checks::new([Check::MaxCount(2), Check::has_type([ItemType::Image])]);
        let page = checks.run(mixed(9), &NoResolver);
        assert_eq!(
            iris(&page.items),
            vec!["https://example.com/o/2", "https://example.com/o/5"]
        );
        let next = page.next.expect("one image remains");
        assert_eq!(next.after(), &Iri::new("https://example.com/o/5"));

        let rest = next.checks().run(mixed(9), &NoResolver);
        assert_eq!(iris(&rest.items), vec!["https://example.com/o/8"]);
        assert!(rest.next.is_none());
    }

    #[test]
    fn exact_fit_has_no_next() {
        let page = Checks::new([Check::MaxCount(3)]).run(mixed(3), &NoResolver);
        assert_eq!(page.items.len(), 3);
        assert!(page.next.is_none());
    }

    #[test]
    fn zero_max_count_is_empty_without_cursor() {
        let page = Checks::new([Check::MaxCount(0)]).run(mixed(3), &NoResolver);
        assert!(page.items.is_empty());
        assert!(page.next.is_none());
        assert_eq!(page.matched, 3);
    }

    #[test]
    fn zero_max_count_counts_filtered_members() {
        let checks = Checks::new([Check::has_type([ItemType::Note]), Check::MaxCount(0)]);
        let members = mixed(6);
        let notes = members
            .iter()
            .filter(|m| m.item_type() == Some(ItemType::Note))
            .count();
        let page = checks.run(members, &NoResolver);
        assert!(page.items.is_empty());
        assert!(page.next.is_none());
        assert_eq!(page.matched, notes);
    }

    #[test]
    fn unknown_anchor_yields_empty_page() {
        let checks = Checks::new([Check::After(Iri::new("https://example.com/o/404"))]);
        let page = checks.run(mixed(3), &NoResolver);
        assert!(page.items.is_empty());
        assert_eq!(page.matched, 3);
    }

    #[test]
    fn cursor_drops_pagination_from_predicates() {
        let cursor = Cursor::new(
            Checks::new([Check::MaxCount(9), Check::has_type([ItemType::Note])]),
            Iri::new("https://example.com/o/1"),
            2,
        );
        assert_eq!(cursor.predicates().len(), 1);
        assert_eq!(cursor.checks().len(), 3);
    }

    proptest! {
        #[test]
        fn following_cursors_enumerates_every_match_once(n in 0usize..40, k in 1usize..8) {
            let members = mixed(n);
            let mut checks = Checks::new([Check::MaxCount(k)]);
            let mut seen = Vec::new();
            let mut pages = 0usize;
            loop {
                let page = checks.run(members.clone(), &NoResolver);
                pages += 1;
                prop_assert!(page.items.len() <= k);
                seen.extend(iris(&page.items));
                match page.next {
                    Some(cursor) => checks = cursor.checks(),
                    None => break,
                }
            }
            prop_assert_eq!(seen, iris(&members));
            prop_assert_eq!(pages, n.div_ceil(k).max(1));
        }
    }
}
