//! Composable item checks and the filter pipeline for apstore collections.
//!
//! A load of a collection runs an ordered sequence of [`Check`]s over its
//! members. Predicates run first; the `After`/`MaxCount` pagination pair runs
//! last on what survived and produces a [`Cursor`] for the following page.
//!
//! # Quick Start
//!
//! ```rust
//! use apstore_filters::{Check, Checks, NoResolver};
//! use apstore_types::{Iri, Item, ItemType, Object};
//!
//! let members: Vec<Item> = (0..5)
//!     .map(|n| Object::new(Iri::new(format!("https://example.com/n/{n}")), ItemType::Note).into())
//!     .collect();
//! let checks = Checks::new([Check::has_type([ItemType::Note]), Check::max_count(2)]);
//! let page = checks.run(members, &NoResolver);
//! assert_eq!(page.items.len(), 2);
//! assert!(page.next.is_some());
//! ```

pub mod check;
pub mod error;
pub mod pipeline;
pub mod query;

pub use check::{Check, Checks, NoResolver, Resolver};
pub use error::{FilterError, FilterResult};
pub use pipeline::{Cursor, Page};
