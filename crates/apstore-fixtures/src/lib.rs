//! Random ActivityPub items for tests and demos.
//!
//! A [`GeneratorContext`] owns its RNG and id counters, so seeded contexts
//! are reproducible and independent of each other. Generated ids follow
//! `<owner>/<lowercase type>/<n>` and never collide within one context.
//!
//! # Quick Start
//!
//! ```rust
//! use apstore_fixtures::GeneratorContext;
//!
//! let mut ctx = GeneratorContext::seeded(7);
//! let items = ctx.item_collection(10);
//! assert_eq!(items.len(), 10);
//! assert!(items.windows(2).all(|w| w[0].iri() <= w[1].iri()));
//! ```

pub mod config;
pub mod content;
pub mod generator;
pub mod names;

pub use config::{GeneratorConfig, ROOT_IRI};
pub use generator::{root_published, GeneratorContext, REASON};
