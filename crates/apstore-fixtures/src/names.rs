//! `adjective_surname` display names.

use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "admiring", "bold", "brave", "clever", "dazzling", "eager", "elastic", "festive", "focused",
    "gallant", "happy", "hopeful", "jolly", "keen", "laughing", "lucid", "modest", "nifty",
    "optimistic", "peaceful", "quirky", "relaxed", "serene", "sharp", "stoic", "tender", "upbeat",
    "vibrant", "wizardly", "zealous",
];

const SURNAMES: &[&str] = &[
    "albattani", "babbage", "bohr", "curie", "darwin", "euclid", "fermi", "franklin", "galileo",
    "goodall", "hopper", "hypatia", "johnson", "kepler", "lamarr", "lovelace", "meitner",
    "noether", "pascal", "ritchie", "shannon", "tesla", "thompson", "turing", "wozniak", "yalow",
];

/// A random `adjective_surname` pair.
pub fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("anonymous");
    let surname = SURNAMES.choose(rng).copied().unwrap_or("user");
    format!("{adjective}_{surname}")
}
