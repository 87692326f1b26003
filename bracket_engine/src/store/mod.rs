//! Bracket persistence boundary.

pub mod repository;

pub use repository::{BracketRepository, InMemoryBracketRepository};
