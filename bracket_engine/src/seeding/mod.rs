//! Seeding: orders and validates entrants before bracket construction.
//!
//! - [`Seeder::apply`] returns entrants in placement order for a [`SeedingMethod`]
//! - [`validate_seeding`] reports duplicate or out-of-range seeds, missing
//!   fields and format-level entrant count problems

pub mod methods;
pub mod validation;

pub use methods::{Seeder, SeedingMethod};
pub use validation::{SeedingIssue, SeedingReport, validate_seeding};
