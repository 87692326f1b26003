//! Seeding validation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::config::Format;
use crate::entrant::{Entrant, EntrantId};
use crate::errors::{EngineError, EngineResult};

/// Problem found while validating a seeded entrant list
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "issue")]
pub enum SeedingIssue {
    #[error("seed {seed} is used by more than one entrant")]
    DuplicateSeed { seed: u32 },

    #[error("entrant {entrant} has seed {seed}, outside 1..={max}")]
    SeedOutOfRange {
        entrant: EntrantId,
        seed: u32,
        max: usize,
    },

    #[error("entrant {entrant} is missing required field '{field}'")]
    MissingField { entrant: EntrantId, field: String },

    #[error("entrant {entrant} is registered more than once")]
    DuplicateEntrant { entrant: EntrantId },

    #[error("{format} needs at least {min} entrants, got {actual}")]
    TooFewEntrants {
        format: Format,
        min: usize,
        actual: usize,
    },

    #[error("{format} needs a power-of-two entrant count, got {actual}")]
    NotPowerOfTwo { format: Format, actual: usize },
}

/// Outcome of [`validate_seeding`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedingReport {
    pub valid: bool,
    pub issues: Vec<SeedingIssue>,
}

impl SeedingReport {
    /// Convert a failed report into [`EngineError::InvalidConfiguration`]
    pub fn into_result(self) -> EngineResult<()> {
        if self.valid {
            return Ok(());
        }
        let messages: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        Err(EngineError::InvalidConfiguration(format!(
            "seeding validation failed: {}",
            messages.join("; ")
        )))
    }
}

/// Check an entrant list before bracket construction. Never mutates its input.
pub fn validate_seeding(entrants: &[Entrant], format: Format) -> SeedingReport {
    let mut issues = Vec::new();
    let count = entrants.len();

    if count < format.min_entrants() {
        issues.push(SeedingIssue::TooFewEntrants {
            format,
            min: format.min_entrants(),
            actual: count,
        });
    }

    if format == Format::DoubleElimination && count > 0 && !count.is_power_of_two() {
        issues.push(SeedingIssue::NotPowerOfTwo {
            format,
            actual: count,
        });
    }

    let mut seen_ids = HashSet::new();
    let mut seen_seeds = HashSet::new();
    let mut reported_seeds = HashSet::new();

    for entrant in entrants {
        if !seen_ids.insert(entrant.id) {
            issues.push(SeedingIssue::DuplicateEntrant { entrant: entrant.id });
        }

        if entrant.name.trim().is_empty() {
            issues.push(SeedingIssue::MissingField {
                entrant: entrant.id,
                field: "name".to_string(),
            });
        }

        if entrant.seed == 0 || entrant.seed as usize > count {
            issues.push(SeedingIssue::SeedOutOfRange {
                entrant: entrant.id,
                seed: entrant.seed,
                max: count,
            });
        }

        if !seen_seeds.insert(entrant.seed) && reported_seeds.insert(entrant.seed) {
            issues.push(SeedingIssue::DuplicateSeed { seed: entrant.seed });
        }
    }

    SeedingReport {
        valid: issues.is_empty(),
        issues,
    }
}
