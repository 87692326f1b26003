//! Entrant (team or player) registered for a tournament.

use serde::{Deserialize, Serialize};

/// Entrant ID type
pub type EntrantId = i64;

/// Region assigned to entrants registered without one
pub const UNKNOWN_REGION: &str = "Unknown";

/// A team or player taking part in a tournament.
///
/// Immutable once a bracket has been generated from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    /// Entrant ID
    pub id: EntrantId,
    /// Display name
    pub name: String,
    /// Skill rating used by rating-based seeding
    #[serde(default)]
    pub rating: i32,
    /// Region used by regional seeding
    #[serde(default)]
    pub region: Option<String>,
    /// Seed (positive, unique within a tournament)
    pub seed: u32,
}

impl Entrant {
    /// Create a new entrant without a region
    pub fn new(id: EntrantId, name: impl Into<String>, rating: i32, seed: u32) -> Self {
        Self {
            id,
            name: name.into(),
            rating,
            region: None,
            seed,
        }
    }

    /// Set the entrant's region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Region for grouping, falling back to [`UNKNOWN_REGION`]
    pub fn region_or_unknown(&self) -> &str {
        self.region.as_deref().unwrap_or(UNKNOWN_REGION)
    }
}
