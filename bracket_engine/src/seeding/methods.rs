//! Seeding methods that put entrants into placement order.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::entrant::Entrant;
use crate::errors::EngineError;

/// How entrants are ordered before bracket construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMethod {
    /// Ascending seed
    #[default]
    Seed,
    /// Descending rating, ties by seed
    Rating,
    /// Rating order folded high/low: 1st, last, 2nd, second-last, ...
    Balanced,
    /// One entrant per region per pass, strongest region first
    Regional,
    /// Uniform shuffle
    Random,
}

impl SeedingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SeedingMethod::Seed => "seed",
            SeedingMethod::Rating => "rating",
            SeedingMethod::Balanced => "balanced",
            SeedingMethod::Regional => "regional",
            SeedingMethod::Random => "random",
        }
    }
}

impl FromStr for SeedingMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seed" | "manual" => Ok(SeedingMethod::Seed),
            "rating" => Ok(SeedingMethod::Rating),
            "balanced" => Ok(SeedingMethod::Balanced),
            "regional" => Ok(SeedingMethod::Regional),
            "random" => Ok(SeedingMethod::Random),
            other => Err(EngineError::InvalidConfiguration(format!(
                "unknown seeding method: {other}"
            ))),
        }
    }
}

impl fmt::Display for SeedingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rating descending, then seed ascending
fn by_rating(a: &Entrant, b: &Entrant) -> Ordering {
    b.rating.cmp(&a.rating).then(a.seed.cmp(&b.seed))
}

/// Applies seeding methods. Owns the RNG used by random seeding.
pub struct Seeder {
    rng: StdRng,
}

impl Seeder {
    /// Seeder with an entropy-seeded RNG
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Seeder with a fixed RNG seed, for reproducible draws
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeder over an existing RNG
    pub fn from_rng(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Return the entrants in placement order. The input is left untouched.
    pub fn apply(&mut self, entrants: &[Entrant], method: SeedingMethod) -> Vec<Entrant> {
        let mut ordered = entrants.to_vec();
        match method {
            SeedingMethod::Seed => ordered.sort_by_key(|e| e.seed),
            SeedingMethod::Rating => ordered.sort_by(by_rating),
            SeedingMethod::Balanced => {
                ordered.sort_by(by_rating);
                ordered = fold_high_low(ordered);
            }
            SeedingMethod::Regional => ordered = interleave_regions(ordered),
            SeedingMethod::Random => ordered.shuffle(&mut self.rng),
        }
        ordered
    }

    /// Shuffle in place with the owned RNG
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for Seeder {
    fn default() -> Self {
        Self::new()
    }
}

/// 1st, last, 2nd, second-last, ...
fn fold_high_low(sorted: Vec<Entrant>) -> Vec<Entrant> {
    let mut result = Vec::with_capacity(sorted.len());
    let mut deque: std::collections::VecDeque<Entrant> = sorted.into();
    let mut take_front = true;
    while let Some(entrant) = if take_front {
        deque.pop_front()
    } else {
        deque.pop_back()
    } {
        result.push(entrant);
        take_front = !take_front;
    }
    result
}

fn interleave_regions(entrants: Vec<Entrant>) -> Vec<Entrant> {
    let total = entrants.len();
    let mut groups: HashMap<String, Vec<Entrant>> = HashMap::new();
    for entrant in entrants {
        groups
            .entry(entrant.region_or_unknown().to_string())
            .or_default()
            .push(entrant);
    }

    let mut regions: Vec<(String, Vec<Entrant>)> = groups.into_iter().collect();
    for (_, group) in regions.iter_mut() {
        group.sort_by(by_rating);
    }
    // Groups are non-empty, so the strongest entrant is the first one
    regions.sort_by(|(name_a, a), (name_b, b)| by_rating(&a[0], &b[0]).then(name_a.cmp(name_b)));

    let mut result = Vec::with_capacity(total);
    let mut pass = 0;
    while result.len() < total {
        for (_, group) in &regions {
            if let Some(entrant) = group.get(pass) {
                result.push(entrant.clone());
            }
        }
        pass += 1;
    }
    result
}
