//! Tournament options and engine configuration.
//!
//! [`TournamentOptions`] describes one tournament (format, seeding, match
//! lengths) and is usually deserialized from caller input. [`EngineConfig`]
//! tunes the engine itself and is loaded from the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{EngineError, EngineResult};
use crate::seeding::SeedingMethod;

/// Number of games in a match. Always odd and at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BestOf(u32);

impl BestOf {
    /// Single game
    pub const ONE: BestOf = BestOf(1);
    /// Best of three
    pub const THREE: BestOf = BestOf(3);
    /// Best of five
    pub const FIVE: BestOf = BestOf(5);

    /// Create a best-of format, rejecting zero and even game counts
    pub fn new(games: u32) -> EngineResult<Self> {
        if games == 0 || games % 2 == 0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "best-of must be a positive odd number, got {games}"
            )));
        }
        Ok(Self(games))
    }

    /// Number of games
    pub fn games(self) -> u32 {
        self.0
    }

    /// Games needed to win the match: `ceil((N + 1) / 2)`
    pub fn win_threshold(self) -> u32 {
        (self.0 + 2) / 2
    }
}

impl Default for BestOf {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for BestOf {
    type Error = EngineError;

    fn try_from(games: u32) -> Result<Self, Self::Error> {
        Self::new(games)
    }
}

impl From<BestOf> for u32 {
    fn from(best_of: BestOf) -> Self {
        best_of.0
    }
}

impl FromStr for BestOf {
    type Err = EngineError;

    /// Accepts `3`, `bo3` and `BO3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("bo")
            .or_else(|| trimmed.strip_prefix("BO"))
            .or_else(|| trimmed.strip_prefix("Bo"))
            .unwrap_or(trimmed);
        let games = digits.parse::<u32>().map_err(|_| {
            EngineError::InvalidConfiguration(format!("invalid best-of format: {s}"))
        })?;
        Self::new(games)
    }
}

impl fmt::Display for BestOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bo{}", self.0)
    }
}

/// Tournament format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    SingleElimination,
    DoubleElimination,
    Swiss,
    RoundRobin,
}

impl Format {
    /// Minimum entrant count accepted by the format
    pub fn min_entrants(self) -> usize {
        match self {
            Format::DoubleElimination => 4,
            _ => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Format::SingleElimination => "single_elimination",
            Format::DoubleElimination => "double_elimination",
            Format::Swiss => "swiss",
            Format::RoundRobin => "round_robin",
        }
    }
}

impl FromStr for Format {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single_elimination" => Ok(Format::SingleElimination),
            "double_elimination" => Ok(Format::DoubleElimination),
            "swiss" => Ok(Format::Swiss),
            "round_robin" => Ok(Format::RoundRobin),
            other => Err(EngineError::InvalidConfiguration(format!(
                "unknown tournament format: {other}"
            ))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match lengths per phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BestOfConfig {
    /// Length of every match without a more specific setting
    pub default: BestOf,
    /// Last round of the main, upper and lower brackets
    pub finals: Option<BestOf>,
    /// Grand final (and its reset)
    pub grand_final: Option<BestOf>,
    /// Single-elimination third-place match
    pub third_place: Option<BestOf>,
}

impl BestOfConfig {
    /// Same length for every phase
    pub fn uniform(best_of: BestOf) -> Self {
        Self {
            default: best_of,
            finals: None,
            grand_final: None,
            third_place: None,
        }
    }

    /// Length for a round of an elimination bracket with `round_count` rounds
    pub fn for_round(&self, round: u32, round_count: u32) -> BestOf {
        if round == round_count {
            self.finals.unwrap_or(self.default)
        } else {
            self.default
        }
    }

    pub fn for_grand_final(&self) -> BestOf {
        self.grand_final
            .or(self.finals)
            .unwrap_or(self.default)
    }

    /// Played alongside the final, so it falls back to the finals length
    pub fn for_third_place(&self) -> BestOf {
        self.third_place
            .or(self.finals)
            .unwrap_or(self.default)
    }
}

/// How the first Swiss round is paired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwissFirstRound {
    /// Top half against bottom half (1 v n/2+1, 2 v n/2+2, ...)
    #[default]
    Folding,
    /// Neighbours in placement order (1v2, 3v4, ...)
    Adjacent,
    /// Shuffled, then paired as neighbours
    Random,
}

impl FromStr for SwissFirstRound {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "folding" => Ok(SwissFirstRound::Folding),
            "adjacent" => Ok(SwissFirstRound::Adjacent),
            "random" => Ok(SwissFirstRound::Random),
            other => Err(EngineError::InvalidConfiguration(format!(
                "unknown swiss first-round method: {other}"
            ))),
        }
    }
}

/// Swiss-specific options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwissOptions {
    /// Number of rounds; the recommended count is used when omitted
    pub rounds: Option<u32>,
    /// First-round pairing method
    pub first_round: SwissFirstRound,
    /// Wins that qualify an entrant; qualified entrants stop playing
    pub wins_required: Option<u32>,
    /// Losses that eliminate an entrant; eliminated entrants stop playing
    pub losses_eliminated: Option<u32>,
}

impl SwissOptions {
    /// Stage that ends for an entrant at `wins` wins or `losses` losses
    pub fn with_thresholds(mut self, wins: u32, losses: u32) -> Self {
        self.wins_required = Some(wins);
        self.losses_eliminated = Some(losses);
        self
    }
}

/// Options supplied when a tournament's brackets are generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentOptions {
    /// Tournament format
    pub format: Format,
    /// Seeding method applied before generation
    #[serde(default)]
    pub seeding: SeedingMethod,
    /// Match lengths
    #[serde(default)]
    pub best_of: BestOfConfig,
    /// Swiss options (ignored by other formats)
    #[serde(default)]
    pub swiss: SwissOptions,
    /// Play every round-robin pairing twice
    #[serde(default)]
    pub double_round_robin: bool,
    /// Single elimination: semifinal losers play for third place
    #[serde(default)]
    pub third_place_match: bool,
}

impl TournamentOptions {
    /// Options for a format with default seeding and single-game matches
    pub fn new(format: Format) -> Self {
        Self {
            format,
            seeding: SeedingMethod::default(),
            best_of: BestOfConfig::default(),
            swiss: SwissOptions::default(),
            double_round_robin: false,
            third_place_match: false,
        }
    }

    pub fn with_seeding(mut self, seeding: SeedingMethod) -> Self {
        self.seeding = seeding;
        self
    }

    pub fn with_best_of(mut self, best_of: BestOfConfig) -> Self {
        self.best_of = best_of;
        self
    }

    pub fn with_swiss(mut self, swiss: SwissOptions) -> Self {
        self.swiss = swiss;
        self
    }

    pub fn with_double_round_robin(mut self, enabled: bool) -> Self {
        self.double_round_robin = enabled;
        self
    }

    pub fn with_third_place_match(mut self, enabled: bool) -> Self {
        self.third_place_match = enabled;
        self
    }
}

/// Engine tuning loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Attempts per match write before a conflict is surfaced
    pub max_write_retries: u32,
    /// Node budget for the Swiss pairing search
    pub pairing_search_limit: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_write_retries: 8,
            pairing_search_limit: 100_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// - `BRACKET_MAX_WRITE_RETRIES` (default 8)
    /// - `BRACKET_PAIRING_SEARCH_LIMIT` (default 100000)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_write_retries: parse_env_or("BRACKET_MAX_WRITE_RETRIES", defaults.max_write_retries),
            pairing_search_limit: parse_env_or(
                "BRACKET_PAIRING_SEARCH_LIMIT",
                defaults.pairing_search_limit,
            ),
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_write_retries == 0 {
            return Err(EngineError::InvalidConfiguration(
                "BRACKET_MAX_WRITE_RETRIES must be greater than 0".to_string(),
            ));
        }

        if self.pairing_search_limit == 0 {
            return Err(EngineError::InvalidConfiguration(
                "BRACKET_PAIRING_SEARCH_LIMIT must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
