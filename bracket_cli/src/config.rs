//! CLI configuration management.
//!
//! Flags win over environment variables, which win over defaults.

use bracket_engine::bracket::TournamentId;
use bracket_engine::config::{
    BestOf, BestOfConfig, EngineConfig, Format, SwissFirstRound, SwissOptions, TournamentOptions,
};
use bracket_engine::seeding::SeedingMethod;
use std::path::PathBuf;
use std::str::FromStr;

/// Values given on the command line. Each one overrides its environment
/// variable.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub entrants: Option<PathBuf>,
    pub tournament_id: Option<TournamentId>,
    pub format: Option<String>,
    pub seeding: Option<String>,
    pub best_of: Option<String>,
    pub finals_best_of: Option<String>,
    pub grand_final_best_of: Option<String>,
    pub third_place_best_of: Option<String>,
    pub swiss_rounds: Option<u32>,
    pub swiss_first_round: Option<String>,
    pub swiss_wins_required: Option<u32>,
    pub swiss_losses_eliminated: Option<u32>,
    pub double_round_robin: bool,
    pub third_place_match: bool,
    pub rng_seed: Option<u64>,
    pub simulate: bool,
}

/// Complete CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// JSON file holding the entrant list
    pub entrants: PathBuf,
    pub tournament_id: TournamentId,
    pub options: TournamentOptions,
    /// Seed for random draws; a fresh one is used when absent
    pub rng_seed: Option<u64>,
    /// Play the tournament to the end after generating it
    pub simulate: bool,
    pub engine: EngineConfig,
}

impl CliConfig {
    /// Load configuration from flags and environment variables
    ///
    /// # Errors
    ///
    /// Returns error if the entrant file is not given or a value does not parse
    pub fn from_env(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let entrants = overrides
            .entrants
            .or_else(|| std::env::var("BRACKET_ENTRANTS_FILE").ok().map(PathBuf::from))
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "BRACKET_ENTRANTS_FILE".to_string(),
                hint: "Pass --entrants FILE or point the variable at a JSON entrant list"
                    .to_string(),
            })?;

        let tournament_id = overrides
            .tournament_id
            .unwrap_or_else(|| parse_env_or("BRACKET_TOURNAMENT_ID", 1));

        let format: Format = parse_setting("BRACKET_FORMAT", overrides.format)?
            .unwrap_or(Format::SingleElimination);
        let seeding: SeedingMethod =
            parse_setting("BRACKET_SEEDING", overrides.seeding)?.unwrap_or_default();

        let best_of = BestOfConfig {
            default: parse_setting("BRACKET_BEST_OF", overrides.best_of)?.unwrap_or(BestOf::ONE),
            finals: parse_setting("BRACKET_FINALS_BEST_OF", overrides.finals_best_of)?,
            grand_final: parse_setting("BRACKET_GRAND_FINAL_BEST_OF", overrides.grand_final_best_of)?,
            third_place: parse_setting("BRACKET_THIRD_PLACE_BEST_OF", overrides.third_place_best_of)?,
        };

        let swiss = SwissOptions {
            rounds: match overrides.swiss_rounds {
                Some(rounds) => Some(rounds),
                None => parse_setting("BRACKET_SWISS_ROUNDS", None)?,
            },
            first_round: parse_setting::<SwissFirstRound>(
                "BRACKET_SWISS_FIRST_ROUND",
                overrides.swiss_first_round,
            )?
            .unwrap_or_default(),
            wins_required: match overrides.swiss_wins_required {
                Some(wins) => Some(wins),
                None => parse_setting("BRACKET_SWISS_WINS_REQUIRED", None)?,
            },
            losses_eliminated: match overrides.swiss_losses_eliminated {
                Some(losses) => Some(losses),
                None => parse_setting("BRACKET_SWISS_LOSSES_ELIMINATED", None)?,
            },
        };

        let double_round_robin =
            overrides.double_round_robin || parse_env_or("BRACKET_DOUBLE_ROUND_ROBIN", false);
        let third_place_match =
            overrides.third_place_match || parse_env_or("BRACKET_THIRD_PLACE_MATCH", false);

        let rng_seed = match overrides.rng_seed {
            Some(seed) => Some(seed),
            None => parse_setting("BRACKET_RNG_SEED", None)?,
        };

        let options = TournamentOptions::new(format)
            .with_seeding(seeding)
            .with_best_of(best_of)
            .with_swiss(swiss)
            .with_double_round_robin(double_round_robin)
            .with_third_place_match(third_place_match);

        Ok(CliConfig {
            entrants,
            tournament_id,
            options,
            rng_seed,
            simulate: overrides.simulate || parse_env_or("BRACKET_SIMULATE", false),
            engine: EngineConfig::from_env(),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.options.swiss.rounds == Some(0) {
            return Err(ConfigError::Invalid {
                var: "BRACKET_SWISS_ROUNDS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        for (var, threshold) in [
            ("BRACKET_SWISS_WINS_REQUIRED", self.options.swiss.wins_required),
            ("BRACKET_SWISS_LOSSES_ELIMINATED", self.options.swiss.losses_eliminated),
        ] {
            if threshold == Some(0) {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
        }

        if self.options.third_place_match && self.options.format != Format::SingleElimination {
            return Err(ConfigError::Invalid {
                var: "BRACKET_THIRD_PLACE_MATCH".to_string(),
                reason: format!("Only applies to single_elimination, not {}", self.options.format),
            });
        }

        if self.options.double_round_robin && self.options.format != Format::RoundRobin {
            return Err(ConfigError::Invalid {
                var: "BRACKET_DOUBLE_ROUND_ROBIN".to_string(),
                reason: format!("Only applies to round_robin, not {}", self.options.format),
            });
        }

        self.engine
            .validate()
            .map_err(|err| ConfigError::Engine(err.to_string()))
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Invalid engine configuration: {0}")]
    Engine(String),
}

/// Parse a flag value, falling back to an environment variable.
///
/// Unlike [`parse_env_or`], a value that is present but malformed is an error.
fn parse_setting<T>(key: &str, flag: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = flag.or_else(|| std::env::var(key).ok()) else {
        return Ok(None);
    };
    raw.parse().map(Some).map_err(|err: T::Err| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("{raw:?}: {err}"),
    })
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
