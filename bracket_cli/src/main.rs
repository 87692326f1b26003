//! Command-line driver for the bracket engine.
//!
//! Loads an entrant list, generates a tournament in memory, optionally plays
//! it out with concurrent match completions, and prints the bracket export
//! as JSON on stdout.

mod config;
mod logging;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Error;
use bracket_engine::TournamentManager;
use bracket_engine::bracket::{Match, MatchResult, TournamentId};
use bracket_engine::config::Format;
use bracket_engine::entrant::{Entrant, EntrantId};
use bracket_engine::notify::NullNotifier;
use bracket_engine::ranking::StaticRatings;
use bracket_engine::seeding::Seeder;
use bracket_engine::store::InMemoryBracketRepository;
use log::{info, warn};
use pico_args::Arguments;
use serde_json::json;
use tokio::task::JoinSet;

use config::{CliConfig, CliOverrides};

const HELP: &str = "\
Generate (and optionally play out) an esports tournament bracket

USAGE:
  bracket --entrants FILE [OPTIONS]

OPTIONS:
  --entrants           FILE   JSON array of entrants  [default: env BRACKET_ENTRANTS_FILE]
  --tournament-id      ID     Tournament id  [default: env BRACKET_TOURNAMENT_ID or 1]
  --format             NAME   single_elimination, double_elimination, swiss, round_robin
                              [default: env BRACKET_FORMAT or single_elimination]
  --seeding            NAME   seed, rating, balanced, regional, random
                              [default: env BRACKET_SEEDING or seed]
  --best-of            N      Match length, e.g. 3 or bo3  [default: env BRACKET_BEST_OF or 1]
  --finals-best-of     N      Length of final rounds  [default: env BRACKET_FINALS_BEST_OF]
  --grand-final-best-of N     Length of the grand final  [default: env BRACKET_GRAND_FINAL_BEST_OF]
  --third-place-best-of N     Length of the third-place match  [default: env BRACKET_THIRD_PLACE_BEST_OF]
  --swiss-rounds       N      Swiss round count  [default: recommended for the field]
  --swiss-first-round  NAME   folding, adjacent, random  [default: folding]
  --swiss-wins         N      Wins that qualify a Swiss entrant  [default: env BRACKET_SWISS_WINS_REQUIRED]
  --swiss-losses       N      Losses that eliminate a Swiss entrant  [default: env BRACKET_SWISS_LOSSES_ELIMINATED]
  --rng-seed           N      Seed for random draws  [default: env BRACKET_RNG_SEED]

FLAGS:
  --double-round-robin        Play every round-robin pairing twice
  --third-place-match         Single elimination: semifinal losers play for third
  --simulate                  Play every match, the better placement winning
  -h, --help                  Print help information

ENVIRONMENT:
  RUST_LOG                      Log filter (logs go to stderr)
  BRACKET_MAX_WRITE_RETRIES     Attempts per match write  [default: 8]
  BRACKET_PAIRING_SEARCH_LIMIT  Swiss pairing search budget  [default: 100000]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = CliOverrides {
        entrants: pargs.opt_value_from_str::<_, PathBuf>("--entrants")?,
        tournament_id: pargs.opt_value_from_str("--tournament-id")?,
        format: pargs.opt_value_from_str("--format")?,
        seeding: pargs.opt_value_from_str("--seeding")?,
        best_of: pargs.opt_value_from_str("--best-of")?,
        finals_best_of: pargs.opt_value_from_str("--finals-best-of")?,
        grand_final_best_of: pargs.opt_value_from_str("--grand-final-best-of")?,
        third_place_best_of: pargs.opt_value_from_str("--third-place-best-of")?,
        swiss_rounds: pargs.opt_value_from_str("--swiss-rounds")?,
        swiss_first_round: pargs.opt_value_from_str("--swiss-first-round")?,
        swiss_wins_required: pargs.opt_value_from_str("--swiss-wins")?,
        swiss_losses_eliminated: pargs.opt_value_from_str("--swiss-losses")?,
        double_round_robin: pargs.contains("--double-round-robin"),
        third_place_match: pargs.contains("--third-place-match"),
        rng_seed: pargs.opt_value_from_str("--rng-seed")?,
        simulate: pargs.contains("--simulate"),
    };

    logging::init();

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        warn!("Ignoring unrecognized arguments: {remaining:?}");
    }

    let config = CliConfig::from_env(overrides)?;
    config.validate()?;

    let entrants = load_entrants(&config.entrants)?;
    info!(
        "Loaded {} entrants from {}",
        entrants.len(),
        config.entrants.display()
    );

    let seeder = match config.rng_seed {
        Some(seed) => Seeder::with_seed(seed),
        None => Seeder::new(),
    };
    let manager = TournamentManager::new(
        Arc::new(InMemoryBracketRepository::new()),
        Arc::new(NullNotifier),
        Arc::new(StaticRatings::new()),
        config.engine.clone(),
    )
    .with_seeder(seeder);

    let tournament = config.tournament_id;
    let brackets = manager
        .create_tournament(tournament, entrants, &config.options)
        .await?;

    if config.simulate {
        // Brackets keep their entrants in placement order
        let placement: HashMap<EntrantId, usize> = brackets
            .first()
            .map(|b| {
                b.entrants
                    .iter()
                    .enumerate()
                    .map(|(i, e)| (e.id, i))
                    .collect()
            })
            .unwrap_or_default();

        let played = simulate(&manager, tournament, &placement).await?;
        info!("Simulation finished after {played} matches");
    }

    let standings = match config.options.format {
        Format::SingleElimination => serde_json::to_value(manager.placements(tournament).await?)?,
        Format::Swiss => serde_json::to_value(manager.swiss_standings(tournament).await?)?,
        Format::RoundRobin => {
            serde_json::to_value(manager.round_robin_standings(tournament).await?)?
        }
        Format::DoubleElimination => serde_json::Value::Null,
    };

    let report = json!({
        "tournament": tournament,
        "format": config.options.format,
        "brackets": manager.export_tournament(tournament).await?,
        "standings": standings,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Read a JSON array of entrants
fn load_entrants(path: &Path) -> Result<Vec<Entrant>, Error> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("Failed to parse entrants in {}: {}", path.display(), e))
}

/// Result in which the better placement wins without dropping a game
fn favourite_result(game: &Match, placement: &HashMap<EntrantId, usize>) -> Option<MatchResult> {
    let (one, two) = game.entrants()?;
    let rank = |id: EntrantId| placement.get(&id).copied().unwrap_or(usize::MAX);
    let threshold = game.best_of.win_threshold();
    Some(if rank(one) <= rank(two) {
        MatchResult::Score {
            one: threshold,
            two: 0,
        }
    } else {
        MatchResult::Score {
            one: 0,
            two: threshold,
        }
    })
}

/// Complete ready matches in concurrent waves until none are left
async fn simulate(
    manager: &TournamentManager,
    tournament: TournamentId,
    placement: &HashMap<EntrantId, usize>,
) -> Result<usize, Error> {
    let mut played = 0;
    loop {
        let ready = manager.ready_matches(tournament).await?;
        if ready.is_empty() {
            return Ok(played);
        }

        let mut tasks = JoinSet::new();
        for game in ready {
            let Some(result) = favourite_result(&game, placement) else {
                continue;
            };
            let manager = manager.clone();
            tasks.spawn(async move { manager.complete_match(game.id, result).await });
        }

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined??;
            played += 1;
            if let Some(triggered) = outcome.triggered {
                info!("{}/{} triggered {:?}", outcome.match_id.bracket, outcome.match_id, triggered);
            }
        }
    }
}
