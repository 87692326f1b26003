//! Swiss-system pairing and standings.
//!
//! Round 1 is built by the generator. Each later round is paired from the
//! standings once every match of the previous round is finished:
//!
//! 1. [`compute_standings`] ranks entrants by wins, Buchholz, then seed
//! 2. [`pair_round`] pairs the active field without rematches, handing out at
//!    most one bye
//! 3. [`PairingPlan::into_matches`] turns the plan into round matches
//!
//! With `wins_required`/`losses_eliminated` set, entrants that reach either
//! threshold stop playing, and the stage ends once fewer than two are left.

pub mod pairing;
pub mod standings;

pub use pairing::{PairingPlan, pair_round};
pub use standings::{Standing, SwissStatus, compute_standings};

use crate::bracket::{Bracket, Match};
use crate::config::SwissOptions;
use crate::errors::EngineResult;

/// Default round count: `min(ceil(log2 n) + 1, n - 1)`
pub fn recommended_rounds(entrants: usize) -> u32 {
    if entrants < 2 {
        return 0;
    }
    let log = entrants.next_power_of_two().trailing_zeros();
    (log + 1).min(entrants as u32 - 1)
}

/// Default round count: enough for the last unresolved entrant to reach a
/// threshold when both are set, [`recommended_rounds`] otherwise. Capped at
/// `n - 1`.
pub fn default_rounds(entrants: usize, options: &SwissOptions) -> u32 {
    match (options.wins_required, options.losses_eliminated) {
        (Some(wins), Some(losses)) if entrants >= 2 => {
            (wins + losses - 1).min(entrants as u32 - 1)
        }
        _ => recommended_rounds(entrants),
    }
}

/// Fewer than two entrants are still unresolved, so nobody can be paired
fn is_resolved(standings: &[Standing]) -> bool {
    standings.iter().filter(|s| s.is_active()).count() < 2
}

/// The current round is finished and either every configured round has been
/// played or the thresholds have resolved the field
pub fn is_tournament_complete(bracket: &Bracket) -> bool {
    let current = bracket.rounds_generated;
    if !bracket.is_round_complete(current) {
        return false;
    }
    current >= bracket.round_count || is_resolved(&compute_standings(bracket))
}

/// Matches for the next round, or `None` while the current round is still
/// being played, when no rounds remain or when the field is resolved.
pub fn next_round(bracket: &Bracket, search_limit: u64) -> EngineResult<Option<Vec<Match>>> {
    let current = bracket.rounds_generated;
    if current >= bracket.round_count || !bracket.is_round_complete(current) {
        return Ok(None);
    }

    let standings = compute_standings(bracket);
    if is_resolved(&standings) {
        log::info!(
            "Swiss stage {} resolved after round {current}: {} qualified, {} eliminated",
            bracket.id,
            standings.iter().filter(|s| s.status == SwissStatus::Qualified).count(),
            standings.iter().filter(|s| s.status == SwissStatus::Eliminated).count()
        );
        return Ok(None);
    }
    let plan = pair_round(&standings, search_limit)?;
    Ok(Some(plan.into_matches(bracket.id, current + 1, bracket.best_of)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommended_rounds() {
        assert_eq!(recommended_rounds(2), 1);
        assert_eq!(recommended_rounds(3), 2);
        assert_eq!(recommended_rounds(4), 3);
        assert_eq!(recommended_rounds(6), 4);
        assert_eq!(recommended_rounds(8), 4);
        assert_eq!(recommended_rounds(9), 5);
        assert_eq!(recommended_rounds(32), 6);
    }

    #[test]
    fn test_default_rounds_with_thresholds() {
        let thresholds = SwissOptions::default().with_thresholds(3, 3);
        assert_eq!(default_rounds(16, &thresholds), 5);
        assert_eq!(default_rounds(4, &thresholds), 3);
        assert_eq!(default_rounds(16, &SwissOptions::default()), recommended_rounds(16));

        let wins_only = SwissOptions {
            wins_required: Some(3),
            ..SwissOptions::default()
        };
        assert_eq!(default_rounds(16, &wins_only), recommended_rounds(16));
    }
}
