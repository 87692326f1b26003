//! Swiss pairing for rounds after the first.
//!
//! Standings order already groups entrants by wins, so pairing walks it top
//! down: the top unpaired entrant meets the next entrant it has not played,
//! floating down into the next score group when its own group is exhausted.
//! A bounded backtracking search revisits earlier choices when a later entrant
//! would be left without a fresh opponent.

use log::error;
use serde::{Deserialize, Serialize};

use super::standings::Standing;
use crate::bracket::{BracketId, Match, MatchId, Slot};
use crate::config::BestOf;
use crate::entrant::EntrantId;
use crate::errors::{EngineError, EngineResult};

/// Pairings for one Swiss round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingPlan {
    /// Higher-standing entrant first
    pub pairs: Vec<(EntrantId, EntrantId)>,
    pub bye: Option<EntrantId>,
}

impl PairingPlan {
    /// Materialize the plan as matches of `round`, the bye numbered last
    pub fn into_matches(self, bracket: BracketId, round: u32, best_of: BestOf) -> Vec<Match> {
        let mut matches: Vec<Match> = self
            .pairs
            .iter()
            .enumerate()
            .map(|(i, &(one, two))| {
                Match::new(
                    MatchId::new(bracket, round, i as u32 + 1),
                    best_of,
                    [Slot::Entrant(one), Slot::Entrant(two)],
                )
            })
            .collect();

        if let Some(entrant) = self.bye {
            let id = MatchId::new(bracket, round, matches.len() as u32 + 1);
            matches.push(Match::bye(id, best_of, entrant));
        }
        matches
    }
}

struct Search<'a> {
    standings: &'a [Standing],
    paired: Vec<bool>,
    pairs: Vec<(usize, usize)>,
    budget: u64,
}

impl Search<'_> {
    fn run(&mut self) -> bool {
        let Some(top) = self.paired.iter().position(|p| !p) else {
            return true;
        };
        self.paired[top] = true;

        for candidate in top + 1..self.standings.len() {
            if self.paired[candidate]
                || self.standings[top].has_played(self.standings[candidate].entrant)
            {
                continue;
            }
            if self.budget == 0 {
                break;
            }
            self.budget -= 1;

            self.paired[candidate] = true;
            self.pairs.push((top, candidate));
            if self.run() {
                return true;
            }
            self.pairs.pop();
            self.paired[candidate] = false;
        }

        self.paired[top] = false;
        false
    }
}

/// Pair the next round from current standings (sorted, as returned by
/// [`compute_standings`](super::compute_standings)).
///
/// Only active entrants are paired; qualified and eliminated entrants sit the
/// round out. With an odd count, the bye goes to the lowest-standing entrant
/// among those with the fewest byes for which the rest of the field can still
/// be paired. Fails with [`EngineError::StructuralInvariantViolation`] when no
/// pairing without a rematch exists within `search_limit` steps.
pub fn pair_round(standings: &[Standing], search_limit: u64) -> EngineResult<PairingPlan> {
    let active: Vec<Standing> = standings.iter().filter(|s| s.is_active()).cloned().collect();
    let standings = active.as_slice();

    let mut search = Search {
        standings,
        paired: vec![false; standings.len()],
        pairs: Vec::with_capacity(standings.len() / 2),
        budget: search_limit,
    };

    let mut bye = None;
    let found = if standings.len() % 2 == 0 {
        search.run()
    } else {
        let mut candidates: Vec<usize> = (0..standings.len()).collect();
        candidates.sort_by(|&a, &b| standings[a].byes.cmp(&standings[b].byes).then(b.cmp(&a)));

        let mut found = false;
        for candidate in candidates {
            search.paired[candidate] = true;
            if search.run() {
                bye = Some(standings[candidate].entrant);
                found = true;
                break;
            }
            search.paired[candidate] = false;
            if search.budget == 0 {
                break;
            }
        }
        found
    };

    if !found {
        let summary: Vec<String> = standings
            .iter()
            .map(|s| {
                format!(
                    "#{} entrant {} ({}-{}, byes {}, played {:?})",
                    s.rank, s.entrant, s.wins, s.losses, s.byes, s.opponents
                )
            })
            .collect();
        error!(
            "Swiss pairing failed for {} entrants (budget left {}): {}",
            standings.len(),
            search.budget,
            summary.join(", ")
        );
        return Err(EngineError::StructuralInvariantViolation(format!(
            "no Swiss pairing without a rematch exists for {} entrants",
            standings.len()
        )));
    }

    let pairs = search
        .pairs
        .iter()
        .map(|&(a, b)| (standings[a].entrant, standings[b].entrant))
        .collect();
    Ok(PairingPlan { pairs, bye })
}
