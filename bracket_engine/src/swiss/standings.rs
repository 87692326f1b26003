//! Swiss standings: win/loss records and Buchholz tiebreak.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::bracket::{Bracket, MatchStatus};
use crate::config::SwissOptions;
use crate::entrant::EntrantId;

/// Whether an entrant is still playing the Swiss stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwissStatus {
    /// Paired in the next round
    #[default]
    Active,
    /// Reached the required wins
    Qualified,
    /// Reached the eliminating losses
    Eliminated,
}

impl SwissStatus {
    /// Status for a win/loss record under the stage's thresholds
    pub fn for_record(wins: u32, losses: u32, options: &SwissOptions) -> Self {
        if options.wins_required.is_some_and(|required| wins >= required) {
            SwissStatus::Qualified
        } else if options.losses_eliminated.is_some_and(|limit| losses >= limit) {
            SwissStatus::Eliminated
        } else {
            SwissStatus::Active
        }
    }
}

/// One entrant's Swiss record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub entrant: EntrantId,
    pub seed: u32,
    /// Byes count as wins
    pub wins: u32,
    pub losses: u32,
    pub byes: u32,
    /// Mean win total of the opponents in finished matches, 0 with none
    pub buchholz: f64,
    /// Everyone this entrant has been paired against, open matches included
    pub opponents: BTreeSet<EntrantId>,
    #[serde(default)]
    pub status: SwissStatus,
    /// 1-based position in the standings
    pub rank: usize,
}

impl Standing {
    fn new(entrant: EntrantId, seed: u32) -> Self {
        Self {
            entrant,
            seed,
            wins: 0,
            losses: 0,
            byes: 0,
            buchholz: 0.0,
            opponents: BTreeSet::new(),
            status: SwissStatus::Active,
            rank: 0,
        }
    }

    pub fn has_played(&self, other: EntrantId) -> bool {
        self.opponents.contains(&other)
    }

    pub fn is_active(&self) -> bool {
        self.status == SwissStatus::Active
    }
}

/// Compute standings from a Swiss bracket.
///
/// Records and Buchholz come from completed matches only. Pairing history
/// includes every match that paired two entrants and was not cancelled.
/// Sorted by wins, then Buchholz, then seed.
pub fn compute_standings(bracket: &Bracket) -> Vec<Standing> {
    let mut table: HashMap<EntrantId, Standing> = bracket
        .entrants
        .iter()
        .map(|e| (e.id, Standing::new(e.id, e.seed)))
        .collect();
    let mut finished: HashMap<EntrantId, Vec<EntrantId>> = HashMap::new();

    for game in &bracket.matches {
        if game.status == MatchStatus::Cancelled {
            continue;
        }

        if let Some((one, two)) = game.entrants() {
            if let Some(standing) = table.get_mut(&one) {
                standing.opponents.insert(two);
            }
            if let Some(standing) = table.get_mut(&two) {
                standing.opponents.insert(one);
            }
        }

        if game.status != MatchStatus::Completed {
            continue;
        }

        if let Some((one, two)) = game.entrants() {
            finished.entry(one).or_default().push(two);
            finished.entry(two).or_default().push(one);
        }

        if let Some(winner) = game.winner.and_then(|id| table.get_mut(&id)) {
            winner.wins += 1;
            if game.is_bye() {
                winner.byes += 1;
            }
        }
        if let Some(loser) = game.loser.and_then(|id| table.get_mut(&id)) {
            loser.losses += 1;
        }
    }

    let options = bracket.swiss.unwrap_or_default();
    let wins: HashMap<EntrantId, u32> = table.iter().map(|(id, s)| (*id, s.wins)).collect();
    for standing in table.values_mut() {
        if let Some(opponents) = finished.get(&standing.entrant) {
            let total: u32 = opponents
                .iter()
                .map(|id| wins.get(id).copied().unwrap_or(0))
                .sum();
            standing.buchholz = f64::from(total) / opponents.len() as f64;
        }
        standing.status = SwissStatus::for_record(standing.wins, standing.losses, &options);
    }

    let mut standings: Vec<Standing> = table.into_values().collect();
    standings.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.buchholz.total_cmp(&a.buchholz))
            .then(a.seed.cmp(&b.seed))
    });
    for (i, standing) in standings.iter_mut().enumerate() {
        standing.rank = i + 1;
    }
    standings
}
