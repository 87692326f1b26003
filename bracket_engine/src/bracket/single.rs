//! Single elimination: generation and final placements.

use serde::{Deserialize, Serialize};

use super::generator::{GenerateBracket, new_bracket, wire_placeholders};
use super::models::{Bracket, BracketId, BracketKind, Match, MatchId, Slot, TournamentId};
use crate::config::{BestOfConfig, Format};
use crate::entrant::{Entrant, EntrantId};
use crate::errors::{EngineError, EngineResult};
use crate::seeding::Seeder;

/// Higher placement of each first-round pairing, in bracket order.
///
/// For a bracket of `size` positions, pairing `i` is
/// `(order[i], size + 1 - order[i])`. Top placements meet as late as
/// possible: for 8 the pairings are 1v8, 4v5, 3v6, 2v7.
pub fn higher_seed_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() * 2 < size {
        let m = order.len() * 2;
        let mut next = Vec::with_capacity(m);
        for (i, &s) in order.iter().enumerate() {
            if i == 0 {
                next.extend([s, m + 1 - s]);
            } else {
                next.extend([m + 1 - s, s]);
            }
        }
        order = next;
    }
    order
}

/// Build a full elimination tree in `bracket`.
///
/// Placements without an opponent receive a bye: no match is created and the
/// entrant is written straight into its round-2 slot. Returns the round count.
pub(crate) fn build_tree(
    bracket: BracketId,
    entrants: &[Entrant],
    best_of: &BestOfConfig,
) -> (u32, Vec<Match>) {
    let count = entrants.len();
    let size = count.next_power_of_two();
    let rounds = size.trailing_zeros();

    let mut matches = Vec::with_capacity(count.saturating_sub(1));
    let mut feeders = Vec::with_capacity(size / 2);
    let mut number = 0;

    for high in higher_seed_order(size) {
        let low = size + 1 - high;
        let top = &entrants[high - 1];
        if low > count {
            feeders.push(Slot::Entrant(top.id));
            continue;
        }
        number += 1;
        let id = MatchId::new(bracket, 1, number);
        let bottom = &entrants[low - 1];
        matches.push(Match::new(
            id,
            best_of.for_round(1, rounds),
            [Slot::Entrant(top.id), Slot::Entrant(bottom.id)],
        ));
        feeders.push(Slot::Winner(id));
    }

    for round in 2..=rounds {
        let mut next = Vec::with_capacity(feeders.len() / 2);
        for (i, pair) in feeders.chunks(2).enumerate() {
            let id = MatchId::new(bracket, round, i as u32 + 1);
            matches.push(Match::new(
                id,
                best_of.for_round(round, rounds),
                [pair[0], pair[1]],
            ));
            next.push(Slot::Winner(id));
        }
        feeders = next;
    }

    (rounds, matches)
}

#[derive(Debug, Clone)]
pub struct SingleEliminationGenerator {
    best_of: BestOfConfig,
    third_place: bool,
}

impl SingleEliminationGenerator {
    pub fn new(best_of: BestOfConfig) -> Self {
        Self {
            best_of,
            third_place: false,
        }
    }

    /// Also generate a match between the two semifinal losers
    pub fn with_third_place(mut self, third_place: bool) -> Self {
        self.third_place = third_place;
        self
    }
}

/// Single-match bracket fed by the losers of both semifinals
fn third_place_bracket(main: &Bracket, entrants: &[Entrant], best_of: &BestOfConfig) -> Bracket {
    let id = BracketId::new(main.id.tournament, BracketKind::ThirdPlace);
    let length = best_of.for_third_place();
    let semifinal = main.round_count - 1;

    let mut bracket = new_bracket(
        id,
        "Third Place Match",
        Format::SingleElimination,
        entrants,
        length,
    );
    bracket.parent = Some(main.id);
    bracket.team_count = 2;
    bracket.round_count = 1;
    bracket.rounds_generated = 1;
    bracket.matches = vec![Match::new(
        MatchId::new(id, 1, 1),
        length,
        [
            Slot::Loser(MatchId::new(main.id, semifinal, 1)),
            Slot::Loser(MatchId::new(main.id, semifinal, 2)),
        ],
    )];
    bracket
}

impl GenerateBracket for SingleEliminationGenerator {
    fn format(&self) -> Format {
        Format::SingleElimination
    }

    fn generate(
        &self,
        tournament: TournamentId,
        entrants: &[Entrant],
        _seeder: &mut Seeder,
    ) -> EngineResult<Vec<Bracket>> {
        if entrants.len() < 2 {
            return Err(EngineError::InvalidConfiguration(format!(
                "single elimination needs at least 2 entrants, got {}",
                entrants.len()
            )));
        }
        if self.third_place && entrants.len() < 4 {
            return Err(EngineError::InvalidConfiguration(format!(
                "a third-place match needs at least 4 entrants, got {}",
                entrants.len()
            )));
        }

        let id = BracketId::new(tournament, BracketKind::Main);
        let mut bracket = new_bracket(
            id,
            "Main Bracket",
            Format::SingleElimination,
            entrants,
            self.best_of.default,
        );
        let (rounds, matches) = build_tree(id, entrants, &self.best_of);
        bracket.round_count = rounds;
        bracket.rounds_generated = rounds;
        bracket.matches = matches;

        let mut brackets = vec![bracket];
        if self.third_place {
            let third_place = third_place_bracket(&brackets[0], entrants, &self.best_of);
            brackets.push(third_place);
        }
        wire_placeholders(&mut brackets)?;
        Ok(brackets)
    }
}

/// Final placement of an entrant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub entrant: EntrantId,
    /// Best place in the range
    pub place: u32,
    /// `1st`, `2nd`, `3rd-4th`, `5th-8th`, ...
    pub label: String,
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Placements decided so far in a single-elimination bracket.
///
/// The champion is listed once the final is completed. Losers share a place
/// range by the round they were knocked out in, except that a completed
/// third-place match splits the semifinal losers into 3rd and 4th.
pub fn placements(
    bracket: &Bracket,
    third_place: Option<&Bracket>,
) -> EngineResult<Vec<Placement>> {
    if bracket.id.kind != BracketKind::Main {
        return Err(EngineError::InvalidConfiguration(format!(
            "placements are only defined for single elimination, not {}",
            bracket.id.kind
        )));
    }

    let decider = third_place
        .and_then(|b| b.matches.first())
        .filter(|m| m.is_completed())
        .and_then(|m| m.winner.zip(m.loser));

    let mut placements = Vec::new();
    if let Some((third, fourth)) = decider {
        for (entrant, place) in [(third, 3), (fourth, 4)] {
            placements.push(Placement {
                entrant,
                place,
                label: ordinal(place),
            });
        }
    }

    for game in bracket.matches.iter().filter(|m| m.is_completed()) {
        let from_end = bracket.round_count - game.id.round + 1;
        if from_end == 2 && decider.is_some() {
            continue;
        }
        if from_end == 1 {
            if let Some(champion) = game.winner {
                placements.push(Placement {
                    entrant: champion,
                    place: 1,
                    label: ordinal(1),
                });
            }
        }
        if let Some(loser) = game.loser {
            let low = 2u32.pow(from_end - 1) + 1;
            let high = 2u32.pow(from_end);
            let label = if low == high {
                ordinal(low)
            } else {
                format!("{}-{}", ordinal(low), ordinal(high))
            };
            placements.push(Placement {
                entrant: loser,
                place: low,
                label,
            });
        }
    }

    placements.sort_by_key(|p| p.place);
    Ok(placements)
}
