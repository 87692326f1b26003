//! Double elimination: linked upper, lower and grand-final brackets.
//!
//! For `N = 2^k` entrants the upper bracket is a plain elimination tree of `k`
//! rounds. The lower bracket has `2(k - 1)` rounds:
//!
//! - round 1 pairs the losers of upper round 1 (M1 with M2, M3 with M4, ...)
//! - even round `2j` sets each lower winner against a loser dropping from
//!   upper round `j + 1`, taken in reverse order so rematches come late
//! - odd round `2j + 1` consolidates winners of round `2j`
//!
//! The grand final takes the upper champion in slot one and the lower
//! champion in slot two. Its reset is appended during progression.

use super::generator::{GenerateBracket, new_bracket, wire_placeholders};
use super::models::{Bracket, BracketId, BracketKind, Match, MatchId, Slot, TournamentId};
use super::single::build_tree;
use crate::config::{BestOfConfig, Format};
use crate::entrant::Entrant;
use crate::errors::{EngineError, EngineResult};
use crate::seeding::Seeder;

#[derive(Debug, Clone)]
pub struct DoubleEliminationGenerator {
    best_of: BestOfConfig,
}

impl DoubleEliminationGenerator {
    pub fn new(best_of: BestOfConfig) -> Self {
        Self { best_of }
    }
}

/// Lower-bracket rounds for `count` entrants (a power of two, at least 4)
pub fn lower_round_count(count: usize) -> u32 {
    2 * (count.trailing_zeros() - 1)
}

fn build_lower(lower: BracketId, upper: BracketId, count: usize, best_of: &BestOfConfig) -> Vec<Match> {
    let k = count.trailing_zeros();
    let rounds = lower_round_count(count);
    let mut matches = Vec::new();

    let first = (count / 4) as u32;
    for i in 1..=first {
        matches.push(Match::new(
            MatchId::new(lower, 1, i),
            best_of.for_round(1, rounds),
            [
                Slot::Loser(MatchId::new(upper, 1, 2 * i - 1)),
                Slot::Loser(MatchId::new(upper, 1, 2 * i)),
            ],
        ));
    }

    for j in 1..k {
        // Drop-in round: lower survivors meet upper round j + 1 losers
        let round = 2 * j;
        let size = (count >> (j + 1)) as u32;
        for i in 1..=size {
            matches.push(Match::new(
                MatchId::new(lower, round, i),
                best_of.for_round(round, rounds),
                [
                    Slot::Winner(MatchId::new(lower, round - 1, i)),
                    Slot::Loser(MatchId::new(upper, j + 1, size + 1 - i)),
                ],
            ));
        }

        if j + 1 == k {
            break;
        }

        // Consolidation round
        let round = 2 * j + 1;
        for i in 1..=size / 2 {
            matches.push(Match::new(
                MatchId::new(lower, round, i),
                best_of.for_round(round, rounds),
                [
                    Slot::Winner(MatchId::new(lower, round - 1, 2 * i - 1)),
                    Slot::Winner(MatchId::new(lower, round - 1, 2 * i)),
                ],
            ));
        }
    }

    matches
}

impl GenerateBracket for DoubleEliminationGenerator {
    fn format(&self) -> Format {
        Format::DoubleElimination
    }

    fn generate(
        &self,
        tournament: TournamentId,
        entrants: &[Entrant],
        _seeder: &mut Seeder,
    ) -> EngineResult<Vec<Bracket>> {
        let count = entrants.len();
        if count < 4 || !count.is_power_of_two() {
            return Err(EngineError::InvalidConfiguration(format!(
                "double elimination needs a power-of-two entrant count of at least 4, got {count}"
            )));
        }

        let upper_id = BracketId::new(tournament, BracketKind::Upper);
        let lower_id = BracketId::new(tournament, BracketKind::Lower);
        let final_id = BracketId::new(tournament, BracketKind::GrandFinal);

        let mut upper = new_bracket(
            upper_id,
            "Upper Bracket",
            Format::DoubleElimination,
            entrants,
            self.best_of.default,
        );
        let (upper_rounds, matches) = build_tree(upper_id, entrants, &self.best_of);
        upper.round_count = upper_rounds;
        upper.rounds_generated = upper_rounds;
        upper.matches = matches;

        let mut lower = new_bracket(
            lower_id,
            "Lower Bracket",
            Format::DoubleElimination,
            entrants,
            self.best_of.default,
        );
        let lower_rounds = lower_round_count(count);
        lower.parent = Some(upper_id);
        lower.round_count = lower_rounds;
        lower.rounds_generated = lower_rounds;
        lower.matches = build_lower(lower_id, upper_id, count, &self.best_of);

        let grand_final_best_of = self.best_of.for_grand_final();
        let mut grand_final = new_bracket(
            final_id,
            "Grand Final",
            Format::DoubleElimination,
            entrants,
            grand_final_best_of,
        );
        grand_final.parent = Some(upper_id);
        grand_final.round_count = 1;
        grand_final.rounds_generated = 1;
        grand_final.matches = vec![Match::new(
            MatchId::new(final_id, 1, 1),
            grand_final_best_of,
            [
                Slot::Winner(MatchId::new(upper_id, upper_rounds, 1)),
                Slot::Winner(MatchId::new(lower_id, lower_rounds, 1)),
            ],
        )];

        let mut brackets = vec![upper, lower, grand_final];
        wire_placeholders(&mut brackets)?;
        Ok(brackets)
    }
}
