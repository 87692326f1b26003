//! Round robin: circle-method schedule and standings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::generator::{GenerateBracket, new_bracket};
use super::models::{
    Bracket, BracketId, BracketKind, Match, MatchId, MatchResult, Slot, TournamentId,
};
use crate::config::{BestOf, Format};
use crate::entrant::{Entrant, EntrantId};
use crate::errors::{EngineError, EngineResult};
use crate::seeding::Seeder;

#[derive(Debug, Clone)]
pub struct RoundRobinGenerator {
    best_of: BestOf,
    double: bool,
}

impl RoundRobinGenerator {
    pub fn new(best_of: BestOf, double: bool) -> Self {
        Self { best_of, double }
    }
}

/// Pairings per round for one leg.
///
/// Odd fields are padded with an empty seat; whoever draws it sits the round
/// out. Position 0 stays fixed while the rest rotate.
pub fn circle_schedule(ids: &[EntrantId]) -> Vec<Vec<(EntrantId, EntrantId)>> {
    let mut seats: Vec<Option<EntrantId>> = ids.iter().copied().map(Some).collect();
    if seats.len() % 2 == 1 {
        seats.push(None);
    }
    let n = seats.len();

    let mut schedule = Vec::with_capacity(n.saturating_sub(1));
    for _ in 1..n {
        let round = (0..n / 2)
            .filter_map(|i| match (seats[i], seats[n - 1 - i]) {
                (Some(a), Some(b)) => Some((a, b)),
                _ => None,
            })
            .collect();
        schedule.push(round);
        seats[1..].rotate_right(1);
    }
    schedule
}

impl GenerateBracket for RoundRobinGenerator {
    fn format(&self) -> Format {
        Format::RoundRobin
    }

    fn generate(
        &self,
        tournament: TournamentId,
        entrants: &[Entrant],
        _seeder: &mut Seeder,
    ) -> EngineResult<Vec<Bracket>> {
        if entrants.len() < 2 {
            return Err(EngineError::InvalidConfiguration(format!(
                "round robin needs at least 2 entrants, got {}",
                entrants.len()
            )));
        }

        let id = BracketId::new(tournament, BracketKind::RoundRobin);
        let ids: Vec<EntrantId> = entrants.iter().map(|e| e.id).collect();
        let schedule = circle_schedule(&ids);
        let leg_rounds = schedule.len() as u32;

        let mut matches = Vec::new();
        let legs = if self.double { 2 } else { 1 };
        for leg in 0..legs {
            for (r, round) in schedule.iter().enumerate() {
                let round_number = leg * leg_rounds + r as u32 + 1;
                for (i, &(a, b)) in round.iter().enumerate() {
                    let slots = if leg == 0 {
                        [Slot::Entrant(a), Slot::Entrant(b)]
                    } else {
                        [Slot::Entrant(b), Slot::Entrant(a)]
                    };
                    matches.push(Match::new(
                        MatchId::new(id, round_number, i as u32 + 1),
                        self.best_of,
                        slots,
                    ));
                }
            }
        }

        let mut bracket = new_bracket(id, "Round Robin", Format::RoundRobin, entrants, self.best_of);
        bracket.round_count = leg_rounds * legs;
        bracket.rounds_generated = bracket.round_count;
        bracket.matches = matches;
        Ok(vec![bracket])
    }
}

/// One entrant's round-robin record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRobinStanding {
    pub entrant: EntrantId,
    pub seed: u32,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub maps_won: u32,
    pub maps_lost: u32,
    pub rank: usize,
}

impl RoundRobinStanding {
    pub fn map_differential(&self) -> i64 {
        i64::from(self.maps_won) - i64::from(self.maps_lost)
    }
}

/// Standings sorted by wins, map differential, then seed
pub fn round_robin_standings(bracket: &Bracket) -> Vec<RoundRobinStanding> {
    let mut table: HashMap<EntrantId, RoundRobinStanding> = bracket
        .entrants
        .iter()
        .map(|e| {
            (
                e.id,
                RoundRobinStanding {
                    entrant: e.id,
                    seed: e.seed,
                    played: 0,
                    wins: 0,
                    losses: 0,
                    maps_won: 0,
                    maps_lost: 0,
                    rank: 0,
                },
            )
        })
        .collect();

    for game in bracket.matches.iter().filter(|m| m.is_completed()) {
        let (Some(winner), Some(loser)) = (game.winner, game.loser) else {
            continue;
        };
        let (winner_maps, loser_maps) = match (game.result, game.side_of(winner)) {
            (Some(MatchResult::Score { .. }), Some(side)) => (
                game.scores[side.index()],
                game.scores[side.opposite().index()],
            ),
            _ => (0, 0),
        };

        if let Some(standing) = table.get_mut(&winner) {
            standing.played += 1;
            standing.wins += 1;
            standing.maps_won += winner_maps;
            standing.maps_lost += loser_maps;
        }
        if let Some(standing) = table.get_mut(&loser) {
            standing.played += 1;
            standing.losses += 1;
            standing.maps_won += loser_maps;
            standing.maps_lost += winner_maps;
        }
    }

    let mut standings: Vec<RoundRobinStanding> = table.into_values().collect();
    standings.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.map_differential().cmp(&a.map_differential()))
            .then(a.seed.cmp(&b.seed))
    });
    for (i, standing) in standings.iter_mut().enumerate() {
        standing.rank = i + 1;
    }
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::MatchStatus;
    use std::collections::HashSet;

    fn field(count: usize) -> Vec<Entrant> {
        (1..=count)
            .map(|i| Entrant::new(i as i64, format!("Team {i}"), 1000, i as u32))
            .collect()
    }

    #[test]
    fn test_circle_schedule_even() {
        let schedule = circle_schedule(&[1, 2, 3, 4]);
        assert_eq!(
            schedule,
            vec![
                vec![(1, 4), (2, 3)],
                vec![(1, 3), (4, 2)],
                vec![(1, 2), (3, 4)],
            ]
        );
    }

    #[test]
    fn test_odd_field_sits_one_out_per_round() {
        let schedule = circle_schedule(&[1, 2, 3, 4, 5]);
        assert_eq!(schedule.len(), 5);
        assert!(schedule.iter().all(|round| round.len() == 2));

        let mut pairs = HashSet::new();
        for round in &schedule {
            for &(a, b) in round {
                assert!(pairs.insert((a.min(b), a.max(b))));
            }
        }
        assert_eq!(pairs.len(), 10);
    }

    #[test]
    fn test_double_round_robin_swaps_slots() {
        let bracket = RoundRobinGenerator::new(BestOf::ONE, true)
            .generate(1, &field(4), &mut Seeder::with_seed(0))
            .unwrap()
            .remove(0);
        assert_eq!(bracket.round_count, 6);
        assert_eq!(bracket.matches.len(), 12);

        let first = bracket.get_match(&MatchId::new(bracket.id, 1, 1)).unwrap();
        let return_leg = bracket.get_match(&MatchId::new(bracket.id, 4, 1)).unwrap();
        assert_eq!(first.slots, [Slot::Entrant(1), Slot::Entrant(4)]);
        assert_eq!(return_leg.slots, [Slot::Entrant(4), Slot::Entrant(1)]);
        assert!(bracket.matches.iter().all(|m| m.status == MatchStatus::Ready));
    }

    #[test]
    fn test_standings_use_map_differential() {
        let mut bracket = RoundRobinGenerator::new(BestOf::THREE, false)
            .generate(1, &field(3), &mut Seeder::with_seed(0))
            .unwrap()
            .remove(0);

        // Everyone wins once; 3 wins its match 2-0, the others 2-1
        for game in bracket.matches.iter_mut() {
            let (one, two) = game.entrants().unwrap();
            let (winner, loser) = match (one, two) {
                (1, 2) | (2, 1) => (1, 2),
                (2, 3) | (3, 2) => (2, 3),
                _ => (3, 1),
            };
            let winner_side = game.side_of(winner).unwrap();
            let mut scores = [0, 0];
            scores[winner_side.index()] = 2;
            scores[winner_side.opposite().index()] = if winner == 3 { 0 } else { 1 };
            game.scores = scores;
            game.result = Some(MatchResult::Score {
                one: scores[0],
                two: scores[1],
            });
            game.status = MatchStatus::Completed;
            game.winner = Some(winner);
            game.loser = Some(loser);
        }

        let standings = round_robin_standings(&bracket);
        let order: Vec<i64> = standings.iter().map(|s| s.entrant).collect();
        assert_eq!(order, vec![3, 2, 1]);
        assert_eq!(standings[0].map_differential(), 1);
        assert!(standings.iter().all(|s| s.played == 2 && s.wins == 1));
    }
}
