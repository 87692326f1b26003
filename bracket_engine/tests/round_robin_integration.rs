//! Integration tests for round-robin schedules and standings.

use bracket_engine::bracket::{Bracket, BracketKind, Match, MatchResult, MatchStatus};
use bracket_engine::config::{Format, TournamentOptions};
use bracket_engine::entrant::Entrant;
use bracket_engine::TournamentManager;
use std::collections::{HashMap, HashSet};

fn field(count: usize) -> Vec<Entrant> {
    (1..=count)
        .map(|i| Entrant::new(i as i64, format!("Team {i}"), 1500, i as u32))
        .collect()
}

/// Unordered pair key
fn key(a: i64, b: i64) -> (i64, i64) {
    (a.min(b), a.max(b))
}

fn appearances(bracket: &Bracket) -> HashMap<(i64, i64), usize> {
    let mut seen = HashMap::new();
    for (a, b) in bracket.matches.iter().filter_map(Match::entrants) {
        *seen.entry(key(a, b)).or_default() += 1;
    }
    seen
}

#[tokio::test]
async fn test_every_pair_meets_once() {
    let manager = TournamentManager::in_memory();
    let brackets = manager
        .create_tournament(1, field(6), &TournamentOptions::new(Format::RoundRobin))
        .await
        .unwrap();
    let bracket = &brackets[0];

    assert_eq!(bracket.id.kind, BracketKind::RoundRobin);
    assert_eq!(bracket.round_count, 5);
    assert_eq!(bracket.matches.len(), 15);
    assert!(
        bracket
            .matches
            .iter()
            .all(|m| m.status == MatchStatus::Ready)
    );

    let pairs = appearances(bracket);
    assert_eq!(pairs.len(), 15);
    assert!(pairs.values().all(|&count| count == 1));

    // Nobody plays twice in a round
    for round in 1..=5 {
        let mut busy = HashSet::new();
        for (a, b) in bracket.round_matches(round).filter_map(Match::entrants) {
            assert!(busy.insert(a) && busy.insert(b), "round {round}");
        }
    }
}

#[tokio::test]
async fn test_odd_field_sits_one_out() {
    let manager = TournamentManager::in_memory();
    let brackets = manager
        .create_tournament(1, field(5), &TournamentOptions::new(Format::RoundRobin))
        .await
        .unwrap();
    let bracket = &brackets[0];

    assert_eq!(bracket.round_count, 5);
    assert_eq!(bracket.matches.len(), 10);
    for round in 1..=5 {
        assert_eq!(bracket.round_matches(round).count(), 2, "round {round}");
    }
}

#[tokio::test]
async fn test_double_round_robin_swaps_sides() {
    let manager = TournamentManager::in_memory();
    let options = TournamentOptions::new(Format::RoundRobin).with_double_round_robin(true);
    let brackets = manager
        .create_tournament(1, field(4), &options)
        .await
        .unwrap();
    let bracket = &brackets[0];

    assert_eq!(bracket.round_count, 6);
    assert_eq!(bracket.matches.len(), 12);
    assert!(appearances(bracket).values().all(|&count| count == 2));

    let ordered: HashSet<(i64, i64)> = bracket.matches.iter().filter_map(Match::entrants).collect();
    assert_eq!(ordered.len(), 12);
}

#[tokio::test]
async fn test_standings_after_play() {
    let manager = TournamentManager::in_memory();
    let brackets = manager
        .create_tournament(1, field(4), &TournamentOptions::new(Format::RoundRobin))
        .await
        .unwrap();

    // The better placement wins 1-0, except 3 forfeits to 4
    for game in &brackets[0].matches {
        let Some((one, two)) = game.entrants() else {
            continue;
        };
        let result = if key(one, two) == (3, 4) {
            let side = game.side_of(3).unwrap();
            MatchResult::Forfeit { side }
        } else if one < two {
            MatchResult::Score { one: 1, two: 0 }
        } else {
            MatchResult::Score { one: 0, two: 1 }
        };
        manager.complete_match(game.id, result).await.unwrap();
    }

    let standings = manager.round_robin_standings(1).await.unwrap();
    let table: Vec<(i64, u32, u32, usize)> = standings
        .iter()
        .map(|s| (s.entrant, s.wins, s.played, s.rank))
        .collect();
    assert_eq!(
        table,
        vec![(1, 3, 3, 1), (2, 2, 3, 2), (4, 1, 3, 3), (3, 0, 3, 4)]
    );

    // Forfeits count no maps
    let three = standings.iter().find(|s| s.entrant == 3).unwrap();
    assert_eq!((three.maps_won, three.maps_lost), (0, 2));
    let four = standings.iter().find(|s| s.entrant == 4).unwrap();
    assert_eq!((four.maps_won, four.maps_lost), (0, 2));

    let bracket = manager
        .bracket(bracket_engine::bracket::BracketId::new(1, BracketKind::RoundRobin))
        .await
        .unwrap();
    assert!(bracket.is_complete());
}
