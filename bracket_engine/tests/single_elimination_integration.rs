//! Integration tests for single-elimination generation and progression.
//!
//! Covers first-round seeding, bye placement, match and round counts,
//! advancement through the tree and final placements.

use bracket_engine::bracket::{
    BracketId, BracketKind, MatchId, MatchResult, MatchStatus, Slot, audit,
};
use bracket_engine::config::{Format, TournamentOptions};
use bracket_engine::entrant::Entrant;
use bracket_engine::seeding::Seeder;
use bracket_engine::{EngineError, TournamentManager};
use std::collections::BTreeSet;

/// Entrants 1..=count with seed equal to id
fn field(count: usize) -> Vec<Entrant> {
    (1..=count)
        .map(|i| Entrant::new(i as i64, format!("Team {i}"), 2000 - i as i32, i as u32))
        .collect()
}

fn manager() -> TournamentManager {
    TournamentManager::in_memory().with_seeder(Seeder::with_seed(7))
}

fn main_match(round: u32, number: u32) -> MatchId {
    MatchId::new(BracketId::new(1, BracketKind::Main), round, number)
}

/// Slot one wins 1-0
const ONE_WINS: MatchResult = MatchResult::Score { one: 1, two: 0 };
/// Slot two wins 0-1
const TWO_WINS: MatchResult = MatchResult::Score { one: 0, two: 1 };

#[tokio::test]
async fn test_eight_entrant_bracket_seeding() {
    let manager = manager();
    let brackets = manager
        .create_tournament(1, field(8), &TournamentOptions::new(Format::SingleElimination))
        .await
        .unwrap();

    assert_eq!(brackets.len(), 1);
    let bracket = &brackets[0];
    assert_eq!(bracket.round_count, 3);
    assert_eq!(bracket.matches.len(), 7);

    let first_round: Vec<[Slot; 2]> = (1..=4)
        .map(|n| bracket.get_match(&main_match(1, n)).unwrap().slots)
        .collect();
    assert_eq!(
        first_round,
        vec![
            [Slot::Entrant(1), Slot::Entrant(8)],
            [Slot::Entrant(4), Slot::Entrant(5)],
            [Slot::Entrant(3), Slot::Entrant(6)],
            [Slot::Entrant(2), Slot::Entrant(7)],
        ]
    );
    assert!(
        bracket
            .round_matches(1)
            .all(|m| m.status == MatchStatus::Ready)
    );
    assert!(
        bracket
            .round_matches(2)
            .all(|m| m.status == MatchStatus::Pending)
    );
}

#[tokio::test]
async fn test_higher_seeds_meet_in_semifinals() {
    let manager = manager();
    manager
        .create_tournament(1, field(8), &TournamentOptions::new(Format::SingleElimination))
        .await
        .unwrap();

    for number in 1..=4 {
        manager
            .complete_match(main_match(1, number), ONE_WINS)
            .await
            .unwrap();
    }

    let semi_one = manager.get_match(main_match(2, 1)).await.unwrap();
    let semi_two = manager.get_match(main_match(2, 2)).await.unwrap();
    let entrants = |slots: [Slot; 2]| -> BTreeSet<i64> {
        slots.iter().filter_map(|s| s.entrant()).collect()
    };
    assert_eq!(entrants(semi_one.slots), BTreeSet::from([1, 4]));
    assert_eq!(entrants(semi_two.slots), BTreeSet::from([2, 3]));
    assert_eq!(semi_one.status, MatchStatus::Ready);
    assert_eq!(semi_two.status, MatchStatus::Ready);
}

#[tokio::test]
async fn test_match_and_round_counts() {
    for count in 2..=40usize {
        let manager = manager();
        let brackets = manager
            .create_tournament(
                1,
                field(count),
                &TournamentOptions::new(Format::SingleElimination),
            )
            .await
            .unwrap();
        let bracket = &brackets[0];

        assert_eq!(bracket.matches.len(), count - 1, "{count} entrants");
        assert_eq!(
            bracket.round_count,
            count.next_power_of_two().trailing_zeros(),
            "{count} entrants"
        );
        audit(&brackets).unwrap();
    }
}

#[tokio::test]
async fn test_byes_go_to_top_seeds() {
    let manager = manager();
    let brackets = manager
        .create_tournament(1, field(6), &TournamentOptions::new(Format::SingleElimination))
        .await
        .unwrap();
    let bracket = &brackets[0];

    // Seeds 1 and 2 skip the first round
    let first_round: BTreeSet<i64> = bracket
        .round_matches(1)
        .flat_map(|m| m.slots.iter().filter_map(|s| s.entrant()))
        .collect();
    assert_eq!(first_round, BTreeSet::from([3, 4, 5, 6]));

    let second_round: Vec<i64> = bracket
        .round_matches(2)
        .flat_map(|m| m.slots.iter().filter_map(|s| s.entrant()))
        .collect();
    assert!(second_round.contains(&1));
    assert!(second_round.contains(&2));
}

#[tokio::test]
async fn test_play_through_and_placements() {
    let manager = manager();
    manager
        .create_tournament(1, field(4), &TournamentOptions::new(Format::SingleElimination))
        .await
        .unwrap();

    // 1v4 and 2v3; the underdog takes the second semifinal
    manager
        .complete_match(main_match(1, 1), ONE_WINS)
        .await
        .unwrap();
    let outcome = manager
        .complete_match(main_match(1, 2), TWO_WINS)
        .await
        .unwrap();
    assert_eq!(outcome.winner, 3);
    assert_eq!(outcome.advancement.len(), 1);
    assert!(outcome.advancement[0].ready);

    let final_outcome = manager
        .complete_match(main_match(2, 1), TWO_WINS)
        .await
        .unwrap();
    assert_eq!(final_outcome.winner, 3);
    assert!(final_outcome.advancement.is_empty());

    let bracket = manager
        .bracket(BracketId::new(1, BracketKind::Main))
        .await
        .unwrap();
    assert!(bracket.is_complete());
    assert_eq!(bracket.progress().percent, 100.0);

    let placements = manager.placements(1).await.unwrap();
    let summary: Vec<(i64, u32, &str)> = placements
        .iter()
        .map(|p| (p.entrant, p.place, p.label.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![(3, 1, "1st"), (1, 2, "2nd"), (4, 3, "3rd-4th"), (2, 3, "3rd-4th")]
    );
}

#[tokio::test]
async fn test_pending_match_cannot_complete() {
    let manager = manager();
    manager
        .create_tournament(1, field(4), &TournamentOptions::new(Format::SingleElimination))
        .await
        .unwrap();

    let err = manager
        .complete_match(main_match(2, 1), ONE_WINS)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStateTransition { .. }));
}

#[tokio::test]
async fn test_duplicate_tournament_rejected() {
    let manager = manager();
    let options = TournamentOptions::new(Format::SingleElimination);
    manager.create_tournament(1, field(4), &options).await.unwrap();

    let err = manager
        .create_tournament(1, field(4), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfiguration(_)));

    assert_eq!(manager.delete_tournament(1).await.unwrap(), 1);
    manager.create_tournament(1, field(4), &options).await.unwrap();
}

#[tokio::test]
async fn test_third_place_match_decides_bronze() {
    let manager = manager();
    let options = TournamentOptions::new(Format::SingleElimination).with_third_place_match(true);
    let brackets = manager.create_tournament(1, field(4), &options).await.unwrap();
    assert_eq!(brackets.len(), 2);
    audit(&brackets).unwrap();

    let third_place_id = BracketId::new(1, BracketKind::ThirdPlace);
    let export = manager.export(third_place_id).await.unwrap();
    assert_eq!(export.rounds[0].name, "Third Place Match");
    assert_eq!(
        export.rounds[0].matches[0].teams,
        ["Loser of main R1M1".to_string(), "Loser of main R1M2".to_string()]
    );

    let outcome = manager
        .complete_match(main_match(1, 1), ONE_WINS)
        .await
        .unwrap();
    assert_eq!(outcome.advancement.len(), 2);
    manager
        .complete_match(main_match(1, 2), TWO_WINS)
        .await
        .unwrap();

    let decider = MatchId::new(third_place_id, 1, 1);
    let game = manager.get_match(decider).await.unwrap();
    assert_eq!(game.slots, [Slot::Entrant(4), Slot::Entrant(2)]);
    assert_eq!(game.status, MatchStatus::Ready);
    assert_eq!(manager.ready_matches(1).await.unwrap().len(), 2);

    // Until the decider is played the semifinal losers share third
    manager
        .complete_match(main_match(2, 1), TWO_WINS)
        .await
        .unwrap();
    let shared = manager.placements(1).await.unwrap();
    assert_eq!(shared.iter().filter(|p| p.label == "3rd-4th").count(), 2);

    manager.complete_match(decider, TWO_WINS).await.unwrap();
    let placements = manager.placements(1).await.unwrap();
    let summary: Vec<(i64, u32, &str)> = placements
        .iter()
        .map(|p| (p.entrant, p.place, p.label.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![(3, 1, "1st"), (1, 2, "2nd"), (2, 3, "3rd"), (4, 4, "4th")]
    );
}

#[tokio::test]
async fn test_third_place_match_needs_four_entrants() {
    let options = TournamentOptions::new(Format::SingleElimination).with_third_place_match(true);
    let err = manager()
        .create_tournament(1, field(3), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfiguration(_)));
}
