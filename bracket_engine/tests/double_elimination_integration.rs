//! Integration tests for double elimination.
//!
//! Covers upper/lower wiring, losers dropping into the lower bracket and the
//! grand-final reset.

use bracket_engine::bracket::{
    BracketId, BracketKind, MatchId, MatchResult, MatchStatus, Slot, TournamentId,
};
use bracket_engine::config::{EngineConfig, Format, TournamentOptions};
use bracket_engine::engine::TriggeredGeneration;
use bracket_engine::entrant::Entrant;
use bracket_engine::notify::{BracketEvent, ChannelNotifier, EventType};
use bracket_engine::ranking::StaticRatings;
use bracket_engine::store::InMemoryBracketRepository;
use bracket_engine::{EngineError, TournamentManager};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

const ONE_WINS: MatchResult = MatchResult::Score { one: 1, two: 0 };
const TWO_WINS: MatchResult = MatchResult::Score { one: 0, two: 1 };

fn field(count: usize) -> Vec<Entrant> {
    (1..=count)
        .map(|i| Entrant::new(i as i64, format!("Team {i}"), 1500, i as u32))
        .collect()
}

fn id(kind: BracketKind, round: u32, number: u32) -> MatchId {
    MatchId::new(BracketId::new(1, kind), round, number)
}

/// Manager whose events land in the returned receiver
fn observed_manager() -> (TournamentManager, UnboundedReceiver<BracketEvent>) {
    let (notifier, events) = ChannelNotifier::channel();
    let manager = TournamentManager::new(
        Arc::new(InMemoryBracketRepository::new()),
        Arc::new(notifier),
        Arc::new(StaticRatings::new()),
        EngineConfig::default(),
    );
    (manager, events)
}

fn drain(events: &mut UnboundedReceiver<BracketEvent>) -> Vec<EventType> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event.event_type);
    }
    seen
}

/// Play a four-entrant bracket up to the grand final:
/// 1 and 2 reach the upper final, 1 wins it, 2 comes back through the lower
/// final against 3.
async fn reach_grand_final(manager: &TournamentManager, tournament: TournamentId) {
    manager
        .create_tournament(
            tournament,
            field(4),
            &TournamentOptions::new(Format::DoubleElimination),
        )
        .await
        .unwrap();

    // Upper round 1: 1v4, 2v3
    manager
        .complete_match(id(BracketKind::Upper, 1, 1), ONE_WINS)
        .await
        .unwrap();
    manager
        .complete_match(id(BracketKind::Upper, 1, 2), ONE_WINS)
        .await
        .unwrap();

    // Lower round 1: loser of M1 (4) against loser of M2 (3)
    let lower_opener = manager
        .get_match(id(BracketKind::Lower, 1, 1))
        .await
        .unwrap();
    assert_eq!(lower_opener.slots, [Slot::Entrant(4), Slot::Entrant(3)]);
    manager
        .complete_match(id(BracketKind::Lower, 1, 1), TWO_WINS)
        .await
        .unwrap();

    // Upper final: 1 beats 2, who drops into the lower final
    let outcome = manager
        .complete_match(id(BracketKind::Upper, 2, 1), ONE_WINS)
        .await
        .unwrap();
    assert_eq!(outcome.advancement.len(), 2);
    assert_eq!(
        outcome.advancement[1].target.match_id,
        id(BracketKind::Lower, 2, 1)
    );

    let lower_final = manager
        .get_match(id(BracketKind::Lower, 2, 1))
        .await
        .unwrap();
    assert_eq!(lower_final.slots, [Slot::Entrant(3), Slot::Entrant(2)]);
    assert_eq!(lower_final.status, MatchStatus::Ready);

    manager
        .complete_match(id(BracketKind::Lower, 2, 1), TWO_WINS)
        .await
        .unwrap();

    let grand_final = manager
        .get_match(id(BracketKind::GrandFinal, 1, 1))
        .await
        .unwrap();
    assert_eq!(grand_final.slots, [Slot::Entrant(1), Slot::Entrant(2)]);
    assert_eq!(grand_final.status, MatchStatus::Ready);
}

#[tokio::test]
async fn test_generates_three_linked_brackets() {
    let (manager, _events) = observed_manager();
    let brackets = manager
        .create_tournament(1, field(8), &TournamentOptions::new(Format::DoubleElimination))
        .await
        .unwrap();

    let kinds: Vec<BracketKind> = brackets.iter().map(|b| b.id.kind).collect();
    assert_eq!(
        kinds,
        vec![BracketKind::Upper, BracketKind::Lower, BracketKind::GrandFinal]
    );

    let upper = BracketId::new(1, BracketKind::Upper);
    assert_eq!(brackets[0].parent, None);
    assert_eq!(brackets[1].parent, Some(upper));
    assert_eq!(brackets[2].parent, Some(upper));

    // 7 upper, 6 lower, 1 grand final
    let counts: Vec<usize> = brackets.iter().map(|b| b.matches.len()).collect();
    assert_eq!(counts, vec![7, 6, 1]);
    assert_eq!(brackets[1].round_count, 4);

    // Every upper match drops its loser somewhere
    assert!(
        brackets[0]
            .matches
            .iter()
            .all(|m| m.loser_advances_to.is_some())
    );
}

#[tokio::test]
async fn test_requires_power_of_two() {
    let (manager, _events) = observed_manager();
    let err = manager
        .create_tournament(1, field(6), &TournamentOptions::new(Format::DoubleElimination))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfiguration(_)));
    assert!(manager.brackets(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lower_champion_forces_reset() {
    let (manager, mut events) = observed_manager();
    reach_grand_final(&manager, 1).await;
    drain(&mut events);

    let outcome = manager
        .complete_match(id(BracketKind::GrandFinal, 1, 1), TWO_WINS)
        .await
        .unwrap();
    let reset_id = id(BracketKind::GrandFinal, 2, 1);
    assert_eq!(
        outcome.triggered,
        Some(TriggeredGeneration::BracketReset { match_id: reset_id })
    );

    let reset = manager.get_match(reset_id).await.unwrap();
    assert_eq!(reset.slots, [Slot::Entrant(1), Slot::Entrant(2)]);
    assert_eq!(reset.status, MatchStatus::Ready);
    assert_eq!(reset.scores, [0, 0]);

    assert_eq!(
        drain(&mut events),
        vec![EventType::MatchCompleted, EventType::BracketReset]
    );

    // Replaying the result creates nothing new
    let replay = manager
        .complete_match(id(BracketKind::GrandFinal, 1, 1), TWO_WINS)
        .await
        .unwrap();
    assert!(replay.already_recorded);
    assert_eq!(replay.triggered, None);
    assert!(drain(&mut events).is_empty());

    let grand_final = manager
        .bracket(BracketId::new(1, BracketKind::GrandFinal))
        .await
        .unwrap();
    assert_eq!(grand_final.matches.len(), 2);
    assert_eq!(grand_final.rounds_generated, 2);

    manager.complete_match(reset_id, ONE_WINS).await.unwrap();
    let grand_final = manager
        .bracket(BracketId::new(1, BracketKind::GrandFinal))
        .await
        .unwrap();
    assert!(grand_final.is_complete());
}

#[tokio::test]
async fn test_upper_champion_needs_no_reset() {
    let (manager, mut events) = observed_manager();
    reach_grand_final(&manager, 1).await;
    drain(&mut events);

    let outcome = manager
        .complete_match(id(BracketKind::GrandFinal, 1, 1), ONE_WINS)
        .await
        .unwrap();
    assert_eq!(outcome.winner, 1);
    assert_eq!(outcome.triggered, None);
    assert_eq!(drain(&mut events), vec![EventType::MatchCompleted]);

    let grand_final = manager
        .bracket(BracketId::new(1, BracketKind::GrandFinal))
        .await
        .unwrap();
    assert_eq!(grand_final.matches.len(), 1);
    assert!(grand_final.is_complete());
}

#[tokio::test]
async fn test_export_names_cross_bracket_sources() {
    let (manager, _events) = observed_manager();
    manager
        .create_tournament(1, field(4), &TournamentOptions::new(Format::DoubleElimination))
        .await
        .unwrap();

    let exports = manager.export_tournament(1).await.unwrap();
    assert_eq!(exports.len(), 3);

    let grand_final = &exports[2].rounds[0].matches[0];
    assert_eq!(grand_final.match_identifier, "R1M1");
    assert_eq!(
        grand_final.teams,
        [
            "Winner of upper R2M1".to_string(),
            "Winner of lower R2M1".to_string()
        ]
    );
}
