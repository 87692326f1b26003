//! Structural checks over a generated set of brackets.

use log::error;
use std::collections::{HashMap, HashSet};

use super::models::{Bracket, BracketKind, Match, MatchId, Slot, SlotRef};
use crate::entrant::EntrantId;
use crate::errors::{EngineError, EngineResult};

/// Tournament, format, entrant count and bracket ids, for failure logs
fn audit_context(brackets: &[Bracket]) -> String {
    let Some(first) = brackets.first() else {
        return "no brackets".to_string();
    };
    let ids: Vec<String> = brackets.iter().map(|b| b.id.to_string()).collect();
    format!(
        "tournament {} ({}, {} entrants, brackets [{}])",
        first.id.tournament,
        first.format,
        first.entrants.len(),
        ids.join(", ")
    )
}

fn violation(context: &str, message: String) -> EngineError {
    error!("Bracket audit failed for {context}: {message}");
    EngineError::StructuralInvariantViolation(message)
}

/// Slot a successor should hold for `source`'s edge
fn accepts(slot: &Slot, source: &Match, placeholder: Slot, entrant: Option<EntrantId>) -> bool {
    *slot == placeholder || (source.is_completed() && entrant.is_some() && slot.entrant() == entrant)
}

/// Verify the wiring of a tournament's brackets.
///
/// - match ids are unique and numbered `1..` within each round
/// - every edge points at an existing slot whose placeholder names its source
/// - every placeholder is backed by the matching edge, and no slot is fed twice
/// - elimination matches other than the final advance their winner, and upper
///   bracket matches drop their loser when a lower bracket exists
pub fn audit(brackets: &[Bracket]) -> EngineResult<()> {
    let context = audit_context(brackets);
    let mut index: HashMap<MatchId, &Match> = HashMap::new();
    for bracket in brackets {
        for game in &bracket.matches {
            if game.id.bracket != bracket.id {
                return Err(violation(&context, format!(
                    "{} is stored in bracket {}",
                    game.id, bracket.id
                )));
            }
            if index.insert(game.id, game).is_some() {
                return Err(violation(
                    &context,
                    format!("{}/{} is duplicated", bracket.id, game.id),
                ));
            }
        }

        for round in bracket.rounds() {
            let mut numbers: Vec<u32> = bracket.round_matches(round).map(|m| m.id.number).collect();
            numbers.sort_unstable();
            if numbers.iter().zip(1..).any(|(n, expected)| *n != expected) {
                return Err(violation(&context, format!(
                    "{} round {} is not numbered consecutively",
                    bracket.id, round
                )));
            }
        }
    }

    let has_lower = brackets.iter().any(|b| b.id.kind == BracketKind::Lower);
    let mut fed: HashSet<SlotRef> = HashSet::new();

    for bracket in brackets {
        for game in &bracket.matches {
            let edges = [
                (game.winner_advances_to, Slot::Winner(game.id), game.winner),
                (game.loser_advances_to, Slot::Loser(game.id), game.loser),
            ];
            for (edge, placeholder, entrant) in edges {
                let Some(target) = edge else { continue };
                let successor = index.get(&target.match_id).ok_or_else(|| {
                    violation(&context, format!(
                        "{}/{} advances to missing match {}/{}",
                        bracket.id, game.id, target.match_id.bracket, target.match_id
                    ))
                })?;
                if !accepts(successor.slot(target.side), game, placeholder, entrant) {
                    return Err(violation(&context, format!(
                        "{}/{} advances to {}/{} {:?}, which does not name it",
                        bracket.id, game.id, target.match_id.bracket, target.match_id, target.side
                    )));
                }
                if !fed.insert(target) {
                    return Err(violation(&context, format!(
                        "{}/{} {:?} is fed by more than one match",
                        target.match_id.bracket, target.match_id, target.side
                    )));
                }
            }

            for (i, slot) in game.slots.iter().enumerate() {
                let (source, is_winner) = match slot {
                    Slot::Winner(source) => (source, true),
                    Slot::Loser(source) => (source, false),
                    _ => continue,
                };
                let backing = index.get(source).and_then(|m| {
                    if is_winner {
                        m.winner_advances_to
                    } else {
                        m.loser_advances_to
                    }
                });
                if backing.map(|t| (t.match_id, t.side.index())) != Some((game.id, i)) {
                    return Err(violation(&context, format!(
                        "{}/{} slot {} waits on {}/{} with no matching edge",
                        bracket.id,
                        game.id,
                        i + 1,
                        source.bracket,
                        source
                    )));
                }
            }

            let needs_winner_edge = match bracket.id.kind {
                BracketKind::Main => game.id.round < bracket.round_count,
                BracketKind::Upper | BracketKind::Lower => true,
                _ => false,
            };
            if needs_winner_edge && game.winner_advances_to.is_none() {
                return Err(violation(&context, format!(
                    "{}/{} has no winner successor",
                    bracket.id, game.id
                )));
            }
            if bracket.id.kind == BracketKind::Upper && has_lower && game.loser_advances_to.is_none() {
                return Err(violation(&context, format!(
                    "{}/{} has no loser successor",
                    bracket.id, game.id
                )));
            }
        }
    }

    Ok(())
}
