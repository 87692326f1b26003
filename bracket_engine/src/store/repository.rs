//! Repository trait definitions for bracket persistence.
//!
//! The engine only talks to storage through [`BracketRepository`], so any
//! backend offering per-match compare-and-swap can sit behind it.
//! [`InMemoryBracketRepository`] is the in-process implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::bracket::{Bracket, BracketId, Match, MatchId, Slot, TournamentId};
use crate::errors::{EngineError, EngineResult};

/// Trait for bracket and match storage
#[async_trait]
pub trait BracketRepository: Send + Sync {
    /// Store newly generated brackets. Fails if any of them already exists.
    async fn insert_brackets(&self, brackets: Vec<Bracket>) -> EngineResult<()>;

    /// Load a bracket with all of its matches
    async fn load_bracket(&self, id: BracketId) -> EngineResult<Bracket>;

    /// All brackets of a tournament, ordered by kind
    async fn list_brackets(&self, tournament: TournamentId) -> EngineResult<Vec<Bracket>>;

    /// Load a single match
    async fn load_match(&self, id: MatchId) -> EngineResult<Match>;

    /// Replace a match if its stored version equals `expected_version`.
    ///
    /// Returns the stored match with its new version. Structural fields
    /// (best-of, successor edges) must be unchanged, and a slot may only go
    /// from a placeholder to an entrant.
    async fn save_match(&self, updated: Match, expected_version: u64) -> EngineResult<Match>;

    /// Append round `round` to a bracket, only if exactly `round - 1` rounds
    /// exist. Returns `false` without writing otherwise.
    async fn append_round(
        &self,
        bracket: BracketId,
        round: u32,
        matches: Vec<Match>,
    ) -> EngineResult<bool>;

    /// Remove every bracket of a tournament, returning how many were removed
    async fn delete_tournament(&self, tournament: TournamentId) -> EngineResult<usize>;
}

/// Reject writes that change anything but progress fields
fn check_structure(current: &Match, updated: &Match) -> EngineResult<()> {
    let entity = format!("{}/{}", current.id.bracket, current.id);

    if current.best_of != updated.best_of
        || current.winner_advances_to != updated.winner_advances_to
        || current.loser_advances_to != updated.loser_advances_to
    {
        return Err(EngineError::StructuralInvariantViolation(format!(
            "write to {entity} changes its wiring"
        )));
    }

    for (before, after) in current.slots.iter().zip(updated.slots.iter()) {
        let allowed = before == after || (before.is_placeholder() && matches!(after, Slot::Entrant(_)));
        if !allowed {
            return Err(EngineError::StructuralInvariantViolation(format!(
                "write to {entity} replaces slot {before:?} with {after:?}"
            )));
        }
    }

    Ok(())
}

/// In-process repository backed by a map of brackets.
///
/// The lock is held only for the duration of a single call.
#[derive(Clone, Default)]
pub struct InMemoryBracketRepository {
    brackets: Arc<RwLock<HashMap<BracketId, Bracket>>>,
}

impl InMemoryBracketRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BracketRepository for InMemoryBracketRepository {
    async fn insert_brackets(&self, brackets: Vec<Bracket>) -> EngineResult<()> {
        let mut store = self.brackets.write().await;

        if let Some(existing) = brackets.iter().find(|b| store.contains_key(&b.id)) {
            return Err(EngineError::InvalidConfiguration(format!(
                "bracket {} already exists",
                existing.id
            )));
        }

        for bracket in brackets {
            store.insert(bracket.id, bracket);
        }
        Ok(())
    }

    async fn load_bracket(&self, id: BracketId) -> EngineResult<Bracket> {
        self.brackets
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(EngineError::BracketNotFound(id))
    }

    async fn list_brackets(&self, tournament: TournamentId) -> EngineResult<Vec<Bracket>> {
        let store = self.brackets.read().await;
        let mut brackets: Vec<Bracket> = store
            .values()
            .filter(|b| b.id.tournament == tournament)
            .cloned()
            .collect();
        brackets.sort_by_key(|b| b.id);
        Ok(brackets)
    }

    async fn load_match(&self, id: MatchId) -> EngineResult<Match> {
        let store = self.brackets.read().await;
        let bracket = store
            .get(&id.bracket)
            .ok_or(EngineError::BracketNotFound(id.bracket))?;
        bracket
            .get_match(&id)
            .cloned()
            .ok_or(EngineError::MatchNotFound(id))
    }

    async fn save_match(&self, mut updated: Match, expected_version: u64) -> EngineResult<Match> {
        let id = updated.id;
        let mut store = self.brackets.write().await;
        let bracket = store
            .get_mut(&id.bracket)
            .ok_or(EngineError::BracketNotFound(id.bracket))?;
        let current = bracket
            .get_match_mut(&id)
            .ok_or(EngineError::MatchNotFound(id))?;

        if current.version != expected_version {
            return Err(EngineError::ConcurrencyConflict {
                entity: format!("match {}/{}", id.bracket, id),
                expected: expected_version,
                actual: current.version,
            });
        }
        check_structure(current, &updated)?;

        updated.version = current.version + 1;
        *current = updated.clone();
        bracket.version += 1;
        Ok(updated)
    }

    async fn append_round(
        &self,
        bracket_id: BracketId,
        round: u32,
        matches: Vec<Match>,
    ) -> EngineResult<bool> {
        let mut store = self.brackets.write().await;
        let bracket = store
            .get_mut(&bracket_id)
            .ok_or(EngineError::BracketNotFound(bracket_id))?;

        if round == 0 || bracket.rounds_generated != round - 1 {
            return Ok(false);
        }

        if let Some(stray) = matches
            .iter()
            .find(|m| m.id.bracket != bracket_id || m.id.round != round)
        {
            return Err(EngineError::StructuralInvariantViolation(format!(
                "{}/{} does not belong to round {} of {}",
                stray.id.bracket, stray.id, round, bracket_id
            )));
        }

        bracket.matches.extend(matches.into_iter().map(|mut m| {
            m.version = 0;
            m
        }));
        bracket.rounds_generated = round;
        bracket.round_count = bracket.round_count.max(round);
        bracket.version += 1;
        Ok(true)
    }

    async fn delete_tournament(&self, tournament: TournamentId) -> EngineResult<usize> {
        let mut store = self.brackets.write().await;
        let before = store.len();
        store.retain(|id, _| id.tournament != tournament);
        Ok(before - store.len())
    }
}
