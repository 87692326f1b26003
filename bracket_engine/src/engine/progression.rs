//! Applies match results to the bracket graph.
//!
//! Every write is a compare-and-swap on the match version. A lost race is
//! retried from a fresh read up to [`EngineConfig::max_write_retries`] times.
//! Structure created as a consequence of a result (next Swiss round,
//! grand-final reset) goes through [`BracketRepository::append_round`], so
//! concurrent completions create it exactly once.

use log::{debug, info, warn};
use serde_json::json;
use std::sync::Arc;

use super::outcome::{Advancement, CompletionOutcome, TriggeredGeneration};
use crate::bracket::{
    BracketId, BracketKind, Match, MatchId, MatchResult, MatchStatus, Side, Slot, SlotRef,
};
use crate::config::EngineConfig;
use crate::entrant::EntrantId;
use crate::errors::{EngineError, EngineResult};
use crate::notify::{BracketEvent, EventType, Notifier};
use crate::ranking::RankingService;
use crate::store::BracketRepository;
use crate::swiss;

/// Winning side and recorded scores for a result.
///
/// A score must be possible within the match's best-of and decisive: one side
/// reaches the win threshold and the other stays below it. A forfeit makes
/// the forfeiting side the loser and records no games.
pub fn decide(game: &Match, result: MatchResult) -> EngineResult<(Side, [u32; 2])> {
    match result {
        MatchResult::Forfeit { side } => Ok((side.opposite(), [0, 0])),
        MatchResult::Score { one, two } => {
            let best_of = game.best_of;
            let threshold = best_of.win_threshold();
            if one > threshold || two > threshold {
                return Err(EngineError::invalid_transition(
                    game.id,
                    format!("{one}-{two} is not possible in a {best_of} match"),
                ));
            }
            match (one >= threshold, two >= threshold) {
                (true, false) => Ok((Side::One, [one, two])),
                (false, true) => Ok((Side::Two, [one, two])),
                _ => Err(EngineError::invalid_transition(
                    game.id,
                    format!("{one}-{two} does not decide a {best_of} match"),
                )),
            }
        }
    }
}

/// Progression engine
#[derive(Clone)]
pub struct ProgressionEngine {
    repository: Arc<dyn BracketRepository>,
    notifier: Arc<dyn Notifier>,
    ranking: Arc<dyn RankingService>,
    config: EngineConfig,
}

impl ProgressionEngine {
    pub fn new(
        repository: Arc<dyn BracketRepository>,
        notifier: Arc<dyn Notifier>,
        ranking: Arc<dyn RankingService>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            notifier,
            ranking,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Record a match result and advance its entrants.
    ///
    /// The `match_completed` event and the ranking report are sent as soon as
    /// the result is stored. Re-submitting the recorded result returns the
    /// same outcome with `already_recorded` set and sends no notification. It
    /// also re-runs the successor writes and triggers, which completes an
    /// interrupted call.
    pub async fn complete_match(
        &self,
        id: MatchId,
        result: MatchResult,
    ) -> EngineResult<CompletionOutcome> {
        let mut attempts = 0;
        let (saved, first_completion) = loop {
            let current = self.repository.load_match(id).await?;
            match current.status {
                MatchStatus::Completed if current.result == Some(result) => break (current, false),
                MatchStatus::Completed => {
                    return Err(EngineError::invalid_transition(
                        id,
                        format!("already completed with {:?}", current.result),
                    ));
                }
                MatchStatus::Ready | MatchStatus::Live => {}
                status => {
                    return Err(EngineError::invalid_transition(
                        id,
                        format!("cannot complete a {status} match"),
                    ));
                }
            }

            if current.entrants().is_none() {
                return Err(EngineError::invalid_transition(
                    id,
                    "both slots must hold entrants",
                ));
            }
            let (winner_side, scores) = decide(&current, result)?;

            let mut updated = current.clone();
            updated.status = MatchStatus::Completed;
            updated.scores = scores;
            updated.result = Some(result);
            updated.winner = current.entrant(winner_side);
            updated.loser = current.entrant(winner_side.opposite());
            updated.completed_at = Some(chrono::Utc::now());

            match self.repository.save_match(updated, current.version).await {
                Ok(saved) => break (saved, true),
                Err(err) => self.absorb_conflict(&mut attempts, err)?,
            }
        };

        let (Some(winner), Some(loser)) = (saved.winner, saved.loser) else {
            return Err(EngineError::StructuralInvariantViolation(format!(
                "{}/{} is completed without a winner and loser",
                id.bracket, id
            )));
        };

        // Side effects of the committed result go out before propagation, so a
        // failure further down cannot drop them; the replay only repairs the graph.
        if first_completion {
            info!(
                "Completed {}/{}: {} beat {} ({}-{})",
                id.bracket, id, winner, loser, saved.scores[0], saved.scores[1]
            );
            self.emit(BracketEvent::for_match(
                EventType::MatchCompleted,
                id,
                json!({
                    "winner": winner,
                    "loser": loser,
                    "scores": saved.scores,
                    "result": result,
                }),
            ))
            .await;
            if let Err(err) = self.ranking.record_result(winner, loser).await {
                warn!("Ranking service rejected result of {}/{}: {err}", id.bracket, id);
            }
        } else {
            debug!("{}/{} was already recorded; replaying successor writes", id.bracket, id);
        }

        let advancement = self.propagate(&saved).await?;
        let triggered = self.run_triggers(&saved).await?;

        Ok(CompletionOutcome {
            match_id: id,
            winner,
            loser,
            advancement,
            triggered,
            already_recorded: !first_completion,
        })
    }

    /// Move a ready match to live. Starting a live match is a no-op.
    pub async fn start_match(&self, id: MatchId) -> EngineResult<Match> {
        let mut attempts = 0;
        loop {
            let current = self.repository.load_match(id).await?;
            match current.status {
                MatchStatus::Live => return Ok(current),
                MatchStatus::Ready => {}
                status => {
                    return Err(EngineError::invalid_transition(
                        id,
                        format!("cannot start a {status} match"),
                    ));
                }
            }

            let mut updated = current.clone();
            updated.status = MatchStatus::Live;
            match self.repository.save_match(updated, current.version).await {
                Ok(saved) => {
                    self.emit(BracketEvent::for_match(EventType::MatchStarted, id, json!({})))
                        .await;
                    return Ok(saved);
                }
                Err(err) => self.absorb_conflict(&mut attempts, err)?,
            }
        }
    }

    /// Cancel an unfinished match. Cancelling twice is a no-op.
    ///
    /// A cancelled match finishes its Swiss round like a completed one.
    pub async fn cancel_match(&self, id: MatchId) -> EngineResult<Match> {
        let mut attempts = 0;
        let saved = loop {
            let current = self.repository.load_match(id).await?;
            match current.status {
                MatchStatus::Cancelled => return Ok(current),
                MatchStatus::Completed => {
                    return Err(EngineError::invalid_transition(
                        id,
                        "cannot cancel a completed match",
                    ));
                }
                MatchStatus::Pending | MatchStatus::Ready | MatchStatus::Live => {}
            }

            let mut updated = current.clone();
            updated.status = MatchStatus::Cancelled;
            match self.repository.save_match(updated, current.version).await {
                Ok(saved) => break saved,
                Err(err) => self.absorb_conflict(&mut attempts, err)?,
            }
        };

        info!("Cancelled {}/{}", id.bracket, id);
        self.emit(BracketEvent::for_match(EventType::MatchCancelled, id, json!({})))
            .await;

        if id.bracket.kind == BracketKind::Swiss {
            self.advance_swiss(id.bracket).await?;
        }
        Ok(saved)
    }

    /// Swallow a version conflict while retries remain
    fn absorb_conflict(&self, attempts: &mut u32, err: EngineError) -> EngineResult<()> {
        match err {
            EngineError::ConcurrencyConflict { .. }
                if *attempts + 1 < self.config.max_write_retries =>
            {
                *attempts += 1;
                debug!("Retrying after {err} (attempt {})", *attempts + 1);
                Ok(())
            }
            err => Err(err),
        }
    }

    async fn propagate(&self, saved: &Match) -> EngineResult<Vec<Advancement>> {
        let mut advancement = Vec::new();
        if let (Some(target), Some(winner)) = (saved.winner_advances_to, saved.winner) {
            advancement.push(
                self.fill_slot(target, Slot::Winner(saved.id), winner)
                    .await?,
            );
        }
        if let (Some(target), Some(loser)) = (saved.loser_advances_to, saved.loser) {
            advancement.push(self.fill_slot(target, Slot::Loser(saved.id), loser).await?);
        }
        Ok(advancement)
    }

    /// Replace `placeholder` with `entrant` in a successor slot
    async fn fill_slot(
        &self,
        target: SlotRef,
        placeholder: Slot,
        entrant: EntrantId,
    ) -> EngineResult<Advancement> {
        let mut attempts = 0;
        loop {
            let current = self.repository.load_match(target.match_id).await?;
            let slot = *current.slot(target.side);

            if slot == Slot::Entrant(entrant) {
                return Ok(Advancement {
                    entrant,
                    target,
                    ready: current.entrants().is_some(),
                });
            }
            if slot != placeholder {
                log::error!(
                    "{}/{} {:?} holds {:?}, expected {:?} for entrant {}",
                    target.match_id.bracket,
                    target.match_id,
                    target.side,
                    slot,
                    placeholder,
                    entrant
                );
                return Err(EngineError::StructuralInvariantViolation(format!(
                    "{}/{} {:?} does not accept entrant {entrant}",
                    target.match_id.bracket, target.match_id, target.side
                )));
            }

            let mut updated = current.clone();
            updated.slots[target.side.index()] = Slot::Entrant(entrant);
            updated.refresh_readiness();

            match self.repository.save_match(updated, current.version).await {
                Ok(saved) => {
                    return Ok(Advancement {
                        entrant,
                        target,
                        ready: saved.entrants().is_some(),
                    });
                }
                Err(err) => self.absorb_conflict(&mut attempts, err)?,
            }
        }
    }

    async fn run_triggers(&self, saved: &Match) -> EngineResult<Option<TriggeredGeneration>> {
        match saved.id.bracket.kind {
            BracketKind::Swiss => self.advance_swiss(saved.id.bracket).await,
            BracketKind::GrandFinal if saved.id.round == 1 => self.reset_grand_final(saved).await,
            _ => Ok(None),
        }
    }

    /// Pair the next Swiss round once the current one is finished
    async fn advance_swiss(&self, id: BracketId) -> EngineResult<Option<TriggeredGeneration>> {
        let bracket = self.repository.load_bracket(id).await?;
        let Some(matches) = swiss::next_round(&bracket, self.config.pairing_search_limit)? else {
            return Ok(None);
        };

        let round = bracket.rounds_generated + 1;
        let count = matches.len();
        if !self.repository.append_round(id, round, matches).await? {
            debug!("Swiss round {round} of {id} was generated concurrently");
            return Ok(None);
        }

        info!("Generated Swiss round {round} of {id} ({count} matches)");
        self.emit(BracketEvent::new(
            EventType::RoundGenerated,
            id,
            json!({ "round": round, "matches": count }),
        ))
        .await;
        Ok(Some(TriggeredGeneration::SwissRound { round }))
    }

    /// Append the reset when the lower-bracket finalist wins the grand final
    async fn reset_grand_final(&self, saved: &Match) -> EngineResult<Option<TriggeredGeneration>> {
        let (Some(winner), Some((upper, lower))) = (saved.winner, saved.entrants()) else {
            return Ok(None);
        };
        if winner != lower {
            return Ok(None);
        }

        let bracket = saved.id.bracket;
        let reset_id = MatchId::new(bracket, 2, 1);
        let reset = Match::new(
            reset_id,
            saved.best_of,
            [Slot::Entrant(upper), Slot::Entrant(lower)],
        );
        if !self.repository.append_round(bracket, 2, vec![reset]).await? {
            return Ok(None);
        }

        info!("Bracket reset: {lower} won {bracket}/{}; created {reset_id}", saved.id);
        self.emit(BracketEvent::for_match(
            EventType::BracketReset,
            reset_id,
            json!({ "upper": upper, "lower": lower }),
        ))
        .await;
        Ok(Some(TriggeredGeneration::BracketReset { match_id: reset_id }))
    }

    async fn emit(&self, event: BracketEvent) {
        let event_type = event.event_type;
        let bracket = event.bracket_id;
        if let Err(err) = self.notifier.notify(event).await {
            warn!("Failed to deliver {event_type:?} for {bracket}: {err}");
        }
    }
}
