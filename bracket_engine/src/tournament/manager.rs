//! Tournament manager wiring seeding, generation, storage and progression.

use log::{info, warn};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::bracket::{
    Bracket, BracketId, BracketKind, Match, MatchId, MatchResult, MatchStatus, Placement,
    RoundRobinStanding, TournamentId, generate, placements, round_robin_standings,
};
use crate::config::{EngineConfig, TournamentOptions};
use crate::engine::{CompletionOutcome, ProgressionEngine};
use crate::entrant::{Entrant, EntrantId};
use crate::errors::{EngineError, EngineResult};
use crate::notation::{BracketExport, export};
use crate::notify::{BracketEvent, EventType, Notifier, NullNotifier};
use crate::ranking::{RankingService, StaticRatings};
use crate::seeding::{Seeder, validate_seeding};
use crate::store::{BracketRepository, InMemoryBracketRepository};
use crate::swiss::{Standing, compute_standings};

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    repository: Arc<dyn BracketRepository>,
    notifier: Arc<dyn Notifier>,
    ranking: Arc<dyn RankingService>,
    engine: ProgressionEngine,
    seeder: Arc<Mutex<Seeder>>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(
        repository: Arc<dyn BracketRepository>,
        notifier: Arc<dyn Notifier>,
        ranking: Arc<dyn RankingService>,
        config: EngineConfig,
    ) -> Self {
        let engine = ProgressionEngine::new(
            repository.clone(),
            notifier.clone(),
            ranking.clone(),
            config,
        );
        Self {
            repository,
            notifier,
            ranking,
            engine,
            seeder: Arc::new(Mutex::new(Seeder::new())),
        }
    }

    /// Manager over in-process collaborators with default configuration
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryBracketRepository::new()),
            Arc::new(NullNotifier),
            Arc::new(StaticRatings::new()),
            EngineConfig::default(),
        )
    }

    /// Replace the seeder, e.g. with [`Seeder::with_seed`] for reproducible draws
    pub fn with_seeder(mut self, seeder: Seeder) -> Self {
        self.seeder = Arc::new(Mutex::new(seeder));
        self
    }

    pub fn engine(&self) -> &ProgressionEngine {
        &self.engine
    }

    /// Seed, generate and store the brackets of a tournament.
    ///
    /// Ratings are refreshed from the ranking service first. Fails with
    /// [`EngineError::InvalidConfiguration`] when seeding validation fails or
    /// the tournament already has brackets.
    pub async fn create_tournament(
        &self,
        tournament: TournamentId,
        mut entrants: Vec<Entrant>,
        options: &TournamentOptions,
    ) -> EngineResult<Vec<Bracket>> {
        let ids: Vec<EntrantId> = entrants.iter().map(|e| e.id).collect();
        let ratings = self.ranking.ratings(&ids).await?;
        for entrant in entrants.iter_mut() {
            if let Some(rating) = ratings.get(&entrant.id) {
                entrant.rating = *rating;
            }
        }

        let report = validate_seeding(&entrants, options.format);
        if !report.valid {
            warn!(
                "Rejected seeding for tournament {tournament}: {} issue(s)",
                report.issues.len()
            );
        }
        report.into_result()?;

        let brackets = {
            let mut seeder = self.seeder.lock().await;
            let ordered = seeder.apply(&entrants, options.seeding);
            generate(tournament, &ordered, options, &mut seeder)?
        };

        self.repository.insert_brackets(brackets.clone()).await?;
        info!(
            "Created tournament {tournament}: {} with {} entrants, {} seeding",
            options.format,
            entrants.len(),
            options.seeding
        );

        for bracket in &brackets {
            let event = BracketEvent::new(
                EventType::BracketGenerated,
                bracket.id,
                json!({
                    "format": bracket.format,
                    "rounds": bracket.round_count,
                    "matches": bracket.matches.len(),
                }),
            );
            if let Err(err) = self.notifier.notify(event).await {
                warn!("Failed to deliver bracket_generated for {}: {err}", bracket.id);
            }
        }

        Ok(brackets)
    }

    pub async fn start_match(&self, id: MatchId) -> EngineResult<Match> {
        self.engine.start_match(id).await
    }

    pub async fn complete_match(
        &self,
        id: MatchId,
        result: MatchResult,
    ) -> EngineResult<CompletionOutcome> {
        self.engine.complete_match(id, result).await
    }

    pub async fn cancel_match(&self, id: MatchId) -> EngineResult<Match> {
        self.engine.cancel_match(id).await
    }

    pub async fn bracket(&self, id: BracketId) -> EngineResult<Bracket> {
        self.repository.load_bracket(id).await
    }

    /// All brackets of a tournament
    pub async fn brackets(&self, tournament: TournamentId) -> EngineResult<Vec<Bracket>> {
        self.repository.list_brackets(tournament).await
    }

    pub async fn get_match(&self, id: MatchId) -> EngineResult<Match> {
        self.repository.load_match(id).await
    }

    /// Notation projection of one bracket
    pub async fn export(&self, id: BracketId) -> EngineResult<BracketExport> {
        let bracket = self.repository.load_bracket(id).await?;
        Ok(export(&bracket))
    }

    /// Notation projection of every bracket of a tournament
    pub async fn export_tournament(
        &self,
        tournament: TournamentId,
    ) -> EngineResult<Vec<BracketExport>> {
        let brackets = self.repository.list_brackets(tournament).await?;
        Ok(brackets.iter().map(export).collect())
    }

    pub async fn swiss_standings(&self, tournament: TournamentId) -> EngineResult<Vec<Standing>> {
        let bracket = self
            .repository
            .load_bracket(BracketId::new(tournament, BracketKind::Swiss))
            .await?;
        Ok(compute_standings(&bracket))
    }

    pub async fn round_robin_standings(
        &self,
        tournament: TournamentId,
    ) -> EngineResult<Vec<RoundRobinStanding>> {
        let bracket = self
            .repository
            .load_bracket(BracketId::new(tournament, BracketKind::RoundRobin))
            .await?;
        Ok(round_robin_standings(&bracket))
    }

    /// Single-elimination placements decided so far, including the
    /// third-place match when the tournament has one
    pub async fn placements(&self, tournament: TournamentId) -> EngineResult<Vec<Placement>> {
        let bracket = self
            .repository
            .load_bracket(BracketId::new(tournament, BracketKind::Main))
            .await?;
        let third_place = match self
            .repository
            .load_bracket(BracketId::new(tournament, BracketKind::ThirdPlace))
            .await
        {
            Ok(third_place) => Some(third_place),
            Err(EngineError::BracketNotFound(_)) => None,
            Err(err) => return Err(err),
        };
        placements(&bracket, third_place.as_ref())
    }

    /// Matches that can be played now across a tournament
    pub async fn ready_matches(&self, tournament: TournamentId) -> EngineResult<Vec<Match>> {
        let brackets = self.repository.list_brackets(tournament).await?;
        Ok(brackets
            .into_iter()
            .flat_map(|b| b.matches)
            .filter(|m| m.status == MatchStatus::Ready)
            .collect())
    }

    /// Remove a tournament's brackets
    pub async fn delete_tournament(&self, tournament: TournamentId) -> EngineResult<usize> {
        let removed = self.repository.delete_tournament(tournament).await?;
        if removed == 0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "tournament {tournament} has no brackets"
            )));
        }
        info!("Deleted tournament {tournament} ({removed} brackets)");
        Ok(removed)
    }
}
