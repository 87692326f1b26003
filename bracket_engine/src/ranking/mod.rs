//! Ranking collaborator: supplies ratings for seeding and receives results.
//!
//! Rating calculation lives outside the engine; [`StaticRatings`] serves a
//! fixed table and keeps the results it was sent.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::entrant::EntrantId;
use crate::errors::EngineResult;

/// Trait for the external ranking service
#[async_trait]
pub trait RankingService: Send + Sync {
    /// Current ratings for the given entrants. Entrants without a rating are
    /// omitted and keep the rating they registered with.
    async fn ratings(&self, entrants: &[EntrantId]) -> EngineResult<HashMap<EntrantId, i32>>;

    /// Report a committed match result
    async fn record_result(&self, winner: EntrantId, loser: EntrantId) -> EngineResult<()>;
}

/// In-memory ratings table
#[derive(Debug, Default)]
pub struct StaticRatings {
    ratings: RwLock<HashMap<EntrantId, i32>>,
    results: RwLock<Vec<(EntrantId, EntrantId)>>,
}

impl StaticRatings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ratings(ratings: HashMap<EntrantId, i32>) -> Self {
        Self {
            ratings: RwLock::new(ratings),
            results: RwLock::new(Vec::new()),
        }
    }

    pub async fn set_rating(&self, entrant: EntrantId, rating: i32) {
        self.ratings.write().await.insert(entrant, rating);
    }

    /// Results received so far as `(winner, loser)`, in arrival order
    pub async fn results(&self) -> Vec<(EntrantId, EntrantId)> {
        self.results.read().await.clone()
    }
}

#[async_trait]
impl RankingService for StaticRatings {
    async fn ratings(&self, entrants: &[EntrantId]) -> EngineResult<HashMap<EntrantId, i32>> {
        let ratings = self.ratings.read().await;
        Ok(entrants
            .iter()
            .filter_map(|id| ratings.get(id).map(|rating| (*id, *rating)))
            .collect())
    }

    async fn record_result(&self, winner: EntrantId, loser: EntrantId) -> EngineResult<()> {
        self.results.write().await.push((winner, loser));
        Ok(())
    }
}
