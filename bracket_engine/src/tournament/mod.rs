//! Tournament façade over seeding, generation, storage and progression.
//!
//! ## Example
//!
//! ```
//! use bracket_engine::bracket::{BracketId, BracketKind, MatchId, MatchResult};
//! use bracket_engine::config::{Format, TournamentOptions};
//! use bracket_engine::entrant::Entrant;
//! use bracket_engine::tournament::TournamentManager;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::in_memory();
//!     let entrants = vec![
//!         Entrant::new(1, "Falcons", 1900, 1),
//!         Entrant::new(2, "Ravens", 1750, 2),
//!     ];
//!
//!     let options = TournamentOptions::new(Format::SingleElimination);
//!     manager.create_tournament(1, entrants, &options).await?;
//!
//!     let final_id = MatchId::new(BracketId::new(1, BracketKind::Main), 1, 1);
//!     let outcome = manager
//!         .complete_match(final_id, MatchResult::Score { one: 1, two: 0 })
//!         .await?;
//!     assert_eq!(outcome.winner, 1);
//!
//!     Ok(())
//! }
//! ```

pub mod manager;

pub use manager::TournamentManager;
