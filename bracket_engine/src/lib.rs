//! # Bracket Engine
//!
//! Tournament bracket engine for esports competitions: generates bracket
//! structures from a seeded entrant list, advances entrants as match results
//! arrive, pairs Swiss rounds and keeps the bracket graph consistent under
//! concurrent updates.
//!
//! ## Formats
//!
//! - **Single elimination**: standard seeding order, byes to top placements
//! - **Double elimination**: upper, lower and grand-final brackets with reset
//! - **Swiss**: standings-based pairing without rematches, Buchholz tiebreak
//! - **Round robin**: circle-method schedule, optionally double
//!
//! ## Core Modules
//!
//! - [`seeding`]: placement order and seeding validation
//! - [`bracket`]: bracket graph models and generation
//! - [`engine`]: result recording, advancement and dependent generation
//! - [`swiss`]: Swiss standings and pairing
//! - [`notation`]: `R<round>M<number>` export projection
//! - [`tournament`]: façade wiring the above to the collaborators
//!
//! Storage, notification and ranking are reached through the traits in
//! [`store`], [`notify`] and [`ranking`], each with an in-process implementation.

pub mod bracket;
pub mod config;
pub mod engine;
pub mod entrant;
pub mod errors;
pub mod notation;
pub mod notify;
pub mod ranking;
pub mod seeding;
pub mod store;
pub mod swiss;
pub mod tournament;

pub use bracket::{
    Bracket, BracketId, BracketKind, Match, MatchId, MatchResult, MatchStatus, Side, Slot,
    SlotRef, TournamentId,
};
pub use config::{BestOf, BestOfConfig, EngineConfig, Format, TournamentOptions};
pub use engine::{CompletionOutcome, ProgressionEngine};
pub use entrant::{Entrant, EntrantId};
pub use errors::{EngineError, EngineResult};
pub use tournament::TournamentManager;
