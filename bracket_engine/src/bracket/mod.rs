//! Bracket graph models and generation for every supported format.
//!
//! A tournament is stored as one or more [`Bracket`]s. Each match names its
//! successors through [`SlotRef`] edges, and each unresolved slot names its
//! source through a [`Slot::Winner`] or [`Slot::Loser`] placeholder. The two
//! directions are kept consistent by generation and checked by [`audit`].
//!
//! ## Formats
//!
//! - **Single elimination**: one `main` bracket; byes go to top placements
//! - **Double elimination**: `upper`, `lower` and `grand_final` brackets
//! - **Swiss**: one `swiss` bracket; rounds are appended as play progresses
//! - **Round robin**: one `round_robin` bracket holding the whole schedule
//!
//! ## Example
//!
//! ```
//! use bracket_engine::bracket::{BracketKind, generate};
//! use bracket_engine::config::{Format, TournamentOptions};
//! use bracket_engine::entrant::Entrant;
//! use bracket_engine::seeding::Seeder;
//!
//! let entrants: Vec<Entrant> = (1..=8)
//!     .map(|i| Entrant::new(i, format!("Team {i}"), 1500, i as u32))
//!     .collect();
//! let options = TournamentOptions::new(Format::SingleElimination);
//! let brackets = generate(1, &entrants, &options, &mut Seeder::with_seed(0)).unwrap();
//!
//! assert_eq!(brackets[0].id.kind, BracketKind::Main);
//! assert_eq!(brackets[0].matches.len(), 7);
//! ```

pub mod audit;
pub mod double;
pub mod generator;
pub mod models;
pub mod round_robin;
pub mod single;
pub mod swiss;

pub use audit::audit;
pub use generator::{BracketGenerator, GenerateBracket, generate};
pub use models::{
    Bracket, BracketId, BracketKind, BracketProgress, Match, MatchId, MatchResult, MatchStatus,
    Side, Slot, SlotRef, TournamentId,
};
pub use round_robin::{RoundRobinStanding, round_robin_standings};
pub use single::{Placement, placements};
