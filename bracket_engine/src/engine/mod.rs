//! Match progression: results, advancement and dependent generation.

pub mod outcome;
pub mod progression;

pub use outcome::{Advancement, CompletionOutcome, TriggeredGeneration};
pub use progression::{ProgressionEngine, decide};
