//! Results of applying a match outcome.

use serde::{Deserialize, Serialize};

use crate::bracket::{MatchId, SlotRef};
use crate::entrant::EntrantId;

/// An entrant written into a successor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advancement {
    pub entrant: EntrantId,
    pub target: SlotRef,
    /// The successor has both entrants
    pub ready: bool,
}

/// Structure created as a consequence of a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TriggeredGeneration {
    /// Next Swiss round was paired
    SwissRound { round: u32 },
    /// Grand-final reset match was appended
    BracketReset { match_id: MatchId },
}

/// Outcome of [`ProgressionEngine::complete_match`](super::ProgressionEngine::complete_match)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    pub match_id: MatchId,
    pub winner: EntrantId,
    pub loser: EntrantId,
    pub advancement: Vec<Advancement>,
    /// Set only when this call created the structure
    pub triggered: Option<TriggeredGeneration>,
    /// The same result had already been recorded
    pub already_recorded: bool,
}
