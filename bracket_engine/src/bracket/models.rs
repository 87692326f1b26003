//! Bracket graph data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{BestOf, Format, SwissOptions};
use crate::entrant::{Entrant, EntrantId};

/// Tournament ID type
pub type TournamentId = i64;

/// Which bracket of a tournament a match belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketKind {
    /// Single elimination
    Main,
    /// Single elimination third-place match
    ThirdPlace,
    /// Double elimination winners' side
    Upper,
    /// Double elimination losers' side
    Lower,
    /// Double elimination final (and reset)
    GrandFinal,
    Swiss,
    RoundRobin,
}

impl BracketKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BracketKind::Main => "main",
            BracketKind::ThirdPlace => "third_place",
            BracketKind::Upper => "upper",
            BracketKind::Lower => "lower",
            BracketKind::GrandFinal => "grand_final",
            BracketKind::Swiss => "swiss",
            BracketKind::RoundRobin => "round_robin",
        }
    }
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bracket identifier, deterministic for a tournament and format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BracketId {
    pub tournament: TournamentId,
    pub kind: BracketKind,
}

impl BracketId {
    pub fn new(tournament: TournamentId, kind: BracketKind) -> Self {
        Self { tournament, kind }
    }
}

impl fmt::Display for BracketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tournament, self.kind)
    }
}

/// Match identifier. Displays as `R<round>M<number>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId {
    pub bracket: BracketId,
    /// Round number (1-based)
    pub round: u32,
    /// Match number within the round (1-based)
    pub number: u32,
}

impl MatchId {
    pub fn new(bracket: BracketId, round: u32, number: u32) -> Self {
        Self {
            bracket,
            round,
            number,
        }
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}M{}", self.round, self.number)
    }
}

/// Side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

impl Side {
    /// Index into a match's `slots` and `scores`
    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    pub fn from_index(index: usize) -> Self {
        if index == 0 { Side::One } else { Side::Two }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// Contents of one side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Resolved entrant
    Entrant(EntrantId),
    /// Placeholder for the winner of a match
    Winner(MatchId),
    /// Placeholder for the loser of a match
    Loser(MatchId),
    /// No opponent
    Bye,
}

impl Slot {
    pub fn entrant(&self) -> Option<EntrantId> {
        match self {
            Slot::Entrant(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Slot::Winner(_) | Slot::Loser(_))
    }
}

/// Reference to one side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    pub match_id: MatchId,
    pub side: Side,
}

impl SlotRef {
    pub fn new(match_id: MatchId, side: Side) -> Self {
        Self { match_id, side }
    }
}

/// Match lifecycle: `pending -> ready -> live -> completed | cancelled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting for at least one entrant
    Pending,
    /// Both entrants known
    Ready,
    /// In play
    Live,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Ready => "ready",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled matches never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reported outcome of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    /// Games won by each side
    Score { one: u32, two: u32 },
    /// The given side forfeits
    Forfeit { side: Side },
}

/// A match in a bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub best_of: BestOf,
    pub slots: [Slot; 2],
    pub status: MatchStatus,
    /// Games won per side
    pub scores: [u32; 2],
    /// Recorded result, set on completion (byes have none)
    pub result: Option<MatchResult>,
    pub winner: Option<EntrantId>,
    pub loser: Option<EntrantId>,
    pub winner_advances_to: Option<SlotRef>,
    pub loser_advances_to: Option<SlotRef>,
    /// Bumped by the repository on every write
    pub version: u64,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Create an unplayed match; it starts `ready` if both slots hold entrants
    pub fn new(id: MatchId, best_of: BestOf, slots: [Slot; 2]) -> Self {
        let mut game = Self {
            id,
            best_of,
            slots,
            status: MatchStatus::Pending,
            scores: [0, 0],
            result: None,
            winner: None,
            loser: None,
            winner_advances_to: None,
            loser_advances_to: None,
            version: 0,
            completed_at: None,
        };
        game.refresh_readiness();
        game
    }

    /// Create a resolved bye: the entrant wins without an opponent
    pub fn bye(id: MatchId, best_of: BestOf, entrant: EntrantId) -> Self {
        Self {
            status: MatchStatus::Completed,
            winner: Some(entrant),
            ..Self::new(id, best_of, [Slot::Entrant(entrant), Slot::Bye])
        }
    }

    pub fn with_winner_to(mut self, target: SlotRef) -> Self {
        self.winner_advances_to = Some(target);
        self
    }

    pub fn with_loser_to(mut self, target: SlotRef) -> Self {
        self.loser_advances_to = Some(target);
        self
    }

    pub fn slot(&self, side: Side) -> &Slot {
        &self.slots[side.index()]
    }

    pub fn entrant(&self, side: Side) -> Option<EntrantId> {
        self.slot(side).entrant()
    }

    /// Both entrants, when resolved
    pub fn entrants(&self) -> Option<(EntrantId, EntrantId)> {
        Some((self.entrant(Side::One)?, self.entrant(Side::Two)?))
    }

    /// Side the entrant occupies in this match
    pub fn side_of(&self, entrant: EntrantId) -> Option<Side> {
        [Side::One, Side::Two]
            .into_iter()
            .find(|side| self.entrant(*side) == Some(entrant))
    }

    pub fn is_bye(&self) -> bool {
        self.slots.contains(&Slot::Bye)
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Move `pending` to `ready` once both slots hold entrants
    pub fn refresh_readiness(&mut self) -> bool {
        if self.status == MatchStatus::Pending && self.entrants().is_some() {
            self.status = MatchStatus::Ready;
            return true;
        }
        false
    }
}

/// Match counts for a bracket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BracketProgress {
    pub total: usize,
    /// Completed or cancelled
    pub completed: usize,
    pub remaining: usize,
    /// Completed share, 0 to 100
    pub percent: f64,
}

/// One bracket of a tournament and its matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub id: BracketId,
    pub name: String,
    pub format: Format,
    /// Lower and grand-final brackets point at the upper bracket
    pub parent: Option<BracketId>,
    pub team_count: usize,
    /// Total rounds the bracket will have
    pub round_count: u32,
    /// Rounds materialized so far
    pub rounds_generated: u32,
    /// Default match length
    pub best_of: BestOf,
    /// Options a Swiss bracket was generated with
    #[serde(default)]
    pub swiss: Option<SwissOptions>,
    /// Entrants in placement order
    pub entrants: Vec<Entrant>,
    /// Matches ordered by round, then number
    pub matches: Vec<Match>,
    /// Bumped by the repository on every write
    pub version: u64,
}

impl Bracket {
    pub fn get_match(&self, id: &MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == *id)
    }

    pub fn get_match_mut(&mut self, id: &MatchId) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == *id)
    }

    pub fn round_matches(&self, round: u32) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.id.round == round)
    }

    /// Distinct round numbers present, ascending
    pub fn rounds(&self) -> Vec<u32> {
        let mut rounds: Vec<u32> = self.matches.iter().map(|m| m.id.round).collect();
        rounds.sort_unstable();
        rounds.dedup();
        rounds
    }

    /// Every match of the round is completed or cancelled
    pub fn is_round_complete(&self, round: u32) -> bool {
        let mut matches = self.round_matches(round).peekable();
        matches.peek().is_some() && matches.all(|m| m.status.is_terminal())
    }

    /// All rounds generated and every match finished. A Swiss stage with
    /// thresholds may finish early, once too few entrants remain unresolved.
    pub fn is_complete(&self) -> bool {
        if self.format == Format::Swiss {
            return crate::swiss::is_tournament_complete(self);
        }
        self.rounds_generated >= self.round_count
            && self.matches.iter().all(|m| m.status.is_terminal())
    }

    pub fn entrant(&self, id: EntrantId) -> Option<&Entrant> {
        self.entrants.iter().find(|e| e.id == id)
    }

    pub fn progress(&self) -> BracketProgress {
        let total = self.matches.len();
        let completed = self
            .matches
            .iter()
            .filter(|m| m.status.is_terminal())
            .count();
        let percent = if total == 0 {
            0.0
        } else {
            (completed as f64 / total as f64) * 100.0
        };
        BracketProgress {
            total,
            completed,
            remaining: total - completed,
            percent,
        }
    }

    /// Next free match number in a round
    pub(crate) fn next_number(&self, round: u32) -> u32 {
        self.round_matches(round)
            .map(|m| m.id.number)
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bracket_id() -> BracketId {
        BracketId::new(1, BracketKind::Main)
    }

    #[test]
    fn test_match_id_display() {
        let id = MatchId::new(bracket_id(), 3, 12);
        assert_eq!(id.to_string(), "R3M12");
        assert_eq!(bracket_id().to_string(), "1/main");
    }

    #[test]
    fn test_new_match_readiness() {
        let id = MatchId::new(bracket_id(), 1, 1);
        let ready = Match::new(id, BestOf::ONE, [Slot::Entrant(1), Slot::Entrant(2)]);
        assert_eq!(ready.status, MatchStatus::Ready);

        let source = MatchId::new(bracket_id(), 1, 2);
        let pending = Match::new(id, BestOf::ONE, [Slot::Entrant(1), Slot::Winner(source)]);
        assert_eq!(pending.status, MatchStatus::Pending);
        assert_eq!(pending.entrants(), None);
    }

    #[test]
    fn test_bye_match() {
        let id = MatchId::new(BracketId::new(1, BracketKind::Swiss), 1, 3);
        let bye = Match::bye(id, BestOf::ONE, 5);
        assert!(bye.is_bye());
        assert!(bye.is_completed());
        assert_eq!(bye.winner, Some(5));
        assert_eq!(bye.loser, None);
    }

    #[test]
    fn test_side_of() {
        let id = MatchId::new(bracket_id(), 1, 1);
        let game = Match::new(id, BestOf::ONE, [Slot::Entrant(10), Slot::Entrant(20)]);
        assert_eq!(game.side_of(20), Some(Side::Two));
        assert_eq!(game.side_of(30), None);
        assert_eq!(Side::One.opposite(), Side::Two);
    }

    #[test]
    fn test_slot_serialization() {
        let json = serde_json::to_string(&Slot::Bye).unwrap();
        assert_eq!(json, "\"bye\"");
        let json = serde_json::to_string(&Slot::Entrant(7)).unwrap();
        assert_eq!(json, r#"{"entrant":7}"#);
    }
}
