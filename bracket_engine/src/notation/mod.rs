//! Read-only projection of a bracket into `R<round>M<number>` notation.
//!
//! This is the shape handed to external consumers (broadcast overlays, web
//! views). It never mutates the bracket.

use serde::{Deserialize, Serialize};

use crate::bracket::{Bracket, BracketId, BracketKind, MatchId, MatchStatus, Slot, SlotRef};
use crate::errors::{EngineError, EngineResult};

/// Exported match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchExport {
    /// `R<round>M<number>`
    pub match_identifier: String,
    /// Entrant names, `Winner of ...`/`Loser of ...` placeholders or `BYE`
    pub teams: [String; 2],
    pub score: [u32; 2],
    pub status: MatchStatus,
    pub advancement_target: Option<String>,
    pub loser_advancement_target: Option<String>,
}

/// Exported round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundExport {
    pub round: u32,
    pub name: String,
    pub matches: Vec<MatchExport>,
}

/// Exported bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketExport {
    pub bracket: BracketId,
    pub name: String,
    pub rounds: Vec<RoundExport>,
}

/// Parse `R<round>M<number>` back into its parts
pub fn parse_identifier(identifier: &str) -> EngineResult<(u32, u32)> {
    let invalid =
        || EngineError::InvalidConfiguration(format!("invalid match identifier: {identifier}"));

    let rest = identifier.strip_prefix('R').ok_or_else(invalid)?;
    let (round, number) = rest.split_once('M').ok_or_else(invalid)?;
    let parse = |part: &str| -> EngineResult<u32> {
        if part.starts_with('0') || part.starts_with('+') {
            return Err(invalid());
        }
        part.parse::<u32>().map_err(|_| invalid())
    };
    Ok((parse(round)?, parse(number)?))
}

/// Display name of a round
pub fn round_name(bracket: &Bracket, round: u32) -> String {
    let last = round >= bracket.round_count;
    match bracket.id.kind {
        BracketKind::Main => match bracket.round_count.saturating_sub(round) + 1 {
            1 => "Finals".to_string(),
            2 => "Semifinals".to_string(),
            3 => "Quarterfinals".to_string(),
            from_end => format!("Round of {}", 1u64 << from_end),
        },
        BracketKind::ThirdPlace => "Third Place Match".to_string(),
        BracketKind::Upper if last => "Upper Finals".to_string(),
        BracketKind::Upper => format!("Upper Round {round}"),
        BracketKind::Lower if last => "Lower Finals".to_string(),
        BracketKind::Lower => format!("Lower Round {round}"),
        BracketKind::GrandFinal if round == 1 => "Grand Finals".to_string(),
        BracketKind::GrandFinal => "Grand Finals Reset".to_string(),
        BracketKind::Swiss | BracketKind::RoundRobin => format!("Round {round}"),
    }
}

fn match_reference(bracket: &Bracket, id: &MatchId) -> String {
    if id.bracket == bracket.id {
        id.to_string()
    } else {
        format!("{} {}", id.bracket.kind, id)
    }
}

fn team(bracket: &Bracket, slot: &Slot) -> String {
    match slot {
        Slot::Entrant(id) => bracket
            .entrant(*id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("Entrant {id}")),
        Slot::Winner(source) => format!("Winner of {}", match_reference(bracket, source)),
        Slot::Loser(source) => format!("Loser of {}", match_reference(bracket, source)),
        Slot::Bye => "BYE".to_string(),
    }
}

fn target(bracket: &Bracket, edge: Option<SlotRef>) -> Option<String> {
    edge.map(|t| match_reference(bracket, &t.match_id))
}

/// Project a bracket into notation form
pub fn export(bracket: &Bracket) -> BracketExport {
    let rounds = bracket
        .rounds()
        .into_iter()
        .map(|round| {
            let mut matches: Vec<_> = bracket.round_matches(round).collect();
            matches.sort_by_key(|m| m.id.number);
            RoundExport {
                round,
                name: round_name(bracket, round),
                matches: matches
                    .into_iter()
                    .map(|m| MatchExport {
                        match_identifier: m.id.to_string(),
                        teams: [team(bracket, &m.slots[0]), team(bracket, &m.slots[1])],
                        score: m.scores,
                        status: m.status,
                        advancement_target: target(bracket, m.winner_advances_to),
                        loser_advancement_target: target(bracket, m.loser_advances_to),
                    })
                    .collect(),
            }
        })
        .collect();

    BracketExport {
        bracket: bracket.id,
        name: bracket.name.clone(),
        rounds,
    }
}
