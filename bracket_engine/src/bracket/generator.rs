//! Format dispatch for bracket generation.

use enum_dispatch::enum_dispatch;
use std::collections::HashMap;

use super::audit::audit;
use super::double::DoubleEliminationGenerator;
use super::models::{Bracket, BracketId, MatchId, Slot, SlotRef, TournamentId};
use super::round_robin::RoundRobinGenerator;
use super::single::SingleEliminationGenerator;
use super::swiss::SwissGenerator;
use crate::config::{BestOf, Format, TournamentOptions};
use crate::entrant::Entrant;
use crate::errors::{EngineError, EngineResult};
use crate::seeding::Seeder;

/// Builds the brackets of one format from entrants in placement order
#[enum_dispatch]
pub trait GenerateBracket {
    /// Format produced by this generator
    fn format(&self) -> Format;

    /// Build the brackets. Input is in placement order (index 0 is the top
    /// placement). Invalid entrant counts are rejected before anything is built.
    fn generate(
        &self,
        tournament: TournamentId,
        entrants: &[Entrant],
        seeder: &mut Seeder,
    ) -> EngineResult<Vec<Bracket>>;
}

/// Generator for each supported format
#[enum_dispatch(GenerateBracket)]
#[derive(Debug, Clone)]
pub enum BracketGenerator {
    SingleElimination(SingleEliminationGenerator),
    DoubleElimination(DoubleEliminationGenerator),
    Swiss(SwissGenerator),
    RoundRobin(RoundRobinGenerator),
}

impl BracketGenerator {
    pub fn from_options(options: &TournamentOptions) -> Self {
        match options.format {
            Format::SingleElimination => SingleEliminationGenerator::new(options.best_of)
                .with_third_place(options.third_place_match)
                .into(),
            Format::DoubleElimination => DoubleEliminationGenerator::new(options.best_of).into(),
            Format::Swiss => SwissGenerator::new(options.best_of.default, options.swiss).into(),
            Format::RoundRobin => {
                RoundRobinGenerator::new(options.best_of.default, options.double_round_robin)
                    .into()
            }
        }
    }
}

/// Generate and audit the brackets for a tournament.
///
/// `entrants` must already be in placement order (see [`Seeder::apply`]).
pub fn generate(
    tournament: TournamentId,
    entrants: &[Entrant],
    options: &TournamentOptions,
    seeder: &mut Seeder,
) -> EngineResult<Vec<Bracket>> {
    let generator = BracketGenerator::from_options(options);
    let brackets = generator.generate(tournament, entrants, seeder)?;
    audit(&brackets)?;

    log::info!(
        "Generated {} bracket(s) for tournament {} ({}, {} entrants)",
        brackets.len(),
        tournament,
        generator.format(),
        entrants.len()
    );

    Ok(brackets)
}

/// Empty bracket shell; generators fill in rounds and matches
pub(crate) fn new_bracket(
    id: BracketId,
    name: &str,
    format: Format,
    entrants: &[Entrant],
    best_of: BestOf,
) -> Bracket {
    Bracket {
        id,
        name: name.to_string(),
        format,
        parent: None,
        team_count: entrants.len(),
        round_count: 0,
        rounds_generated: 0,
        best_of,
        swiss: None,
        entrants: entrants.to_vec(),
        matches: Vec::new(),
        version: 0,
    }
}

/// Point every match at the slots whose placeholders name it.
///
/// A source feeding two winner slots (or two loser slots) is a wiring error.
pub(crate) fn wire_placeholders(brackets: &mut [Bracket]) -> EngineResult<()> {
    let mut index: HashMap<MatchId, (usize, usize)> = HashMap::new();
    for (b, bracket) in brackets.iter().enumerate() {
        for (m, game) in bracket.matches.iter().enumerate() {
            index.insert(game.id, (b, m));
        }
    }

    let mut links = Vec::new();
    for bracket in brackets.iter() {
        for game in &bracket.matches {
            for (i, slot) in game.slots.iter().enumerate() {
                let target = SlotRef::new(game.id, super::Side::from_index(i));
                match slot {
                    Slot::Winner(source) => links.push((*source, target, true)),
                    Slot::Loser(source) => links.push((*source, target, false)),
                    _ => {}
                }
            }
        }
    }

    for (source, target, is_winner) in links {
        let &(b, m) = index.get(&source).ok_or_else(|| {
            EngineError::StructuralInvariantViolation(format!(
                "{}/{} references missing match {}/{}",
                target.match_id.bracket, target.match_id, source.bracket, source
            ))
        })?;
        let game = &mut brackets[b].matches[m];
        let edge = if is_winner {
            &mut game.winner_advances_to
        } else {
            &mut game.loser_advances_to
        };
        if edge.is_some() {
            return Err(EngineError::StructuralInvariantViolation(format!(
                "{}/{} feeds more than one {} slot",
                source.bracket,
                source,
                if is_winner { "winner" } else { "loser" }
            )));
        }
        *edge = Some(target);
    }

    Ok(())
}
