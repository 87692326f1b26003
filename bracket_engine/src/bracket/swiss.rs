//! Swiss stage: generates round 1; later rounds come from progression.

use super::generator::{GenerateBracket, new_bracket};
use super::models::{Bracket, BracketId, BracketKind, TournamentId};
use crate::config::{BestOf, Format, SwissFirstRound, SwissOptions};
use crate::entrant::Entrant;
use crate::errors::{EngineError, EngineResult};
use crate::seeding::Seeder;
use crate::swiss::{PairingPlan, default_rounds};

#[derive(Debug, Clone)]
pub struct SwissGenerator {
    best_of: BestOf,
    options: SwissOptions,
}

impl SwissGenerator {
    pub fn new(best_of: BestOf, options: SwissOptions) -> Self {
        Self { best_of, options }
    }
}

/// First-round plan over entrants in placement order.
///
/// An odd field gives the last placement a bye before pairing.
pub fn first_round_plan(
    entrants: &[Entrant],
    method: SwissFirstRound,
    seeder: &mut Seeder,
) -> PairingPlan {
    let mut pool: Vec<i64> = entrants.iter().map(|e| e.id).collect();
    let bye = if pool.len() % 2 == 1 { pool.pop() } else { None };

    let pairs = match method {
        SwissFirstRound::Folding => {
            let half = pool.len() / 2;
            (0..half).map(|i| (pool[i], pool[i + half])).collect()
        }
        SwissFirstRound::Adjacent => pool.chunks(2).map(|p| (p[0], p[1])).collect(),
        SwissFirstRound::Random => {
            seeder.shuffle(&mut pool);
            pool.chunks(2).map(|p| (p[0], p[1])).collect()
        }
    };

    PairingPlan { pairs, bye }
}

impl GenerateBracket for SwissGenerator {
    fn format(&self) -> Format {
        Format::Swiss
    }

    fn generate(
        &self,
        tournament: TournamentId,
        entrants: &[Entrant],
        seeder: &mut Seeder,
    ) -> EngineResult<Vec<Bracket>> {
        let count = entrants.len();
        if count < 2 {
            return Err(EngineError::InvalidConfiguration(format!(
                "swiss needs at least 2 entrants, got {count}"
            )));
        }

        for (name, threshold) in [
            ("wins_required", self.options.wins_required),
            ("losses_eliminated", self.options.losses_eliminated),
        ] {
            if threshold == Some(0) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "swiss {name} must be at least 1"
                )));
            }
        }

        let rounds = self
            .options
            .rounds
            .unwrap_or_else(|| default_rounds(count, &self.options));
        if rounds == 0 || rounds as usize > count - 1 {
            return Err(EngineError::InvalidConfiguration(format!(
                "swiss with {count} entrants supports 1..={} rounds, got {rounds}",
                count - 1
            )));
        }

        let id = BracketId::new(tournament, BracketKind::Swiss);
        let mut bracket = new_bracket(id, "Swiss Stage", Format::Swiss, entrants, self.best_of);
        bracket.round_count = rounds;
        bracket.rounds_generated = 1;
        bracket.swiss = Some(self.options);
        bracket.matches =
            first_round_plan(entrants, self.options.first_round, seeder).into_matches(id, 1, self.best_of);

        Ok(vec![bracket])
    }
}
