/// Property-based tests for seeding and bracket generation using proptest
///
/// These tests verify that seeding never loses or invents entrants and that
/// generated brackets have the expected shape for arbitrary field sizes.
use bracket_engine::bracket::{audit, generate};
use bracket_engine::config::{Format, SwissOptions, TournamentOptions};
use bracket_engine::entrant::Entrant;
use bracket_engine::seeding::{Seeder, SeedingMethod, validate_seeding};
use proptest::prelude::*;
use std::collections::BTreeSet;

// Strategy for a field of `min..=max` entrants with distinct ids and seeds
fn field_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Entrant>> {
    prop::collection::vec((1000i32..=3000, 0usize..4), min..=max).prop_map(|rows| {
        let regions = ["EU", "NA", "APAC", ""];
        rows.into_iter()
            .enumerate()
            .map(|(i, (rating, region))| {
                let entrant = Entrant::new(i as i64 + 1, format!("Team {}", i + 1), rating, i as u32 + 1);
                if regions[region].is_empty() {
                    entrant
                } else {
                    entrant.with_region(regions[region])
                }
            })
            .collect()
    })
}

fn method_strategy() -> impl Strategy<Value = SeedingMethod> {
    prop_oneof![
        Just(SeedingMethod::Seed),
        Just(SeedingMethod::Rating),
        Just(SeedingMethod::Balanced),
        Just(SeedingMethod::Regional),
        Just(SeedingMethod::Random),
    ]
}

fn ids(entrants: &[Entrant]) -> BTreeSet<i64> {
    entrants.iter().map(|e| e.id).collect()
}

proptest! {
    #[test]
    fn test_seeding_is_a_permutation(
        entrants in field_strategy(1, 64),
        method in method_strategy(),
        rng_seed in any::<u64>(),
    ) {
        let ordered = Seeder::with_seed(rng_seed).apply(&entrants, method);
        prop_assert_eq!(ordered.len(), entrants.len());
        prop_assert_eq!(ids(&ordered), ids(&entrants));
    }

    #[test]
    fn test_seeding_is_deterministic_per_rng_seed(
        entrants in field_strategy(2, 32),
        method in method_strategy(),
        rng_seed in any::<u64>(),
    ) {
        let first = Seeder::with_seed(rng_seed).apply(&entrants, method);
        let second = Seeder::with_seed(rng_seed).apply(&entrants, method);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_validation_does_not_mutate(entrants in field_strategy(0, 40)) {
        let before = entrants.clone();
        let report = validate_seeding(&entrants, Format::SingleElimination);
        prop_assert_eq!(&entrants, &before);
        prop_assert_eq!(report.valid, entrants.len() >= 2);
    }

    #[test]
    fn test_single_elimination_shape(entrants in field_strategy(2, 128)) {
        let count = entrants.len();
        let options = TournamentOptions::new(Format::SingleElimination);
        let brackets = generate(1, &entrants, &options, &mut Seeder::with_seed(0)).unwrap();

        let bracket = &brackets[0];
        prop_assert_eq!(bracket.matches.len(), count - 1);
        prop_assert_eq!(bracket.round_count, count.next_power_of_two().trailing_zeros());

        // Every entrant is placed exactly once, byes included
        let placed: Vec<i64> = bracket
            .matches
            .iter()
            .flat_map(|m| m.slots.iter().filter_map(|s| s.entrant()))
            .collect();
        prop_assert_eq!(placed.len(), count);
        prop_assert_eq!(placed.iter().copied().collect::<BTreeSet<_>>(), ids(&entrants));
    }

    #[test]
    fn test_double_elimination_shape(exponent in 2u32..=6) {
        let count = 1usize << exponent;
        let entrants: Vec<Entrant> = (1..=count)
            .map(|i| Entrant::new(i as i64, format!("Team {i}"), 1500, i as u32))
            .collect();
        let options = TournamentOptions::new(Format::DoubleElimination);
        let brackets = generate(1, &entrants, &options, &mut Seeder::with_seed(0)).unwrap();

        let total: usize = brackets.iter().map(|b| b.matches.len()).sum();
        // Upper N - 1, lower N - 2, one grand final
        prop_assert_eq!(total, 2 * count - 2);
        prop_assert_eq!(brackets[1].round_count, 2 * (exponent - 1));
        audit(&brackets).unwrap();
    }

    #[test]
    fn test_round_robin_match_count(entrants in field_strategy(2, 24), double in any::<bool>()) {
        let count = entrants.len();
        let options = TournamentOptions::new(Format::RoundRobin).with_double_round_robin(double);
        let brackets = generate(1, &entrants, &options, &mut Seeder::with_seed(0)).unwrap();

        let legs = if double { 2 } else { 1 };
        prop_assert_eq!(brackets[0].matches.len(), legs * count * (count - 1) / 2);
    }

    #[test]
    fn test_swiss_first_round_covers_field(entrants in field_strategy(2, 64)) {
        let count = entrants.len();
        let options = TournamentOptions::new(Format::Swiss).with_swiss(SwissOptions::default());
        let brackets = generate(1, &entrants, &options, &mut Seeder::with_seed(0)).unwrap();

        let bracket = &brackets[0];
        prop_assert_eq!(bracket.matches.len(), count.div_ceil(2));
        prop_assert_eq!(bracket.matches.iter().filter(|m| m.is_bye()).count(), count % 2);
        let placed: BTreeSet<i64> = bracket
            .matches
            .iter()
            .flat_map(|m| m.slots.iter().filter_map(|s| s.entrant()))
            .collect();
        prop_assert_eq!(placed, ids(&entrants));
    }
}
