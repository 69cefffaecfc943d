// tests/fortune_properties.rs
//
// Property-style checks for both scoring formulas over seeded random inputs,
// plus the fixed-input scenarios (determinism, zero duration, repeated bosses).

use card_oracle::fortune::{basic, enhanced};
use card_oracle::{
    BasicFormula, BossSelection, CombatWindow, Distribution, EnhancedFormula, ScoreStrategy,
    Source, Strategy,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ROUNDS: usize = 300;
const NAME_CHARS: &[char] = &['A', 'b', 'Z', '7', '火', '龙', '王', 'é', ' ', '·'];

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn random_name(rng: &mut StdRng) -> String {
    let len = rng.random_range(0..12);
    (0..len)
        .map(|_| NAME_CHARS[rng.random_range(0..NAME_CHARS.len())])
        .collect()
}

fn random_inputs(rng: &mut StdRng) -> (CombatWindow, BossSelection, NaiveDateTime) {
    let origin = NaiveDate::from_ymd_opt(2023, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let start = origin + Duration::seconds(rng.random_range(0..(2 * 365 * 86_400)));
    let end = start + Duration::seconds(rng.random_range(0..7_200));
    let clock = origin + Duration::seconds(rng.random_range(0..(2 * 365 * 86_400)));
    let bosses = BossSelection::new(
        random_name(rng),
        random_name(rng),
        random_name(rng),
    );
    (CombatWindow::new(start, end), bosses, clock)
}

#[test]
fn every_distribution_has_five_cards_summing_to_100() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..ROUNDS {
        let (w, b, clock) = random_inputs(&mut rng);
        for strategy in [Strategy::Basic, Strategy::Enhanced] {
            let rec = strategy.engine().recommend(&w, &b, clock);
            let scores = rec.distribution.scores();
            assert_eq!(scores.len(), 5);
            let positions: Vec<u8> = scores.iter().map(|s| s.position).collect();
            assert_eq!(positions, vec![1, 2, 3, 4, 5]);
            assert!(
                (rec.distribution.total() - 100.0).abs() <= 0.01,
                "{strategy:?} total {} for {w:?} {b:?}",
                rec.distribution.total()
            );
            assert!((1..=5).contains(&rec.chosen_position));
            assert_eq!(
                Some(rec.probability),
                rec.distribution.probability_of(rec.chosen_position)
            );
        }
    }
}

#[test]
fn raw_scores_stay_inside_clamp_bounds() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..ROUNDS {
        let (w, b, clock) = random_inputs(&mut rng);
        for s in BasicFormula.raw_scores(&w, &b, clock) {
            assert!((basic::MIN_SCORE..=basic::MAX_SCORE).contains(&s), "basic raw {s}");
        }
        for s in EnhancedFormula.raw_scores(&w, &b, clock) {
            assert!(
                (enhanced::MIN_SCORE..=enhanced::MAX_SCORE).contains(&s),
                "enhanced raw {s}"
            );
        }
    }
}

#[test]
fn chosen_card_is_a_maximum_and_ties_go_left() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..ROUNDS {
        let (w, b, clock) = random_inputs(&mut rng);
        let rec = BasicFormula.recommend(&w, &b, clock);
        let max = rec
            .distribution
            .scores()
            .iter()
            .map(|s| s.probability)
            .fold(f64::MIN, f64::max);
        assert_eq!(rec.probability, max);
        let first_max = rec
            .distribution
            .scores()
            .iter()
            .find(|s| s.probability == max)
            .unwrap();
        assert_eq!(rec.chosen_position, first_max.position);
    }

    let d = Distribution::from_raw([10.0, 30.0, 20.0, 30.0, 10.0]);
    assert_eq!(d.leader().position, 2);
    let flat = Distribution::from_raw([25.0; 5]);
    assert_eq!(flat.leader().position, 1);
}

#[test]
fn enhanced_ignores_the_clock() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
        let (w, b, clock) = random_inputs(&mut rng);
        let later = clock + Duration::hours(rng.random_range(1..5_000));
        assert_eq!(
            EnhancedFormula.recommend(&w, &b, clock),
            EnhancedFormula.recommend(&w, &b, later)
        );
    }
}

#[test]
fn basic_is_deterministic_for_a_fixed_clock() {
    let w = CombatWindow::new(at(14, 0), at(14, 10));
    let b = BossSelection::new("Alpha", "Beta", "Gamma");
    let clock = at(14, 30);

    let first = BasicFormula.recommend(&w, &b, clock);
    let second = BasicFormula.recommend(&w, &b, clock);
    assert_eq!(first, second);
    assert_eq!(first.source, Source::FormulaBasic);
    assert!(first.rationale.contains("Alpha、Beta、Gamma"));
    assert!(first.rationale.contains("持久（10分0秒）"));
}

#[test]
fn zero_duration_still_yields_a_valid_distribution() {
    let w = CombatWindow::new(at(9, 0), at(9, 0));
    let b = BossSelection::new("Alpha", "Beta", "Gamma");
    for strategy in [Strategy::Basic, Strategy::Enhanced] {
        let rec = strategy.engine().recommend(&w, &b, at(9, 5));
        assert!((rec.distribution.total() - 100.0).abs() <= 0.01);
        assert!(rec.distribution.scores().iter().all(|s| s.probability > 0.0));
    }
}

#[test]
fn repeated_second_and_third_boss_is_accepted_by_the_core() {
    let w = CombatWindow::new(at(20, 0), at(20, 3));
    let b = BossSelection::new("A", "B", "B");
    let rec = EnhancedFormula.recommend(&w, &b, at(20, 10));
    assert!((rec.distribution.total() - 100.0).abs() <= 0.01);
    assert!(rec.rationale.contains("A → B → B"));
    assert_eq!(rec.factors.len(), 5);
    for pf in &rec.factors {
        assert_eq!(pf.factors.len(), 4);
    }
}
