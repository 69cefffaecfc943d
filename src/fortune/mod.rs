// src/fortune/mod.rs
//! Scoring formulas ("fortune telling"): map a combat window, three bosses and the
//! current clock to a distribution over the five cards.
//!
//! Two strategies live side by side:
//! - [`BasicFormula`]: sinusoidal blend + clock-seeded offset, clamp [10, 35]
//! - [`EnhancedFormula`]: four named factors on a base of 15, clamp [8, 40]
//!
//! Both are pure. The only ambient input, wall-clock time, is passed in as `clock`:
//! production callers pass `Local::now().naive_local()`, tests pass a fixed value.
//! Repeated calls at different real times are expected to disagree.

pub mod basic;
pub mod enhanced;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::model::{BossSelection, CombatWindow, Recommendation, Source, CARD_COUNT};

pub use basic::BasicFormula;
pub use enhanced::EnhancedFormula;

/// A scoring formula. Implementations must be total: every input yields exactly
/// five normalized scores, one per position.
pub trait ScoreStrategy: Send + Sync {
    fn source(&self) -> Source;

    /// Clamped scores before normalization, indexed by `position - 1`.
    fn raw_scores(
        &self,
        window: &CombatWindow,
        bosses: &BossSelection,
        clock: NaiveDateTime,
    ) -> [f64; CARD_COUNT];

    /// Normalize, pick the leading card and explain it.
    fn recommend(
        &self,
        window: &CombatWindow,
        bosses: &BossSelection,
        clock: NaiveDateTime,
    ) -> Recommendation;
}

/// Strategy selector used by callers that take the choice from user input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Basic,
    #[default]
    Enhanced,
}

impl Strategy {
    pub fn engine(self) -> &'static dyn ScoreStrategy {
        match self {
            Strategy::Basic => &BasicFormula,
            Strategy::Enhanced => &EnhancedFormula,
        }
    }
}

/// Convenience entry: run `strategy` on the given inputs.
pub fn recommend(
    strategy: Strategy,
    window: &CombatWindow,
    bosses: &BossSelection,
    clock: NaiveDateTime,
) -> Recommendation {
    strategy.engine().recommend(window, bosses, clock)
}

/// Clock components the basic formula feeds on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ClockParts {
    pub hour: u64,
    pub minute: u64,
    pub second: u64,
    /// 1 for January 1st.
    pub day_of_year: u64,
}

impl From<NaiveDateTime> for ClockParts {
    fn from(ts: NaiveDateTime) -> Self {
        Self {
            hour: u64::from(ts.hour()),
            minute: u64::from(ts.minute()),
            second: u64::from(ts.second()),
            day_of_year: u64::from(ts.ordinal()),
        }
    }
}

/// Sum of UTF-16 code units.
pub(crate) fn char_code_sum(name: &str) -> u64 {
    name.encode_utf16()
        .fold(0u64, |acc, c| acc.wrapping_add(u64::from(c)))
}

/// Position-weighted hash over all bosses: each code unit times its 1-based index,
/// then each boss times `(boss_index + 1) * 17`. Wrapping, so arbitrarily long names
/// cannot panic. An empty name contributes 0.
pub(crate) fn boss_hash(bosses: &BossSelection) -> u64 {
    bosses
        .iter()
        .enumerate()
        .fold(0u64, |hash, (idx, name)| {
            let value = name
                .encode_utf16()
                .enumerate()
                .fold(0u64, |acc, (i, c)| {
                    acc.wrapping_add(u64::from(c).wrapping_mul(i as u64 + 1))
                });
            hash.wrapping_add(value.wrapping_mul((idx as u64 + 1) * 17))
        })
}

/// Whole minutes and seconds of a (possibly negative) duration, floored.
pub(crate) fn minutes_seconds(duration_secs: f64) -> (i64, i64) {
    (
        (duration_secs / 60.0).floor() as i64,
        (duration_secs % 60.0).floor() as i64,
    )
}
