//! model.rs: value objects shared by the scoring formulas, the interpreter and the API.
//!
//! Everything here is transient: created per prediction request, rendered, dropped.
//! Positions are 1-based (card 1 is the leftmost card).

use chrono::{DateTime, Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Number of face-down cards offered after a trial run.
pub const CARD_COUNT: usize = 5;

/// Position the interpreter falls back to when a remote reply names no usable card.
pub const DEFAULT_POSITION: u8 = 3;

/// Format used by browser `datetime-local` inputs.
pub const FORM_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Start/end of the final boss fight sequence.
///
/// `end > start` is a caller precondition. Scoring tolerates zero or negative durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl CombatWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Default form window: the last thirty minutes before `now`.
    pub fn default_ending_at(now: NaiveDateTime) -> Self {
        Self {
            start: now - Duration::minutes(30),
            end: now,
        }
    }

    /// Signed duration in (fractional) seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }
}

/// The three defeated bosses, in kill order.
///
/// Order and exact characters matter: both feed the scoring hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossSelection([String; 3]);

impl BossSelection {
    pub fn new(first: impl Into<String>, second: impl Into<String>, third: impl Into<String>) -> Self {
        Self([first.into(), second.into(), third.into()])
    }

    pub fn names(&self) -> &[String; 3] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn join(&self, sep: &str) -> String {
        self.0.join(sep)
    }
}

impl From<[String; 3]> for BossSelection {
    fn from(names: [String; 3]) -> Self {
        Self(names)
    }
}

/// Probability (in percent) attached to one card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardScore {
    pub position: u8,
    pub probability: f64,
}

/// Exactly one `CardScore` per position 1..=5, summing to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    scores: [CardScore; CARD_COUNT],
}

impl Distribution {
    /// Normalize clamped raw scores so they sum to 100 while keeping their ratios.
    pub fn from_raw(raw: [f64; CARD_COUNT]) -> Self {
        let total: f64 = raw.iter().sum();
        let mut scores = [CardScore {
            position: 0,
            probability: 0.0,
        }; CARD_COUNT];
        for (i, slot) in scores.iter_mut().enumerate() {
            let probability = if total > 0.0 && total.is_finite() {
                raw[i] / total * 100.0
            } else {
                100.0 / CARD_COUNT as f64
            };
            *slot = CardScore {
                position: (i + 1) as u8,
                probability,
            };
        }
        Self { scores }
    }

    pub fn scores(&self) -> &[CardScore; CARD_COUNT] {
        &self.scores
    }

    /// Probability at a 1-based position; `None` outside 1..=5.
    pub fn probability_of(&self, position: u8) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.position == position)
            .map(|s| s.probability)
    }

    pub fn total(&self) -> f64 {
        self.scores.iter().map(|s| s.probability).sum()
    }

    /// Highest-probability card. Scans 1 → 5 with a strict `>`, so the earliest
    /// position wins a tie.
    pub fn leader(&self) -> CardScore {
        let mut best = self.scores[0];
        for s in &self.scores[1..] {
            if s.probability > best.probability {
                best = *s;
            }
        }
        best
    }

    /// Cards ordered by descending probability; ties keep position order.
    pub fn ranked(&self) -> Vec<CardScore> {
        let mut out = self.scores.to_vec();
        out.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        out
    }
}

/// Where a recommendation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    FormulaBasic,
    FormulaEnhanced,
    RemoteModel,
}

/// The four inspectable factors of the enhanced formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    BossPattern,
    TimePattern,
    DurationPattern,
    PositionBias,
}

/// One signed contribution plus its short verdict ("较高"/"较低" and friends).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub kind: FactorKind,
    pub contribution: f64,
    pub judgment: String,
    /// Full sentence for display, e.g. "位置3的历史表现较好".
    pub detail: String,
}

/// Factor breakdown for a single position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFactors {
    pub position: u8,
    pub factors: Vec<Factor>,
}

impl PositionFactors {
    pub fn sum(&self) -> f64 {
        self.factors.iter().map(|f| f.contribution).sum()
    }
}

/// Final answer handed to the presentation layer.
///
/// After a remote override, `probability` is read from the local distribution at
/// `chosen_position` and is not necessarily the distribution maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub distribution: Distribution,
    pub chosen_position: u8,
    pub probability: f64,
    /// Plain text with literal `\n` line breaks.
    pub rationale: String,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub factors: Vec<PositionFactors>,
}

impl Recommendation {
    /// Remote-sourced results hide numeric probabilities (product decision).
    pub fn displays_probabilities(&self) -> bool {
        self.source != Source::RemoteModel
    }

    /// Rationale escaped for HTML, line breaks turned into `<br>`.
    pub fn rationale_html(&self) -> String {
        html_escape::encode_text(&self.rationale)
            .replace("\r\n", "<br>")
            .replace('\n', "<br>")
    }
}

/// Chinese ordinal used in rationale text ("第一张牌").
pub fn position_ordinal(position: u8) -> &'static str {
    match position {
        1 => "一",
        2 => "二",
        3 => "三",
        4 => "四",
        5 => "五",
        _ => "?",
    }
}

/// Parse a timestamp as sent by a browser form or an API client.
///
/// Accepts `datetime-local` values (with or without seconds), a space-separated
/// variant, and RFC 3339 (converted to local wall-clock time).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    const FORMATS: [&str; 5] = [
        FORM_TIME_FORMAT,
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}
