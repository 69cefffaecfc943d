// src/interpret.rs
//! Turn a free-text advisor reply into a card choice, then blend it with a locally
//! computed distribution.
//!
//! The remote model decides *which* card; the local enhanced formula supplies the
//! numbers. After an override the reported probability is the local value at the
//! chosen card, not the distribution maximum.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Recommendation, Source, DEFAULT_POSITION};

/// "Card N" phrasings, highest precedence first. ASCII digits only.
static CARD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"([0-9])号牌子",
        r"第([0-9])张牌",
        r"位置[：:]\s*([0-9])",
        r"推荐[：:]\s*第?([0-9])",
        r"选择[：:]\s*第?([0-9])",
        r"选([0-9])号",
        r"([0-9])号牌",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("card pattern"))
    .collect()
});

/// Card number named by `text`, or 3 when nothing usable is found.
///
/// Each pattern is tried on its first match only; a digit outside 1..=5 moves on
/// to the next pattern.
pub fn extract_card_choice(text: &str) -> u8 {
    CARD_PATTERNS
        .iter()
        .filter_map(|re| re.captures(text))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u8>().ok())
        .find(|n| (1..=5).contains(n))
        .unwrap_or(DEFAULT_POSITION)
}

/// Override `base` (an enhanced-formula result) with the card named in `reply`.
///
/// The rationale embeds the reply verbatim, then the optional reasoning summary,
/// then the override note.
pub fn build_recommendation(
    reply: &str,
    reasoning: Option<&str>,
    base: Recommendation,
) -> Recommendation {
    let chosen = extract_card_choice(reply);

    let mut rationale = format!("🤖 AI顾问分析：\n\n{reply}\n\n");
    if let Some(r) = reasoning.filter(|r| !r.trim().is_empty()) {
        rationale.push_str(&format!("\n💭 AI推理过程：\n{r}\n\n"));
    }
    rationale.push_str(&format!(
        "基于AI顾问的推理，结合算法分析，推荐位置{chosen}。"
    ));

    let probability = base
        .distribution
        .probability_of(chosen)
        .unwrap_or(base.probability);

    Recommendation {
        chosen_position: chosen,
        probability,
        rationale,
        source: Source::RemoteModel,
        ..base
    }
}
