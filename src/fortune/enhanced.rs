//! Enhanced formula: a flat base of 15 per card, adjusted by four independent factors
//! (boss pattern, time pattern, duration pattern, position bias), clamped to [8, 40].
//!
//! Each factor is exposed on its own so the breakdown can be shown next to the result.
//! This is the default strategy when no remote advisor is consulted.

use std::f64::consts::PI;
use std::fmt::Write as _;

use chrono::{NaiveDateTime, Timelike};

use super::{char_code_sum, minutes_seconds, ScoreStrategy};
use crate::model::{
    BossSelection, CombatWindow, Distribution, Factor, FactorKind, PositionFactors,
    Recommendation, Source, CARD_COUNT,
};

pub const BASE_SCORE: f64 = 15.0;
pub const MIN_SCORE: f64 = 8.0;
pub const MAX_SCORE: f64 = 40.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct EnhancedFormula;

impl EnhancedFormula {
    /// Per-position factor breakdown, positions 1..=5 in order.
    pub fn analyze(&self, window: &CombatWindow, bosses: &BossSelection) -> Vec<PositionFactors> {
        let hour = window.start.hour();
        let minute = window.start.minute();
        let duration = window.duration_secs();
        (1..=CARD_COUNT as u8)
            .map(|card| PositionFactors {
                position: card,
                factors: vec![
                    boss_pattern(bosses, card),
                    time_pattern(hour, minute, card),
                    duration_pattern(duration, card),
                    position_bias(card),
                ],
            })
            .collect()
    }
}

impl ScoreStrategy for EnhancedFormula {
    fn source(&self) -> Source {
        Source::FormulaEnhanced
    }

    fn raw_scores(
        &self,
        window: &CombatWindow,
        bosses: &BossSelection,
        _clock: NaiveDateTime,
    ) -> [f64; CARD_COUNT] {
        let mut raw = [BASE_SCORE; CARD_COUNT];
        for (slot, pf) in raw.iter_mut().zip(self.analyze(window, bosses)) {
            *slot = (BASE_SCORE + pf.sum()).clamp(MIN_SCORE, MAX_SCORE);
        }
        raw
    }

    fn recommend(
        &self,
        window: &CombatWindow,
        bosses: &BossSelection,
        clock: NaiveDateTime,
    ) -> Recommendation {
        let distribution = Distribution::from_raw(self.raw_scores(window, bosses, clock));
        let leader = distribution.leader();
        let rationale = report(window, bosses, &distribution);
        Recommendation {
            chosen_position: leader.position,
            probability: leader.probability,
            distribution,
            rationale,
            source: self.source(),
            factors: self.analyze(window, bosses),
        }
    }
}

/// How well the boss line-up "fits" a card: `(Σ code units + 23p) mod 7` on a sine.
pub fn boss_pattern(bosses: &BossSelection, card: u8) -> Factor {
    let char_sum: u64 = bosses
        .iter()
        .fold(0u64, |acc, b| acc.wrapping_add(char_code_sum(b)));
    let pattern = char_sum.wrapping_add(u64::from(card) * 23) % 7;
    let score = (pattern as f64 * PI / 3.5).sin() * 8.0;
    let judgment = if score > 0.0 { "较高" } else { "较低" };
    Factor {
        kind: FactorKind::BossPattern,
        contribution: score,
        judgment: judgment.into(),
        detail: format!(
            "Boss组合\"{}\"对位置{card}的契合度{judgment}",
            bosses.join("+")
        ),
    }
}

/// Minute-of-day cycle (period 720 minutes) shifted by 11 minutes per card.
pub fn time_pattern(hour: u32, minute: u32, card: u8) -> Factor {
    let value = (hour * 60 + minute + u32::from(card) * 11) % 1440;
    let score = (f64::from(value) * PI / 360.0).sin() * 6.0;
    let judgment = if score > 0.0 { "积极" } else { "消极" };
    Factor {
        kind: FactorKind::TimePattern,
        contribution: score,
        judgment: judgment.into(),
        detail: format!("开战时间{hour}:{minute:02}对位置{card}的影响{judgment}"),
    }
}

/// Thirty-minute cycle over fight length, five minutes apart per card.
pub fn duration_pattern(duration_secs: f64, card: u8) -> Factor {
    let minutes = duration_secs / 60.0;
    let score = ((minutes + f64::from(card) * 5.0) * PI / 15.0).sin() * 5.0;
    let judgment = if score > 0.0 { "有利" } else { "不利" };
    Factor {
        kind: FactorKind::DurationPattern,
        contribution: score,
        judgment: judgment.into(),
        detail: format!(
            "战斗时长{}分钟对位置{card}的倾向性{judgment}",
            minutes.floor() as i64
        ),
    }
}

/// Middle cards are "steadier": +3 for card 3, +1 for cards 2 and 4, −1 at the edges.
pub fn position_bias(card: u8) -> Factor {
    let score = match card {
        3 => 3.0,
        2 | 4 => 1.0,
        _ => -1.0,
    };
    let judgment = if score > 0.0 { "较好" } else { "一般" };
    Factor {
        kind: FactorKind::PositionBias,
        contribution: score,
        judgment: judgment.into(),
        detail: format!("位置{card}的历史表现{judgment}"),
    }
}

/// Multi-section report with a ranked per-position listing.
fn report(window: &CombatWindow, bosses: &BossSelection, dist: &Distribution) -> String {
    let (mins, secs) = minutes_seconds(window.duration_secs());
    let leader = dist.leader();

    let mut out = String::from("🤖 综合分析报告：\n\n");
    out.push_str("📊 战斗信息：\n");
    let _ = writeln!(out, "• Boss序列：{}", bosses.join(" → "));
    let _ = writeln!(out, "• 开战时间：{}", window.start.format("%Y/%-m/%-d %H:%M:%S"));
    let _ = writeln!(out, "• 战斗时长：{mins}分{secs}秒\n");

    out.push_str("🎯 预测结果：\n");
    let _ = writeln!(
        out,
        "• 推荐位置：第{}张牌（概率{:.1}%）\n",
        leader.position, leader.probability
    );

    out.push_str("📈 各位置概率分析：\n");
    for (rank, s) in dist.ranked().iter().enumerate() {
        let _ = writeln!(out, "{}. 位置{}: {:.1}%", rank + 1, s.position, s.probability);
    }

    let _ = write!(
        out,
        "\n💡 推理：基于Boss组合特征、时间周期、战斗时长等多维度因素，位置{}的综合评分最高，建议优先选择。",
        leader.position
    );
    out
}
