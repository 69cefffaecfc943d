//! Basic formula: five sinusoidal terms plus a clock-seeded offset per card.
//!
//! raw(p) = 20 + 15·position + 20·boss + 15·time + 10·duration + 0.15·(seed − 50)
//! clamped to [10, 35], where `seed = (boss_hash + 37p + time_seed + day_of_year) mod 100`.

use std::f64::consts::PI;
use std::fmt::Write as _;

use chrono::{NaiveDateTime, Timelike};

use super::{boss_hash, char_code_sum, minutes_seconds, ClockParts, ScoreStrategy};
use crate::model::{
    position_ordinal, BossSelection, CombatWindow, Distribution, Recommendation, Source,
    CARD_COUNT,
};

pub const BASE_SCORE: f64 = 20.0;
pub const MIN_SCORE: f64 = 10.0;
pub const MAX_SCORE: f64 = 35.0;

/// A runner-up above this share gets mentioned in the rationale.
const SECONDARY_MENTION_PCT: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicFormula;

impl ScoreStrategy for BasicFormula {
    fn source(&self) -> Source {
        Source::FormulaBasic
    }

    fn raw_scores(
        &self,
        window: &CombatWindow,
        bosses: &BossSelection,
        clock: NaiveDateTime,
    ) -> [f64; CARD_COUNT] {
        let duration = window.duration_secs();
        let c = ClockParts::from(clock);
        let hash = boss_hash(bosses);
        let time_seed = (c.hour * 3600 + c.minute * 60 + c.second + c.day_of_year * 86_400) % 1000;
        let char_sums: Vec<f64> = bosses.iter().map(|b| char_code_sum(b) as f64).collect();
        let minute_of_day = (c.hour * 60 + c.minute) as f64;

        let mut raw = [0.0; CARD_COUNT];
        for (idx, slot) in raw.iter_mut().enumerate() {
            let card = (idx + 1) as u64;
            let p = card as f64;

            let position = (p * PI / 3.0).sin() * 0.1;
            let boss: f64 = char_sums
                .iter()
                .enumerate()
                .map(|(i, sum)| ((sum + p + i as f64) * PI / 7.0).sin() * 0.08)
                .sum();
            let time = ((minute_of_day + p * 7.0) * PI / 180.0).sin() * 0.12;
            let dur = ((duration + p * 10.0) * PI / 120.0).sin() * 0.1;

            let mut score =
                BASE_SCORE + position * 15.0 + boss * 20.0 + time * 15.0 + dur * 10.0;

            let seed = hash
                .wrapping_add(card * 37)
                .wrapping_add(time_seed)
                .wrapping_add(c.day_of_year)
                % 100;
            score += (seed as f64 - 50.0) * 0.15;

            *slot = score.clamp(MIN_SCORE, MAX_SCORE);
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
        let rationale = rationale(window, bosses, &distribution);
        Recommendation {
            chosen_position: leader.position,
            probability: leader.probability,
            distribution,
            rationale,
            source: self.source(),
            factors: Vec::new(),
        }
    }
}

/// Flowing one-paragraph explanation. Time-of-day comes from the combat start.
pub(crate) fn rationale(
    window: &CombatWindow,
    bosses: &BossSelection,
    dist: &Distribution,
) -> String {
    let hour = window.start.hour();
    let clock = format!("{}:{:02}", hour, window.start.minute());
    let duration = window.duration_secs();
    let (mins, secs) = minutes_seconds(duration);
    let leader = dist.leader();

    let mut out = String::new();
    let _ = match hour {
        6..=11 => write!(out, "🌅 早晨时分（{clock}），阳气初升，"),
        12..=17 => write!(out, "☀️ 正午时分（{clock}），阳气最盛，"),
        18..=23 => write!(out, "🌆 傍晚时分（{clock}），阴阳交替，"),
        _ => write!(out, "🌙 深夜时分（{clock}），阴气正浓，"),
    };

    let pace = if duration < 180.0 {
        "迅速"
    } else if duration < 600.0 {
        "适中"
    } else {
        "持久"
    };
    let _ = write!(out, "战斗{pace}（{mins}分{secs}秒），");
    let _ = write!(out, "已击败{}。", bosses.join("、"));

    let _ = write!(
        out,
        "根据玄学推演，第{}张牌（位置{}）的出货概率最高（{:.1}%）。",
        position_ordinal(leader.position),
        leader.position,
        leader.probability
    );

    if let Some(second) = dist.ranked().get(1) {
        if second.probability > SECONDARY_MENTION_PCT {
            let _ = write!(
                out,
                "次选为第{}张牌（{:.1}%）。",
                position_ordinal(second.position),
                second.probability
            );
        }
    }

    out.push_str(" 建议优先选择推荐位置，玄学改命，信则有！");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample() -> (CombatWindow, BossSelection) {
        (
            CombatWindow::new(ts(14, 0), ts(14, 10)),
            BossSelection::new("Alpha", "Beta", "Gamma"),
        )
    }

    #[test]
    fn raw_scores_stay_in_clamp_range() {
        let (w, b) = sample();
        for hour in 0..24 {
            let raw = BasicFormula.raw_scores(&w, &b, ts(hour, 17));
            for s in raw {
                assert!((MIN_SCORE..=MAX_SCORE).contains(&s), "raw {s} out of range");
            }
        }
    }

    #[test]
    fn same_clock_same_answer() {
        let (w, b) = sample();
        let clock = ts(14, 30);
        let r1 = BasicFormula.recommend(&w, &b, clock);
        let r2 = BasicFormula.recommend(&w, &b, clock);
        assert_eq!(r1, r2);
        assert!((r1.distribution.total() - 100.0).abs() < 0.01);
    }

    #[test]
    fn chosen_card_is_the_leader() {
        let (w, b) = sample();
        let r = BasicFormula.recommend(&w, &b, ts(9, 45));
        let max = r
            .distribution
            .scores()
            .iter()
            .map(|s| s.probability)
            .fold(f64::MIN, f64::max);
        assert_eq!(r.probability, max);
        assert_eq!(r.distribution.probability_of(r.chosen_position), Some(max));
    }

    #[test]
    fn rationale_mentions_buckets_and_bosses() {
        let (w, b) = sample();
        let r = BasicFormula.recommend(&w, &b, ts(14, 30));
        assert!(r.rationale.contains("正午时分（14:00）"));
        assert!(r.rationale.contains("战斗持久（10分0秒）"));
        assert!(r.rationale.contains("Alpha、Beta、Gamma"));
        assert!(r.rationale.contains(&format!("位置{}", r.chosen_position)));
    }

    #[test]
    fn fast_night_fight_rationale() {
        let w = CombatWindow::new(ts(2, 5), ts(2, 7));
        let b = BossSelection::new("A", "B", "C");
        let r = BasicFormula.recommend(&w, &b, ts(2, 30));
        assert!(r.rationale.starts_with("🌙 深夜时分（2:05）"));
        assert!(r.rationale.contains("战斗迅速（2分0秒）"));
    }

    #[test]
    fn time_buckets_follow_start_hour() {
        let b = BossSelection::new("A", "B", "C");
        let cases = [
            (5, "🌙 深夜时分（5:00）"),
            (6, "🌅 早晨时分（6:00）"),
            (11, "🌅 早晨时分（11:00）"),
            (12, "☀️ 正午时分（12:00）"),
            (17, "☀️ 正午时分（17:00）"),
            (18, "🌆 傍晚时分（18:00）"),
            (23, "🌆 傍晚时分（23:00）"),
        ];
        for (hour, prefix) in cases {
            let w = CombatWindow::new(ts(hour, 0), ts(hour, 4));
            let r = BasicFormula.recommend(&w, &b, ts(hour, 30));
            assert!(r.rationale.starts_with(prefix), "hour {hour}: {}", r.rationale);
        }
    }

    #[test]
    fn runner_up_mentioned_only_above_twenty_percent() {
        let (w, b) = sample();
        for minute in (0..60).step_by(7) {
            let r = BasicFormula.recommend(&w, &b, ts(16, minute));
            let second = r.distribution.ranked()[1];
            assert_eq!(
                r.rationale.contains("次选为第"),
                second.probability > SECONDARY_MENTION_PCT,
                "minute {minute}: {}",
                r.rationale
            );
        }

        let strong = Distribution::from_raw([30.0, 25.0, 15.0, 15.0, 15.0]);
        assert!(rationale(&w, &b, &strong).contains("次选为第二张牌（25.0%）。"));

        let weak = Distribution::from_raw([60.0, 10.0, 10.0, 10.0, 10.0]);
        assert!(!rationale(&w, &b, &weak).contains("次选"));

        // Exactly 20% is not "above".
        let edge = Distribution::from_raw([40.0, 20.0, 15.0, 15.0, 10.0]);
        assert!(!rationale(&w, &b, &edge).contains("次选"));
    }
}
