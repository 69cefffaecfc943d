//! Caller-side preconditions for a prediction request.
//!
//! The scoring core accepts anything; these checks belong to whoever collects the
//! form input (here: the HTTP layer).

use thiserror::Error;

use crate::model::{parse_timestamp, BossSelection, CombatWindow};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("请填写完整信息：缺少 {0}")]
    MissingField(&'static str),
    #[error("无法解析时间 {field}: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("需要恰好三个Boss，收到 {0} 个")]
    BossCount(usize),
    #[error("结束时间必须晚于开始时间")]
    InvertedWindow,
    #[error("第二个和第三个Boss不能重复")]
    DuplicateBoss,
}

const BOSS_FIELDS: [&str; 3] = ["boss1", "boss2", "boss3"];

/// Check completeness, then time order, then the second/third boss rule.
pub fn validate_request(
    start: Option<&str>,
    end: Option<&str>,
    bosses: &[String],
) -> Result<(CombatWindow, BossSelection), ValidationError> {
    let start_raw = non_blank(start).ok_or(ValidationError::MissingField("start"))?;
    let end_raw = non_blank(end).ok_or(ValidationError::MissingField("end"))?;

    if bosses.len() > BOSS_FIELDS.len() {
        return Err(ValidationError::BossCount(bosses.len()));
    }
    for (i, field) in BOSS_FIELDS.iter().enumerate() {
        if bosses.get(i).map_or(true, |b| b.trim().is_empty()) {
            return Err(ValidationError::MissingField(field));
        }
    }

    let start = parse_timestamp(start_raw).ok_or_else(|| ValidationError::InvalidTimestamp {
        field: "start",
        value: start_raw.to_string(),
    })?;
    let end = parse_timestamp(end_raw).ok_or_else(|| ValidationError::InvalidTimestamp {
        field: "end",
        value: end_raw.to_string(),
    })?;
    if start >= end {
        return Err(ValidationError::InvertedWindow);
    }

    let names = [
        bosses[0].trim().to_string(),
        bosses[1].trim().to_string(),
        bosses[2].trim().to_string(),
    ];
    if names[1] == names[2] {
        return Err(ValidationError::DuplicateBoss);
    }

    Ok((CombatWindow::new(start, end), BossSelection::from(names)))
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
