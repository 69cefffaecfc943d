//! # Prediction flow
//! Local formulas, or the remote advisor blended with the enhanced formula.
//!
//! Remote failures never bubble up: the enhanced result is returned with a
//! [`RemoteOutcome::Failed`] marker so the caller can tell the user.

use std::time::Instant;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, warn};

use crate::advisor::{build_prompt, Advisor, AdvisorError};
use crate::fortune::{self, EnhancedFormula, ScoreStrategy, Strategy};
use crate::interpret::build_recommendation;
use crate::metrics;
use crate::model::{BossSelection, CombatWindow, Recommendation};
use crate::telemetry::anon_hash;

/// What happened on the remote path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemoteOutcome {
    NotRequested,
    Used,
    Failed { kind: String, message: String },
}

impl RemoteOutcome {
    fn failed(err: &AdvisorError) -> Self {
        RemoteOutcome::Failed {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    pub fn used(&self) -> bool {
        matches!(self, RemoteOutcome::Used)
    }

    pub fn fell_back(&self) -> bool {
        matches!(self, RemoteOutcome::Failed { .. })
    }

    /// `off` | `used` | failure kind (`error`, `format`, `transport`).
    pub fn reason(&self) -> &str {
        match self {
            RemoteOutcome::NotRequested => "off",
            RemoteOutcome::Used => "used",
            RemoteOutcome::Failed { kind, .. } => kind,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RemoteOutcome::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub recommendation: Recommendation,
    pub remote: RemoteOutcome,
}

/// Score with a local formula only.
pub fn predict_local(
    strategy: Strategy,
    window: &CombatWindow,
    bosses: &BossSelection,
    clock: NaiveDateTime,
) -> Prediction {
    let recommendation = fortune::recommend(strategy, window, bosses, clock);
    metrics::record_prediction(recommendation.source);
    Prediction {
        recommendation,
        remote: RemoteOutcome::NotRequested,
    }
}

/// Ask `advisor`, blend its pick into the enhanced distribution, or fall back.
///
/// A disabled advisor is not called at all.
pub async fn predict_with_advisor(
    advisor: &dyn Advisor,
    window: &CombatWindow,
    bosses: &BossSelection,
    clock: NaiveDateTime,
) -> Prediction {
    let base = EnhancedFormula.recommend(window, bosses, clock);

    if !advisor.is_enabled() {
        metrics::record_prediction(base.source);
        return Prediction {
            recommendation: base,
            remote: RemoteOutcome::NotRequested,
        };
    }

    let prompt = build_prompt(window, bosses);
    let started = Instant::now();
    let result = advisor.advise(&prompt).await;
    metrics::record_remote_latency(started.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok(reply) => {
            info!(
                advisor = advisor.name(),
                reply_id = %anon_hash(&reply.text),
                reply_chars = reply.text.chars().count(),
                has_reasoning = reply.reasoning.is_some(),
                "advisor reply received"
            );
            let recommendation =
                build_recommendation(&reply.text, reply.reasoning.as_deref(), base);
            metrics::record_prediction(recommendation.source);
            Prediction {
                recommendation,
                remote: RemoteOutcome::Used,
            }
        }
        Err(err) => {
            warn!(
                advisor = advisor.name(),
                kind = err.kind(),
                error = %err,
                "advisor failed; falling back to enhanced formula"
            );
            metrics::record_fallback(err.kind());
            metrics::record_prediction(base.source);
            Prediction {
                recommendation: base,
                remote: RemoteOutcome::failed(&err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{DisabledAdvisor, StubAdvisor};
    use crate::model::Source;
    use chrono::NaiveDate;

    fn inputs() -> (CombatWindow, BossSelection, NaiveDateTime) {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        (
            CombatWindow::new(
                day.and_hms_opt(14, 0, 0).unwrap(),
                day.and_hms_opt(14, 10, 0).unwrap(),
            ),
            BossSelection::new("Alpha", "Beta", "Gamma"),
            day.and_hms_opt(14, 30, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn remote_pick_overrides_local_choice() {
        let (w, b, clock) = inputs();
        let p = predict_with_advisor(&StubAdvisor::replying("建议选2号牌子"), &w, &b, clock).await;
        assert!(p.remote.used());
        assert_eq!(p.recommendation.chosen_position, 2);
        assert_eq!(p.recommendation.source, Source::RemoteModel);
        let local = EnhancedFormula.recommend(&w, &b, clock);
        assert_eq!(p.recommendation.distribution, local.distribution);
        assert_eq!(
            Some(p.recommendation.probability),
            local.distribution.probability_of(2)
        );
    }

    #[tokio::test]
    async fn failure_falls_back_with_flag() {
        let (w, b, clock) = inputs();
        let stub = StubAdvisor::failing(AdvisorError::Call {
            status: 401,
            message: Some("bad key".into()),
        });
        let p = predict_with_advisor(&stub, &w, &b, clock).await;
        assert!(p.remote.fell_back());
        assert_eq!(p.remote.reason(), "error");
        assert!(p.remote.error_message().unwrap().contains("401"));
        assert_eq!(p.recommendation, EnhancedFormula.recommend(&w, &b, clock));
    }

    #[tokio::test]
    async fn disabled_advisor_is_not_requested() {
        let (w, b, clock) = inputs();
        let p = predict_with_advisor(&DisabledAdvisor, &w, &b, clock).await;
        assert_eq!(p.remote, RemoteOutcome::NotRequested);
        assert_eq!(p.recommendation.source, Source::FormulaEnhanced);
    }

    #[test]
    fn local_basic_prediction() {
        let (w, b, clock) = inputs();
        let p = predict_local(Strategy::Basic, &w, &b, clock);
        assert_eq!(p.remote.reason(), "off");
        assert_eq!(p.recommendation.source, Source::FormulaBasic);
    }
}
