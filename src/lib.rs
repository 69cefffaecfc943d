// src/lib.rs
// Public library surface for the service binary, the demo and integration tests.

pub mod advisor;
pub mod api;
pub mod config;
pub mod fortune;
pub mod interpret;
pub mod metrics;
pub mod model;
pub mod predict;
pub mod telemetry;
pub mod validate;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::fortune::{BasicFormula, EnhancedFormula, ScoreStrategy, Strategy};
pub use crate::interpret::{build_recommendation, extract_card_choice};
pub use crate::model::{
    BossSelection, CardScore, CombatWindow, Distribution, Recommendation, Source,
};
pub use crate::predict::{Prediction, RemoteOutcome};

/// Build the full in-process router the way the service binary does
/// (advisor from config/env, real clock).
pub fn app() -> axum::Router {
    api::router(api::AppState::from_env())
}
