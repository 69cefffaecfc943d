use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::advisor::{build_advisor, DynAdvisor, HttpAdvisor};
use crate::config::AdvisorConfig;
use crate::fortune::Strategy;
use crate::metrics::Metrics;
use crate::model::{CardScore, CombatWindow, PositionFactors, Source, FORM_TIME_FORMAT};
use crate::predict::{predict_local, predict_with_advisor, Prediction};
use crate::validate::validate_request;

pub const HEADER_REMOTE_USED: &str = "x-remote-used";
pub const HEADER_REMOTE_REASON: &str = "x-remote-reason";

/// Local wall-clock time; the production clock.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[derive(Clone)]
pub struct AppState {
    advisor: DynAdvisor,
    advisor_config: Arc<AdvisorConfig>,
    clock: fn() -> NaiveDateTime,
}

impl AppState {
    pub fn new(advisor: DynAdvisor, advisor_config: AdvisorConfig) -> Self {
        Self {
            advisor,
            advisor_config: Arc::new(advisor_config),
            clock: local_now,
        }
    }

    /// Config from `AdvisorConfig::load_default()`, real clock.
    pub fn from_env() -> Self {
        let cfg = AdvisorConfig::load_default().unwrap_or_else(|e| {
            warn!(error = %e, "advisor config unusable; remote path disabled");
            AdvisorConfig::default()
        });
        let advisor = build_advisor(&cfg);
        info!(
            advisor = advisor.name(),
            enabled = advisor.is_enabled(),
            key_len = cfg.api_key.len(),
            "advisor ready"
        );
        Self::new(advisor, cfg)
    }

    /// Replace the clock (tests pin it to a fixed instant).
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/defaults", get(defaults))
        .route("/predict", post(predict))
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if debug_routes_enabled() {
        if let Some(m) = Metrics::global() {
            app = app.merge(m.router());
        }
    }
    app
}

fn debug_routes_enabled() -> bool {
    std::env::var("DEBUG_ROUTES").ok().as_deref() == Some("1")
}

#[derive(Serialize)]
struct DefaultsResp {
    start: String,
    end: String,
}

async fn defaults(State(state): State<AppState>) -> Json<DefaultsResp> {
    let w = CombatWindow::default_ending_at((state.clock)());
    Json(DefaultsResp {
        start: w.start.format(FORM_TIME_FORMAT).to_string(),
        end: w.end.format(FORM_TIME_FORMAT).to_string(),
    })
}

fn default_remote() -> bool {
    true
}

#[derive(Deserialize)]
struct PredictReq {
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    bosses: Vec<String>,
    #[serde(default)]
    strategy: Strategy,
    /// Consult the remote advisor when one is available.
    #[serde(default = "default_remote")]
    remote: bool,
    /// Per-request key; overrides the configured one.
    #[serde(default)]
    api_key: Option<String>,
}

#[derive(Serialize)]
struct PredictResp {
    chosen_position: u8,
    source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    probabilities: Option<Vec<CardScore>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    factors: Vec<PositionFactors>,
    rationale: String,
    rationale_html: String,
    remote_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_error: Option<String>,
}

#[derive(Serialize)]
struct ErrorResp {
    error: String,
}

async fn predict(State(state): State<AppState>, Json(body): Json<PredictReq>) -> Response {
    let (window, bosses) =
        match validate_request(body.start.as_deref(), body.end.as_deref(), &body.bosses) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "rejecting predict request");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResp {
                        error: e.to_string(),
                    }),
                )
                    .into_response();
            }
        };

    let clock = (state.clock)();
    let prediction = match select_advisor(&state, body.remote, body.api_key.as_deref()) {
        Some(advisor) => predict_with_advisor(advisor.as_ref(), &window, &bosses, clock).await,
        None => predict_local(body.strategy, &window, &bosses, clock),
    };

    let headers = [
        (HEADER_REMOTE_USED, prediction.remote.used().to_string()),
        (HEADER_REMOTE_REASON, prediction.remote.reason().to_string()),
    ];
    (headers, Json(view(prediction))).into_response()
}

/// Advisor for this request, or `None` for the local path. No client is built
/// when `remote` is off.
fn select_advisor(state: &AppState, remote: bool, api_key: Option<&str>) -> Option<DynAdvisor> {
    if !remote {
        return None;
    }
    Some(request_advisor(state, api_key)).filter(|a| a.is_enabled())
}

fn request_advisor(state: &AppState, api_key: Option<&str>) -> DynAdvisor {
    match api_key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => match HttpAdvisor::new(&state.advisor_config.with_api_key(key)) {
            Ok(http) => Arc::new(http),
            Err(e) => {
                warn!(error = %e, "per-request advisor could not be built; using configured one");
                state.advisor.clone()
            }
        },
        None => state.advisor.clone(),
    }
}

fn view(p: Prediction) -> PredictResp {
    let rec = p.recommendation;
    let show = rec.displays_probabilities();
    let rationale_html = rec.rationale_html();
    PredictResp {
        chosen_position: rec.chosen_position,
        source: rec.source,
        probability: show.then_some(rec.probability),
        probabilities: show.then(|| rec.distribution.scores().to_vec()),
        factors: if show { rec.factors } else { Vec::new() },
        rationale: rec.rationale,
        rationale_html,
        remote_used: p.remote.used(),
        remote_error: p.remote.error_message().map(str::to_string),
    }
}
