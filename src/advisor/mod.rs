//! Remote advisor: ask a third-party text-generation endpoint which card to flip.
//!
//! One request per prediction, no retry, no cancellation. Any failure is reported as
//! an [`AdvisorError`] and the caller falls back to the enhanced formula.

pub mod envelope;
pub mod http;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::config::AdvisorConfig;

pub use envelope::{parse_envelope, RemoteReply};
pub use http::HttpAdvisor;
pub use prompt::build_prompt;

/// Env switch for deterministic advisors: `mock` | `error` | `format-error`.
pub const ENV_TEST_MODE: &str = "ADVISOR_TEST_MODE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisorError {
    /// Non-2xx status; message is whatever the server said, if readable.
    #[error("remote call failed with status {status}{}", suffix(.message))]
    Call { status: u16, message: Option<String> },
    /// 2xx, but no known envelope shape carried any text.
    #[error("remote reply has no recognizable text")]
    Format,
    #[error("remote request failed: {0}")]
    Transport(String),
    #[error("remote advisor is disabled")]
    Disabled,
}

fn suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl AdvisorError {
    /// Short tag for headers and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            AdvisorError::Call { .. } => "error",
            AdvisorError::Format => "format",
            AdvisorError::Transport(_) => "transport",
            AdvisorError::Disabled => "off",
        }
    }
}

#[async_trait]
pub trait Advisor: Send + Sync {
    /// Send `prompt`, return the extracted reply text.
    async fn advise(&self, prompt: &str) -> Result<RemoteReply, AdvisorError>;

    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;

    /// `false` means: do not even try, use the local formula.
    fn is_enabled(&self) -> bool {
        true
    }
}

pub type DynAdvisor = Arc<dyn Advisor>;

/// Used when no key is configured.
pub struct DisabledAdvisor;

#[async_trait]
impl Advisor for DisabledAdvisor {
    async fn advise(&self, _prompt: &str) -> Result<RemoteReply, AdvisorError> {
        Err(AdvisorError::Disabled)
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
    fn is_enabled(&self) -> bool {
        false
    }
}

/// Fixed outcome, for tests and offline runs.
#[derive(Debug, Clone)]
pub struct StubAdvisor {
    outcome: Result<RemoteReply, AdvisorError>,
}

impl StubAdvisor {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            outcome: Ok(RemoteReply {
                text: text.into(),
                reasoning: None,
            }),
        }
    }

    pub fn replying_with_reasoning(text: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            outcome: Ok(RemoteReply {
                text: text.into(),
                reasoning: Some(reasoning.into()),
            }),
        }
    }

    pub fn failing(err: AdvisorError) -> Self {
        Self { outcome: Err(err) }
    }
}

#[async_trait]
impl Advisor for StubAdvisor {
    async fn advise(&self, _prompt: &str) -> Result<RemoteReply, AdvisorError> {
        self.outcome.clone()
    }
    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Factory: build an advisor according to config and environment.
///
/// * `ADVISOR_TEST_MODE=mock|error|format-error` returns a [`StubAdvisor`].
/// * A config without a usable key returns [`DisabledAdvisor`].
/// * Otherwise the real [`HttpAdvisor`].
pub fn build_advisor(config: &AdvisorConfig) -> DynAdvisor {
    if let Some(stub) = stub_from_env() {
        return Arc::new(stub);
    }
    if !config.is_usable() {
        if config.enabled {
            warn!("advisor enabled without an api key; remote path disabled");
        }
        return Arc::new(DisabledAdvisor);
    }
    match HttpAdvisor::new(config) {
        Ok(http) => Arc::new(http),
        Err(e) => {
            warn!(error = %e, "advisor client could not be built; remote path disabled");
            Arc::new(DisabledAdvisor)
        }
    }
}

/// Load `AdvisorConfig::load_default()` and build from it. Never fails.
pub fn build_advisor_default() -> DynAdvisor {
    let cfg = AdvisorConfig::load_default().unwrap_or_else(|e| {
        warn!(error = %e, "advisor config unusable; remote path disabled");
        AdvisorConfig::default()
    });
    build_advisor(&cfg)
}

fn stub_from_env() -> Option<StubAdvisor> {
    let mode = std::env::var(ENV_TEST_MODE).ok()?;
    match mode.trim().to_ascii_lowercase().as_str() {
        "mock" => Some(StubAdvisor::replying("综合来看，我推荐选择：4")),
        "error" => Some(StubAdvisor::failing(AdvisorError::Call {
            status: 503,
            message: Some("stubbed outage".into()),
        })),
        "format-error" => Some(StubAdvisor::failing(AdvisorError::Format)),
        _ => None,
    }
}
