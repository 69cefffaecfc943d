// src/config/advisor.rs
//! Remote advisor settings, loaded from `config/advisor.toml` or `config/advisor.json`.
//!
//! ```toml
//! enabled = true
//! endpoint = "https://ark.cn-beijing.volces.com/api/v3/responses"
//! model = "doubao-seed-1.8"   # or an endpoint id such as "ep-2025..."
//! api_key = "ENV"             # read from ADVISOR_API_KEY
//! api_style = "responses"     # or "chat"
//! timeout_secs = 30           # optional, applied by the HTTP client only
//! ```

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

pub const ENV_CONFIG_PATH: &str = "ADVISOR_CONFIG_PATH";
pub const ENV_API_KEY: &str = "ADVISOR_API_KEY";

pub const DEFAULT_ENDPOINT: &str = "https://ark.cn-beijing.volces.com/api/v3/responses";
pub const DEFAULT_MODEL: &str = "doubao-seed-1.8";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Request body flavour expected by the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStyle {
    /// `{model, input:[{role, content:[{type:"input_text", text}]}]}`
    #[default]
    Responses,
    /// `{model, messages:[{role, content}]}`
    Chat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from ADVISOR_API_KEY
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_style: ApiStyle,
    /// No timeout when absent; the scoring core never imposes one.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
            api_style: ApiStyle::default(),
            timeout_secs: None,
        }
    }
}

impl AdvisorConfig {
    /// Load from an explicit path. `.toml` is parsed as TOML, anything else as JSON.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading advisor config from {}", path.display()))?;
        let is_toml = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let cfg: AdvisorConfig = if is_toml {
            toml::from_str(&data).context("parsing advisor TOML")?
        } else {
            serde_json::from_str(&data).context("parsing advisor JSON")?
        };
        cfg.resolved()
    }

    /// Env var + fallbacks:
    /// 1) $ADVISOR_CONFIG_PATH
    /// 2) config/advisor.toml
    /// 3) config/advisor.json
    /// 4) disabled default
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path");
            }
            return Self::load_from_file(&pb);
        }
        for candidate in ["config/advisor.toml", "config/advisor.json"] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
        }
        Ok(Self::default())
    }

    /// Same settings, explicit key (e.g. one typed into the form).
    pub fn with_api_key(&self, key: impl Into<String>) -> Self {
        Self {
            enabled: true,
            api_key: key.into(),
            ..self.clone()
        }
    }

    /// Enabled and holding a non-blank key.
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }

    fn resolved(mut self) -> Result<Self> {
        self.endpoint = self.endpoint.trim().to_string();
        if self.endpoint.is_empty() {
            self.endpoint = default_endpoint();
        }
        if self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key =
                env::var(ENV_API_KEY).map_err(|_| anyhow!("Missing {ENV_API_KEY} env var"))?;
        }
        if self.timeout_secs == Some(0) {
            self.timeout_secs = None;
        }
        Ok(self)
    }
}
