//! HTTP advisor: one POST with bearer auth, then envelope parsing.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::envelope::{error_message, parse_envelope, RemoteReply};
use super::{Advisor, AdvisorError};
use crate::config::{AdvisorConfig, ApiStyle};
use crate::telemetry::anon_hash;

pub struct HttpAdvisor {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    style: ApiStyle,
}

impl HttpAdvisor {
    pub fn new(config: &AdvisorConfig) -> Result<Self, AdvisorError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("card-oracle/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| AdvisorError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            style: config.api_style,
        })
    }

    fn body(&self, prompt: &str) -> Value {
        #[derive(Serialize)]
        struct InputText<'a> {
            #[serde(rename = "type")]
            kind: &'a str,
            text: &'a str,
        }
        #[derive(Serialize)]
        struct InputMsg<'a> {
            role: &'a str,
            content: Vec<InputText<'a>>,
        }
        #[derive(Serialize)]
        struct ResponsesReq<'a> {
            model: &'a str,
            input: Vec<InputMsg<'a>>,
        }
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct ChatReq<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
        }

        let body = match self.style {
            ApiStyle::Responses => serde_json::to_value(ResponsesReq {
                model: &self.model,
                input: vec![InputMsg {
                    role: "user",
                    content: vec![InputText {
                        kind: "input_text",
                        text: prompt,
                    }],
                }],
            }),
            ApiStyle::Chat => serde_json::to_value(ChatReq {
                model: &self.model,
                messages: vec![Msg {
                    role: "user",
                    content: prompt,
                }],
            }),
        };
        body.unwrap_or(Value::Null)
    }
}

#[async_trait]
impl Advisor for HttpAdvisor {
    async fn advise(&self, prompt: &str) -> Result<RemoteReply, AdvisorError> {
        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            prompt_id = %anon_hash(prompt),
            "sending advisor request"
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.body(prompt))
            .send()
            .await
            .map_err(|e| AdvisorError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| AdvisorError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(AdvisorError::Call {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let value: Value = serde_json::from_str(&text).map_err(|_| AdvisorError::Format)?;
        parse_envelope(&value)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn advisor(style: ApiStyle) -> HttpAdvisor {
        HttpAdvisor::new(&AdvisorConfig {
            enabled: true,
            api_key: "k".into(),
            model: "m-1".into(),
            api_style: style,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn responses_body_shape() {
        let body = advisor(ApiStyle::Responses).body("hi");
        assert_eq!(
            body,
            json!({
                "model": "m-1",
                "input": [{"role": "user", "content": [{"type": "input_text", "text": "hi"}]}]
            })
        );
    }

    #[test]
    fn chat_body_shape() {
        let body = advisor(ApiStyle::Chat).body("hi");
        assert_eq!(
            body,
            json!({"model": "m-1", "messages": [{"role": "user", "content": "hi"}]})
        );
    }
}
