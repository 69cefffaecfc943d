//! Reply envelope parsing.
//!
//! Known shapes, probed in order; the first one yielding non-empty text wins:
//! 1. `output: [{type:"message", content:[{type:"output_text", text}]}, {type:"reasoning", summary:[..]}]`
//! 2. `output.choices[0].message.content`
//! 3. `choices[0].message.content`
//! 4. `output.text`
//! 5. `text`
//! 6. `output.choices[0].content`
//!
//! Anything else is [`AdvisorError::Format`].

use serde::Deserialize;
use serde_json::Value;

use super::AdvisorError;

/// Text extracted from a successful reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReply {
    pub text: String,
    /// Reasoning summary, only carried by the output-array shape.
    pub reasoning: Option<String>,
}

/// One recognized envelope layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Array of typed items (message / reasoning).
    OutputItems,
    /// A single string at a JSON pointer.
    TextAt(&'static str),
}

const SHAPES: [Shape; 6] = [
    Shape::OutputItems,
    Shape::TextAt("/output/choices/0/message/content"),
    Shape::TextAt("/choices/0/message/content"),
    Shape::TextAt("/output/text"),
    Shape::TextAt("/text"),
    Shape::TextAt("/output/choices/0/content"),
];

impl Shape {
    fn extract(self, body: &Value) -> Option<RemoteReply> {
        match self {
            Shape::OutputItems => output_items(body),
            Shape::TextAt(pointer) => body
                .pointer(pointer)
                .and_then(Value::as_str)
                .filter(|t| !t.trim().is_empty())
                .map(|t| RemoteReply {
                    text: t.to_string(),
                    reasoning: None,
                }),
        }
    }
}

pub fn parse_envelope(body: &Value) -> Result<RemoteReply, AdvisorError> {
    SHAPES
        .iter()
        .find_map(|shape| shape.extract(body))
        .ok_or(AdvisorError::Format)
}

/// Best-effort server message from a non-2xx body: `message`, `error` (string),
/// `error.message`; raw bodies are cut to 100 chars.
pub fn error_message(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(v) => v
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| v.get("error").and_then(Value::as_str))
            .or_else(|| v.pointer("/error/message").and_then(Value::as_str))
            .map(str::to_string),
        Err(_) => {
            let snippet: String = body.chars().take(100).collect();
            (!snippet.trim().is_empty()).then_some(snippet)
        }
    }
}

// ---- shape 1: typed output items ----

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<Value>,
    },
    Reasoning {
        #[serde(default)]
        summary: Vec<Value>,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TextPart {
    OutputText {
        #[serde(default)]
        text: String,
    },
    SummaryText {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Other,
}

fn output_items(body: &Value) -> Option<RemoteReply> {
    let items = body.get("output")?.as_array()?;
    let mut text = None;
    let mut reasoning = None;

    // Later parts overwrite earlier ones: the final message part is the answer.
    for item in items {
        match OutputItem::deserialize(item) {
            Ok(OutputItem::Message { content }) => {
                for part in &content {
                    if let Ok(TextPart::OutputText { text: t }) = TextPart::deserialize(part) {
                        if !t.trim().is_empty() {
                            text = Some(t);
                        }
                    }
                }
            }
            Ok(OutputItem::Reasoning { summary }) => {
                for part in &summary {
                    if let Ok(TextPart::SummaryText { text: t }) = TextPart::deserialize(part) {
                        if !t.trim().is_empty() {
                            reasoning = Some(t);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    text.map(|text| RemoteReply { text, reasoning })
}
