// tests/envelope_shapes.rs
//
// Envelope probing order and fail-closed behaviour of the public parser.

use card_oracle::advisor::envelope::error_message;
use card_oracle::advisor::{parse_envelope, AdvisorError};
use serde_json::json;

#[test]
fn output_array_beats_choices() {
    let body = json!({
        "output": [{"type": "message", "content": [{"type": "output_text", "text": "第1张牌"}]}],
        "choices": [{"message": {"content": "第5张牌"}}]
    });
    assert_eq!(parse_envelope(&body).unwrap().text, "第1张牌");
}

#[test]
fn last_output_text_and_summary_win() {
    let body = json!({
        "output": [
            {"type": "reasoning", "summary": [
                {"type": "summary_text", "text": "first thought"},
                {"type": "summary_text", "text": "final thought"}
            ]},
            {"type": "message", "content": [
                {"type": "output_text", "text": "draft"},
                {"type": "refusal", "refusal": "n/a"},
                {"type": "output_text", "text": "位置：4"}
            ]}
        ]
    });
    let r = parse_envelope(&body).unwrap();
    assert_eq!(r.text, "位置：4");
    assert_eq!(r.reasoning.as_deref(), Some("final thought"));
}

#[test]
fn reasoning_alone_is_not_an_answer() {
    let body = json!({
        "output": [{"type": "reasoning", "summary": [{"type": "summary_text", "text": "hmm"}]}]
    });
    assert_eq!(parse_envelope(&body), Err(AdvisorError::Format));
}

#[test]
fn empty_output_array_falls_through_to_later_shapes() {
    let body = json!({"output": [], "text": "选3号"});
    assert_eq!(parse_envelope(&body).unwrap().text, "选3号");
}

#[test]
fn non_string_content_is_a_format_error() {
    let body = json!({"choices": [{"message": {"content": [{"type": "text", "text": "4"}]}}]});
    assert_eq!(parse_envelope(&body), Err(AdvisorError::Format));
}

#[test]
fn server_messages_are_best_effort() {
    assert_eq!(
        error_message(r#"{"message":"rate limited","error":"ignored"}"#).as_deref(),
        Some("rate limited")
    );
    assert_eq!(
        error_message("<html>502 Bad Gateway</html>").as_deref(),
        Some("<html>502 Bad Gateway</html>")
    );
}
