//! Conversation events delivered on the event streams.
//!
//! Each streamed line is an SSE `data:` line whose payload holds one or more
//! JSON envelopes (`{"eventId": ..., "data": {...}}`), occasionally
//! concatenated without a separator. Parsing is best effort: whatever parses
//! is returned, the first malformed envelope ends the line.

use serde::Deserialize;
use serde_json::Value;

/// Payload the server sends once an event stream is exhausted.
const DONE_MARKERS: [&str; 2] = ["done", "[DONE]"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    #[serde(rename_all = "camelCase")]
    UserMessageNew {
        #[serde(default)]
        message_id: String,
    },
    #[serde(rename_all = "camelCase")]
    AgentMessageNew {
        #[serde(default)]
        configuration_id: String,
        #[serde(default)]
        message_id: String,
    },
    #[serde(rename_all = "camelCase")]
    GenerationTokens {
        #[serde(default)]
        message_id: String,
        text: String,
        /// `tokens`, `chain_of_thought`, or a delimiter marker.
        #[serde(default)]
        classification: String,
    },
    #[serde(rename_all = "camelCase")]
    AgentActionSuccess {
        #[serde(default)]
        message_id: String,
        #[serde(default)]
        action: Value,
    },
    #[serde(rename_all = "camelCase")]
    AgentMessageSuccess {
        #[serde(default)]
        message_id: String,
        #[serde(default)]
        message: Value,
    },
    #[serde(rename_all = "camelCase")]
    AgentError {
        #[serde(default)]
        message_id: String,
        error: EventError,
    },
    UserMessageError {
        error: EventError,
    },
    #[serde(rename_all = "camelCase")]
    AgentGenerationCancelled {
        #[serde(default)]
        message_id: String,
    },
    ConversationTitle {
        #[serde(default)]
        title: String,
    },
    #[serde(other)]
    Unknown,
}

impl ConversationEvent {
    /// Whether this event ends the agent message it belongs to.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConversationEvent::AgentMessageSuccess { .. }
                | ConversationEvent::AgentError { .. }
                | ConversationEvent::AgentGenerationCancelled { .. }
                | ConversationEvent::UserMessageError { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "eventId", default)]
    pub event_id: Option<String>,
    pub data: ConversationEvent,
}

/// Everything that could be read from one streamed line.
#[derive(Debug, Default)]
pub struct ParsedLine {
    pub envelopes: Vec<EventEnvelope>,
    /// Set when part of the line could not be decoded.
    pub error: Option<serde_json::Error>,
    /// The line was the end-of-stream marker.
    pub done: bool,
}

fn extract_data_payload(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix("data:").map(str::trim_start).unwrap_or(line)
}

fn envelope_from_value(value: Value) -> Result<EventEnvelope, serde_json::Error> {
    // Some endpoints send bare events without the envelope.
    if value.get("data").is_none() && value.get("type").is_some() {
        let data = serde_json::from_value(value)?;
        return Ok(EventEnvelope {
            event_id: None,
            data,
        });
    }
    serde_json::from_value(value)
}

pub fn parse_event_line(line: &str) -> ParsedLine {
    let payload = extract_data_payload(line);
    let mut parsed = ParsedLine::default();

    if DONE_MARKERS.contains(&payload) {
        parsed.done = true;
        return parsed;
    }

    let values = serde_json::Deserializer::from_str(payload).into_iter::<Value>();
    for value in values {
        match value.and_then(envelope_from_value) {
            Ok(envelope) => parsed.envelopes.push(envelope),
            Err(err) => {
                parsed.error = Some(err);
                break;
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_enveloped_event() {
        let line = r#"data: {"eventId":"1-0","data":{"type":"generation_tokens","created":1,"configurationId":"dust","messageId":"m1","text":"Hello","classification":"tokens"}}"#;
        let parsed = parse_event_line(line);

        assert!(parsed.error.is_none());
        assert_eq!(parsed.envelopes.len(), 1);
        assert_eq!(parsed.envelopes[0].event_id.as_deref(), Some("1-0"));
        assert_eq!(
            parsed.envelopes[0].data,
            ConversationEvent::GenerationTokens {
                message_id: "m1".into(),
                text: "Hello".into(),
                classification: "tokens".into(),
            }
        );
    }

    #[test]
    fn parses_concatenated_envelopes() {
        let line = concat!(
            r#"data: {"eventId":"1","data":{"type":"generation_tokens","messageId":"m","text":"a","classification":"tokens"}}"#,
            r#"{"eventId":"2","data":{"type":"generation_tokens","messageId":"m","text":"b","classification":"tokens"}}"#
        );
        let parsed = parse_event_line(line);

        assert!(parsed.error.is_none());
        let ids: Vec<_> = parsed
            .envelopes
            .iter()
            .map(|e| e.event_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn accepts_lines_without_data_prefix_and_bare_events() {
        let parsed = parse_event_line(r#"{"type":"conversation_title","created":1,"title":"Hi"}"#);
        assert_eq!(
            parsed.envelopes[0].data,
            ConversationEvent::ConversationTitle { title: "Hi".into() }
        );
        assert!(parsed.envelopes[0].event_id.is_none());
    }

    #[test]
    fn unknown_event_types_are_kept() {
        let parsed =
            parse_event_line(r#"data: {"eventId":"9","data":{"type":"retrieval_params","x":1}}"#);
        assert_eq!(parsed.envelopes[0].data, ConversationEvent::Unknown);
    }

    #[test]
    fn malformed_tail_keeps_parsed_prefix() {
        let line = r#"data: {"eventId":"1","data":{"type":"agent_generation_cancelled","messageId":"m"}}{"eventId":"#;
        let parsed = parse_event_line(line);

        assert_eq!(parsed.envelopes.len(), 1);
        assert!(parsed.envelopes[0].data.is_terminal());
        assert!(parsed.error.is_some());
    }

    #[test]
    fn done_marker_is_recognized() {
        assert!(parse_event_line("data: done").done);
        assert!(parse_event_line("data: [DONE]").done);
        assert!(!parse_event_line("data: {}").done);
    }

    #[test]
    fn agent_error_carries_code_and_message() {
        let parsed = parse_event_line(
            r#"data: {"eventId":"3","data":{"type":"agent_error","messageId":"m","error":{"code":"quota","message":"Out of credits"}}}"#,
        );
        match &parsed.envelopes[0].data {
            ConversationEvent::AgentError { error, .. } => {
                assert_eq!(error.code, "quota");
                assert_eq!(error.message, "Out of credits");
            }
            other => panic!("expected agent error, got {other:?}"),
        }
    }
}
