use serde::{ Serialize, Deserialize };

use super::analysis::Suggestion;
use super::chat::Conversation;
use crate::config::persona::Persona;

/// Events printed by the REPL in `--json` mode, one object per line.
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ReplEvent {
    #[serde(rename = "notice")] Notice {
        message: String,
    },
    #[serde(rename = "thinking")] Thinking {
        persona: String,
        delay_ms: u64,
    },
    #[serde(rename = "response")] Response {
        content: String,
        persona: String,
        intent: String,
        sentiment: String,
        timestamp: i64,
    },
    #[serde(rename = "suggestions")] Suggestions {
        items: Vec<Suggestion>,
    },
    #[serde(rename = "personas")] Personas {
        active: String,
        items: Vec<Persona>,
    },
    #[serde(rename = "transcript")] Transcript {
        conversation: Conversation,
    },
    #[serde(rename = "error")] Error {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = ReplEvent::Thinking { persona: "TechMind".to_string(), delay_ms: 236 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "thinking");
        assert_eq!(json["delay_ms"], 236);

        let parsed: ReplEvent = serde_json
            ::from_str(r#"{"type":"error","message":"nope"}"#)
            .unwrap();
        assert!(matches!(parsed, ReplEvent::Error { message } if message == "nope"));
    }
}
