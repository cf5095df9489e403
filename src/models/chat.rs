use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };
use uuid::Uuid;

use super::analysis::{ Classification, Entity, Presentation, Sentiment };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation: Option<Presentation>,
}

impl ConversationEntry {
    pub fn user(content: &str) -> Self {
        Self::new(content, Sender::User)
    }

    pub fn bot(content: &str) -> Self {
        Self::new(content, Sender::Bot)
    }

    fn new(content: &str, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            sender,
            timestamp: Utc::now(),
            intent: None,
            entities: Vec::new(),
            sentiment: None,
            confidence_score: None,
            presentation: None,
        }
    }

    /// Copies the analyzer output onto this entry.
    pub fn with_classification(mut self, classification: &Classification) -> Self {
        self.apply_classification(classification);
        self
    }

    pub fn apply_classification(&mut self, classification: &Classification) {
        self.intent = Some(classification.intent.clone());
        self.entities = classification.entities.clone();
        self.sentiment = Some(classification.sentiment);
        self.confidence_score = Some(classification.confidence_score);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub entries: Vec<ConversationEntry>,
}
