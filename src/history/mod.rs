mod memory;

use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::sync::Arc;

use crate::models::analysis::{ Classification, Presentation };
use crate::models::chat::{ Conversation, ConversationEntry, Sender };

pub use memory::InMemoryHistoryStore;

/// Ordered conversation log. Entries are append-only; the only permitted
/// mutation is attaching analysis to an already appended entry.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: ConversationEntry) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Attaches classification and presentation data to entry `entry_id`.
    /// Returns `false` when no such entry exists.
    async fn enrich(
        &self,
        entry_id: &str,
        classification: &Classification,
        presentation: Presentation
    ) -> Result<bool, Box<dyn Error + Send + Sync>>;

    /// The last `limit` entries, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<ConversationEntry>, Box<dyn Error + Send + Sync>>;

    async fn conversation(&self) -> Result<Conversation, Box<dyn Error + Send + Sync>>;
}

pub fn initialize_history_store(conversation_id: &str) -> Arc<dyn HistoryStore> {
    info!("Conversation {} will be kept in memory for this session", conversation_id);
    Arc::new(InMemoryHistoryStore::new(conversation_id))
}

pub fn format_transcript(conversation: &Conversation) -> String {
    if conversation.entries.is_empty() {
        return String::new();
    }
    let mut result = String::new();
    for entry in &conversation.entries {
        let sender_display = match entry.sender {
            Sender::User => "You",
            Sender::Bot => "NeuraX",
        };
        let time = entry.timestamp.format("%H:%M:%S");
        match (&entry.intent, entry.sentiment) {
            (Some(intent), Some(sentiment)) if entry.sender == Sender::User => {
                result.push_str(
                    &format!(
                        "[{}] {}: {} ({}, {})\n",
                        time,
                        sender_display,
                        entry.content,
                        intent,
                        sentiment
                    )
                );
            }
            _ => result.push_str(&format!("[{}] {}: {}\n", time, sender_display, entry.content)),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lexicon::Lexicon;
    use crate::nlp::classify;

    #[test]
    fn transcript_annotates_classified_user_entries() {
        let classification = classify("hello there", &Lexicon::default(), &[]);
        let conversation = Conversation {
            id: "c1".to_string(),
            entries: vec![
                ConversationEntry::bot("Welcome"),
                ConversationEntry::user("hello there").with_classification(&classification)
            ],
        };
        let transcript = format_transcript(&conversation);
        let lines: Vec<&str> = transcript.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("NeuraX: Welcome"));
        assert!(lines[1].ends_with("You: hello there (greeting, neutral)"));
    }

    #[test]
    fn empty_transcript() {
        let conversation = Conversation { id: "c2".to_string(), entries: Vec::new() };
        assert!(format_transcript(&conversation).is_empty());
    }
}
