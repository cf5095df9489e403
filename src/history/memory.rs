use async_trait::async_trait;
use log::warn;
use std::error::Error;
use tokio::sync::RwLock;

use crate::history::HistoryStore;
use crate::models::analysis::{ Classification, Presentation };
use crate::models::chat::{ Conversation, ConversationEntry };

pub struct InMemoryHistoryStore {
    conversation_id: String,
    entries: RwLock<Vec<ConversationEntry>>,
}

impl InMemoryHistoryStore {
    pub fn new(conversation_id: &str) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, entry: ConversationEntry) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn enrich(
        &self,
        entry_id: &str,
        classification: &Classification,
        presentation: Presentation
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().rev().find(|e| e.id == entry_id) {
            Some(entry) => {
                entry.apply_classification(classification);
                entry.presentation = Some(presentation);
                Ok(true)
            }
            None => {
                warn!("Cannot enrich unknown entry {} in {}", entry_id, self.conversation_id);
                Ok(false)
            }
        }
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ConversationEntry>, Box<dyn Error + Send + Sync>> {
        let entries = self.entries.read().await;
        let start = entries.len().saturating_sub(limit);
        Ok(entries[start..].to_vec())
    }

    async fn conversation(&self) -> Result<Conversation, Box<dyn Error + Send + Sync>> {
        Ok(Conversation {
            id: self.conversation_id.clone(),
            entries: self.entries.read().await.clone(),
        })
    }
}
