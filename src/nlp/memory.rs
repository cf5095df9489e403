//! Per-session conversational state: a short rolling memory of recent
//! exchanges and the adaptation counters fed by user sentiment.

use serde::{ Deserialize, Serialize };
use std::collections::{ BTreeMap, HashSet, VecDeque };

use crate::config::lexicon::Lexicon;
use crate::models::analysis::Sentiment;

pub const SHORT_TERM_CAPACITY: usize = 10;
const RELEVANCE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct ContextualMemory {
    short_term: VecDeque<String>,
}

impl ContextualMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, item: &str) {
        self.short_term.push_back(item.to_string());
        while self.short_term.len() > SHORT_TERM_CAPACITY {
            self.short_term.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.short_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.short_term.is_empty()
    }

    /// Remembered items sharing enough words with `query`, most relevant first.
    /// Relevance is shared words over the longer word count.
    pub fn recall(&self, query: &str) -> Vec<String> {
        let query_lower = query.to_lowercase();
        let query_words: Vec<&str> = query_lower.split_whitespace().collect();
        if query_words.is_empty() || self.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &String)> = self.short_term
            .iter()
            .filter_map(|item| {
                let item_lower = item.to_lowercase();
                let item_words: HashSet<&str> = item_lower.split_whitespace().collect();
                let item_len = item_lower.split_whitespace().count();
                let common = query_words
                    .iter()
                    .filter(|w| item_words.contains(*w))
                    .count();
                let relevance = (common as f64) / (query_words.len().max(item_len) as f64);
                (relevance > RELEVANCE_THRESHOLD).then_some((relevance, item))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .map(|(_, item)| item.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationState {
    pub learning_rate: f64,
    pub personality_adaptation: f64,
    pub style_adaptation: f64,
    pub domain_knowledge: BTreeMap<String, f64>,
}

impl Default for AdaptationState {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            personality_adaptation: 0.3,
            style_adaptation: 0.4,
            domain_knowledge: BTreeMap::new(),
        }
    }
}

impl AdaptationState {
    /// Bumps domain weights for every entity pattern in `text` and nudges
    /// personality adaptation by the sentiment of the exchange.
    pub fn update_from_interaction(&mut self, text: &str, sentiment: Sentiment, lexicon: &Lexicon) {
        let lowered = text.to_lowercase();
        for category in lexicon.entities.categories() {
            let hits = category.matches(&lowered).count();
            if hits > 0 {
                *self.domain_knowledge.entry(category.name.clone()).or_insert(0.0) +=
                    0.1 * (hits as f64);
            }
        }

        match sentiment {
            Sentiment::Positive => {
                self.personality_adaptation += 0.02;
            }
            Sentiment::Negative => {
                self.personality_adaptation -= 0.01;
            }
            Sentiment::Neutral | Sentiment::Mixed => {}
        }
    }

    pub fn personalization_vector(&self) -> Vec<f64> {
        let domain_mean = if self.domain_knowledge.is_empty() {
            0.0
        } else {
            self.domain_knowledge.values().sum::<f64>() / (self.domain_knowledge.len() as f64)
        };
        vec![self.personality_adaptation, self.style_adaptation, domain_mean]
    }
}
