//! Conversation-level heuristics run after each exchange: which topics are
//! active, which persona should answer next, and what to suggest.

use crate::config::persona::DEFAULT_PERSONA;
use crate::config::templates::FALLBACK_INTENT;
use crate::models::analysis::Suggestion;
use crate::models::chat::ConversationEntry;

pub const RECENT_WINDOW: usize = 3;
pub const MAX_SUGGESTIONS: usize = 5;

/// Topic label, the keywords that activate it, and the persona it maps to.
const CONTEXT_RULES: &[(&str, &[&str], &str)] = &[
    ("technical", &["neural", "engine", "algorithm"], "technical"),
    ("business", &["pricing", "implementation"], "research"),
    ("creative", &["design", "create"], "creative"),
    ("philosophical", &["ethics", "consciousness"], "philosophical"),
    ("educational", &["learn", "teach"], "multimodal"),
];

/// Persona precedence when several topics are active.
const PERSONA_PRECEDENCE: &[&str] = &[
    "technical",
    "creative",
    "business",
    "philosophical",
    "educational",
];

/// Topics present in the recent entries, either by detected intent or by
/// keyword in their combined text. Never empty: falls back to `general`.
pub fn derive_active_context(recent: &[ConversationEntry]) -> Vec<String> {
    let combined = combined_text(recent);
    let mut context: Vec<String> = CONTEXT_RULES.iter()
        .filter(|(topic, keywords, _)| {
            recent.iter().any(|e| e.intent.as_deref() == Some(*topic)) ||
                keywords.iter().any(|k| combined.contains(k))
        })
        .map(|(topic, _, _)| topic.to_string())
        .collect();
    if context.is_empty() {
        context.push(FALLBACK_INTENT.to_string());
    }
    context
}

pub fn combined_text(recent: &[ConversationEntry]) -> String {
    recent
        .iter()
        .map(|e| e.content.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn persona_for_context(context: &[String]) -> &'static str {
    PERSONA_PRECEDENCE.iter()
        .find(|topic| context.iter().any(|c| c == *topic))
        .and_then(|topic| CONTEXT_RULES.iter().find(|(t, _, _)| t == topic))
        .map(|(_, _, persona)| *persona)
        .unwrap_or(DEFAULT_PERSONA)
}

/// Follow-up questions per topic as (text, priority, context relevance).
const SUGGESTION_CATALOGUE: &[(&str, [(&str, f64, f64); 3])] = &[
    (
        "technical",
        [
            ("How does your Neural Intelligence Engine handle contextual understanding?", 0.9, 0.85),
            ("What transformer architectures do your models use?", 0.85, 0.8),
            ("How does your system handle multimodal inputs?", 0.8, 0.75),
        ],
    ),
    (
        "business",
        [
            ("What industries benefit most from your neural intelligence solutions?", 0.9, 0.8),
            ("How do you implement personalized AI for enterprise clients?", 0.85, 0.75),
            ("What measurable ROI do clients typically see?", 0.8, 0.7),
        ],
    ),
    (
        "creative",
        [
            ("How does your AI enhance creative decision-making processes?", 0.9, 0.85),
            ("Can your AI generate novel concepts based on partial descriptions?", 0.85, 0.8),
            ("How do you balance creativity and practicality in AI-generated solutions?", 0.8, 0.75),
        ],
    ),
    (
        "philosophical",
        [
            ("How do you approach ethical considerations in AI development?", 0.9, 0.85),
            ("What frameworks do you use for value alignment in AI?", 0.85, 0.8),
            ("Do you think AI systems can develop consciousness?", 0.8, 0.75),
        ],
    ),
    (
        "educational",
        [
            ("How can your AI be used in educational contexts?", 0.9, 0.85),
            ("What learning models does your AI use to adapt to users?", 0.85, 0.8),
            ("How does your AI personalize learning experiences?", 0.8, 0.75),
        ],
    ),
    (
        FALLBACK_INTENT,
        [
            ("What makes NeuraX AI different from other AI solutions?", 0.9, 0.85),
            ("How can I get started with your neural intelligence services?", 0.85, 0.8),
            ("What recent breakthroughs have you made in AI technology?", 0.8, 0.75),
        ],
    ),
];

pub fn initial_suggestions() -> Vec<Suggestion> {
    [
        ("Tell me about NeuraX AI", "company", 0.9, 0.8),
        ("What services do you offer?", "services", 0.85, 0.7),
        ("How can AI help my business?", "business", 0.8, 0.6),
        ("Tell me about your Neural Intelligence Engine", "technical", 0.75, 0.5),
    ]
        .iter()
        .enumerate()
        .map(|(i, (text, category, priority, relevance))| Suggestion {
            id: (i + 1).to_string(),
            text: text.to_string(),
            category: category.to_string(),
            priority: *priority,
            context_relevance: *relevance,
        })
        .collect()
}

/// Three follow-ups per active topic, best `MAX_SUGGESTIONS` by
/// priority times relevance. Equal ranks keep catalogue order.
pub fn suggestions_for_context(context: &[String]) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = SUGGESTION_CATALOGUE.iter()
        .filter(|(topic, _)| context.iter().any(|c| c == topic))
        .flat_map(|(topic, rows)| {
            rows
                .iter()
                .enumerate()
                .map(move |(i, (text, priority, relevance))| Suggestion {
                    id: format!("{}-{}", topic, i + 1),
                    text: text.to_string(),
                    category: topic.to_string(),
                    priority: *priority,
                    context_relevance: *relevance,
                })
        })
        .collect();

    suggestions.sort_by(|a, b| b.rank().partial_cmp(&a.rank()).unwrap_or(std::cmp::Ordering::Equal));
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}
