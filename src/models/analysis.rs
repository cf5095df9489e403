use serde::{ Serialize, Deserialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentLevel {
    pub level: u8,
    pub intent: String,
    pub confidence: f64,
}

/// Output of the lexical analyzer for a single input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: String,
    pub entities: Vec<Entity>,
    pub sentiment: Sentiment,
    pub confidence_score: f64,
    pub intent_hierarchy: Vec<IntentLevel>,
    pub language: String,
    pub cross_lingual: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeuralPathway {
    pub source: String,
    pub target: String,
    pub strength: f64,
}

/// Display-only values attached to entries. Nothing reads these back.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub neural_activation: f64,
    pub pathways: Vec<NeuralPathway>,
    pub personalization_vector: Vec<f64>,
    pub recalled_memory: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub text: String,
    pub category: String,
    pub priority: f64,
    pub context_relevance: f64,
}

impl Suggestion {
    pub fn rank(&self) -> f64 {
        self.priority * self.context_relevance
    }
}
