use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt;
use std::str::FromStr;

use crate::config::persona::Persona;
use crate::config::templates::ResponseTemplates;
use crate::models::analysis::{ Classification, Sentiment };

const MEMORY_QUOTE_CHARS: usize = 30;
const ADAPTATION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Personality {
    #[default]
    Helpful,
    Conversational,
    Concise,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParsePersonalityError {
    message: String,
}

impl fmt::Display for ParsePersonalityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParsePersonalityError {}

impl FromStr for Personality {
    type Err = ParsePersonalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "helpful" => Ok(Personality::Helpful),
            "conversational" => Ok(Personality::Conversational),
            "concise" => Ok(Personality::Concise),
            _ =>
                Err(ParsePersonalityError {
                    message: format!("Invalid personality: '{}'", s),
                }),
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Personality::Helpful => "helpful",
            Personality::Conversational => "conversational",
            Personality::Concise => "concise",
        };
        write!(f, "{}", name)
    }
}

/// Session settings and recalled state that shape one response.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions<'a> {
    pub personality: Personality,
    pub multilingual: bool,
    pub adaptive_learning: bool,
    pub recalled_memory: Option<&'a str>,
    pub adaptation_level: f64,
}

/// Builds the reply text for a classified input. The result is decorative
/// and never empty.
pub fn compose<R: Rng + ?Sized>(
    classification: &Classification,
    persona: &Persona,
    templates: &ResponseTemplates,
    options: &ComposeOptions<'_>,
    rng: &mut R
) -> String {
    let mut response = templates
        .bucket(&classification.intent)
        .choose(rng)
        .unwrap_or(&templates.welcome)
        .clone();

    if let Some(entity) = classification.entities.first() {
        if let Some(suffix) = templates.entity_suffix(&entity.kind, &entity.value) {
            response.push_str(&suffix);
        }
    }

    if let Some(memory) = options.recalled_memory {
        let quoted: String = memory.chars().take(MEMORY_QUOTE_CHARS).collect();
        response.push_str(&templates.memory_recall.replace("{memory}", &quoted));
    }

    if options.personality == Personality::Conversational {
        let count = rng.random_range(1..=2);
        for _ in 0..count {
            if let Some(filler) = templates.fillers.choose(rng) {
                let position = rng.random_range(0..=response.chars().count());
                splice_at_char(&mut response, position, filler);
            }
        }
    }

    match classification.sentiment {
        Sentiment::Negative => response.push_str(&templates.negative_suffix),
        Sentiment::Mixed => response.push_str(&templates.mixed_suffix),
        Sentiment::Positive | Sentiment::Neutral => {}
    }

    if let Some(closing) = &persona.closing {
        response.push_str(closing);
    }

    if options.multilingual && classification.cross_lingual {
        response.push_str(&templates.cross_lingual);
    }

    if options.adaptive_learning && options.adaptation_level > ADAPTATION_THRESHOLD {
        response.push_str(&templates.adaptation);
    }

    if response.trim().is_empty() {
        response = templates.welcome.clone();
    }
    response
}

fn splice_at_char(target: &mut String, char_position: usize, insert: &str) {
    let byte_index = target
        .char_indices()
        .nth(char_position)
        .map(|(i, _)| i)
        .unwrap_or(target.len());
    target.insert_str(byte_index, insert);
}
