use rand::Rng;

use crate::models::analysis::{ Classification, NeuralPathway, Presentation };

const MIN_TOKEN_CHARS: usize = 4;
const PATHWAY_WINDOW: usize = 4;

/// Decorative activation data for the widget. Random by nature; nothing in
/// the responder depends on it.
pub fn build_presentation<R: Rng + ?Sized>(
    text: &str,
    classification: &Classification,
    recalled_memory: Vec<String>,
    personalization_vector: Vec<f64>,
    rng: &mut R
) -> Presentation {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .collect();

    let mut pathways = Vec::new();
    for i in 0..tokens.len() {
        for j in i + 1..(i + PATHWAY_WINDOW).min(tokens.len()) {
            pathways.push(NeuralPathway {
                source: tokens[i].to_string(),
                target: tokens[j].to_string(),
                strength: rng.random_range(0.5..1.0),
            });
        }
    }

    for entity in &classification.entities {
        let source = if tokens.is_empty() {
            "input".to_string()
        } else {
            tokens[rng.random_range(0..tokens.len())].to_string()
        };
        pathways.push(NeuralPathway {
            source,
            target: entity.value.clone(),
            strength: entity.confidence,
        });
    }

    Presentation {
        neural_activation: rng.random_range(0.3..0.8),
        pathways,
        personalization_vector,
        recalled_memory,
    }
}
