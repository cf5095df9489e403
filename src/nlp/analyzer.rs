use log::debug;
use sha2::{ Digest, Sha256 };

use crate::config::lexicon::{ KeywordTable, Lexicon };
use crate::config::templates::FALLBACK_INTENT;
use crate::models::analysis::{ Classification, Entity, IntentLevel, Sentiment };
use super::language::{ detect_language, ENGLISH };

const PRIMARY_WEIGHT: f64 = 0.2;
const SECONDARY_WEIGHT: f64 = 0.15;
const ENTITY_CONFIDENCE_FLOOR: f64 = 0.7;
const ENTITY_CONFIDENCE_SPAN: f64 = 0.3;

/// Classifies `text` against the keyword tables.
///
/// Intent scores are `0.2` per matching pattern, times `1.5` when the
/// category is part of `active_context`. The highest score wins and ties
/// keep the category listed first. With no match at all the intent is
/// `general`. Never fails.
pub fn classify(text: &str, lexicon: &Lexicon, active_context: &[String]) -> Classification {
    let lowered = text.to_lowercase();

    let (intent, primary_score) = primary_intent(&lowered, &lexicon.intents, active_context);
    let entities = extract_entities(&lowered, &lexicon.entities);
    let sentiment = score_sentiment(
        lexicon.sentiment.positive_hits(&lowered),
        lexicon.sentiment.negative_hits(&lowered)
    );

    let mut intent_hierarchy = vec![IntentLevel {
        level: 1,
        intent: intent.clone(),
        confidence: primary_score,
    }];
    if let Some(secondary) = secondary_intent(&lowered, &lexicon.intents, &intent) {
        intent_hierarchy.push(secondary);
    }

    let language = detect_language(text);
    let confidence_score =
        0.7 + 0.1 * (entities.len() as f64) + primary_score * PRIMARY_WEIGHT;

    debug!(
        "Classified input: intent={} score={:.2} entities={} sentiment={} lang={}",
        intent,
        primary_score,
        entities.len(),
        sentiment,
        language
    );

    Classification {
        intent,
        entities,
        sentiment,
        confidence_score,
        intent_hierarchy,
        language: language.to_string(),
        cross_lingual: language != ENGLISH,
    }
}

fn primary_intent(
    lowered: &str,
    intents: &KeywordTable,
    active_context: &[String]
) -> (String, f64) {
    // Weighted in tenths so the 1.5x boost stays exact: 2 per hit, 3 if boosted.
    let mut best: Option<(&str, u32)> = None;
    for category in intents.categories() {
        let hits = category.matches(lowered).count() as u32;
        if hits == 0 {
            continue;
        }
        let boosted = active_context.iter().any(|c| c == &category.name);
        let weighted = hits * (if boosted { 3 } else { 2 });
        if best.map_or(true, |(_, top)| weighted > top) {
            best = Some((category.name.as_str(), weighted));
        }
    }

    match best {
        Some((name, weighted)) => (name.to_string(), (weighted as f64) / 10.0),
        None => (FALLBACK_INTENT.to_string(), 0.0),
    }
}

fn secondary_intent(lowered: &str, intents: &KeywordTable, primary: &str) -> Option<IntentLevel> {
    let mut best: Option<(&str, usize)> = None;
    for category in intents.categories() {
        if category.name == primary {
            continue;
        }
        let hits = category.matches(lowered).count();
        if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
            best = Some((category.name.as_str(), hits));
        }
    }
    best.map(|(name, hits)| IntentLevel {
        level: 2,
        intent: name.to_string(),
        confidence: (hits as f64) * SECONDARY_WEIGHT,
    })
}

fn extract_entities(lowered: &str, entities: &KeywordTable) -> Vec<Entity> {
    entities
        .categories()
        .iter()
        .flat_map(|category| {
            category.matches(lowered).map(move |pattern| Entity {
                kind: category.name.clone(),
                value: pattern.to_string(),
                confidence: entity_confidence(lowered, pattern),
            })
        })
        .collect()
}

/// Jitter in `[0.7, 1.0)` derived from a digest of the input and pattern, so
/// classifying the same text twice yields identical results.
fn entity_confidence(lowered: &str, pattern: &str) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(lowered.as_bytes());
    hasher.update([0u8]);
    hasher.update(pattern.as_bytes());
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let unit = ((u64::from_be_bytes(head) >> 11) as f64) / ((1u64 << 53) as f64);
    let confidence = ENTITY_CONFIDENCE_FLOOR + unit * ENTITY_CONFIDENCE_SPAN;
    if confidence >= 1.0 {
        1.0 - f64::EPSILON
    } else {
        confidence
    }
}

pub fn score_sentiment(positive: usize, negative: usize) -> Sentiment {
    if positive > 0 && negative > 0 {
        Sentiment::Mixed
    } else if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Classification {
        classify(text, &Lexicon::default(), &[])
    }

    #[test]
    fn greeting_words_classify_as_greeting() {
        for input in ["hello", "Hey", "hello hey greetings", "Good morning", "good afternoon hi"] {
            assert_eq!(run(input).intent, "greeting", "input: {}", input);
        }
    }

    #[test]
    fn no_keywords_defaults_to_general_neutral() {
        let result = run("qqq zzz 123");
        assert_eq!(result.intent, FALLBACK_INTENT);
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert!(result.entities.is_empty());
        assert_eq!(result.intent_hierarchy.len(), 1);
        assert!((result.confidence_score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn empty_input_still_classifies() {
        let result = run("");
        assert_eq!(result.intent, FALLBACK_INTENT);
        assert_eq!(result.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn positive_and_negative_words_are_mixed() {
        assert_eq!(run("great but confusing").sentiment, Sentiment::Mixed);
        assert_eq!(run("excellent and terrible").sentiment, Sentiment::Mixed);
    }

    #[test]
    fn one_sided_sentiment() {
        assert_eq!(run("this is excellent").sentiment, Sentiment::Positive);
        assert_eq!(run("so terrible and useless").sentiment, Sentiment::Negative);
    }

    #[test]
    fn highest_count_wins() {
        // two technical hits beat one business hit
        assert_eq!(run("neural engine pricing").intent, "technical");
    }

    #[test]
    fn ties_keep_first_listed_category() {
        // technical is listed before business
        assert_eq!(run("engine pricing").intent, "technical");
        assert_eq!(run("pricing engine").intent, "technical");
    }

    #[test]
    fn active_context_boost_breaks_ties() {
        let lexicon = Lexicon::default();
        let context = vec!["business".to_string()];
        let result = classify("engine pricing", &lexicon, &context);
        assert_eq!(result.intent, "business");
        assert!((result.intent_hierarchy[0].confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn boost_does_not_beat_larger_count() {
        let lexicon = Lexicon::default();
        let context = vec!["business".to_string()];
        // technical 3 hits (0.6) vs business 1 hit boosted (0.3)
        let result = classify("neural engine code pricing", &lexicon, &context);
        assert_eq!(result.intent, "technical");
    }

    #[test]
    fn entities_carry_type_value_and_bounded_confidence() {
        let result = run("Our healthcare ethics and transformers study");
        let pairs: Vec<(&str, &str)> = result.entities
            .iter()
            .map(|e| (e.kind.as_str(), e.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![
            ("industry", "healthcare"),
            ("technology", "transformers"),
            ("concept", "ethics"),
            ("research", "study")
        ]);
        for entity in &result.entities {
            assert!(entity.confidence >= 0.7 && entity.confidence < 1.0);
        }
    }

    #[test]
    fn classification_is_repeatable() {
        let text = "Tell me about neural networks in finance, it looks great";
        assert_eq!(run(text), run(text));
    }

    #[test]
    fn secondary_intent_is_reported() {
        let result = run("explain the neural engine model");
        assert_eq!(result.intent, "technical");
        assert_eq!(result.intent_hierarchy.len(), 2);
        assert_eq!(result.intent_hierarchy[1].intent, "inquiry");
        assert!((result.intent_hierarchy[1].confidence - 0.15).abs() < 1e-9);
    }

    #[test]
    fn flags_non_english_input() {
        let result = run("bonjour, ça va très bien");
        assert_eq!(result.language, "fr");
        assert!(result.cross_lingual);
        assert!(!run("hello").cross_lingual);
    }
}
