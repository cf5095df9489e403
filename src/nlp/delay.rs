use log::debug;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::persona::Persona;
use crate::config::templates::ResponseTemplates;
use crate::models::analysis::Classification;
use super::selector::{ compose, ComposeOptions };

const BASE_DELAY_MS: f64 = 1000.0;
const PER_CHAR_DELAY_MS: f64 = 10.0;

/// `(1000 + input_chars * 10) * latency_factor` milliseconds, rounded.
pub fn thinking_delay(input_chars: usize, latency_factor: f64) -> Duration {
    let millis = (BASE_DELAY_MS + (input_chars as f64) * PER_CHAR_DELAY_MS) * latency_factor;
    if !millis.is_finite() || millis <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_millis(millis.round() as u64)
}

/// Resolves to `response` once `delay` has elapsed. Dropping the future
/// abandons delivery.
pub async fn deliver(response: String, delay: Duration) -> String {
    debug!("Thinking for {} ms", delay.as_millis());
    sleep(delay).await;
    response
}

/// Composes a reply for `text` and hands it back after the persona's
/// thinking delay.
pub async fn respond<R: Rng + ?Sized>(
    text: &str,
    classification: &Classification,
    persona: &Persona,
    templates: &ResponseTemplates,
    options: &ComposeOptions<'_>,
    rng: &mut R
) -> String {
    let response = compose(classification, persona, templates, options, rng);
    let delay = thinking_delay(text.chars().count(), persona.latency_factor);
    deliver(response, delay).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lexicon::Lexicon;
    use crate::config::persona::default_personas;
    use crate::nlp::analyzer::classify;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::time::Instant;

    #[test]
    fn hello_with_assistant_latency_is_315ms() {
        assert_eq!(thinking_delay("hello".chars().count(), 0.3), Duration::from_millis(315));
    }

    #[test]
    fn delay_scales_with_length_and_factor() {
        assert_eq!(thinking_delay(0, 1.0), Duration::from_millis(1000));
        assert_eq!(thinking_delay(100, 0.5), Duration::from_millis(1000));
        assert_eq!(thinking_delay(10, 0.0), Duration::ZERO);
        assert_eq!(thinking_delay(10, f64::NAN), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn respond_waits_for_the_delay() {
        let lexicon = Lexicon::default();
        let personas = default_personas();
        let templates = ResponseTemplates::default();
        let classification = classify("hello", &lexicon, &[]);
        let mut rng = StdRng::seed_from_u64(42);

        let started = Instant::now();
        let response = respond(
            "hello",
            &classification,
            &personas[0],
            &templates,
            &ComposeOptions::default(),
            &mut rng
        ).await;

        assert!(!response.is_empty());
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(315) && elapsed < Duration::from_millis(316));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_delivery_never_resolves() {
        let pending = deliver("late".to_string(), Duration::from_secs(5));
        let outcome = tokio::time::timeout(Duration::from_secs(1), pending).await;
        assert!(outcome.is_err());
    }
}
