use crate::cli::Args;
use crate::config::persona::{ find_persona, Persona, DEFAULT_PERSONA };
use crate::config::{ self, DialogueConfig };
use crate::context::{
    derive_active_context,
    combined_text,
    initial_suggestions,
    persona_for_context,
    suggestions_for_context,
    RECENT_WINDOW,
};
use crate::history::{ initialize_history_store, HistoryStore };
use crate::models::analysis::{ Classification, Suggestion };
use crate::models::chat::{ Conversation, ConversationEntry };
use crate::nlp::delay::{ deliver, thinking_delay };
use crate::nlp::memory::{ AdaptationState, ContextualMemory };
use crate::nlp::presentation::build_presentation;
use crate::nlp::selector::{ compose, ComposeOptions, ParsePersonalityError, Personality };
use crate::nlp::classify;

use log::{ debug, info, warn };
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

const WELCOME_CONFIDENCE: f64 = 0.98;
/// UI pause before a picked suggestion is submitted.
const SUGGESTION_SUBMIT_DELAY: Duration = Duration::from_millis(300);
/// Extra wait the widget adds before answering a picked suggestion.
const SUGGESTION_RESPONSE_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub personality: Personality,
    pub multilingual: bool,
    pub adaptive_learning: bool,
    /// Multiplies every persona latency factor; 0 answers immediately.
    pub latency_scale: f64,
    pub initial_persona: String,
    pub seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            personality: Personality::default(),
            multilingual: false,
            adaptive_learning: true,
            latency_scale: 1.0,
            initial_persona: DEFAULT_PERSONA.to_string(),
            seed: None,
        }
    }
}

impl SessionSettings {
    pub fn from_args(args: &Args) -> Result<Self, ParsePersonalityError> {
        Ok(Self {
            personality: args.personality.parse()?,
            multilingual: args.multilingual,
            adaptive_learning: args.adaptive_learning,
            latency_scale: args.latency_scale.max(0.0),
            initial_persona: args.persona.clone(),
            seed: args.seed,
        })
    }
}

/// `delay * scale`, saturating at `Duration::MAX`. Non-positive or NaN
/// scales give zero.
fn scaled(delay: Duration, scale: f64) -> Duration {
    if !(scale > 0.0) {
        return Duration::ZERO;
    }
    let nanos = ((delay.as_nanos() as f64) * scale).round();
    if nanos >= (u64::MAX as f64) {
        Duration::MAX
    } else {
        Duration::from_nanos(nanos as u64)
    }
}

/// One completed user/bot turn.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub user: ConversationEntry,
    pub reply: ConversationEntry,
    pub classification: Classification,
    pub persona: Persona,
    pub delay: Duration,
}

struct SessionState {
    config: Arc<DialogueConfig>,
    settings: SessionSettings,
    active_context: Vec<String>,
    active_persona: String,
    suggestions: Vec<Suggestion>,
    memory: ContextualMemory,
    adaptation: AdaptationState,
    rng: StdRng,
}

/// Clears the thinking flag when the pending send finishes or is dropped.
struct ThinkingGuard<'a>(&'a AtomicBool);

impl Drop for ThinkingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A single chat conversation. Exchanges are strictly sequential: a send
/// issued while another is pending is declined.
pub struct ChatSession {
    conversation_id: String,
    history: Arc<dyn HistoryStore>,
    state: Mutex<SessionState>,
    thinking: AtomicBool,
}

impl ChatSession {
    pub async fn new(config: Arc<DialogueConfig>, settings: SessionSettings) -> Self {
        let conversation_id = Uuid::new_v4().to_string();
        let history = initialize_history_store(&conversation_id);
        Self::with_history(conversation_id, config, settings, history).await
    }

    pub async fn with_history(
        conversation_id: String,
        config: Arc<DialogueConfig>,
        settings: SessionSettings,
        history: Arc<dyn HistoryStore>
    ) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let active_persona = match find_persona(&config.personas, &settings.initial_persona) {
            Some(persona) => persona.id.clone(),
            None => {
                warn!("Unknown persona '{}', starting with the default", settings.initial_persona);
                config.persona_or_default(DEFAULT_PERSONA).id.clone()
            }
        };

        let mut welcome = ConversationEntry::bot(&config.templates.welcome);
        welcome.confidence_score = Some(WELCOME_CONFIDENCE);
        if let Err(e) = history.append(welcome).await {
            warn!("History write (welcome) failed: {}", e);
        }

        info!(
            "Started conversation {} with persona '{}' ({} personality)",
            conversation_id,
            active_persona,
            settings.personality
        );

        Self {
            conversation_id,
            history,
            state: Mutex::new(SessionState {
                config,
                settings,
                active_context: Vec::new(),
                active_persona,
                suggestions: initial_suggestions(),
                memory: ContextualMemory::new(),
                adaptation: AdaptationState::default(),
                rng,
            }),
            thinking: AtomicBool::new(false),
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking.load(Ordering::Acquire)
    }

    /// The persona that would answer `text` right now and how long it
    /// would think about it.
    pub async fn preview(&self, text: &str) -> (Persona, Duration) {
        let state = self.state.lock().await;
        let persona = state.config.persona_or_default(&state.active_persona).clone();
        let delay = thinking_delay(
            text.chars().count(),
            persona.latency_factor * state.settings.latency_scale
        );
        (persona, delay)
    }

    /// Total wait before the reply to suggestion `index` arrives, including
    /// the submit pause and the extra answering delay.
    pub async fn preview_suggestion(&self, index: usize) -> Option<(Persona, Duration)> {
        let (text, scale) = {
            let state = self.state.lock().await;
            (state.suggestions.get(index)?.text.clone(), state.settings.latency_scale)
        };
        let (persona, thinking) = self.preview(&text).await;
        let total = thinking
            .saturating_add(scaled(SUGGESTION_SUBMIT_DELAY, scale))
            .saturating_add(scaled(SUGGESTION_RESPONSE_DELAY, scale));
        Some((persona, total))
    }

    /// Sends a user message and waits for the simulated reply.
    ///
    /// Returns `None` without touching the conversation when `text` is blank
    /// or another send is still pending.
    pub async fn send(&self, text: &str) -> Option<Exchange> {
        self.send_after(text, Duration::ZERO).await
    }

    /// Submits the suggestion at `index` (0-based) the way the widget does:
    /// a short pause before posting and a longer one before answering.
    pub async fn send_suggestion(&self, index: usize) -> Option<Exchange> {
        let (text, scale) = {
            let state = self.state.lock().await;
            let text = state.suggestions.get(index)?.text.clone();
            (text, state.settings.latency_scale)
        };
        tokio::time::sleep(scaled(SUGGESTION_SUBMIT_DELAY, scale)).await;
        self.send_after(&text, scaled(SUGGESTION_RESPONSE_DELAY, scale)).await
    }

    async fn send_after(&self, text: &str, extra_delay: Duration) -> Option<Exchange> {
        if text.trim().is_empty() {
            debug!("Ignoring empty message");
            return None;
        }
        if
            self.thinking
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            info!("Still thinking about the previous message; ignoring new input");
            return None;
        }
        let _guard = ThinkingGuard(&self.thinking);

        let user_entry = ConversationEntry::user(text);
        let user_id = user_entry.id.clone();
        if let Err(e) = self.history.append(user_entry.clone()).await {
            warn!("History write (user) failed: {}", e);
        }

        let (classification, presentation, persona, response, delay) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let config = Arc::clone(&state.config);

            let classification = classify(text, &config.lexicon, &state.active_context);
            let recalled = state.memory.recall(text);
            let presentation = build_presentation(
                text,
                &classification,
                recalled.clone(),
                state.adaptation.personalization_vector(),
                &mut state.rng
            );

            let persona = config.persona_or_default(&state.active_persona).clone();
            let options = ComposeOptions {
                personality: state.settings.personality,
                multilingual: state.settings.multilingual,
                adaptive_learning: state.settings.adaptive_learning,
                recalled_memory: recalled.first().map(|m| m.as_str()),
                adaptation_level: state.adaptation.personality_adaptation,
            };
            let response = compose(
                &classification,
                &persona,
                &config.templates,
                &options,
                &mut state.rng
            );
            let delay =
                thinking_delay(
                    text.chars().count(),
                    persona.latency_factor * state.settings.latency_scale
                ).saturating_add(extra_delay);
            (classification, presentation, persona, response, delay)
        };

        match self.history.enrich(&user_id, &classification, presentation.clone()).await {
            Ok(true) => {}
            Ok(false) => warn!("User entry {} vanished before enrichment", user_id),
            Err(e) => warn!("History enrich failed: {}", e),
        }
        let user_entry = {
            let mut entry = user_entry.with_classification(&classification);
            entry.presentation = Some(presentation.clone());
            entry
        };

        // The reply is already composed; topics and persona move on now.
        self.update_context().await;

        info!(
            "{} is thinking about a {} message ({} ms)",
            persona.name,
            classification.intent,
            delay.as_millis()
        );
        let response = deliver(response, delay).await;

        let mut reply = ConversationEntry::bot(&response).with_classification(&classification);
        reply.presentation = Some(presentation);
        if let Err(e) = self.history.append(reply.clone()).await {
            warn!("History write (bot) failed: {}", e);
        }

        self.update_context().await;

        Some(Exchange {
            user: user_entry,
            reply,
            classification,
            persona,
            delay,
        })
    }

    /// Re-derives topics, persona, suggestions, memory and adaptation from
    /// the last few entries. Runs whenever an entry lands: once for the
    /// enriched user message and once for the reply.
    async fn update_context(&self) {
        let recent = match self.history.recent(RECENT_WINDOW).await {
            Ok(recent) => recent,
            Err(e) => {
                warn!("History read failed, keeping previous context: {}", e);
                return;
            }
        };
        if recent.is_empty() {
            return;
        }

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let combined = combined_text(&recent);
        let context = derive_active_context(&recent);
        let persona_id = persona_for_context(&context);

        state.suggestions = suggestions_for_context(&context);
        if state.active_persona != persona_id {
            info!("Switching persona: {} -> {}", state.active_persona, persona_id);
        }
        state.active_persona = state.config.persona_or_default(persona_id).id.clone();
        debug!("Active context: {:?}", context);
        state.active_context = context;
        state.memory.remember(&combined);
        debug!("Short-term memory holds {} items", state.memory.len());

        if state.settings.adaptive_learning {
            if let Some(sentiment) = recent[0].sentiment {
                let config = Arc::clone(&state.config);
                state.adaptation.update_from_interaction(&combined, sentiment, &config.lexicon);
            }
        }
    }

    pub async fn active_persona(&self) -> Persona {
        let state = self.state.lock().await;
        state.config.persona_or_default(&state.active_persona).clone()
    }

    pub async fn active_context(&self) -> Vec<String> {
        self.state.lock().await.active_context.clone()
    }

    pub async fn suggestions(&self) -> Vec<Suggestion> {
        self.state.lock().await.suggestions.clone()
    }

    pub async fn adaptation(&self) -> AdaptationState {
        self.state.lock().await.adaptation.clone()
    }

    pub async fn personas(&self) -> Vec<Persona> {
        self.state.lock().await.config.personas.clone()
    }

    /// Switches persona by id or name. The next context update may switch
    /// it again.
    pub async fn select_persona(&self, query: &str) -> Option<Persona> {
        let mut state = self.state.lock().await;
        let persona = find_persona(&state.config.personas, query)?.clone();
        info!("Persona selected manually: {}", persona.id);
        state.active_persona = persona.id.clone();
        Some(persona)
    }

    pub async fn settings(&self) -> SessionSettings {
        self.state.lock().await.settings.clone()
    }

    pub async fn set_personality(&self, personality: Personality) {
        self.state.lock().await.settings.personality = personality;
    }

    pub async fn set_multilingual(&self, enabled: bool) {
        self.state.lock().await.settings.multilingual = enabled;
    }

    pub async fn set_adaptive_learning(&self, enabled: bool) {
        self.state.lock().await.settings.adaptive_learning = enabled;
    }

    pub async fn conversation(&self) -> Option<Conversation> {
        match self.history.conversation().await {
            Ok(conversation) => Some(conversation),
            Err(e) => {
                warn!("History read failed: {}", e);
                None
            }
        }
    }

    /// Swaps in the config file's tables when it changed on disk.
    pub async fn reload_config_if_changed<P: AsRef<Path>>(
        &self,
        path: P
    ) -> Result<bool, config::ConfigError> {
        let mut state = self.state.lock().await;
        match config::reload_config_if_changed(path, &state.config)? {
            Some(new_config) => {
                if new_config.persona(&state.active_persona).is_none() {
                    state.active_persona = new_config.persona_or_default(&state.active_persona).id.clone();
                }
                state.config = new_config;
                info!("Dialogue config successfully reloaded");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG;
    use crate::models::chat::Sender;

    fn settings() -> SessionSettings {
        SessionSettings {
            seed: Some(17),
            ..Default::default()
        }
    }

    async fn session() -> ChatSession {
        ChatSession::new(Arc::clone(&DEFAULT_CONFIG), settings()).await
    }

    #[tokio::test(start_paused = true)]
    async fn starts_with_welcome_entry() {
        let session = session().await;
        let conversation = session.conversation().await.unwrap();
        assert_eq!(conversation.entries.len(), 1);
        assert_eq!(conversation.entries[0].sender, Sender::Bot);
        assert_eq!(conversation.entries[0].confidence_score, Some(WELCOME_CONFIDENCE));
        assert_eq!(session.suggestions().await.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_is_declined() {
        let session = session().await;
        assert!(session.send("   ").await.is_none());
        assert_eq!(session.conversation().await.unwrap().entries.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exchange_appends_classified_entries() {
        let session = session().await;
        let exchange = session.send("hello").await.unwrap();

        assert_eq!(exchange.classification.intent, "greeting");
        assert_eq!(exchange.persona.id, "assistant");
        assert_eq!(exchange.delay, Duration::from_millis(315));
        assert!(!exchange.reply.content.is_empty());

        let entries = session.conversation().await.unwrap().entries;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].intent.as_deref(), Some("greeting"));
        assert!(entries[1].presentation.is_some());
        assert_eq!(entries[2].sender, Sender::Bot);
        assert_eq!(entries[2].content, exchange.reply.content);
        assert!(!session.is_thinking());
    }

    #[tokio::test(start_paused = true)]
    async fn context_switches_persona_for_next_exchange() {
        let session = session().await;
        session.send("tell me about the neural engine").await.unwrap();
        assert_eq!(session.active_persona().await.id, "technical");
        assert!(session.active_context().await.contains(&"technical".to_string()));
        assert_eq!(session.suggestions().await[0].category, "technical");

        let next = session.send("and the algorithm?").await.unwrap();
        assert_eq!(next.persona.id, "technical");
        // technical persona latency 0.2 over 18 chars
        assert_eq!(next.delay, Duration::from_millis(236));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_send_is_declined_while_thinking() {
        let session = Arc::new(session().await);
        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.send("hello").await })
        };
        tokio::task::yield_now().await;
        assert!(session.is_thinking());
        assert!(session.send("hey").await.is_none());

        assert!(first.await.unwrap().is_some());
        assert!(!session.is_thinking());
        assert_eq!(session.conversation().await.unwrap().entries.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_pending_send_resets_thinking() {
        let session = session().await;
        let outcome = tokio::time::timeout(Duration::from_millis(10), session.send("hello")).await;
        assert!(outcome.is_err());
        assert!(!session.is_thinking());
        assert!(session.send("hello again").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn suggestion_is_sent_with_widget_delays() {
        let session = session().await;
        let exchange = session.send_suggestion(3).await.unwrap();
        assert_eq!(exchange.user.content, "Tell me about your Neural Intelligence Engine");
        assert!(exchange.delay >= SUGGESTION_RESPONSE_DELAY);
        assert!(session.send_suggestion(99).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn initial_persona_by_name_and_preview() {
        let session = ChatSession::new(Arc::clone(&DEFAULT_CONFIG), SessionSettings {
            initial_persona: "TechMind".to_string(),
            latency_scale: 2.0,
            ..settings()
        }).await;
        let (persona, delay) = session.preview("hello").await;
        assert_eq!(persona.id, "technical");
        assert_eq!(delay, Duration::from_millis(420));

        let fallback = ChatSession::new(Arc::clone(&DEFAULT_CONFIG), SessionSettings {
            initial_persona: "zzz".to_string(),
            ..settings()
        }).await;
        assert_eq!(fallback.active_persona().await.id, DEFAULT_PERSONA);
    }

    #[tokio::test(start_paused = true)]
    async fn adaptation_updates_after_user_entry_and_reply() {
        let session = session().await;
        for _ in 0..4 {
            session.send("great").await.unwrap();
        }
        // first exchange only sees the unclassified welcome; each later one
        // adds two positive updates
        let adaptation = session.adaptation().await;
        assert!((adaptation.personality_adaptation - 0.42).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn topics_switch_before_the_reply_lands() {
        let session = Arc::new(session().await);
        let pending = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.send("explain the neural engine").await })
        };
        tokio::task::yield_now().await;
        assert!(session.is_thinking());
        assert_eq!(session.active_persona().await.id, "technical");

        let exchange = pending.await.unwrap().unwrap();
        assert_eq!(exchange.persona.id, "assistant");
    }

    #[test]
    fn scaled_delay_saturates_and_clamps() {
        let base = Duration::from_millis(2000);
        assert_eq!(scaled(base, 0.5), Duration::from_millis(1000));
        assert_eq!(scaled(base, 1e300), Duration::MAX);
        assert_eq!(scaled(base, f64::INFINITY), Duration::MAX);
        assert_eq!(scaled(base, f64::NAN), Duration::ZERO);
        assert_eq!(scaled(base, -1.0), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn suggestion_preview_includes_widget_pauses() {
        let session = session().await;
        let (persona, total) = session.preview_suggestion(0).await.unwrap();
        assert_eq!(persona.id, "assistant");
        // "Tell me about NeuraX AI": 369 ms thinking + 300 + 2000
        assert_eq!(total, Duration::from_millis(2669));
        assert!(session.preview_suggestion(10).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_persona_selection() {
        let session = session().await;
        assert_eq!(session.select_persona("EthosAI").await.unwrap().id, "philosophical");
        assert_eq!(session.active_persona().await.id, "philosophical");
        assert!(session.select_persona("nobody").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn same_text_same_classification() {
        let session = session().await;
        let a = session.send("great pricing but confusing").await.unwrap();
        let b = session.send("great pricing but confusing").await.unwrap();
        assert_eq!(a.classification.entities, b.classification.entities);
        assert_eq!(a.classification.sentiment, b.classification.sentiment);
    }
}
