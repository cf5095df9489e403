use std::io::Write;
use std::sync::Arc;
use std::time::{ Duration, SystemTime };

use neurax_agent::agent::{ ChatSession, SessionSettings };
use neurax_agent::config::{ load_config, DEFAULT_CONFIG };
use neurax_agent::models::chat::Sender;
use neurax_agent::repl::{ run_repl, ReplOptions };

const MINIMAL_CONFIG: &str =
    r#"{
    "templates": {
        "welcome": "Welcome!",
        "buckets": [
            { "intent": "greeting", "responses": ["Hi!"] },
            { "intent": "general", "responses": ["Tell me more."] }
        ]
    },
    "personas": [
        { "id": "assistant", "name": "Plain", "role": "Assistant", "latency_factor": 0.0, "creativity_factor": 0.5 }
    ]
}"#;

fn seeded() -> SessionSettings {
    SessionSettings {
        seed: Some(42),
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn custom_tables_drive_replies() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MINIMAL_CONFIG.as_bytes()).unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).unwrap();
    let session = ChatSession::new(config, seeded()).await;

    let exchange = session.send("hello").await.unwrap();
    assert_eq!(exchange.reply.content, "Hi!");
    assert_eq!(exchange.delay, Duration::ZERO);

    let exchange = session.send("zzz").await.unwrap();
    assert_eq!(exchange.classification.intent, "general");
    assert!(exchange.reply.content.starts_with("Tell me more."));
}

#[tokio::test(start_paused = true)]
async fn changed_config_is_picked_up_by_the_repl() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MINIMAL_CONFIG.as_bytes()).unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).unwrap();
    let session = ChatSession::new(config, seeded()).await;

    let updated = MINIMAL_CONFIG.replace("\"Hi!\"", "\"Hello again!\"");
    std::fs::write(file.path(), updated).unwrap();
    file.as_file().set_modified(SystemTime::now() + Duration::from_secs(5)).unwrap();

    let options = ReplOptions {
        json: false,
        config_path: Some(file.path().display().to_string()),
    };
    let mut output = Vec::new();
    run_repl(&session, "hi\n".as_bytes(), &mut output, &options).await.unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.starts_with("Plain: Welcome!"));
    assert!(output.contains("Plain: Hello again!"), "{}", output);
}

#[tokio::test(start_paused = true)]
async fn conversation_grows_in_order_and_adapts() {
    let session = ChatSession::new(Arc::clone(&DEFAULT_CONFIG), seeded()).await;

    session.send("This is great and excellent work").await.unwrap();
    assert!((session.adaptation().await.personality_adaptation - 0.3).abs() < 1e-9);

    // updated once after "ok" lands and once after its reply, both times
    // from the first exchange's positive sentiment
    session.send("ok").await.unwrap();
    let adaptation = session.adaptation().await;
    assert!((adaptation.personality_adaptation - 0.34).abs() < 1e-9);

    let entries = session.conversation().await.unwrap().entries;
    let senders: Vec<Sender> = entries
        .iter()
        .map(|e| e.sender)
        .collect();
    assert_eq!(senders, vec![Sender::Bot, Sender::User, Sender::Bot, Sender::User, Sender::Bot]);
    assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert!(entries[1..].iter().all(|e| e.intent.is_some() && e.sentiment.is_some()));
}

#[tokio::test(start_paused = true)]
async fn adaptive_learning_can_be_disabled() {
    let session = ChatSession::new(Arc::clone(&DEFAULT_CONFIG), SessionSettings {
        adaptive_learning: false,
        ..seeded()
    }).await;
    session.send("This is great").await.unwrap();
    session.send("Really great").await.unwrap();
    assert!((session.adaptation().await.personality_adaptation - 0.3).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn philosophical_topics_slow_the_next_reply() {
    let session = ChatSession::new(Arc::clone(&DEFAULT_CONFIG), seeded()).await;
    session.send("What about ethics and consciousness?").await.unwrap();
    assert_eq!(session.active_persona().await.id, "philosophical");

    // (1000 + 2 * 10) * 0.6
    let next = session.send("hm").await.unwrap();
    assert_eq!(next.persona.name, "EthosAI");
    assert_eq!(next.delay, Duration::from_millis(612));
}
