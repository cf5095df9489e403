pub mod agent;
pub mod cli;
pub mod config;
pub mod context;
pub mod history;
pub mod models;
pub mod nlp;
pub mod repl;

use agent::{ ChatSession, SessionSettings };
use cli::Args;
use config::{ load_config, DEFAULT_CONFIG };
use log::info;
use repl::{ run_repl, ReplOptions };
use std::error::Error;
use std::sync::Arc;
use tokio::io::BufReader;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Dialogue Configuration ---");
    info!("Config Path: {}", args.config_path.as_deref().unwrap_or("(built-in tables)"));
    info!("Personality: {}", args.personality);
    info!("Initial Persona: {}", args.persona);
    info!("Multilingual: {}", args.multilingual);
    info!("Adaptive Learning: {}", args.adaptive_learning);
    info!("Latency Scale: {}", args.latency_scale);
    if let Some(seed) = args.seed {
        info!("RNG Seed: {}", seed);
    }
    info!("JSON Output: {}", args.json);
    info!("------------------------------");

    let config = match &args.config_path {
        Some(path) => load_config(path)?,
        None => Arc::clone(&DEFAULT_CONFIG),
    };
    let settings = SessionSettings::from_args(&args)?;
    let session = ChatSession::new(config, settings).await;

    let options = ReplOptions {
        json: args.json,
        config_path: args.config_path.clone(),
    };
    run_repl(&session, BufReader::new(tokio::io::stdin()), tokio::io::stdout(), &options).await
}
