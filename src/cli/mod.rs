use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Dialogue Tables ---
    /// JSON file overriding lexicon, templates and personas. Built-in tables are used when unset.
    #[arg(long, env = "NEURAX_CONFIG_PATH")]
    pub config_path: Option<String>,

    // --- Response Style ---
    /// Response personality (helpful, conversational, concise)
    #[arg(long, env = "NEURAX_PERSONALITY", default_value = "helpful")]
    pub personality: String,

    /// Append the cross-lingual note when the input is not English
    #[arg(long, env = "NEURAX_MULTILINGUAL", default_value = "false")]
    pub multilingual: bool,

    /// Learn from sentiment and mentioned entities across exchanges
    #[arg(
        long,
        env = "NEURAX_ADAPTIVE_LEARNING",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub adaptive_learning: bool,

    /// Persona answering the first message (id or display name)
    #[arg(long, env = "NEURAX_PERSONA", default_value = "assistant")]
    pub persona: String,

    // --- Timing ---
    /// Multiplier applied to every persona latency factor. 0 disables the thinking delay.
    #[arg(long, env = "NEURAX_LATENCY_SCALE", default_value = "1.0")]
    pub latency_scale: f64,

    /// Seed for template and filler selection, for reproducible sessions
    #[arg(long, env = "NEURAX_SEED")]
    pub seed: Option<u64>,

    // --- Output ---
    /// Print one JSON event per line instead of plain text
    #[arg(long, env = "NEURAX_JSON", default_value = "false")]
    pub json: bool,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
