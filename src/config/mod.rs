pub mod lexicon;
pub mod persona;
pub mod templates;

use log::info;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

use self::lexicon::Lexicon;
use self::persona::{ default_personas, Persona, DEFAULT_PERSONA };
use self::templates::{ ResponseTemplates, FALLBACK_INTENT };

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Dialogue config file IO error for '{path}': {source}")] Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Dialogue config JSON parsing error for '{path}': {source}")] Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid dialogue config: {0}")] Invalid(String),
}

/// Static tables the responder reads. Every section is optional in the file;
/// omitted sections keep the built-in defaults.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DialogueConfig {
    pub lexicon: Lexicon,
    pub templates: ResponseTemplates,
    pub personas: Vec<Persona>,
    #[serde(skip)]
    pub last_loaded: Option<SystemTime>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            lexicon: Lexicon::default(),
            templates: ResponseTemplates::default(),
            personas: default_personas(),
            last_loaded: None,
        }
    }
}

pub static DEFAULT_CONFIG: Lazy<Arc<DialogueConfig>> = Lazy::new(||
    Arc::new(DialogueConfig::default())
);

impl DialogueConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.templates.bucket(FALLBACK_INTENT).is_empty() {
            return Err(
                ConfigError::Invalid(
                    format!("templates must contain a non-empty '{}' bucket", FALLBACK_INTENT)
                )
            );
        }
        if self.persona(DEFAULT_PERSONA).is_none() {
            return Err(
                ConfigError::Invalid(format!("personas must include '{}'", DEFAULT_PERSONA))
            );
        }
        if let Some(p) = self.personas.iter().find(|p| !(p.latency_factor >= 0.0)) {
            return Err(
                ConfigError::Invalid(
                    format!("persona '{}' has invalid latency factor {}", p.id, p.latency_factor)
                )
            );
        }
        Ok(())
    }

    pub fn persona(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// The persona with `id`, or the general assistant.
    pub fn persona_or_default(&self, id: &str) -> &Persona {
        self.persona(id)
            .or_else(|| self.persona(DEFAULT_PERSONA))
            .unwrap_or_else(|| &self.personas[0])
    }
}

pub fn load_config_from_str(json: &str, origin: &str) -> Result<DialogueConfig, ConfigError> {
    let mut config: DialogueConfig = serde_json::from_str(json).map_err(|source| ConfigError::Json {
        path: origin.to_string(),
        source,
    })?;
    config.lexicon.normalize();
    config.validate()?;
    Ok(config)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Arc<DialogueConfig>, ConfigError> {
    let path_str = path.as_ref().display().to_string();
    let file_content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path_str.clone(),
        source,
    })?;
    let mut config = load_config_from_str(&file_content, &path_str)?;
    config.last_loaded = Some(SystemTime::now());
    info!(
        "Loaded dialogue config from {} ({} intents, {} entity types, {} personas)",
        path_str,
        config.lexicon.intents.categories().len(),
        config.lexicon.entities.categories().len(),
        config.personas.len()
    );
    Ok(Arc::new(config))
}

/// Returns a freshly loaded config when the file changed after
/// `current_config` was read, `None` otherwise.
pub fn reload_config_if_changed<P: AsRef<Path>>(
    path: P,
    current_config: &Arc<DialogueConfig>
) -> Result<Option<Arc<DialogueConfig>>, ConfigError> {
    let metadata = fs::metadata(&path).map_err(|source| ConfigError::Io {
        path: path.as_ref().display().to_string(),
        source,
    })?;

    if let Ok(modified) = metadata.modified() {
        match current_config.last_loaded {
            Some(last_loaded) if modified <= last_loaded => {
                return Ok(None);
            }
            Some(_) => info!("Dialogue config file changed, reloading..."),
            None => info!("No last_loaded timestamp, reloading dialogue config..."),
        }
        return load_config(path).map(Some);
    }
    Ok(None)
}
