use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::validation::InputValidator;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the archive lives
    pub corpus: CorpusConfig,
    /// Whose messages count as "sent"
    pub owner: OwnerConfig,
    /// Stop words and word table sizes
    pub lexicon: LexiconConfig,
    /// Spring layout parameters for the contact graph
    pub layout: LayoutConfig,
    /// Log level, destination and format
    pub logging: LoggingConfig,
}

/// Archive location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding one subdirectory per conversation
    pub root: String,
    /// Base directory joined onto photo URIs
    pub media_root: Option<String>,
    /// Conversation document file name
    pub document_name: String,
}

/// Owner identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerConfig {
    /// Sender name of the archive owner
    pub name: String,
}

/// Lexical analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Extra words to ignore
    #[serde(default)]
    pub boring_words: Vec<String>,
    /// Include the English and Dutch stop word lists
    pub default_stop_words: bool,
    /// Rows kept per sender in word tables
    pub top_words: usize,
}

/// Spring layout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Maximum simulation steps
    pub iterations: usize,
    /// RNG seed for initial positions
    pub seed: u64,
    /// Stop early once the mean node movement drops below this
    pub threshold: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            seed: 42,
            threshold: 1e-4,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Optional rolling log file
    pub file_path: Option<String>,
    /// "json" or "text"
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig {
                root: "data/messages/inbox".to_string(),
                media_root: None,
                document_name: crate::loader::DEFAULT_DOCUMENT_NAME.to_string(),
            },
            owner: OwnerConfig {
                name: String::new(),
            },
            lexicon: LexiconConfig {
                boring_words: Vec::new(),
                default_stop_words: true,
                top_words: 10,
            },
            layout: LayoutConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Load configuration, layering `path` above the default config files
    pub fn load_with(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = Config::builder()
            // Start with default values
            .add_source(defaults)
            // Add config files if they exist
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            // CHAT_INSIGHTS__OWNER__NAME, CHAT_INSIGHTS__LEXICON__BORING_WORDS=a,b
            .add_source(
                Environment::with_prefix("CHAT_INSIGHTS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("lexicon.boring_words"),
            )
            .build()
            .context("Failed to load configuration")?;

        let app_config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        InputValidator::validate_owner_name(&self.owner.name)?;

        if self.corpus.root.trim().is_empty() {
            return Err(anyhow::anyhow!("corpus.root cannot be empty"));
        }
        if self.corpus.document_name.trim().is_empty() {
            return Err(anyhow::anyhow!("corpus.document_name cannot be empty"));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        if self.layout.iterations == 0 {
            return Err(anyhow::anyhow!("layout.iterations must be greater than 0"));
        }
        if self.layout.threshold.is_nan() || self.layout.threshold <= 0.0 {
            return Err(anyhow::anyhow!("layout.threshold must be greater than 0"));
        }

        Ok(())
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}
