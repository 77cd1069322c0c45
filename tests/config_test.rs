//! Unit tests for config.rs module

use std::fs;

use chat_insights::config::{AppConfig, LayoutConfig};
use tempfile::TempDir;

fn valid() -> AppConfig {
    let mut config = AppConfig::default();
    config.owner.name = "Alice".to_string();
    config
}

#[test]
fn test_default_corpus_config() {
    let config = AppConfig::default();

    assert_eq!(config.corpus.root, "data/messages/inbox");
    assert_eq!(config.corpus.media_root, None);
    assert_eq!(config.corpus.document_name, "message_1.json");
}

#[test]
fn test_default_lexicon_and_layout() {
    let config = AppConfig::default();

    assert!(config.lexicon.boring_words.is_empty());
    assert!(config.lexicon.default_stop_words);
    assert_eq!(config.lexicon.top_words, 10);
    assert_eq!(config.layout.iterations, 50);
    assert_eq!(config.layout.seed, 42);
}

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_default_requires_owner() {
    assert!(AppConfig::default().validate().is_err());
    assert!(valid().validate().is_ok());
}

#[test]
fn test_invalid_log_level() {
    let mut config = valid();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_log_format() {
    let mut config = valid();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_empty_corpus_root() {
    let mut config = valid();
    config.corpus.root = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_layout_iterations() {
    let mut config = valid();
    config.layout = LayoutConfig {
        iterations: 0,
        ..LayoutConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_non_positive_layout_threshold() {
    let mut config = valid();
    config.layout.threshold = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_load_with_explicit_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("insights.toml");
    fs::write(
        &path,
        r#"
[owner]
name = "Alice"

[corpus]
root = "/archive/inbox"
media_root = "/archive"

[lexicon]
boring_words = ["lol", "haha"]
top_words = 5
"#,
    )
    .unwrap();

    let config = AppConfig::load_with(Some(&path)).unwrap();
    assert_eq!(config.owner.name, "Alice");
    assert_eq!(config.corpus.root, "/archive/inbox");
    assert_eq!(config.corpus.media_root.as_deref(), Some("/archive"));
    assert_eq!(config.corpus.document_name, "message_1.json");
    assert_eq!(config.lexicon.boring_words, vec!["lol", "haha"]);
    assert_eq!(config.lexicon.top_words, 5);
    assert!(config.lexicon.default_stop_words);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_with_missing_file_fails() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("absent.toml");
    assert!(AppConfig::load_with(Some(&missing)).is_err());
}

#[test]
fn test_config_serialization_roundtrip() {
    let config = valid();
    let json = serde_json::to_string(&config).unwrap();
    let back: AppConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.owner.name, "Alice");
    assert_eq!(back.layout.seed, config.layout.seed);
}
