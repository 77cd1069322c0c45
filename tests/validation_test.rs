//! Unit tests for validation.rs module

use std::path::Path;

use chat_insights::validation::InputValidator;
use tempfile::TempDir;

#[test]
fn test_validate_owner_name_valid() {
    assert!(InputValidator::validate_owner_name("Alice Example").is_ok());
}

#[test]
fn test_validate_owner_name_empty() {
    assert!(InputValidator::validate_owner_name("").is_err());
    assert!(InputValidator::validate_owner_name("   ").is_err());
}

#[test]
fn test_validate_owner_name_length() {
    assert!(InputValidator::validate_owner_name(&"a".repeat(200)).is_ok());
    assert!(InputValidator::validate_owner_name(&"a".repeat(201)).is_err());
}

#[test]
fn test_validate_owner_name_unicode() {
    assert!(InputValidator::validate_owner_name("José Müller").is_ok());
}

#[test]
fn test_validate_owner_name_control_chars() {
    assert!(InputValidator::validate_owner_name("Alice\0").is_err());
    assert!(InputValidator::validate_owner_name("Alice\nBob").is_err());
}

#[test]
fn test_validate_corpus_root() {
    let temp = TempDir::new().unwrap();
    assert!(InputValidator::validate_corpus_root(temp.path()).is_ok());
    assert!(InputValidator::validate_corpus_root(&temp.path().join("missing")).is_err());
    assert!(InputValidator::validate_corpus_root(Path::new("")).is_err());

    let file = temp.path().join("message_1.json");
    std::fs::write(&file, "{}").unwrap();
    assert!(InputValidator::validate_corpus_root(&file).is_err());
}

#[test]
fn test_validate_output_path() {
    let temp = TempDir::new().unwrap();
    assert!(InputValidator::validate_output_path(&temp.path().join("out.csv")).is_ok());
    assert!(InputValidator::validate_output_path(temp.path()).is_err());
    assert!(InputValidator::validate_output_path(Path::new("")).is_err());
}

#[test]
fn test_validate_sender_selection() {
    assert!(InputValidator::validate_sender_selection(&[]).is_ok());
    assert!(InputValidator::validate_sender_selection(&["Alice".to_string()]).is_ok());
    assert!(
        InputValidator::validate_sender_selection(&["Alice".to_string(), " ".to_string()])
            .is_err()
    );
}

#[test]
fn test_sanitize_text() {
    assert_eq!(InputValidator::sanitize_text("  Alice\u{7}  "), "Alice");
    assert_eq!(InputValidator::sanitize_text("José"), "José");
}
