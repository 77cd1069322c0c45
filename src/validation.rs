use anyhow::{anyhow, Result};
use std::path::Path;

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate the configured owner name
    pub fn validate_owner_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow!(
                "Owner name cannot be empty; set owner.name or pass --owner"
            ));
        }

        if name.chars().count() > 200 {
            return Err(anyhow!("Owner name too long (max 200 characters)"));
        }

        if name.chars().any(char::is_control) {
            return Err(anyhow!("Owner name contains invalid characters"));
        }

        Ok(())
    }

    /// Validate the archive root directory
    pub fn validate_corpus_root(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(anyhow!("Corpus root cannot be empty"));
        }

        if !path.exists() {
            return Err(anyhow!("Corpus root does not exist: {path:?}"));
        }

        if !path.is_dir() {
            return Err(anyhow!("Corpus root is not a directory: {path:?}"));
        }

        Ok(())
    }

    /// Validate a report output path
    pub fn validate_output_path(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.is_empty() {
            return Err(anyhow!("Output path cannot be empty"));
        }

        if path_str.len() > 4096 {
            return Err(anyhow!("Output path too long (max 4096 characters)"));
        }

        if path.is_dir() {
            return Err(anyhow!("Output path is a directory: {path:?}"));
        }

        Ok(())
    }

    /// Validate a selection of sender names for per-sender statistics
    pub fn validate_sender_selection(senders: &[String]) -> Result<()> {
        if let Some(blank) = senders.iter().position(|s| s.trim().is_empty()) {
            return Err(anyhow!("Sender #{} in selection is empty", blank + 1));
        }

        Ok(())
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control())
            .collect::<String>()
            .trim()
            .to_string()
    }
}
