//! Corpus loading from an exported chat archive.
//!
//! The archive root holds one subdirectory per conversation; each holds a
//! single JSON document with a `title`, a `participants` list and a
//! `messages` list. Loading is all-or-nothing: the first unreadable
//! conversation aborts the whole load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::corpus::Corpus;
use crate::error::{InsightsError, Result};
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{Attachment, Message};
use crate::utils::{millis_to_naive, repair_mojibake};

/// File name of the conversation document inside each chat directory.
pub const DEFAULT_DOCUMENT_NAME: &str = "message_1.json";

#[derive(Debug, Clone, Deserialize)]
struct RawParticipant {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPhoto {
    uri: String,
    creation_timestamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMessage {
    sender_name: String,
    timestamp_ms: i64,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    photos: Option<Vec<RawPhoto>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawConversation {
    title: String,
    #[serde(default)]
    participants: Vec<RawParticipant>,
    #[serde(default)]
    messages: Vec<RawMessage>,
}

/// A scoped load session over one archive root.
///
/// Parsed documents are memoized by path for the lifetime of the session,
/// so asking for a conversation's participants after [`CorpusLoader::load`]
/// does not re-read the file. Drop the session to release them.
#[derive(Debug)]
pub struct CorpusLoader {
    root: PathBuf,
    media_root: Option<PathBuf>,
    document_name: String,
    documents: HashMap<PathBuf, RawConversation>,
}

impl CorpusLoader {
    /// Create a session over the archive at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            media_root: None,
            document_name: DEFAULT_DOCUMENT_NAME.to_owned(),
            documents: HashMap::new(),
        }
    }

    /// Base directory joined onto every photo `uri`
    #[must_use]
    pub fn with_media_root(mut self, media_root: impl Into<PathBuf>) -> Self {
        self.media_root = Some(media_root.into());
        self
    }

    /// Override the per-conversation document file name
    #[must_use]
    pub fn with_document_name(mut self, name: &str) -> Self {
        name.clone_into(&mut self.document_name);
        self
    }

    /// Archive root of this session
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted names of the conversation directories under the root
    pub fn chat_ids(&self) -> Result<Vec<String>> {
        let entries =
            fs::read_dir(&self.root).map_err(|e| InsightsError::corpus_read(&self.root, e))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| InsightsError::corpus_read(&self.root, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| InsightsError::corpus_read(entry.path(), e))?;
            if !file_type.is_dir() {
                continue;
            }
            let name = entry.file_name().into_string().map_err(|name| {
                InsightsError::corpus_read(
                    self.root.join(&name),
                    "directory name is not valid UTF-8",
                )
            })?;
            ids.push(name);
        }
        ids.sort();
        Ok(ids)
    }

    /// Path of the conversation document for `chat_id`
    #[must_use]
    pub fn document_path(&self, chat_id: &str) -> PathBuf {
        self.root.join(chat_id).join(&self.document_name)
    }

    /// Declared participants of one conversation, text repaired
    pub fn participants(&mut self, chat_id: &str) -> Result<Vec<String>> {
        let path = self.document_path(chat_id);
        let document = self.document(&path)?;
        document
            .participants
            .iter()
            .map(|p| repair(&p.name, &path))
            .collect()
    }

    /// Read every conversation and build the message and attachment tables.
    pub fn load(&mut self) -> Result<Corpus> {
        let timer = OperationTimer::new("load_corpus");
        let metrics = MetricsCollector::default();

        if !self.root.is_dir() {
            metrics.record_error("corpus_read", "load_corpus");
            return Err(InsightsError::corpus_read(
                &self.root,
                "archive root is missing or not a directory",
            ));
        }

        let chat_ids = self.chat_ids()?;
        info!(root = %self.root.display(), conversations = chat_ids.len(), "Loading chat archive");

        let mut messages = Vec::new();
        let mut attachments = Vec::new();
        let mut participants = HashMap::with_capacity(chat_ids.len());

        for chat_id in &chat_ids {
            let path = self.document_path(chat_id);
            let media_root = self.media_root.clone();
            let document = match self.document(&path) {
                Ok(document) => document,
                Err(e) => {
                    metrics.record_error("corpus_read", "load_corpus");
                    return Err(e);
                }
            };

            let title = repair(&document.title, &path)?;
            let declared = document
                .participants
                .iter()
                .map(|p| repair(&p.name, &path))
                .collect::<Result<Vec<_>>>()?;
            debug!(chat_id = %chat_id, title = %title, messages = document.messages.len(), "Parsed conversation");

            for raw in &document.messages {
                let sender = repair(&raw.sender_name, &path)?;
                let timestamp = millis_to_naive(raw.timestamp_ms).ok_or_else(|| {
                    InsightsError::corpus_read(
                        &path,
                        format!("timestamp_ms {} is out of range", raw.timestamp_ms),
                    )
                })?;

                if let Some(content) = &raw.content {
                    messages.push(Message {
                        chat_id: chat_id.clone(),
                        conversation_title: title.clone(),
                        timestamp,
                        sender: sender.clone(),
                        content: Some(repair(content, &path)?),
                    });
                }

                for photo in raw.photos.iter().flatten() {
                    let capture_timestamp =
                        millis_to_naive(photo.creation_timestamp).ok_or_else(|| {
                            InsightsError::corpus_read(
                                &path,
                                format!(
                                    "creation_timestamp {} is out of range",
                                    photo.creation_timestamp
                                ),
                            )
                        })?;
                    let resource_path = media_root
                        .as_ref()
                        .map_or_else(|| PathBuf::from(&photo.uri), |base| base.join(&photo.uri));
                    attachments.push(Attachment {
                        chat_id: chat_id.clone(),
                        conversation_title: title.clone(),
                        timestamp,
                        sender: sender.clone(),
                        resource_path,
                        capture_timestamp,
                    });
                }
            }

            participants.insert(chat_id.clone(), declared);
        }

        let elapsed = timer.finish();
        metrics.record_corpus_load(
            chat_ids.len(),
            messages.len(),
            attachments.len(),
            std::time::Duration::from_millis(u64::try_from(elapsed).unwrap_or(u64::MAX)),
        );
        info!(
            messages = messages.len(),
            attachments = attachments.len(),
            "Chat archive loaded"
        );

        Ok(Corpus::new(messages, attachments, participants))
    }

    fn document(&mut self, path: &Path) -> Result<&RawConversation> {
        if !self.documents.contains_key(path) {
            let text =
                fs::read_to_string(path).map_err(|e| InsightsError::corpus_read(path, e))?;
            let document: RawConversation =
                serde_json::from_str(&text).map_err(|e| InsightsError::corpus_read(path, e))?;
            self.documents.insert(path.to_path_buf(), document);
        }
        self.documents
            .get(path)
            .ok_or_else(|| InsightsError::corpus_read(path, "document vanished from session"))
    }
}

/// Load the archive at `root` in a throwaway session.
pub fn load_corpus(root: impl Into<PathBuf>) -> Result<Corpus> {
    CorpusLoader::new(root).load()
}

fn repair(raw: &str, path: &Path) -> Result<String> {
    repair_mojibake(raw).map_err(|reason| InsightsError::corpus_read(path, reason))
}
