//! The loaded corpus and its conversation-level queries.

use std::collections::{BTreeSet, HashMap};

use crate::error::{InsightsError, Result};
use crate::models::{Attachment, Message};

/// Immutable snapshot of every message and attachment in an archive.
///
/// Built once by [`crate::loader::CorpusLoader`]; all aggregation functions
/// borrow its tables read-only.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    messages: Vec<Message>,
    attachments: Vec<Attachment>,
    participants: HashMap<String, Vec<String>>,
}

impl Corpus {
    /// Assemble a corpus from already-normalized tables.
    ///
    /// `participants` maps a chat id to the names declared in its document.
    #[must_use]
    pub fn new(
        messages: Vec<Message>,
        attachments: Vec<Attachment>,
        participants: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            messages,
            attachments,
            participants,
        }
    }

    /// All text messages, in archive order
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// All photo events, in archive order
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Number of conversation directories loaded
    #[must_use]
    pub fn conversation_count(&self) -> usize {
        self.participants.len()
    }

    /// Sorted distinct conversation titles
    #[must_use]
    pub fn chat_titles(&self) -> Vec<String> {
        self.messages
            .iter()
            .map(|m| m.conversation_title.as_str())
            .chain(self.attachments.iter().map(|a| a.conversation_title.as_str()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect()
    }

    /// Sorted distinct senders
    #[must_use]
    pub fn contacts(&self) -> Vec<String> {
        self.messages
            .iter()
            .map(|m| m.sender.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect()
    }

    /// Union of the declared participants of every chat carrying `title`.
    ///
    /// Several archive directories can share one title; their participant
    /// lists are merged. Sorted.
    #[must_use]
    pub fn participants(&self, title: &str) -> Vec<String> {
        let chat_ids: BTreeSet<&str> = self
            .messages
            .iter()
            .filter(|m| m.conversation_title == title)
            .map(|m| m.chat_id.as_str())
            .chain(
                self.attachments
                    .iter()
                    .filter(|a| a.conversation_title == title)
                    .map(|a| a.chat_id.as_str()),
            )
            .collect();

        chat_ids
            .into_iter()
            .filter_map(|id| self.participants.get(id))
            .flatten()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect()
    }

    /// Messages of one conversation whose sender is one of its participants
    #[must_use]
    pub fn conversation_messages(&self, title: &str) -> Vec<Message> {
        let members: BTreeSet<String> = self.participants(title).into_iter().collect();
        self.messages
            .iter()
            .filter(|m| m.conversation_title == title && members.contains(&m.sender))
            .cloned()
            .collect()
    }

    /// Photos of one conversation whose sender is one of its participants
    #[must_use]
    pub fn conversation_attachments(&self, title: &str) -> Vec<Attachment> {
        let members: BTreeSet<String> = self.participants(title).into_iter().collect();
        self.attachments
            .iter()
            .filter(|a| a.conversation_title == title && members.contains(&a.sender))
            .cloned()
            .collect()
    }

    /// Fail with [`InsightsError::OwnerNotFound`] unless `owner` sent a message.
    pub fn ensure_owner(&self, owner: &str) -> Result<()> {
        ensure_owner(&self.messages, owner)
    }
}

/// Fail with [`InsightsError::OwnerNotFound`] unless `owner` sent one of `messages`.
pub fn ensure_owner(messages: &[Message], owner: &str) -> Result<()> {
    if messages.iter().any(|m| m.sender == owner) {
        Ok(())
    } else {
        Err(InsightsError::OwnerNotFound(owner.to_owned()))
    }
}
