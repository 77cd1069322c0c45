//! Lexical analysis of message text.
//!
//! Tokens are lowercased, NFC-normalized words plus single punctuation or
//! symbol characters. Stop words (English and Dutch lists, configured
//! boring words, and every single digit, punctuation and whitespace
//! character) are dropped before counting.

use std::collections::{BTreeMap, HashMap, HashSet};

use regex::Regex;
use stop_words::{get, LANGUAGE};
use unicode_normalization::UnicodeNormalization;

use crate::error::{InsightsError, Result};
use crate::models::{Message, VocabularyStats, WordCount};

/// Single characters that never count as words: digits, ASCII punctuation,
/// whitespace and the hex letters.
const IGNORED_CHARACTERS: &str = concat!(
    "0123456789",
    "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
    " \t\n\r\u{0b}\u{0c}",
    "abcdefABCDEF",
);

/// Set of tokens excluded from frequency and vocabulary statistics
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// No stop words at all
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// English and Dutch stop words, single ignored characters, and `boring`.
    #[must_use]
    pub fn standard<I, S>(boring: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: HashSet<String> = get(LANGUAGE::English)
            .iter()
            .chain(get(LANGUAGE::Dutch).iter())
            .map(ToString::to_string)
            .collect();
        words.extend(IGNORED_CHARACTERS.chars().map(String::from));

        let mut stop_words = Self { words };
        stop_words.extend(boring);
        stop_words
    }

    /// Add more words; they are lowercased to match tokens
    pub fn extend<I, S>(&mut self, extra: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(extra.into_iter().map(|w| w.as_ref().to_lowercase()));
    }

    /// Whether `token` is excluded
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    /// Number of stop words
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Word-level statistics over message text
#[derive(Debug, Clone)]
pub struct LexicalAnalyzer {
    stop_words: StopWords,
    token_regex: Regex,
}

/// Most frequent words of one sender
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SenderWords {
    /// Sender name
    pub sender: String,
    /// Word frequency table, truncated
    pub words: Vec<WordCount>,
}

impl LexicalAnalyzer {
    /// Create an analyzer that drops `stop_words`
    pub fn new(stop_words: StopWords) -> Result<Self> {
        let token_regex = Regex::new(r"\w+(?:['’]\w+)*|[^\w\s]")
            .map_err(|e| InsightsError::Other(format!("Failed to compile token regex: {e}")))?;
        Ok(Self {
            stop_words,
            token_regex,
        })
    }

    /// The stop words this analyzer drops
    #[must_use]
    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Every token of `text`, lowercased, stop words included.
    pub fn raw_tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.token_regex
            .find_iter(text)
            .map(|m| m.as_str().nfc().collect::<String>().to_lowercase())
    }

    /// Tokens of `text` with stop words removed, in text order.
    ///
    /// The iterator is lazy; call again to restart it.
    pub fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.raw_tokens(text)
            .filter(move |token| !self.stop_words.contains(token))
    }

    /// Token counts over all message text, most frequent first.
    ///
    /// Ties keep first-occurrence order in the concatenated corpus.
    #[must_use]
    pub fn word_frequency(&self, messages: &[Message]) -> Vec<WordCount> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut table: Vec<WordCount> = Vec::new();

        for content in messages.iter().filter_map(|m| m.content.as_deref()) {
            for token in self.tokenize(content) {
                if let Some(&i) = index.get(&token) {
                    table[i].count += 1;
                } else {
                    index.insert(token.clone(), table.len());
                    table.push(WordCount { token, count: 1 });
                }
            }
        }

        table.sort_by(|a, b| b.count.cmp(&a.count));
        table
    }

    /// Vocabulary statistics for each of `senders` that sent a message.
    ///
    /// Rows are ordered by sender name. An empty selection yields no rows.
    #[must_use]
    pub fn vocabulary_stats(&self, messages: &[Message], senders: &[String]) -> Vec<VocabularyStats> {
        if senders.is_empty() {
            return Vec::new();
        }
        let selected: HashSet<&str> = senders.iter().map(String::as_str).collect();

        let mut groups: BTreeMap<&str, Vec<&Message>> = BTreeMap::new();
        for message in messages.iter().filter(|m| selected.contains(m.sender.as_str())) {
            groups.entry(message.sender.as_str()).or_default().push(message);
        }

        groups
            .into_iter()
            .map(|(sender, group)| self.sender_stats(sender, &group))
            .collect()
    }

    fn sender_stats(&self, sender: &str, group: &[&Message]) -> VocabularyStats {
        let mut vocabulary: HashSet<String> = HashSet::new();
        let mut words_per_message: Vec<usize> = Vec::new();

        for content in group.iter().filter_map(|m| m.content.as_deref()) {
            vocabulary.extend(self.tokenize(content));
            words_per_message.push(self.raw_tokens(content).count());
        }

        let mean_word_length = mean(vocabulary.iter().map(|w| w.chars().count()));
        let mean_words_per_message = mean(words_per_message.into_iter());

        VocabularyStats {
            sender: sender.to_owned(),
            message_count: group.len() as u64,
            vocabulary_size: vocabulary.len(),
            mean_word_length,
            mean_words_per_message,
        }
    }

    /// Frequency table of each sender, senders in encounter order.
    #[must_use]
    pub fn top_words_per_sender(&self, messages: &[Message], limit: usize) -> Vec<SenderWords> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<Message>> = HashMap::new();
        for message in messages {
            groups
                .entry(message.sender.as_str())
                .or_insert_with(|| {
                    order.push(message.sender.as_str());
                    Vec::new()
                })
                .push(message.clone());
        }

        order
            .into_iter()
            .map(|sender| {
                let mut words = groups
                    .get(sender)
                    .map(|group| self.word_frequency(group))
                    .unwrap_or_default();
                words.truncate(limit);
                SenderWords {
                    sender: sender.to_owned(),
                    words,
                }
            })
            .collect()
    }
}

fn mean(values: impl Iterator<Item = usize>) -> Option<f64> {
    let (sum, n) = values.fold((0usize, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum as f64 / n as f64)
    }
}
