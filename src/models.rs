//! Data models for chat analytics
//!
//! This module contains the loaded event tables (messages and attachments),
//! the closed enumerations that select an aggregation, and every derived row
//! type handed to the presentation layer.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::InsightsError;

/// Weekday labels in the fixed Monday-first order used by every weekly table.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// One text event from an archived conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Directory name of the conversation in the archive
    pub chat_id: String,
    /// Conversation title
    pub conversation_title: String,
    /// When the message was sent
    pub timestamp: NaiveDateTime,
    /// Display name of the sender
    pub sender: String,
    /// Message text, absent for non-text events
    pub content: Option<String>,
}

impl Message {
    /// Create a text message
    #[must_use]
    pub fn new(
        chat_id: &str,
        conversation_title: &str,
        timestamp: NaiveDateTime,
        sender: &str,
        content: Option<&str>,
    ) -> Self {
        Self {
            chat_id: chat_id.to_owned(),
            conversation_title: conversation_title.to_owned(),
            timestamp,
            sender: sender.to_owned(),
            content: content.map(ToOwned::to_owned),
        }
    }
}

/// One photo event from an archived conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Directory name of the conversation in the archive
    pub chat_id: String,
    /// Conversation title
    pub conversation_title: String,
    /// When the carrying message was sent
    pub timestamp: NaiveDateTime,
    /// Display name of the sender
    pub sender: String,
    /// Location of the photo file
    pub resource_path: PathBuf,
    /// When the photo itself was taken
    pub capture_timestamp: NaiveDateTime,
}

/// Time bucket size for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Truncate to the hour
    Hourly,
    /// Truncate to the calendar day
    Daily,
    /// Truncate to the first day of the month
    Monthly,
    /// Truncate to the first day of the year
    Yearly,
}

impl Granularity {
    /// Start of the bucket containing `ts`
    #[must_use]
    pub fn truncate(self, ts: NaiveDateTime) -> NaiveDateTime {
        let date = ts.date();
        match self {
            Self::Hourly => {
                date.and_time(NaiveTime::MIN) + TimeDelta::hours(i64::from(ts.hour()))
            }
            Self::Daily => date.and_time(NaiveTime::MIN),
            Self::Monthly => (date - Days::new(u64::from(date.day0()))).and_time(NaiveTime::MIN),
            Self::Yearly => {
                (date - Days::new(u64::from(date.ordinal0()))).and_time(NaiveTime::MIN)
            }
        }
    }

    /// Start of the bucket following the one starting at `bucket`.
    ///
    /// `None` when that bucket lies past the last representable date.
    #[must_use]
    pub fn next(self, bucket: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::Hourly => bucket.checked_add_signed(TimeDelta::hours(1)),
            Self::Daily => bucket.checked_add_signed(TimeDelta::days(1)),
            Self::Monthly => bucket.checked_add_months(Months::new(1)),
            Self::Yearly => bucket.checked_add_months(Months::new(12)),
        }
    }
}

impl FromStr for Granularity {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(InsightsError::UnsupportedGranularity(s.to_owned())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// Recurring slot used by distribution tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Timeframe {
    /// Seven slots, Monday first
    DayOfWeek,
    /// Twenty-four slots, hour 0 first
    HourOfDay,
}

impl Timeframe {
    /// Number of slots in this timeframe
    #[must_use]
    pub const fn slots(self) -> usize {
        match self {
            Self::DayOfWeek => 7,
            Self::HourOfDay => 24,
        }
    }

    /// Slot index of `ts`
    #[must_use]
    pub fn slot_of(self, ts: NaiveDateTime) -> usize {
        match self {
            Self::DayOfWeek => ts.weekday().num_days_from_monday() as usize,
            Self::HourOfDay => ts.hour() as usize,
        }
    }

    /// Display label of slot `slot`
    #[must_use]
    pub fn label(self, slot: usize) -> String {
        match self {
            Self::DayOfWeek => WEEKDAYS.get(slot).copied().unwrap_or_default().to_owned(),
            Self::HourOfDay => slot.to_string(),
        }
    }
}

impl FromStr for Timeframe {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "day-of-week" | "weekday" => Ok(Self::DayOfWeek),
            "hour-of-day" | "hour" => Ok(Self::HourOfDay),
            _ => Err(InsightsError::UnsupportedTimeframe(s.to_owned())),
        }
    }
}

/// Whether a bucket counts the owner's messages or everyone else's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Sent by the owner
    Sent,
    /// Sent by anyone else
    Received,
}

/// Message count in one time bucket of the sent/received series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    /// Bucket start
    pub bucket: NaiveDateTime,
    /// Series this bucket belongs to
    pub direction: Direction,
    /// Number of messages in the bucket
    pub count: u64,
}

/// Message count for one sender in one time bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Bucket start
    pub bucket: NaiveDateTime,
    /// Sender name
    pub sender: String,
    /// Number of messages
    pub count: u64,
}

/// Message count for one sender in one recurring slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRow {
    /// Slot index (weekday from Monday, or hour)
    pub slot: usize,
    /// Human readable slot name
    pub label: String,
    /// Sender name
    pub sender: String,
    /// Number of messages
    pub count: u64,
}

/// Total messages sent by one contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCount {
    /// Sender name
    pub sender: String,
    /// Number of messages sent
    pub count: u64,
}

/// Owner total plus every other sender's total, largest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactTotals {
    /// Messages sent by the owner
    pub mine: u64,
    /// Other senders, descending by count
    pub theirs: Vec<ContactCount>,
}

impl ContactTotals {
    /// Names of the other senders, in table order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.theirs.iter().map(|c| c.sender.as_str()).collect()
    }

    /// Counts of the other senders, in table order
    #[must_use]
    pub fn counts(&self) -> Vec<u64> {
        self.theirs.iter().map(|c| c.count).collect()
    }

    /// Owner total plus all other totals
    #[must_use]
    pub fn total(&self) -> u64 {
        self.mine + self.theirs.iter().map(|c| c.count).sum::<u64>()
    }
}

/// Dense weekday × hour message counts, Monday first, hour 0 first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPattern {
    /// `counts[weekday][hour]`
    pub counts: [[u64; 24]; 7],
}

impl Default for ActivityPattern {
    fn default() -> Self {
        Self {
            counts: [[0; 24]; 7],
        }
    }
}

impl ActivityPattern {
    /// Count for a weekday (0 = Monday) and hour, zero when out of range
    #[must_use]
    pub fn get(&self, weekday: usize, hour: usize) -> u64 {
        self.counts
            .get(weekday)
            .and_then(|row| row.get(hour))
            .copied()
            .unwrap_or(0)
    }

    /// Sum over all cells
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

/// Participation count from one sender towards one other participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyEntry {
    /// Sender name
    pub sender: String,
    /// Other participant of a shared conversation
    pub receiver: String,
    /// Sender's messages summed over all conversations shared with receiver
    pub count: u64,
}

/// Vocabulary statistics for one sender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyStats {
    /// Sender name
    pub sender: String,
    /// Messages sent
    pub message_count: u64,
    /// Distinct tokens after stop-word removal
    pub vocabulary_size: usize,
    /// Mean character length of the distinct tokens
    pub mean_word_length: Option<f64>,
    /// Mean number of tokens per text message
    pub mean_words_per_message: Option<f64>,
}

/// One row of a word frequency table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    /// Lowercased token
    pub token: String,
    /// Occurrences
    pub count: u64,
}

/// Headline numbers for a corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSummary {
    /// Messages sent by the owner
    pub total_sent: u64,
    /// Messages sent by anyone else
    pub total_received: u64,
    /// Earliest message
    pub first_message: Option<NaiveDateTime>,
    /// Latest message
    pub last_message: Option<NaiveDateTime>,
}

/// First photo of a calendar day within a photo timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMark {
    /// Position in the sorted photo list
    pub index: usize,
    /// Calendar day of that photo's message
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("valid timestamp")
    }

    #[test]
    fn test_truncate_each_granularity() {
        let ts = at("2024-03-17 14:35:12");
        assert_eq!(Granularity::Hourly.truncate(ts), at("2024-03-17 14:00:00"));
        assert_eq!(Granularity::Daily.truncate(ts), at("2024-03-17 00:00:00"));
        assert_eq!(Granularity::Monthly.truncate(ts), at("2024-03-01 00:00:00"));
        assert_eq!(Granularity::Yearly.truncate(ts), at("2024-01-01 00:00:00"));
    }

    #[test]
    fn test_next_bucket() {
        assert_eq!(
            Granularity::Monthly.next(at("2024-01-01 00:00:00")),
            Some(at("2024-02-01 00:00:00"))
        );
        assert_eq!(
            Granularity::Yearly.next(at("2024-01-01 00:00:00")),
            Some(at("2025-01-01 00:00:00"))
        );
        assert_eq!(
            Granularity::Hourly.next(at("2024-01-01 23:00:00")),
            Some(at("2024-01-02 00:00:00"))
        );
    }

    #[test]
    fn test_next_bucket_past_last_date() {
        let last_day = NaiveDate::MAX.and_time(NaiveTime::MIN);
        assert_eq!(Granularity::Daily.next(last_day), None);
        assert_eq!(Granularity::Monthly.next(Granularity::Monthly.truncate(last_day)), None);
        assert_eq!(Granularity::Yearly.next(Granularity::Yearly.truncate(last_day)), None);
        assert_eq!(
            Granularity::Hourly.next(NaiveDate::MAX.and_hms_opt(23, 0, 0).expect("valid time")),
            None
        );
    }

    #[test]
    fn test_granularity_parsing() {
        assert_eq!("Daily".parse::<Granularity>().unwrap(), Granularity::Daily);
        assert_eq!("HOURLY".parse::<Granularity>().unwrap(), Granularity::Hourly);
        assert!(matches!(
            "weekly".parse::<Granularity>(),
            Err(InsightsError::UnsupportedGranularity(g)) if g == "weekly"
        ));
    }

    #[test]
    fn test_timeframe_parsing_and_labels() {
        assert_eq!("Day of Week".parse::<Timeframe>().unwrap(), Timeframe::DayOfWeek);
        assert_eq!("hour_of_day".parse::<Timeframe>().unwrap(), Timeframe::HourOfDay);
        assert!("minute".parse::<Timeframe>().is_err());
        assert_eq!(Timeframe::DayOfWeek.label(6), "Sunday");
        assert_eq!(Timeframe::HourOfDay.label(13), "13");
    }
}
