//! Aggregation engine.
//!
//! Every function here is a pure transformation of an immutable message
//! slice into a freshly allocated table. Counts are plain `u64`s; time
//! series are ordered chronologically.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::error::{InsightsError, Result};
use crate::models::{
    ActivityPattern, AdjacencyEntry, AggregateRow, BucketCount, ContactCount, ContactTotals,
    CorpusSummary, Direction, DistributionRow, Granularity, Message, Timeframe,
};

/// Sent and received message counts per time bucket.
///
/// The owner's series comes first, then everyone else's. Each series is
/// contiguous from its first to its last bucket; buckets without messages
/// are present with a zero count.
#[must_use]
pub fn bucketed_sent_received(
    messages: &[Message],
    owner: &str,
    granularity: Granularity,
) -> Vec<BucketCount> {
    let (sent, received): (Vec<&Message>, Vec<&Message>) =
        messages.iter().partition(|m| m.sender == owner);

    let mut rows = contiguous_series(&sent, granularity, Direction::Sent);
    rows.extend(contiguous_series(&received, granularity, Direction::Received));
    rows
}

fn contiguous_series(
    messages: &[&Message],
    granularity: Granularity,
    direction: Direction,
) -> Vec<BucketCount> {
    let mut counts: BTreeMap<NaiveDateTime, u64> = BTreeMap::new();
    for message in messages {
        *counts.entry(granularity.truncate(message.timestamp)).or_insert(0) += 1;
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(counts.len());
    let mut cursor = Some(first);
    while let Some(bucket) = cursor.filter(|b| *b <= last) {
        rows.push(BucketCount {
            bucket,
            direction,
            count: counts.get(&bucket).copied().unwrap_or(0),
        });
        cursor = granularity.next(bucket);
    }
    rows
}

/// Per-sender message counts per time bucket.
///
/// Only observed bucket × sender combinations are returned, ordered by
/// bucket and then sender name. Keys are unique.
#[must_use]
pub fn bucketed_per_sender(messages: &[Message], granularity: Granularity) -> Vec<AggregateRow> {
    let mut counts: BTreeMap<(NaiveDateTime, &str), u64> = BTreeMap::new();
    for message in messages {
        let key = (granularity.truncate(message.timestamp), message.sender.as_str());
        *counts.entry(key).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|((bucket, sender), count)| AggregateRow {
            bucket,
            sender: sender.to_owned(),
            count,
        })
        .collect()
}

/// Weekday × hour counts of the owner's messages.
///
/// Always dense: cells without messages are zero.
#[must_use]
pub fn weekly_activity_pattern(messages: &[Message], owner: &str) -> ActivityPattern {
    let mut pattern = ActivityPattern::default();
    for message in messages.iter().filter(|m| m.sender == owner) {
        let weekday = message.timestamp.weekday().num_days_from_monday() as usize;
        let hour = message.timestamp.hour() as usize;
        pattern.counts[weekday][hour] += 1;
    }
    pattern
}

/// Message counts per recurring slot and sender.
///
/// Dense over every slot of `timeframe` × every sender present, ordered by
/// slot and then sender name.
#[must_use]
pub fn distribution(messages: &[Message], timeframe: Timeframe) -> Vec<DistributionRow> {
    let senders: BTreeSet<&str> = messages.iter().map(|m| m.sender.as_str()).collect();
    let mut counts: HashMap<(usize, &str), u64> = HashMap::new();
    for message in messages {
        let slot = timeframe.slot_of(message.timestamp);
        *counts.entry((slot, message.sender.as_str())).or_insert(0) += 1;
    }

    let counts = &counts;
    let senders = &senders;
    (0..timeframe.slots())
        .flat_map(move |slot| {
            senders.iter().map(move |&sender| DistributionRow {
                slot,
                label: timeframe.label(slot),
                sender: sender.to_owned(),
                count: counts.get(&(slot, sender)).copied().unwrap_or(0),
            })
        })
        .collect()
}

/// Owner total plus every other sender's total, largest first.
///
/// Ties keep the order in which senders were first encountered.
pub fn total_per_contact(messages: &[Message], owner: &str) -> Result<ContactTotals> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for message in messages {
        let sender = message.sender.as_str();
        let count = counts.entry(sender).or_insert_with(|| {
            order.push(sender);
            0
        });
        *count += 1;
    }

    let mine = counts
        .get(owner)
        .copied()
        .ok_or_else(|| InsightsError::OwnerNotFound(owner.to_owned()))?;

    let mut theirs: Vec<ContactCount> = order
        .into_iter()
        .filter(|&sender| sender != owner)
        .map(|sender| ContactCount {
            sender: sender.to_owned(),
            count: counts.get(sender).copied().unwrap_or(0),
        })
        .collect();
    // sort_by is stable
    theirs.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(ContactTotals { mine, theirs })
}

/// Participation counts between every pair of senders sharing a conversation.
///
/// Within each conversation every sender's message count is attributed to
/// each other sender of that conversation; pairs are summed across
/// conversations. No entry has `sender == receiver`. Ordered by sender and
/// then receiver.
#[must_use]
pub fn pairwise_adjacency(messages: &[Message]) -> Vec<AdjacencyEntry> {
    // conversation -> sender -> messages sent there
    let mut per_conversation: BTreeMap<&str, BTreeMap<&str, u64>> = BTreeMap::new();
    for message in messages {
        *per_conversation
            .entry(message.conversation_title.as_str())
            .or_default()
            .entry(message.sender.as_str())
            .or_insert(0) += 1;
    }

    let mut pairs: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for senders in per_conversation.values() {
        for (&sender, &count) in senders {
            for &receiver in senders.keys() {
                if receiver != sender {
                    *pairs.entry((sender, receiver)).or_insert(0) += count;
                }
            }
        }
    }

    pairs
        .into_iter()
        .map(|((sender, receiver), count)| AdjacencyEntry {
            sender: sender.to_owned(),
            receiver: receiver.to_owned(),
            count,
        })
        .collect()
}

/// Headline totals and the covered time span.
pub fn summarize(messages: &[Message], owner: &str) -> Result<CorpusSummary> {
    crate::corpus::ensure_owner(messages, owner)?;

    let total_sent = messages.iter().filter(|m| m.sender == owner).count() as u64;
    Ok(CorpusSummary {
        total_sent,
        total_received: messages.len() as u64 - total_sent,
        first_message: messages.iter().map(|m| m.timestamp).min(),
        last_message: messages.iter().map(|m| m.timestamp).max(),
    })
}
