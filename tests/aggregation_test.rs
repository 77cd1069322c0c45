//! Integration tests for the aggregation engine

use chat_insights::aggregation::{
    bucketed_per_sender, bucketed_sent_received, distribution, pairwise_adjacency, summarize,
    total_per_contact, weekly_activity_pattern,
};
use chat_insights::models::{Direction, Granularity, Message, Timeframe};
use chat_insights::InsightsError;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn msg(title: &str, ts: &str, sender: &str) -> Message {
    Message::new(title, title, at(ts), sender, Some("text"))
}

/// Alice and Bob on Monday 2024-01-01
fn alice_and_bob() -> Vec<Message> {
    vec![
        msg("Bob", "2024-01-01 10:00", "Alice"),
        msg("Bob", "2024-01-01 10:01", "Alice"),
        msg("Bob", "2024-01-01 10:02", "Bob"),
    ]
}

/// Alice and Bob over two days
fn two_day_exchange() -> Vec<Message> {
    vec![
        msg("Bob", "2024-01-01 10:00", "Alice"),
        msg("Bob", "2024-01-01 11:00", "Bob"),
        msg("Bob", "2024-01-02 10:00", "Alice"),
    ]
}

#[test]
fn test_two_day_exchange_daily_buckets() {
    let rows = bucketed_sent_received(&two_day_exchange(), "Alice", Granularity::Daily);
    let series: Vec<(Direction, String, u64)> = rows
        .iter()
        .map(|r| (r.direction, r.bucket.date().to_string(), r.count))
        .collect();

    assert_eq!(
        series,
        vec![
            (Direction::Sent, "2024-01-01".to_string(), 1),
            (Direction::Sent, "2024-01-02".to_string(), 1),
            (Direction::Received, "2024-01-01".to_string(), 1),
        ]
    );
}

#[test]
fn test_two_day_exchange_contact_totals() {
    let totals = total_per_contact(&two_day_exchange(), "Alice").unwrap();
    assert_eq!(totals.mine, 2);
    assert_eq!(totals.names(), vec!["Bob"]);
    assert_eq!(totals.counts(), vec![1]);
}

#[test]
fn test_sent_received_at_last_representable_date() {
    let ts = NaiveDate::MAX.and_hms_opt(12, 0, 0).unwrap();
    let messages = vec![
        Message::new("end", "End", ts, "Alice", Some("bye")),
        Message::new("end", "End", ts, "Bob", Some("bye")),
    ];

    for granularity in [
        Granularity::Hourly,
        Granularity::Daily,
        Granularity::Monthly,
        Granularity::Yearly,
    ] {
        let rows = bucketed_sent_received(&messages, "Alice", granularity);
        assert_eq!(rows.len(), 2, "{granularity}");
        assert!(rows.iter().all(|r| r.count == 1));
    }
}

#[test]
fn test_total_per_contact_ties_keep_encounter_order() {
    let messages = vec![
        msg("G", "2024-01-01 10:00", "Alice"),
        msg("G", "2024-01-01 10:01", "Carol"),
        msg("G", "2024-01-01 10:02", "Bob"),
        msg("G", "2024-01-01 10:03", "Dave"),
        msg("G", "2024-01-01 10:04", "Dave"),
    ];
    let totals = total_per_contact(&messages, "Alice").unwrap();
    assert_eq!(totals.names(), vec!["Dave", "Carol", "Bob"]);
    assert_eq!(totals.counts(), vec![2, 1, 1]);
}

#[test]
fn test_total_per_contact_unknown_owner() {
    let result = total_per_contact(&alice_and_bob(), "Eve");
    assert!(matches!(result, Err(InsightsError::OwnerNotFound(name)) if name == "Eve"));
}

#[test]
fn test_total_per_contact_empty_corpus() {
    assert!(matches!(
        total_per_contact(&[], "Alice"),
        Err(InsightsError::OwnerNotFound(_))
    ));
}

#[test]
fn test_daily_sent_received() {
    let rows = bucketed_sent_received(&alice_and_bob(), "Alice", Granularity::Daily);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].direction, Direction::Sent);
    assert_eq!(rows[0].bucket, at("2024-01-01 00:00"));
    assert_eq!(rows[0].count, 2);
    assert_eq!(rows[1].direction, Direction::Received);
    assert_eq!(rows[1].bucket, at("2024-01-01 00:00"));
    assert_eq!(rows[1].count, 1);
}

#[test]
fn test_monthly_buckets_zero_filled() {
    let messages = vec![
        msg("Bob", "2024-01-15 10:00", "Alice"),
        msg("Bob", "2024-04-02 10:00", "Alice"),
    ];
    let rows = bucketed_sent_received(&messages, "Alice", Granularity::Monthly);

    let buckets: Vec<NaiveDate> = rows.iter().map(|r| r.bucket.date()).collect();
    assert_eq!(
        buckets,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        ]
    );
    assert_eq!(rows.iter().map(|r| r.count).collect::<Vec<_>>(), vec![1, 0, 0, 1]);
}

#[test]
fn test_sent_received_without_owner_messages() {
    let messages = vec![msg("Bob", "2024-01-01 10:00", "Bob")];
    let rows = bucketed_sent_received(&messages, "Alice", Granularity::Hourly);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].direction, Direction::Received);
}

#[test]
fn test_bucketed_per_sender_observed_only() {
    let messages = vec![
        msg("G", "2023-05-01 10:00", "Bob"),
        msg("G", "2024-05-01 10:00", "Alice"),
        msg("G", "2024-06-01 10:00", "Alice"),
    ];
    let rows = bucketed_per_sender(&messages, Granularity::Yearly);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].sender, "Bob");
    assert_eq!(rows[0].bucket, at("2023-01-01 00:00"));
    assert_eq!(rows[1].sender, "Alice");
    assert_eq!(rows[1].count, 2);
}

#[test]
fn test_weekly_activity_pattern_monday_ten() {
    let pattern = weekly_activity_pattern(&alice_and_bob(), "Alice");
    assert_eq!(pattern.get(0, 10), 2);
    assert_eq!(pattern.total(), 2);
}

#[test]
fn test_weekly_activity_pattern_empty_is_all_zero() {
    let pattern = weekly_activity_pattern(&[], "Alice");
    assert_eq!(pattern.counts.len(), 7);
    assert!(pattern.counts.iter().all(|day| day.len() == 24));
    assert_eq!(pattern.total(), 0);
}

#[test]
fn test_distribution_day_of_week_is_dense() {
    let rows = distribution(&alice_and_bob(), Timeframe::DayOfWeek);

    assert_eq!(rows.len(), 7 * 2);
    assert_eq!(rows[0].label, "Monday");
    assert_eq!(rows[0].sender, "Alice");
    assert_eq!(rows[0].count, 2);
    assert_eq!(rows[1].sender, "Bob");
    assert_eq!(rows[1].count, 1);
    assert!(rows[2..].iter().all(|r| r.count == 0));
}

#[test]
fn test_distribution_hour_of_day() {
    let rows = distribution(&alice_and_bob(), Timeframe::HourOfDay);
    assert_eq!(rows.len(), 24 * 2);
    let ten: Vec<u64> = rows.iter().filter(|r| r.slot == 10).map(|r| r.count).collect();
    assert_eq!(ten, vec![2, 1]);
}

#[test]
fn test_pairwise_adjacency_direct_chat() {
    let entries = pairwise_adjacency(&alice_and_bob());

    assert_eq!(entries.len(), 2);
    assert_eq!(
        (entries[0].sender.as_str(), entries[0].receiver.as_str(), entries[0].count),
        ("Alice", "Bob", 2)
    );
    assert_eq!(
        (entries[1].sender.as_str(), entries[1].receiver.as_str(), entries[1].count),
        ("Bob", "Alice", 1)
    );
}

#[test]
fn test_pairwise_adjacency_sums_across_conversations() {
    let mut messages = alice_and_bob();
    messages.push(msg("Group", "2024-01-02 10:00", "Alice"));
    messages.push(msg("Group", "2024-01-02 10:01", "Bob"));
    messages.push(msg("Group", "2024-01-02 10:02", "Carol"));

    let entries = pairwise_adjacency(&messages);
    let alice_bob = entries
        .iter()
        .find(|e| e.sender == "Alice" && e.receiver == "Bob")
        .unwrap();
    assert_eq!(alice_bob.count, 3);
    assert!(entries.iter().all(|e| e.sender != e.receiver));
}

#[test]
fn test_pairwise_adjacency_single_sender_has_no_pairs() {
    let messages = vec![msg("Notes", "2024-01-01 10:00", "Alice")];
    assert!(pairwise_adjacency(&messages).is_empty());
}

#[test]
fn test_summarize() {
    let summary = summarize(&alice_and_bob(), "Alice").unwrap();
    assert_eq!(summary.total_sent, 2);
    assert_eq!(summary.total_received, 1);
    assert_eq!(summary.first_message, Some(at("2024-01-01 10:00")));
    assert_eq!(summary.last_message, Some(at("2024-01-01 10:02")));
}

#[test]
fn test_summarize_unknown_owner() {
    assert!(matches!(
        summarize(&alice_and_bob(), "Eve"),
        Err(InsightsError::OwnerNotFound(_))
    ));
}

fn arb_messages() -> impl Strategy<Value = Vec<Message>> {
    let senders = prop::sample::select(vec!["Alice", "Bob", "Carol", "Dave"]);
    let titles = prop::sample::select(vec!["Bob", "Group", "Trip"]);
    // Two years of minutes from 2023-01-01
    let minutes = 0i64..(2 * 365 * 24 * 60);
    prop::collection::vec((titles, minutes, senders), 0..60).prop_map(|items| {
        items
            .into_iter()
            .map(|(title, minute, sender)| {
                let ts = at("2023-01-01 00:00") + Duration::minutes(minute);
                Message::new(title, title, ts, sender, Some("text"))
            })
            .collect()
    })
}

fn arb_granularity() -> impl Strategy<Value = Granularity> {
    prop::sample::select(vec![
        Granularity::Hourly,
        Granularity::Daily,
        Granularity::Monthly,
        Granularity::Yearly,
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_sent_received_conserves_messages(messages in arb_messages(), granularity in arb_granularity()) {
        let rows = bucketed_sent_received(&messages, "Alice", granularity);
        let sent: u64 = rows.iter().filter(|r| r.direction == Direction::Sent).map(|r| r.count).sum();
        let received: u64 = rows.iter().filter(|r| r.direction == Direction::Received).map(|r| r.count).sum();

        let expected_sent = messages.iter().filter(|m| m.sender == "Alice").count() as u64;
        prop_assert_eq!(sent, expected_sent);
        prop_assert_eq!(received, messages.len() as u64 - expected_sent);
    }

    #[test]
    fn prop_sent_received_series_are_contiguous(messages in arb_messages(), granularity in arb_granularity()) {
        let rows = bucketed_sent_received(&messages, "Alice", granularity);
        for direction in [Direction::Sent, Direction::Received] {
            let buckets: Vec<NaiveDateTime> = rows
                .iter()
                .filter(|r| r.direction == direction)
                .map(|r| r.bucket)
                .collect();
            for pair in buckets.windows(2) {
                prop_assert_eq!(granularity.next(pair[0]), Some(pair[1]));
            }
            if let (Some(first), Some(last)) = (buckets.first(), buckets.last()) {
                prop_assert!(rows.iter().any(|r| r.direction == direction && r.bucket == *first && r.count > 0));
                prop_assert!(rows.iter().any(|r| r.direction == direction && r.bucket == *last && r.count > 0));
            }
        }
    }

    #[test]
    fn prop_per_sender_conserves_messages(messages in arb_messages(), granularity in arb_granularity()) {
        let rows = bucketed_per_sender(&messages, granularity);
        let total: u64 = rows.iter().map(|r| r.count).sum();
        prop_assert_eq!(total, messages.len() as u64);
        prop_assert!(rows.iter().all(|r| r.count > 0));
    }

    #[test]
    fn prop_activity_pattern_counts_owner_messages(messages in arb_messages()) {
        let pattern = weekly_activity_pattern(&messages, "Alice");
        let expected = messages.iter().filter(|m| m.sender == "Alice").count() as u64;
        prop_assert_eq!(pattern.total(), expected);
    }

    #[test]
    fn prop_contact_totals_partition_corpus(messages in arb_messages()) {
        if let Ok(totals) = total_per_contact(&messages, "Alice") {
            prop_assert_eq!(totals.total(), messages.len() as u64);
            prop_assert!(totals.counts().windows(2).all(|w| w[0] >= w[1]));
            prop_assert!(totals.theirs.iter().all(|c| c.sender != "Alice"));
        } else {
            prop_assert!(messages.iter().all(|m| m.sender != "Alice"));
        }
    }

    #[test]
    fn prop_distribution_conserves_messages(messages in arb_messages()) {
        let rows = distribution(&messages, Timeframe::DayOfWeek);
        let total: u64 = rows.iter().map(|r| r.count).sum();
        prop_assert_eq!(total, messages.len() as u64);
    }

    #[test]
    fn prop_adjacency_has_no_self_loops(messages in arb_messages()) {
        let entries = pairwise_adjacency(&messages);
        prop_assert!(entries.iter().all(|e| e.sender != e.receiver && e.count > 0));
    }

    #[test]
    fn prop_aggregations_are_idempotent(messages in arb_messages(), granularity in arb_granularity()) {
        prop_assert_eq!(
            bucketed_sent_received(&messages, "Alice", granularity),
            bucketed_sent_received(&messages, "Alice", granularity)
        );
        prop_assert_eq!(pairwise_adjacency(&messages), pairwise_adjacency(&messages));
    }
}
