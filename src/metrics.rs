use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Metrics collection and management
///
/// Thin facade over the `metrics` crate. Nothing is exported unless the
/// embedding application installs a recorder.
#[derive(Debug, Clone, Copy)]
pub struct MetricsCollector {
    /// Conversations read per load
    pub conversations_loaded: &'static str,
    /// Text messages read per load
    pub messages_loaded: &'static str,
    /// Photo attachments read per load
    pub attachments_loaded: &'static str,
    /// Corpus load duration
    pub load_duration: &'static str,

    /// Aggregation calls, labelled by operation
    pub aggregations_total: &'static str,
    /// Aggregation duration, labelled by operation
    pub aggregation_duration: &'static str,
    /// Rows produced by the last aggregation, labelled by operation
    pub aggregation_rows: &'static str,

    /// Errors, labelled by type and operation
    pub errors_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            conversations_loaded: "chat_insights_conversations_loaded_total",
            messages_loaded: "chat_insights_messages_loaded_total",
            attachments_loaded: "chat_insights_attachments_loaded_total",
            load_duration: "chat_insights_load_duration_seconds",

            aggregations_total: "chat_insights_aggregations_total",
            aggregation_duration: "chat_insights_aggregation_duration_seconds",
            aggregation_rows: "chat_insights_aggregation_rows",

            errors_total: "chat_insights_errors_total",
        }
    }
}

impl MetricsCollector {
    /// Record a completed corpus load
    pub fn record_corpus_load(
        &self,
        conversations: usize,
        messages: usize,
        attachments: usize,
        duration: Duration,
    ) {
        counter!(self.conversations_loaded).increment(conversations as u64);
        counter!(self.messages_loaded).increment(messages as u64);
        counter!(self.attachments_loaded).increment(attachments as u64);
        histogram!(self.load_duration).record(duration.as_secs_f64());
    }

    /// Record one aggregation call
    pub fn record_aggregation(&self, operation: &str, rows: usize, duration: Duration) {
        counter!(self.aggregations_total, "operation" => operation.to_owned()).increment(1);
        histogram!(self.aggregation_duration, "operation" => operation.to_owned())
            .record(duration.as_secs_f64());
        gauge!(self.aggregation_rows, "operation" => operation.to_owned()).set(rows as f64);
    }

    /// Record error metrics
    pub fn record_error(&self, error_type: &str, operation: &str) {
        counter!(
            self.errors_total,
            "type" => error_type.to_owned(),
            "operation" => operation.to_owned()
        )
        .increment(1);
    }
}

/// Performance timing wrapper for aggregation metrics
pub struct MetricsTimer {
    collector: MetricsCollector,
    operation: String,
    start: std::time::Instant,
}

impl MetricsTimer {
    /// Start timing `operation`
    #[must_use]
    pub fn new(collector: MetricsCollector, operation: &str) -> Self {
        Self {
            collector,
            operation: operation.to_string(),
            start: std::time::Instant::now(),
        }
    }

    /// Record the elapsed time and the number of rows produced
    pub fn finish(self, rows: usize) -> Duration {
        let duration = self.start.elapsed();
        self.collector
            .record_aggregation(&self.operation, rows, duration);
        duration
    }
}
