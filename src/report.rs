//! Report writing for derived tables.
//!
//! This module serializes aggregation results for the presentation layer,
//! either as a pretty-printed JSON document or as CSV with a header row.

use std::fmt;
use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use csv::Writer;
use serde::Serialize;

use crate::error::{InsightsError, Result};
use crate::graph::{ConnectionMatrix, ContactEdge, PositionedNode};
use crate::models::{
    ActivityPattern, AdjacencyEntry, AggregateRow, Attachment, BucketCount, ContactCount,
    CorpusSummary, DistributionRow, VocabularyStats, WordCount, WEEKDAYS,
};

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// JSON document
    Json,
    /// Comma-separated values with a header row
    Csv,
}

impl ReportFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(InsightsError::UnsupportedFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A flat record that can be written as one CSV line.
///
/// `COLUMNS` lists the serialized field names in declaration order; it is the
/// header of a table that has no rows.
pub trait ReportRow: Serialize {
    /// CSV header
    const COLUMNS: &'static [&'static str];
}

macro_rules! report_rows {
    ($($row:ty => [$($column:literal),+ $(,)?]),+ $(,)?) => {
        $(
            impl ReportRow for $row {
                const COLUMNS: &'static [&'static str] = &[$($column),+];
            }
        )+
    };
}

report_rows! {
    BucketCount => ["bucket", "direction", "count"],
    AggregateRow => ["bucket", "sender", "count"],
    DistributionRow => ["slot", "label", "sender", "count"],
    ContactCount => ["sender", "count"],
    AdjacencyEntry => ["sender", "receiver", "count"],
    VocabularyStats => [
        "sender",
        "message_count",
        "vocabulary_size",
        "mean_word_length",
        "mean_words_per_message",
    ],
    WordCount => ["token", "count"],
    CorpusSummary => ["total_sent", "total_received", "first_message", "last_message"],
    Attachment => [
        "chat_id",
        "conversation_title",
        "timestamp",
        "sender",
        "resource_path",
        "capture_timestamp",
    ],
    PositionedNode => ["name", "x", "y", "weight"],
    ContactEdge => ["source", "target", "weight"],
}

/// Open the report destination: `path` (parents created) or stdout.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir_all(parent)?;
            }
            Ok(Box::new(BufWriter::new(File::create(path)?)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Write a table of flat rows.
///
/// CSV always starts with the header, even when `rows` is empty.
pub fn write_rows<T: ReportRow>(rows: &[T], format: ReportFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(rows, out),
        ReportFormat::Csv => {
            let mut writer = Writer::from_writer(&mut *out);
            if rows.is_empty() {
                writer.write_record(T::COLUMNS)?;
            }
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
            drop(writer);
            out.flush()?;
            Ok(())
        }
    }
}

/// Write a single record; CSV output is one header and one row.
pub fn write_record<T: ReportRow>(record: &T, format: ReportFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(record, out),
        ReportFormat::Csv => write_rows(std::slice::from_ref(record), format, out),
    }
}

/// Write any serializable value as a pretty-printed JSON document.
pub fn write_json<T: Serialize + ?Sized>(value: &T, out: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write the weekly activity heatmap: one row per weekday, one column per hour.
pub fn write_activity(pattern: &ActivityPattern, format: ReportFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        ReportFormat::Json => {
            let rows: Vec<serde_json::Value> = WEEKDAYS
                .iter()
                .zip(pattern.counts.iter())
                .map(|(day, hours)| serde_json::json!({ "weekday": day, "hours": hours }))
                .collect();
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
        ReportFormat::Csv => {
            let mut writer = Writer::from_writer(&mut *out);
            let mut header = vec!["weekday".to_string()];
            header.extend((0..24).map(|h: u32| h.to_string()));
            writer.write_record(&header)?;
            for (day, hours) in WEEKDAYS.iter().zip(pattern.counts.iter()) {
                let mut record = vec![(*day).to_string()];
                record.extend(hours.iter().map(ToString::to_string));
                writer.write_record(&record)?;
            }
            writer.flush()?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Write the sender × receiver matrix; missing cells are `null` / empty.
pub fn write_matrix(matrix: &ConnectionMatrix, format: ReportFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, matrix)?;
            writeln!(out)?;
        }
        ReportFormat::Csv => {
            let mut writer = Writer::from_writer(&mut *out);
            let mut header = vec!["sender".to_string()];
            header.extend(matrix.names.iter().cloned());
            writer.write_record(&header)?;
            for (name, row) in matrix.names.iter().zip(matrix.values.iter()) {
                let mut record = vec![name.clone()];
                record.extend(row.iter().map(|v| v.map(|c| c.to_string()).unwrap_or_default()));
                writer.write_record(&record)?;
            }
            writer.flush()?;
        }
    }
    out.flush()?;
    Ok(())
}
