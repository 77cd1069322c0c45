//! Chat Insights - Analytics over exported chat archives
//!
//! A Rust library for turning an exported chat history (one JSON document
//! per conversation, with text messages and photo attachments) into the
//! statistical views a dashboard displays.
//!
//! # Features
//!
//! - Load and repair an archive into message and attachment tables
//! - Sent/received time series, weekly heatmaps and per-contact totals
//! - Word frequency and vocabulary statistics with stop-word filtering
//! - Contact interaction matrix and a laid-out interaction graph
//! - JSON and CSV reports

/// Aggregation engine
pub mod aggregation;
/// Configuration management
pub mod config;
/// Loaded corpus and conversation queries
pub mod corpus;
/// Error types
pub mod error;
/// Contact interaction graph and layout
pub mod graph;
/// Tokenizing and vocabulary statistics
pub mod lexicon;
/// Archive loading
pub mod loader;
/// Logging setup and utilities
pub mod logging;
/// Photo timeline
pub mod media;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// JSON and CSV report output
pub mod report;
/// Text repair and timestamp helpers
pub mod utils;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use corpus::Corpus;
pub use error::{InsightsError, Result};
pub use graph::InteractionGraph;
pub use lexicon::{LexicalAnalyzer, StopWords};
pub use loader::CorpusLoader;
pub use models::{Attachment, Granularity, Message, Timeframe};
