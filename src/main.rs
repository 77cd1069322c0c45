use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use chat_insights::aggregation;
use chat_insights::config::AppConfig;
use chat_insights::corpus::Corpus;
use chat_insights::graph::{connection_matrix, InteractionGraph};
use chat_insights::lexicon::{LexicalAnalyzer, StopWords};
use chat_insights::loader::CorpusLoader;
use chat_insights::logging::{init_logging, OperationTimer};
use chat_insights::media::photo_timeline;
use chat_insights::metrics::{MetricsCollector, MetricsTimer};
use chat_insights::models::{ContactCount, Granularity, Message, Timeframe};
use chat_insights::report::{self, ReportFormat, ReportRow};
use chat_insights::validation::InputValidator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file layered over config/default and config/local
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Archive root directory (overrides corpus.root)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Owner name as it appears in the archive (overrides owner.name)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Output format (json or csv)
    #[arg(short, long, global = true, default_value = "json")]
    format: ReportFormat,

    /// Write the report to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Totals sent and received, first and last message
    Summary,
    /// List conversations with their participants
    Chats,
    /// Messages sent per contact, largest first
    Contacts {
        /// Restrict to one conversation title
        #[arg(long)]
        chat: Option<String>,
    },
    /// Sent vs received message counts over time
    SentReceived {
        /// Bucket size: hourly, daily, monthly or yearly
        #[arg(short, long, default_value = "daily")]
        granularity: Granularity,

        /// Restrict to one conversation title
        #[arg(long)]
        chat: Option<String>,
    },
    /// Weekday x hour heatmap of the owner's messages
    Activity,
    /// Pairwise participation counts between contacts
    Adjacency,
    /// Sender x receiver participation matrix
    Matrix,
    /// Contact interaction graph with layout positions
    Graph {
        /// Emit edges instead of nodes
        #[arg(long)]
        edges: bool,
    },
    /// Per-sender message counts over time for one conversation
    Chat {
        /// Conversation title
        title: String,

        /// Bucket size: hourly, daily, monthly or yearly
        #[arg(short, long, default_value = "daily")]
        granularity: Granularity,
    },
    /// Per-sender message counts per weekday or hour of day
    Distribution {
        /// Slot kind: day-of-week or hour-of-day
        #[arg(short, long, default_value = "hour-of-day")]
        timeframe: Timeframe,

        /// Restrict to one conversation title
        #[arg(long)]
        chat: Option<String>,
    },
    /// Most used words
    Words {
        /// Restrict to one conversation title
        #[arg(long)]
        chat: Option<String>,

        /// One table per sender
        #[arg(long)]
        per_sender: bool,

        /// Rows to keep (defaults to lexicon.top_words per sender)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Vocabulary statistics for selected senders
    Vocab {
        /// Sender names
        senders: Vec<String>,
    },
    /// Photos of one conversation in send order
    Photos {
        /// Conversation title
        title: String,
    },
}

#[derive(Serialize)]
struct ChatRow {
    title: String,
    participants: String,
    messages: usize,
    photos: usize,
}

#[derive(Serialize)]
struct SenderWordRow<'a> {
    sender: &'a str,
    token: &'a str,
    count: u64,
}

impl ReportRow for ChatRow {
    const COLUMNS: &'static [&'static str] = &["title", "participants", "messages", "photos"];
}

impl ReportRow for SenderWordRow<'_> {
    const COLUMNS: &'static [&'static str] = &["sender", "token", "count"];
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load_with(cli.config.as_deref())?;
    if let Some(root) = &cli.root {
        config.corpus.root = root.to_string_lossy().into_owned();
    }
    if let Some(owner) = &cli.owner {
        config.owner.name = InputValidator::sanitize_text(owner);
    }

    // Initialize logging
    let log_level = config.get_log_level();
    let log_file = config.logging.file_path.as_ref().map(PathBuf::from);
    let _log_guard = init_logging(
        Some(log_level.as_str()),
        log_file.as_deref(),
        &config.logging.format,
    )?;

    config.validate()?;
    if let Some(output) = &cli.output {
        InputValidator::validate_output_path(output)?;
    }

    info!("Starting chat-insights");

    let root = PathBuf::from(&config.corpus.root);
    InputValidator::validate_corpus_root(&root)?;

    let mut loader = CorpusLoader::new(&root).with_document_name(&config.corpus.document_name);
    if let Some(media_root) = &config.corpus.media_root {
        loader = loader.with_media_root(media_root);
    }
    let corpus = loader.load().context("Failed to load chat archive")?;

    // Every view depends on the owner identity matching the data
    corpus.ensure_owner(&config.owner.name)?;

    let mut out = report::open_output(cli.output.as_deref())?;
    let timer = OperationTimer::new("report");
    run(&cli.command, &corpus, &config, cli.format, out.as_mut())?;
    timer.finish();

    if let Some(output) = &cli.output {
        info!("Report written to {}", output.display());
    }
    Ok(())
}

fn run(
    command: &Commands,
    corpus: &Corpus,
    config: &AppConfig,
    format: ReportFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let owner = config.owner.name.as_str();
    let metrics = MetricsCollector::default();

    match command {
        Commands::Summary => {
            let timer = MetricsTimer::new(metrics, "summarize");
            let summary = aggregation::summarize(corpus.messages(), owner)?;
            timer.finish(1);
            report::write_record(&summary, format, out)?;
        }
        Commands::Chats => {
            let rows: Vec<ChatRow> = corpus
                .chat_titles()
                .into_iter()
                .map(|title| ChatRow {
                    participants: corpus.participants(&title).join("; "),
                    messages: corpus.conversation_messages(&title).len(),
                    photos: corpus.conversation_attachments(&title).len(),
                    title,
                })
                .collect();
            report::write_rows(&rows, format, out)?;
        }
        Commands::Contacts { chat } => {
            let messages = scope(corpus, chat.as_deref());
            let timer = MetricsTimer::new(metrics, "total_per_contact");
            let totals = aggregation::total_per_contact(&messages, owner)?;
            timer.finish(totals.theirs.len() + 1);

            let mut rows = vec![ContactCount {
                sender: owner.to_owned(),
                count: totals.mine,
            }];
            rows.extend(totals.theirs);
            report::write_rows(&rows, format, out)?;
        }
        Commands::SentReceived { granularity, chat } => {
            let messages = scope(corpus, chat.as_deref());
            let timer = MetricsTimer::new(metrics, "bucketed_sent_received");
            let rows = aggregation::bucketed_sent_received(&messages, owner, *granularity);
            timer.finish(rows.len());
            report::write_rows(&rows, format, out)?;
        }
        Commands::Activity => {
            let timer = MetricsTimer::new(metrics, "weekly_activity_pattern");
            let pattern = aggregation::weekly_activity_pattern(corpus.messages(), owner);
            timer.finish(7);
            report::write_activity(&pattern, format, out)?;
        }
        Commands::Adjacency => {
            let timer = MetricsTimer::new(metrics, "pairwise_adjacency");
            let entries = aggregation::pairwise_adjacency(corpus.messages());
            timer.finish(entries.len());
            report::write_rows(&entries, format, out)?;
        }
        Commands::Matrix => {
            let matrix = connection_matrix(&aggregation::pairwise_adjacency(corpus.messages()));
            report::write_matrix(&matrix, format, out)?;
        }
        Commands::Graph { edges } => {
            let timer = MetricsTimer::new(metrics, "interaction_graph");
            let entries = aggregation::pairwise_adjacency(corpus.messages());
            let graph = InteractionGraph::from_adjacency(&entries, &config.layout);
            timer.finish(graph.graph.node_count());
            if *edges {
                report::write_rows(&graph.edges(), format, out)?;
            } else {
                report::write_rows(&graph.nodes(), format, out)?;
            }
        }
        Commands::Chat { title, granularity } => {
            let messages = corpus.conversation_messages(title);
            let timer = MetricsTimer::new(metrics, "bucketed_per_sender");
            let rows = aggregation::bucketed_per_sender(&messages, *granularity);
            timer.finish(rows.len());
            report::write_rows(&rows, format, out)?;
        }
        Commands::Distribution { timeframe, chat } => {
            let messages = scope(corpus, chat.as_deref());
            let timer = MetricsTimer::new(metrics, "distribution");
            let rows = aggregation::distribution(&messages, *timeframe);
            timer.finish(rows.len());
            report::write_rows(&rows, format, out)?;
        }
        Commands::Words {
            chat,
            per_sender,
            limit,
        } => {
            let messages = scope(corpus, chat.as_deref());
            let analyzer = analyzer(config)?;
            let timer = MetricsTimer::new(metrics, "word_frequency");
            if *per_sender {
                let tables = analyzer
                    .top_words_per_sender(&messages, limit.unwrap_or(config.lexicon.top_words));
                let rows: Vec<SenderWordRow<'_>> = tables
                    .iter()
                    .flat_map(|table| {
                        table.words.iter().map(|w| SenderWordRow {
                            sender: &table.sender,
                            token: &w.token,
                            count: w.count,
                        })
                    })
                    .collect();
                timer.finish(rows.len());
                report::write_rows(&rows, format, out)?;
            } else {
                let mut rows = analyzer.word_frequency(&messages);
                if let Some(limit) = limit {
                    rows.truncate(*limit);
                }
                timer.finish(rows.len());
                report::write_rows(&rows, format, out)?;
            }
        }
        Commands::Vocab { senders } => {
            InputValidator::validate_sender_selection(senders)?;
            let analyzer = analyzer(config)?;
            let timer = MetricsTimer::new(metrics, "vocabulary_stats");
            let rows = analyzer.vocabulary_stats(corpus.messages(), senders);
            timer.finish(rows.len());
            report::write_rows(&rows, format, out)?;
        }
        Commands::Photos { title } => {
            let timeline = photo_timeline(&corpus.conversation_attachments(title));
            info!(photos = timeline.len(), days = timeline.day_marks.len(), "Photo timeline");
            match format {
                ReportFormat::Json => report::write_json(&timeline, out)?,
                ReportFormat::Csv => report::write_rows(&timeline.photos, format, out)?,
            }
        }
    }

    Ok(())
}

/// Messages of one conversation, or the whole corpus
fn scope(corpus: &Corpus, chat: Option<&str>) -> Vec<Message> {
    chat.map_or_else(
        || corpus.messages().to_vec(),
        |title| corpus.conversation_messages(title),
    )
}

fn analyzer(config: &AppConfig) -> chat_insights::Result<LexicalAnalyzer> {
    let stop_words = if config.lexicon.default_stop_words {
        StopWords::standard(&config.lexicon.boring_words)
    } else {
        let mut stop_words = StopWords::empty();
        stop_words.extend(&config.lexicon.boring_words);
        stop_words
    };
    LexicalAnalyzer::new(stop_words)
}
