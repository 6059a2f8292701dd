//! Shared collect → write → report pipeline behind every save command.
//!
//! Commands differ only in their [`ExportStrategy`]: which way history is
//! walked, whose messages are kept, how the file is named and what the
//! throughput figure is measured against.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{info, warn};

use crate::config::ExportSettings;
use crate::error::{Error, Result};
use crate::gateway::{ChatGateway, Direction, StatusSink};
use crate::history::HistoryWalker;
use crate::progress::ProgressReporter;
use crate::record::{HistoryMessage, MessageRecord};
use crate::writer::{
    channel_export_name, file_timestamp, output_dir, user_export_name, write_json_array,
    JsonArrayWriter,
};

/// Order in which history is read and records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOrder {
    /// First messages of the channel, written oldest-first.
    OldestFirst,
    /// Platform default, written newest-first.
    NewestFirst,
    /// Latest messages of the channel, written oldest-first.
    LatestChronological,
}

impl HistoryOrder {
    pub fn direction(self) -> Direction {
        match self {
            HistoryOrder::OldestFirst => Direction::Forward,
            HistoryOrder::NewestFirst | HistoryOrder::LatestChronological => Direction::Backward,
        }
    }
}

/// Whose messages are exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Channel,
    User(u64),
}

impl ExportScope {
    pub fn matches(&self, msg: &HistoryMessage) -> bool {
        match self {
            ExportScope::Channel => true,
            ExportScope::User(user_id) => msg.author_id() == *user_id,
        }
    }

    pub fn file_name(&self, channel_name: &str, stamp: &str) -> String {
        match self {
            ExportScope::Channel => channel_export_name(channel_name, stamp),
            ExportScope::User(user_id) => user_export_name(*user_id, stamp),
        }
    }

    /// Channel exports measure throughput by records written, user exports by
    /// messages scanned.
    pub fn rate_count(&self, exported: usize, scanned: usize) -> usize {
        match self {
            ExportScope::Channel => exported,
            ExportScope::User(_) => scanned,
        }
    }

    fn initial_text(&self, channel: &str) -> String {
        match self {
            ExportScope::Channel => format!("🔍 Starting to collect messages from #{}...", channel),
            ExportScope::User(user_id) => format!(
                "🔍 Starting to collect messages from user ID {} in #{}...",
                user_id, channel
            ),
        }
    }

    fn progress_text(&self, channel: &str, scanned: usize, matched: usize) -> String {
        match self {
            ExportScope::Channel => format!(
                "📥 Collecting messages from #{}: {} messages so far...",
                channel, matched
            ),
            ExportScope::User(user_id) => format!(
                "📥 Scanned {} messages, found {} from user ID {} in #{}...",
                scanned, matched, user_id, channel
            ),
        }
    }

    fn success_text(&self, channel: &str, report: &ExportReport) -> String {
        let secs = report.elapsed.as_secs_f64();
        match self {
            ExportScope::Channel => format!(
                "✅ Successfully exported {} messages from #{} to:\n`{}`\nTime taken: {:.2} seconds ({:.2} messages/sec)",
                report.exported,
                channel,
                report.path.display(),
                secs,
                report.rate
            ),
            ExportScope::User(user_id) => format!(
                "✅ Successfully exported {} messages from user ID {} in #{} to:\n`{}`\nTime taken: {:.2} seconds ({:.2} messages scanned/sec)",
                report.exported,
                user_id,
                channel,
                report.path.display(),
                secs,
                report.rate
            ),
        }
    }
}

/// Parameters distinguishing one save command from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportStrategy {
    pub order: HistoryOrder,
    pub scope: ExportScope,
}

impl ExportStrategy {
    /// Whole channel, oldest-first.
    pub fn channel() -> Self {
        Self {
            order: HistoryOrder::OldestFirst,
            scope: ExportScope::Channel,
        }
    }

    /// Most recent messages, written oldest-first.
    pub fn recent() -> Self {
        Self {
            order: HistoryOrder::LatestChronological,
            scope: ExportScope::Channel,
        }
    }

    /// One author's messages, in platform order.
    pub fn user(user_id: u64) -> Self {
        Self {
            order: HistoryOrder::NewestFirst,
            scope: ExportScope::User(user_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub channel_id: u64,
    /// Messages to read at most; `None` walks the whole history.
    pub limit: Option<usize>,
    pub strategy: ExportStrategy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub exported: usize,
    pub scanned: usize,
    pub elapsed: Duration,
    /// Messages per second, see [`ExportScope::rate_count`].
    pub rate: f64,
}

/// Terminal state of one export invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    ChannelNotFound,
    Empty { scanned: usize },
    WriteFailed { error: String },
    Written(ExportReport),
}

/// `count / elapsed`, or 0 when no measurable time has passed.
pub fn throughput(count: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

/// Where collected records go until the write step.
enum Collector {
    Buffered {
        path: PathBuf,
        records: Vec<MessageRecord>,
    },
    Streaming(JsonArrayWriter),
}

impl Collector {
    fn open(order: HistoryOrder, settings: &ExportSettings, path: &Path) -> Result<Self> {
        // Chronological output of the latest messages needs the full batch
        if settings.streaming && order != HistoryOrder::LatestChronological {
            Ok(Collector::Streaming(JsonArrayWriter::create(
                path,
                settings.batch_size,
            )?))
        } else {
            Ok(Collector::Buffered {
                path: path.to_path_buf(),
                records: Vec::new(),
            })
        }
    }

    fn push(&mut self, record: MessageRecord) -> Result<()> {
        match self {
            Collector::Buffered { records, .. } => {
                records.push(record);
                Ok(())
            }
            Collector::Streaming(writer) => writer.push(record),
        }
    }

    fn finish(self, order: HistoryOrder) -> Result<PathBuf> {
        match self {
            Collector::Buffered { path, mut records } => {
                if order == HistoryOrder::LatestChronological {
                    records.reverse();
                }
                write_json_array(&path, &records)?;
                Ok(path)
            }
            Collector::Streaming(writer) => writer.finish(),
        }
    }
}

async fn report_write_failure<S: StatusSink + ?Sized>(
    sink: &S,
    path: &Path,
    err: Error,
) -> Result<ExportOutcome> {
    warn!(path = %path.display(), "Failed to save export: {}", err);
    sink.send(&format!("❌ Error saving file: {}", err)).await?;
    Ok(ExportOutcome::WriteFailed {
        error: err.to_string(),
    })
}

/// Run one export: resolve the channel, walk its history, write the file and
/// report progress to `sink` along the way.
///
/// Not-found, empty and write-failure results are reported to the user and
/// returned as outcomes; any other error is returned to the caller.
pub async fn run_export<G, S>(
    gateway: &G,
    sink: &S,
    settings: &ExportSettings,
    request: &ExportRequest,
) -> Result<ExportOutcome>
where
    G: ChatGateway + ?Sized,
    S: StatusSink + ?Sized,
{
    let start = Instant::now();
    let ExportStrategy { order, scope } = request.strategy;

    let Some(channel) = gateway.channel(request.channel_id).await? else {
        let err = Error::ChannelNotFound(request.channel_id);
        sink.send(&format!("❌ {}.", err)).await?;
        return Ok(ExportOutcome::ChannelNotFound);
    };

    info!(
        channel_id = channel.id,
        channel = %channel.name,
        limit = ?request.limit,
        ?order,
        ?scope,
        "Starting export"
    );

    let mut progress = ProgressReporter::initialize(
        sink,
        &scope.initial_text(&channel.name),
        settings.progress_interval,
    )
    .await?;

    let stamp = file_timestamp(Local::now());
    let path = output_dir(settings).join(scope.file_name(&channel.name, &stamp));

    if scope == ExportScope::Channel {
        progress
            .update(
                &format!("📥 Collecting messages from #{}...", channel.name),
                false,
            )
            .await?;
    }

    let mut collector = match Collector::open(order, settings, &path) {
        Ok(collector) => collector,
        Err(err) => return report_write_failure(sink, &path, err).await,
    };

    let mut walker = HistoryWalker::new(
        gateway,
        channel.id,
        order.direction(),
        request.limit,
        settings.page_size,
    );
    let mut scanned = 0usize;
    let mut matched = 0usize;

    while let Some(msg) = walker.next().await? {
        scanned += 1;
        if scope.matches(&msg) {
            if let Err(err) = collector.push(msg.record) {
                return report_write_failure(sink, &path, err).await;
            }
            matched += 1;
        }
        progress
            .update(&scope.progress_text(&channel.name, scanned, matched), false)
            .await?;
    }

    info!(channel = %channel.name, scanned, matched, "Collection finished");

    if matched == 0 {
        drop(collector);
        match scope {
            ExportScope::Channel => {
                sink.send("❌ No messages found in the channel.").await?;
            }
            ExportScope::User(user_id) => {
                progress
                    .update(
                        &format!(
                            "❌ No messages found for user ID {} in #{} after scanning {} messages.",
                            user_id, channel.name, scanned
                        ),
                        true,
                    )
                    .await?;
            }
        }
        return Ok(ExportOutcome::Empty { scanned });
    }

    progress
        .update(&format!("💾 Writing {} messages to file...", matched), true)
        .await?;

    let path = match collector.finish(order) {
        Ok(path) => path,
        Err(err) => return report_write_failure(sink, &path, err).await,
    };

    let elapsed = start.elapsed();
    let report = ExportReport {
        rate: throughput(scope.rate_count(matched, scanned), elapsed),
        path,
        exported: matched,
        scanned,
        elapsed,
    };
    info!(
        path = %report.path.display(),
        exported = report.exported,
        scanned = report.scanned,
        elapsed_secs = report.elapsed.as_secs_f64(),
        "Saved export"
    );

    progress
        .update(&scope.success_text(&channel.name, &report), true)
        .await?;

    Ok(ExportOutcome::Written(report))
}
