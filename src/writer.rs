//! JSON export files: output location, file names and writers.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExportSettings;
use crate::error::Result;
use crate::record::MessageRecord;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\-]").expect("valid filename regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Platform downloads folder: `~/Downloads` on Windows and Unix-likes,
/// the current directory elsewhere or when no home directory is known.
pub fn downloads_dir() -> PathBuf {
    if cfg!(any(windows, unix)) {
        if let Some(home) = dirs_next::home_dir() {
            return home.join("Downloads");
        }
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Configured output directory, falling back to [`downloads_dir`].
pub fn output_dir(settings: &ExportSettings) -> PathBuf {
    settings.output_dir.clone().unwrap_or_else(downloads_dir)
}

/// Sanitize a channel name to a safe filename part.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(name, "");
    let result = WHITESPACE.replace_all(cleaned.trim(), "_");
    let truncated: String = result.chars().take(50).collect();
    if truncated.is_empty() {
        "unknown_channel".to_string()
    } else {
        truncated
    }
}

/// Second-resolution stamp used in export file names.
pub fn file_timestamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

pub fn channel_export_name(channel_name: &str, stamp: &str) -> String {
    format!(
        "discord_messages_{}_{}.json",
        sanitize_filename(channel_name),
        stamp
    )
}

pub fn user_export_name(user_id: u64, stamp: &str) -> String {
    format!("discord_user_{}_messages_{}.json", user_id, stamp)
}

/// Write the whole batch as one pretty-printed (2-space) JSON array.
pub fn write_json_array(path: &Path, records: &[MessageRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, records)?;
    out.flush()?;
    Ok(())
}

/// Incremental writer producing the same bytes as [`write_json_array`].
///
/// Records go to `<path>.part` in batches; [`finish`](Self::finish) renames it
/// to `path`. A writer dropped without finishing removes its part file, so an
/// interrupted export never leaves a file behind.
pub struct JsonArrayWriter {
    path: PathBuf,
    part_path: PathBuf,
    out: Option<BufWriter<File>>,
    pending: Vec<MessageRecord>,
    batch_size: usize,
    written: usize,
}

impl JsonArrayWriter {
    pub fn create(path: &Path, batch_size: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut part = path.as_os_str().to_owned();
        part.push(".part");
        let part_path = PathBuf::from(part);

        let mut out = BufWriter::new(File::create(&part_path)?);
        out.write_all(b"[")?;

        Ok(Self {
            path: path.to_path_buf(),
            part_path,
            out: Some(out),
            pending: Vec::with_capacity(batch_size.min(1024)),
            batch_size: batch_size.max(1),
            written: 0,
        })
    }

    pub fn push(&mut self, record: MessageRecord) -> Result<()> {
        self.pending.push(record);
        if self.pending.len() >= self.batch_size {
            self.flush_batch()?;
        }
        Ok(())
    }

    /// Records accepted so far.
    pub fn len(&self) -> usize {
        self.written + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn part_path(&self) -> &Path {
        &self.part_path
    }

    /// Close the array and move the file into place.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.flush_batch()?;
        if let Some(out) = self.out.as_mut() {
            out.write_all(if self.written == 0 { b"]" } else { b"\n]" })?;
            out.flush()?;
        }
        // Close before the rename
        self.out.take();
        if let Err(err) = fs::rename(&self.part_path, &self.path) {
            let _ = fs::remove_file(&self.part_path);
            return Err(err.into());
        }
        Ok(self.path.clone())
    }

    fn flush_batch(&mut self) -> Result<()> {
        let Some(out) = self.out.as_mut() else {
            return Ok(());
        };
        for record in self.pending.drain(..) {
            out.write_all(if self.written == 0 { b"\n" } else { b",\n" })?;
            let pretty = serde_json::to_string_pretty(&record)?;
            for (i, line) in pretty.lines().enumerate() {
                if i > 0 {
                    out.write_all(b"\n")?;
                }
                out.write_all(b"  ")?;
                out.write_all(line.as_bytes())?;
            }
            self.written += 1;
        }
        out.flush()?;
        Ok(())
    }
}

impl Drop for JsonArrayWriter {
    fn drop(&mut self) {
        if self.out.take().is_some() {
            if let Err(err) = fs::remove_file(&self.part_path) {
                tracing::warn!(path = %self.part_path.display(), "Failed to remove part file: {}", err);
            }
        }
    }
}
