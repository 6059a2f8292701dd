//! Discord Channel History Exporter Library
//!
//! This library provides tools to:
//! - Export a channel's message history to a JSON file
//! - Export the most recent messages of a channel
//! - Export one user's messages from a channel
//! - Report progress in Discord with rate-limited status edits
//! - Expose Prometheus metrics for the running bot

pub mod config;
pub mod discord;
pub mod error;
pub mod gateway;
pub mod history;
pub mod metrics;
pub mod progress;
pub mod record;
pub mod writer;

#[cfg(test)]
mod testing;

// Re-export common types
pub use config::{Config, ExportSettings};
pub use error::{Error, Result};
pub use gateway::{Card, ChannelInfo, ChatGateway, Direction, PageRequest, StatusHandle, StatusSink};
pub use history::HistoryWalker;
pub use progress::ProgressReporter;
pub use record::{HistoryMessage, MessageRecord};

// Commands module uses re-exported types, so it must be declared after the re-exports
pub mod commands;
