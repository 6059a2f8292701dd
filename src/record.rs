//! Exported message records.

use serde::{Deserialize, Serialize};

/// One exported message, captured verbatim from the platform at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub content: String,
    /// Display form of the author (`name` or `name#1234`).
    pub author: String,
    pub author_id: u64,
    /// ISO-8601 creation time.
    pub timestamp: String,
    /// Attachment URLs in message order; serialized as `[]` when empty.
    #[serde(default)]
    pub attachments: Vec<String>,
    pub jump_url: String,
}

/// A record together with the platform message ID used for paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    pub id: u64,
    pub record: MessageRecord,
}

impl HistoryMessage {
    pub fn new(id: u64, record: MessageRecord) -> Self {
        Self { id, record }
    }

    pub fn author_id(&self) -> u64 {
        self.record.author_id
    }
}
