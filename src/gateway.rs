//! Seams between the exporter and the chat platform.
//!
//! [`ChatGateway`] reads channels and history pages, [`StatusSink`] talks back
//! to the context a command was invoked from. The `discord` module implements
//! both on top of serenity; tests use in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::record::HistoryMessage;

/// Resolved channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: u64,
    pub name: String,
}

/// Direction of a history walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From the oldest message towards the newest.
    Forward,
    /// From the newest message towards the oldest (platform default).
    Backward,
}

/// One history page request.
///
/// `cursor` is the ID of the last message already seen; `None` starts at the
/// beginning (forward) or at the newest message (backward). Implementations
/// return at most `limit` messages ordered in walk direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub direction: Direction,
    pub cursor: Option<u64>,
    pub limit: u8,
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Look a channel up; `Ok(None)` when it does not exist or is not visible.
    async fn channel(&self, channel_id: u64) -> Result<Option<ChannelInfo>>;

    async fn fetch_page(&self, channel_id: u64, request: PageRequest)
        -> Result<Vec<HistoryMessage>>;
}

/// Handle of a sent status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusHandle(pub u64);

/// Static rich card (embed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: &'static str,
    pub description: &'static str,
    pub colour: u32,
    pub fields: Vec<(String, String)>,
}

#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<StatusHandle>;

    async fn edit(&self, handle: StatusHandle, text: &str) -> Result<()>;

    async fn send_card(&self, card: &Card) -> Result<()>;
}
