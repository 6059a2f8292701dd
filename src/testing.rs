//! In-memory gateway and sink used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::gateway::{
    Card, ChannelInfo, ChatGateway, Direction, PageRequest, StatusHandle, StatusSink,
};
use crate::record::{HistoryMessage, MessageRecord};

/// `count` messages with IDs `1..=count`, authors alternating 100/200.
pub fn history(count: usize) -> Vec<HistoryMessage> {
    (1..=count as u64)
        .map(|id| message(id, if id % 2 == 0 { 200 } else { 100 }))
        .collect()
}

pub fn message(id: u64, author_id: u64) -> HistoryMessage {
    HistoryMessage::new(
        id,
        MessageRecord {
            content: format!("message {id}"),
            author: format!("user{author_id}"),
            author_id,
            timestamp: format!("2024-01-01T00:00:{:02}+00:00", id % 60),
            attachments: if id % 3 == 0 {
                vec![format!("https://cdn.example/{id}.png")]
            } else {
                Vec::new()
            },
            jump_url: format!("https://discord.com/channels/9/1/{id}"),
        },
    )
}

#[derive(Default)]
pub struct FakeGateway {
    channels: HashMap<u64, (String, Vec<HistoryMessage>)>,
    requests: Mutex<Vec<PageRequest>>,
    fail_after_pages: Option<usize>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// `messages` must be ordered oldest-first.
    pub fn with_channel(mut self, id: u64, name: &str, messages: Vec<HistoryMessage>) -> Self {
        self.channels.insert(id, (name.to_string(), messages));
        self
    }

    pub fn failing_after_pages(mut self, pages: usize) -> Self {
        self.fail_after_pages = Some(pages);
        self
    }

    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatGateway for FakeGateway {
    async fn channel(&self, channel_id: u64) -> Result<Option<ChannelInfo>> {
        Ok(self.channels.get(&channel_id).map(|(name, _)| ChannelInfo {
            id: channel_id,
            name: name.clone(),
        }))
    }

    async fn fetch_page(
        &self,
        channel_id: u64,
        request: PageRequest,
    ) -> Result<Vec<HistoryMessage>> {
        let served = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };
        if self.fail_after_pages.is_some_and(|n| served >= n) {
            return Err(Error::DiscordError("503 Service Unavailable".into()));
        }

        let (_, messages) = self
            .channels
            .get(&channel_id)
            .ok_or(Error::ChannelNotFound(channel_id))?;
        let limit = request.limit as usize;
        let page = match request.direction {
            Direction::Forward => {
                let after = request.cursor.unwrap_or(0);
                messages
                    .iter()
                    .filter(|m| m.id > after)
                    .take(limit)
                    .cloned()
                    .collect()
            }
            Direction::Backward => {
                let before = request.cursor.unwrap_or(u64::MAX);
                messages
                    .iter()
                    .rev()
                    .filter(|m| m.id < before)
                    .take(limit)
                    .cloned()
                    .collect()
            }
        };
        Ok(page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Sent(String),
    Edited(String),
    Card(Card),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
    next_id: AtomicU64,
    fail_edits: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_edits() -> Self {
        Self {
            fail_edits: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Edited(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn sent(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Sent(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Last text shown to the user, sent or edited.
    pub fn last_text(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            SinkEvent::Sent(text) | SinkEvent::Edited(text) => Some(text),
            SinkEvent::Card(_) => None,
        })
    }
}

#[async_trait]
impl StatusSink for RecordingSink {
    async fn send(&self, text: &str) -> Result<StatusHandle> {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Sent(text.to_string()));
        Ok(StatusHandle(self.next_id.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn edit(&self, _handle: StatusHandle, text: &str) -> Result<()> {
        if self.fail_edits {
            return Err(Error::DiscordError("Unknown Message".into()));
        }
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Edited(text.to_string()));
        Ok(())
    }

    async fn send_card(&self, card: &Card) -> Result<()> {
        self.events.lock().unwrap().push(SinkEvent::Card(card.clone()));
        Ok(())
    }
}
