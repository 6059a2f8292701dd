//! Fake gateway and status sink built on the public traits.

use std::sync::Mutex;

use async_trait::async_trait;
use discord_exporter::{
    error::{Error, Result},
    Card, ChannelInfo, ChatGateway, Direction, ExportSettings, HistoryMessage, MessageRecord,
    PageRequest, StatusHandle, StatusSink,
};

pub fn msg(id: u64, author_id: u64) -> HistoryMessage {
    HistoryMessage::new(
        id,
        MessageRecord {
            content: format!("text {id}"),
            author: format!("member{author_id}"),
            author_id,
            timestamp: format!("2024-05-01T12:00:{:02}+00:00", id % 60),
            attachments: Vec::new(),
            jump_url: format!("https://discord.com/channels/1/10/{id}"),
        },
    )
}

pub fn settings(dir: &std::path::Path) -> ExportSettings {
    ExportSettings {
        output_dir: Some(dir.to_path_buf()),
        ..ExportSettings::default()
    }
}

/// One channel whose history is held oldest-first.
pub struct OneChannel {
    pub id: u64,
    pub name: String,
    pub messages: Vec<HistoryMessage>,
    pub pages: Mutex<usize>,
    pub broken: bool,
}

impl OneChannel {
    pub fn new(id: u64, name: &str, messages: Vec<HistoryMessage>) -> Self {
        Self {
            id,
            name: name.to_string(),
            messages,
            pages: Mutex::new(0),
            broken: false,
        }
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    pub fn pages(&self) -> usize {
        *self.pages.lock().unwrap()
    }
}

#[async_trait]
impl ChatGateway for OneChannel {
    async fn channel(&self, channel_id: u64) -> Result<Option<ChannelInfo>> {
        Ok((channel_id == self.id).then(|| ChannelInfo {
            id: self.id,
            name: self.name.clone(),
        }))
    }

    async fn fetch_page(
        &self,
        _channel_id: u64,
        request: PageRequest,
    ) -> Result<Vec<HistoryMessage>> {
        *self.pages.lock().unwrap() += 1;
        if self.broken {
            return Err(Error::DiscordError("Missing Access".into()));
        }
        let limit = request.limit as usize;
        let page = match request.direction {
            Direction::Forward => self
                .messages
                .iter()
                .filter(|m| m.id > request.cursor.unwrap_or(0))
                .take(limit)
                .cloned()
                .collect(),
            Direction::Backward => self
                .messages
                .iter()
                .rev()
                .filter(|m| m.id < request.cursor.unwrap_or(u64::MAX))
                .take(limit)
                .cloned()
                .collect(),
        };
        Ok(page)
    }
}

/// Sink remembering every text in order; edits included.
#[derive(Default)]
pub struct Transcript {
    pub texts: Mutex<Vec<String>>,
    pub cards: Mutex<Vec<Card>>,
}

impl Transcript {
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn last(&self) -> String {
        self.texts().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl StatusSink for Transcript {
    async fn send(&self, text: &str) -> Result<StatusHandle> {
        let mut texts = self.texts.lock().unwrap();
        texts.push(text.to_string());
        Ok(StatusHandle(texts.len() as u64))
    }

    async fn edit(&self, _handle: StatusHandle, text: &str) -> Result<()> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_card(&self, card: &Card) -> Result<()> {
        self.cards.lock().unwrap().push(card.clone());
        Ok(())
    }
}

pub fn read_records(path: &std::path::Path) -> Vec<MessageRecord> {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

pub fn ids_of(records: &[MessageRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.jump_url.rsplit('/').next().unwrap().to_string())
        .collect()
}
