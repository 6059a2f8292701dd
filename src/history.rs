//! Paginated channel history walk.

use std::collections::VecDeque;

use crate::error::Result;
use crate::gateway::{ChatGateway, Direction, PageRequest};
use crate::record::HistoryMessage;

/// Walks a channel's history page by page, in one direction, up to an
/// optional limit.
///
/// ```ignore
/// let mut walker = HistoryWalker::new(gateway, channel_id, Direction::Forward, Some(500), 100);
/// while let Some(msg) = walker.next().await? {
///     // ...
/// }
/// ```
pub struct HistoryWalker<'g, G: ChatGateway + ?Sized> {
    gateway: &'g G,
    channel_id: u64,
    direction: Direction,
    remaining: Option<usize>,
    page_size: u8,
    cursor: Option<u64>,
    buffer: VecDeque<HistoryMessage>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<'g, G: ChatGateway + ?Sized> HistoryWalker<'g, G> {
    pub fn new(
        gateway: &'g G,
        channel_id: u64,
        direction: Direction,
        limit: Option<usize>,
        page_size: u8,
    ) -> Self {
        Self {
            gateway,
            channel_id,
            direction,
            remaining: limit,
            page_size: page_size.max(1),
            cursor: None,
            buffer: VecDeque::new(),
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// Next message in walk order, `None` once the limit is reached or the
    /// history is exhausted. Every page fetch is a suspension point.
    pub async fn next(&mut self) -> Result<Option<HistoryMessage>> {
        if self.remaining == Some(0) {
            return Ok(None);
        }

        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_page().await?;
        }

        let Some(msg) = self.buffer.pop_front() else {
            return Ok(None);
        };
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Ok(Some(msg))
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let want = match self.remaining {
            Some(remaining) => remaining.min(self.page_size as usize) as u8,
            None => self.page_size,
        };

        let request = PageRequest {
            direction: self.direction,
            cursor: self.cursor,
            limit: want,
        };
        let page = self.gateway.fetch_page(self.channel_id, request).await?;
        self.pages_fetched += 1;

        tracing::debug!(
            channel_id = self.channel_id,
            requested = want,
            received = page.len(),
            "fetched history page"
        );

        // A short page means there is nothing further in this direction
        if page.len() < want as usize {
            self.exhausted = true;
        }
        match page.last() {
            Some(last) => self.cursor = Some(last.id),
            None => self.exhausted = true,
        }

        // Never hand out more than was asked for
        self.buffer.extend(page.into_iter().take(want as usize));
        Ok(())
    }
}
