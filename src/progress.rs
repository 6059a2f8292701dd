//! Rate-limited progress reporting.
//!
//! A single status message is sent when a command starts and edited in place
//! as work advances. Non-forced updates are dropped unless the configured
//! interval has passed since the last edit; forced updates always go out.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::Result;
use crate::gateway::{StatusHandle, StatusSink};

pub struct ProgressReporter<'s, S: StatusSink + ?Sized> {
    sink: &'s S,
    handle: StatusHandle,
    last_update: Instant,
    interval: Duration,
}

impl<'s, S: StatusSink + ?Sized> ProgressReporter<'s, S> {
    /// Send the initial status message and start the interval clock.
    pub async fn initialize(sink: &'s S, initial_text: &str, interval: Duration) -> Result<Self> {
        let handle = sink.send(initial_text).await?;
        Ok(Self {
            sink,
            handle,
            last_update: Instant::now(),
            interval,
        })
    }

    /// Edit the status message if forced or if the interval has elapsed.
    ///
    /// Returns whether an edit was sent. Edit failures are not retried.
    pub async fn update(&mut self, text: &str, force: bool) -> Result<bool> {
        let now = Instant::now();
        if !force && now.duration_since(self.last_update) < self.interval {
            return Ok(false);
        }

        self.sink.edit(self.handle, text).await?;
        self.last_update = now;
        Ok(true)
    }

    pub fn handle(&self) -> StatusHandle {
        self.handle
    }
}
