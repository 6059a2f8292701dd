//! Command dispatch: parse, gate, run and catch.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gateway::{ChatGateway, StatusSink};
use crate::metrics;

use super::export::ExportOutcome;
use super::parse::Command;
use super::{help, save_messages, save_user_messages};

/// Runs bot commands against a gateway with the startup configuration.
///
/// Holds no per-invocation state, so one dispatcher serves concurrent
/// invocations.
pub struct CommandDispatcher {
    config: Arc<Config>,
}

impl CommandDispatcher {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse message text with the configured prefix.
    pub fn parse(&self, text: &str) -> Option<Result<Command>> {
        Command::parse(&self.config.prefix, text)
    }

    /// Handle one incoming message text.
    ///
    /// `is_admin` is the platform's answer for the author. Returns the export
    /// outcome when a save command ran to a classified end.
    pub async fn handle_text<G, S>(
        &self,
        gateway: &G,
        sink: &S,
        text: &str,
        is_admin: bool,
    ) -> Option<ExportOutcome>
    where
        G: ChatGateway + ?Sized,
        S: StatusSink + ?Sized,
    {
        let command = match self.parse(text)? {
            Ok(command) => command,
            Err(err) => {
                if let Err(send_err) = sink.send(&format!("❌ {}", err)).await {
                    warn!("Failed to send usage error: {}", send_err);
                }
                return None;
            }
        };

        if self.config.require_admin && !is_admin {
            let err = Error::PermissionDenied("administrator".into());
            warn!(command = command.name(), "Rejected command from non-administrator");
            if let Err(send_err) = sink.send(&format!("❌ {}", err)).await {
                warn!("Failed to send permission error: {}", send_err);
            }
            return None;
        }

        self.dispatch(gateway, sink, command).await
    }

    /// Run a parsed command. Unclassified errors are reported to the user
    /// and logged; they never escape.
    pub async fn dispatch<G, S>(
        &self,
        gateway: &G,
        sink: &S,
        command: Command,
    ) -> Option<ExportOutcome>
    where
        G: ChatGateway + ?Sized,
        S: StatusSink + ?Sized,
    {
        let name = command.name();
        info!(command = name, ?command, "Running command");
        metrics::record_command_start(name);
        let start = Instant::now();

        let result = self.execute(gateway, sink, command).await;

        metrics::record_command_result(name, start.elapsed(), result.is_ok());

        match result {
            Ok(outcome) => {
                if let Some(outcome) = &outcome {
                    metrics::record_export(outcome);
                }
                outcome
            }
            Err(err) => {
                error!(command = name, error = ?err, "Command failed");
                if let Err(send_err) = sink.send(&format!("❌ An error occurred: {}", err)).await {
                    warn!("Failed to report error to user: {}", send_err);
                }
                None
            }
        }
    }

    async fn execute<G, S>(
        &self,
        gateway: &G,
        sink: &S,
        command: Command,
    ) -> Result<Option<ExportOutcome>>
    where
        G: ChatGateway + ?Sized,
        S: StatusSink + ?Sized,
    {
        let settings = &self.config.export;
        let outcome = match command {
            Command::SaveMessages { channel_id, limit } => {
                save_messages::save_messages(gateway, sink, settings, channel_id, limit).await?
            }
            Command::SaveRecent { channel_id, count } => {
                save_messages::save_recent(gateway, sink, settings, channel_id, count).await?
            }
            Command::SaveUserMessages {
                channel_id,
                user_id,
                limit,
            } => {
                save_user_messages::save_user_messages(
                    gateway, sink, settings, channel_id, user_id, limit,
                )
                .await?
            }
            Command::HelpSave => {
                help::run(sink, &self.config.prefix, &self.config.export).await?;
                return Ok(None);
            }
        };
        Ok(Some(outcome))
    }
}
