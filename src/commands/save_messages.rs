//! Save channel history: `save_messages` and `save_recent`.

use crate::config::ExportSettings;
use crate::error::Result;
use crate::gateway::{ChatGateway, StatusSink};

use super::export::{run_export, ExportOutcome, ExportRequest, ExportStrategy};

/// Save messages from a channel, oldest first; `limit = None` saves all.
pub async fn save_messages<G, S>(
    gateway: &G,
    sink: &S,
    settings: &ExportSettings,
    channel_id: u64,
    limit: Option<usize>,
) -> Result<ExportOutcome>
where
    G: ChatGateway + ?Sized,
    S: StatusSink + ?Sized,
{
    let request = ExportRequest {
        channel_id,
        limit,
        strategy: ExportStrategy::channel(),
    };
    run_export(gateway, sink, settings, &request).await
}

/// Save the most recent `count` messages (configured default when absent).
pub async fn save_recent<G, S>(
    gateway: &G,
    sink: &S,
    settings: &ExportSettings,
    channel_id: u64,
    count: Option<usize>,
) -> Result<ExportOutcome>
where
    G: ChatGateway + ?Sized,
    S: StatusSink + ?Sized,
{
    let request = ExportRequest {
        channel_id,
        limit: Some(count.unwrap_or(settings.recent_default)),
        strategy: ExportStrategy::recent(),
    };
    run_export(gateway, sink, settings, &request).await
}
