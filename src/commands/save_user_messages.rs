//! Save one user's messages from a channel: `save_user_messages`.

use crate::config::ExportSettings;
use crate::error::Result;
use crate::gateway::{ChatGateway, StatusSink};

use super::export::{run_export, ExportOutcome, ExportRequest, ExportStrategy};

/// Scan up to `limit` messages (all when `None`) and save those written by
/// `user_id`, in platform order.
pub async fn save_user_messages<G, S>(
    gateway: &G,
    sink: &S,
    settings: &ExportSettings,
    channel_id: u64,
    user_id: u64,
    limit: Option<usize>,
) -> Result<ExportOutcome>
where
    G: ChatGateway + ?Sized,
    S: StatusSink + ?Sized,
{
    let request = ExportRequest {
        channel_id,
        limit,
        strategy: ExportStrategy::user(user_id),
    };
    run_export(gateway, sink, settings, &request).await
}
