//! `help_save`: static overview of the saving commands.

use std::path::Path;

use crate::config::ExportSettings;
use crate::error::Result;
use crate::gateway::{Card, StatusSink};
use crate::writer;

pub const HELP_TITLE: &str = "Message Saving Commands";
pub const HELP_DESCRIPTION: &str =
    "High-performance commands for saving Discord messages to JSON files";
/// Embed colour (green).
pub const HELP_COLOUR: u32 = 0x2ECC71;

/// Command usage (without prefix) → description.
pub const COMMAND_HELP: &[(&str, &str)] = &[
    (
        "save_messages [channel_id] [limit]",
        "Save messages from a channel (limit is optional)",
    ),
    (
        "save_recent [channel_id] [message_count]",
        "Save the most recent messages from a channel (default: 1000)",
    ),
    (
        "save_user_messages [channel_id] [user_id] [limit]",
        "Save messages from a specific user in a channel",
    ),
];

const EXTRA_SECTIONS: &[(&str, &str)] = &[
    (
        "Performance Features",
        "• Optimized for speed and reliability\n• Progress tracking\n• Performance metrics",
    ),
];

/// Build the help card for the given command prefix and export directory.
pub fn help_card(prefix: &str, output_dir: &Path) -> Card {
    let fields = COMMAND_HELP
        .iter()
        .map(|(usage, description)| (format!("{}{}", prefix, usage), description.to_string()))
        .chain(
            EXTRA_SECTIONS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        )
        .chain(std::iter::once((
            "Note".to_string(),
            format!(
                "All files are saved to `{}` as simplified JSON (AI-friendly)",
                output_dir.display()
            ),
        )))
        .collect();

    Card {
        title: HELP_TITLE,
        description: HELP_DESCRIPTION,
        colour: HELP_COLOUR,
        fields,
    }
}

pub async fn run<S: StatusSink + ?Sized>(
    sink: &S,
    prefix: &str,
    settings: &ExportSettings,
) -> Result<()> {
    sink.send_card(&help_card(prefix, &writer::output_dir(settings)))
        .await
}
