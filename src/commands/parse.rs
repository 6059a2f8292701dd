//! Text command parsing.

use crate::error::{Error, Result};

/// A recognized bot command with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SaveMessages {
        channel_id: u64,
        limit: Option<usize>,
    },
    SaveRecent {
        channel_id: u64,
        count: Option<usize>,
    },
    SaveUserMessages {
        channel_id: u64,
        user_id: u64,
        limit: Option<usize>,
    },
    HelpSave,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SaveMessages { .. } => "save_messages",
            Command::SaveRecent { .. } => "save_recent",
            Command::SaveUserMessages { .. } => "save_user_messages",
            Command::HelpSave => "help_save",
        }
    }

    /// Parse `text` as a command invocation.
    ///
    /// Returns `None` when the text is not addressed to the bot or names an
    /// unknown command, `Some(Err(_))` when arguments are malformed. Extra
    /// trailing arguments are ignored.
    pub fn parse(prefix: &str, text: &str) -> Option<Result<Command>> {
        let rest = text.trim().strip_prefix(prefix)?;
        // The command name must follow the prefix directly
        if rest.starts_with(char::is_whitespace) {
            return None;
        }
        let mut parts = rest.split_whitespace();
        let name = parts.next()?;
        let args: Vec<&str> = parts.collect();

        let parsed = match name {
            "save_messages" => parse_save_messages(&args),
            "save_recent" => parse_save_recent(&args),
            "save_user_messages" => parse_save_user_messages(&args),
            "help_save" => Ok(Command::HelpSave),
            _ => return None,
        };

        Some(parsed.map_err(|reason| {
            Error::InvalidArgument(format!("{}. Usage: `{}{}`", reason, prefix, usage(name)))
        }))
    }
}

fn usage(name: &str) -> &'static str {
    match name {
        "save_messages" => "save_messages <channel_id> [limit]",
        "save_recent" => "save_recent <channel_id> [message_count]",
        "save_user_messages" => "save_user_messages <channel_id> <user_id> [limit]",
        _ => "help_save",
    }
}

fn required_id(args: &[&str], index: usize, what: &str) -> std::result::Result<u64, String> {
    let raw = args
        .get(index)
        .ok_or_else(|| format!("{} is a required argument that is missing", what))?;
    strip_mention(raw)
        .parse::<u64>()
        .map_err(|_| format!("{} must be a numeric ID, got `{}`", what, raw))
}

/// Unwrap one `<#id>`, `<@id>` or `<@!id>` mention; other text is returned as is.
fn strip_mention(raw: &str) -> &str {
    raw.strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .and_then(|inner| {
            inner
                .strip_prefix("@!")
                .or_else(|| inner.strip_prefix('@'))
                .or_else(|| inner.strip_prefix('#'))
        })
        .unwrap_or(raw)
}

fn optional_count(args: &[&str], index: usize, what: &str) -> std::result::Result<Option<usize>, String> {
    match args.get(index) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<usize>()
            .map(Some)
            .map_err(|_| format!("{} must be a non-negative number, got `{}`", what, raw)),
    }
}

fn parse_save_messages(args: &[&str]) -> std::result::Result<Command, String> {
    Ok(Command::SaveMessages {
        channel_id: required_id(args, 0, "channel_id")?,
        limit: optional_count(args, 1, "limit")?,
    })
}

fn parse_save_recent(args: &[&str]) -> std::result::Result<Command, String> {
    Ok(Command::SaveRecent {
        channel_id: required_id(args, 0, "channel_id")?,
        count: optional_count(args, 1, "message_count")?,
    })
}

fn parse_save_user_messages(args: &[&str]) -> std::result::Result<Command, String> {
    Ok(Command::SaveUserMessages {
        channel_id: required_id(args, 0, "channel_id")?,
        user_id: required_id(args, 1, "user_id")?,
        limit: optional_count(args, 2, "limit")?,
    })
}
