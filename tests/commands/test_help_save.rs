//! Tests for help_save and text dispatch

use std::sync::Arc;

use discord_exporter::commands::{help, CommandDispatcher, ExportOutcome};
use discord_exporter::Config;

use super::support::{msg, settings, OneChannel, Transcript};

#[tokio::test]
async fn test_help_card_lists_commands_with_prefix() {
    let sink = Transcript::default();

    let dir = tempfile::tempdir().unwrap();
    help::run(&sink, "?", &settings(dir.path())).await.unwrap();

    let cards = sink.cards.lock().unwrap().clone();
    assert_eq!(cards.len(), 1);
    let card = &cards[0];
    assert_eq!(card.title, "Message Saving Commands");
    assert_eq!(card.colour, 0x2ECC71);
    let names: Vec<&str> = card.fields.iter().map(|(name, _)| name.as_str()).collect();
    assert!(names.contains(&"?save_messages [channel_id] [limit]"));
    assert!(names.contains(&"?save_recent [channel_id] [message_count]"));
    assert!(names.contains(&"?save_user_messages [channel_id] [user_id] [limit]"));
    let note = &card.fields.last().unwrap().1;
    assert!(note.contains(&dir.path().display().to_string()));
    assert!(sink.texts().is_empty());
}

fn dispatcher(dir: &std::path::Path) -> CommandDispatcher {
    let mut config = Config::from_yaml("").unwrap().with_token("test-token");
    config.export = settings(dir);
    CommandDispatcher::new(Arc::new(config))
}

#[tokio::test]
async fn test_dispatch_help_save() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = OneChannel::new(10, "general", Vec::new());
    let sink = Transcript::default();

    let outcome = dispatcher(dir.path())
        .handle_text(&gateway, &sink, "!help_save", true)
        .await;

    assert!(outcome.is_none());
    assert_eq!(sink.cards.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_dispatch_requires_admin() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = OneChannel::new(10, "general", vec![msg(1, 1)]);
    let sink = Transcript::default();

    let outcome = dispatcher(dir.path())
        .handle_text(&gateway, &sink, "!save_messages 10", false)
        .await;

    assert!(outcome.is_none());
    assert_eq!(
        sink.texts(),
        vec!["❌ You need administrator permissions to use this command."]
    );
    assert_eq!(gateway.pages(), 0);
}

#[tokio::test]
async fn test_dispatch_save_messages() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = OneChannel::new(10, "general", vec![msg(1, 1), msg(2, 2)]);
    let sink = Transcript::default();

    let outcome = dispatcher(dir.path())
        .handle_text(&gateway, &sink, "!save_messages <#10>", true)
        .await;

    assert!(matches!(outcome, Some(ExportOutcome::Written(ref r)) if r.exported == 2));
}

#[tokio::test]
async fn test_dispatch_reports_errors_to_user() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = OneChannel::new(10, "general", vec![msg(1, 1)]).broken();
    let sink = Transcript::default();

    let outcome = dispatcher(dir.path())
        .handle_text(&gateway, &sink, "!save_messages 10", true)
        .await;

    assert!(outcome.is_none());
    assert_eq!(sink.last(), "❌ An error occurred: Discord API error: Missing Access");
}
