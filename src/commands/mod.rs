//! Command implementations
//!
//! All bot commands are implemented here. `dispatch` routes a parsed
//! [`Command`] to its module; the save commands share the `export` pipeline.

pub mod dispatch;
pub mod export;
pub mod help;
pub mod parse;
pub mod save_messages;
pub mod save_user_messages;

// Re-export commonly used types
pub use dispatch::CommandDispatcher;
pub use export::{
    run_export, throughput, ExportOutcome, ExportReport, ExportRequest, ExportScope,
    ExportStrategy, HistoryOrder,
};
pub use parse::Command;
pub use save_messages::{save_messages, save_recent};
pub use save_user_messages::save_user_messages;
