//! Use case layer: application workflows and orchestration.

pub mod bootstrap;
pub mod broadcast;
pub mod context;
pub mod contracts;
pub mod load_messages;
pub mod open_conversation;
pub mod poll_loop;
pub mod send_message;
pub mod session;
pub mod unread_count;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
