//! Domain layer: conversation entities and buffer rules.

pub mod composer;
pub mod conversation;
pub mod conversation_buffer;
pub mod display_mapper;
pub mod message;
pub mod open_conversation_state;
pub mod pagination;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
