//! UI layer: transcript rendering and the interactive watch loop.

pub mod transcript;
pub mod watch;

/// Returns the UI module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
