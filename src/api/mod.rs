//! Chat backend integration layer: REST client and wire mapping.

mod endpoints;
mod gateway;
mod wire;

pub use gateway::RestGateway;

/// Returns the api module name for smoke checks.
pub fn module_name() -> &'static str {
    "api"
}
