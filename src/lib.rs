//! shoji is a dynamic tiling window manager core: tagged workspaces,
//! master/stack and monocle layouts, and multi-output support, driven
//! entirely through a mockable display-server connection.
//!
//! The crate is backend-agnostic. A backend implements
//! [`server::Connection`] and feeds [`event::Notification`]s to a
//! [`Dispatcher`]; everything else, from layout arithmetic to focus
//! policy, lives here and is exercised by tests against a mock server.

pub mod bar;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod event;
pub mod server;
pub mod spawn;

pub use config::{Action, Config};
pub use dispatch::Dispatcher;

/// Initialize stderr logging, honoring `RUST_LOG` and defaulting to
/// `info`.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
