//! Observability infrastructure: tracing initialization.
//!
//! Embedding daemons and CLIs call [`init`] once at startup; every engine in
//! this crate logs through `tracing` and assumes a subscriber is installed.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`; defaults to `info` when unset.
///
/// # Panics
/// Panics if called more than once.
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(true).with_level(true))
        .init();

    tracing::info!("Observability initialized");
}
