//! Logging initialization
//!
//! The engine itself only emits `tracing` events; a host application
//! calls [`init`] once at startup to get formatted output with env-filter
//! support (`RUST_LOG=chorequest=debug`).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// Safe to call from a host binary's `main`; panics if a global
/// subscriber is already set, so call it exactly once.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chorequest=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("chorequest logging initialized");
}
