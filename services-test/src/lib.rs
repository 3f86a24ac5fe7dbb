//! Shared test-only utilities for the services consensus workspace.
//!
//! This crate is intentionally dependency-light: `services-chain` and
//! `services-store` depend on it from their `dev-dependencies`, so it must
//! not depend back on either.

use std::sync::Once;

pub mod vectors;

static INIT: Once = Once::new();

/// Initialize global test state: a `tracing` subscriber that prints spans
/// on panic, plus `color_eyre`'s panic/error hooks. Call at the top of any
/// test that wants readable output when something goes wrong; calling it
/// more than once is harmless.
pub fn init() {
    INIT.call_once(|| {
            let fmt_layer = tracing_subscriber::fmt::Layer::default();
            use tracing_subscriber::layer::SubscriberExt;
            let subscriber = tracing_subscriber::Registry::default()
            .with(tracing_error::ErrorLayer::default())
            .with(fmt_layer);
            tracing::subscriber::set_global_default(subscriber)
            .expect("setting a global tracing subscriber should only be done once");

            if color_eyre::install().is_err() {
                // Some other test already installed the hook; that's fine.
            }
    });
}

