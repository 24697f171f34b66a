//! Structured logging initialization.
//!
//! Thin wrapper over `tracing-subscriber`: a compact fmt layer behind an
//! `EnvFilter`. `RUST_LOG` takes precedence over the configured level, so
//! a deployed driver can be turned up without editing configuration.
//!
//! Initialization is idempotent — a second call (common in tests, where
//! several integration files may race to install a subscriber) returns
//! `Ok(())` instead of failing.

use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Initialize logging with `default_level` as the fallback filter.
///
/// `default_level` accepts anything `EnvFilter` does ("info",
/// "rust_sdr=debug", ...); the `RUST_LOG` environment variable wins when
/// set.
pub fn init(default_level: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer()
        .compact()
        .with_thread_names(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .or_else(|e| {
            // already-initialized is expected when tests share a process
            if e.to_string()
                .contains("a global default trace dispatcher has already been set")
            {
                Ok(())
            } else {
                Err(format!("failed to initialize logging: {e}"))
            }
        })
}
