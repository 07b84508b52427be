//! Tracing subscriber setup
//!
//! The library itself only emits `tracing` events. Embedders (servers, CLIs, tests)
//! call [`init_tracing`] once to get formatted output filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g. `"info"` or
/// `"pagegraph_core=debug"`) is used.
///
/// # Errors
///
/// Fails if the directive does not parse or a global subscriber is already installed.
pub fn init_tracing(default_directive: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(())
}
