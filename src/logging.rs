//! Tracing bootstrap for the binaries.
//!
//! The filter comes from `RUST_LOG` and falls back to `info`. Events go to
//! stderr so rendered charts on stdout stay clean.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber once per process.
///
/// Returns `Ok(true)` when this call installed it and `Ok(false)` when an
/// earlier call already had.
pub fn init() -> Result<bool, String> {
    if INSTALLED.get().is_some() {
        return Ok(false);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .map_err(|err| format!("invalid log filter: {err}"))?;

    let mut installed_now = false;
    INSTALLED.get_or_init(|| {
        installed_now = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok();
    });
    Ok(installed_now)
}
