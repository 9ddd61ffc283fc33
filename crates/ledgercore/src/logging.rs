//! Logging setup.
//!
//! The library only emits `tracing` events. Installing a subscriber is the
//! application's choice; `init` is a convenience for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber.
///
/// Uses `filter` when given, otherwise `RUST_LOG`, otherwise `info`. Returns
/// false if a global subscriber was already installed.
pub fn init(filter: Option<&str>) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
