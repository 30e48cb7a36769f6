//! Structured logging setup shared by every binary.

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "agri_advisory=info,tower_http=info";

/// Initialise the `tracing` subscriber.
///
/// `RUST_LOG` overrides the default filter; `AGRI_LOG_JSON` switches to
/// JSON lines. Safe to call more than once (later calls are no-ops).
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json_logging = std::env::var("AGRI_LOG_JSON").is_ok();

    let _ = if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init()
    } else {
        fmt().with_env_filter(env_filter).with_target(true).try_init()
    };
}
