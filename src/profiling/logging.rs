//! Tracing initialization

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter, e.g. `STRPROFILER_LOG=strprofiler=debug`
pub const LOG_ENV_VAR: &str = "STRPROFILER_LOG";

static INIT: Once = Once::new();

/// Install the global tracing subscriber.
///
/// Falls back to `strprofiler=info` when `STRPROFILER_LOG` is unset or
/// invalid. Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("strprofiler=info"));

        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .with(filter)
            .try_init();
    });
}
