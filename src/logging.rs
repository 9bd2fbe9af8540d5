//! Logging initialization.
//!
//! The subscriber is installed before configuration loads, so warnings
//! emitted during settings resolution (a missing environment overlay, for
//! one) are visible. The filter starts at WARN and is switched to the
//! validated `logging.level` once settings exist. `RUST_LOG` wins when set,
//! so a one-off run can raise verbosity without touching configuration
//! files.

use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::core::config::LogLevel;

static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Install the global subscriber. Called before settings load; events keep
/// flowing at WARN (or whatever `RUST_LOG` says) until `apply_level` runs.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let _ = FILTER.set(handle);
}

/// Switch the filter to the configured level. A `RUST_LOG` override stays in
/// effect; settings never replace an explicit request.
pub fn apply_level(level: LogLevel) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Some(handle) = FILTER.get() {
        let _ = handle.reload(EnvFilter::new(level.as_filter()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_level_without_init_is_a_noop() {
        apply_level(LogLevel::Debug);
    }
}
