pub use tracing::{debug, error, info, instrument, trace, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};

/// Filter directives are read from this variable first, then `RUST_LOG`.
pub const LOG_ENV: &str = "GONET_LOG";

/// Installs the global subscriber, failing if one is already set.
pub fn try_init() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let directives = env_filter.to_string();
    let is_debug = directives.contains("debug") || directives.contains("trace");

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(if is_debug {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
}

pub fn init() {
    if let Err(e) = try_init() {
        eprintln!("logger already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        let _ = try_init();
        assert!(try_init().is_err());
        init();
    }
}
