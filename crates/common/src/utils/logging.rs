use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Default directive when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,sea_orm=warn,sqlx=warn";

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Initialize tracing subscriber with compact, human-readable output.
/// - Respects `RUST_LOG` if set, otherwise uses `fallback`
/// - Writes to stdout to improve visibility in environments that hide stderr
pub fn init_logging_compact(fallback: &str) {
    let _ = fmt()
        .with_env_filter(env_filter(fallback))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
pub fn init_logging_json(fallback: &str) {
    let _ = fmt()
        .with_env_filter(env_filter(fallback))
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// Compact logging with [`DEFAULT_FILTER`].
pub fn init_logging_default() {
    init_logging_compact(DEFAULT_FILTER);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_logging_default();
        init_logging_json(DEFAULT_FILTER);
        tracing::info!("still logging");
    }
}
