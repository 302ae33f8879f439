//! Tracing subscriber setup for scripts and test runners embedding the engine

use std::sync::Once;

/// Environment variable consulted after `RUST_LOG`
pub const LOG_LEVEL_ENV: &str = "UIQUERY_LOG_LEVEL";

static INIT: Once = Once::new();

/// Installs a `fmt` subscriber once per process.
///
/// Priority: explicit `level` > `RUST_LOG` > `UIQUERY_LOG_LEVEL` > `"info"`.
/// If another subscriber is already installed this is a no-op.
pub fn init_logging(level: Option<String>) {
    let level = resolve_level(
        level,
        std::env::var("RUST_LOG").ok(),
        std::env::var(LOG_LEVEL_ENV).ok(),
    );

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(level)
            .with_ansi(false)
            .try_init();
    });
}

fn resolve_level(explicit: Option<String>, rust_log: Option<String>, own: Option<String>) -> String {
    explicit
        .or(rust_log)
        .or(own)
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_priority() {
        let s = |v: &str| Some(v.to_string());
        assert_eq!(resolve_level(s("trace"), s("debug"), s("warn")), "trace");
        assert_eq!(resolve_level(None, s("debug"), s("warn")), "debug");
        assert_eq!(resolve_level(None, None, s("warn")), "warn");
        assert_eq!(resolve_level(None, None, None), "info");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Some("debug".to_string()));
        init_logging(Some("trace".to_string()));
    }
}
