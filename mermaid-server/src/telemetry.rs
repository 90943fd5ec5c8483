//! Tracing setup.
//!
//! Logs always go to stderr; stdout belongs to the stdio transport.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
#[must_use]
pub const fn default_directives(debug: bool) -> &'static str {
    if debug {
        "debug,tower_http=debug"
    } else {
        "info,tower_http=info"
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the level chosen by `debug`; `RUST_LOG_FORMAT=json`
/// switches to JSON lines.
pub fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(debug)
        .with_line_number(debug);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_raises_level() {
        assert!(default_directives(true).starts_with("debug"));
        assert!(default_directives(false).starts_with("info"));
        assert!(EnvFilter::try_new(default_directives(true)).is_ok());
    }
}
