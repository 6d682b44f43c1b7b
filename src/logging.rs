//! Structured logging setup.
//!
//! Filtering follows `RUST_LOG` when set, otherwise a build-dependent
//! default. Output goes to stderr so a launcher started from a terminal
//! shows discovery and launch diagnostics.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init() {
    let default_level = if cfg!(debug_assertions) {
        "editor_launcher=debug,info"
    } else {
        "editor_launcher=info,warn"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Test variant of [`init`]; safe to call from every test.
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}
