use std::env;
use std::sync::Once;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TEST_SETUP: Once = Once::new();

/// Install a global tracing subscriber for tests, once per process.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(env_filter),
        );

        // A harness may have installed a subscriber already; that one wins.
        if subscriber.try_init().is_ok() {
            info!("test setup complete");
        }
    });
}
