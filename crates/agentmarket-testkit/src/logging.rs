//! Test logging setup

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Load `.env` and install a `tracing` subscriber writing to the test
/// output. Safe to call from every test; only the first call has an effect.
///
/// The filter comes from `RUST_LOG`, defaulting to `info` with debug output
/// from the AgentMarket crates.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = dotenvy::dotenv();

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,agentmarket_retry=debug,agentmarket_sdk=debug")
        });

        // Another harness may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_test_writer().with_target(true))
            .try_init();
    });
}
