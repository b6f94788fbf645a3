pub mod builders;
pub mod fake_engine;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for any single awaited step in async tests.
pub const TEST_DEADLINE: Duration = Duration::from_secs(5);

/// Install a test subscriber once per test binary.
///
/// `RUST_LOG` wins, then `DAGVIEW_LOG`, then `warn` so stale-result and
/// failed-layout warnings show up in failing tests without drowning them.
/// Output goes through the test writer and is only shown for failures
/// (or with `-- --nocapture`).
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_from_env(dagview::logging::LOG_ENV))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_DEADLINE`].
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_DEADLINE, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step did not finish within {TEST_DEADLINE:?}"),
    }
}
