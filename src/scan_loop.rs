//! Periodic scan loop with failure backoff
//!
//! The scanner core holds no state between invocations; this loop is the
//! external scheduler that re-runs it on a fixed cadence. Failed
//! iterations (provider outages, rate limiting) retry with exponential
//! backoff, and a run of consecutive failures aborts the process instead
//! of degrading silently.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};

/// Loop configuration: cadence plus backoff bounds
#[derive(Debug, Clone)]
pub struct ScanLoopConfig {
    /// Delay between successful iterations
    pub scan_interval: Duration,
    /// Maximum consecutive failures before aborting
    pub max_consecutive_failures: u32,
    /// First retry delay after a failure
    pub initial_retry_delay: Duration,
    /// Backoff cap
    pub max_retry_delay: Duration,
}

impl Default for ScanLoopConfig {
    fn default() -> Self {
        ScanLoopConfig {
            scan_interval: Duration::from_secs(60),
            max_consecutive_failures: 10,
            initial_retry_delay: Duration::from_secs(5),
            max_retry_delay: Duration::from_secs(300),
        }
    }
}

#[derive(Debug)]
struct LoopState {
    consecutive_failures: u32,
    current_retry_delay: Duration,
}

impl LoopState {
    fn new(initial_delay: Duration) -> Self {
        LoopState {
            consecutive_failures: 0,
            current_retry_delay: initial_delay,
        }
    }

    fn record_failure(&mut self, max_delay: Duration) {
        self.consecutive_failures += 1;
        self.current_retry_delay = std::cmp::min(self.current_retry_delay * 2, max_delay);
    }

    fn reset(&mut self, initial_delay: Duration) {
        self.consecutive_failures = 0;
        self.current_retry_delay = initial_delay;
    }
}

/// Run `scan_fn` forever: sleep `scan_interval` after each success,
/// back off exponentially after each failure.
///
/// # Panics
/// Panics after `max_consecutive_failures` consecutive failures so a
/// permanently broken provider does not turn into a silent no-op loop.
pub async fn run_scan_loop<F, Fut>(loop_name: &str, config: ScanLoopConfig, mut scan_fn: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), String>>,
{
    let mut state = LoopState::new(config.initial_retry_delay);

    loop {
        match scan_fn().await {
            Ok(()) => {
                if state.consecutive_failures > 0 {
                    warn!(
                        "Scan loop '{}' recovered after {} failures",
                        loop_name, state.consecutive_failures
                    );
                }
                state.reset(config.initial_retry_delay);
                sleep(config.scan_interval).await;
            }
            Err(e) => {
                state.record_failure(config.max_retry_delay);
                error!(
                    "Scan loop '{}' iteration failed ({}/{}): {}",
                    loop_name, state.consecutive_failures, config.max_consecutive_failures, e
                );

                if state.consecutive_failures >= config.max_consecutive_failures {
                    panic!(
                        "FATAL: Scan loop '{}' exceeded maximum consecutive failures ({}). \
                         Last error: {}",
                        loop_name, config.max_consecutive_failures, e
                    );
                }

                warn!(
                    "Scan loop '{}' will retry in {:?}",
                    loop_name, state.current_retry_delay
                );
                sleep(state.current_retry_delay).await;
            }
        }
    }
}
