use std::time::Duration;

/// Scanner configuration: universe size, candle fetch parameters and
/// concurrency/rate limits for the fan-out.
#[derive(Clone, Debug)]
pub struct ScannerConfig {
    /// How many top-ranked assets to pull from the universe provider
    pub universe_limit: usize,
    /// Candle interval passed to the candle provider (e.g., "1h")
    pub candle_interval: String,
    /// Candles requested per asset; at least 210 so EMA200 has history
    pub candle_limit: usize,
    /// Maximum concurrent candle fetches during the fan-out
    pub max_concurrent_fetches: usize,
    /// Per-asset candle fetch timeout
    pub fetch_timeout: Duration,
    /// Cadence between successful scans
    pub scan_interval: Duration,
    /// Outbound request budget for the candle provider
    pub candle_requests_per_minute: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            universe_limit: 50,
            candle_interval: "1h".to_string(),
            candle_limit: 210,
            max_concurrent_fetches: 8,
            fetch_timeout: Duration::from_secs(10),
            scan_interval: Duration::from_secs(60),
            candle_requests_per_minute: 300,
        }
    }
}

impl ScannerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults and warning on out-of-range values.
    pub fn from_env() -> ScannerConfig {
        let mut config = ScannerConfig::default();

        if let Ok(limit) = std::env::var("UNIVERSE_LIMIT") {
            match limit.parse::<usize>() {
                Ok(value) if (1..=250).contains(&value) => config.universe_limit = value,
                Ok(value) => {
                    tracing::warn!(
                        "Invalid UNIVERSE_LIMIT value: {} (must be between 1 and 250), using default: {}",
                        value,
                        config.universe_limit
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse UNIVERSE_LIMIT '{}': {}, using default: {}",
                        limit,
                        e,
                        config.universe_limit
                    );
                }
            }
        }

        if let Ok(interval) = std::env::var("CANDLE_INTERVAL") {
            if interval.is_empty() {
                tracing::warn!(
                    "CANDLE_INTERVAL is empty, using default: {}",
                    config.candle_interval
                );
            } else {
                config.candle_interval = interval;
            }
        }

        if let Ok(limit) = std::env::var("CANDLE_LIMIT") {
            if let Ok(value) = limit.parse::<usize>() {
                if (10..=1000).contains(&value) {
                    config.candle_limit = value;
                }
            }
        }

        if let Ok(max) = std::env::var("MAX_CONCURRENT_FETCHES") {
            if let Ok(value) = max.parse::<usize>() {
                if (1..=64).contains(&value) {
                    config.max_concurrent_fetches = value;
                }
            }
        }

        if let Ok(timeout) = std::env::var("FETCH_TIMEOUT_SECS") {
            if let Ok(value) = timeout.parse::<u64>() {
                if (1..=120).contains(&value) {
                    config.fetch_timeout = Duration::from_secs(value);
                }
            }
        }

        if let Ok(interval) = std::env::var("SCAN_INTERVAL_SECS") {
            if let Ok(value) = interval.parse::<u64>() {
                if (10..=3600).contains(&value) {
                    config.scan_interval = Duration::from_secs(value);
                }
            }
        }

        if let Ok(budget) = std::env::var("CANDLE_REQUESTS_PER_MINUTE") {
            if let Ok(value) = budget.parse::<u32>() {
                if (1..=1200).contains(&value) {
                    config.candle_requests_per_minute = value;
                }
            }
        }

        config
    }
}
