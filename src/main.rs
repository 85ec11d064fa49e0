use std::sync::Arc;

use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sniper::application::services::scanner::MarketScanner;
use sniper::config::ScannerConfig;
use sniper::domain::entities::trade_signal::SignalStatus;
use sniper::infrastructure::binance::BinanceClient;
use sniper::infrastructure::coingecko::CoinGeckoClient;
use sniper::scan_loop::{run_scan_loop, ScanLoopConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sniper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ScannerConfig::from_env();
    info!(
        universe_limit = config.universe_limit,
        interval = %config.candle_interval,
        candle_limit = config.candle_limit,
        max_concurrent_fetches = config.max_concurrent_fetches,
        "Sniper market scanner starting"
    );

    let universe = Arc::new(CoinGeckoClient::new());
    let candles = Arc::new(BinanceClient::new(config.candle_requests_per_minute));
    let scanner = Arc::new(MarketScanner::new(universe, candles, config.clone()));

    let loop_config = ScanLoopConfig {
        scan_interval: config.scan_interval,
        ..ScanLoopConfig::default()
    };

    run_scan_loop("market_scan", loop_config, || {
        let scanner = scanner.clone();
        async move {
            let signals = scanner.scan().await;
            if signals.is_empty() {
                // universe fetch failed or got rate limited; back off
                return Err("scan produced no signals".to_string());
            }

            for signal in &signals {
                if signal.status == SignalStatus::Passed {
                    info!(
                        symbol = %signal.symbol,
                        score = signal.score,
                        entry = signal.entry_price,
                        stop_loss = signal.stop_loss,
                        take_profit = signal.take_profit,
                        "sniper lock"
                    );
                } else {
                    debug!(
                        symbol = %signal.symbol,
                        score = signal.score,
                        reason = %signal.reason,
                        "signal"
                    );
                }
            }
            Ok(())
        }
    })
    .await;
}
