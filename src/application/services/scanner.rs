//! Scan orchestrator
//!
//! Filters the asset universe, fans evaluation out concurrently with a
//! bounded number of in-flight candle fetches, isolates per-asset
//! failures, and returns the aggregated signals sorted by score.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ScannerConfig;
use crate::domain::entities::asset::AssetSnapshot;
use crate::domain::entities::trade_signal::{
    SignalStatus, TradeSignal, REASON_CONNECTION_ERROR,
};
use crate::domain::repositories::market_data::{CandleProvider, UniverseProvider};
use crate::domain::services::evaluator;

/// Stablecoins, wrapped assets and fiat-pegged listings that are never
/// worth scanning. Matched against the lowercase symbol.
static EXCLUDED_SYMBOLS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "usdt", "usdc", "dai", "busd", "tusd", "fdusd", "pyusd", "usdd", "frax", "steth", "weth",
        "wbtc", "paxg", "xaut", "ustc", "eusd", "ldo", "ton", "eur", "gbp",
    ]
    .into_iter()
    .collect()
});

/// Name fragments that mark an asset as a stable or wrapped derivative
const EXCLUDED_NAME_FRAGMENTS: [&str; 3] = ["usd", "tether", "wrapped"];

/// Concurrent, fault-isolated market scanner.
///
/// `scan` is a pure function of the providers' current responses: every
/// failure mode degrades to a partial or empty result, and no state is
/// carried between invocations.
pub struct MarketScanner<U, C> {
    universe: Arc<U>,
    candles: Arc<C>,
    config: ScannerConfig,
}

impl<U, C> MarketScanner<U, C>
where
    U: UniverseProvider,
    C: CandleProvider,
{
    pub fn new(universe: Arc<U>, candles: Arc<C>, config: ScannerConfig) -> Self {
        MarketScanner {
            universe,
            candles,
            config,
        }
    }

    /// Run one full scan: universe fetch, denylist filter, concurrent
    /// per-asset evaluation, score-descending sort.
    pub async fn scan(&self) -> Vec<TradeSignal> {
        let assets = match self.universe.top_assets(self.config.universe_limit).await {
            Ok(assets) => assets,
            Err(e) => {
                warn!(error = %e, "universe fetch failed, returning empty scan");
                return Vec::new();
            }
        };
        if assets.is_empty() {
            warn!("universe provider returned no assets");
            return Vec::new();
        }

        let universe_size = assets.len();
        let tradable: Vec<AssetSnapshot> = assets.into_iter().filter(is_tradable).collect();
        debug!(
            universe_size = universe_size,
            tradable = tradable.len(),
            "universe filtered"
        );

        let mut signals: Vec<TradeSignal> = stream::iter(tradable)
            .map(|asset| self.evaluate_asset(asset))
            .buffer_unordered(self.config.max_concurrent_fetches)
            .collect()
            .await;

        signals.sort_by(|a, b| b.score.total_cmp(&a.score));

        let passed = signals
            .iter()
            .filter(|s| s.status == SignalStatus::Passed)
            .count();
        info!(
            signal_count = signals.len(),
            passed = passed,
            "scan complete"
        );

        signals
    }

    /// Fetch candles for one asset and evaluate it. Any failure or
    /// timeout collapses into a degraded signal so the batch continues.
    async fn evaluate_asset(&self, asset: AssetSnapshot) -> TradeSignal {
        let fetch = self.candles.candles(
            &asset.symbol,
            &self.config.candle_interval,
            self.config.candle_limit,
        );
        match timeout(self.config.fetch_timeout, fetch).await {
            Ok(Ok(candles)) => evaluator::evaluate(&asset, &candles),
            Ok(Err(e)) => {
                warn!(symbol = %asset.symbol, error = %e, "candle fetch failed");
                TradeSignal::degraded(&asset, REASON_CONNECTION_ERROR)
            }
            Err(_) => {
                warn!(
                    symbol = %asset.symbol,
                    timeout_ms = self.config.fetch_timeout.as_millis() as u64,
                    "candle fetch timed out"
                );
                TradeSignal::degraded(&asset, REASON_CONNECTION_ERROR)
            }
        }
    }
}

/// Denylist filter: drops stablecoins, wrapped assets and fiat proxies.
fn is_tradable(asset: &AssetSnapshot) -> bool {
    if EXCLUDED_SYMBOLS.contains(asset.symbol.to_lowercase().as_str()) {
        return false;
    }
    let name = asset.name.to_lowercase();
    !EXCLUDED_NAME_FRAGMENTS
        .iter()
        .any(|fragment| name.contains(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(symbol: &str, name: &str) -> AssetSnapshot {
        AssetSnapshot {
            symbol: symbol.to_string(),
            name: name.to_string(),
            image: String::new(),
            current_price: 1.0,
            price_change_percent_24h: 0.0,
            total_volume: 0.0,
            rank: 1,
        }
    }

    #[test]
    fn test_denylisted_symbols_are_excluded() {
        assert!(!is_tradable(&asset("USDT", "SomeCoin")));
        assert!(!is_tradable(&asset("usdc", "SomeCoin")));
        assert!(!is_tradable(&asset("WBTC", "SomeCoin")));
    }

    #[test]
    fn test_name_fragments_are_excluded_case_insensitively() {
        assert!(!is_tradable(&asset("ABC", "Tether Gold")));
        assert!(!is_tradable(&asset("ABC", "Wrapped Ether")));
        assert!(!is_tradable(&asset("ABC", "SuperUSD Token")));
    }

    #[test]
    fn test_regular_assets_pass_the_filter() {
        assert!(is_tradable(&asset("BTC", "Bitcoin")));
        assert!(is_tradable(&asset("SOL", "Solana")));
    }
}
