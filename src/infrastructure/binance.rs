//! Binance candle provider
//!
//! Fetches OHLCV klines from the public `/klines` endpoint. Symbols are
//! normalized to Binance's `{BASE}USDT` pairs before querying, and each
//! heterogenous kline row is parsed and validated individually so one
//! malformed row never poisons the series. Outbound requests are paced
//! by a rate limiter sized to the provider's limits.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::domain::repositories::market_data::{
    CandleProvider, MarketDataError, MarketDataResult,
};
use crate::domain::services::indicators::Candle;

const BINANCE_API_BASE: &str = "https://api.binance.com/api/v3";

pub struct BinanceClient {
    client: Client,
    api_base: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl BinanceClient {
    pub fn new(requests_per_minute: u32) -> Self {
        Self::with_api_base(BINANCE_API_BASE, requests_per_minute)
    }

    pub fn with_api_base(api_base: &str, requests_per_minute: u32) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));
        BinanceClient {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Normalize a ticker symbol to Binance's USDT pair naming:
    /// uppercase, strip any existing "USDT", re-suffix with "USDT".
    fn to_binance_pair(symbol: &str) -> String {
        let clean = symbol.to_uppercase().replace("USDT", "");
        format!("{}USDT", clean)
    }
}

/// Kline rows mix integers and stringified decimals:
/// `[open_time_ms, "open", "high", "low", "close", "volume", ...]`
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parse one kline row into a candle; malformed rows map to None.
fn parse_kline(row: &[Value]) -> Option<Candle> {
    let time_ms = row.first()?.as_i64()?;
    let time = Utc.timestamp_millis_opt(time_ms).single()?;
    let open = numeric(row.get(1)?)?;
    let high = numeric(row.get(2)?)?;
    let low = numeric(row.get(3)?)?;
    let close = numeric(row.get(4)?)?;
    let volume = numeric(row.get(5)?)?;
    Candle::new(time, open, high, low, close, volume).ok()
}

#[async_trait]
impl CandleProvider for BinanceClient {
    async fn candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> MarketDataResult<Vec<Candle>> {
        self.limiter.until_ready().await;

        let pair = Self::to_binance_pair(symbol);
        let url = Url::parse_with_params(
            &format!("{}/klines", self.api_base),
            &[
                ("symbol", pair.as_str()),
                ("interval", interval),
                ("limit", limit.to_string().as_str()),
            ],
        )
        .map_err(|e| MarketDataError::MalformedPayload(e.to_string()))?;

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!(pair = %pair, "Binance rate limit reached");
            return Err(MarketDataError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(MarketDataError::Status(response.status().as_u16()));
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| MarketDataError::MalformedPayload(e.to_string()))?;

        let row_count = rows.len();
        let candles: Vec<Candle> = rows.iter().filter_map(|row| parse_kline(row)).collect();
        if candles.len() < row_count {
            warn!(
                pair = %pair,
                dropped = row_count - candles.len(),
                "dropped malformed kline rows"
            );
        }
        debug!(pair = %pair, candle_count = candles.len(), "fetched candle series");
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_normalization() {
        assert_eq!(BinanceClient::to_binance_pair("btc"), "BTCUSDT");
        assert_eq!(BinanceClient::to_binance_pair("BTC"), "BTCUSDT");
        assert_eq!(BinanceClient::to_binance_pair("BTCUSDT"), "BTCUSDT");
        assert_eq!(BinanceClient::to_binance_pair("ethusdt"), "ETHUSDT");
    }

    #[test]
    fn test_parse_kline_row() {
        let row: Vec<Value> = serde_json::from_str(
            r#"[1700000000000, "100.5", "101.2", "99.8", "100.9", "1234.5",
                1700003599999, "124000.0", 42, "600.0", "60000.0", "0"]"#,
        )
        .unwrap();

        let candle = parse_kline(&row).unwrap();
        assert_eq!(candle.open.value(), 100.5);
        assert_eq!(candle.high.value(), 101.2);
        assert_eq!(candle.low.value(), 99.8);
        assert_eq!(candle.close.value(), 100.9);
        assert_eq!(candle.volume, 1234.5);
        assert_eq!(candle.time.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_parse_kline_accepts_numeric_fields() {
        let row: Vec<Value> =
            serde_json::from_str(r#"[1700000000000, 100.5, 101.2, 99.8, 100.9, 1234.5]"#).unwrap();
        assert!(parse_kline(&row).is_some());
    }

    #[test]
    fn test_parse_kline_rejects_malformed_rows() {
        let short: Vec<Value> = serde_json::from_str(r#"[1700000000000, "100.5"]"#).unwrap();
        assert!(parse_kline(&short).is_none());

        let garbage: Vec<Value> =
            serde_json::from_str(r#"[1700000000000, "abc", "101", "99", "100", "10"]"#).unwrap();
        assert!(parse_kline(&garbage).is_none());

        let negative_price: Vec<Value> =
            serde_json::from_str(r#"[1700000000000, "-1", "101", "99", "100", "10"]"#).unwrap();
        assert!(parse_kline(&negative_price).is_none());
    }
}
