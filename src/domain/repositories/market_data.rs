//! Market data provider traits
//!
//! These traits are the seam between the scan pipeline and the concrete
//! market APIs. The orchestrator recovers every error variant locally
//! (universe failure becomes an empty scan, a candle failure becomes a
//! degraded per-asset signal), so no provider error ever crosses the
//! scan boundary as an exception.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::asset::AssetSnapshot;
use crate::domain::services::indicators::Candle;

pub type MarketDataResult<T> = Result<T, MarketDataError>;

/// Errors a market data provider can surface
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// Provider unreachable or request failed in transit
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider answered with a non-success status
    #[error("provider returned status {0}")]
    Status(u16),

    /// Provider is throttling us
    #[error("provider rate limit reached")]
    RateLimited,

    /// Response body did not match the expected shape
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        MarketDataError::Transport(err.to_string())
    }
}

/// Source of the ranked asset universe
#[async_trait]
pub trait UniverseProvider: Send + Sync {
    /// Fetch the top `limit` assets ordered by market cap rank.
    async fn top_assets(&self, limit: usize) -> MarketDataResult<Vec<AssetSnapshot>>;
}

/// Source of historical OHLCV candles for one symbol
#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// Fetch up to `limit` candles for `symbol` at `interval`, ascending
    /// by time. Implementations normalize the symbol before querying.
    async fn candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> MarketDataResult<Vec<Candle>>;
}
