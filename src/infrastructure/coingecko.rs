//! CoinGecko universe provider
//!
//! Fetches the market-cap-ranked asset universe from the public
//! `/coins/markets` endpoint and normalizes the loosely-shaped payload
//! into [`AssetSnapshot`] values at the boundary.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::domain::entities::asset::AssetSnapshot;
use crate::domain::repositories::market_data::{
    MarketDataError, MarketDataResult, UniverseProvider,
};

const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Raw CoinGecko market row. Numeric fields can arrive as null.
#[derive(Debug, Deserialize)]
struct MarketTicker {
    symbol: String,
    name: String,
    #[serde(default)]
    image: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    total_volume: Option<f64>,
    market_cap_rank: Option<u32>,
}

pub struct CoinGeckoClient {
    client: Client,
    api_base: String,
}

impl CoinGeckoClient {
    pub fn new() -> Self {
        Self::with_api_base(COINGECKO_API_BASE)
    }

    pub fn with_api_base(api_base: &str) -> Self {
        CoinGeckoClient {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize one raw row; rows without a price are dropped.
fn to_snapshot(ticker: MarketTicker) -> Option<AssetSnapshot> {
    let current_price = ticker.current_price?;
    Some(AssetSnapshot {
        symbol: ticker.symbol.to_uppercase(),
        name: ticker.name,
        image: ticker.image,
        current_price,
        price_change_percent_24h: ticker.price_change_percentage_24h.unwrap_or(0.0),
        total_volume: ticker.total_volume.unwrap_or(0.0),
        rank: ticker.market_cap_rank.unwrap_or(0),
    })
}

#[async_trait]
impl UniverseProvider for CoinGeckoClient {
    async fn top_assets(&self, limit: usize) -> MarketDataResult<Vec<AssetSnapshot>> {
        let url = Url::parse_with_params(
            &format!("{}/coins/markets", self.api_base),
            &[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", limit.to_string().as_str()),
                ("page", "1"),
                ("sparkline", "false"),
            ],
        )
        .map_err(|e| MarketDataError::MalformedPayload(e.to_string()))?;

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!("CoinGecko rate limit reached");
            return Err(MarketDataError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(MarketDataError::Status(response.status().as_u16()));
        }

        let tickers: Vec<MarketTicker> = response
            .json()
            .await
            .map_err(|e| MarketDataError::MalformedPayload(e.to_string()))?;

        let snapshots: Vec<AssetSnapshot> = tickers.into_iter().filter_map(to_snapshot).collect();
        debug!(asset_count = snapshots.len(), "fetched market universe");
        Ok(snapshots)
    }
}
