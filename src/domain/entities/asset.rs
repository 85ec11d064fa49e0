use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of one asset in the market universe.
///
/// Produced by the universe provider, immutable once fetched. The symbol
/// is unique within a single scan and carries through to the resulting
/// trade signal unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSnapshot {
    /// Ticker symbol, uppercase (e.g., "BTC")
    pub symbol: String,
    /// Human-readable asset name (e.g., "Bitcoin")
    pub name: String,
    /// URL of the asset's icon
    pub image: String,
    /// Current spot price in USD
    pub current_price: f64,
    /// 24h price change in percent
    pub price_change_percent_24h: f64,
    /// 24h trading volume in USD
    pub total_volume: f64,
    /// Market cap rank (1 = largest)
    pub rank: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_snapshot_serde_round_trip() {
        let snapshot = AssetSnapshot {
            symbol: "BTC".to_string(),
            name: "Bitcoin".to_string(),
            image: "https://example.com/btc.png".to_string(),
            current_price: 65000.0,
            price_change_percent_24h: 2.5,
            total_volume: 30_000_000_000.0,
            rank: 1,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: AssetSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.symbol, "BTC");
        assert_eq!(back.rank, 1);
        assert_eq!(back.current_price, 65000.0);
    }
}
