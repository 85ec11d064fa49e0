use serde::{Deserialize, Serialize};

use crate::domain::entities::asset::AssetSnapshot;

/// Stop loss sits 2% below entry for every signal
pub const STOP_LOSS_RATIO: f64 = 0.98;
/// Take profit sits 4% above entry for every signal
pub const TAKE_PROFIT_RATIO: f64 = 1.04;

/// Lower and upper clamp for the readiness score
pub const SCORE_MIN: f64 = 5.0;
pub const SCORE_MAX: f64 = 100.0;

pub const REASON_SNIPER_LOCK: &str = "sniper lock";
pub const REASON_SYNCHRONIZING: &str = "synchronizing";
pub const REASON_BELOW_EMA200: &str = "below EMA200";
pub const REASON_ADX_TOO_LOW: &str = "ADX too low (<15)";
pub const REASON_INSUFFICIENT_VOLUME: &str = "insufficient volume (<1.2x)";
pub const REASON_RSI_ADJUSTING: &str = "RSI adjusting";
pub const REASON_CONNECTION_ERROR: &str = "connection error";

/// Outcome of the sniper decision gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    Passed,
    Failed,
}

/// Per-asset evaluation output: indicators, readiness score, decision and
/// protective price levels. Ephemeral; every scan produces a fresh set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSignal {
    pub symbol: String,
    pub name: String,
    pub image: String,
    pub entry_price: f64,
    pub price_change_percent: f64,
    pub volume: f64,
    pub rsi: f64,
    pub ema200: f64,
    pub adx: f64,
    /// Readiness score, always in [5, 100]
    pub score: f64,
    pub status: SignalStatus,
    pub reason: String,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Fixed protective levels relative to entry (2% stop, 4% target).
pub fn protective_levels(entry_price: f64) -> (f64, f64) {
    (
        entry_price * STOP_LOSS_RATIO,
        entry_price * TAKE_PROFIT_RATIO,
    )
}

impl TradeSignal {
    /// Default signal for an asset that could not be fully evaluated
    /// (short history, fetch failure). Indicators fall back to their
    /// neutral sentinels and the score is derived from the 24h change
    /// alone, clamped to [5, 20].
    pub fn degraded(asset: &AssetSnapshot, reason: &str) -> Self {
        let base = (asset.price_change_percent_24h.abs() * 2.0).clamp(5.0, 20.0);
        let score = if base.is_nan() { SCORE_MIN } else { base };
        let (stop_loss, take_profit) = protective_levels(asset.current_price);

        TradeSignal {
            symbol: asset.symbol.clone(),
            name: asset.name.clone(),
            image: asset.image.clone(),
            entry_price: asset.current_price,
            price_change_percent: asset.price_change_percent_24h,
            volume: asset.total_volume,
            rsi: 50.0,
            ema200: 0.0,
            adx: 0.0,
            score,
            status: SignalStatus::Failed,
            reason: reason.to_string(),
            stop_loss,
            take_profit,
        }
    }
}
