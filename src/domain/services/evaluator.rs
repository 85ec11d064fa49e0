//! Signal evaluator: turns one asset snapshot plus its candle history
//! into a single trade signal (the "Sniper Protocol").

use tracing::debug;

use crate::domain::entities::asset::AssetSnapshot;
use crate::domain::entities::trade_signal::{
    protective_levels, SignalStatus, TradeSignal, REASON_ADX_TOO_LOW, REASON_BELOW_EMA200,
    REASON_INSUFFICIENT_VOLUME, REASON_RSI_ADJUSTING, REASON_SNIPER_LOCK, REASON_SYNCHRONIZING,
    SCORE_MAX, SCORE_MIN,
};
use crate::domain::services::indicators::{adx, ema, rsi, sma, Candle};

/// Below this many candles the asset is considered still synchronizing
pub const MIN_CANDLES: usize = 10;

const EMA_SLOW_PERIOD: usize = 200;
const EMA_FAST_PERIOD: usize = 50;
const RSI_PERIOD: usize = 14;
const ADX_PERIOD: usize = 14;
const AVG_VOLUME_PERIOD: usize = 20;

// Aggressive gate parameters
const ADX_TREND_FLOOR: f64 = 15.0;
const ADX_STRONG_BONUS_FLOOR: f64 = 25.0;
const VOLUME_SPIKE_RATIO: f64 = 1.2;
const RSI_BAND_LOWER: f64 = 35.0;
const RSI_BAND_UPPER: f64 = 65.0;

/// Evaluate one asset against its candle history.
///
/// Pure: same snapshot and candles always produce the same signal. Assets
/// with fewer than [`MIN_CANDLES`] candles get a degraded "synchronizing"
/// signal instead of an error.
pub fn evaluate(asset: &AssetSnapshot, candles: &[Candle]) -> TradeSignal {
    if candles.len() < MIN_CANDLES {
        debug!(
            symbol = %asset.symbol,
            candle_count = candles.len(),
            "insufficient candle history, emitting default signal"
        );
        return TradeSignal::degraded(asset, REASON_SYNCHRONIZING);
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close.value()).collect();
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    let price = asset.current_price;

    let ema200 = ema(&closes, EMA_SLOW_PERIOD);
    let ema50 = ema(&closes, EMA_FAST_PERIOD);
    let rsi14 = rsi(&closes, RSI_PERIOD);
    let adx14 = adx(candles, ADX_PERIOD);
    let avg_volume = sma(&volumes, AVG_VOLUME_PERIOD);
    let current_volume = volumes.last().copied().unwrap_or(0.0);

    let above_ema200 = price > ema200;
    let above_ema50 = price > ema50;
    let strong_trend = adx14 > ADX_TREND_FLOOR;
    let volume_spike = current_volume >= avg_volume * VOLUME_SPIKE_RATIO;
    let rsi_in_band = rsi14 > RSI_BAND_LOWER && rsi14 < RSI_BAND_UPPER;

    let mut score: f64 = 0.0;
    if above_ema200 {
        score += 25.0;
    }
    if above_ema50 {
        score += 15.0;
    }
    if strong_trend {
        score += 20.0;
    }
    if adx14 > ADX_STRONG_BONUS_FLOOR {
        score += 10.0;
    }
    if volume_spike {
        score += 20.0;
    }
    if rsi_in_band {
        score += 10.0;
    }
    let score = score.clamp(SCORE_MIN, SCORE_MAX);

    // Decision gate. Independent of the score weights, and deliberately
    // tests only the RSI upper bound rather than the full scoring band.
    let (status, reason) = if above_ema200 && strong_trend && volume_spike && rsi14 < RSI_BAND_UPPER
    {
        (SignalStatus::Passed, REASON_SNIPER_LOCK)
    } else if !above_ema200 {
        (SignalStatus::Failed, REASON_BELOW_EMA200)
    } else if !strong_trend {
        (SignalStatus::Failed, REASON_ADX_TOO_LOW)
    } else if !volume_spike {
        (SignalStatus::Failed, REASON_INSUFFICIENT_VOLUME)
    } else {
        (SignalStatus::Failed, REASON_RSI_ADJUSTING)
    };

    debug!(
        symbol = %asset.symbol,
        score = score,
        rsi = rsi14,
        adx = adx14,
        ema200 = ema200,
        status = ?status,
        reason = reason,
        "asset evaluated"
    );

    let (stop_loss, take_profit) = protective_levels(price);

    TradeSignal {
        symbol: asset.symbol.clone(),
        name: asset.name.clone(),
        image: asset.image.clone(),
        entry_price: price,
        price_change_percent: asset.price_change_percent_24h,
        volume: asset.total_volume,
        rsi: rsi14,
        ema200,
        adx: adx14,
        score,
        status,
        reason: reason.to_string(),
        stop_loss,
        take_profit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::trade_signal::{STOP_LOSS_RATIO, TAKE_PROFIT_RATIO};
    use chrono::{Duration, TimeZone, Utc};

    fn snapshot(symbol: &str, price: f64) -> AssetSnapshot {
        AssetSnapshot {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            image: String::new(),
            current_price: price,
            price_change_percent_24h: 1.5,
            total_volume: 5_000_000.0,
            rank: 10,
        }
    }

    fn series(closes: &[f64], volumes: &[f64]) -> Vec<Candle> {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| {
                let open = if i == 0 { close } else { closes[i - 1] };
                let high = open.max(close) + 0.5;
                let low = open.min(close) - 0.5;
                Candle::new(start + Duration::hours(i as i64), open, high, low, close, volume)
                    .unwrap()
            })
            .collect()
    }

    /// Uptrend whose highs/lows climb every candle while closes zigzag
    /// enough to keep RSI inside the scoring band.
    fn sniper_series(len: usize, last_volume: f64) -> (Vec<Candle>, f64) {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let deltas = [1.0, 1.0, -1.3];
        let mut close = 100.0;
        let mut candles = Vec::with_capacity(len);
        for i in 0..len {
            if i > 0 {
                close += deltas[(i - 1) % deltas.len()];
            }
            let trend = 100.0 + 0.2334 * i as f64;
            let volume = if i == len - 1 { last_volume } else { 1000.0 };
            candles.push(
                Candle::new(
                    start + Duration::hours(i as i64),
                    close,
                    trend + 2.0,
                    trend - 2.0,
                    close,
                    volume,
                )
                .unwrap(),
            );
        }
        (candles, close)
    }

    #[test]
    fn test_short_history_emits_synchronizing_signal() {
        let closes = [100.0, 101.0, 102.0, 101.5, 103.0];
        let volumes = [10.0; 5];
        let signal = evaluate(&snapshot("NEW", 103.0), &series(&closes, &volumes));

        assert_eq!(signal.status, SignalStatus::Failed);
        assert_eq!(signal.reason, REASON_SYNCHRONIZING);
        assert_eq!(signal.rsi, 50.0);
        assert_eq!(signal.adx, 0.0);
        assert_eq!(signal.ema200, 0.0);
    }

    #[test]
    fn test_strong_uptrend_with_volume_spike_locks_signal() {
        let (candles, last_close) = sniper_series(250, 5000.0);
        let signal = evaluate(&snapshot("BTC", last_close), &candles);

        assert_eq!(signal.status, SignalStatus::Passed);
        assert_eq!(signal.reason, REASON_SNIPER_LOCK);
        assert!(signal.adx > 15.0);
        // all six factors fire: 25 + 15 + 20 + 10 + 20 + 10, clamped
        assert_eq!(signal.score, 100.0);
    }

    #[test]
    fn test_below_ema200_fails_first_in_priority() {
        let (candles, _) = sniper_series(250, 5000.0);
        // price forced under the long EMA; everything else would pass
        let signal = evaluate(&snapshot("BTC", 50.0), &candles);

        assert_eq!(signal.status, SignalStatus::Failed);
        assert_eq!(signal.reason, REASON_BELOW_EMA200);
    }

    #[test]
    fn test_no_volume_spike_fails_with_volume_reason() {
        let (candles, last_close) = sniper_series(250, 1000.0);
        let signal = evaluate(&snapshot("BTC", last_close), &candles);

        assert_eq!(signal.status, SignalStatus::Failed);
        assert_eq!(signal.reason, REASON_INSUFFICIENT_VOLUME);
    }

    #[test]
    fn test_overbought_rsi_fails_despite_high_score() {
        // monotonic rise: RSI pins at 100, outside the decision gate
        let closes: Vec<f64> = (0..250).map(|i| 100.0 + i as f64 * 0.2).collect();
        let mut volumes = vec![1000.0; 250];
        volumes[249] = 5000.0;
        let candles = series(&closes, &volumes);
        let signal = evaluate(&snapshot("ETH", *closes.last().unwrap()), &candles);

        assert_eq!(signal.status, SignalStatus::Failed);
        assert_eq!(signal.reason, REASON_RSI_ADJUSTING);
        // still scores every factor except the RSI band
        assert_eq!(signal.score, 90.0);
    }

    #[test]
    fn test_flat_market_fails_on_weak_trend() {
        let closes = vec![100.0; 250];
        let volumes = vec![1000.0; 250];
        let candles = series(&closes, &volumes);
        let signal = evaluate(&snapshot("DOGE", 101.0), &candles);

        assert_eq!(signal.status, SignalStatus::Failed);
        assert_eq!(signal.reason, REASON_ADX_TOO_LOW);
    }

    #[test]
    fn test_score_stays_in_range() {
        let closes: Vec<f64> = (0..250).map(|i| 100.0 - i as f64 * 0.1).collect();
        let volumes = vec![1000.0; 250];
        let signal = evaluate(&snapshot("BEAR", 5.0), &series(&closes, &volumes));
        assert!(signal.score >= 5.0 && signal.score <= 100.0);
    }

    #[test]
    fn test_protective_levels_fixed_ratios() {
        let (candles, last_close) = sniper_series(250, 5000.0);
        let signal = evaluate(&snapshot("BTC", last_close), &candles);

        assert_eq!(signal.stop_loss, last_close * STOP_LOSS_RATIO);
        assert_eq!(signal.take_profit, last_close * TAKE_PROFIT_RATIO);
    }
}
