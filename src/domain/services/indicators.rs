//! Indicator engine: pure numeric functions over candle history.
//!
//! Every degenerate input (short history, zero denominators, NaN) maps to
//! a defined sentinel instead of an error, so the evaluator can always
//! emit a usable, if low-confidence, signal for newly listed or sparsely
//! traded assets.

use chrono::{DateTime, Utc};

use crate::domain::value_objects::price::Price;

/// One OHLCV candle. Series are ascending by time and immutable once
/// fetched; malformed provider rows never make it past the constructor.
#[derive(Debug, Clone)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, String> {
        if !volume.is_finite() || volume < 0.0 {
            return Err("Volume must be finite and non-negative".to_string());
        }
        Ok(Candle {
            time,
            open: Price::new(open)?,
            high: Price::new(high)?,
            low: Price::new(low)?,
            close: Price::new(close)?,
            volume,
        })
    }
}

/// Simple moving average of the last `period` values.
///
/// Short series or a zero period degrade to the last value (0 when the
/// series is empty).
pub fn sma(values: &[f64], period: usize) -> f64 {
    if values.len() < period || period == 0 {
        return values.last().copied().unwrap_or(0.0);
    }
    let tail = &values[values.len() - period..];
    tail.iter().sum::<f64>() / period as f64
}

/// Exponential moving average, smoothing factor 2/(period+1), seeded with
/// the first value and updated over the whole series.
///
/// A series shorter than `period` passes the last value through
/// unchanged; an empty series returns 0.
pub fn ema(values: &[f64], period: usize) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    if values.len() < period {
        return values.last().copied().unwrap_or(first);
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut current = first;
    for &value in &values[1..] {
        current = (value - current) * k + current;
    }
    current
}

/// Relative Strength Index over the last `period` deltas, in [0, 100].
///
/// Returns 50 when the series is too short to compute, 100 when there are
/// no losses in the window, and 50 for any NaN result.
pub fn rsi(values: &[f64], period: usize) -> f64 {
    if period == 0 || values.len() <= period {
        return 50.0;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in values.len() - period..values.len() {
        let diff = values[i] - values[i - 1];
        if diff >= 0.0 {
            gains += diff;
        } else {
            losses -= diff;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    let value = 100.0 - 100.0 / (1.0 + rs);
    if value.is_nan() {
        50.0
    } else {
        value
    }
}

/// Wilder-style Average Directional Index, in [0, 100].
///
/// Directional movement and true range are computed per adjacent candle
/// pair and smoothed via [`ema`] at an effective period capped to the
/// available history (`min(period, len - 1)`). Fewer than 5 candles, a
/// zero smoothed true range, a zero DI sum, or a NaN all yield 0.
pub fn adx(candles: &[Candle], period: usize) -> f64 {
    if candles.len() < 5 {
        return 0.0;
    }

    let effective_period = period.min(candles.len() - 1);

    let mut plus_dm = Vec::with_capacity(candles.len() - 1);
    let mut minus_dm = Vec::with_capacity(candles.len() - 1);
    let mut true_range = Vec::with_capacity(candles.len() - 1);

    for pair in candles.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let up_move = curr.high.value() - prev.high.value();
        let down_move = prev.low.value() - curr.low.value();

        plus_dm.push(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        });
        minus_dm.push(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        });

        let tr = (curr.high.value() - curr.low.value())
            .max((curr.high.value() - prev.close.value()).abs())
            .max((curr.low.value() - prev.close.value()).abs());
        true_range.push(tr);
    }

    let smoothed_tr = ema(&true_range, effective_period);
    if smoothed_tr == 0.0 {
        return 0.0;
    }

    let plus_di = 100.0 * ema(&plus_dm, effective_period) / smoothed_tr;
    let minus_di = 100.0 * ema(&minus_dm, effective_period) / smoothed_tr;

    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return 0.0;
    }

    let dx = 100.0 * (plus_di - minus_di).abs() / di_sum;
    if dx.is_nan() {
        0.0
    } else {
        dx
    }
}
