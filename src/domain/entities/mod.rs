pub mod asset;
pub mod trade_signal;
