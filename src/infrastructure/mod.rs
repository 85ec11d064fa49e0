pub mod binance;
pub mod coingecko;
