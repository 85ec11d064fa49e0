//! Sniper Market Scanner Library
//!
//! Core components for scanning a universe of tradable assets, computing
//! technical indicators over candle history, and ranking trade signals.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod scan_loop;
