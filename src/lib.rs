//! Candle scanner: candlestick pattern scan over an exchange's USDT pairs.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod exchange;
pub mod patterns;
pub mod engine;
pub mod report;
