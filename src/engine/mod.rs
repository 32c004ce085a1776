//! Core engine: symbol listing, candle retrieval and the scan loop.

pub mod fetcher;
pub mod scanner;
pub mod symbols;
