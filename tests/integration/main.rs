//! End-to-end scan scenarios against an in-memory exchange.

mod mock_exchange;
mod scenarios;
