//! Exchange-rate providers
//!
//! Implementations of the `RateProvider` seam:
//! - `http` - Ticker endpoint over HTTP with a typed response contract
//! - `fixed` - Constant rate for offline runs and tests

pub mod fixed;
pub mod http;

pub use fixed::FixedRateProvider;
pub use http::HttpRateProvider;
