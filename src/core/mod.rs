//! HTTP surface around the forecasting engine

pub mod http;

pub use http::*;
