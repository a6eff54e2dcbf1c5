//! Next-day produce demand forecasting.
//!
//! Sales history flows from a [`db::SalesRepository`] through the grouping utilities
//! into the [`forecasting::ForecastOrchestrator`], which prefers an external AI
//! prediction strategy and falls back to the deterministic block-weighted forecaster.

pub mod config;
pub mod core;
pub mod db;
pub mod forecasting;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
