//! Shared data models spanning the forecasting layers.

pub mod forecast;
pub mod report;
pub mod sales;
pub mod weather;

pub use forecast::{Forecast, ForecastBasis, ForecastMethod, ForecastResult, NewForecast};
pub use report::{DateRange, ItemTotal, SalesReport, SupplierTotal};
pub use sales::{parse_sale_date, NewSalesRecord, SalesRecord, ValidationError};
pub use weather::Weather;
