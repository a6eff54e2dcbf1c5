//! In-process storage backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ForecastRepository, RepositoryError, SalesRepository};
use crate::models::{Forecast, NewForecast, NewSalesRecord, SalesRecord};

#[derive(Default)]
pub struct MemoryStore {
    sales: RwLock<Vec<SalesRecord>>,
    forecasts: RwLock<Vec<Forecast>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut records: Vec<SalesRecord>) -> Vec<SalesRecord> {
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
}

#[async_trait]
impl SalesRepository for MemoryStore {
    async fn insert_sales(
        &self,
        records: Vec<NewSalesRecord>,
    ) -> Result<Vec<SalesRecord>, RepositoryError> {
        let validated = records
            .into_iter()
            .map(NewSalesRecord::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        self.sales.write().await.extend(validated.iter().cloned());
        Ok(validated)
    }

    async fn get_recent_sales(&self, limit: usize) -> Result<Vec<SalesRecord>, RepositoryError> {
        let mut records = newest_first(self.sales.read().await.clone());
        records.truncate(limit);
        Ok(records)
    }

    async fn get_sales_by_item(&self, item: &str) -> Result<Vec<SalesRecord>, RepositoryError> {
        let records: Vec<SalesRecord> = self
            .sales
            .read()
            .await
            .iter()
            .filter(|r| r.item == item)
            .cloned()
            .collect();
        Ok(newest_first(records))
    }

    async fn get_sales_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SalesRecord>, RepositoryError> {
        let records: Vec<SalesRecord> = self
            .sales
            .read()
            .await
            .iter()
            .filter(|r| {
                let instant = r.date.with_timezone(&Utc);
                instant >= start && instant <= end
            })
            .cloned()
            .collect();
        Ok(newest_first(records))
    }
}

#[async_trait]
impl ForecastRepository for MemoryStore {
    async fn save_forecast(&self, forecast: NewForecast) -> Result<Forecast, RepositoryError> {
        let stored = Forecast::from_new(forecast);
        self.forecasts.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn get_recent_forecasts(&self, limit: usize) -> Result<Vec<Forecast>, RepositoryError> {
        let forecasts = self.forecasts.read().await;
        Ok(forecasts.iter().rev().take(limit).cloned().collect())
    }

    async fn get_latest_forecast(&self) -> Result<Option<Forecast>, RepositoryError> {
        Ok(self.forecasts.read().await.last().cloned())
    }
}
