//! Storage for sales history and generated forecasts.
//!
//! Repositories are chosen once at startup and passed around explicitly via
//! [`Storage`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{Forecast, NewForecast, NewSalesRecord, SalesRecord};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

pub type RepositoryError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait SalesRepository: Send + Sync {
    /// Validate and append records as one batch; nothing is stored if any record is
    /// invalid or the write fails
    async fn insert_sales(
        &self,
        records: Vec<NewSalesRecord>,
    ) -> Result<Vec<SalesRecord>, RepositoryError>;

    /// Newest sales first
    async fn get_recent_sales(&self, limit: usize) -> Result<Vec<SalesRecord>, RepositoryError>;

    async fn get_sales_by_item(&self, item: &str) -> Result<Vec<SalesRecord>, RepositoryError>;

    /// Inclusive on both ends, newest first
    async fn get_sales_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SalesRecord>, RepositoryError>;
}

#[async_trait]
pub trait ForecastRepository: Send + Sync {
    async fn save_forecast(&self, forecast: NewForecast) -> Result<Forecast, RepositoryError>;

    /// Most recently created first
    async fn get_recent_forecasts(&self, limit: usize) -> Result<Vec<Forecast>, RepositoryError>;

    async fn get_latest_forecast(&self) -> Result<Option<Forecast>, RepositoryError>;
}

/// Which repository implementation a [`Storage`] bundle wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Postgres => "postgres",
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct Storage {
    pub sales: Arc<dyn SalesRepository>,
    pub forecasts: Arc<dyn ForecastRepository>,
    pub backend: StorageBackend,
}

impl Storage {
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            sales: store.clone(),
            forecasts: store,
            backend: StorageBackend::Memory,
        }
    }

    pub fn postgres(store: PostgresStore) -> Self {
        let store = Arc::new(store);
        Self {
            sales: store.clone(),
            forecasts: store,
            backend: StorageBackend::Postgres,
        }
    }

    /// Postgres when `DATABASE_URL` and `USE_DATABASE` are both set, memory otherwise
    pub async fn from_config(config: &Config) -> Result<Self, RepositoryError> {
        match config.postgres_url() {
            Some(url) => {
                let store = PostgresStore::connect(url).await?;
                info!("Using Postgres storage");
                Ok(Self::postgres(store))
            }
            None => {
                if config.database_url.is_some() {
                    warn!("DATABASE_URL is set but USE_DATABASE is not; using in-memory storage");
                } else {
                    info!("Using in-memory storage");
                }
                Ok(Self::in_memory())
            }
        }
    }
}
