//! Postgres storage backend for sales history and forecasts

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use tokio_postgres::{Client, NoTls, Row};
use uuid::Uuid;

use super::{ForecastRepository, RepositoryError, SalesRepository};
use crate::models::{Forecast, ForecastBasis, NewForecast, NewSalesRecord, SalesRecord};

const SALES_COLUMNS: &str = "id, sold_at, utc_offset_seconds, item, quantity, unit, \
                             price_in_cents, supplier, category, uploaded_at";
const FORECAST_COLUMNS: &str = "id, forecast_date, item, predicted_quantity, confidence, \
                                current_stock, predicted_savings_in_cents, based_on_data, created_at";

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub async fn connect(url: &str) -> Result<Self, RepositoryError> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await.map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("Failed to connect to Postgres: {}", e),
            )) as RepositoryError
        })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "Postgres connection error");
            }
        });

        let store = Self { client };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), RepositoryError> {
        // Sale instants are kept in UTC next to their original offset so the local
        // calendar day can be rebuilt exactly.
        self.client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS sales_data (
                    id TEXT PRIMARY KEY,
                    sold_at TIMESTAMP NOT NULL,
                    utc_offset_seconds INTEGER NOT NULL,
                    item TEXT NOT NULL,
                    quantity BIGINT NOT NULL,
                    unit TEXT NOT NULL,
                    price_in_cents BIGINT NOT NULL,
                    supplier TEXT,
                    category TEXT,
                    uploaded_at TIMESTAMP NOT NULL
                );
                CREATE INDEX IF NOT EXISTS sales_data_sold_at_idx ON sales_data (sold_at);
                CREATE TABLE IF NOT EXISTS forecasts (
                    id TEXT PRIMARY KEY,
                    forecast_date TIMESTAMP NOT NULL,
                    item TEXT NOT NULL,
                    predicted_quantity DOUBLE PRECISION NOT NULL,
                    confidence SMALLINT NOT NULL,
                    current_stock BIGINT,
                    predicted_savings_in_cents BIGINT,
                    based_on_data TEXT NOT NULL,
                    created_at TIMESTAMP NOT NULL
                );",
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to create tables: {}",
                    e
                ))) as RepositoryError
            })
    }

    async fn query_sales(
        &self,
        filter: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<SalesRecord>, RepositoryError> {
        let query = format!("SELECT {} FROM sales_data {}", SALES_COLUMNS, filter);
        let rows = self.client.query(&query, params).await.map_err(|e| {
            Box::new(std::io::Error::other(format!("Failed to query sales: {}", e)))
                as RepositoryError
        })?;
        rows.iter().map(row_to_sales_record).collect()
    }
}

fn row_to_sales_record(row: &Row) -> Result<SalesRecord, RepositoryError> {
    let id: String = row.get(0);
    let sold_at: NaiveDateTime = row.get(1);
    let offset_seconds: i32 = row.get(2);
    let quantity: i64 = row.get(4);
    let uploaded_at: NaiveDateTime = row.get(9);

    let offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Invalid UTC offset {} for sale {}", offset_seconds, id),
        )) as RepositoryError
    })?;

    Ok(SalesRecord {
        id: Uuid::parse_str(&id)?,
        date: DateTime::from_naive_utc_and_offset(sold_at, offset),
        item: row.get(3),
        quantity: u32::try_from(quantity)?,
        unit: row.get(5),
        price_in_cents: row.get(6),
        supplier: row.get(7),
        category: row.get(8),
        uploaded_at: DateTime::from_naive_utc_and_offset(uploaded_at, Utc),
    })
}

fn row_to_forecast(row: &Row) -> Result<Forecast, RepositoryError> {
    let id: String = row.get(0);
    let forecast_date: NaiveDateTime = row.get(1);
    let confidence: i16 = row.get(4);
    let based_on_data: String = row.get(7);
    let created_at: NaiveDateTime = row.get(8);

    let basis: ForecastBasis = serde_json::from_str(&based_on_data).map_err(|e| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to deserialize forecast basis: {}", e),
        )) as RepositoryError
    })?;

    Ok(Forecast {
        id: Uuid::parse_str(&id)?,
        forecast_date: DateTime::from_naive_utc_and_offset(forecast_date, Utc),
        item: row.get(2),
        predicted_quantity: row.get(3),
        confidence: u8::try_from(confidence)?,
        current_stock: row.get(5),
        predicted_savings_in_cents: row.get(6),
        based_on_data: basis,
        created_at: DateTime::from_naive_utc_and_offset(created_at, Utc),
    })
}

#[async_trait]
impl SalesRepository for PostgresStore {
    async fn insert_sales(
        &self,
        records: Vec<NewSalesRecord>,
    ) -> Result<Vec<SalesRecord>, RepositoryError> {
        let validated = records
            .into_iter()
            .map(NewSalesRecord::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        if validated.is_empty() {
            return Ok(validated);
        }

        // One statement per batch so a failure leaves nothing behind
        let mut ids = Vec::with_capacity(validated.len());
        let mut sold_at = Vec::with_capacity(validated.len());
        let mut offsets = Vec::with_capacity(validated.len());
        let mut items = Vec::with_capacity(validated.len());
        let mut quantities = Vec::with_capacity(validated.len());
        let mut units = Vec::with_capacity(validated.len());
        let mut prices = Vec::with_capacity(validated.len());
        let mut suppliers = Vec::with_capacity(validated.len());
        let mut categories = Vec::with_capacity(validated.len());
        let mut uploaded_at = Vec::with_capacity(validated.len());

        for record in &validated {
            ids.push(record.id.to_string());
            sold_at.push(record.date.naive_utc());
            offsets.push(record.date.offset().local_minus_utc());
            items.push(record.item.clone());
            quantities.push(i64::from(record.quantity));
            units.push(record.unit.clone());
            prices.push(record.price_in_cents);
            suppliers.push(record.supplier.clone());
            categories.push(record.category.clone());
            uploaded_at.push(record.uploaded_at.naive_utc());
        }

        self.client
            .execute(
                "INSERT INTO sales_data (id, sold_at, utc_offset_seconds, item, quantity, unit,
                                         price_in_cents, supplier, category, uploaded_at)
                 SELECT * FROM UNNEST($1::TEXT[], $2::TIMESTAMP[], $3::INTEGER[], $4::TEXT[],
                                      $5::BIGINT[], $6::TEXT[], $7::BIGINT[], $8::TEXT[],
                                      $9::TEXT[], $10::TIMESTAMP[])",
                &[
                    &ids,
                    &sold_at,
                    &offsets,
                    &items,
                    &quantities,
                    &units,
                    &prices,
                    &suppliers,
                    &categories,
                    &uploaded_at,
                ],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to store {} sales records: {}",
                    validated.len(),
                    e
                ))) as RepositoryError
            })?;

        Ok(validated)
    }

    async fn get_recent_sales(&self, limit: usize) -> Result<Vec<SalesRecord>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_sales("ORDER BY sold_at DESC LIMIT $1", &[&limit])
            .await
    }

    async fn get_sales_by_item(&self, item: &str) -> Result<Vec<SalesRecord>, RepositoryError> {
        self.query_sales("WHERE item = $1 ORDER BY sold_at DESC", &[&item])
            .await
    }

    async fn get_sales_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SalesRecord>, RepositoryError> {
        let start = start.naive_utc();
        let end = end.naive_utc();
        self.query_sales(
            "WHERE sold_at >= $1 AND sold_at <= $2 ORDER BY sold_at DESC",
            &[&start, &end],
        )
        .await
    }
}

#[async_trait]
impl ForecastRepository for PostgresStore {
    async fn save_forecast(&self, forecast: NewForecast) -> Result<Forecast, RepositoryError> {
        let stored = Forecast::from_new(forecast);

        let based_on_data = serde_json::to_string(&stored.based_on_data).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to serialize forecast basis: {}", e),
            )) as RepositoryError
        })?;
        let id = stored.id.to_string();
        let forecast_date = stored.forecast_date.naive_utc();
        let confidence = i16::from(stored.confidence);
        let created_at = stored.created_at.naive_utc();

        self.client
            .execute(
                "INSERT INTO forecasts (id, forecast_date, item, predicted_quantity, confidence,
                                        current_stock, predicted_savings_in_cents, based_on_data, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &id,
                    &forecast_date,
                    &stored.item,
                    &stored.predicted_quantity,
                    &confidence,
                    &stored.current_stock,
                    &stored.predicted_savings_in_cents,
                    &based_on_data,
                    &created_at,
                ],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!("Failed to store forecast: {}", e)))
                    as RepositoryError
            })?;

        Ok(stored)
    }

    async fn get_recent_forecasts(&self, limit: usize) -> Result<Vec<Forecast>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let query = format!(
            "SELECT {} FROM forecasts ORDER BY created_at DESC LIMIT $1",
            FORECAST_COLUMNS
        );
        let rows = self.client.query(&query, &[&limit]).await.map_err(|e| {
            Box::new(std::io::Error::other(format!(
                "Failed to query forecasts: {}",
                e
            ))) as RepositoryError
        })?;
        rows.iter().map(row_to_forecast).collect()
    }

    async fn get_latest_forecast(&self) -> Result<Option<Forecast>, RepositoryError> {
        Ok(self.get_recent_forecasts(1).await?.into_iter().next())
    }
}
