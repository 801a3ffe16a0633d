use std::collections::HashMap;

use async_trait::async_trait;
use cotiza_core::chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

pub mod memory;
pub mod rates;

pub use memory::InMemoryRateRepository;
pub use rates::SqlRateRepository;

/// A rate only reaches the history table when it moved by more than this
/// against the stored current value; repeated no-op saves must not spam it.
pub fn history_epsilon() -> Decimal {
    Decimal::new(1, 4)
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RateHistoryRow {
    pub rate: Decimal,
    pub recorded_at: DateTime<Utc>,
}

/// Relational current+history exchange-rate store. One `set_rates` call is
/// one transaction: either the whole batch lands or none of it does.
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn get_current_rate(
        &self,
        base: &str,
        currency: &str,
    ) -> Result<Option<Decimal>, RepositoryError>;

    /// Upsert every positive rate in the batch; non-positive rates are
    /// skipped. A history row is appended only when the rate actually moved.
    async fn set_rates(
        &self,
        base: &str,
        rates: &HashMap<String, Decimal>,
    ) -> Result<(), RepositoryError>;

    async fn set_rate(
        &self,
        base: &str,
        currency: &str,
        rate: Decimal,
    ) -> Result<(), RepositoryError> {
        let mut batch = HashMap::new();
        batch.insert(currency.to_string(), rate);
        self.set_rates(base, &batch).await
    }

    /// History rows for one currency pair, newest first.
    async fn list_history(
        &self,
        base: &str,
        currency: &str,
        limit: u32,
    ) -> Result<Vec<RateHistoryRow>, RepositoryError>;
}
