use std::collections::HashMap;
use std::str::FromStr;

use cotiza_core::chrono::Utc;
use rust_decimal::Decimal;
use sqlx::Row;

use super::{history_epsilon, RateHistoryRow, RateStore, RepositoryError};
use crate::DbPool;

/// SQLite-backed rate store. Rates are stored as decimal TEXT so nothing is
/// lost to float round-trips on the way through the driver.
pub struct SqlRateRepository {
    pool: DbPool,
}

impl SqlRateRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_rate(text: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(text)
        .map_err(|error| RepositoryError::Decode(format!("stored rate `{text}`: {error}")))
}

#[async_trait::async_trait]
impl RateStore for SqlRateRepository {
    async fn get_current_rate(
        &self,
        base: &str,
        currency: &str,
    ) -> Result<Option<Decimal>, RepositoryError> {
        let row = sqlx::query(
            "SELECT rate FROM exchange_rate_current WHERE base_code = ? AND currency_code = ?",
        )
        .bind(base)
        .bind(currency)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| decode_rate(&row.get::<String, _>("rate"))).transpose()
    }

    async fn set_rates(
        &self,
        base: &str,
        rates: &HashMap<String, Decimal>,
    ) -> Result<(), RepositoryError> {
        let mut entries: Vec<(&String, &Decimal)> =
            rates.iter().filter(|(_, rate)| **rate > Decimal::ZERO).collect();
        if entries.is_empty() {
            return Ok(());
        }
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (currency, rate) in entries {
            let previous = sqlx::query(
                "SELECT rate FROM exchange_rate_current WHERE base_code = ? AND currency_code = ?",
            )
            .bind(base)
            .bind(currency)
            .fetch_optional(&mut *tx)
            .await?
            .map(|row| decode_rate(&row.get::<String, _>("rate")))
            .transpose()?;

            sqlx::query(
                "INSERT INTO exchange_rate_current (base_code, currency_code, rate, updated_at)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT (base_code, currency_code)
                 DO UPDATE SET rate = excluded.rate, updated_at = excluded.updated_at",
            )
            .bind(base)
            .bind(currency)
            .bind(rate.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let moved = match previous {
                Some(previous) => (*rate - previous).abs() > history_epsilon(),
                None => true,
            };
            if moved {
                sqlx::query(
                    "INSERT INTO exchange_rate_history (base_code, currency_code, rate, recorded_at)
                     VALUES (?, ?, ?, ?)",
                )
                .bind(base)
                .bind(currency)
                .bind(rate.to_string())
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_history(
        &self,
        base: &str,
        currency: &str,
        limit: u32,
    ) -> Result<Vec<RateHistoryRow>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT rate, recorded_at FROM exchange_rate_history
             WHERE base_code = ? AND currency_code = ?
             ORDER BY recorded_at DESC, id DESC
             LIMIT ?",
        )
        .bind(base)
        .bind(currency)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(RateHistoryRow {
                    rate: decode_rate(&row.get::<String, _>("rate"))?,
                    recorded_at: row.get("recorded_at"),
                })
            })
            .collect()
    }
}
