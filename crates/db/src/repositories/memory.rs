use std::collections::HashMap;

use cotiza_core::chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::{history_epsilon, RateHistoryRow, RateStore, RepositoryError};

/// In-memory twin of `SqlRateRepository` for fixtures and tests. Applies the
/// same batch/epsilon semantics so callers cannot tell the difference.
#[derive(Default)]
pub struct InMemoryRateRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    current: HashMap<(String, String), Decimal>,
    history: HashMap<(String, String), Vec<RateHistoryRow>>,
}

impl InMemoryRateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RateStore for InMemoryRateRepository {
    async fn get_current_rate(
        &self,
        base: &str,
        currency: &str,
    ) -> Result<Option<Decimal>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.current.get(&(base.to_string(), currency.to_string())).copied())
    }

    async fn set_rates(
        &self,
        base: &str,
        rates: &HashMap<String, Decimal>,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let mut state = self.state.write().await;

        for (currency, rate) in rates {
            if *rate <= Decimal::ZERO {
                continue;
            }
            let key = (base.to_string(), currency.clone());
            let moved = match state.current.get(&key) {
                Some(previous) => (*rate - *previous).abs() > history_epsilon(),
                None => true,
            };
            state.current.insert(key.clone(), *rate);
            if moved {
                state
                    .history
                    .entry(key)
                    .or_default()
                    .push(RateHistoryRow { rate: *rate, recorded_at: now });
            }
        }
        Ok(())
    }

    async fn list_history(
        &self,
        base: &str,
        currency: &str,
        limit: u32,
    ) -> Result<Vec<RateHistoryRow>, RepositoryError> {
        let state = self.state.read().await;
        let rows = state
            .history
            .get(&(base.to_string(), currency.to_string()))
            .map(|rows| rows.iter().rev().take(limit as usize).cloned().collect())
            .unwrap_or_default();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::InMemoryRateRepository;
    use crate::RateStore;

    #[tokio::test]
    async fn behaves_like_the_sql_store() {
        let repo = InMemoryRateRepository::new();

        repo.set_rate("USD", "VES", Decimal::new(36_55, 2)).await.expect("save");
        repo.set_rate("USD", "VES", Decimal::new(36_55, 2)).await.expect("repeat");
        repo.set_rate("USD", "VES", Decimal::new(37_10, 2)).await.expect("move");

        assert_eq!(
            repo.get_current_rate("USD", "VES").await.expect("read"),
            Some(Decimal::new(37_10, 2))
        );

        let history = repo.list_history("USD", "VES", 10).await.expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].rate, Decimal::new(37_10, 2));
    }
}
