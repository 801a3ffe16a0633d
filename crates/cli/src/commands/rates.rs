use std::collections::{BTreeMap, HashMap};

use cotiza_core::config::{AppConfig, LoadOptions};
use cotiza_core::rate_ledger::RateLedger;
use cotiza_db::{connect_with_settings, RateStore, SqlRateRepository};
use rust_decimal::Decimal;
use tracing::info;

use crate::commands::CommandResult;

/// Record a batch of CODE=RATE observations: append them to the plain-text
/// ledger, then save them as current rates in one transaction. Same dual
/// write the currency dialog performs on save.
pub fn record(pairs: &[String]) -> CommandResult {
    let config = match load_config("rates record") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let mut rates: HashMap<String, Decimal> = HashMap::new();
    for pair in pairs {
        let Some((code, rate_text)) = pair.split_once('=') else {
            return CommandResult::failure(
                "rates record",
                "input_validation",
                format!("expected CODE=RATE, got `{pair}`"),
                2,
            );
        };
        let Ok(rate) = rate_text.trim().parse::<Decimal>() else {
            return CommandResult::failure(
                "rates record",
                "input_validation",
                format!("rate for `{code}` is not a number: `{rate_text}`"),
                2,
            );
        };
        rates.insert(code.trim().to_ascii_uppercase(), rate);
    }

    let ledger = RateLedger::new(&config.store.rate_ledger_path);
    if let Err(error) = ledger.append_rates(&rates) {
        return CommandResult::failure("rates record", "ledger_append", error.to_string(), 4);
    }

    let runtime = match build_runtime("rates record") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let saved = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let repository = SqlRateRepository::new(pool.clone());
        repository
            .set_rates(&config.store.base_currency, &rates)
            .await
            .map_err(|error| ("rate_store", error.to_string(), 5u8))?;
        pool.close().await;
        Ok::<(), (&'static str, String, u8)>(())
    });

    match saved {
        Ok(()) => {
            info!(
                event_name = "rates.record.saved",
                base = %config.store.base_currency,
                count = rates.len(),
                "exchange rates recorded"
            );
            CommandResult::success(
                "rates record",
                format!("recorded {} rate(s) against {}", rates.len(), config.store.base_currency),
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("rates record", error_class, message, exit_code)
        }
    }
}

/// Effective per-currency rates for the local calendar date, from the ledger.
pub fn today() -> CommandResult {
    let config = match load_config("rates today") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let ledger = RateLedger::new(&config.store.rate_ledger_path);
    match ledger.load_today_rates() {
        Ok(rates) => {
            let ordered: BTreeMap<String, Decimal> = rates.into_iter().collect();
            CommandResult {
                exit_code: 0,
                output: serde_json::to_string_pretty(&ordered)
                    .unwrap_or_else(|_| "{}".to_string()),
            }
        }
        Err(error) => CommandResult::failure("rates today", "ledger_read", error.to_string(), 4),
    }
}

pub fn history(currency: &str, limit: u32) -> CommandResult {
    let config = match load_config("rates history") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match build_runtime("rates history") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let currency = currency.trim().to_ascii_uppercase();
    let rows = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let repository = SqlRateRepository::new(pool.clone());
        let rows = repository
            .list_history(&config.store.base_currency, &currency, limit)
            .await
            .map_err(|error| ("rate_store", error.to_string(), 5u8))?;
        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(rows)
    });

    match rows {
        Ok(rows) => CommandResult {
            exit_code: 0,
            output: serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string()),
        },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("rates history", error_class, message, exit_code)
        }
    }
}

fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

fn build_runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}
