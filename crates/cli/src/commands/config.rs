use cotiza_core::config::{AppConfig, LoadOptions, LogFormat};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ConfigReport {
    database_url: String,
    database_max_connections: u32,
    database_timeout_secs: u64,
    market: String,
    base_currency: String,
    rate_ledger_path: String,
    log_level: String,
    log_format: &'static str,
}

pub fn run() -> String {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            let report = ConfigReport {
                database_url: config.database.url,
                database_max_connections: config.database.max_connections,
                database_timeout_secs: config.database.timeout_secs,
                market: config.store.market.as_str().to_string(),
                base_currency: config.store.base_currency,
                rate_ledger_path: config.store.rate_ledger_path.display().to_string(),
                log_level: config.logging.level,
                log_format: match config.logging.format {
                    LogFormat::Compact => "compact",
                    LogFormat::Pretty => "pretty",
                    LogFormat::Json => "json",
                },
            };
            serde_json::to_string_pretty(&report)
                .unwrap_or_else(|error| format!("{{\"error\":\"{error}\"}}"))
        }
        Err(error) => format!("{{\"error\":\"configuration issue: {error}\"}}"),
    }
}
