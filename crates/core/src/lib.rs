pub mod catalog;
pub mod config;
pub mod currency;
pub mod discount;
pub mod line_item;
pub mod market;
pub mod money;
pub mod pricing;
pub mod rate_ledger;

pub use chrono;
pub use rust_decimal::Decimal;

pub use catalog::{first_positive, CatalogRecord, CategoryClass};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use currency::CurrencyContext;
pub use discount::{Discount, DiscountIntent, DiscountMode, CASH_DISCOUNT_PCT};
pub use line_item::{LineItem, LineItemPayload};
pub use market::Market;
pub use pricing::{resolve_unit_price, PriceTier};
pub use rate_ledger::{LedgerError, RateLedger};
