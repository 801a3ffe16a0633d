use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Jurisdiction the store operates in. Pricing and discount rules differ in
/// small but load-bearing ways per market, so the variant travels with every
/// resolution call instead of living in global state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    #[default]
    Venezuela,
    Peru,
}

impl Market {
    /// Multiplier applied to bulk ("granel") catalog prices. Catalogs store
    /// the price of a 50-gram sale unit, except in Peru where quantities are
    /// entered directly in grams and the stored price is already per gram.
    pub fn granel_multiplier(self) -> Decimal {
        match self {
            Self::Venezuela => Decimal::from(50),
            Self::Peru => Decimal::ONE,
        }
    }

    /// Fractional quantities only make sense where the quantity field is a
    /// weight; everywhere else quantities are whole sale units.
    pub fn allows_fractional_granel(self) -> bool {
        matches!(self, Self::Peru)
    }

    /// The cash-payment discount overlay is a Venezuela-only arrangement.
    pub fn cash_discount_available(self) -> bool {
        matches!(self, Self::Venezuela)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Venezuela => "venezuela",
            Self::Peru => "peru",
        }
    }
}

impl std::str::FromStr for Market {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "venezuela" | "ve" => Ok(Self::Venezuela),
            "peru" | "pe" => Ok(Self::Peru),
            other => Err(ConfigError::Validation(format!(
                "unsupported market `{other}` (expected venezuela|peru)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::Market;

    #[test]
    fn granel_multiplier_is_fifty_except_peru() {
        assert_eq!(Market::Venezuela.granel_multiplier(), Decimal::from(50));
        assert_eq!(Market::Peru.granel_multiplier(), Decimal::ONE);
    }

    #[test]
    fn parses_market_aliases() {
        assert_eq!("Venezuela".parse::<Market>().expect("parse"), Market::Venezuela);
        assert_eq!("pe".parse::<Market>().expect("parse"), Market::Peru);
        assert!("chile".parse::<Market>().is_err());
    }

    #[test]
    fn only_peru_accepts_fractional_bulk_quantities() {
        assert!(Market::Peru.allows_fractional_granel());
        assert!(!Market::Venezuela.allows_fractional_granel());
    }
}
