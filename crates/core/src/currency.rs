use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currently selected display currency for one quote session.
///
/// Owned by whatever orchestrates the session and passed into conversion
/// sites explicitly; there is deliberately no process-wide instance, so two
/// open quote windows cannot clobber each other's display currency. All
/// stored values stay in the base currency; conversion is read-time only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrencyContext {
    base: String,
    display: String,
    rate: Decimal,
}

impl CurrencyContext {
    /// Start a session in the base currency (rate 1).
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self { display: base.clone(), base, rate: Decimal::ONE }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn is_base(&self) -> bool {
        self.display == self.base
    }

    /// Replace the display currency and its base→display rate in one step.
    ///
    /// A non-positive rate is coerced to 1 so totals always render; selecting
    /// the base currency itself forces the rate to exactly 1 regardless of
    /// what the caller passed.
    pub fn set(&mut self, display: impl Into<String>, rate: Decimal) {
        let display = display.into();
        let rate = if display == self.base || rate <= Decimal::ZERO { Decimal::ONE } else { rate };
        self.display = display;
        self.rate = rate;
    }

    /// Pure base→display conversion; never writes anything back.
    pub fn convert_from_base(&self, amount: Decimal) -> Decimal {
        amount * self.rate
    }
}
