use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogRecord, CategoryClass};
use crate::discount::{self, Discount, DiscountIntent, DiscountMode};
use crate::market::Market;
use crate::money::round_money;
use crate::pricing::{resolve_unit_price, PriceTier};

/// One quoted line. Owns the base-currency truth (price, subtotal, discount,
/// total) and recomputes all of it through the price resolver and discount
/// normalizer on every mutation; currency conversion happens only when a
/// caller reads these values through a `CurrencyContext`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    code: String,
    description: String,
    category: String,
    quantity: Decimal,
    factor: Decimal,
    unit_price: Decimal,
    subtotal: Decimal,
    discount: Discount,
    total: Decimal,
    override_price: Option<Decimal>,
    tier: Option<PriceTier>,
    /// Operator-chosen discount percent excluding the cash share. Persisted so
    /// the cash overlay stays reversible across reloads.
    user_percent: Option<Decimal>,
}

impl LineItem {
    pub fn new(
        record: &CatalogRecord,
        description: impl Into<String>,
        quantity: Decimal,
        market: Market,
    ) -> Self {
        let mut item = Self {
            code: record.id.clone(),
            description: description.into(),
            category: record.category.clone(),
            quantity: Decimal::ZERO,
            factor: Decimal::ONE,
            unit_price: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            discount: Discount::none(),
            total: Decimal::ZERO,
            override_price: None,
            tier: None,
            user_percent: None,
        };
        item.quantity = item.normalize_quantity(quantity, market);
        item.recompute(record, market);
        item
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn factor(&self) -> Decimal {
        self.factor
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    pub fn discount(&self) -> &Discount {
        &self.discount
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn override_price(&self) -> Option<Decimal> {
        self.override_price
    }

    pub fn tier(&self) -> Option<PriceTier> {
        self.tier
    }

    pub fn user_percent(&self) -> Option<Decimal> {
        self.user_percent
    }

    pub fn set_quantity(&mut self, quantity: Decimal, record: &CatalogRecord, market: Market) {
        self.quantity = self.normalize_quantity(quantity, market);
        self.recompute(record, market);
    }

    /// Category-specific sale-unit multiplier (e.g. one sale unit covering
    /// several stock units). Non-positive values fall back to 1.
    pub fn set_factor(&mut self, factor: Decimal, record: &CatalogRecord, market: Market) {
        self.factor = if factor > Decimal::ZERO { factor } else { Decimal::ONE };
        self.recompute(record, market);
    }

    pub fn set_override(
        &mut self,
        price: Option<Decimal>,
        record: &CatalogRecord,
        market: Market,
    ) {
        self.override_price = price;
        self.recompute(record, market);
    }

    pub fn set_tier(&mut self, tier: Option<PriceTier>, record: &CatalogRecord, market: Market) {
        self.tier = tier;
        self.recompute(record, market);
    }

    /// Adopt the category of a refreshed catalog record and re-resolve.
    pub fn reassign_category(&mut self, record: &CatalogRecord, market: Market) {
        self.category = record.category.clone();
        self.quantity = self.normalize_quantity(self.quantity, market);
        self.recompute(record, market);
    }

    /// Normalize and apply a discount intent against the current subtotal.
    pub fn apply_discount(&mut self, intent: DiscountIntent) {
        let outcome = discount::apply(self.subtotal, intent);
        self.discount = outcome.discount;
        self.total = outcome.total;
    }

    pub fn enable_cash_discount(&mut self, market: Market) {
        if !market.cash_discount_available() {
            return;
        }
        let (outcome, user_percent) = discount::enable_cash_overlay(self.subtotal, self.discount);
        self.discount = outcome.discount;
        self.total = outcome.total;
        self.user_percent = Some(user_percent);
    }

    pub fn disable_cash_discount(&mut self, market: Market) {
        if !market.cash_discount_available() {
            return;
        }
        let (outcome, user_percent) = discount::disable_cash_overlay(self.subtotal, self.discount);
        self.discount = outcome.discount;
        self.total = outcome.total;
        self.user_percent = Some(user_percent);
    }

    /// Reconcile a line reloaded from a quote saved with the cash discount
    /// already baked in. Never re-applies the cash share.
    pub fn sync_cash_discount(&mut self, market: Market) {
        if !market.cash_discount_available() {
            return;
        }
        let (outcome, user_percent) = discount::sync_cash_overlay(self.subtotal, self.discount);
        self.discount = outcome.discount;
        self.total = outcome.total;
        self.user_percent = Some(user_percent);
    }

    /// Wire payload consumed by persistence and presentation.
    pub fn payload(&self) -> LineItemPayload {
        LineItemPayload {
            codigo: self.code.clone(),
            producto: self.description.clone(),
            categoria: self.category.clone(),
            cantidad: self.quantity,
            precio: self.unit_price,
            subtotal_base: self.subtotal,
            descuento_mode: self.discount.mode,
            descuento_pct: self.discount.percent,
            descuento_monto: self.discount.amount,
            total: self.total,
            precio_override: self.override_price,
            precio_tier: self.tier,
        }
    }

    fn normalize_quantity(&self, quantity: Decimal, market: Market) -> Decimal {
        let fractional_ok = market.allows_fractional_granel()
            && CategoryClass::classify(&self.category) == CategoryClass::Granel;
        if fractional_ok {
            quantity
        } else {
            quantity.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        }
    }

    fn recompute(&mut self, record: &CatalogRecord, market: Market) {
        self.unit_price = resolve_unit_price(
            market,
            &self.category,
            record,
            self.quantity,
            self.override_price,
            self.tier,
        );
        self.subtotal = round_money(self.unit_price * self.quantity * self.factor);
        let outcome = discount::rederive(self.subtotal, self.discount);
        self.discount = outcome.discount;
        self.total = outcome.total;
    }
}

/// Persistence/presentation payload, keyed the way the documents and the
/// quote store expect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItemPayload {
    pub codigo: String,
    pub producto: String,
    pub categoria: String,
    pub cantidad: Decimal,
    pub precio: Decimal,
    pub subtotal_base: Decimal,
    pub descuento_mode: DiscountMode,
    pub descuento_pct: Decimal,
    pub descuento_monto: Decimal,
    pub total: Decimal,
    pub precio_override: Option<Decimal>,
    pub precio_tier: Option<PriceTier>,
}
