use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::round_money;

/// Extra discount bundled in when a Venezuela sale is paid in cash: 4.7619%.
pub const CASH_DISCOUNT_PCT: Decimal = Decimal::from_parts(47_619, 0, 0, false, 4);

/// Tolerance for percent comparisons around the cash overlay. Repeated
/// enable/disable toggles must not oscillate on residue.
pub const PERCENT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountMode {
    #[default]
    None,
    Percent,
    Amount,
}

/// Normalized discount descriptor. Exactly one side is the source of truth,
/// named by `mode`; the other side is derived and re-derived whenever the
/// subtotal moves. `percent` stays unrounded so displays do not drift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub mode: DiscountMode,
    pub percent: Decimal,
    pub amount: Decimal,
}

impl Discount {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.mode == DiscountMode::None
    }
}

/// What the operator asked for, before normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DiscountIntent {
    Clear,
    Percent(Decimal),
    Amount(Decimal),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscountOutcome {
    pub discount: Discount,
    pub total: Decimal,
}

/// Normalize a discount intent against a subtotal.
///
/// A non-positive subtotal short-circuits to no discount regardless of the
/// intent; there is nothing meaningful to discount and totals must stay
/// renderable.
pub fn apply(subtotal: Decimal, intent: DiscountIntent) -> DiscountOutcome {
    if subtotal <= Decimal::ZERO {
        return outcome(subtotal, Discount::none());
    }

    let discount = match intent {
        DiscountIntent::Clear => Discount::none(),
        DiscountIntent::Percent(requested) => {
            let percent = requested.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
            Discount {
                mode: DiscountMode::Percent,
                percent,
                amount: round_money(subtotal * percent / Decimal::ONE_HUNDRED),
            }
        }
        DiscountIntent::Amount(requested) => {
            let amount = requested.clamp(Decimal::ZERO, subtotal);
            Discount {
                mode: DiscountMode::Amount,
                percent: amount * Decimal::ONE_HUNDRED / subtotal,
                amount,
            }
        }
    };

    outcome(subtotal, discount)
}

/// Re-derive a stored discount after the subtotal changed. The side named by
/// `mode` is replayed as the intent; swapping sides here would silently turn
/// a percent discount into a fixed one (or vice versa) mid-edit.
pub fn rederive(subtotal: Decimal, discount: Discount) -> DiscountOutcome {
    let intent = match discount.mode {
        DiscountMode::None => DiscountIntent::Clear,
        DiscountMode::Percent => DiscountIntent::Percent(discount.percent),
        DiscountMode::Amount => DiscountIntent::Amount(discount.amount),
    };
    apply(subtotal, intent)
}

/// Percent the discount works out to against the given subtotal, whichever
/// side is the source of truth.
pub fn effective_percent(subtotal: Decimal, discount: &Discount) -> Decimal {
    match discount.mode {
        DiscountMode::None => Decimal::ZERO,
        DiscountMode::Percent => discount.percent,
        DiscountMode::Amount => {
            if subtotal > Decimal::ZERO {
                discount.amount * Decimal::ONE_HUNDRED / subtotal
            } else {
                Decimal::ZERO
            }
        }
    }
}

/// Fold the cash-payment discount into the line's discount. Returns the new
/// outcome and the memoized user-chosen percent (excluding the cash share),
/// which is what makes `disable_cash_overlay` exact.
pub fn enable_cash_overlay(subtotal: Decimal, discount: Discount) -> (DiscountOutcome, Decimal) {
    let user_percent = effective_percent(subtotal, &discount);
    let combined =
        (user_percent + CASH_DISCOUNT_PCT).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    (apply(subtotal, DiscountIntent::Percent(combined)), user_percent)
}

/// Peel the cash share back out of the composed discount.
pub fn disable_cash_overlay(subtotal: Decimal, discount: Discount) -> (DiscountOutcome, Decimal) {
    let user_percent =
        (effective_percent(subtotal, &discount) - CASH_DISCOUNT_PCT).max(Decimal::ZERO);
    if user_percent < PERCENT_EPSILON {
        (apply(subtotal, DiscountIntent::Clear), Decimal::ZERO)
    } else {
        (apply(subtotal, DiscountIntent::Percent(user_percent)), user_percent)
    }
}

/// Reconcile a line reloaded from a persisted quote that already carries the
/// cash share baked into its discount. Infers the user-chosen percent without
/// adding the cash share a second time. A composed percent below the cash
/// share means the stored row was partial or corrupted; it is lifted back to
/// exactly the cash share, best-effort.
pub fn sync_cash_overlay(subtotal: Decimal, discount: Discount) -> (DiscountOutcome, Decimal) {
    let composed = effective_percent(subtotal, &discount);
    if composed < CASH_DISCOUNT_PCT - PERCENT_EPSILON {
        return (apply(subtotal, DiscountIntent::Percent(CASH_DISCOUNT_PCT)), Decimal::ZERO);
    }
    let user_percent = (composed - CASH_DISCOUNT_PCT).max(Decimal::ZERO);
    (apply(subtotal, DiscountIntent::Percent(composed)), user_percent)
}

fn outcome(subtotal: Decimal, discount: Discount) -> DiscountOutcome {
    let total = round_money(subtotal - discount.amount).max(Decimal::ZERO);
    DiscountOutcome { discount, total }
}
