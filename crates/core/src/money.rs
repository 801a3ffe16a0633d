use rust_decimal::{Decimal, RoundingStrategy};

/// Round a base-currency amount to cents. Midpoints round away from zero,
/// matching what the receipts print, not rust_decimal's banker's default.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::round_money;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_money(Decimal::new(97_619, 4)), Decimal::new(976, 2));
        assert_eq!(round_money(Decimal::new(10_000, 3)), Decimal::new(1_000, 2));
    }

    #[test]
    fn midpoints_round_away_from_zero() {
        assert_eq!(round_money(Decimal::new(1_005, 3)), Decimal::new(101, 2));
        assert_eq!(round_money(Decimal::new(-1_005, 3)), Decimal::new(-101, 2));
    }
}
