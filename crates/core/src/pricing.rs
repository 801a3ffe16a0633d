use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{
    self, CatalogRecord, CategoryClass, BASE_ALIASES, MAXIMUM_ALIASES, MINIMUM_ALIASES,
    OFFER_ALIASES, UNIT_ALIASES,
};
use crate::market::Market;

/// Logical price point the operator can pin a line to, independent of which
/// catalog column actually carries it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Unit,
    Offer,
    Minimum,
    Maximum,
    Base,
}

impl PriceTier {
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Unit => UNIT_ALIASES,
            Self::Offer => OFFER_ALIASES,
            Self::Minimum => MINIMUM_ALIASES,
            Self::Maximum => MAXIMUM_ALIASES,
            Self::Base => BASE_ALIASES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Offer => "offer",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Base => "base",
        }
    }
}

/// Resolve the base-currency unit price for one line.
///
/// Precedence: a manual override wins outright; an explicit tier is honored
/// when it resolves to a positive value; otherwise the category rule decides.
pub fn resolve_unit_price(
    market: Market,
    category: &str,
    record: &CatalogRecord,
    quantity: Decimal,
    override_price: Option<Decimal>,
    explicit_tier: Option<PriceTier>,
) -> Decimal {
    if let Some(price) = override_price {
        return price;
    }

    if let Some(tier) = explicit_tier {
        if let Some(price) = catalog::first_positive(record, tier.aliases()) {
            return price;
        }
        // Tier did not resolve to a positive value; fall through.
    }

    category_rule_price(market, CategoryClass::classify(category), record, quantity)
}

fn category_rule_price(
    market: Market,
    class: CategoryClass,
    record: &CatalogRecord,
    quantity: Decimal,
) -> Decimal {
    match class {
        CategoryClass::Granel => catalog::first_positive(record, BASE_ALIASES)
            .or_else(|| catalog::first_positive(record, UNIT_ALIASES))
            .map(|price| price * market.granel_multiplier())
            .unwrap_or(Decimal::ZERO),
        CategoryClass::Botella => {
            if quantity >= Decimal::from(100) {
                if let Some(price) = catalog::first_positive(record, MINIMUM_ALIASES) {
                    return price;
                }
            }
            if quantity >= Decimal::from(12) {
                if let Some(price) = catalog::first_positive(record, OFFER_ALIASES) {
                    return price;
                }
            }
            catalog::first_positive(record, UNIT_ALIASES).unwrap_or(Decimal::ZERO)
        }
        CategoryClass::General => catalog::first_positive(record, UNIT_ALIASES)
            .or_else(|| catalog::first_positive(record, MAXIMUM_ALIASES))
            .unwrap_or(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::catalog::CatalogRecord;
    use crate::market::Market;

    use super::{resolve_unit_price, PriceTier};

    fn bottle_record() -> CatalogRecord {
        CatalogRecord::new("B-1", "botella", Decimal::from(500))
            .with_price("precio_unitario", Decimal::from(10))
            .with_price("precio_oferta", Decimal::from(9))
            .with_price("precio_minimo", Decimal::from(8))
    }

    #[test]
    fn override_beats_everything() {
        let record = bottle_record();
        let price = resolve_unit_price(
            Market::Venezuela,
            "botella",
            &record,
            Decimal::from(200),
            Some(Decimal::new(1_234, 2)),
            Some(PriceTier::Minimum),
        );
        assert_eq!(price, Decimal::new(1_234, 2));
    }

    #[test]
    fn explicit_tier_resolves_through_aliases() {
        let record = bottle_record();
        let price = resolve_unit_price(
            Market::Venezuela,
            "botella",
            &record,
            Decimal::ONE,
            None,
            Some(PriceTier::Offer),
        );
        assert_eq!(price, Decimal::from(9));
    }

    #[test]
    fn unresolvable_tier_falls_back_to_category_rule() {
        let record = CatalogRecord::new("B-2", "botella", Decimal::from(10))
            .with_price("precio_unitario", Decimal::from(10))
            .with_price("precio_minimo", Decimal::ZERO);

        let price = resolve_unit_price(
            Market::Venezuela,
            "botella",
            &record,
            Decimal::ONE,
            None,
            Some(PriceTier::Minimum),
        );
        assert_eq!(price, Decimal::from(10));
    }

    #[test]
    fn bottle_quantity_tiers() {
        let record = bottle_record();
        let price_at = |quantity: i64| {
            resolve_unit_price(
                Market::Venezuela,
                "botella",
                &record,
                Decimal::from(quantity),
                None,
                None,
            )
        };

        assert_eq!(price_at(1), Decimal::from(10));
        assert_eq!(price_at(10), Decimal::from(10));
        assert_eq!(price_at(12), Decimal::from(9));
        assert_eq!(price_at(99), Decimal::from(9));
        assert_eq!(price_at(100), Decimal::from(8));
    }

    #[test]
    fn bottle_tier_with_zero_floor_price_uses_next_rung() {
        let record = CatalogRecord::new("B-3", "botella", Decimal::from(10))
            .with_price("precio_unitario", Decimal::from(10))
            .with_price("precio_oferta", Decimal::from(9))
            .with_price("precio_minimo", Decimal::ZERO);

        let price = resolve_unit_price(
            Market::Venezuela,
            "botella",
            &record,
            Decimal::from(150),
            None,
            None,
        );
        assert_eq!(price, Decimal::from(9));
    }

    #[test]
    fn granel_price_is_per_fifty_gram_unit_outside_peru() {
        let record = CatalogRecord::new("G-1", "esencias a granel", Decimal::from(1_000))
            .with_price("precio_base", Decimal::new(30, 1));

        let venezuela = resolve_unit_price(
            Market::Venezuela,
            "esencias a granel",
            &record,
            Decimal::ONE,
            None,
            None,
        );
        let peru = resolve_unit_price(
            Market::Peru,
            "esencias a granel",
            &record,
            Decimal::ONE,
            None,
            None,
        );

        assert_eq!(venezuela, Decimal::from(150));
        assert_eq!(peru, Decimal::new(30, 1));
    }

    #[test]
    fn granel_falls_back_to_unit_aliases() {
        let record = CatalogRecord::new("G-2", "granel", Decimal::from(100))
            .with_price("precio_venta", Decimal::from(2));

        let price =
            resolve_unit_price(Market::Venezuela, "granel", &record, Decimal::ONE, None, None);
        assert_eq!(price, Decimal::from(100));
    }

    #[test]
    fn general_category_uses_unit_then_list_price() {
        let record = CatalogRecord::new("C-1", "cremas", Decimal::from(10))
            .with_price("precio_lista", Decimal::from(7));

        let price =
            resolve_unit_price(Market::Venezuela, "cremas", &record, Decimal::ONE, None, None);
        assert_eq!(price, Decimal::from(7));
    }

    #[test]
    fn empty_record_resolves_to_zero() {
        let record = CatalogRecord::new("C-2", "cremas", Decimal::from(10));
        let price =
            resolve_unit_price(Market::Venezuela, "cremas", &record, Decimal::ONE, None, None);
        assert_eq!(price, Decimal::ZERO);
    }
}
