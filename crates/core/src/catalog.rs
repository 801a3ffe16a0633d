use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Read-only snapshot of one catalog row, as loaded by an external importer.
///
/// Price columns are kept under the importer's own header names because the
/// stores feed catalogs from several spreadsheet layouts; which column holds
/// "the unit price" varies per source. Resolution happens through the ordered
/// alias tables below, never by guessing a single canonical field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub category: String,
    pub quantity_available: Decimal,
    /// Price columns keyed by import header name, in base currency.
    pub prices: HashMap<String, Decimal>,
}

impl CatalogRecord {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        quantity_available: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            quantity_available,
            prices: HashMap::new(),
        }
    }

    pub fn with_price(mut self, field: impl Into<String>, value: Decimal) -> Self {
        self.prices.insert(field.into(), value);
        self
    }

    pub fn price(&self, field: &str) -> Option<Decimal> {
        self.prices.get(field).copied()
    }
}

/// Accepted header names for the unit price, most specific first.
pub const UNIT_ALIASES: &[&str] =
    &["precio_unitario", "precio_unit", "precio", "precio_venta", "unitario", "pvp"];

/// Offer / wholesale-dozen tier.
pub const OFFER_ALIASES: &[&str] =
    &["precio_oferta", "oferta", "precio_mayor", "precio_docena", "mayor"];

/// Floor price for high-volume sales.
pub const MINIMUM_ALIASES: &[&str] =
    &["precio_minimo", "minimo", "precio_mayorista", "p_minimo"];

/// List / ceiling price.
pub const MAXIMUM_ALIASES: &[&str] = &["precio_maximo", "maximo", "precio_lista", "lista"];

/// Bulk base price (per 50-gram sale unit, or per gram in Peru).
pub const BASE_ALIASES: &[&str] = &["precio_base", "base_granel", "precio_gramo", "base"];

/// First alias whose value is strictly positive wins. The alias order is part
/// of the contract: earlier names are the more trusted import sources.
pub fn first_positive(record: &CatalogRecord, aliases: &[&str]) -> Option<Decimal> {
    aliases
        .iter()
        .find_map(|alias| record.price(alias).filter(|value| *value > Decimal::ZERO))
}

/// Pricing class a category falls into. Category labels arrive as free text
/// from the catalog, so classification is tolerant of case and whitespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryClass {
    Granel,
    Botella,
    General,
}

impl CategoryClass {
    pub fn classify(category: &str) -> Self {
        let normalized = category.trim().to_lowercase();
        if normalized.contains("granel") {
            Self::Granel
        } else if normalized.contains("botella") {
            Self::Botella
        } else {
            Self::General
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{first_positive, CatalogRecord, CategoryClass, MINIMUM_ALIASES, UNIT_ALIASES};

    #[test]
    fn first_positive_respects_alias_order() {
        let record = CatalogRecord::new("A-1", "perfumes", Decimal::from(10))
            .with_price("precio", Decimal::new(900, 2))
            .with_price("precio_unitario", Decimal::new(1_200, 2));

        assert_eq!(first_positive(&record, UNIT_ALIASES), Some(Decimal::new(1_200, 2)));
    }

    #[test]
    fn first_positive_skips_zero_and_negative_values() {
        let record = CatalogRecord::new("A-2", "perfumes", Decimal::from(10))
            .with_price("precio_unitario", Decimal::ZERO)
            .with_price("precio_unit", Decimal::new(-500, 2))
            .with_price("precio", Decimal::new(700, 2));

        assert_eq!(first_positive(&record, UNIT_ALIASES), Some(Decimal::new(700, 2)));
    }

    #[test]
    fn first_positive_returns_none_when_no_alias_matches() {
        let record = CatalogRecord::new("A-3", "perfumes", Decimal::from(10))
            .with_price("precio", Decimal::new(700, 2));

        assert_eq!(first_positive(&record, MINIMUM_ALIASES), None);
    }

    #[test]
    fn classifies_categories_from_free_text() {
        assert_eq!(CategoryClass::classify("Esencias a GRANEL"), CategoryClass::Granel);
        assert_eq!(CategoryClass::classify("  botella 30ml "), CategoryClass::Botella);
        assert_eq!(CategoryClass::classify("Cremas"), CategoryClass::General);
    }
}
