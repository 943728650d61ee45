use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A priced line on a quote or invoice.
///
/// Lines that reference a stock article carry its `inventory_id`, which is
/// what the work-order sync uses to rebuild the required-inventory list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_id: Option<String>,
}

impl LineItem {
    pub fn total(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// A labor line: billed hours at an hourly rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborLine {
    pub description: String,
    pub hours: Decimal,
    pub rate: Decimal,
}

impl LaborLine {
    pub fn total(&self) -> Decimal {
        self.hours * self.rate
    }
}

/// Monetary totals of a document.
///
/// Totals are computed once where the document originates and carried
/// verbatim through every conversion; the engine never recalculates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Derives totals from line and labor data at the given VAT percentage.
    pub fn from_lines(items: &[LineItem], labor: &[LaborLine], vat_rate: Decimal) -> Self {
        let subtotal: Decimal = items.iter().map(LineItem::total).sum::<Decimal>()
            + labor.iter().map(LaborLine::total).sum::<Decimal>();
        let vat_amount = (subtotal * vat_rate / Decimal::from(100)).round_dp(2);
        Self {
            subtotal,
            vat_rate,
            vat_amount,
            total: subtotal + vat_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(qty: &str, price: &str) -> LineItem {
        LineItem {
            description: "Artikel".into(),
            quantity: qty.parse().unwrap(),
            unit_price: price.parse().unwrap(),
            inventory_id: None,
        }
    }

    #[test]
    fn line_item_total() {
        assert_eq!(item("3", "12.50").total(), dec!(37.50));
    }

    #[test]
    fn labor_line_total() {
        let labor = LaborLine {
            description: "Montage".into(),
            hours: dec!(2.5),
            rate: dec!(60),
        };
        assert_eq!(labor.total(), dec!(150.0));
    }

    #[test]
    fn totals_from_lines_applies_vat() {
        let items = vec![item("2", "100")];
        let labor = vec![LaborLine {
            description: "Installatie".into(),
            hours: dec!(1),
            rate: dec!(80),
        }];
        let totals = Totals::from_lines(&items, &labor, dec!(21));
        assert_eq!(totals.subtotal, dec!(280));
        assert_eq!(totals.vat_amount, dec!(58.80));
        assert_eq!(totals.total, dec!(338.80));
    }

    #[test]
    fn totals_zero_lines() {
        let totals = Totals::from_lines(&[], &[], dec!(21));
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn totals_serialization_roundtrip() {
        let totals = Totals::from_lines(&[item("1", "99.99")], &[], dec!(9));
        let json = serde_json::to_string(&totals).unwrap();
        let parsed: Totals = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, totals);
    }
}
