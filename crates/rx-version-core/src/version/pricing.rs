//! Prescription pricing formula.
//!
//! ```text
//! final = (D - F) * B * (1 - G)   insured portion
//!       + (D - F) * C             price difference on insured units
//!       + F * A                   units beyond the ceiling at base price
//! ```
//!
//! No rounding is applied. When F > D the first two terms go negative.

use serde::{Deserialize, Serialize};

use crate::models::VersionItem;

/// The three terms of a final price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceBreakdown {
    /// (D - F) * B * (1 - G)
    pub insured_portion: f64,
    /// (D - F) * C
    pub difference_adjustment: f64,
    /// F * A
    pub extra_charge: f64,
}

impl PriceBreakdown {
    /// Compute the breakdown for one item.
    pub fn for_item(item: &VersionItem) -> Self {
        let med = &item.medicine;
        let insured = item.insured_count() as f64;
        let extra = f64::from(item.extra_count);

        Self {
            insured_portion: insured * med.insurance_price * (1.0 - med.insurance_percent),
            difference_adjustment: insured * med.price_difference,
            extra_charge: extra * med.base_price,
        }
    }

    /// Sum of the three terms.
    pub fn total(&self) -> f64 {
        self.insured_portion + self.difference_adjustment + self.extra_charge
    }
}

/// Final payable price for one item.
pub fn final_price(item: &VersionItem) -> f64 {
    PriceBreakdown::for_item(item).total()
}

/// Sum of final prices, without the fee.
pub fn items_total(items: &[VersionItem]) -> f64 {
    items.iter().map(final_price).fold(0.0, |acc, price| acc + price)
}

/// Sum of final prices plus the technical fee.
pub fn total_price(items: &[VersionItem], technical_fee: f64) -> f64 {
    items_total(items) + technical_fee
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TECHNICAL_FEE;
    use crate::models::{Catalog, MedicineDefinition};

    fn item(id: u32, delivered: u32, extra: u32) -> VersionItem {
        let med = Catalog::standard().get(id).cloned().unwrap();
        VersionItem::new(med, delivered, extra)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_reference_example() {
        let item = item(2, 10, 2);
        let breakdown = PriceBreakdown::for_item(&item);

        assert_close(breakdown.insured_portion, 83200.0);
        assert_close(breakdown.difference_adjustment, 16000.0);
        assert_close(breakdown.extra_charge, 30000.0);
        assert_close(final_price(&item), 129200.0);
    }

    #[test]
    fn test_no_extra_units() {
        // 5 * 40000 * 0.75 + 5 * 5000
        assert_close(final_price(&item(3, 5, 0)), 175000.0);
    }

    #[test]
    fn test_all_units_extra() {
        // Everything billed at base price
        assert_close(final_price(&item(4, 3, 3)), 105000.0);
    }

    #[test]
    fn test_extra_exceeding_delivered_is_not_clamped() {
        let item = item(2, 1, 3);
        let breakdown = PriceBreakdown::for_item(&item);

        assert!(breakdown.insured_portion < 0.0);
        assert!(breakdown.difference_adjustment < 0.0);
        // -2 * 13000 * 0.8 - 2 * 2000 + 3 * 15000
        assert_close(final_price(&item), 20200.0);
    }

    #[test]
    fn test_stored_price_difference_is_used() {
        let med = MedicineDefinition::new(9, "Custom", 1000.0, 800.0, 10, 0.5)
            .with_price_difference(0.0);
        let item = VersionItem::new(med, 4, 0);
        assert_close(final_price(&item), 1600.0);
    }

    #[test]
    fn test_items_total_empty_is_positive_zero() {
        let total = items_total(&[]);
        assert_eq!(total, 0.0);
        assert!(total.is_sign_positive());
    }

    #[test]
    fn test_total_empty_is_fee() {
        assert_close(total_price(&[], TECHNICAL_FEE), 336000.0);
    }

    #[test]
    fn test_total_sums_items() {
        let items = vec![item(2, 10, 2), item(4, 3, 3)];
        assert_close(total_price(&items, TECHNICAL_FEE), 129200.0 + 105000.0 + 336000.0);
    }

    #[test]
    fn test_final_price_is_pure() {
        let item = item(1, 7, 2);
        let first = final_price(&item);
        let second = final_price(&item);
        assert_eq!(first.to_bits(), second.to_bits());
    }
}
