//! Medicine and version item models.

use serde::{Deserialize, Serialize};

/// A medicine as listed in the pharmacy catalog.
///
/// Field letters follow the pricing sheet used at the counter
/// (A = base price, B = insurance price, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineDefinition {
    /// Unique catalog identifier
    pub id: u32,
    /// Display name
    pub name: String,
    /// A: unsubsidized unit price
    pub base_price: f64,
    /// B: insurance-subsidized unit price
    pub insurance_price: f64,
    /// C: per-unit price difference, stored independently of A - B
    pub price_difference: f64,
    /// E: maximum units insurance covers per prescription
    pub ceiling: u32,
    /// G: insurance co-pay discount rate in [0, 1]
    pub insurance_percent: f64,
}

impl MedicineDefinition {
    /// Create a medicine with the given prices.
    ///
    /// The price difference defaults to `base_price - insurance_price`.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        base_price: f64,
        insurance_price: f64,
        ceiling: u32,
        insurance_percent: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            base_price,
            insurance_price,
            price_difference: base_price - insurance_price,
            ceiling,
            insurance_percent,
        }
    }

    /// Override the stored price difference.
    pub fn with_price_difference(mut self, price_difference: f64) -> Self {
        self.price_difference = price_difference;
        self
    }
}

/// A medicine on the working prescription, with the dispensed quantities.
///
/// Carries a snapshot of the catalog entry so a persisted version prices
/// the same way it did when it was built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionItem {
    #[serde(flatten)]
    pub medicine: MedicineDefinition,
    /// D: total units dispensed
    pub delivered_count: u32,
    /// F: units dispensed beyond the insurance ceiling
    pub extra_count: u32,
}

impl VersionItem {
    /// Start a version item from a catalog entry.
    pub fn new(medicine: MedicineDefinition, delivered_count: u32, extra_count: u32) -> Self {
        Self {
            medicine,
            delivered_count,
            extra_count,
        }
    }

    /// Catalog id of the underlying medicine.
    pub fn id(&self) -> u32 {
        self.medicine.id
    }

    /// Accumulate another dispense of the same medicine.
    pub fn accumulate(&mut self, delivered_count: u32, extra_count: u32) {
        self.delivered_count = self.delivered_count.saturating_add(delivered_count);
        self.extra_count = self.extra_count.saturating_add(extra_count);
    }

    /// Units billed through insurance (D - F). Negative when F > D.
    pub fn insured_count(&self) -> i64 {
        i64::from(self.delivered_count) - i64::from(self.extra_count)
    }
}

/// Editable count column on a version item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CountField {
    DeliveredCount,
    ExtraCount,
}
