//! Priced summary of a version, as shown under the item table.

use serde::{Deserialize, Serialize};

use crate::models::VersionItem;
use crate::store::VersionStore;
use crate::version::{items_total, PriceBreakdown, VersionBuilder};

/// Full priced view of a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionSummary {
    /// Generation timestamp
    pub generated_at: String,
    /// Numbered rows in insertion order
    pub rows: Vec<SummaryRow>,
    /// Sum of final prices
    pub items_total: f64,
    /// Flat technical fee
    pub technical_fee: f64,
    /// Payable total (items + fee)
    pub grand_total: f64,
}

/// One priced row of the version table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Row number, starting at 1
    pub row: usize,
    pub medicine_id: u32,
    pub name: String,
    pub delivered_count: u32,
    pub extra_count: u32,
    pub base_price: f64,
    pub insurance_price: f64,
    pub price_difference: f64,
    pub ceiling: u32,
    pub insurance_percent: f64,
    pub breakdown: PriceBreakdown,
    pub final_price: f64,
}

impl SummaryRow {
    fn new(row: usize, item: &VersionItem) -> Self {
        let breakdown = PriceBreakdown::for_item(item);
        let med = &item.medicine;
        Self {
            row,
            medicine_id: med.id,
            name: med.name.clone(),
            delivered_count: item.delivered_count,
            extra_count: item.extra_count,
            base_price: med.base_price,
            insurance_price: med.insurance_price,
            price_difference: med.price_difference,
            ceiling: med.ceiling,
            insurance_percent: med.insurance_percent,
            breakdown,
            final_price: breakdown.total(),
        }
    }
}

impl VersionSummary {
    /// Price a list of items.
    pub fn from_items(items: &[VersionItem], technical_fee: f64) -> Self {
        let rows = items
            .iter()
            .enumerate()
            .map(|(i, item)| SummaryRow::new(i + 1, item))
            .collect();
        let items_total = items_total(items);

        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            rows,
            items_total,
            technical_fee,
            grand_total: items_total + technical_fee,
        }
    }

    /// Price the current state of a builder.
    pub fn from_builder<S: VersionStore>(builder: &VersionBuilder<S>) -> Self {
        Self::from_items(builder.items(), builder.settings().technical_fee)
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format, one line per row.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("row,medicine_id,name,delivered_count,extra_count,base_price,insurance_price,price_difference,ceiling,insurance_percent,final_price\n");

        for row in &self.rows {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{}\n",
                row.row,
                row.medicine_id,
                escape_csv(&row.name),
                row.delivered_count,
                row.extra_count,
                row.base_price,
                row.insurance_price,
                row.price_difference,
                row.ceiling,
                row.insurance_percent,
                row.final_price,
            ));
        }

        csv
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
