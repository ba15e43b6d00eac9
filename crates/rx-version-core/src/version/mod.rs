//! Version builder: the working prescription list and its pricing.
//!
//! Flow: select medicine + counts → validate → upsert row → persist.
//! Prices and totals are derived on every call, never cached.

mod input;
mod pricing;

pub use input::*;
pub use pricing::*;

use thiserror::Error;

use crate::config::Settings;
use crate::models::{Catalog, CountField, MedicineDefinition, VersionItem};
use crate::store::VersionStore;

/// Rejected add request. The message is what the error banner shows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no medicine selected")]
    NoMedicineSelected,

    #[error("delivered count must be a positive number")]
    InvalidDeliveredCount,

    #[error("extra count cannot be negative")]
    NegativeExtraCount,

    #[error("medicine {0} is not in the catalog")]
    UnknownMedicine(String),
}

/// Builds a prescription version against a catalog and a store.
pub struct VersionBuilder<S: VersionStore> {
    catalog: Catalog,
    store: S,
    settings: Settings,
    items: Vec<VersionItem>,
    error: Option<ValidationError>,
}

impl<S: VersionStore> VersionBuilder<S> {
    /// Create a builder, restoring any list previously saved in `store`.
    ///
    /// A missing or unreadable saved list starts an empty version.
    pub fn open(catalog: Catalog, store: S, settings: Settings) -> Self {
        let items = match store.load() {
            Ok(Some(items)) => {
                tracing::info!(count = items.len(), "Restored saved version");
                items
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable saved version: {e}");
                Vec::new()
            }
        };

        Self {
            catalog,
            store,
            settings,
            items,
            error: None,
        }
    }

    /// Current working list, in insertion order.
    pub fn items(&self) -> &[VersionItem] {
        &self.items
    }

    pub fn item(&self, medicine_id: u32) -> Option<&VersionItem> {
        self.items.iter().find(|item| item.id() == medicine_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Error from the last rejected add, if not yet cleared.
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Dismiss the current error banner.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Add a medicine to the version, or add to its counts if already listed.
    ///
    /// Inputs are the raw form values. On failure the error is also kept as
    /// the current error and the list is left untouched.
    pub fn add_or_increment(
        &mut self,
        medicine_id: &str,
        delivered_count: &str,
        extra_count: &str,
    ) -> Result<(), ValidationError> {
        match self.validate_add(medicine_id, delivered_count, extra_count) {
            Ok((medicine, delivered, extra)) => {
                self.error = None;
                self.upsert(medicine, delivered, extra);
                self.persist();
                Ok(())
            }
            Err(e) => {
                tracing::debug!("Rejected add: {e}");
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn validate_add(
        &self,
        medicine_id: &str,
        delivered_count: &str,
        extra_count: &str,
    ) -> Result<(MedicineDefinition, u32, u32), ValidationError> {
        let medicine_id = medicine_id.trim();
        if medicine_id.is_empty() {
            return Err(ValidationError::NoMedicineSelected);
        }

        let delivered =
            parse_positive(delivered_count).ok_or(ValidationError::InvalidDeliveredCount)?;
        let extra = parse_non_negative(extra_count).ok_or(ValidationError::NegativeExtraCount)?;

        let medicine = medicine_id
            .parse::<u32>()
            .ok()
            .and_then(|id| self.catalog.get(id))
            .cloned()
            .ok_or_else(|| {
                tracing::warn!(medicine_id, "Selected medicine is not in the catalog");
                ValidationError::UnknownMedicine(medicine_id.to_string())
            })?;

        Ok((medicine, delivered, extra))
    }

    fn upsert(&mut self, medicine: MedicineDefinition, delivered: u32, extra: u32) {
        let id = medicine.id;
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(existing) => {
                existing.accumulate(delivered, extra);
                tracing::debug!(
                    id,
                    delivered = existing.delivered_count,
                    extra = existing.extra_count,
                    "Incremented version item"
                );
            }
            None => {
                self.items.push(VersionItem::new(medicine, delivered, extra));
                tracing::debug!(id, delivered, extra, "Added version item");
            }
        }
    }

    /// Remove a medicine from the version. Absent ids are ignored.
    pub fn remove(&mut self, medicine_id: u32) {
        let before = self.items.len();
        self.items.retain(|item| item.id() != medicine_id);

        if self.items.len() != before {
            tracing::debug!(id = medicine_id, "Removed version item");
            self.persist();
        }
    }

    /// Overwrite one count on a listed medicine.
    ///
    /// Values without leading digits, or negative, are dropped without
    /// surfacing an error.
    pub fn update_field(&mut self, medicine_id: u32, field: CountField, raw_value: &str) {
        let Some(value) = parse_non_negative(raw_value) else {
            tracing::debug!(id = medicine_id, raw_value, "Ignored invalid count edit");
            return;
        };

        let mut changed = false;
        for item in self.items.iter_mut().filter(|item| item.id() == medicine_id) {
            match field {
                CountField::DeliveredCount => item.delivered_count = value,
                CountField::ExtraCount => item.extra_count = value,
            }
            changed = true;
        }

        if changed {
            tracing::debug!(id = medicine_id, ?field, value, "Updated version item");
            self.persist();
        }
    }

    /// Empty the version and forget the saved copy.
    pub fn clear(&mut self) {
        self.items.clear();
        self.error = None;

        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear saved version: {e}");
        } else {
            tracing::info!("Cleared version");
        }
    }

    /// Final payable price of one item.
    pub fn compute_final_price(&self, item: &VersionItem) -> f64 {
        final_price(item)
    }

    /// Sum of all final prices plus the technical fee.
    pub fn compute_total(&self) -> f64 {
        total_price(&self.items, self.settings.technical_fee)
    }

    /// Sum of all final prices, without the fee.
    pub fn items_total(&self) -> f64 {
        items_total(&self.items)
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.items) {
            tracing::error!("Failed to save version: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError, StoreResult};

    /// Store whose writes always fail.
    struct FailingStore;

    impl VersionStore for FailingStore {
        fn load(&self) -> StoreResult<Option<Vec<VersionItem>>> {
            Ok(None)
        }

        fn save(&mut self, _items: &[VersionItem]) -> StoreResult<()> {
            Err(write_error())
        }

        fn clear(&mut self) -> StoreResult<()> {
            Err(write_error())
        }
    }

    fn write_error() -> StoreError {
        StoreError::Json(serde_json::from_str::<u32>("disk full").unwrap_err())
    }

    fn builder() -> VersionBuilder<MemoryStore> {
        VersionBuilder::open(Catalog::standard(), MemoryStore::new(), Settings::default())
    }

    #[test]
    fn test_add_new_item() {
        let mut b = builder();
        b.add_or_increment("2", "10", "2").unwrap();

        assert_eq!(b.items().len(), 1);
        let item = b.item(2).unwrap();
        assert_eq!(item.medicine.name, "Metformin 500 mg");
        assert_eq!(item.delivered_count, 10);
        assert_eq!(item.extra_count, 2);
    }

    #[test]
    fn test_add_same_medicine_accumulates() {
        let mut b = builder();
        b.add_or_increment("2", "10", "2").unwrap();
        b.add_or_increment("2", "5", "0").unwrap();

        assert_eq!(b.items().len(), 1);
        assert_eq!(b.items()[0].delivered_count, 15);
        assert_eq!(b.items()[0].extra_count, 2);
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut b = builder();
        b.add_or_increment("3", "1", "0").unwrap();
        b.add_or_increment("1", "1", "0").unwrap();
        b.add_or_increment("3", "1", "0").unwrap();

        let ids: Vec<u32> = b.items().iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_validation_order() {
        let mut b = builder();

        assert_eq!(
            b.add_or_increment("", "x", "-1"),
            Err(ValidationError::NoMedicineSelected)
        );
        assert_eq!(
            b.add_or_increment("2", "0", "-1"),
            Err(ValidationError::InvalidDeliveredCount)
        );
        assert_eq!(
            b.add_or_increment("2", "3", "-1"),
            Err(ValidationError::NegativeExtraCount)
        );
        assert_eq!(
            b.add_or_increment("2", "3", ""),
            Err(ValidationError::NegativeExtraCount)
        );
        assert!(b.is_empty());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::NoMedicineSelected.to_string(),
            "no medicine selected"
        );
        assert_eq!(
            ValidationError::InvalidDeliveredCount.to_string(),
            "delivered count must be a positive number"
        );
        assert_eq!(
            ValidationError::NegativeExtraCount.to_string(),
            "extra count cannot be negative"
        );
    }

    #[test]
    fn test_unknown_medicine() {
        let mut b = builder();
        assert_eq!(
            b.add_or_increment("99", "1", "0"),
            Err(ValidationError::UnknownMedicine("99".into()))
        );
        assert!(b.is_empty());
        assert_eq!(b.store().save_count(), 0);
    }

    #[test]
    fn test_error_kept_until_success() {
        let mut b = builder();
        let _ = b.add_or_increment("", "1", "0");
        assert_eq!(b.error(), Some(&ValidationError::NoMedicineSelected));

        b.add_or_increment("1", "1", "0").unwrap();
        assert!(b.error().is_none());
    }

    #[test]
    fn test_dismiss_error() {
        let mut b = builder();
        let _ = b.add_or_increment("1", "0", "0");
        assert!(b.error().is_some());

        b.dismiss_error();
        assert!(b.error().is_none());
    }

    #[test]
    fn test_remove() {
        let mut b = builder();
        b.add_or_increment("1", "1", "0").unwrap();
        b.add_or_increment("2", "1", "0").unwrap();

        b.remove(1);
        let ids: Vec<u32> = b.items().iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut b = builder();
        b.add_or_increment("1", "1", "0").unwrap();
        let before = b.items().to_vec();
        let saves = b.store().save_count();

        b.remove(4);
        assert_eq!(b.items(), before.as_slice());
        assert_eq!(b.store().save_count(), saves);
    }

    #[test]
    fn test_update_field_overwrites() {
        let mut b = builder();
        b.add_or_increment("2", "10", "2").unwrap();

        b.update_field(2, CountField::DeliveredCount, "4");
        b.update_field(2, CountField::ExtraCount, "0");

        let item = b.item(2).unwrap();
        assert_eq!(item.delivered_count, 4);
        assert_eq!(item.extra_count, 0);
    }

    #[test]
    fn test_update_field_ignores_invalid() {
        let mut b = builder();
        b.add_or_increment("2", "10", "2").unwrap();
        let _ = b.add_or_increment("", "", "");
        let error = b.error().cloned();

        b.update_field(2, CountField::DeliveredCount, "-3");
        b.update_field(2, CountField::ExtraCount, "abc");

        let item = b.item(2).unwrap();
        assert_eq!(item.delivered_count, 10);
        assert_eq!(item.extra_count, 2);
        assert_eq!(b.error().cloned(), error);
    }

    #[test]
    fn test_failed_saves_keep_changes() {
        let mut b = VersionBuilder::open(Catalog::standard(), FailingStore, Settings::default());

        assert_eq!(b.add_or_increment("2", "10", "2"), Ok(()));
        assert_eq!(b.item(2).unwrap().delivered_count, 10);
        assert!(b.error().is_none());

        b.update_field(2, CountField::ExtraCount, "1");
        assert_eq!(b.item(2).unwrap().extra_count, 1);

        b.add_or_increment("3", "1", "0").unwrap();
        b.remove(3);
        assert_eq!(b.items().len(), 1);

        b.clear();
        assert!(b.is_empty());
    }

    #[test]
    fn test_update_field_allows_zero_delivered() {
        let mut b = builder();
        b.add_or_increment("2", "10", "2").unwrap();

        b.update_field(2, CountField::DeliveredCount, "0");
        assert_eq!(b.item(2).unwrap().delivered_count, 0);
    }

    #[test]
    fn test_reference_total() {
        let mut b = builder();
        b.add_or_increment("2", "10", "2").unwrap();

        let item = b.item(2).unwrap().clone();
        assert!((b.compute_final_price(&item) - 129200.0).abs() < 1e-6);
        assert!((b.compute_total() - 465200.0).abs() < 1e-6);
        assert!((b.items_total() - 129200.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_total_is_fee() {
        assert_eq!(builder().compute_total(), 336000.0);
    }

    #[test]
    fn test_custom_fee() {
        let settings = Settings {
            technical_fee: 100.0,
            ..Settings::default()
        };
        let b = VersionBuilder::open(Catalog::standard(), MemoryStore::new(), settings);
        assert_eq!(b.compute_total(), 100.0);
    }

    #[test]
    fn test_clear() {
        let mut b = builder();
        b.add_or_increment("2", "10", "2").unwrap();
        let _ = b.add_or_increment("", "", "");

        b.clear();
        assert!(b.is_empty());
        assert!(b.error().is_none());
        assert!(b.store().raw().is_none());
    }
}
