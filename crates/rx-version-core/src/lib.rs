//! Rx-Version Core Library
//!
//! Prescription ("version") builder for the pharmacy counter: pick medicines
//! from the catalog, enter delivered and over-ceiling counts, and get the
//! payable total.
//!
//! # Architecture
//!
//! ```text
//!   Catalog ──► select + counts ──► VersionBuilder ──► rows + totals
//!                                        │
//!                              save after every change
//!                                        │
//!                                        ▼
//!                          VersionStore (kv_store: "versionItems")
//! ```
//!
//! # Pricing
//!
//! `final = (D - F) * B * (1 - G) + (D - F) * C + F * A`, summed over all
//! rows, plus a flat technical fee.
//!
//! # Modules
//!
//! - [`config`]: Constants and builder settings
//! - [`models`]: Domain types (MedicineDefinition, VersionItem, Catalog)
//! - [`version`]: Version builder, validation and pricing
//! - [`store`]: Persistence trait with memory and SQLite stores
//! - [`db`]: SQLite database layer
//! - [`export`]: Priced summary export

pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod store;
pub mod version;

// Re-export commonly used types
pub use config::Settings;
pub use db::Database;
pub use export::VersionSummary;
pub use models::{Catalog, CountField, MedicineDefinition, VersionItem};
pub use store::{MemoryStore, SqliteVersionStore, VersionStore};
pub use version::{final_price, PriceBreakdown, ValidationError, VersionBuilder};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum RxVersionError {
    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<ValidationError> for RxVersionError {
    fn from(e: ValidationError) -> Self {
        RxVersionError::Validation(e.to_string())
    }
}

impl From<db::DbError> for RxVersionError {
    fn from(e: db::DbError) -> Self {
        RxVersionError::DatabaseError(e.to_string())
    }
}

impl From<store::StoreError> for RxVersionError {
    fn from(e: store::StoreError) -> Self {
        RxVersionError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for RxVersionError {
    fn from(e: serde_json::Error) -> Self {
        RxVersionError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for RxVersionError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RxVersionError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install the log subscriber. `RUST_LOG` overrides `filter`.
///
/// Calling this more than once is harmless.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let fallback = filter.unwrap_or_else(|| config::DEFAULT_LOG_FILTER.to_string());
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Rx-Version core v{}", config::APP_VERSION);
    }
}

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<RxVersionCore>, RxVersionError> {
    RxVersionCore::open(Database::open(&path)?, Settings::default())
}

/// Open a database with settings given as JSON.
#[uniffi::export]
pub fn open_database_with_settings(
    path: String,
    settings_json: String,
) -> Result<Arc<RxVersionCore>, RxVersionError> {
    let settings = Settings::from_json(&settings_json)?;
    RxVersionCore::open(Database::open(&path)?, settings)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<RxVersionCore>, RxVersionError> {
    RxVersionCore::open(Database::open_in_memory()?, Settings::default())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe version builder wrapper for FFI.
#[derive(uniffi::Object)]
pub struct RxVersionCore {
    builder: Arc<Mutex<VersionBuilder<SqliteVersionStore>>>,
}

impl RxVersionCore {
    fn open(db: Database, settings: Settings) -> Result<Arc<Self>, RxVersionError> {
        db.seed_standard_catalog()?;
        let catalog = Catalog::from_database(&db)?;
        let store = SqliteVersionStore::with_key(db, settings.storage_key.clone());
        let builder = VersionBuilder::open(catalog, store, settings);

        Ok(Arc::new(Self {
            builder: Arc::new(Mutex::new(builder)),
        }))
    }
}

#[uniffi::export]
impl RxVersionCore {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// List the medicine catalog in selection order.
    pub fn list_medicines(&self) -> Result<Vec<FfiMedicine>, RxVersionError> {
        let builder = self.builder.lock()?;
        Ok(builder.catalog().iter().cloned().map(Into::into).collect())
    }

    /// Get a catalog medicine by id.
    pub fn get_medicine(&self, medicine_id: u32) -> Result<FfiMedicine, RxVersionError> {
        let builder = self.builder.lock()?;
        builder
            .catalog()
            .get(medicine_id)
            .cloned()
            .map(Into::into)
            .ok_or_else(|| RxVersionError::NotFound(format!("medicine {}", medicine_id)))
    }

    /// Search the catalog by name.
    pub fn search_medicines(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiMedicine>, RxVersionError> {
        let builder = self.builder.lock()?;
        let results = builder.catalog().search(&query, limit as usize);
        Ok(results.into_iter().cloned().map(Into::into).collect())
    }

    // =========================================================================
    // Version Operations
    // =========================================================================

    /// Add a medicine to the version from raw form values.
    pub fn add_medicine(
        &self,
        medicine_id: String,
        delivered_count: String,
        extra_count: String,
    ) -> Result<(), RxVersionError> {
        let mut builder = self.builder.lock()?;
        builder.add_or_increment(&medicine_id, &delivered_count, &extra_count)?;
        Ok(())
    }

    /// Remove a medicine from the version.
    pub fn remove_medicine(&self, medicine_id: u32) -> Result<(), RxVersionError> {
        let mut builder = self.builder.lock()?;
        builder.remove(medicine_id);
        Ok(())
    }

    /// Edit a count cell in place. Invalid values are ignored.
    pub fn update_count(
        &self,
        medicine_id: u32,
        field: FfiCountField,
        value: String,
    ) -> Result<(), RxVersionError> {
        let mut builder = self.builder.lock()?;
        builder.update_field(medicine_id, field.into(), &value);
        Ok(())
    }

    /// Empty the version and the saved copy.
    pub fn clear_version(&self) -> Result<(), RxVersionError> {
        let mut builder = self.builder.lock()?;
        builder.clear();
        Ok(())
    }

    /// Current error banner text.
    pub fn current_error(&self) -> Result<Option<String>, RxVersionError> {
        let builder = self.builder.lock()?;
        Ok(builder.error().map(|e| e.to_string()))
    }

    pub fn dismiss_error(&self) -> Result<(), RxVersionError> {
        let mut builder = self.builder.lock()?;
        builder.dismiss_error();
        Ok(())
    }

    /// Version rows with their final prices.
    pub fn version_items(&self) -> Result<Vec<FfiVersionItem>, RxVersionError> {
        let builder = self.builder.lock()?;
        Ok(builder
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| FfiVersionItem::new(i + 1, item))
            .collect())
    }

    pub fn is_empty(&self) -> Result<bool, RxVersionError> {
        let builder = self.builder.lock()?;
        Ok(builder.is_empty())
    }

    /// Payable total including the technical fee.
    pub fn total_price(&self) -> Result<f64, RxVersionError> {
        let builder = self.builder.lock()?;
        Ok(builder.compute_total())
    }

    pub fn technical_fee(&self) -> Result<f64, RxVersionError> {
        let builder = self.builder.lock()?;
        Ok(builder.settings().technical_fee)
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export the priced version as JSON.
    pub fn export_summary_json(&self) -> Result<String, RxVersionError> {
        let builder = self.builder.lock()?;
        Ok(VersionSummary::from_builder(&*builder).to_json()?)
    }

    /// Export the priced version as CSV.
    pub fn export_summary_csv(&self) -> Result<String, RxVersionError> {
        let builder = self.builder.lock()?;
        Ok(VersionSummary::from_builder(&*builder).to_csv())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe catalog medicine.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiMedicine {
    pub id: u32,
    pub name: String,
    pub base_price: f64,
    pub insurance_price: f64,
    pub price_difference: f64,
    pub ceiling: u32,
    pub insurance_percent: f64,
}

impl From<MedicineDefinition> for FfiMedicine {
    fn from(med: MedicineDefinition) -> Self {
        Self {
            id: med.id,
            name: med.name,
            base_price: med.base_price,
            insurance_price: med.insurance_price,
            price_difference: med.price_difference,
            ceiling: med.ceiling,
            insurance_percent: med.insurance_percent,
        }
    }
}

/// FFI-safe version row.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiVersionItem {
    pub row: u32,
    pub medicine: FfiMedicine,
    pub delivered_count: u32,
    pub extra_count: u32,
    pub final_price: f64,
}

impl FfiVersionItem {
    fn new(row: usize, item: &VersionItem) -> Self {
        Self {
            row: row as u32,
            medicine: item.medicine.clone().into(),
            delivered_count: item.delivered_count,
            extra_count: item.extra_count,
            final_price: final_price(item),
        }
    }
}

/// FFI-safe editable count column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiCountField {
    DeliveredCount,
    ExtraCount,
}

impl From<FfiCountField> for CountField {
    fn from(field: FfiCountField) -> Self {
        match field {
            FfiCountField::DeliveredCount => CountField::DeliveredCount,
            FfiCountField::ExtraCount => CountField::ExtraCount,
        }
    }
}
