//! Medicine catalog database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Catalog, MedicineDefinition};

const SELECT_MEDICINE: &str = r#"
    SELECT id, name, base_price, insurance_price, price_difference,
           ceiling, insurance_percent
    FROM medicine_catalog
"#;

impl Database {
    /// Insert or update a medicine.
    pub fn upsert_medicine(&self, med: &MedicineDefinition) -> DbResult<()> {
        validate_medicine(med)?;

        self.conn.execute(
            r#"
            INSERT INTO medicine_catalog (
                id, name, base_price, insurance_price, price_difference,
                ceiling, insurance_percent, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                base_price = excluded.base_price,
                insurance_price = excluded.insurance_price,
                price_difference = excluded.price_difference,
                ceiling = excluded.ceiling,
                insurance_percent = excluded.insurance_percent,
                updated_at = datetime('now')
            "#,
            params![
                med.id,
                med.name,
                med.base_price,
                med.insurance_price,
                med.price_difference,
                med.ceiling,
                med.insurance_percent,
            ],
        )?;
        Ok(())
    }

    /// Get a medicine by id.
    pub fn get_medicine(&self, id: u32) -> DbResult<Option<MedicineDefinition>> {
        let sql = format!("{SELECT_MEDICINE} WHERE id = ?");
        Ok(self
            .conn
            .query_row(&sql, [id], medicine_from_row)
            .optional()?)
    }

    /// List all medicines in id order.
    pub fn list_medicines(&self) -> DbResult<Vec<MedicineDefinition>> {
        let sql = format!("{SELECT_MEDICINE} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], medicine_from_row)?;

        let mut medicines = Vec::new();
        for row in rows {
            medicines.push(row?);
        }
        Ok(medicines)
    }

    /// Delete a medicine.
    pub fn delete_medicine(&self, id: u32) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medicine_catalog WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Seed the catalog table with the standard catalog if it is empty.
    ///
    /// Returns the number of medicines inserted.
    pub fn seed_standard_catalog(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM medicine_catalog", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(0);
        }

        let standard = Catalog::standard();
        for med in standard.iter() {
            self.upsert_medicine(med)?;
        }
        tracing::info!(count = standard.len(), "Seeded standard medicine catalog");
        Ok(standard.len())
    }
}

impl Catalog {
    /// Load the catalog stored in the database.
    pub fn from_database(db: &Database) -> DbResult<Self> {
        Ok(Self::new(db.list_medicines()?))
    }
}

fn medicine_from_row(row: &Row<'_>) -> rusqlite::Result<MedicineDefinition> {
    Ok(MedicineDefinition {
        id: row.get(0)?,
        name: row.get(1)?,
        base_price: row.get(2)?,
        insurance_price: row.get(3)?,
        price_difference: row.get(4)?,
        ceiling: row.get(5)?,
        insurance_percent: row.get(6)?,
    })
}

fn validate_medicine(med: &MedicineDefinition) -> DbResult<()> {
    if med.id == 0 {
        return Err(DbError::InvalidRecord("medicine id must be positive".into()));
    }
    if med.base_price < 0.0 || med.insurance_price < 0.0 {
        return Err(DbError::InvalidRecord(format!(
            "medicine {} has a negative price",
            med.id
        )));
    }
    if !(0.0..=1.0).contains(&med.insurance_percent) {
        return Err(DbError::InvalidRecord(format!(
            "medicine {} insurance percent {} is outside [0, 1]",
            med.id, med.insurance_percent
        )));
    }
    Ok(())
}
