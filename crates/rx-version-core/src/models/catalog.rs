//! Medicine catalog.

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use super::MedicineDefinition;

/// Minimum name similarity for a search hit.
const MIN_SEARCH_SCORE: f64 = 0.80;

/// Read-only, ordered list of medicines available for selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    medicines: Vec<MedicineDefinition>,
}

impl Catalog {
    /// Create a catalog from an ordered list of medicines.
    pub fn new(medicines: Vec<MedicineDefinition>) -> Self {
        Self { medicines }
    }

    /// The catalog the pharmacy ships with.
    pub fn standard() -> Self {
        Self::new(vec![
            MedicineDefinition::new(
                1,
                "Sitagliptin/Metformin 50/500 (Zipmet)",
                38200.0,
                32900.0,
                100,
                0.2494,
            ),
            MedicineDefinition::new(2, "Metformin 500 mg", 15000.0, 13000.0, 90, 0.20),
            MedicineDefinition::new(3, "Atorvastatin 20 mg", 45000.0, 40000.0, 80, 0.25),
            MedicineDefinition::new(4, "Lovastatin 40 mg", 35000.0, 30000.0, 70, 0.22),
        ])
    }

    /// Look up a medicine by id.
    pub fn get(&self, id: u32) -> Option<&MedicineDefinition> {
        self.medicines.iter().find(|m| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MedicineDefinition> {
        self.medicines.iter()
    }

    pub fn len(&self) -> usize {
        self.medicines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medicines.is_empty()
    }

    /// Rank medicines by name similarity to `query`.
    ///
    /// Substring hits come first (in catalog order), followed by fuzzy
    /// matches by descending Jaro-Winkler score. A blank query lists the
    /// whole catalog.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&MedicineDefinition> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.medicines.iter().take(limit).collect();
        }

        let mut scored: Vec<(f64, usize, &MedicineDefinition)> = self
            .medicines
            .iter()
            .enumerate()
            .filter_map(|(pos, med)| {
                let name = med.name.to_lowercase();
                let score = if name.contains(&query) {
                    // Substring hits outrank any fuzzy score
                    2.0
                } else {
                    name.split_whitespace()
                        .map(|word| jaro_winkler(word, &query))
                        .fold(jaro_winkler(&name, &query), f64::max)
                };
                (score >= MIN_SEARCH_SCORE).then_some((score, pos, med))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        scored
            .into_iter()
            .take(limit)
            .map(|(_, _, med)| med)
            .collect()
    }
}

impl From<Vec<MedicineDefinition>> for Catalog {
    fn from(medicines: Vec<MedicineDefinition>) -> Self {
        Self::new(medicines)
    }
}
