// ============================================================
// Layer 4 — Housing Dataset (pipeline phase 3)
// ============================================================
// The combined cleaned + synthetic rows, persisted as CSV.
//
// Also derives the state → cities lookup served to the
// frontend: states sorted, each state's cities sorted and
// de-duplicated.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::{fs, path::Path};

use crate::domain::record::HouseRecord;

/// state → sorted list of cities
pub type LocationMapping = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HousingDataset {
    records: Vec<HouseRecord>,
}

impl HousingDataset {
    /// Concatenate cleaned and synthetic rows, dropping any row with a
    /// non-finite number.
    pub fn combine(cleaned: Vec<HouseRecord>, synthetic: Vec<HouseRecord>) -> Self {
        let records: Vec<HouseRecord> = cleaned
            .into_iter()
            .chain(synthetic)
            .filter(|r| r.area.is_finite() && r.bathrooms.is_finite() && r.price.is_finite())
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[HouseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write every row, with header, to `path`.
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Cannot write dataset to '{}'", path.display()))?;
        for r in &self.records {
            writer.serialize(r)?;
        }
        writer.flush()?;

        tracing::info!("Final dataset saved with {} rows to '{}'", self.records.len(), path.display());
        Ok(())
    }

    /// Read a dataset previously written by save_csv.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Cannot read dataset '{}'", path.display()))?;

        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<HouseRecord>, _>>()
            .with_context(|| format!("Malformed row in '{}'", path.display()))?;

        Ok(Self { records })
    }

    /// Build the state → cities lookup for the frontend.
    pub fn location_mapping(&self) -> LocationMapping {
        let mut sets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for r in &self.records {
            sets.entry(r.state.clone())
                .or_default()
                .insert(r.location.clone());
        }

        sets.into_iter()
            .map(|(state, cities)| (state, cities.into_iter().collect()))
            .collect()
    }
}
