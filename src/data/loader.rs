// ============================================================
// Layer 4 — Input Loaders
// ============================================================
// Reads the two pipeline inputs from disk:
//
//   RawListingLoader — the raw listings CSV. Only five columns
//                      matter; all others are ignored:
//                        State, City, BHK, Size_in_SqFt,
//                        Price_in_Lakhs
//   DistrictLoader   — a JSON list of states and their districts,
//                      used to find regions that need synthetic
//                      records:
//                        { "states": [ { "state": "Goa",
//                                        "districts": ["North Goa", ...] } ] }
//
// Missing cells deserialise to None and are dropped later by the
// cleaner. A row that cannot be parsed at all is logged and
// skipped rather than failing the whole load.
//
// Reference: csv crate documentation (serde integration)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::domain::traits::RecordSource;

// ─── Raw listings ─────────────────────────────────────────────────────────────
/// One row of the raw CSV, before cleaning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawListing {
    #[serde(rename = "State", default)]
    pub state: Option<String>,

    #[serde(rename = "City", default)]
    pub city: Option<String>,

    #[serde(rename = "BHK", default)]
    pub bhk: Option<f64>,

    #[serde(rename = "Size_in_SqFt", default)]
    pub size_sqft: Option<f64>,

    #[serde(rename = "Price_in_Lakhs", default)]
    pub price_lakhs: Option<f64>,
}

pub struct RawListingLoader {
    path: PathBuf,
}

impl RawListingLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for RawListingLoader {
    type Record = RawListing;

    fn load_all(&self) -> Result<Vec<RawListing>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("Dataset not found at '{}'", self.path.display()))?;

        let mut rows    = Vec::new();
        let mut skipped = 0usize;

        for (line, result) in reader.deserialize::<RawListing>().enumerate() {
            match result {
                Ok(row) => rows.push(row),
                Err(e) => {
                    skipped += 1;
                    tracing::debug!("Skipping raw row {}: {}", line + 2, e);
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} unparseable rows in '{}'", skipped, self.path.display());
        }
        tracing::info!("Loaded {} raw listings from '{}'", rows.len(), self.path.display());
        Ok(rows)
    }
}

// ─── Districts ────────────────────────────────────────────────────────────────
/// One state and the districts it contains.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateDistricts {
    pub state:     String,
    pub districts: Vec<String>,
}

#[derive(Deserialize)]
struct DistrictFile {
    states: Vec<StateDistricts>,
}

pub struct DistrictLoader {
    path: PathBuf,
}

impl DistrictLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for DistrictLoader {
    type Record = StateDistricts;

    fn load_all(&self) -> Result<Vec<StateDistricts>> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("District mapping file missing at '{}'", self.path.display()))?;

        let file: DistrictFile = serde_json::from_str(&json)
            .with_context(|| format!("Invalid district mapping in '{}'", self.path.display()))?;

        let n_districts: usize = file.states.iter().map(|s| s.districts.len()).sum();
        tracing::info!("Loaded {} states / {} districts", file.states.len(), n_districts);
        Ok(file.states)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hpp-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_reads_known_columns_and_ignores_others() {
        let path = scratch_file(
            "raw_ok.csv",
            "ID,State,City,BHK,Size_in_SqFt,Price_in_Lakhs,Furnished\n\
             1, Maharashtra ,Pune,2,950,80.5,Yes\n\
             2,Goa,Panaji,3,,120,No\n",
        );
        let rows = RawListingLoader::new(&path).load_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].state.as_deref(), Some("Maharashtra"));
        assert_eq!(rows[0].price_lakhs, Some(80.5));
        assert_eq!(rows[1].size_sqft, None);
    }

    #[test]
    fn test_skips_garbage_rows() {
        let path = scratch_file(
            "raw_bad.csv",
            "State,City,BHK,Size_in_SqFt,Price_in_Lakhs\n\
             Goa,Panaji,two,900,50\n\
             Goa,Margao,2,900,50\n",
        );
        let rows = RawListingLoader::new(&path).load_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].city.as_deref(), Some("Margao"));
    }

    #[test]
    fn test_missing_csv_is_an_error() {
        let loader = RawListingLoader::new("/definitely/not/here.csv");
        assert!(loader.load_all().is_err());
    }

    #[test]
    fn test_reads_districts() {
        let path = scratch_file(
            "districts.json",
            r#"{"states":[{"state":"Goa","districts":["North Goa","South Goa"]}]}"#,
        );
        let states = DistrictLoader::new(&path).load_all().unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].districts, vec!["North Goa", "South Goa"]);
    }
}
