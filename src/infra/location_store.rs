// ============================================================
// Layer 6 — Location Store
// ============================================================
// The state → cities lookup the frontend uses to populate its
// dropdowns, stored as a pretty-printed JSON object:
//
//   {
//     "Goa": ["Margao", "Panaji"],
//     "Maharashtra": ["Mumbai", "Pune"]
//   }
//
// The pipeline stages it in phase 5 and commits it together
// with the model artifacts; the service reads it at startup.
// A missing file is not an error: /options then reports an
// empty mapping.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::data::dataset::LocationMapping;
use crate::infra::artifact_store::StagedFile;

pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Serialise the mapping for a staged commit, creating parent
    /// directories as needed.
    pub fn stage(&self, mapping: &LocationMapping) -> Result<StagedFile> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let text = serde_json::to_string_pretty(mapping).context("Cannot serialise location mapping")?;
        tracing::info!(
            "Location mapping with {} states staged for '{}'",
            mapping.len(),
            self.path.display()
        );
        Ok(StagedFile { dest: self.path.clone(), bytes: text.into_bytes() })
    }

    /// `Ok(None)` when the file does not exist; an error when it
    /// exists but is not a valid mapping.
    pub fn load(&self) -> Result<Option<LocationMapping>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read location mapping '{}'", self.path.display()))?;
        let mapping = serde_json::from_str(&text)
            .with_context(|| format!("Malformed location mapping '{}'", self.path.display()))?;
        Ok(Some(mapping))
    }
}
