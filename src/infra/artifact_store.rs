// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Saves and restores everything the service needs to predict:
//
//   <models_dir>/
//     best_model.bin       ← fitted RandomForestRegressor
//     scaler.bin           ← fitted StandardScaler
//     encoder.bin          ← EncoderSet (one vocabulary per column)
//     feature_names.bin    ← column order the model expects
//     model_metadata.bin   ← R², RMSE, sizes, seed, timestamp
//
// Each artifact is an opaque bincode blob of its serde form.
//
// Writes are all-or-nothing: every blob is first written to a
// `.tmp` sibling, and only once all of them succeed are they
// renamed into place. A failure midway leaves the previous set
// of artifacts untouched. Files owned by other stores (the
// location lookup) can ride along in the same commit.
//
// Loading requires the first four files; metadata is optional
// and its absence only means /model-info reports no accuracy.
// A decoded bundle is checked for internal consistency (sound
// trees, matching widths) before it is handed out.
//
// Reference: bincode crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::encoder::EncoderSet;
use crate::ml::forest::RandomForestRegressor;
use crate::ml::scaler::StandardScaler;

pub const MODEL_FILE:         &str = "best_model.bin";
pub const SCALER_FILE:        &str = "scaler.bin";
pub const ENCODER_FILE:       &str = "encoder.bin";
pub const FEATURE_NAMES_FILE: &str = "feature_names.bin";
pub const METADATA_FILE:      &str = "model_metadata.bin";

/// Facts about a training run, stored next to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_name: String,
    /// Held-out R²
    pub accuracy:   f64,
    pub rmse:       f64,
    pub n_train:    usize,
    pub n_test:     usize,
    pub seed:       u64,
    /// RFC 3339, UTC
    pub timestamp:  String,
}

/// Everything persisted by one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBundle {
    pub model:         RandomForestRegressor,
    pub scaler:        StandardScaler,
    pub encoders:      EncoderSet,
    pub feature_names: Vec<String>,
    pub metadata:      Option<ModelMetadata>,
}

/// Reads and writes the artifact files under one directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    /// Serialise every artifact, then move them and `extra` into
    /// place together.
    pub fn save_all(&self, bundle: &ArtifactBundle, extra: Vec<StagedFile>) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create models dir '{}'", self.dir.display()))?;

        let mut files = vec![
            self.staged(MODEL_FILE,         &bundle.model)?,
            self.staged(SCALER_FILE,        &bundle.scaler)?,
            self.staged(ENCODER_FILE,       &bundle.encoders)?,
            self.staged(FEATURE_NAMES_FILE, &bundle.feature_names)?,
        ];
        if let Some(meta) = &bundle.metadata {
            files.push(self.staged(METADATA_FILE, meta)?);
        }
        files.extend(extra);

        commit_all(&files)?;

        // Metadata from an earlier run must not describe this model
        let stale = self.dir.join(METADATA_FILE);
        if bundle.metadata.is_none() && stale.exists() {
            fs::remove_file(&stale)
                .with_context(|| format!("Cannot remove stale '{}'", stale.display()))?;
        }

        tracing::info!("Saved {} files, models in '{}'", files.len(), self.dir.display());
        Ok(())
    }

    fn staged<T: Serialize>(&self, name: &str, value: &T) -> Result<StagedFile> {
        Ok(StagedFile { dest: self.dir.join(name), bytes: encode(value)? })
    }

    /// Load a full bundle. Fails if any required artifact is missing
    /// or cannot be decoded.
    pub fn load_all(&self) -> Result<ArtifactBundle> {
        let model_path = self.model_path();
        anyhow::ensure!(
            model_path.exists(),
            "Model file missing at '{}'. Have you run the pipeline first?",
            model_path.display()
        );

        let model:         RandomForestRegressor = self.read(MODEL_FILE)?;
        let scaler:        StandardScaler        = self.read(SCALER_FILE)?;
        let encoders:      EncoderSet            = self.read(ENCODER_FILE)?;
        let feature_names: Vec<String>           = self.read(FEATURE_NAMES_FILE)?;

        model
            .validate(feature_names.len())
            .with_context(|| format!("Invalid model in '{}'", model_path.display()))?;
        anyhow::ensure!(
            scaler.n_features() == feature_names.len(),
            "Scaler expects {} features, feature list has {}",
            scaler.n_features(),
            feature_names.len()
        );

        let metadata = if self.dir.join(METADATA_FILE).exists() {
            Some(self.read::<ModelMetadata>(METADATA_FILE)?)
        } else {
            tracing::warn!("No metadata found in '{}'", self.dir.display());
            None
        };

        tracing::debug!("Loaded artifacts from '{}'", self.dir.display());
        Ok(ArtifactBundle { model, scaler, encoders, feature_names, metadata })
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path  = self.dir.join(name);
        let bytes = fs::read(&path)
            .with_context(|| format!("Cannot read artifact '{}'", path.display()))?;
        bincode::deserialize(&bytes)
            .with_context(|| format!("Cannot decode artifact '{}'", path.display()))
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).context("Cannot serialise artifact")
}

// ─── Staged Commit ───────────────────────────────────────────────────────────
/// One file to be written as part of an all-or-nothing commit.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub dest:  PathBuf,
    pub bytes: Vec<u8>,
}

fn tmp_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}

/// Write every file to a `.tmp` sibling, then rename them all into
/// place. A failed write removes the temporaries and touches nothing.
pub fn commit_all(files: &[StagedFile]) -> Result<()> {
    // Stage 1: write every blob to a temporary sibling
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for file in files {
        let tmp = tmp_path(&file.dest);
        if let Err(e) = fs::write(&tmp, &file.bytes) {
            for (t, _) in &staged {
                let _ = fs::remove_file(t);
            }
            let _ = fs::remove_file(&tmp);
            return Err(e).with_context(|| format!("Cannot write '{}'", tmp.display()));
        }
        staged.push((tmp, file.dest.as_path()));
    }

    // Stage 2: rename into place
    for (tmp, dest) in &staged {
        fs::rename(tmp, dest)
            .with_context(|| format!("Cannot move '{}' into place", dest.display()))?;
    }
    Ok(())
}
