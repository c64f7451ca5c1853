// ============================================================
// Layer 2 — PipelineUseCase
// ============================================================
// Orchestrates the offline pipeline in order:
//
//   Phase 1: Load + clean raw listings     (Layer 4 - data)
//   Phase 2: Synthesize sparse regions     (Layer 4 - data)
//   Phase 3: Combine + save dataset CSV    (Layer 4 - data)
//   Phase 4: Fit encoders, scaler, forest  (Layer 5 - ml)
//   Phase 5: Save artifacts and the state →
//            cities lookup in one commit,
//            then append metrics           (Layer 6 - infra)
//   Verify:  Reload artifacts and predict
//            one fixed house               (Layers 4-6)
//
// Phases run strictly in sequence and the first failure aborts
// the rest. Artifacts are only written in phase 5, and then
// all together, so an earlier failure leaves the previous
// model untouched.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    cleaner::Cleaner,
    dataset::HousingDataset,
    loader::{DistrictLoader, RawListingLoader},
    preprocessor::Preprocessor,
    synthesizer::{Synthesizer, SynthesizerConfig},
};
use crate::domain::house::HouseFeaturesInput;
use crate::domain::traits::RecordSource;
use crate::infra::{
    artifact_store::ArtifactStore,
    location_store::LocationStore,
    metrics::MetricsLogger,
};
use crate::ml::predictor::Predictor;
use crate::ml::trainer::{self, TrainParams, MODEL_NAME};

/// File name of the combined dataset inside `data_dir`
pub const FINAL_DATASET_FILE: &str = "housing_data_final.csv";

// ─── Pipeline Configuration ──────────────────────────────────────────────────
// Every input path and hyperparameter for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub raw_csv:              PathBuf,
    pub districts:            PathBuf,
    pub data_dir:             PathBuf,
    pub models_dir:           PathBuf,
    pub location_mapping:     PathBuf,
    pub seed:                 u64,
    pub n_trees:              usize,
    pub max_depth:            usize,
    pub test_fraction:        f64,
    pub min_existing_records: usize,
    pub synthetic_per_city:   usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_csv:              PathBuf::from("india_housing_prices.csv"),
            districts:            PathBuf::from("indian_districts.json"),
            data_dir:             PathBuf::from("ml/data"),
            models_dir:           PathBuf::from("ml/models"),
            location_mapping:     PathBuf::from("data/location_mapping.json"),
            seed:                 42,
            n_trees:              100,
            max_depth:            20,
            test_fraction:        0.2,
            min_existing_records: 50,
            synthetic_per_city:   100,
        }
    }
}

/// What a run produced, for the CLI summary.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub cleaned_rows:       usize,
    pub synthetic_rows:     usize,
    pub final_rows:         usize,
    pub r2:                 f64,
    pub rmse:               f64,
    pub verification_price: f64,
    pub dataset_path:       PathBuf,
}

/// The fixed house the verification step predicts.
pub fn verification_input() -> HouseFeaturesInput {
    HouseFeaturesInput {
        area:            2000.0,
        bedrooms:        3,
        bathrooms:       2.0,
        location:        "Varanasi".to_string(),
        year_built:      2018,
        state:           "Uttar Pradesh".to_string(),
        property_type:   "Independent House".to_string(),
        parking:         false,
        modular_kitchen: false,
        dining_hall:     false,
    }
}

// ─── PipelineUseCase ──────────────────────────────────────────────────────────
pub struct PipelineUseCase {
    config: PipelineConfig,
}

impl PipelineUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run every phase end to end
    pub fn execute(&self) -> Result<PipelineReport> {
        let cfg = &self.config;

        // ── Phase 1: clean ───────────────────────────────────────────────────
        tracing::info!("Phase 1: cleaning '{}'", cfg.raw_csv.display());
        let raw     = RawListingLoader::new(&cfg.raw_csv).load_all()?;
        let cleaned = Cleaner::new(cfg.seed).clean(&raw);
        tracing::info!("Cleaned {} of {} raw rows", cleaned.len(), raw.len());

        // ── Phase 2: synthesize ──────────────────────────────────────────────
        tracing::info!("Phase 2: synthesizing from '{}'", cfg.districts.display());
        let regions     = DistrictLoader::new(&cfg.districts).load_all()?;
        let synthesizer = Synthesizer::new(SynthesizerConfig {
            min_existing: cfg.min_existing_records,
            per_region:   cfg.synthetic_per_city,
            seed:         cfg.seed,
        });
        let synthetic = synthesizer.synthesize(&cleaned, &regions);
        tracing::info!("Generated {} synthetic records", synthetic.len());

        let cleaned_rows   = cleaned.len();
        let synthetic_rows = synthetic.len();

        // ── Phase 3: combine + persist ───────────────────────────────────────
        let dataset      = HousingDataset::combine(cleaned, synthetic);
        let dataset_path = cfg.data_dir.join(FINAL_DATASET_FILE);
        anyhow::ensure!(!dataset.is_empty(), "combined dataset is empty, nothing to train on");
        dataset.save_csv(&dataset_path)?;

        // ── Phase 4: train ───────────────────────────────────────────────────
        tracing::info!("Phase 4: training {}", MODEL_NAME);
        let params = TrainParams {
            n_trees:       cfg.n_trees,
            max_depth:     cfg.max_depth,
            test_fraction: cfg.test_fraction,
            seed:          cfg.seed,
        };
        let outcome = trainer::train(dataset.records(), &params)?;

        // ── Phase 5: persist ─────────────────────────────────────────────────
        tracing::info!("Phase 5: saving artifacts to '{}'", cfg.models_dir.display());
        // The lookup follows what was actually written to disk, and is
        // committed together with the model it belongs to
        let saved  = HousingDataset::load_csv(&dataset_path)?;
        let lookup = LocationStore::new(&cfg.location_mapping).stage(&saved.location_mapping())?;

        let store = ArtifactStore::new(&cfg.models_dir);
        store.save_all(&outcome.bundle, vec![lookup])?;
        let metrics = MetricsLogger::new(&cfg.models_dir)?;
        metrics.log(&outcome.metrics)?;
        tracing::info!("Run metrics appended to '{}'", metrics.path().display());

        // ── Verify ───────────────────────────────────────────────────────────
        let verification_price = verify(&store).context("Verification failed")?;
        tracing::info!("Verification successful. Pred price: ₹{:.0}", verification_price);

        Ok(PipelineReport {
            cleaned_rows,
            synthetic_rows,
            final_rows: dataset.len(),
            r2:         outcome.metrics.r2,
            rmse:       outcome.metrics.rmse,
            verification_price,
            dataset_path,
        })
    }
}

/// Reload the saved artifacts and predict the fixed house.
fn verify(store: &ArtifactStore) -> Result<f64> {
    let bundle       = store.load_all()?;
    let preprocessor = Preprocessor::new(bundle.encoders, bundle.scaler, bundle.feature_names);
    let predictor    = Predictor::new(bundle.model, MODEL_NAME);

    let features = verification_input().validate()?;
    let vector   = preprocessor.transform(&features)?;
    Ok(predictor.predict(&vector)?.price)
}
