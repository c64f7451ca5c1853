// ============================================================
// Layer 5 — Trainer (pipeline phase 4)
// ============================================================
// Turns the combined dataset into a fitted model and the
// artifacts needed to reproduce its preprocessing:
//
//   1. Fit one LabelEncoder per categorical column on the
//      full dataset
//   2. Encode every record in the default feature order
//   3. Seeded shuffle + split (80/20 by default)
//   4. Fit the StandardScaler on the training split only
//   5. Fit the random forest on the scaled training rows
//   6. Score the held-out rows: R² and RMSE
//
// Every random draw is seeded from `TrainParams::seed`, so the
// same dataset and seed always produce the same model.
//
// Reference: Breiman (2001) Random Forests
//            scikit-learn user guide §1.11 (Ensembles)

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};

use crate::data::preprocessor::{default_feature_order, encode_features};
use crate::data::splitter::split_train_test;
use crate::domain::record::HouseRecord;
use crate::domain::traits::Regressor;
use crate::infra::artifact_store::{ArtifactBundle, ModelMetadata};
use crate::infra::metrics::{r2_score, rmse, RunMetrics};
use crate::ml::encoder::{EncoderSet, LabelEncoder};
use crate::ml::forest::{ForestParams, RandomForestRegressor};
use crate::ml::scaler::StandardScaler;
use crate::ml::tree::TreeParams;

/// Name reported by /health and every prediction
pub const MODEL_NAME: &str = "Random Forest Pro";

// ─── Training Parameters ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainParams {
    pub n_trees:       usize,
    pub max_depth:     usize,
    pub test_fraction: f64,
    pub seed:          u64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            n_trees:       100,
            max_depth:     20,
            test_fraction: 0.2,
            seed:          42,
        }
    }
}

/// A fitted bundle plus the metrics it scored.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub bundle:  ArtifactBundle,
    pub metrics: RunMetrics,
}

/// Fit one encoder per categorical column over every record.
pub fn fit_encoders(records: &[HouseRecord]) -> EncoderSet {
    let mut set = EncoderSet::new();
    set.insert("state",         LabelEncoder::fit(records.iter().map(|r| r.state.as_str())));
    set.insert("location",      LabelEncoder::fit(records.iter().map(|r| r.location.as_str())));
    set.insert("property_type", LabelEncoder::fit(records.iter().map(|r| r.property_type.label())));
    set
}

/// Run steps 1–6 and return the artifacts to persist.
pub fn train(records: &[HouseRecord], params: &TrainParams) -> Result<TrainOutcome> {
    anyhow::ensure!(
        records.len() >= 2,
        "need at least 2 records to train, got {}",
        records.len()
    );

    // ── Steps 1–2: encode ────────────────────────────────────────────────────
    let encoders      = fit_encoders(records);
    let feature_names = default_feature_order();
    for column in encoders.columns() {
        if let Some(enc) = encoders.get(column) {
            tracing::debug!("Encoder '{}': {} classes", column, enc.classes().len());
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for r in records {
        let x = encode_features(&r.features(), &encoders, &feature_names)
            .context("Cannot encode training record")?;
        rows.push((x, r.price));
    }

    // ── Step 3: split ────────────────────────────────────────────────────────
    let (train_rows, test_rows) = split_train_test(rows, params.test_fraction, params.seed);
    anyhow::ensure!(!train_rows.is_empty(), "training split is empty");

    let (x_train, y_train): (Vec<Vec<f64>>, Vec<f64>) = train_rows.into_iter().unzip();
    let (x_test,  y_test):  (Vec<Vec<f64>>, Vec<f64>) = test_rows.into_iter().unzip();
    tracing::info!("Training on {} rows, testing on {}", x_train.len(), x_test.len());

    // ── Step 4: scale ────────────────────────────────────────────────────────
    let scaler  = StandardScaler::fit(&x_train);
    let x_train = scaler.transform_all(&x_train)?;
    let x_test  = scaler.transform_all(&x_test)?;

    // ── Step 5: fit ──────────────────────────────────────────────────────────
    let forest_params = ForestParams {
        n_estimators: params.n_trees,
        tree:         TreeParams { max_depth: params.max_depth, ..TreeParams::default() },
        bootstrap:    true,
        random_state: params.seed,
    };
    let model = RandomForestRegressor::fit(&x_train, &y_train, forest_params)?;
    tracing::info!("Fitted {} trees on {} features", model.n_trees(), scaler.n_features());

    // ── Step 6: score ────────────────────────────────────────────────────────
    let preds = model.predict_many(&x_test);
    let r2    = r2_score(&y_test, &preds);
    let err   = rmse(&y_test, &preds);
    tracing::info!("{} held-out R² = {:.4}, RMSE = {:.2}", MODEL_NAME, r2, err);

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let metrics = RunMetrics {
        timestamp: timestamp.clone(),
        seed:      params.seed,
        n_train:   y_train.len(),
        n_test:    y_test.len(),
        r2,
        rmse:      err,
    };
    let metadata = ModelMetadata {
        model_name: MODEL_NAME.to_string(),
        accuracy:   r2,
        rmse:       err,
        n_train:    metrics.n_train,
        n_test:     metrics.n_test,
        seed:       params.seed,
        timestamp,
    };

    Ok(TrainOutcome {
        bundle: ArtifactBundle {
            model,
            scaler,
            encoders,
            feature_names,
            metadata: Some(metadata),
        },
        metrics,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::house::PropertyType;

    fn records(n: usize) -> Vec<HouseRecord> {
        let cities = [("Goa", "Panaji"), ("Maharashtra", "Pune"), ("Maharashtra", "Mumbai")];
        (0..n)
            .map(|i| {
                let (state, city) = cities[i % cities.len()];
                let area          = 500.0 + (i as f64) * 37.0;
                HouseRecord {
                    area,
                    bedrooms:        (i % 4 + 1) as u32,
                    bathrooms:       ((i % 4 + 1) as f64).min(3.0),
                    state:           state.into(),
                    location:        city.into(),
                    year_built:      2005 + (i % 19) as i32,
                    property_type:   PropertyType::ALL[i % 3],
                    parking:         i % 2 == 0,
                    modular_kitchen: i % 3 == 0,
                    dining_hall:     i % 5 == 0,
                    price:           area * 4_000.0,
                }
            })
            .collect()
    }

    fn small_params() -> TrainParams {
        TrainParams { n_trees: 5, max_depth: 6, ..TrainParams::default() }
    }

    #[test]
    fn test_encoders_cover_categorical_columns() {
        let enc = fit_encoders(&records(12));
        assert_eq!(enc.columns().collect::<Vec<_>>(), vec!["location", "property_type", "state"]);
        assert_eq!(enc.get("state").unwrap().classes(), ["Goa", "Maharashtra"]);
    }

    #[test]
    fn test_train_produces_complete_bundle() {
        let out = train(&records(60), &small_params()).unwrap();
        assert_eq!(out.bundle.feature_names, default_feature_order());
        assert_eq!(out.bundle.scaler.n_features(), 10);
        assert_eq!(out.bundle.model.n_trees(), 5);
        assert_eq!(out.metrics.n_train + out.metrics.n_test, 60);
        assert_eq!(out.metrics.n_test, 12);

        let meta = out.bundle.metadata.unwrap();
        assert_eq!(meta.model_name, MODEL_NAME);
        assert!(meta.accuracy.is_finite());
        assert!(meta.rmse >= 0.0);
    }

    #[test]
    fn test_price_tracks_area() {
        let out = train(&records(90), &small_params()).unwrap();
        assert!(out.metrics.r2 > 0.5, "r2 = {}", out.metrics.r2);
    }

    #[test]
    fn test_same_seed_same_model() {
        let a = train(&records(40), &small_params()).unwrap();
        let b = train(&records(40), &small_params()).unwrap();
        assert_eq!(a.bundle.model, b.bundle.model);
        assert_eq!(a.bundle.scaler, b.bundle.scaler);
        assert_eq!(a.metrics.r2, b.metrics.r2);
    }

    #[test]
    fn test_too_few_records_is_an_error() {
        assert!(train(&records(1), &small_params()).is_err());
    }
}
