// ============================================================
// Layer 2 — PredictionService
// ============================================================
// The serving-side workflow, built once at startup and shared
// read-only by every request:
//
//   new(config)  → an empty service (model_loaded = false)
//   load()       → reads artifacts + the location lookup
//   predict()    → preprocess → forest → ±5% band
//
// If load() fails the error is logged and the service keeps
// running degraded: /health reports model_loaded = false and
// predict() returns ServiceError::ModelNotLoaded. There is no
// hot reload; a restart is needed once artifacts are fixed.
//
// After load() nothing is mutated again, so the service is
// shared through an Arc without any locking.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::dataset::LocationMapping;
use crate::data::preprocessor::Preprocessor;
use crate::domain::error::ServiceError;
use crate::domain::house::{HouseFeatures, PropertyType};
use crate::domain::prediction::{ModelInfo, PredictionResult};
use crate::infra::artifact_store::{ArtifactStore, ModelMetadata};
use crate::infra::location_store::LocationStore;
use crate::ml::predictor::Predictor;
use crate::ml::trainer::MODEL_NAME;

pub const APP_NAME:    &str = "House Price Prediction API";
pub const APP_VERSION: &str = "1.0.0";

// ─── Service Configuration ───────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub models_dir:       PathBuf,
    pub location_mapping: PathBuf,
    pub host:             String,
    pub port:             u16,
    /// Echo internal error text in 5xx bodies
    pub debug:            bool,
    /// Browser origins allowed to call the API cross-origin
    pub cors_origins:     Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            models_dir:       PathBuf::from("ml/models"),
            location_mapping: PathBuf::from("data/location_mapping.json"),
            host:             "0.0.0.0".to_string(),
            port:             8000,
            debug:            false,
            cors_origins:     vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

// ─── Response Bodies ─────────────────────────────────────────────────────────
/// Body of GET /health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status:       String,
    pub model_loaded: bool,
    pub model_name:   Option<String>,
    pub timestamp:    String,
}

/// Body of GET /options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormOptions {
    pub locations:      LocationMapping,
    pub property_types: Vec<String>,
}

// ─── PredictionService ───────────────────────────────────────────────────────
pub struct PredictionService {
    config:       ServiceConfig,
    preprocessor: Option<Preprocessor>,
    predictor:    Predictor,
    metadata:     Option<ModelMetadata>,
    options:      FormOptions,
}

impl PredictionService {
    /// An unloaded service; call `load` before serving.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            preprocessor: None,
            predictor:    Predictor::unloaded(),
            metadata:     None,
            options:      FormOptions::default(),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Load artifacts and the location lookup.
    ///
    /// The lookup is read regardless of whether the model loads.
    /// On artifact failure the error is logged, returned, and the
    /// service is left unloaded.
    pub fn load(&mut self) -> Result<(), ServiceError> {
        self.options = self.load_options();

        let store = ArtifactStore::new(&self.config.models_dir);
        tracing::info!("Loading model from: '{}'", store.model_path().display());

        match store.load_all() {
            Ok(bundle) => {
                self.preprocessor = Some(Preprocessor::new(
                    bundle.encoders,
                    bundle.scaler,
                    bundle.feature_names,
                ));
                let name = bundle
                    .metadata
                    .as_ref()
                    .map_or(MODEL_NAME, |m| m.model_name.as_str())
                    .to_string();
                self.predictor = Predictor::new(bundle.model, name);
                self.metadata  = bundle.metadata;
                tracing::info!("Successfully loaded all ML components.");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load model: {:#}", e);
                self.preprocessor = None;
                self.predictor    = Predictor::unloaded();
                self.metadata     = None;
                Err(ServiceError::ArtifactLoad(format!("{e:#}")))
            }
        }
    }

    fn load_options(&self) -> FormOptions {
        let property_types = PropertyType::ALL.iter().map(|p| p.label().to_string()).collect();

        match LocationStore::new(&self.config.location_mapping).load() {
            Ok(Some(locations)) => FormOptions { locations, property_types },
            Ok(None) => {
                tracing::warn!(
                    "No location mapping at '{}'",
                    self.config.location_mapping.display()
                );
                FormOptions { locations: LocationMapping::new(), property_types }
            }
            Err(e) => {
                tracing::error!("Failed to fetch options: {:#}", e);
                FormOptions::default()
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.preprocessor.is_some() && self.predictor.is_loaded()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.predictor.model_name()
    }

    /// Price one validated house.
    pub fn predict(&self, features: HouseFeatures) -> Result<PredictionResult, ServiceError> {
        let preprocessor = self.preprocessor.as_ref().ok_or(ServiceError::ModelNotLoaded)?;

        tracing::info!("Prediction requested for: {}", features.location);
        let vector   = preprocessor.transform(&features)?;
        let estimate = self.predictor.predict(&vector)?;
        let name     = self.predictor.model_name().unwrap_or(MODEL_NAME);

        Ok(PredictionResult::new(estimate, name, features))
    }

    pub fn health(&self) -> HealthReport {
        let loaded = self.is_loaded();
        HealthReport {
            status:       if loaded { "healthy" } else { "unhealthy" }.to_string(),
            model_loaded: loaded,
            model_name:   self.model_name().map(str::to_string),
            timestamp:    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_loaded: self.is_loaded(),
            accuracy:     self.metadata.as_ref().map(|m| m.accuracy),
            features:     self
                .preprocessor
                .as_ref()
                .map(|p| p.feature_order().to_vec())
                .unwrap_or_default(),
        }
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }
}

/// Train a tiny model into `dir/models` and write a lookup file.
#[cfg(test)]
pub(crate) fn sample_config(tag: &str) -> ServiceConfig {
    use crate::domain::record::HouseRecord;
    use crate::ml::trainer::{train, TrainParams};

    let dir = std::env::temp_dir().join(format!("hpp-service-{}-{}", tag, std::process::id()));
    let _   = std::fs::remove_dir_all(&dir);

    let records: Vec<HouseRecord> = (0..40)
        .map(|i| {
            let area = 600.0 + 50.0 * i as f64;
            HouseRecord {
                area,
                bedrooms:        (i % 4 + 1) as u32,
                bathrooms:       2.0,
                state:           if i % 2 == 0 { "Maharashtra" } else { "Goa" }.into(),
                location:        if i % 2 == 0 { "Pune" } else { "Panaji" }.into(),
                year_built:      2010 + (i % 10) as i32,
                property_type:   PropertyType::ALL[i % 3],
                parking:         i % 2 == 0,
                modular_kitchen: false,
                dining_hall:     true,
                price:           area * 5_000.0,
            }
        })
        .collect();

    let params  = TrainParams { n_trees: 5, max_depth: 6, ..TrainParams::default() };
    let outcome = train(&records, &params).unwrap();
    let mut mapping = LocationMapping::new();
    mapping.insert("Goa".into(), vec!["Panaji".into()]);
    mapping.insert("Maharashtra".into(), vec!["Pune".into()]);
    let lookup = LocationStore::new(dir.join("location_mapping.json")).stage(&mapping).unwrap();

    ArtifactStore::new(dir.join("models")).save_all(&outcome.bundle, vec![lookup]).unwrap();

    ServiceConfig {
        models_dir:       dir.join("models"),
        location_mapping: dir.join("location_mapping.json"),
        ..ServiceConfig::default()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::house::HouseFeaturesInput;

    fn house(location: &str) -> HouseFeatures {
        HouseFeaturesInput {
            area:            1500.0,
            bedrooms:        3,
            bathrooms:       2.0,
            location:        location.into(),
            year_built:      2015,
            state:           "maharashtra".into(),
            property_type:   "apartment".into(),
            parking:         true,
            modular_kitchen: false,
            dining_hall:     true,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_health_before_and_after_load() {
        let mut svc = PredictionService::new(sample_config("health"));
        let before  = svc.health();
        assert!(!before.model_loaded);
        assert_eq!(before.status, "unhealthy");
        assert_eq!(before.model_name, None);

        svc.load().unwrap();
        let after = svc.health();
        assert!(after.model_loaded);
        assert_eq!(after.status, "healthy");
        assert_eq!(after.model_name.as_deref(), Some(MODEL_NAME));
    }

    #[test]
    fn test_predict_before_load_is_not_loaded() {
        let svc = PredictionService::new(sample_config("unloaded"));
        assert!(matches!(svc.predict(house("Pune")), Err(ServiceError::ModelNotLoaded)));
    }

    #[test]
    fn test_prediction_band_and_echo() {
        let mut svc = PredictionService::new(sample_config("predict"));
        svc.load().unwrap();

        let r = svc.predict(house(" pune ")).unwrap();
        assert!(r.lower <= r.price && r.price <= r.upper);
        assert!(((r.upper - r.price) - (r.price - r.lower)).abs() < 1e-6);
        assert_eq!(r.input_echo.location, "Pune");
        assert_eq!(r.model_name, MODEL_NAME);
    }

    #[test]
    fn test_unseen_location_still_predicts() {
        let mut svc = PredictionService::new(sample_config("unseen"));
        svc.load().unwrap();
        assert!(svc.predict(house("Atlantis")).unwrap().price.is_finite());
    }

    #[test]
    fn test_missing_artifacts_leave_service_degraded() {
        let dir = std::env::temp_dir().join(format!("hpp-service-empty-{}", std::process::id()));
        let mut svc = PredictionService::new(ServiceConfig {
            models_dir:       dir.join("models"),
            location_mapping: dir.join("none.json"),
            ..ServiceConfig::default()
        });

        assert!(matches!(svc.load(), Err(ServiceError::ArtifactLoad(_))));
        assert!(!svc.is_loaded());
        assert!(!svc.model_info().model_loaded);

        // absent lookup: no locations, property types still offered
        let opts = svc.options();
        assert!(opts.locations.is_empty());
        assert_eq!(opts.property_types, vec!["Apartment", "Independent House", "Villa"]);
    }

    #[test]
    fn test_inconsistent_artifacts_leave_service_degraded() {
        use crate::infra::artifact_store::FEATURE_NAMES_FILE;

        let cfg   = sample_config("inconsistent");
        let names = vec!["area".to_string(); 11];
        std::fs::write(cfg.models_dir.join(FEATURE_NAMES_FILE), bincode::serialize(&names).unwrap())
            .unwrap();

        let mut svc = PredictionService::new(cfg);
        assert!(matches!(svc.load(), Err(ServiceError::ArtifactLoad(_))));
        assert!(!svc.health().model_loaded);
        assert!(matches!(svc.predict(house("Pune")), Err(ServiceError::ModelNotLoaded)));
    }

    #[test]
    fn test_model_info_after_load() {
        let mut svc = PredictionService::new(sample_config("info"));
        svc.load().unwrap();

        let info = svc.model_info();
        assert!(info.model_loaded);
        assert!(info.accuracy.is_some());
        assert_eq!(info.features.len(), 10);
        assert_eq!(svc.options().locations["Goa"], vec!["Panaji"]);
    }
}
