// ============================================================
// Layer 5 — Predictor
// ============================================================
// Wraps the (optionally) loaded model and turns one scaled
// feature vector into a PriceEstimate with its ±5% band.
//
// A Predictor can exist without a model: the service starts
// with `Predictor::unloaded()` and every call then fails with
// ServiceError::ModelNotLoaded instead of panicking.

use crate::domain::error::{PreprocessingError, ServiceError};
use crate::domain::prediction::PriceEstimate;
use crate::domain::traits::Regressor;

pub struct Predictor {
    model:      Option<Box<dyn Regressor>>,
    model_name: String,
}

impl Predictor {
    /// A predictor with no model behind it
    pub fn unloaded() -> Self {
        Self { model: None, model_name: String::new() }
    }

    pub fn new(model: impl Regressor + 'static, model_name: impl Into<String>) -> Self {
        Self {
            model:      Some(Box::new(model)),
            model_name: model_name.into(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Name of the loaded model, if any
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().map(|_| self.model_name.as_str())
    }

    pub fn predict(&self, features: &[f64]) -> Result<PriceEstimate, ServiceError> {
        let model = self.model.as_ref().ok_or(ServiceError::ModelNotLoaded)?;

        if features.len() != model.n_features() {
            return Err(PreprocessingError::DimensionMismatch {
                expected: model.n_features(),
                got:      features.len(),
            }
            .into());
        }

        let price = model.predict_one(features);
        tracing::debug!("Predicted price {:.2}", price);
        Ok(PriceEstimate::with_band(price))
    }
}
