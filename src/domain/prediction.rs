// ============================================================
// Layer 3 — Prediction Types
// ============================================================
// What the service hands back for one house.
//
// The confidence band is a fixed ±5% around the point estimate.
// It is a presentation heuristic, not an interval derived from
// the forest's tree variance or quantiles.

use serde::{Deserialize, Serialize};

use crate::domain::house::HouseFeatures;

/// Half-width of the confidence band as a fraction of the price
pub const CONFIDENCE_MARGIN: f64 = 0.05;

/// A point estimate with its symmetric band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub price: f64,
    pub lower: f64,
    pub upper: f64,
}

impl PriceEstimate {
    /// Build the ±5% band around `price`.
    ///
    /// The margin uses the absolute price so lower ≤ price ≤ upper
    /// holds even for a (degenerate) negative prediction.
    pub fn with_band(price: f64) -> Self {
        let margin = price.abs() * CONFIDENCE_MARGIN;
        Self {
            price,
            lower: price - margin,
            upper: price + margin,
        }
    }
}

/// Body of a successful POST /predict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub price:      f64,
    pub lower:      f64,
    pub upper:      f64,
    pub model_name: String,
    pub input_echo: HouseFeatures,
}

impl PredictionResult {
    pub fn new(estimate: PriceEstimate, model_name: impl Into<String>, input: HouseFeatures) -> Self {
        Self {
            price:      estimate.price,
            lower:      estimate.lower,
            upper:      estimate.upper,
            model_name: model_name.into(),
            input_echo: input,
        }
    }
}

/// Body of GET /model-info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_loaded: bool,
    /// Held-out R² recorded at training time, if metadata was found
    pub accuracy:     Option<f64>,
    pub features:     Vec<String>,
}
