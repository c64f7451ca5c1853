// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams the rest of the system programs against:
//
//   RecordSource — anything that yields a batch of input rows
//                  (the raw listings CSV, the districts JSON).
//   Regressor    — anything that maps one numeric feature
//                  vector to a price (the random forest, a
//                  single tree, a constant stub in tests).
//
// The application layer only sees these traits, so a new data
// source or model type plugs in without touching the use cases.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// A component that loads every record it has in one go.
///
/// Implementations:
///   - RawListingLoader → rows of the raw housing CSV
///   - DistrictLoader   → state/district pairs from JSON
pub trait RecordSource {
    type Record;

    fn load_all(&self) -> Result<Vec<Self::Record>>;
}

// ─── Regressor ────────────────────────────────────────────────────────────────
/// A fitted regression model.
///
/// Implementations must be read-only after fitting so a single
/// instance can serve any number of concurrent requests.
pub trait Regressor: Send + Sync {
    /// Predict the target for one already-scaled feature vector
    fn predict_one(&self, features: &[f64]) -> f64;

    /// Number of features the model was fitted on
    fn n_features(&self) -> usize;

    /// Predict every row of a matrix
    fn predict_many(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|r| self.predict_one(r)).collect()
    }
}
