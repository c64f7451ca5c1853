// ============================================================
// Layer 5 — ML / Model Layer
// ============================================================
// Everything that learns from numbers or predicts with them.
// No file I/O and no HTTP here: inputs are plain vectors and
// fitted values are serde types that Layer 6 persists.
//
// What's in this layer:
//
//   encoder.rs   — LabelEncoder / EncoderSet
//                  Sorted vocabulary per categorical column,
//                  with the first class as the fallback for
//                  unseen labels
//
//   scaler.rs    — StandardScaler
//                  Per-column mean and population std
//
//   tree.rs      — CART regression tree
//                  Variance-reduction splits, depth-limited
//
//   forest.rs    — Random forest regressor
//                  Bootstrap-sampled trees, mean prediction,
//                  one seed for the whole ensemble
//
//   trainer.rs   — Pipeline phase 4: encode, split, scale,
//                  fit, score
//
//   predictor.rs — Serving-side wrapper that adds the ±5%
//                  band and the "not loaded" state
//
// Reference: Breiman et al. (1984) Classification and Regression Trees
//            Breiman (2001) Random Forests

/// Categorical label encoding
pub mod encoder;

/// Feature standardisation
pub mod scaler;

/// Single regression tree
pub mod tree;

/// Bagged ensemble of regression trees
pub mod forest;

/// Fits the full artifact bundle from a dataset
pub mod trainer;

/// Loaded-model wrapper used by the service
pub mod predictor;
