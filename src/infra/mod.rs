// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence and bookkeeping shared by the pipeline and the
// service:
//
//   artifact_store.rs  — Model artifacts on disk
//                        bincode blobs for the forest, scaler,
//                        encoders, feature order and metadata,
//                        written all-or-nothing via temp files
//
//   location_store.rs  — Frontend lookup file
//                        state → sorted cities as JSON; absent
//                        file means "no options"
//
//   metrics.rs         — Evaluation metrics
//                        R² and RMSE on the held-out split, and
//                        a metrics.csv row per pipeline run
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Binary model artifacts
pub mod artifact_store;

/// State → cities lookup JSON
pub mod location_store;

/// R², RMSE and the run log
pub mod metrics;
