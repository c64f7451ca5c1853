// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure the serving path can produce falls into one of
// four kinds:
//
//   ValidationError     — bad user input            → HTTP 400
//   ModelNotLoaded      — artifacts never loaded    → HTTP 503
//   PreprocessingError  — input/schema mismatch     → HTTP 500
//   ArtifactLoad        — startup I/O / decode fail → logged, degraded
//
// The pipeline and CLI use anyhow instead; these typed errors
// exist only at the seams where the caller has to branch on
// the kind (the HTTP layer mapping kinds to status codes).
//
// Reference: thiserror crate documentation
//            Rust Book §9 (Error Handling)

use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field as it appears in the JSON body
    pub field: String,

    /// Human readable reason, safe to echo back to the client
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field:   field.into(),
            message: message.into(),
        }
    }
}

/// Structural mismatch between a feature record and the fitted
/// artifacts. These are programmer errors, never user errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreprocessingError {
    #[error("column '{0}' required by the feature order is not produced by the record")]
    MissingColumn(String),

    #[error("no encoder fitted for categorical column '{0}'")]
    MissingEncoder(String),

    #[error("encoder for column '{0}' has an empty vocabulary")]
    EmptyVocabulary(String),

    #[error("expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Errors surfaced by the prediction service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("ML model is not loaded")]
    ModelNotLoaded,

    #[error("preprocessing failed: {0}")]
    Preprocessing(#[from] PreprocessingError),

    #[error("failed to load model artifacts: {0}")]
    ArtifactLoad(String),
}
