// ============================================================
// Layer 5 — Label Encoding
// ============================================================
// Maps categorical strings to integer indices.
//
// LabelEncoder  — one column's vocabulary, sorted ascending so
//                 the index assignment is independent of row
//                 order (same as fitting on a shuffled copy).
// EncoderSet    — one LabelEncoder per categorical column.
//
// Unseen labels:
//   At inference time a label missing from the vocabulary is
//   replaced by the vocabulary's FIRST label before encoding.
//   This never fails and never rejects a request. It can be
//   surprising (an unknown city is priced as the alphabetically
//   first city) but it is the intended policy and preserved
//   exactly.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::error::PreprocessingError;

/// Vocabulary for a single categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on every label seen in the column.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = labels
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        Self { classes: unique.into_iter().collect() }
    }

    /// Sorted vocabulary
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// The label substituted for anything unseen
    pub fn fallback_label(&self) -> Option<&str> {
        self.classes.first().map(String::as_str)
    }

    /// Exact lookup; None when the label is not in the vocabulary
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
    }

    /// Lookup that substitutes the fallback label for unseen input.
    /// Only fails when the vocabulary itself is empty.
    pub fn encode_or_fallback(&self, column: &str, label: &str) -> Result<usize, PreprocessingError> {
        if let Some(idx) = self.encode(label) {
            return Ok(idx);
        }

        match self.fallback_label() {
            Some(fallback) => {
                tracing::debug!(
                    "Unseen {} label '{}' mapped to fallback '{}'",
                    column, label, fallback
                );
                Ok(0)
            }
            None => Err(PreprocessingError::EmptyVocabulary(column.to_string())),
        }
    }
}

/// Fitted encoders keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncoderSet {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl EncoderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, encoder: LabelEncoder) {
        self.encoders.insert(column.into(), encoder);
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    /// Encode `label` for `column`, falling back for unseen labels.
    pub fn encode(&self, column: &str, label: &str) -> Result<usize, PreprocessingError> {
        self.get(column)
            .ok_or_else(|| PreprocessingError::MissingEncoder(column.to_string()))?
            .encode_or_fallback(column, label)
    }
}
