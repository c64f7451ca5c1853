// ============================================================
// Layer 5 — Standard Scaler
// ============================================================
// Per-feature standardisation: z = (x - mean) / scale.
//
// scale is the population standard deviation (divide by n).
// A constant column has std 0; its scale is set to 1.0 so the
// transform yields 0 instead of NaN.

use serde::{Deserialize, Serialize};

use crate::domain::error::PreprocessingError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean:  Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on a row-major matrix. All rows must share one width.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let n     = rows.len().max(1) as f64;

        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; width];
        for row in rows {
            for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }

        let scale = var
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std > 0.0 { std } else { 1.0 }
            })
            .collect();

        Self { mean, scale }
    }

    /// Build from known parameters
    #[cfg(test)]
    pub fn from_parts(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardise one row.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, PreprocessingError> {
        if row.len() != self.mean.len() {
            return Err(PreprocessingError::DimensionMismatch {
                expected: self.mean.len(),
                got:      row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    /// Standardise every row of a matrix.
    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, PreprocessingError> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}
