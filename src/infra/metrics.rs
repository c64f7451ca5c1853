// ============================================================
// Layer 6 — Evaluation Metrics
// ============================================================
// Held-out regression metrics and a CSV log of training runs.
//
//   R²   = 1 - SS_res / SS_tot
//   RMSE = sqrt(mean((y - ŷ)²))
//
// Each pipeline run appends one row to <models_dir>/metrics.csv
// so the history of runs can be compared later:
//
//   timestamp,seed,n_train,n_test,r2,rmse
//   2026-10-18T12:00:00Z,42,8000,2000,0.912300,412345.67
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

/// Coefficient of determination.
/// Returns 0.0 for an empty or constant-target test set.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().min(y_pred.len());
    if n == 0 {
        return 0.0;
    }

    let mean   = y_true[..n].iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = y_true[..n].iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = y_true[..n]
        .iter()
        .zip(&y_pred[..n])
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

/// Root mean squared error.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().min(y_pred.len());
    if n == 0 {
        return 0.0;
    }

    let mse: f64 = y_true[..n]
        .iter()
        .zip(&y_pred[..n])
        .map(|(y, p)| (y - p).powi(2))
        .sum::<f64>()
        / n as f64;
    mse.sqrt()
}

/// One row of the run log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub timestamp: String,
    pub seed:      u64,
    pub n_train:   usize,
    pub n_test:    usize,
    pub r2:        f64,
    pub rmse:      f64,
}

/// Appends run metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and write the header if the file is new.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "timestamp,seed,n_train,n_test,r2,rmse")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one run
    pub fn log(&self, m: &RunMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{},{},{},{:.6},{:.2}",
            m.timestamp, m.seed, m.n_train, m.n_test, m.r2, m.rmse
        )?;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(r2_score(&y, &y), 1.0);
        assert_eq!(rmse(&y, &y), 0.0);
    }

    #[test]
    fn test_mean_prediction_scores_zero() {
        let y = [1.0, 2.0, 3.0];
        let p = [2.0, 2.0, 2.0];
        assert!(r2_score(&y, &p).abs() < 1e-12);
    }

    #[test]
    fn test_rmse_value() {
        let y = [0.0, 0.0];
        let p = [3.0, 4.0];
        assert!((rmse(&y, &p) - 12.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(r2_score(&[], &[]), 0.0);
        assert_eq!(rmse(&[], &[]), 0.0);
    }

    #[test]
    fn test_logger_appends_rows() {
        let dir    = std::env::temp_dir().join(format!("hpp-metrics-{}", std::process::id()));
        let _      = fs::remove_dir_all(&dir);
        let logger = MetricsLogger::new(&dir).unwrap();
        let run    = RunMetrics {
            timestamp: "2026-01-01T00:00:00Z".into(),
            seed:      42,
            n_train:   80,
            n_test:    20,
            r2:        0.9,
            rmse:      1234.5,
        };
        logger.log(&run).unwrap();
        logger.log(&run).unwrap();

        let text = fs::read_to_string(logger.path()).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().ends_with("0.900000,1234.50"));
    }
}
