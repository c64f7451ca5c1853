// ============================================================
// Layer 5 — Random Forest Regressor
// ============================================================
// An average of bootstrap-trained regression trees.
//
// Training, per tree:
//   1. Draw n row indices with replacement (bootstrap sample)
//   2. Fit a RegressionTree on those rows
//
// Each tree gets its own StdRng seeded from the forest's RNG,
// so a fixed random_state gives bit-identical forests no matter
// how many times training is repeated.
//
// Prediction is the arithmetic mean of the tree outputs.
//
// Reference: Breiman (2001) Random Forests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::traits::Regressor;
use crate::ml::tree::{RegressionTree, TreeParams};

/// Hyperparameters for a forest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub tree:         TreeParams,
    pub bootstrap:    bool,
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            tree:         TreeParams::default(),
            bootstrap:    true,
            random_state: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    params:     ForestParams,
    trees:      Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    /// Fit the forest on a row-major matrix and its targets.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: ForestParams) -> anyhow::Result<Self> {
        anyhow::ensure!(!x.is_empty(), "cannot fit a forest on zero rows");
        anyhow::ensure!(
            x.len() == y.len(),
            "feature rows ({}) and targets ({}) differ in length",
            x.len(),
            y.len()
        );
        anyhow::ensure!(params.n_estimators > 0, "n_estimators must be at least 1");

        let n          = x.len();
        let n_features = x[0].len();
        let mut rng    = StdRng::seed_from_u64(params.random_state);
        let mut trees  = Vec::with_capacity(params.n_estimators);

        for t in 0..params.n_estimators {
            let mut tree_rng = StdRng::seed_from_u64(rng.gen());

            let indices: Vec<usize> = if params.bootstrap {
                (0..n).map(|_| tree_rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let tree = RegressionTree::fit(x, y, &indices, &params.tree, &mut tree_rng);
            tracing::debug!(
                "Tree {}/{} fitted: {} nodes, depth {}",
                t + 1, params.n_estimators, tree.node_count(), tree.depth()
            );
            trees.push(tree);
        }

        Ok(Self { params, trees, n_features })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Check a decoded forest: at least one tree, every tree sound and
    /// sized for `n_features` inputs.
    pub fn validate(&self, n_features: usize) -> anyhow::Result<()> {
        anyhow::ensure!(!self.trees.is_empty(), "forest has no trees");
        anyhow::ensure!(
            self.n_features == n_features,
            "forest expects {} features, feature list has {}",
            self.n_features,
            n_features
        );
        for (i, tree) in self.trees.iter().enumerate() {
            anyhow::ensure!(
                tree.n_features() == n_features,
                "tree {} expects {} features, not {}",
                i, tree.n_features(), n_features
            );
            tree.validate().map_err(|e| anyhow::anyhow!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl Regressor for RandomForestRegressor {
    fn predict_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_one(features)).sum();
        sum / self.trees.len() as f64
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn linear_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64, (i % 7) as f64]).collect();
        let y: Vec<f64>      = x.iter().map(|r| 3.0 * r[0] + 10.0).collect();
        (x, y)
    }

    fn small_params(seed: u64) -> ForestParams {
        ForestParams {
            n_estimators: 10,
            tree:         TreeParams { max_depth: 8, ..TreeParams::default() },
            bootstrap:    true,
            random_state: seed,
        }
    }

    #[test]
    fn test_fits_monotone_signal() {
        let (x, y) = linear_data();
        let forest = RandomForestRegressor::fit(&x, &y, small_params(42)).unwrap();
        assert_eq!(forest.n_trees(), 10);

        let low  = forest.predict_one(&[10.0, 3.0]);
        let high = forest.predict_one(&[190.0, 1.0]);
        assert!(low < high);
        assert!((high - 580.0).abs() < 60.0);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let (x, y) = linear_data();
        let a = RandomForestRegressor::fit(&x, &y, small_params(7)).unwrap();
        let b = RandomForestRegressor::fit(&x, &y, small_params(7)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.predict_one(&[55.5, 2.0]), b.predict_one(&[55.5, 2.0]));
    }

    #[test]
    fn test_validate_checks_trees_and_width() {
        let (x, y) = linear_data();
        let forest = RandomForestRegressor::fit(&x, &y, small_params(3)).unwrap();
        assert!(forest.validate(2).is_ok());
        assert!(forest.validate(10).unwrap_err().to_string().contains("features"));

        let bare = RandomForestRegressor { params: small_params(3), trees: vec![], n_features: 2 };
        assert!(bare.validate(2).is_err());
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![1.0];
        assert!(RandomForestRegressor::fit(&x, &y, small_params(1)).is_err());
    }

    #[test]
    fn test_rejects_empty_data() {
        assert!(RandomForestRegressor::fit(&[], &[], small_params(1)).is_err());
    }
}
