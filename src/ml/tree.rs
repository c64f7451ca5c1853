// ============================================================
// Layer 5 — Regression Tree (CART)
// ============================================================
// A binary decision tree fitted by greedy variance reduction.
//
// At each node, for each candidate feature:
//   1. Sort the node's samples by that feature
//   2. Sweep left→right keeping running sums of y
//   3. Score every boundary between two distinct values by
//        sum_left² / n_left + sum_right² / n_right
//      (maximising this is the same as minimising the summed
//       squared error of the two children)
//
// The best boundary becomes a split at the midpoint of the two
// values. A node becomes a leaf (mean of its targets) when the
// depth limit is reached, it has too few samples, or no split
// lowers the error.
//
// Nodes live in a flat Vec and refer to children by index so
// the whole tree serialises as one plain list. Children are
// always pushed after their parent, so every child index is
// greater than its parent's; `validate` checks exactly that on
// a decoded tree before it is used.
//
// Reference: Breiman et al. (1984) Classification and Regression Trees

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::traits::Regressor;

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth:         usize,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    /// Features examined per split; None = all of them
    pub max_features:      Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth:         20,
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf { value: f64 },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes:      Vec<Node>,
    n_features: usize,
}

/// Best boundary found for one node
struct SplitCandidate {
    feature:   usize,
    threshold: f64,
    score:     f64,
}

impl RegressionTree {
    /// Fit on the rows of `x` selected by `indices` (duplicates allowed,
    /// which is how bootstrap samples are passed in).
    pub fn fit<R: Rng>(
        x:       &[Vec<f64>],
        y:       &[f64],
        indices: &[usize],
        params:  &TreeParams,
        rng:     &mut R,
    ) -> Self {
        let n_features = x.first().map(Vec::len).unwrap_or(0);
        let mut tree   = Self { nodes: Vec::new(), n_features };
        let mut idx    = indices.to_vec();

        if idx.is_empty() {
            tree.nodes.push(Node::Leaf { value: 0.0 });
            return tree;
        }

        tree.grow(x, y, &mut idx, 0, params, rng);
        tree
    }

    /// Number of nodes (leaves + splits)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match &nodes[at] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    /// Reject a decoded tree that prediction could not walk safely.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.nodes.is_empty(), "tree has no nodes");

        for (at, node) in self.nodes.iter().enumerate() {
            if let Node::Split { feature, threshold, left, right } = node {
                anyhow::ensure!(
                    *feature < self.n_features,
                    "node {} splits on feature {} of {}",
                    at, feature, self.n_features
                );
                anyhow::ensure!(!threshold.is_nan(), "node {} has a NaN threshold", at);
                for child in [*left, *right] {
                    anyhow::ensure!(
                        child > at && child < self.nodes.len(),
                        "node {} points at child {} of {}",
                        at, child, self.nodes.len()
                    );
                }
            }
        }
        Ok(())
    }

    fn grow<R: Rng>(
        &mut self,
        x:      &[Vec<f64>],
        y:      &[f64],
        idx:    &mut [usize],
        depth:  usize,
        params: &TreeParams,
        rng:    &mut R,
    ) -> usize {
        let n    = idx.len();
        let sum: f64 = idx.iter().map(|&i| y[i]).sum();
        let mean = sum / n as f64;

        let splittable = depth < params.max_depth
            && n >= params.min_samples_split.max(2)
            && n >= 2 * params.min_samples_leaf.max(1);

        let best = if splittable {
            self.best_split(x, y, idx, sum, params, rng)
        } else {
            None
        };

        let Some(split) = best else {
            self.nodes.push(Node::Leaf { value: mean });
            return self.nodes.len() - 1;
        };

        // Partition in place: ≤ threshold on the left
        idx.sort_by(|&a, &b| x[a][split.feature].total_cmp(&x[b][split.feature]));
        let cut = idx.partition_point(|&i| x[i][split.feature] <= split.threshold);

        // Reserve this node's slot before the children are appended
        let at = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        let (left_idx, right_idx) = idx.split_at_mut(cut);
        let left  = self.grow(x, y, left_idx, depth + 1, params, rng);
        let right = self.grow(x, y, right_idx, depth + 1, params, rng);

        self.nodes[at] = Node::Split {
            feature:   split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        at
    }

    fn best_split<R: Rng>(
        &self,
        x:      &[Vec<f64>],
        y:      &[f64],
        idx:    &[usize],
        total:  f64,
        params: &TreeParams,
        rng:    &mut R,
    ) -> Option<SplitCandidate> {
        let n        = idx.len();
        let min_leaf = params.min_samples_leaf.max(1);

        let mut features: Vec<usize> = (0..self.n_features).collect();
        if let Some(k) = params.max_features {
            if k < features.len() {
                features.shuffle(rng);
                features.truncate(k.max(1));
                features.sort_unstable();
            }
        }

        // Score of leaving the node unsplit; a split must beat it
        let parent_score = total * total / n as f64;
        let mut best: Option<SplitCandidate> = None;
        let mut order = idx.to_vec();

        for &f in &features {
            order.sort_by(|&a, &b| x[a][f].total_cmp(&x[b][f]));

            let mut left_sum = 0.0;
            for k in 0..n - 1 {
                left_sum += y[order[k]];

                let n_left  = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let here = x[order[k]][f];
                let next = x[order[k + 1]][f];
                if here >= next {
                    continue;
                }

                let right_sum = total - left_sum;
                let score = left_sum * left_sum / n_left as f64
                    + right_sum * right_sum / n_right as f64;

                if best.as_ref().map_or(true, |b| score > b.score) {
                    // Midpoint can round up to `next` for adjacent floats
                    let mut threshold = here + (next - here) / 2.0;
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(SplitCandidate { feature: f, threshold, score });
                }
            }
        }

        let tolerance = 1e-12 * parent_score.abs().max(1.0);
        best.filter(|b| b.score > parent_score + tolerance)
    }
}

impl Regressor for RegressionTree {
    fn predict_one(&self, features: &[f64]) -> f64 {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    let v = features.get(*feature).copied().unwrap_or(0.0);
                    at = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fit_all(x: &[Vec<f64>], y: &[f64], params: &TreeParams) -> RegressionTree {
        let idx: Vec<usize> = (0..x.len()).collect();
        let mut rng = StdRng::seed_from_u64(7);
        RegressionTree::fit(x, y, &idx, params, &mut rng)
    }

    #[test]
    fn test_learns_step_function() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64>      = (0..10).map(|i| if i < 5 { 1.0 } else { 9.0 }).collect();
        let tree = fit_all(&x, &y, &TreeParams::default());

        assert_eq!(tree.predict_one(&[2.0]), 1.0);
        assert_eq!(tree.predict_one(&[7.0]), 9.0);
        assert_eq!(tree.predict_one(&[4.5]), 1.0); // threshold is inclusive
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64, 1.0]).collect();
        let y = vec![3.0; 6];
        let tree = fit_all(&x, &y, &TreeParams::default());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_one(&[100.0, 0.0]), 3.0);
    }

    #[test]
    fn test_max_depth_is_respected() {
        let x: Vec<Vec<f64>> = (0..64).map(|i| vec![i as f64]).collect();
        let y: Vec<f64>      = (0..64).map(|i| (i * i) as f64).collect();
        let params = TreeParams { max_depth: 3, ..TreeParams::default() };
        let tree   = fit_all(&x, &y, &params);
        assert!(tree.depth() <= 3);
        assert!(tree.node_count() <= 15);
    }

    #[test]
    fn test_picks_informative_feature() {
        // Feature 0 is noise-free signal, feature 1 is constant
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![(i % 2) as f64, 5.0]).collect();
        let y: Vec<f64>      = (0..20).map(|i| if i % 2 == 0 { 10.0 } else { 20.0 }).collect();
        let tree = fit_all(&x, &y, &TreeParams::default());
        assert_eq!(tree.predict_one(&[0.0, 5.0]), 10.0);
        assert_eq!(tree.predict_one(&[1.0, 5.0]), 20.0);
    }

    #[test]
    fn test_fitted_tree_is_valid() {
        let x: Vec<Vec<f64>> = (0..32).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64>      = (0..32).map(|i| (i * 2) as f64).collect();
        assert!(fit_all(&x, &y, &TreeParams::default()).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_broken_trees() {
        let empty = RegressionTree { nodes: vec![], n_features: 2 };
        assert!(empty.validate().unwrap_err().to_string().contains("no nodes"));

        let dangling = RegressionTree {
            nodes: vec![
                Node::Split { feature: 0, threshold: 1.0, left: 1, right: 7 },
                Node::Leaf { value: 1.0 },
            ],
            n_features: 2,
        };
        assert!(dangling.validate().is_err());

        let cycle = RegressionTree {
            nodes: vec![
                Node::Split { feature: 0, threshold: 1.0, left: 0, right: 1 },
                Node::Leaf { value: 1.0 },
            ],
            n_features: 2,
        };
        assert!(cycle.validate().is_err());

        let wide = RegressionTree {
            nodes: vec![
                Node::Split { feature: 5, threshold: 1.0, left: 1, right: 2 },
                Node::Leaf { value: 1.0 },
                Node::Leaf { value: 2.0 },
            ],
            n_features: 2,
        };
        assert!(wide.validate().is_err());
    }

    #[test]
    fn test_empty_indices_give_zero_leaf() {
        let x   = vec![vec![1.0]];
        let y   = vec![4.0];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = RegressionTree::fit(&x, &y, &[], &TreeParams::default(), &mut rng);
        assert_eq!(tree.predict_one(&[1.0]), 0.0);
    }
}
