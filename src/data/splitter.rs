// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Shuffles samples and splits them into two sets:
//   - Training set: used to fit the scaler and the forest
//   - Test set:     held out to compute R² and RMSE
//
// Why shuffle before splitting?
//   The combined dataset is ordered (all real rows, then the
//   synthetic rows region by region). Without shuffling, the
//   test set would consist only of the last synthetic regions.
//
// The shuffle is driven by a seeded StdRng so the split, and
// therefore every metric computed from it, is reproducible.
//
// Split ratio: 80% training, 20% test by default.
//
// Reference: rand crate documentation (SliceRandom)

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle `samples` with `seed` and split into (train, test).
///
/// # Arguments
/// * `samples`       - All available samples (consumed by this function)
/// * `test_fraction` - Proportion held out, e.g. 0.2 = 20%
/// * `seed`          - Shuffle seed
///
/// The test size is ceil(n × test_fraction), clamped to n.
pub fn split_train_test<T>(mut samples: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total     = samples.len();
    let fraction  = test_fraction.clamp(0.0, 1.0);
    let test_size = ((total as f64) * fraction).ceil() as usize;
    let split_at  = total - test_size.min(total);

    // split_off(n) removes elements [n..] and returns them
    let test = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} test",
        samples.len(),
        test.len(),
    );

    (samples, test)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, test)     = split_train_test(items, 0.2, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(),  20);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..51).collect();
        let (train, test)     = split_train_test(items, 0.2, 42);
        let mut all: Vec<usize> = train.into_iter().chain(test).collect();
        all.sort_unstable();
        assert_eq!(all, (0..51).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_test((0..30).collect::<Vec<u32>>(), 0.2, 7);
        let b = split_train_test((0..30).collect::<Vec<u32>>(), 0.2, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, test) = split_train_test(Vec::<usize>::new(), 0.2, 1);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_zero_fraction_keeps_everything_for_training() {
        let (train, test) = split_train_test((0..10).collect::<Vec<usize>>(), 0.0, 1);
        assert_eq!(train.len(), 10);
        assert!(test.is_empty());
    }
}
