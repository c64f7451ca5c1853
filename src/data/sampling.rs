// ============================================================
// Layer 4 — Sampling Helpers
// ============================================================
// Small distributions shared by the cleaner and synthesizer.
// Everything takes the caller's RNG so one seeded StdRng per
// phase drives every draw in that phase.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Pick one item with probability proportional to its weight.
/// Tables are non-empty constants; an invalid one yields its first item.
pub fn pick_weighted<T: Copy, R: Rng>(rng: &mut R, choices: &[(T, f64)]) -> T {
    match choices.choose_weighted(rng, |c| c.1) {
        Ok(&(item, _)) => item,
        Err(e) => {
            tracing::warn!("Unusable weight table: {}", e);
            choices[0].0
        }
    }
}

/// One draw from Normal(mean, std); `mean` itself if `std` is invalid.
pub fn sample_normal<R: Rng>(rng: &mut R, mean: f64, std: f64) -> f64 {
    match Normal::new(mean, std) {
        Ok(normal) => normal.sample(rng),
        Err(e) => {
            tracing::warn!("Invalid normal({}, {}): {}", mean, std, e);
            mean
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pick_weighted_respects_zero_weight() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let v = pick_weighted(&mut rng, &[('a', 0.0), ('b', 1.0)]);
            assert_eq!(v, 'b');
        }
    }

    #[test]
    fn test_pick_weighted_roughly_matches_weights() {
        let mut rng  = StdRng::seed_from_u64(11);
        let n        = 10_000;
        let hits     = (0..n)
            .filter(|_| pick_weighted(&mut rng, &[(1, 0.7), (2, 0.3)]) == 1)
            .count();
        let fraction = hits as f64 / n as f64;
        assert!((fraction - 0.7).abs() < 0.03);
    }

    #[test]
    fn test_invalid_std_falls_back_to_mean() {
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(sample_normal(&mut rng, 1200.0, f64::NAN), 1200.0);
    }

    #[test]
    fn test_normal_mean_and_spread() {
        let mut rng = StdRng::seed_from_u64(5);
        let draws: Vec<f64> = (0..20_000).map(|_| sample_normal(&mut rng, 1200.0, 400.0)).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let var  = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / draws.len() as f64;
        assert!((mean - 1200.0).abs() < 15.0);
        assert!((var.sqrt() - 400.0).abs() < 15.0);
    }
}
