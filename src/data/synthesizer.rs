// ============================================================
// Layer 4 — Synthetic Record Generator (pipeline phase 2)
// ============================================================
// Fills coverage gaps: every (state, district) pair with fewer
// than `min_existing` cleaned records gets `per_region` synthetic
// records priced from the real data's baseline.
//
// Pricing model:
//   baseline = mean(price / area) over the cleaned records
//   price    = area × baseline × tier
//            × type    (Apartment 1.0, Independent House 1.15, Villa 1.4)
//            × parking (1.05 if present)
//            × kitchen (1.05 if modular)
//            × dining  (1.03 if present)
//            × noise   (uniform in [0.85, 1.15))
//
// Tier multiplier, by case-insensitive substring match on the
// district name: tier-1 city ×1.8, tier-2 city ×1.1, else ×0.5.
//
// Feature draws per record:
//   area          clamp(trunc(Normal(1200, 400)), 400, 4000)
//   bedrooms      1/2/3/4 with p 0.2/0.4/0.3/0.1
//   bathrooms     min(bedrooms, 4)
//   property_type p 0.6/0.3/0.1 (Apt/House/Villa) in tier-1/2,
//                 p 0.3/0.6/0.1 elsewhere
//   parking       always for Villa, else coin flip
//   year_built    uniform in [2010, 2024)
//   kitchen       1 with p 0.6
//   dining        always if bedrooms ≥ 3 or area > 1200, else p 0.2
//
// Regions are visited in input order and all draws come from a
// single seeded RNG, so reruns with the same seed and inputs
// produce identical rows.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use crate::data::loader::StateDistricts;
use crate::data::sampling::{pick_weighted, sample_normal};
use crate::domain::house::{normalize_label, PropertyType};
use crate::domain::record::HouseRecord;

pub const TIER1_CITIES: [&str; 10] = [
    "Mumbai", "Delhi", "Bangalore", "Hyderabad", "Chennai",
    "Kolkata", "Pune", "Ahmedabad", "Gurgaon", "Noida",
];

pub const TIER2_CITIES: [&str; 16] = [
    "Jaipur", "Lucknow", "Chandigarh", "Indore", "Nagpur", "Thane",
    "Bhopal", "Patna", "Vadodara", "Ghaziabad", "Ludhiana", "Coimbatore",
    "Visakhapatnam", "Kochi", "Raipur", "Bhubaneswar",
];

pub const TIER1_MULTIPLIER: f64 = 1.8;
pub const TIER2_MULTIPLIER: f64 = 1.1;
pub const OTHER_MULTIPLIER: f64 = 0.5;

/// Price multiplier for a district name.
pub fn tier_multiplier(city: &str) -> f64 {
    let city = city.to_lowercase();
    let hit  = |tier: &[&str]| tier.iter().any(|t| city.contains(&t.to_lowercase()));

    if hit(&TIER1_CITIES) {
        TIER1_MULTIPLIER
    } else if hit(&TIER2_CITIES) {
        TIER2_MULTIPLIER
    } else {
        OTHER_MULTIPLIER
    }
}

pub fn type_multiplier(property_type: PropertyType) -> f64 {
    match property_type {
        PropertyType::Apartment        => 1.0,
        PropertyType::IndependentHouse => 1.15,
        PropertyType::Villa            => 1.4,
    }
}

/// Mean rupees per square foot; 0 when there is nothing to average.
pub fn baseline_price_per_sqft(records: &[HouseRecord]) -> f64 {
    let ratios: Vec<f64> = records
        .iter()
        .filter(|r| r.area > 0.0)
        .map(|r| r.price / r.area)
        .collect();

    if ratios.is_empty() {
        0.0
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    }
}

/// Count records per normalised (state, location) pair.
pub fn count_by_region(records: &[HouseRecord]) -> BTreeMap<(String, String), usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry((r.state.clone(), r.location.clone())).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesizerConfig {
    /// Regions with fewer existing records than this are filled
    pub min_existing: usize,
    /// Synthetic records generated per under-covered region
    pub per_region:   usize,
    pub seed:         u64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self { min_existing: 50, per_region: 100, seed: 42 }
    }
}

pub struct Synthesizer {
    config: SynthesizerConfig,
}

impl Synthesizer {
    pub fn new(config: SynthesizerConfig) -> Self {
        Self { config }
    }

    /// Generate synthetic records for every under-covered region.
    pub fn synthesize(&self, existing: &[HouseRecord], regions: &[StateDistricts]) -> Vec<HouseRecord> {
        let baseline = baseline_price_per_sqft(existing);
        let counts   = count_by_region(existing);
        let mut rng  = StdRng::seed_from_u64(self.config.seed);
        let mut out  = Vec::new();

        tracing::info!("Baseline: ₹{:.0}/sqft", baseline);

        for region in regions {
            let state = normalize_label(&region.state);

            for district in &region.districts {
                let location = normalize_label(district);
                let have     = counts
                    .get(&(state.clone(), location.clone()))
                    .copied()
                    .unwrap_or(0);

                if have >= self.config.min_existing {
                    continue;
                }

                let tier = tier_multiplier(&location);
                for _ in 0..self.config.per_region {
                    out.push(synthesize_one(&state, &location, tier, baseline, &mut rng));
                }
            }
        }

        tracing::info!("Generated {} synthetic records.", out.len());
        out
    }
}

fn synthesize_one<R: Rng>(
    state:    &str,
    location: &str,
    tier:     f64,
    baseline: f64,
    rng:      &mut R,
) -> HouseRecord {
    let area = sample_normal(rng, 1200.0, 400.0).trunc().clamp(400.0, 4000.0);

    let bedrooms: u32 = pick_weighted(rng, &[(1, 0.2), (2, 0.4), (3, 0.3), (4, 0.1)]);
    let bathrooms     = f64::from(bedrooms.min(4));

    let type_weights = if tier > 1.0 { [0.6, 0.3, 0.1] } else { [0.3, 0.6, 0.1] };
    let property_type = pick_weighted(rng, &[
        (PropertyType::Apartment,        type_weights[0]),
        (PropertyType::IndependentHouse, type_weights[1]),
        (PropertyType::Villa,            type_weights[2]),
    ]);

    let parking         = property_type == PropertyType::Villa || rng.gen_bool(0.5);
    let year_built      = rng.gen_range(2010..2024);
    let modular_kitchen = rng.gen_bool(0.6);
    let dining_hall     = bedrooms >= 3 || area > 1200.0 || rng.gen_bool(0.2);

    let mut price = area * baseline * tier
        * type_multiplier(property_type)
        * if parking { 1.05 } else { 1.0 }
        * if modular_kitchen { 1.05 } else { 1.0 }
        * if dining_hall { 1.03 } else { 1.0 };
    price *= rng.gen_range(0.85..1.15);

    HouseRecord {
        area,
        bedrooms,
        bathrooms,
        state:    state.to_string(),
        location: location.to_string(),
        year_built,
        property_type,
        parking,
        modular_kitchen,
        dining_hall,
        price:    price.trunc(),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: &str, location: &str, area: f64, price: f64) -> HouseRecord {
        HouseRecord {
            area,
            bedrooms:        2,
            bathrooms:       2.0,
            state:           state.into(),
            location:        location.into(),
            year_built:      2015,
            property_type:   PropertyType::Apartment,
            parking:         false,
            modular_kitchen: false,
            dining_hall:     false,
            price,
        }
    }

    fn regions() -> Vec<StateDistricts> {
        vec![
            StateDistricts {
                state:     "Maharashtra".into(),
                districts: vec!["Pune".into(), "Satara".into()],
            },
            StateDistricts {
                state:     "uttar pradesh".into(),
                districts: vec!["Varanasi".into()],
            },
        ]
    }

    fn config(seed: u64) -> SynthesizerConfig {
        SynthesizerConfig { min_existing: 50, per_region: 100, seed }
    }

    #[test]
    fn test_tier_lookup_is_substring_and_case_insensitive() {
        assert_eq!(tier_multiplier("Mumbai Suburban"), TIER1_MULTIPLIER);
        assert_eq!(tier_multiplier("NAGPUR"), TIER2_MULTIPLIER);
        assert_eq!(tier_multiplier("Satara"), OTHER_MULTIPLIER);
    }

    #[test]
    fn test_baseline_is_mean_ratio() {
        let recs = vec![record("A", "B", 100.0, 1000.0), record("A", "B", 100.0, 3000.0)];
        assert_eq!(baseline_price_per_sqft(&recs), 20.0);
        assert_eq!(baseline_price_per_sqft(&[]), 0.0);
    }

    #[test]
    fn test_only_under_covered_regions_are_filled() {
        // Pune already has 50 records, Satara has 49
        let mut existing: Vec<HouseRecord> =
            (0..50).map(|_| record("Maharashtra", "Pune", 1000.0, 5_000_000.0)).collect();
        existing.extend((0..49).map(|_| record("Maharashtra", "Satara", 1000.0, 2_000_000.0)));

        let out    = Synthesizer::new(config(42)).synthesize(&existing, &regions());
        let counts = count_by_region(&out);

        let key = |s: &str, l: &str| (s.to_string(), l.to_string());
        assert_eq!(counts.get(&key("Maharashtra", "Pune")), None);
        assert_eq!(counts.get(&key("Maharashtra", "Satara")), Some(&100));
        assert_eq!(counts.get(&key("Uttar Pradesh", "Varanasi")), Some(&100));
    }

    #[test]
    fn test_generated_fields_within_rules() {
        let existing = vec![record("Goa", "Panaji", 1000.0, 5_000_000.0)];
        let out      = Synthesizer::new(config(1)).synthesize(&existing, &regions());

        for r in &out {
            assert!((400.0..=4000.0).contains(&r.area));
            assert!((1..=4).contains(&r.bedrooms));
            assert_eq!(r.bathrooms, f64::from(r.bedrooms.min(4)));
            assert!((2010..2024).contains(&r.year_built));
            if r.property_type == PropertyType::Villa {
                assert!(r.parking);
            }
            if r.bedrooms >= 3 || r.area > 1200.0 {
                assert!(r.dining_hall);
            }
            assert!(r.price > 0.0);
            assert_eq!(r.price, r.price.trunc());
        }
    }

    #[test]
    fn test_price_within_noise_band() {
        let existing = vec![record("Goa", "Panaji", 1000.0, 5_000_000.0)]; // 5000/sqft
        let out      = Synthesizer::new(config(3)).synthesize(&existing, &regions());

        for r in out.iter().filter(|r| r.location == "Satara") {
            let mut expected = r.area * 5000.0 * OTHER_MULTIPLIER * type_multiplier(r.property_type);
            if r.parking         { expected *= 1.05; }
            if r.modular_kitchen { expected *= 1.05; }
            if r.dining_hall     { expected *= 1.03; }
            let ratio = r.price / expected;
            assert!(ratio >= 0.849 && ratio < 1.15, "ratio {ratio}");
        }
    }

    #[test]
    fn test_rerun_with_same_seed_is_identical() {
        let existing = vec![record("Goa", "Panaji", 1000.0, 5_000_000.0)];
        let a = Synthesizer::new(config(42)).synthesize(&existing, &regions());
        let b = Synthesizer::new(config(42)).synthesize(&existing, &regions());
        assert_eq!(count_by_region(&a), count_by_region(&b));
        assert_eq!(a, b);
    }
}
