// ============================================================
// Layer 4 — Raw Data Cleaner (pipeline phase 1)
// ============================================================
// Maps raw listings onto the canonical HouseRecord schema.
//
// Direct mappings:
//   area      ← Size_in_SqFt
//   bedrooms  ← BHK
//   bathrooms ← min(bedrooms, 5)
//   state     ← State  (trimmed + title-cased)
//   location  ← City   (trimmed + title-cased)
//   price     ← Price_in_Lakhs × 100 000
//
// The raw data has no year or amenity columns, so they are
// derived from fixed conditional-probability rules:
//
//   year_built      uniform in [2005, 2024)
//   property_type   bedrooms ≤ 2 → Apartment
//                   bedrooms = 3 → Apartment 0.7 / Independent House 0.3
//                   bedrooms ≥ 4 → Independent House 0.7 / Villa 0.3
//   parking         always for Villa / Independent House, else coin flip
//   modular_kitchen 1 with p = 0.6
//   dining_hall     1 with p = 0.8 if bedrooms ≥ 3 or area > 1200,
//                   otherwise p = 0.2
//
// Rows with a missing cell, a blank state/city, or a
// non-positive area are dropped.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::loader::RawListing;
use crate::data::sampling::pick_weighted;
use crate::domain::house::{normalize_label, PropertyType};
use crate::domain::record::HouseRecord;

/// Rupees per lakh
pub const LAKH: f64 = 100_000.0;

pub struct Cleaner {
    seed: u64,
}

impl Cleaner {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Clean every listing. The same seed and input always give
    /// the same output rows.
    pub fn clean(&self, listings: &[RawListing]) -> Vec<HouseRecord> {
        let mut rng     = StdRng::seed_from_u64(self.seed);
        let mut records = Vec::with_capacity(listings.len());

        for raw in listings {
            if let Some(record) = clean_one(raw, &mut rng) {
                records.push(record);
            }
        }

        let dropped = listings.len() - records.len();
        if dropped > 0 {
            tracing::warn!("Dropped {} incomplete raw rows", dropped);
        }
        tracing::info!("Cleaned {} records.", records.len());
        records
    }
}

fn clean_one<R: Rng>(raw: &RawListing, rng: &mut R) -> Option<HouseRecord> {
    let area  = raw.size_sqft.filter(|a| a.is_finite() && *a > 0.0)?;
    let bhk   = raw.bhk.filter(|b| b.is_finite() && *b >= 0.0)?;
    let price = raw.price_lakhs.filter(|p| p.is_finite())? * LAKH;

    let state    = normalize_label(raw.state.as_deref()?);
    let location = normalize_label(raw.city.as_deref()?);
    if state.is_empty() || location.is_empty() {
        return None;
    }

    let bedrooms  = bhk.round() as u32;
    let bathrooms = f64::from(bedrooms.min(5));

    // Draw order is fixed: year, type, parking, kitchen, dining
    let year_built      = rng.gen_range(2005..2024);
    let property_type   = property_type_for(bedrooms, rng);
    let parking         = match property_type {
        PropertyType::Villa | PropertyType::IndependentHouse => true,
        PropertyType::Apartment => rng.gen_bool(0.5),
    };
    let modular_kitchen = rng.gen_bool(0.6);
    let dining_hall     = rng.gen_bool(if bedrooms >= 3 || area > 1200.0 { 0.8 } else { 0.2 });

    Some(HouseRecord {
        area,
        bedrooms,
        bathrooms,
        state,
        location,
        year_built,
        property_type,
        parking,
        modular_kitchen,
        dining_hall,
        price,
    })
}

fn property_type_for<R: Rng>(bedrooms: u32, rng: &mut R) -> PropertyType {
    match bedrooms {
        0..=2 => PropertyType::Apartment,
        3 => pick_weighted(rng, &[
            (PropertyType::Apartment, 0.7),
            (PropertyType::IndependentHouse, 0.3),
        ]),
        _ => pick_weighted(rng, &[
            (PropertyType::IndependentHouse, 0.7),
            (PropertyType::Villa, 0.3),
        ]),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn raw(state: &str, city: &str, bhk: f64, area: f64, lakhs: f64) -> RawListing {
        RawListing {
            state:       Some(state.into()),
            city:        Some(city.into()),
            bhk:         Some(bhk),
            size_sqft:   Some(area),
            price_lakhs: Some(lakhs),
        }
    }

    #[test]
    fn test_maps_columns() {
        let out = Cleaner::new(42).clean(&[raw(" maharashtra ", "pune", 2.0, 950.0, 80.0)]);
        assert_eq!(out.len(), 1);
        let r = &out[0];
        assert_eq!(r.state, "Maharashtra");
        assert_eq!(r.location, "Pune");
        assert_eq!(r.price, 8_000_000.0);
        assert_eq!(r.bathrooms, 2.0);
        assert_eq!(r.property_type, PropertyType::Apartment);
        assert!((2005..2024).contains(&r.year_built));
    }

    #[test]
    fn test_bathrooms_capped_at_five() {
        let out = Cleaner::new(1).clean(&[raw("Goa", "Panaji", 8.0, 5000.0, 300.0)]);
        assert_eq!(out[0].bathrooms, 5.0);
    }

    #[test]
    fn test_large_homes_always_have_parking() {
        let rows: Vec<RawListing> = (0..200).map(|_| raw("Goa", "Panaji", 4.0, 2500.0, 200.0)).collect();
        let out = Cleaner::new(9).clean(&rows);
        assert!(out.iter().all(|r| r.property_type != PropertyType::Apartment));
        assert!(out.iter().all(|r| r.parking));
    }

    #[test]
    fn test_drops_incomplete_rows() {
        let mut missing_price = raw("Goa", "Panaji", 2.0, 900.0, 50.0);
        missing_price.price_lakhs = None;
        let zero_area  = raw("Goa", "Panaji", 2.0, 0.0, 50.0);
        let blank_city = raw("Goa", "  ", 2.0, 900.0, 50.0);

        let out = Cleaner::new(1).clean(&[missing_price, zero_area, blank_city]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_same_seed_same_output() {
        let rows: Vec<RawListing> = (0..50)
            .map(|i| raw("Goa", "Panaji", (i % 5) as f64, 600.0 + i as f64 * 20.0, 40.0))
            .collect();
        assert_eq!(Cleaner::new(42).clean(&rows), Cleaner::new(42).clean(&rows));
    }
}
