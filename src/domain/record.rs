// ============================================================
// Layer 3 — HouseRecord (one dataset row)
// ============================================================
// The canonical row of the combined training dataset.
// Every phase of the pipeline produces or consumes this type,
// so field access is checked at compile time instead of by
// column-name lookups on a loose table.
//
// CSV layout (header order = field order):
//   area,bedrooms,bathrooms,state,location,year_built,
//   property_type,parking,modular_kitchen,dining_hall,price
//
// Amenity flags are written as 0/1 to keep the file readable
// by spreadsheet tools.

use serde::{Deserialize, Serialize};

use crate::domain::house::{HouseFeatures, PropertyType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseRecord {
    pub area:          f64,
    pub bedrooms:      u32,
    pub bathrooms:     f64,
    pub state:         String,
    pub location:      String,
    pub year_built:    i32,
    pub property_type: PropertyType,
    #[serde(with = "flag01")]
    pub parking:         bool,
    #[serde(with = "flag01")]
    pub modular_kitchen: bool,
    #[serde(with = "flag01")]
    pub dining_hall:     bool,
    /// Absolute price in rupees
    pub price:         f64,
}

impl HouseRecord {
    /// The feature part of the row (everything except the price)
    pub fn features(&self) -> HouseFeatures {
        HouseFeatures {
            area:            self.area,
            bedrooms:        self.bedrooms,
            bathrooms:       self.bathrooms,
            location:        self.location.clone(),
            year_built:      self.year_built,
            state:           self.state.clone(),
            property_type:   self.property_type,
            parking:         self.parking,
            modular_kitchen: self.modular_kitchen,
            dining_hall:     self.dining_hall,
        }
    }
}

/// bool <-> 0/1 for CSV columns
mod flag01 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match u8::deserialize(d)? {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(serde::de::Error::custom(format!("expected 0 or 1, got {n}"))),
        }
    }
}
