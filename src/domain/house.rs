// ============================================================
// Layer 3 — House Feature Types
// ============================================================
// Two representations of the same house:
//
//   HouseFeaturesInput — exactly what arrives in a JSON body.
//                        Loosely typed: property_type is a raw
//                        string, flags may be 0/1 or true/false.
//
//   HouseFeatures      — the validated, normalised form.
//                        Only reachable through validate(), so
//                        every HouseFeatures value satisfies the
//                        range constraints below.
//
// Constraints:
//   area        (0, 100000]
//   bedrooms    [0, 20]
//   bathrooms   [0, 20]
//   year_built  [1800, 2030]
//   location / state non-empty after normalisation
//
// String fields are trimmed and title-cased before they are
// used as categorical keys, so " mumbai " and "MUMBAI" both
// become "Mumbai".
//
// Reference: Rust Book §5 (Structs), §6 (Enums)
//            serde documentation (custom deserialisers)

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::error::ValidationError;

pub const MAX_AREA:      f64 = 100_000.0;
pub const MAX_BEDROOMS:  i64 = 20;
pub const MAX_BATHROOMS: f64 = 20.0;
pub const MIN_YEAR:      i64 = 1800;
pub const MAX_YEAR:      i64 = 2030;

// ─── PropertyType ─────────────────────────────────────────────────────────────
/// The three property categories the model was trained on.
/// Serialised with the human labels used in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "Apartment")]
    Apartment,
    #[serde(rename = "Independent House")]
    IndependentHouse,
    #[serde(rename = "Villa")]
    Villa,
}

impl PropertyType {
    pub const ALL: [PropertyType; 3] = [
        PropertyType::Apartment,
        PropertyType::IndependentHouse,
        PropertyType::Villa,
    ];

    /// Label used as the categorical key in encoders and the dataset
    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::Apartment        => "Apartment",
            PropertyType::IndependentHouse => "Independent House",
            PropertyType::Villa            => "Villa",
        }
    }

    /// Parse a raw label after normalisation.
    /// Accepts "independent house", " VILLA ", "IndependentHouse", ...
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_label(raw).as_str() {
            "Apartment"                             => Some(PropertyType::Apartment),
            "Independent House" | "Independenthouse" => Some(PropertyType::IndependentHouse),
            "Villa"                                 => Some(PropertyType::Villa),
            _                                       => None,
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Normalisation ────────────────────────────────────────────────────────────
/// Trim surrounding whitespace and title-case every word.
///
/// A letter is upper-cased when it follows a non-letter (or starts
/// the string) and lower-cased otherwise, so "uttar  PRADESH" becomes
/// "Uttar  Pradesh" and "navi-mumbai" becomes "Navi-Mumbai".
pub fn normalize_label(raw: &str) -> String {
    let mut out        = String::with_capacity(raw.len());
    let mut prev_alpha = false;

    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}

// ─── HouseFeaturesInput ───────────────────────────────────────────────────────
/// Raw request body for POST /predict.
#[derive(Debug, Clone, Deserialize)]
pub struct HouseFeaturesInput {
    pub area:          f64,
    pub bedrooms:      i64,
    pub bathrooms:     f64,
    pub location:      String,
    pub year_built:    i64,
    pub state:         String,
    pub property_type: String,

    // Optional amenities default to "absent"
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub parking:         bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub modular_kitchen: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub dining_hall:     bool,
}

/// Accepts `true`/`false` as well as the `0`/`1` integers the
/// frontend and the dataset use.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0)  => Ok(false),
        Flag::Int(1)  => Ok(true),
        Flag::Int(n)  => Err(serde::de::Error::custom(format!(
            "expected 0 or 1, got {n}"
        ))),
    }
}

impl HouseFeaturesInput {
    /// Check every constraint and produce the normalised form.
    /// Returns the first violated constraint.
    pub fn validate(self) -> Result<HouseFeatures, ValidationError> {
        if !self.area.is_finite() || self.area <= 0.0 {
            return Err(ValidationError::new("area", "must be greater than 0"));
        }
        if self.area > MAX_AREA {
            return Err(ValidationError::new("area", "exceeds limit (100k sqft)"));
        }
        if !(0..=MAX_BEDROOMS).contains(&self.bedrooms) {
            return Err(ValidationError::new(
                "bedrooms",
                format!("must be between 0 and {MAX_BEDROOMS}"),
            ));
        }
        if !self.bathrooms.is_finite() || !(0.0..=MAX_BATHROOMS).contains(&self.bathrooms) {
            return Err(ValidationError::new(
                "bathrooms",
                format!("must be between 0 and {MAX_BATHROOMS}"),
            ));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year_built) {
            return Err(ValidationError::new(
                "year_built",
                format!("must be between {MIN_YEAR} and {MAX_YEAR}"),
            ));
        }

        let location = normalize_label(&self.location);
        if location.is_empty() {
            return Err(ValidationError::new("location", "must not be empty"));
        }

        let state = normalize_label(&self.state);
        if state.is_empty() {
            return Err(ValidationError::new("state", "must not be empty"));
        }

        let property_type = PropertyType::parse(&self.property_type).ok_or_else(|| {
            ValidationError::new(
                "property_type",
                "must be one of Apartment, Independent House, Villa",
            )
        })?;

        Ok(HouseFeatures {
            area:            self.area,
            bedrooms:        self.bedrooms as u32,
            bathrooms:       self.bathrooms,
            location,
            year_built:      self.year_built as i32,
            state,
            property_type,
            parking:         self.parking,
            modular_kitchen: self.modular_kitchen,
            dining_hall:     self.dining_hall,
        })
    }
}

// ─── HouseFeatures ────────────────────────────────────────────────────────────
/// A validated house description, ready for preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseFeatures {
    pub area:            f64,
    pub bedrooms:        u32,
    pub bathrooms:       f64,
    pub location:        String,
    pub year_built:      i32,
    pub state:           String,
    pub property_type:   PropertyType,
    pub parking:         bool,
    pub modular_kitchen: bool,
    pub dining_hall:     bool,
}

impl TryFrom<HouseFeaturesInput> for HouseFeatures {
    type Error = ValidationError;

    fn try_from(input: HouseFeaturesInput) -> Result<Self, Self::Error> {
        input.validate()
    }
}
