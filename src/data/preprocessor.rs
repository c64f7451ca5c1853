// ============================================================
// Layer 4 — Feature Preprocessor
// ============================================================
// Turns one HouseFeatures value into the numeric vector the
// model was trained on.
//
// Steps (applied in order):
//   1. View the house as a single row with canonical column
//      names ("area", "state", ...)
//   2. Label-encode categorical columns; unseen labels fall
//      back to the encoder's first class instead of failing
//   3. Read the columns out in exactly the persisted feature
//      order (the model is position-sensitive)
//   4. Standardise with the fitted scaler
//
// The same encode step is used on training rows, so training
// and serving can never disagree on column order or encoding.
//
// Errors here are structural (a feature name the row does not
// know, a categorical column with no encoder) and indicate
// mismatched artifacts, not bad user input.

use serde::{Deserialize, Serialize};

use crate::domain::error::PreprocessingError;
use crate::domain::house::HouseFeatures;
use crate::ml::encoder::EncoderSet;
use crate::ml::scaler::StandardScaler;

pub const NUMERIC_COLUMNS: [&str; 7] = [
    "area",
    "bedrooms",
    "bathrooms",
    "year_built",
    "parking",
    "modular_kitchen",
    "dining_hall",
];

pub const CATEGORICAL_COLUMNS: [&str; 3] = ["state", "location", "property_type"];

/// Column order used when training: numeric first, then categorical.
pub fn default_feature_order() -> Vec<String> {
    NUMERIC_COLUMNS
        .iter()
        .chain(CATEGORICAL_COLUMNS.iter())
        .map(|c| c.to_string())
        .collect()
}

// ─── Single-row view ──────────────────────────────────────────────────────────
/// A value in one column of the row
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell<'a> {
    Number(f64),
    Label(&'a str),
}

/// Canonical column-name view over a HouseFeatures value.
struct FeatureRow<'a>(&'a HouseFeatures);

impl<'a> FeatureRow<'a> {
    fn cell(&self, column: &str) -> Option<Cell<'a>> {
        let f = self.0;
        let flag = |b: bool| Cell::Number(if b { 1.0 } else { 0.0 });

        Some(match column {
            "area"            => Cell::Number(f.area),
            "bedrooms"        => Cell::Number(f64::from(f.bedrooms)),
            "bathrooms"       => Cell::Number(f.bathrooms),
            "year_built"      => Cell::Number(f64::from(f.year_built)),
            "parking"         => flag(f.parking),
            "modular_kitchen" => flag(f.modular_kitchen),
            "dining_hall"     => flag(f.dining_hall),
            "state"           => Cell::Label(&f.state),
            "location"        => Cell::Label(&f.location),
            "property_type"   => Cell::Label(f.property_type.label()),
            _                 => return None,
        })
    }
}

/// Encode a row into `feature_order` positions without scaling.
pub fn encode_features(
    features:      &HouseFeatures,
    encoders:      &EncoderSet,
    feature_order: &[String],
) -> Result<Vec<f64>, PreprocessingError> {
    let row = FeatureRow(features);

    feature_order
        .iter()
        .map(|column| match row.cell(column) {
            Some(Cell::Number(v))     => Ok(v),
            Some(Cell::Label(label))  => encoders.encode(column, label).map(|i| i as f64),
            None                      => Err(PreprocessingError::MissingColumn(column.clone())),
        })
        .collect()
}

// ─── Preprocessor ─────────────────────────────────────────────────────────────
/// Fitted encoders + scaler + feature order, applied together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    encoders:      EncoderSet,
    scaler:        StandardScaler,
    feature_order: Vec<String>,
}

impl Preprocessor {
    pub fn new(encoders: EncoderSet, scaler: StandardScaler, feature_order: Vec<String>) -> Self {
        Self { encoders, scaler, feature_order }
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    /// Map a validated house to a model-ready vector.
    pub fn transform(&self, features: &HouseFeatures) -> Result<Vec<f64>, PreprocessingError> {
        let encoded = encode_features(features, &self.encoders, &self.feature_order)?;
        self.scaler.transform(&encoded)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::house::PropertyType;
    use crate::ml::encoder::LabelEncoder;

    fn house(location: &str) -> HouseFeatures {
        HouseFeatures {
            area:            2000.0,
            bedrooms:        3,
            bathrooms:       2.0,
            location:        location.into(),
            year_built:      2018,
            state:           "Uttar Pradesh".into(),
            property_type:   PropertyType::IndependentHouse,
            parking:         true,
            modular_kitchen: false,
            dining_hall:     false,
        }
    }

    fn encoders() -> EncoderSet {
        let mut set = EncoderSet::new();
        set.insert("state", LabelEncoder::fit(["Uttar Pradesh", "Maharashtra"]));
        set.insert("location", LabelEncoder::fit(["Varanasi", "Agra", "Pune"]));
        set.insert("property_type", LabelEncoder::fit(PropertyType::ALL.iter().map(|p| p.label())));
        set
    }

    fn identity_preprocessor(order: Vec<String>) -> Preprocessor {
        let n = order.len();
        Preprocessor::new(
            encoders(),
            StandardScaler::from_parts(vec![0.0; n], vec![1.0; n]),
            order,
        )
    }

    #[test]
    fn test_default_order_numeric_then_categorical() {
        let order = default_feature_order();
        assert_eq!(order.len(), 10);
        assert_eq!(order[0], "area");
        assert_eq!(order[9], "property_type");
    }

    #[test]
    fn test_encodes_in_feature_order() {
        let p = identity_preprocessor(default_feature_order());
        let v = p.transform(&house("Varanasi")).unwrap();
        // area, bedrooms, bathrooms, year, parking, kitchen, dining, state, location, type
        assert_eq!(v, vec![2000.0, 3.0, 2.0, 2018.0, 1.0, 0.0, 0.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_reorders_to_persisted_order() {
        let order = vec!["location".to_string(), "area".to_string()];
        let p     = identity_preprocessor(order);
        assert_eq!(p.transform(&house("Pune")).unwrap(), vec![1.0, 2000.0]);
    }

    #[test]
    fn test_unseen_location_uses_fallback() {
        let p       = identity_preprocessor(default_feature_order());
        let unseen  = p.transform(&house("Atlantis")).unwrap();
        let first   = p.transform(&house("Agra")).unwrap();
        assert_eq!(unseen, first);
    }

    #[test]
    fn test_unknown_column_is_structural_error() {
        let p   = identity_preprocessor(vec!["area".into(), "garden_size".into()]);
        let err = p.transform(&house("Pune")).unwrap_err();
        assert_eq!(err, PreprocessingError::MissingColumn("garden_size".into()));
    }

    #[test]
    fn test_scaler_is_applied() {
        let p = Preprocessor::new(
            encoders(),
            StandardScaler::from_parts(vec![1000.0], vec![500.0]),
            vec!["area".into()],
        );
        assert_eq!(p.transform(&house("Pune")).unwrap(), vec![2.0]);
    }
}
