// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums, and traits that define what the
// system talks about: houses, dataset rows, predictions, and
// the ways those can go wrong.
//
// Rules for this layer:
//   - NO file I/O or network calls
//   - NO model math (that's Layer 5)
//   - NO axum / clap types
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Typed error kinds for the serving path
pub mod error;

// Request-side house description and its validation
pub mod house;

// Price estimates and service responses
pub mod prediction;

// One row of the training dataset
pub mod record;

// Seams implemented by the data and ml layers
pub mod traits;
