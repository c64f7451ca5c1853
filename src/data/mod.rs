// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw files on disk to model-ready vectors.
//
// The offline pipeline flows in this order:
//
//   raw CSV + districts JSON
//       │
//       ▼
//   loader        → reads raw listings and district lists
//       │
//       ▼
//   cleaner       → canonical HouseRecord rows (phase 1)
//       │
//       ▼
//   synthesizer   → extra rows for under-covered regions (phase 2)
//       │
//       ▼
//   dataset       → combined CSV + state→cities lookup (phase 3)
//       │
//       ▼
//   splitter      → seeded 80/20 train/test split
//
// At serving time only `preprocessor` is used: it maps one
// validated house to the encoded, scaled vector the model expects.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Raw CSV and district JSON readers
pub mod loader;

/// Phase 1: raw listings → HouseRecord
pub mod cleaner;

/// Phase 2: synthetic records for sparse regions
pub mod synthesizer;

/// Phase 3: combined dataset persistence and location lookup
pub mod dataset;

/// Seeded train/test split
pub mod splitter;

/// Inference-time feature encoding + scaling
pub mod preprocessor;

/// Weighted choice and normal draws
pub mod sampling;
