// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal each: building the model offline, or serving it.
//
// Rules for this layer:
//   - No ML math here (that's Layer 5)
//   - No HTTP or printing here (that's Layer 1)
//   - File access only through Layer 4 loaders and Layer 6
//     stores
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// The offline clean → synthesize → train → persist workflow
pub mod pipeline_use_case;

/// The long-lived service behind the HTTP API
pub mod prediction_service;
