// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one user-facing goal: mining a corpus, training a model, or
// scoring a product.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1); tracing is fine
//   - No direct HTTP or file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The catalog mining workflow
pub mod mine_use_case;

// The training workflow
pub mod train_use_case;

// The inference workflow
pub mod predict_use_case;
