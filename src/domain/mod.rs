// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define what the
// system works with: catalog products, categories, grades,
// feature vectors and training examples.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O or network calls
//   - Only data, invariants and the traits other layers implement
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The single authoritative category list and its index mapping
pub mod category;

// Mined corpus with provenance and distributions
pub mod corpus;

// Encoder inputs, feature vectors and labeled examples
pub mod example;

// Tolerant serde helpers for crowd-sourced fields
pub mod lenient;

// Raw catalog records, canonical products, grades
pub mod product;

// Core abstractions (traits) that other layers implement
pub mod traits;
