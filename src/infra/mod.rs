// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// Persistence for the training side:
//
//   weight_store.rs: The portable weights artifact
//                     Flattens every layer tensor into JSON
//                     with the architecture it belongs to, and
//                     saves TrainConfig next to it so a run can
//                     be traced back to its hyperparameters.
//
//   metrics.rs:      Training metrics logging
//                     Appends epoch,train_loss,val_loss rows to
//                     a CSV file for plotting learning curves.
//
// The mined corpus has its own writer in the data layer,
// since it is the output of the data pipeline itself.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Weights artifact and training config persistence
pub mod weight_store;

/// Training metrics CSV logger
pub mod metrics;
