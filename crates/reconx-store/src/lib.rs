//! ReconX Store - filesystem boundary for the reconciliation engine
//!
//! Provides:
//! - Settings format v1 parser and fact conversion
//! - Document discovery inside generated projects
//! - Atomic persistence of reconciled documents
//! - Response-file backed define symbols
//! - Lifecycle hooks combining the above

pub mod atomic;
pub mod discover;
pub mod errors;
pub mod hooks;
pub mod pipeline;
pub mod rsp_symbols;
pub mod settings;

// Re-export key types
pub use errors::Result;
pub use hooks::{Hook, HookReport};
pub use pipeline::{reconcile_file, DocumentResult, DocumentStatus};
pub use settings::Settings;
