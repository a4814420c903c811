//! ReconX Core - in-memory reconciliation engine
//!
//! This crate holds everything that does not touch the filesystem:
//! - Document models for manifests, plists and framework link lists
//! - Anchor location, fact matching and patch building
//! - The generic match-then-append primitive
//! - The reconciliation driver and its reports
//! - SKAdNetwork catalog validation and the define-symbol capability
//!
//! Loading from and persisting to disk lives in `reconx-store`.

pub mod digest;
pub mod errors;
pub mod facts;
pub mod locate;
pub mod logging_facility;
pub mod matcher;
pub mod merge;
pub mod model;
pub mod patch;
pub mod reconcile;
pub mod report;
pub mod skan;
pub mod symbols;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, ReconError, Result};
pub use facts::{DocumentKind, Fact, LinkMode, PlistScalar};
pub use reconcile::{reconcile_bytes, reconcile_document, Descriptor, ReconcileOptions, Reconciled};
pub use report::{FactOutcome, FactReport, ReconciliationReport};
pub use symbols::{InMemorySymbols, SymbolList};
