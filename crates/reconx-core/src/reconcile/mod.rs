//! Reconciliation driver
//!
//! Every document kind goes through the same sequence:
//!
//! ```text
//! Loaded -> AnchorResolved -> (FactApplied)* -> Serialized
//! ```
//!
//! Load, anchor and serialize failures abort the document. A fact that
//! cannot be applied is reported as failed and the remaining facts still
//! run. Persisting the output is left to the caller so this crate stays free
//! of filesystem access.

pub mod frameworks;
pub mod manifest;
pub mod plist;

pub use frameworks::LinkListDescriptor;
pub use manifest::ManifestDescriptor;
pub use plist::{EntitlementsDescriptor, InfoPlistDescriptor};

use crate::digest::content_digest;
use crate::errors::{ReconError, Result};
use crate::facts::{DocumentKind, Fact, LinkMode};
use crate::merge::Merge;
use crate::report::{FactOutcome, FactReport, ReconciliationReport};
use crate::{log_op_end, log_op_error, log_op_start};
use reconx_core_types::RunId;
use std::time::Instant;

/// How a single fact changed the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// An equivalent entry already existed
    Unchanged,
    /// A new entry was appended
    Appended,
    /// An existing framework entry was relinked in place
    Promoted { from: LinkMode, to: LinkMode },
    /// A tool-owned scalar was overwritten in place
    Replaced { previous: String },
}

impl From<Merge> for Change {
    fn from(merge: Merge) -> Self {
        match merge {
            Merge::AlreadyPresent => Change::Unchanged,
            Merge::Appended => Change::Appended,
        }
    }
}

impl Change {
    fn into_outcome(self) -> (FactOutcome, Option<String>) {
        match self {
            Change::Unchanged => (FactOutcome::AlreadyPresent, None),
            Change::Appended => (FactOutcome::Applied, None),
            Change::Promoted { from, to } => (
                FactOutcome::Applied,
                Some(format!("promoted {} -> {}", from.as_str(), to.as_str())),
            ),
            Change::Replaced { previous } => {
                (FactOutcome::Applied, Some(format!("replaced {}", previous)))
            }
        }
    }
}

/// A document kind the driver can reconcile
pub trait Descriptor: Sized {
    /// Insertion point resolved once per document
    type Anchor;

    const KIND: DocumentKind;

    /// # Errors
    ///
    /// `ReconError::Parse` for malformed input.
    fn parse(input: &[u8]) -> Result<Self>;

    /// Starting document when the file does not exist yet; `None` when the
    /// kind cannot be created from scratch
    fn empty() -> Option<Self> {
        None
    }

    /// # Errors
    ///
    /// `ReconError::AnchorNotFound` when no element satisfies the predicate.
    fn locate_anchor(&self) -> Result<Self::Anchor>;

    fn describe_anchor(&self, _anchor: &Self::Anchor) -> Option<String> {
        None
    }

    /// Non-fatal observations about the loaded document
    fn inspect(&self, _options: &ReconcileOptions) -> Vec<String> {
        Vec::new()
    }

    /// Match-then-patch a fact already known to apply to this kind
    ///
    /// # Errors
    ///
    /// `ReconError::FactApplication` when a structural invariant blocks the
    /// fact; the driver records it and moves on.
    fn apply_fact(&mut self, anchor: &Self::Anchor, fact: &Fact) -> Result<Change>;

    /// # Errors
    ///
    /// `ReconError::Serialize` when the document cannot be written out.
    fn serialize(&self) -> Result<Vec<u8>>;
}

/// Per-call context threaded into the driver
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub run_id: RunId,
    /// Where the document lives; carried into reports and errors
    pub path: Option<String>,
    /// Package name from the settings, checked against the manifest
    pub expected_package: Option<String>,
    /// Bundle identifier from the settings, checked against Info.plist
    pub expected_bundle_id: Option<String>,
}

impl ReconcileOptions {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_expected_package(mut self, package: impl Into<String>) -> Self {
        self.expected_package = Some(package.into());
        self
    }

    pub fn with_expected_bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.expected_bundle_id = Some(bundle_id.into());
        self
    }
}

/// Report plus the serialized document
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub report: ReconciliationReport,
    pub output: Vec<u8>,
}

/// Reconcile `facts` into the document `input`
///
/// `input` is `None` when the document does not exist yet; only kinds with
/// an [`Descriptor::empty`] starting point accept that.
///
/// # Errors
///
/// Load, parse, anchor and serialize failures. Per-fact failures are
/// reported inside the returned report instead.
pub fn reconcile_bytes<D: Descriptor>(
    input: Option<&[u8]>,
    facts: &[Fact],
    options: &ReconcileOptions,
) -> Result<Reconciled> {
    log_op_start!(
        "reconcile_document",
        document_kind = D::KIND.as_str(),
        run_id = options.run_id.as_str(),
        fact_count = facts.len()
    );
    let start = Instant::now();

    let result = reconcile_bytes_impl::<D>(input, facts, options).map_err(|e| {
        log_op_error!(
            "reconcile_document",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            document_kind = D::KIND.as_str()
        );
        e
    })?;

    log_op_end!(
        "reconcile_document",
        duration_ms = start.elapsed().as_millis() as u64,
        document_kind = D::KIND.as_str(),
        applied = result.report.applied_count(),
        already_present = result.report.already_present_count(),
        failed = result.report.failed_count(),
        changed = result.report.changed
    );

    Ok(result)
}

fn reconcile_bytes_impl<D: Descriptor>(
    input: Option<&[u8]>,
    facts: &[Fact],
    options: &ReconcileOptions,
) -> Result<Reconciled> {
    let mut doc = match input {
        Some(bytes) => D::parse(bytes)?,
        None => D::empty().ok_or_else(|| ReconError::Load {
            path: options
                .path
                .clone()
                .unwrap_or_else(|| D::KIND.to_string()),
            reason: "document does not exist".to_string(),
        })?,
    };

    let anchor = doc.locate_anchor()?;
    let warnings = doc.inspect(options);
    for warning in &warnings {
        tracing::warn!(document_kind = D::KIND.as_str(), "{}", warning);
    }

    let mut reports = Vec::with_capacity(facts.len());
    for fact in facts {
        let applied = validate_fact(D::KIND, fact).and_then(|()| doc.apply_fact(&anchor, fact));
        let (outcome, note) = match applied {
            Ok(change) => change.into_outcome(),
            Err(err) => (
                FactOutcome::Failed {
                    reason: failure_reason(err),
                },
                None,
            ),
        };
        tracing::debug!(
            document_kind = D::KIND.as_str(),
            fact = %fact,
            outcome = outcome.label(),
            "fact reconciled"
        );
        reports.push(FactReport {
            fact: fact.clone(),
            outcome,
            note,
        });
    }

    let output = doc.serialize()?;
    let report = ReconciliationReport {
        run_id: options.run_id.clone(),
        document: D::KIND,
        path: options.path.clone(),
        anchor: doc.describe_anchor(&anchor),
        facts: reports,
        warnings,
        changed: input != Some(output.as_slice()),
        digest_before: input.map(content_digest),
        digest_after: content_digest(&output),
        persisted: false,
    };
    Ok(Reconciled { report, output })
}

/// Reject facts that can never apply to a document of `kind`
fn validate_fact(kind: DocumentKind, fact: &Fact) -> Result<()> {
    if !fact.applies_to(kind) {
        return Err(ReconError::fact(
            fact,
            format!("not applicable to {} documents", kind),
        ));
    }
    if fact.primary_value().trim().is_empty() {
        return Err(ReconError::fact(fact, "empty value"));
    }
    Ok(())
}

fn failure_reason(err: ReconError) -> String {
    match err {
        ReconError::FactApplication { reason, .. } => reason,
        other => other.to_string(),
    }
}

/// Reconcile into a document of a kind chosen at runtime
///
/// # Errors
///
/// See [`reconcile_bytes`].
pub fn reconcile_document(
    kind: DocumentKind,
    input: Option<&[u8]>,
    facts: &[Fact],
    options: &ReconcileOptions,
) -> Result<Reconciled> {
    match kind {
        DocumentKind::AndroidManifest => {
            reconcile_bytes::<ManifestDescriptor>(input, facts, options)
        }
        DocumentKind::Entitlements => {
            reconcile_bytes::<EntitlementsDescriptor>(input, facts, options)
        }
        DocumentKind::InfoPlist => reconcile_bytes::<InfoPlistDescriptor>(input, facts, options),
        DocumentKind::LinkList => reconcile_bytes::<LinkListDescriptor>(input, facts, options),
    }
}
