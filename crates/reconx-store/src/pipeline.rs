//! Load, reconcile and persist one document on disk
//!
//! Persisting is the last step and only happens when the serialized output
//! differs from what was read. Any failure before that leaves the file
//! byte-identical.

use crate::atomic::atomic_write;
use crate::errors::{io_error, persist_error, Result};
use reconx_core::errors::ExError;
use reconx_core::{
    log_op_end, log_op_error, log_op_start, reconcile_document, DocumentKind, Fact,
    ReconcileOptions, ReconciliationReport,
};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of one document within a hook run
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub document: DocumentKind,
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: DocumentStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    Reconciled { report: ReconciliationReport },
    Skipped { reason: String },
    Failed { code: String, message: String },
}

impl DocumentResult {
    pub fn reconciled(document: DocumentKind, path: PathBuf, report: ReconciliationReport) -> Self {
        Self {
            document,
            path,
            status: DocumentStatus::Reconciled { report },
        }
    }

    pub fn skipped(document: DocumentKind, path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            document,
            path,
            status: DocumentStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn failed(document: DocumentKind, path: PathBuf, err: &ExError) -> Self {
        Self {
            document,
            path,
            status: DocumentStatus::Failed {
                code: err.code().to_string(),
                message: err.to_string(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, DocumentStatus::Failed { .. })
    }

    pub fn report(&self) -> Option<&ReconciliationReport> {
        match &self.status {
            DocumentStatus::Reconciled { report } => Some(report),
            _ => None,
        }
    }

    /// Human-readable block for the build log
    pub fn summary(&self) -> String {
        match &self.status {
            DocumentStatus::Reconciled { report } => report.summary(),
            DocumentStatus::Skipped { reason } => format!(
                "{} {}: skipped, {}",
                self.document,
                self.path.display(),
                reason
            ),
            DocumentStatus::Failed { message, .. } => format!(
                "{} {}: FAILED {}",
                self.document,
                self.path.display(),
                message
            ),
        }
    }
}

fn read_existing(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error("read_document", e).with_path(path.display().to_string())),
    }
}

/// Reconcile `facts` into the document at `path`
///
/// # Errors
///
/// Fatal document errors from the engine, read failures, and
/// `ERR_PERSISTENCE` when the atomic write fails.
pub fn reconcile_file(
    kind: DocumentKind,
    path: &Path,
    facts: &[Fact],
    options: &ReconcileOptions,
) -> Result<ReconciliationReport> {
    let path_text = path.display().to_string();
    log_op_start!(
        "reconcile_file",
        document_kind = kind.as_str(),
        path = path_text.as_str()
    );
    let start = Instant::now();

    let result = reconcile_file_impl(kind, path, facts, options).map_err(|e| {
        log_op_error!(
            "reconcile_file",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            document_kind = kind.as_str(),
            path = path_text.as_str()
        );
        e
    })?;

    log_op_end!(
        "reconcile_file",
        duration_ms = start.elapsed().as_millis() as u64,
        document_kind = kind.as_str(),
        path = path_text.as_str(),
        persisted = result.persisted
    );

    Ok(result)
}

fn reconcile_file_impl(
    kind: DocumentKind,
    path: &Path,
    facts: &[Fact],
    options: &ReconcileOptions,
) -> Result<ReconciliationReport> {
    let path_text = path.display().to_string();
    let input = read_existing(path)?;
    let options = options.clone().with_path(path_text.clone());

    let reconciled = reconcile_document(kind, input.as_deref(), facts, &options).map_err(|e| {
        ExError::from(e)
            .with_path(path_text.clone())
            .with_run_id(options.run_id.clone())
    })?;

    let mut report = reconciled.report;
    if report.changed {
        atomic_write(path, &reconciled.output).map_err(|e| persist_error(kind, path, e))?;
        report.persisted = true;
    }
    Ok(report)
}

/// [`reconcile_file`] folded into a per-document result
pub fn reconcile_to_result(
    kind: DocumentKind,
    path: &Path,
    facts: &[Fact],
    options: &ReconcileOptions,
) -> DocumentResult {
    if facts.is_empty() {
        return DocumentResult::skipped(kind, path.to_path_buf(), "no facts configured");
    }
    match reconcile_file(kind, path, facts, options) {
        Ok(report) => DocumentResult::reconciled(kind, path.to_path_buf(), report),
        Err(err) => DocumentResult::failed(kind, path.to_path_buf(), &err),
    }
}
