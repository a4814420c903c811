//! Per-document reconciliation report and its human-readable summary

use crate::digest::short;
use crate::facts::{DocumentKind, Fact};
use reconx_core_types::RunId;
use serde::{Deserialize, Serialize};

/// What happened to a single fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FactOutcome {
    Applied,
    AlreadyPresent,
    Failed { reason: String },
}

impl FactOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            FactOutcome::Applied => "applied",
            FactOutcome::AlreadyPresent => "already present",
            FactOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactReport {
    pub fact: Fact,
    #[serde(flatten)]
    pub outcome: FactOutcome,
    /// Extra detail, e.g. a link-mode promotion or a replaced value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Outcome of reconciling one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub run_id: RunId,
    pub document: DocumentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Description of the resolved anchor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    pub facts: Vec<FactReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Serialized output differs from the input bytes
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest_before: Option<String>,
    pub digest_after: String,
    /// Set by the persistence layer once the output is on disk
    #[serde(default)]
    pub persisted: bool,
}

impl ReconciliationReport {
    pub fn applied_count(&self) -> usize {
        self.count(|o| matches!(o, FactOutcome::Applied))
    }

    pub fn already_present_count(&self) -> usize {
        self.count(|o| matches!(o, FactOutcome::AlreadyPresent))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, FactOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&FactOutcome) -> bool) -> usize {
        self.facts.iter().filter(|f| pred(&f.outcome)).count()
    }

    /// Plain-text summary, one line per fact
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let target = self.path.as_deref().unwrap_or("<memory>");
        out.push_str(&format!("{} {}\n", self.document, target));
        if let Some(anchor) = &self.anchor {
            out.push_str(&format!("  anchor: {}\n", anchor));
        }
        for report in &self.facts {
            out.push_str(&format!("  [{}] {}", report.outcome.label(), report.fact));
            if let FactOutcome::Failed { reason } = &report.outcome {
                out.push_str(&format!(": {}", reason));
            }
            if let Some(note) = &report.note {
                out.push_str(&format!(" ({})", note));
            }
            out.push('\n');
        }
        for warning in &self.warnings {
            out.push_str(&format!("  warning: {}\n", warning));
        }
        let state = match (self.changed, self.persisted) {
            (false, _) => "unchanged",
            (true, true) => "written",
            (true, false) => "changed, not written",
        };
        out.push_str(&format!(
            "  applied {}, already present {}, failed {}; {} ({})\n",
            self.applied_count(),
            self.already_present_count(),
            self.failed_count(),
            state,
            short(&self.digest_after),
        ));
        out
    }
}
