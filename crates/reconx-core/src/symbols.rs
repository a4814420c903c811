//! Compile-time define symbols per build target
//!
//! Where symbols are stored is behind the [`SymbolList`] trait. This crate
//! ships an in-memory adapter; the store crate adds one backed by a compiler
//! response file. Only single symbols owned by the tool are ever added or
//! removed; the rest of the list keeps its order.

use crate::errors::{ReconError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read/write access to the define symbols of a build target
pub trait SymbolList {
    /// Current symbols of `target`, in order; empty when none are set
    ///
    /// # Errors
    ///
    /// Backend failures, e.g. an unreadable response file.
    fn symbols(&self, target: &str) -> Result<Vec<String>>;

    /// Replace the symbols of `target`
    ///
    /// # Errors
    ///
    /// Backend failures, e.g. an unwritable response file.
    fn set_symbols(&mut self, target: &str, symbols: &[String]) -> Result<()>;
}

/// Symbols held in memory, keyed by target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemorySymbols {
    targets: BTreeMap<String, Vec<String>>,
}

impl InMemorySymbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: &str, symbols: &[&str]) -> Self {
        self.targets.insert(
            target.to_string(),
            symbols.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

impl SymbolList for InMemorySymbols {
    fn symbols(&self, target: &str) -> Result<Vec<String>> {
        Ok(self.targets.get(target).cloned().unwrap_or_default())
    }

    fn set_symbols(&mut self, target: &str, symbols: &[String]) -> Result<()> {
        self.targets.insert(target.to_string(), symbols.to_vec());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolChange {
    Added,
    Removed,
    Unchanged,
}

/// Split a `;`-separated define string, dropping blanks
pub fn split_symbols(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate_symbol(symbol: &str) -> Result<()> {
    let valid = !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ReconError::InvalidSettings {
            reason: format!("invalid define symbol {:?}", symbol),
        })
    }
}

/// Make `symbol` present in (`wanted`) or absent from `target`
///
/// Writes only when the list actually changes.
///
/// # Errors
///
/// `InvalidSettings` for a malformed symbol, or any backend error.
pub fn ensure_symbol<L: SymbolList + ?Sized>(
    list: &mut L,
    target: &str,
    symbol: &str,
    wanted: bool,
) -> Result<SymbolChange> {
    validate_symbol(symbol)?;
    let mut current = list.symbols(target)?;
    let present = current.iter().any(|s| s == symbol);

    let change = match (present, wanted) {
        (false, true) => {
            current.push(symbol.to_string());
            SymbolChange::Added
        }
        (true, false) => {
            current.retain(|s| s != symbol);
            SymbolChange::Removed
        }
        _ => return Ok(SymbolChange::Unchanged),
    };
    list.set_symbols(target, &current)?;
    tracing::debug!(target_group = target, symbol, change = ?change, "define symbol updated");
    Ok(change)
}

/// A pair of symbols expected to be defined together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolGuard {
    /// Symbol set by the third-party package itself
    pub standard: String,
    /// Symbol this tool defines when it detects the package
    pub mirror: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    Consistent,
    Neither,
    StandardOnly,
    MirrorOnly,
}

impl GuardState {
    /// Whether the state deserves a warning in the build log
    pub fn is_mismatch(&self) -> bool {
        matches!(self, GuardState::StandardOnly | GuardState::MirrorOnly)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardReport {
    pub target: String,
    pub guard: SymbolGuard,
    pub state: GuardState,
}

impl GuardReport {
    pub fn message(&self) -> String {
        let SymbolGuard { standard, mirror } = &self.guard;
        match self.state {
            GuardState::Consistent => format!("{} and {} consistent for {}", standard, mirror, self.target),
            GuardState::Neither => format!("neither {} nor {} defined for {}", standard, mirror, self.target),
            GuardState::StandardOnly => format!(
                "{} is defined but {} is not for {}",
                standard, mirror, self.target
            ),
            GuardState::MirrorOnly => format!(
                "{} is defined but {} is not for {}",
                mirror, standard, self.target
            ),
        }
    }
}

/// Compare each guard pair against the symbols of `target`
///
/// Matching is by whole symbol, so `FOO` does not satisfy `MY_FOO`.
///
/// # Errors
///
/// Backend errors from reading the symbol list.
pub fn check_symbol_guards<L: SymbolList + ?Sized>(
    list: &L,
    target: &str,
    guards: &[SymbolGuard],
) -> Result<Vec<GuardReport>> {
    let symbols = list.symbols(target)?;
    let has = |name: &str| symbols.iter().any(|s| s == name);
    Ok(guards
        .iter()
        .map(|guard| {
            let state = match (has(&guard.standard), has(&guard.mirror)) {
                (true, true) => GuardState::Consistent,
                (false, false) => GuardState::Neither,
                (true, false) => GuardState::StandardOnly,
                (false, true) => GuardState::MirrorOnly,
            };
            GuardReport {
                target: target.to_string(),
                guard: guard.clone(),
                state,
            }
        })
        .collect())
}
