//! Define symbols kept in compiler response files
//!
//! Each target maps to one response file. Symbols come from `-define:A;B`
//! lines; every other line is kept as is.

use crate::atomic::atomic_write;
use reconx_core::errors::{ReconError, Result};
use reconx_core::symbols::{split_symbols, SymbolList};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DEFINE_PREFIX: &str = "-define:";

#[derive(Debug, Clone, Default)]
pub struct ResponseFileSymbols {
    files: BTreeMap<String, PathBuf>,
}

impl ResponseFileSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(target.into(), path.into());
        self
    }

    /// Response files from settings, resolved against `project_root`
    pub fn from_settings(files: &BTreeMap<String, PathBuf>, project_root: &Path) -> Self {
        let files = files
            .iter()
            .map(|(target, path)| (target.clone(), project_root.join(path)))
            .collect();
        Self { files }
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    fn path(&self, target: &str) -> Result<&Path> {
        self.files
            .get(target)
            .map(PathBuf::as_path)
            .ok_or_else(|| ReconError::InvalidSettings {
                reason: format!("no response file configured for target {}", target),
            })
    }

    fn read_lines(path: &Path) -> Result<Vec<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(ReconError::Load {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

fn define_body(line: &str) -> Option<&str> {
    line.trim().strip_prefix(DEFINE_PREFIX)
}

impl SymbolList for ResponseFileSymbols {
    fn symbols(&self, target: &str) -> Result<Vec<String>> {
        let lines = Self::read_lines(self.path(target)?)?;
        Ok(lines
            .iter()
            .filter_map(|line| define_body(line))
            .flat_map(split_symbols)
            .collect())
    }

    /// Rewrites the first define line in place and drops any later ones
    fn set_symbols(&mut self, target: &str, symbols: &[String]) -> Result<()> {
        let path = self.path(target)?;
        let lines = Self::read_lines(path)?;

        let define_line = (!symbols.is_empty())
            .then(|| format!("{}{}", DEFINE_PREFIX, symbols.join(";")));
        let mut pending = define_line;
        let mut out: Vec<String> = Vec::with_capacity(lines.len() + 1);
        for line in lines {
            if define_body(&line).is_some() {
                if let Some(define) = pending.take() {
                    out.push(define);
                }
            } else {
                out.push(line);
            }
        }
        if let Some(define) = pending {
            out.push(define);
        }

        let mut content = out.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        atomic_write(path, content.as_bytes()).map_err(|e| ReconError::Persist {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconx_core::symbols::{ensure_symbol, SymbolChange};
    use tempfile::TempDir;

    fn adapter(dir: &TempDir) -> ResponseFileSymbols {
        ResponseFileSymbols::new().with_target("Android", dir.path().join("csc.rsp"))
    }

    #[test]
    fn test_reads_all_define_lines() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("csc.rsp"),
            "-nowarn:0618\n-define:A;B\n-define:C\n",
        )
        .unwrap();
        assert_eq!(adapter(&dir).symbols("Android").unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_missing_file_means_no_symbols() {
        let dir = TempDir::new().unwrap();
        assert!(adapter(&dir).symbols("Android").unwrap().is_empty());
    }

    #[test]
    fn test_set_keeps_other_lines_and_position() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("csc.rsp");
        fs::write(&path, "-nowarn:0618\n-define:A\n-unsafe\n-define:B\n").unwrap();

        let mut list = adapter(&dir);
        let change = ensure_symbol(&mut list, "Android", "RECONX_ADS", true).unwrap();

        assert_eq!(change, SymbolChange::Added);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "-nowarn:0618\n-define:A;B;RECONX_ADS\n-unsafe\n"
        );
    }

    #[test]
    fn test_removing_last_symbol_drops_define_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("csc.rsp");
        fs::write(&path, "-define:RECONX_ADS\n").unwrap();

        let mut list = adapter(&dir);
        ensure_symbol(&mut list, "Android", "RECONX_ADS", false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_unknown_target_is_a_settings_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            adapter(&dir).symbols("iOS"),
            Err(ReconError::InvalidSettings { .. })
        ));
    }
}
