//! Atomic write primitives
//!
//! Uses temp→rename so a reader never sees a half-written descriptor

use crate::errors::{io_error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Sibling temp path: `Info.plist` -> `Info.plist.reconx-tmp`
fn temp_path(target_path: &Path) -> PathBuf {
    let mut name = target_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".reconx-tmp");
    target_path.with_file_name(name)
}

/// Atomically write bytes to a file
///
/// Uses temp file + rename in the target's directory. On failure the temp file
/// is removed and the target keeps its previous content.
///
/// # Errors
///
/// `ERR_IO` when the directory, temp file or rename fails.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error("create_document_dir", e))?;
        }
    }

    let temp = temp_path(target_path);
    if let Err(e) = fs::write(&temp, content) {
        let _ = fs::remove_file(&temp);
        return Err(io_error("write_document_temp", e));
    }

    if let Err(e) = fs::rename(&temp, target_path) {
        let _ = fs::remove_file(&temp);
        return Err(io_error("rename_document_temp", e));
    }

    Ok(())
}
