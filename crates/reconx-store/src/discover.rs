//! Where each document lives inside a generated project

use crate::settings::Settings;
use std::path::{Path, PathBuf};

/// Manifest location inside a generated Gradle module
pub const DEFAULT_MANIFEST_PATH: &str = "src/main/AndroidManifest.xml";

pub const INFO_PLIST_FILE: &str = "Info.plist";

/// Link list location under the project root
pub const DEFAULT_LINK_LIST_PATH: &str = "ProjectSettings/reconx-frameworks.json";

/// Xcode target descriptor carrying build settings
pub const DEFAULT_TARGET_SETTINGS_FILE: &str = "reconx-target.json";

/// Entitlements file created when no candidate exists
pub const DEFAULT_ENTITLEMENTS_FILE: &str = "Entitlements.entitlements";

const UNITY_ENTITLEMENTS_FILE: &str = "Unity-iPhone.entitlements";

fn resolve(base: &Path, configured: Option<&PathBuf>, default: &str) -> PathBuf {
    match configured {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => base.join(path),
        None => base.join(default),
    }
}

pub fn manifest_path(settings: &Settings, android_project: &Path) -> PathBuf {
    resolve(
        android_project,
        settings.android.manifest_path.as_ref(),
        DEFAULT_MANIFEST_PATH,
    )
}

pub fn info_plist_path(xcode_project: &Path) -> PathBuf {
    xcode_project.join(INFO_PLIST_FILE)
}

pub fn link_list_path(settings: &Settings, project_root: &Path) -> PathBuf {
    resolve(
        project_root,
        settings.ios.link_list_path.as_ref(),
        DEFAULT_LINK_LIST_PATH,
    )
}

pub fn target_settings_path(settings: &Settings, xcode_project: &Path) -> PathBuf {
    resolve(
        xcode_project,
        settings.ios.target_settings_path.as_ref(),
        DEFAULT_TARGET_SETTINGS_FILE,
    )
}

/// Ordered entitlements candidates in `xcode_project`
pub fn entitlements_candidates(xcode_project: &Path, product_name: Option<&str>) -> Vec<PathBuf> {
    let mut candidates = vec![
        xcode_project.join(DEFAULT_ENTITLEMENTS_FILE),
        xcode_project.join(UNITY_ENTITLEMENTS_FILE),
    ];
    if let Some(product) = product_name {
        candidates.push(xcode_project.join(format!("{}.entitlements", product)));
    }
    candidates
}

/// First existing entitlements file, or where a new one should be created
///
/// An explicit `ios.entitlements_path` wins over discovery.
pub fn entitlements_path(settings: &Settings, xcode_project: &Path) -> PathBuf {
    if let Some(configured) = &settings.ios.entitlements_path {
        return resolve(xcode_project, Some(configured), DEFAULT_ENTITLEMENTS_FILE);
    }
    entitlements_candidates(xcode_project, settings.ios.product_name.as_deref())
        .into_iter()
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| xcode_project.join(DEFAULT_ENTITLEMENTS_FILE))
}
