//! Settings format v1 schema
//!
//! Defines the YAML structure read by every lifecycle hook

use reconx_core::symbols::SymbolGuard;
use reconx_core::LinkMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level settings file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsV1 {
    /// Schema version (must be 1 for this format)
    pub schema_version: u32,

    #[serde(default)]
    pub android: AndroidSettings,

    #[serde(default)]
    pub deep_links: DeepLinkSettings,

    #[serde(default)]
    pub ios: IosSettings,

    #[serde(default)]
    pub skadnetwork: SkanSettings,

    #[serde(default)]
    pub symbols: SymbolSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AndroidSettings {
    /// Expected `package` of the generated manifest
    pub package_name: Option<String>,

    /// Manifest location relative to the Android project directory
    pub manifest_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeepLinkSettings {
    /// Hosts reconciled into both the manifest and the entitlements, in order
    #[serde(default)]
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IosSettings {
    /// Compared with `CFBundleIdentifier`; a mismatch is a warning
    pub bundle_id: Option<String>,

    /// Used for the `<product>.entitlements` discovery candidate
    pub product_name: Option<String>,

    /// `NSAdvertisingAttributionReportEndpoint` value
    pub attribution_endpoint: Option<String>,

    /// `SKIncludeConsumableInAppPurchaseHistory` value; `true` when absent
    pub include_consumable_history: Option<bool>,

    /// Frameworks the target links; the SDK defaults apply when absent
    pub frameworks: Option<Vec<FrameworkSetting>>,

    /// Framework link list, relative to the project root
    pub link_list_path: Option<PathBuf>,

    /// Entitlements file, relative to the Xcode project directory
    pub entitlements_path: Option<PathBuf>,

    /// Target descriptor holding build settings, relative to the Xcode
    /// project directory
    pub target_settings_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameworkSetting {
    pub name: String,
    #[serde(default)]
    pub link: LinkMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkanSettings {
    /// Partner identifiers; the built-in catalog is used when absent
    pub identifiers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymbolSettings {
    /// Response file per build target, relative to the project root
    #[serde(default)]
    pub response_files: BTreeMap<String, PathBuf>,

    /// Symbols that must be defined for every target
    #[serde(default)]
    pub define: Vec<String>,

    /// Symbols that must not be defined for any target
    #[serde(default)]
    pub remove: Vec<String>,

    #[serde(default)]
    pub guards: Vec<SymbolGuard>,
}
