//! Settings file and conversion to desired facts
//!
//! The settings value is passed explicitly to every hook. Each document kind
//! gets its own ordered fact list derived from it.

pub mod format_v1;
pub mod parser;

pub use format_v1::{
    AndroidSettings, DeepLinkSettings, FrameworkSetting, IosSettings, SettingsV1, SkanSettings,
    SymbolSettings,
};
pub use parser::{parse_settings_file, parse_settings_str};

use reconx_core::reconcile::plist::{ATTRIBUTION_ENDPOINT_KEY, CONSUMABLE_HISTORY_KEY};
use reconx_core::skan;
use reconx_core::{DocumentKind, Fact, LinkMode, PlistScalar};
use std::path::Path;

/// Build setting pointing the Xcode target at its entitlements file
pub const CODE_SIGN_ENTITLEMENTS: &str = "CODE_SIGN_ENTITLEMENTS";

/// Current settings format
pub type Settings = SettingsV1;

/// Frameworks the ad SDK needs when the settings list none
pub const DEFAULT_FRAMEWORKS: &[(&str, LinkMode)] = &[
    ("AdServices.framework", LinkMode::Weak),
    ("StoreKit.framework", LinkMode::Required),
];

impl SettingsV1 {
    pub fn manifest_facts(&self) -> Vec<Fact> {
        self.deep_links
            .domains
            .iter()
            .map(|d| Fact::app_link(d.trim()))
            .collect()
    }

    pub fn entitlements_facts(&self) -> Vec<Fact> {
        self.deep_links
            .domains
            .iter()
            .map(|d| Fact::associated_domain(d.trim()))
            .collect()
    }

    /// Partner ids (or the built-in catalog) followed by the scalar settings
    ///
    /// Consumable purchase history is included unless the settings turn it off.
    pub fn info_plist_facts(&self) -> Vec<Fact> {
        let mut facts = match &self.skadnetwork.identifiers {
            Some(ids) => ids.iter().map(|id| Fact::partner_id(id.trim())).collect(),
            None => skan::catalog_facts(),
        };
        if let Some(endpoint) = &self.ios.attribution_endpoint {
            facts.push(Fact::plist_entry(
                ATTRIBUTION_ENDPOINT_KEY,
                PlistScalar::String(endpoint.trim().to_string()),
            ));
        }
        facts.push(Fact::plist_entry(
            CONSUMABLE_HISTORY_KEY,
            PlistScalar::Boolean(self.ios.include_consumable_history.unwrap_or(true)),
        ));
        facts
    }

    pub fn link_list_facts(&self) -> Vec<Fact> {
        match &self.ios.frameworks {
            Some(frameworks) => frameworks
                .iter()
                .map(|f| Fact::framework(f.name.trim(), f.link))
                .collect(),
            None => DEFAULT_FRAMEWORKS
                .iter()
                .map(|(name, mode)| Fact::framework(*name, *mode))
                .collect(),
        }
    }

    /// Build settings for the Xcode target once `entitlements` exists
    ///
    /// The path is written relative to `xcode_project` when it lies inside it.
    pub fn target_settings_facts(&self, xcode_project: &Path, entitlements: &Path) -> Vec<Fact> {
        let relative = entitlements
            .strip_prefix(xcode_project)
            .unwrap_or(entitlements);
        vec![Fact::build_setting(
            CODE_SIGN_ENTITLEMENTS,
            relative.to_string_lossy(),
        )]
    }

    pub fn facts_for(&self, kind: DocumentKind) -> Vec<Fact> {
        match kind {
            DocumentKind::AndroidManifest => self.manifest_facts(),
            DocumentKind::Entitlements => self.entitlements_facts(),
            DocumentKind::InfoPlist => self.info_plist_facts(),
            DocumentKind::LinkList => self.link_list_facts(),
        }
    }
}
