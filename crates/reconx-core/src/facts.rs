//! Desired facts and the document kinds they are reconciled into

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of generated descriptor this engine knows how to reconcile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// `AndroidManifest.xml` of a generated Gradle project
    AndroidManifest,
    /// Code-signing entitlements plist
    Entitlements,
    /// Application `Info.plist`
    InfoPlist,
    /// JSON framework link list of the generated Xcode target
    LinkList,
}

impl DocumentKind {
    /// Stable snake_case label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::AndroidManifest => "android_manifest",
            DocumentKind::Entitlements => "entitlements",
            DocumentKind::InfoPlist => "info_plist",
            DocumentKind::LinkList => "link_list",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a framework is linked into the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    #[default]
    Required,
    Weak,
}

impl LinkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkMode::Required => "required",
            LinkMode::Weak => "weak",
        }
    }

    /// Parse the on-disk spelling; anything unknown is `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "required" => Some(LinkMode::Required),
            "weak" => Some(LinkMode::Weak),
            _ => None,
        }
    }

    /// Whether an existing entry in `self` mode must be replaced to satisfy `desired`
    ///
    /// Only required → weak is a promotion; weak entries are never downgraded.
    pub fn needs_promotion_to(&self, desired: LinkMode) -> bool {
        matches!((self, desired), (LinkMode::Required, LinkMode::Weak))
    }
}

/// A scalar value that may be written at the top level of a plist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlistScalar {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl fmt::Display for PlistScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlistScalar::Boolean(b) => write!(f, "{}", b),
            PlistScalar::Integer(i) => write!(f, "{}", i),
            PlistScalar::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// An atomic desired configuration item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fact {
    /// Verified https deep link for a host, reconciled into the manifest
    AppLinkDomain { domain: String },
    /// Framework the target links against
    Framework { name: String, mode: LinkMode },
    /// SKAdNetwork partner identifier in `Info.plist`
    PartnerId { identifier: String },
    /// `applinks:` associated domain in the entitlements
    AssociatedDomain { domain: String },
    /// Tool-owned top-level plist setting
    PlistEntry { key: String, value: PlistScalar },
    /// Build setting of the Xcode target, e.g. `CODE_SIGN_ENTITLEMENTS`
    BuildSetting { key: String, value: String },
}

impl Fact {
    pub fn app_link(domain: impl Into<String>) -> Self {
        Fact::AppLinkDomain {
            domain: domain.into(),
        }
    }

    pub fn framework(name: impl Into<String>, mode: LinkMode) -> Self {
        Fact::Framework {
            name: name.into(),
            mode,
        }
    }

    pub fn partner_id(identifier: impl Into<String>) -> Self {
        Fact::PartnerId {
            identifier: identifier.into(),
        }
    }

    pub fn associated_domain(domain: impl Into<String>) -> Self {
        Fact::AssociatedDomain {
            domain: domain.into(),
        }
    }

    pub fn plist_entry(key: impl Into<String>, value: PlistScalar) -> Self {
        Fact::PlistEntry {
            key: key.into(),
            value,
        }
    }

    pub fn build_setting(key: impl Into<String>, value: impl Into<String>) -> Self {
        Fact::BuildSetting {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The opaque string the settings collaborator supplied for this fact
    pub fn primary_value(&self) -> &str {
        match self {
            Fact::AppLinkDomain { domain } | Fact::AssociatedDomain { domain } => domain,
            Fact::Framework { name, .. } => name,
            Fact::PartnerId { identifier } => identifier,
            Fact::PlistEntry { key, .. } | Fact::BuildSetting { key, .. } => key,
        }
    }

    /// Whether this fact can be reconciled into a document of `kind`
    pub fn applies_to(&self, kind: DocumentKind) -> bool {
        matches!(
            (self, kind),
            (Fact::AppLinkDomain { .. }, DocumentKind::AndroidManifest)
                | (Fact::Framework { .. }, DocumentKind::LinkList)
                | (Fact::PartnerId { .. }, DocumentKind::InfoPlist)
                | (Fact::AssociatedDomain { .. }, DocumentKind::Entitlements)
                | (Fact::PlistEntry { .. }, DocumentKind::InfoPlist)
                | (Fact::PlistEntry { .. }, DocumentKind::Entitlements)
                | (Fact::BuildSetting { .. }, DocumentKind::LinkList)
        )
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::AppLinkDomain { domain } => write!(f, "app-link {}", domain),
            Fact::Framework { name, mode } => write!(f, "framework {} ({})", name, mode.as_str()),
            Fact::PartnerId { identifier } => write!(f, "partner-id {}", identifier),
            Fact::AssociatedDomain { domain } => write!(f, "associated-domain applinks:{}", domain),
            Fact::PlistEntry { key, value } => write!(f, "plist-entry {}={}", key, value),
            Fact::BuildSetting { key, value } => write!(f, "build-setting {}={:?}", key, value),
        }
    }
}
