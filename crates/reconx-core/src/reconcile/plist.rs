//! Plist-backed descriptors: entitlements and Info.plist
//!
//! Both anchor on the root dictionary. Arrays are found or created under
//! their key and then extended through [`match_then_append`].

use super::{Change, Descriptor, ReconcileOptions};
use crate::errors::{ReconError, Result};
use crate::facts::{DocumentKind, Fact, PlistScalar};
use crate::matcher::{
    is_associated_domain, is_partner_entry, match_scalar, ScalarMatch, SKAN_IDENTIFIER_KEY,
};
use crate::merge::match_then_append;
use crate::model::plist::{PlistDict, PlistDocument, PlistValue};
use crate::patch;

pub const ASSOCIATED_DOMAINS_KEY: &str = "com.apple.developer.associated-domains";
pub const SKAN_ITEMS_KEY: &str = "SKAdNetworkItems";
pub const ATTRIBUTION_ENDPOINT_KEY: &str = "NSAdvertisingAttributionReportEndpoint";
pub const CONSUMABLE_HISTORY_KEY: &str = "SKIncludeConsumableInAppPurchaseHistory";
pub const BUNDLE_ID_KEY: &str = "CFBundleIdentifier";

const ROOT_ANCHOR: &str = "root dict";

fn parse_plist(kind: DocumentKind, input: &[u8]) -> Result<PlistDocument> {
    PlistDocument::parse(input).map_err(|e| ReconError::Parse {
        document: kind,
        reason: e.to_string(),
    })
}

fn append_unique<P, B>(
    root: &mut PlistDict,
    key: &str,
    fact: &Fact,
    is_equivalent: P,
    build: B,
) -> Result<Change>
where
    P: Fn(&PlistValue) -> bool,
    B: FnOnce() -> PlistValue,
{
    let array = root
        .array_entry(key)
        .map_err(|e| ReconError::fact(fact, e.to_string()))?;
    Ok(match_then_append(array, is_equivalent, build).into())
}

fn set_scalar(root: &mut PlistDict, key: &str, value: &PlistScalar) -> Change {
    match match_scalar(root, key, value) {
        ScalarMatch::Equal => Change::Unchanged,
        ScalarMatch::Absent => {
            root.set(key, patch::plist_scalar(value));
            Change::Appended
        }
        ScalarMatch::Different(previous) => {
            root.set(key, patch::plist_scalar(value));
            Change::Replaced {
                previous: describe(&previous),
            }
        }
    }
}

fn describe(value: &PlistValue) -> String {
    match value {
        PlistValue::String(s) => format!("{:?}", s),
        PlistValue::Integer(i) => i.to_string(),
        PlistValue::Boolean(b) => b.to_string(),
        other => format!("<{}>", other.type_name()),
    }
}

/// Code-signing entitlements
pub struct EntitlementsDescriptor {
    doc: PlistDocument,
}

impl EntitlementsDescriptor {
    pub fn document(&self) -> &PlistDocument {
        &self.doc
    }
}

impl Descriptor for EntitlementsDescriptor {
    type Anchor = ();

    const KIND: DocumentKind = DocumentKind::Entitlements;

    fn parse(input: &[u8]) -> Result<Self> {
        Ok(Self {
            doc: parse_plist(Self::KIND, input)?,
        })
    }

    fn empty() -> Option<Self> {
        Some(Self {
            doc: PlistDocument::new(),
        })
    }

    fn locate_anchor(&self) -> Result<()> {
        Ok(())
    }

    fn describe_anchor(&self, _anchor: &()) -> Option<String> {
        Some(ROOT_ANCHOR.to_string())
    }

    fn apply_fact(&mut self, _anchor: &(), fact: &Fact) -> Result<Change> {
        let root = &mut self.doc.root;
        match fact {
            Fact::AssociatedDomain { domain } => append_unique(
                root,
                ASSOCIATED_DOMAINS_KEY,
                fact,
                |value| is_associated_domain(value, domain),
                || patch::associated_domain_value(domain),
            ),
            Fact::PlistEntry { key, value } => Ok(set_scalar(root, key, value)),
            _ => Err(ReconError::fact(fact, "not an entitlements fact")),
        }
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        Ok(self.doc.to_xml_string().into_bytes())
    }
}

/// Application `Info.plist`
pub struct InfoPlistDescriptor {
    doc: PlistDocument,
}

impl InfoPlistDescriptor {
    pub fn document(&self) -> &PlistDocument {
        &self.doc
    }

    /// Identifiers currently listed under `SKAdNetworkItems`, in order
    pub fn partner_ids(&self) -> Vec<String> {
        partner_ids(&self.doc)
    }
}

/// Identifiers listed under `SKAdNetworkItems`, in order
pub fn partner_ids(doc: &PlistDocument) -> Vec<String> {
    doc.root
        .get(SKAN_ITEMS_KEY)
        .and_then(PlistValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(PlistValue::as_dict)
                .filter_map(|dict| dict.get(SKAN_IDENTIFIER_KEY))
                .filter_map(PlistValue::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl Descriptor for InfoPlistDescriptor {
    type Anchor = ();

    const KIND: DocumentKind = DocumentKind::InfoPlist;

    fn parse(input: &[u8]) -> Result<Self> {
        Ok(Self {
            doc: parse_plist(Self::KIND, input)?,
        })
    }

    fn locate_anchor(&self) -> Result<()> {
        Ok(())
    }

    fn describe_anchor(&self, _anchor: &()) -> Option<String> {
        Some(ROOT_ANCHOR.to_string())
    }

    /// Bundle identifier check; build-variable values such as
    /// `$(PRODUCT_BUNDLE_IDENTIFIER)` are resolved later and not compared
    fn inspect(&self, options: &ReconcileOptions) -> Vec<String> {
        let expected = match options.expected_bundle_id.as_deref() {
            Some(expected) if !expected.trim().is_empty() => expected,
            _ => return Vec::new(),
        };
        match self.doc.root.get(BUNDLE_ID_KEY).and_then(PlistValue::as_str) {
            Some(actual) if !actual.contains("$(") && actual != expected => vec![format!(
                "bundle identifier mismatch: Info.plist declares {}, settings expect {}",
                actual, expected
            )],
            _ => Vec::new(),
        }
    }

    fn apply_fact(&mut self, _anchor: &(), fact: &Fact) -> Result<Change> {
        let root = &mut self.doc.root;
        match fact {
            Fact::PartnerId { identifier } => append_unique(
                root,
                SKAN_ITEMS_KEY,
                fact,
                |value| is_partner_entry(value, identifier),
                || patch::partner_entry(identifier),
            ),
            Fact::PlistEntry { key, value } => Ok(set_scalar(root, key, value)),
            _ => Err(ReconError::fact(fact, "not an Info.plist fact")),
        }
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        Ok(self.doc.to_xml_string().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{reconcile_bytes, ReconcileOptions};
    use crate::report::FactOutcome;
    use reconx_core_types::RunId;

    const INFO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleIdentifier</key>
	<string>com.example.game</string>
	<key>SKAdNetworkItems</key>
	<array>
		<dict>
			<key>SKAdNetworkIdentifier</key>
			<string>cstr6suwn9.skadnetwork</string>
		</dict>
	</array>
</dict>
</plist>
"#;

    fn options() -> ReconcileOptions {
        ReconcileOptions::new(RunId::from_string("r".to_string()))
    }

    #[test]
    fn test_partner_ids_appended_once() {
        let facts = vec![
            Fact::partner_id("cstr6suwn9.skadnetwork"),
            Fact::partner_id("v9wttpbfk9.skadnetwork"),
        ];
        let result =
            reconcile_bytes::<InfoPlistDescriptor>(Some(INFO.as_bytes()), &facts, &options())
                .unwrap();
        assert_eq!(result.report.facts[0].outcome, FactOutcome::AlreadyPresent);
        assert_eq!(result.report.facts[1].outcome, FactOutcome::Applied);
        let reparsed = InfoPlistDescriptor::parse(&result.output).unwrap();
        assert_eq!(
            reparsed.partner_ids(),
            vec!["cstr6suwn9.skadnetwork", "v9wttpbfk9.skadnetwork"]
        );
    }

    #[test]
    fn test_plist_entry_replaced_in_place() {
        let facts = vec![
            Fact::plist_entry(
                "CFBundleIdentifier",
                PlistScalar::String("com.example.other".to_string()),
            ),
            Fact::plist_entry(CONSUMABLE_HISTORY_KEY, PlistScalar::Boolean(true)),
        ];
        let result =
            reconcile_bytes::<InfoPlistDescriptor>(Some(INFO.as_bytes()), &facts, &options())
                .unwrap();
        assert_eq!(
            result.report.facts[0].note.as_deref(),
            Some("replaced \"com.example.game\"")
        );
        let reparsed = InfoPlistDescriptor::parse(&result.output).unwrap();
        let keys: Vec<&str> = reparsed.document().root.keys().collect();
        assert_eq!(
            keys,
            vec!["CFBundleIdentifier", SKAN_ITEMS_KEY, CONSUMABLE_HISTORY_KEY]
        );
    }

    #[test]
    fn test_non_array_key_fails_only_that_fact() {
        let xml = r#"<plist version="1.0"><dict>
            <key>com.apple.developer.associated-domains</key><string>applinks:a.com</string>
        </dict></plist>"#;
        let facts = vec![
            Fact::associated_domain("b.com"),
            Fact::plist_entry("aps-environment", PlistScalar::String("production".to_string())),
        ];
        let result =
            reconcile_bytes::<EntitlementsDescriptor>(Some(xml.as_bytes()), &facts, &options())
                .unwrap();
        assert!(matches!(
            &result.report.facts[0].outcome,
            FactOutcome::Failed { reason } if reason.contains("expected <array>")
        ));
        assert_eq!(result.report.facts[1].outcome, FactOutcome::Applied);
    }

    #[test]
    fn test_bundle_id_mismatch_is_a_warning() {
        let facts = vec![Fact::partner_id("cstr6suwn9.skadnetwork")];
        let mismatch = options().with_expected_bundle_id("com.example.shop");
        let result =
            reconcile_bytes::<InfoPlistDescriptor>(Some(INFO.as_bytes()), &facts, &mismatch)
                .unwrap();
        assert_eq!(result.report.warnings.len(), 1);
        assert!(result.report.warnings[0].contains("com.example.game"));
        assert_eq!(result.report.facts[0].outcome, FactOutcome::AlreadyPresent);

        let matching = options().with_expected_bundle_id("com.example.game");
        let result =
            reconcile_bytes::<InfoPlistDescriptor>(Some(INFO.as_bytes()), &facts, &matching)
                .unwrap();
        assert!(result.report.warnings.is_empty());

        let variable = INFO.replace("com.example.game", "$(PRODUCT_BUNDLE_IDENTIFIER)");
        let result =
            reconcile_bytes::<InfoPlistDescriptor>(Some(variable.as_bytes()), &facts, &mismatch)
                .unwrap();
        assert!(result.report.warnings.is_empty());
    }

    #[test]
    fn test_created_entitlements_has_domains_array() {
        let result = reconcile_bytes::<EntitlementsDescriptor>(
            None,
            &[Fact::associated_domain("a.com")],
            &options(),
        )
        .unwrap();
        let text = String::from_utf8(result.output).unwrap();
        assert!(text.contains(
            "\t<key>com.apple.developer.associated-domains</key>\n\t<array>\n\t\t<string>applinks:a.com</string>\n\t</array>\n"
        ));
    }
}
