//! Android manifest: verified app-link intent-filters on the launcher activity

use super::{Change, Descriptor, ReconcileOptions};
use crate::errors::{ReconError, Result};
use crate::facts::{DocumentKind, Fact};
use crate::locate::{activity_name, find_main_activity, package_name};
use crate::matcher::node_is_app_link_for;
use crate::merge::match_then_append;
use crate::model::tree::{ElementPath, Node, XmlDocument, ANDROID_NS};
use crate::model::xml_codec::{self, DEFAULT_INDENT};
use crate::patch;

pub struct ManifestDescriptor {
    doc: XmlDocument,
}

impl ManifestDescriptor {
    pub fn document(&self) -> &XmlDocument {
        &self.doc
    }

    /// New filters use the `android:` prefix; bind it on `<manifest>` unless
    /// the anchor or one of its ancestors already does.
    fn ensure_android_prefix(&mut self, anchor: &ElementPath) {
        let indices = anchor.indices();
        let bound = (0..=indices.len()).any(|depth| {
            let path = indices[..depth]
                .iter()
                .fold(ElementPath::root(), |path, &index| path.child(index));
            self.doc.element(&path).is_some_and(|el| {
                el.namespaces()
                    .iter()
                    .any(|ns| ns.prefix.as_deref() == Some("android") && ns.uri == ANDROID_NS)
            })
        });
        if !bound {
            self.doc.root.declare_namespace(Some("android"), ANDROID_NS);
        }
    }
}

impl Descriptor for ManifestDescriptor {
    type Anchor = ElementPath;

    const KIND: DocumentKind = DocumentKind::AndroidManifest;

    fn parse(input: &[u8]) -> Result<Self> {
        let doc = xml_codec::parse(input).map_err(|e| ReconError::Parse {
            document: Self::KIND,
            reason: e.to_string(),
        })?;
        Ok(Self { doc })
    }

    fn locate_anchor(&self) -> Result<ElementPath> {
        find_main_activity(&self.doc)
    }

    fn describe_anchor(&self, anchor: &ElementPath) -> Option<String> {
        let name = activity_name(&self.doc, anchor).unwrap_or_else(|| "<unnamed>".to_string());
        Some(format!("activity {}", name))
    }

    fn inspect(&self, options: &ReconcileOptions) -> Vec<String> {
        let expected = match options.expected_package.as_deref() {
            Some(expected) if !expected.trim().is_empty() => expected,
            _ => return Vec::new(),
        };
        match package_name(&self.doc) {
            Some(actual) if actual != expected => vec![format!(
                "package name mismatch: manifest declares {}, settings expect {}; app links may fail verification",
                actual, expected
            )],
            _ => Vec::new(),
        }
    }

    fn apply_fact(&mut self, anchor: &ElementPath, fact: &Fact) -> Result<Change> {
        let Fact::AppLinkDomain { domain } = fact else {
            return Err(ReconError::fact(fact, "not an app-link fact"));
        };
        let activity = self
            .doc
            .element_mut(anchor)
            .ok_or_else(|| ReconError::fact(fact, "launcher activity is no longer resolvable"))?;
        let merge = match_then_append(
            activity,
            |node| node_is_app_link_for(node, domain),
            || Node::Element(patch::app_link_filter(domain)),
        );
        let change = Change::from(merge);
        if change == Change::Appended {
            self.ensure_android_prefix(anchor);
        }
        Ok(change)
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        Ok(xml_codec::to_string(&self.doc, DEFAULT_INDENT).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{reconcile_bytes, ReconcileOptions};
    use crate::report::FactOutcome;
    use reconx_core_types::RunId;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.game">
    <application>
        <activity android:name="com.unity3d.player.UnityPlayerActivity">
            <intent-filter>
                <action android:name="android.intent.action.MAIN" />
                <category android:name="android.intent.category.LAUNCHER" />
            </intent-filter>
        </activity>
    </application>
</manifest>
"#;

    fn options() -> ReconcileOptions {
        ReconcileOptions::new(RunId::from_string("r".to_string()))
    }

    #[test]
    fn test_anchor_described_by_activity_name() {
        let result = reconcile_bytes::<ManifestDescriptor>(
            Some(MANIFEST.as_bytes()),
            &[Fact::app_link("a.com")],
            &options(),
        )
        .unwrap();
        assert_eq!(
            result.report.anchor.as_deref(),
            Some("activity com.unity3d.player.UnityPlayerActivity")
        );
    }

    #[test]
    fn test_duplicate_fact_reports_already_present() {
        let facts = vec![Fact::app_link("a.com"), Fact::app_link("a.com")];
        let result =
            reconcile_bytes::<ManifestDescriptor>(Some(MANIFEST.as_bytes()), &facts, &options())
                .unwrap();
        assert_eq!(result.report.facts[0].outcome, FactOutcome::Applied);
        assert_eq!(result.report.facts[1].outcome, FactOutcome::AlreadyPresent);
        let text = String::from_utf8(result.output).unwrap();
        assert_eq!(text.matches("android:host=\"a.com\"").count(), 1);
    }

    #[test]
    fn test_package_mismatch_is_a_warning() {
        let opts = options().with_expected_package("com.example.other");
        let result = reconcile_bytes::<ManifestDescriptor>(
            Some(MANIFEST.as_bytes()),
            &[Fact::app_link("a.com")],
            &opts,
        )
        .unwrap();
        assert_eq!(result.report.warnings.len(), 1);
        assert!(result.report.warnings[0].contains("com.example.other"));
        assert_eq!(result.report.applied_count(), 1);

        let matching = options().with_expected_package("com.example.game");
        let result =
            reconcile_bytes::<ManifestDescriptor>(Some(MANIFEST.as_bytes()), &[], &matching)
                .unwrap();
        assert!(result.report.warnings.is_empty());
    }

    #[test]
    fn test_already_formatted_manifest_without_facts_is_unchanged() {
        let result =
            reconcile_bytes::<ManifestDescriptor>(Some(MANIFEST.as_bytes()), &[], &options())
                .unwrap();
        assert!(!result.report.changed);
    }

    #[test]
    fn test_android_prefix_bound_on_activity_is_reused() {
        let xml = r#"<manifest><application><activity xmlns:android="http://schemas.android.com/apk/res/android">
            <intent-filter>
                <action android:name="android.intent.action.MAIN"/>
                <category android:name="android.intent.category.LAUNCHER"/>
            </intent-filter>
        </activity></application></manifest>"#;
        let facts = [Fact::app_link("a.com")];
        let first =
            reconcile_bytes::<ManifestDescriptor>(Some(xml.as_bytes()), &facts, &options()).unwrap();
        let reparsed = ManifestDescriptor::parse(&first.output).unwrap();
        assert!(reparsed.document().root().namespaces().is_empty());

        let second =
            reconcile_bytes::<ManifestDescriptor>(Some(&first.output), &facts, &options()).unwrap();
        assert!(!second.report.changed);
    }

    #[test]
    fn test_android_prefix_declared_when_unbound() {
        // No android binding anywhere in the input
        let xml = r#"<manifest><application><activity/></application></manifest>"#;
        let mut descriptor = ManifestDescriptor::parse(xml.as_bytes()).unwrap();
        let anchor = ElementPath::root().child(0).child(0);
        let change = descriptor.apply_fact(&anchor, &Fact::app_link("a.com")).unwrap();
        assert_eq!(change, Change::Appended);
        let out = descriptor.serialize().unwrap();
        let reparsed = ManifestDescriptor::parse(&out).unwrap();
        assert_eq!(reparsed.document().root().namespaces().len(), 1);
    }
}
