#![allow(clippy::unwrap_used, clippy::expect_used)]

//! App-link reconciliation of a generated Android manifest

mod common;

use common::{element_signatures, options, parse_manifest, signature, LAUNCHER_MANIFEST};
use reconx_core::locate::{configured_app_link_domains, find_main_activity};
use reconx_core::model::tree::Node;
use reconx_core::reconcile::ManifestDescriptor;
use reconx_core::{reconcile_bytes, DocumentKind, Fact, FactOutcome, ReconError};

fn facts(domains: &[&str]) -> Vec<Fact> {
    domains.iter().map(|d| Fact::app_link(*d)).collect()
}

#[test]
fn test_shop_domain_filter_appended_after_launcher_filter() {
    // GIVEN a manifest whose launcher activity has no data filters
    let before = parse_manifest(LAUNCHER_MANIFEST.as_bytes());
    let anchor = find_main_activity(&before).unwrap();
    let launcher_filter_before = before.element(&anchor).unwrap().children()[0].clone();

    // WHEN reconciling the single domain shop.example.com
    let result = reconcile_bytes::<ManifestDescriptor>(
        Some(LAUNCHER_MANIFEST.as_bytes()),
        &facts(&["shop.example.com"]),
        &options(),
    )
    .unwrap();

    // THEN the fact is reported applied
    assert_eq!(result.report.facts[0].outcome, FactOutcome::Applied);
    assert!(result.report.changed);

    // AND the activity ends with exactly one new verified filter
    let after = parse_manifest(&result.output);
    let activity = after.element(&find_main_activity(&after).unwrap()).unwrap();
    let children = activity.children();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0], launcher_filter_before);
    assert_eq!(children[1].as_element().unwrap().name(), "meta-data");

    let Node::Element(filter) = &children[2] else {
        panic!("last child should be an element");
    };
    assert_eq!(filter.name(), "intent-filter");
    assert_eq!(filter.android_attribute("autoVerify"), Some("true"));
    let inner: Vec<String> = filter.child_elements().map(signature).collect();
    assert_eq!(
        inner,
        vec![
            "action[android:name=android.intent.action.VIEW]",
            "category[android:name=android.intent.category.DEFAULT]",
            "category[android:name=android.intent.category.BROWSABLE]",
            "data[android:scheme=https,android:host=shop.example.com]",
        ]
    );
}

#[test]
fn test_pre_existing_elements_survive_with_identical_attributes() {
    // GIVEN the generated manifest
    let before = element_signatures(&parse_manifest(LAUNCHER_MANIFEST.as_bytes()));

    // WHEN two domains are reconciled
    let result = reconcile_bytes::<ManifestDescriptor>(
        Some(LAUNCHER_MANIFEST.as_bytes()),
        &facts(&["a.com", "b.com"]),
        &options(),
    )
    .unwrap();

    // THEN every original element is still present, in order, unchanged
    let after = element_signatures(&parse_manifest(&result.output));
    let mut remaining = after.iter();
    for sig in &before {
        assert!(
            remaining.any(|candidate| candidate == sig),
            "element {sig} was lost or reordered"
        );
    }

    // AND the comment and the tools namespace are kept
    let text = String::from_utf8(result.output).unwrap();
    assert!(text.contains("<!-- generated by the engine export -->"));
    assert!(text.contains("tools:node=\"merge\""));
}

#[test]
fn test_two_runs_leave_one_filter_per_domain() {
    // GIVEN domains a.com and b.com
    let facts = facts(&["a.com", "b.com"]);

    // WHEN reconciling twice in sequence
    let first =
        reconcile_bytes::<ManifestDescriptor>(Some(LAUNCHER_MANIFEST.as_bytes()), &facts, &options())
            .unwrap();
    let second =
        reconcile_bytes::<ManifestDescriptor>(Some(&first.output), &facts, &options()).unwrap();

    // THEN the second run is a no-op
    assert_eq!(first.output, second.output);
    assert!(!second.report.changed);
    assert_eq!(second.report.already_present_count(), 2);

    // AND each domain appears in exactly one filter
    let doc = parse_manifest(&second.output);
    assert_eq!(configured_app_link_domains(&doc), vec!["a.com", "b.com"]);
    let text = String::from_utf8(second.output).unwrap();
    assert_eq!(text.matches("android:host=\"a.com\"").count(), 1);
    assert_eq!(text.matches("android:host=\"b.com\"").count(), 1);
}

#[test]
fn test_malformed_existing_filter_is_not_a_match() {
    // GIVEN a filter for a.com that lacks the BROWSABLE category
    let manifest = LAUNCHER_MANIFEST.replace(
        "      <meta-data",
        r#"      <intent-filter android:autoVerify="true">
        <action android:name="android.intent.action.VIEW" />
        <category android:name="android.intent.category.DEFAULT" />
        <data android:scheme="https" android:host="a.com" />
      </intent-filter>
      <meta-data"#,
    );

    // WHEN a.com is reconciled
    let result = reconcile_bytes::<ManifestDescriptor>(
        Some(manifest.as_bytes()),
        &facts(&["a.com"]),
        &options(),
    )
    .unwrap();

    // THEN a well-shaped filter is appended and the old one is kept
    assert_eq!(result.report.facts[0].outcome, FactOutcome::Applied);
    let text = String::from_utf8(result.output).unwrap();
    assert_eq!(text.matches("android:host=\"a.com\"").count(), 2);
}

#[test]
fn test_missing_launcher_is_fatal() {
    // GIVEN a manifest without any MAIN/LAUNCHER activity
    let manifest = LAUNCHER_MANIFEST.replace("category.LAUNCHER", "category.INFO");

    // WHEN reconciling
    let err = reconcile_bytes::<ManifestDescriptor>(
        Some(manifest.as_bytes()),
        &facts(&["a.com"]),
        &options(),
    )
    .unwrap_err();

    // THEN the document fails with the predicate named
    match err {
        ReconError::AnchorNotFound {
            document,
            predicate,
        } => {
            assert_eq!(document, DocumentKind::AndroidManifest);
            assert!(predicate.contains("android.intent.category.LAUNCHER"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
