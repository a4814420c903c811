// Integration tests for load/reconcile/persist on disk

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reconx_core::logging_facility::test_capture::init_test_capture;
use reconx_core::{DocumentKind, Fact, LinkMode, ReconcileOptions};
use reconx_core_types::RunId;
use reconx_store::pipeline::{reconcile_file, reconcile_to_result};
use std::fs;
use tempfile::TempDir;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.shop">
    <application>
        <activity android:name="com.example.MainActivity">
            <intent-filter>
                <action android:name="android.intent.action.MAIN" />
                <category android:name="android.intent.category.LAUNCHER" />
            </intent-filter>
        </activity>
    </application>
</manifest>
"#;

fn options() -> ReconcileOptions {
    ReconcileOptions::new(RunId::from_string("persist-test".to_string()))
}

#[test]
fn test_changed_document_is_written_then_stable() {
    // GIVEN a manifest on disk
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("AndroidManifest.xml");
    fs::write(&path, MANIFEST).unwrap();
    let facts = vec![Fact::app_link("shop.example.com")];

    // WHEN reconciled twice
    let first = reconcile_file(DocumentKind::AndroidManifest, &path, &facts, &options()).unwrap();
    let after_first = fs::read(&path).unwrap();
    let second = reconcile_file(DocumentKind::AndroidManifest, &path, &facts, &options()).unwrap();

    // THEN only the first run writes
    assert!(first.persisted);
    assert!(!second.changed);
    assert!(!second.persisted);
    assert_eq!(fs::read(&path).unwrap(), after_first);

    // AND the report carries the on-disk path
    assert_eq!(second.path.as_deref(), Some(path.display().to_string().as_str()));
    assert_eq!(second.anchor.as_deref(), Some("activity com.example.MainActivity"));
}

#[test]
fn test_anchor_not_found_leaves_file_byte_identical() {
    // GIVEN a manifest without a launcher activity
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("AndroidManifest.xml");
    let original = MANIFEST.replace("category.LAUNCHER", "category.DEFAULT");
    fs::write(&path, &original).unwrap();

    // WHEN reconciling
    let err = reconcile_file(
        DocumentKind::AndroidManifest,
        &path,
        &[Fact::app_link("a.com")],
        &options(),
    )
    .unwrap_err();

    // THEN the error is fatal and the file untouched
    assert_eq!(err.code(), "ERR_ANCHOR_NOT_FOUND");
    assert_eq!(err.path(), Some(path.display().to_string().as_str()));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_missing_manifest_is_a_load_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("AndroidManifest.xml");

    let result = reconcile_to_result(
        DocumentKind::AndroidManifest,
        &path,
        &[Fact::app_link("a.com")],
        &options(),
    );

    assert!(result.is_failed());
    assert!(!path.exists());
}

#[test]
fn test_missing_entitlements_is_created() {
    // GIVEN no entitlements file
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Entitlements.entitlements");

    // WHEN an associated domain is reconciled
    let report = reconcile_file(
        DocumentKind::Entitlements,
        &path,
        &[Fact::associated_domain("shop.example.com")],
        &options(),
    )
    .unwrap();

    // THEN the file now exists with the entry
    assert!(report.persisted);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("<string>applinks:shop.example.com</string>"));
}

#[test]
fn test_no_facts_skips_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("AndroidManifest.xml");
    fs::write(&path, MANIFEST).unwrap();

    let result = reconcile_to_result(DocumentKind::AndroidManifest, &path, &[], &options());

    assert!(result.report().is_none());
    assert!(!result.is_failed());
    assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);
}

#[test]
fn test_reconcile_file_logs_document_path() {
    // GIVEN test capture and a manifest on disk
    let capture = init_test_capture();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("AndroidManifest.xml");
    fs::write(&path, MANIFEST).unwrap();
    let path_text = path.display().to_string();

    // WHEN the file is reconciled
    reconcile_file(
        DocumentKind::AndroidManifest,
        &path,
        &[Fact::app_link("logged.example.com")],
        &options(),
    )
    .unwrap();

    // THEN start and end events carry the path and the end reports the write
    let events = capture.events_for_op("reconcile_file");
    let start = events
        .iter()
        .find(|e| e.event.as_deref() == Some("start") && e.field("path") == Some(path_text.as_str()))
        .expect("start event with path");
    assert_eq!(start.document_kind.as_deref(), Some("android_manifest"));
    assert!(events.iter().any(|e| e.event.as_deref() == Some("end")
        && e.field("path") == Some(path_text.as_str())
        && e.field("persisted") == Some("true")));
}

#[test]
fn test_missing_link_list_is_created() {
    // GIVEN a project without a framework link list
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ProjectSettings").join("reconx-frameworks.json");

    // WHEN framework facts are reconciled
    let result = reconcile_to_result(
        DocumentKind::LinkList,
        &path,
        &[Fact::framework("AdServices.framework", LinkMode::Weak)],
        &options(),
    );

    // THEN the list is written, parent directory included
    assert!(!result.is_failed());
    assert!(result.report().unwrap().persisted);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"AdServices.framework\""));
}
