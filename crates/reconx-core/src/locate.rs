//! Anchor lookup by structural predicate
//!
//! The anchor for manifest reconciliation is the launcher activity: the first
//! `activity`, in document order, with an immediate `intent-filter` child that
//! declares both the MAIN action and the LAUNCHER category. Attribute matches
//! are namespace-qualified and case-sensitive.

use crate::errors::{ReconError, Result};
use crate::facts::DocumentKind;
use crate::model::tree::{Element, ElementPath, XmlDocument};

pub const ACTION_MAIN: &str = "android.intent.action.MAIN";
pub const ACTION_VIEW: &str = "android.intent.action.VIEW";
pub const CATEGORY_LAUNCHER: &str = "android.intent.category.LAUNCHER";
pub const CATEGORY_DEFAULT: &str = "android.intent.category.DEFAULT";
pub const CATEGORY_BROWSABLE: &str = "android.intent.category.BROWSABLE";

/// Human-readable form of the launcher predicate, used in errors
pub const MAIN_ACTIVITY_PREDICATE: &str = "activity > intent-filter[action@android:name=\"android.intent.action.MAIN\" + category@android:name=\"android.intent.category.LAUNCHER\"]";

/// Whether `filter` has an immediate `<tag android:name="value">` child
pub fn has_named_child(filter: &Element, tag: &str, value: &str) -> bool {
    filter
        .child_elements_named(tag)
        .any(|child| child.android_attribute("name") == Some(value))
}

fn is_launcher_filter(filter: &Element) -> bool {
    has_named_child(filter, "action", ACTION_MAIN)
        && has_named_child(filter, "category", CATEGORY_LAUNCHER)
}

/// Whether `activity` carries a MAIN + LAUNCHER intent-filter
pub fn is_launcher_activity(activity: &Element) -> bool {
    activity.name() == "activity"
        && activity
            .child_elements_named("intent-filter")
            .any(is_launcher_filter)
}

/// Path of the launcher activity
///
/// # Errors
///
/// `AnchorNotFound` naming the predicate when no activity matches.
pub fn find_main_activity(doc: &XmlDocument) -> Result<ElementPath> {
    doc.find_all(is_launcher_activity)
        .into_iter()
        .next()
        .ok_or_else(|| ReconError::AnchorNotFound {
            document: DocumentKind::AndroidManifest,
            predicate: MAIN_ACTIVITY_PREDICATE.to_string(),
        })
}

/// `android:name` of the element at `path`
pub fn activity_name(doc: &XmlDocument, path: &ElementPath) -> Option<String> {
    doc.element(path)?
        .android_attribute("name")
        .map(str::to_string)
}

/// The unqualified `package` attribute of `<manifest>`
pub fn package_name(doc: &XmlDocument) -> Option<&str> {
    let root = doc.root();
    if root.name() != "manifest" {
        return None;
    }
    root.attribute(None, "package")
}

/// Distinct https hosts of every `autoVerify="true"` intent-filter, in
/// first-seen order
pub fn configured_app_link_domains(doc: &XmlDocument) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    for (_, filter) in doc.descendants() {
        if filter.name() != "intent-filter" || filter.android_attribute("autoVerify") != Some("true")
        {
            continue;
        }
        for data in filter.child_elements_named("data") {
            let https = data.android_attribute("scheme") == Some("https");
            match data.android_attribute("host") {
                Some(host) if https && !host.is_empty() => {
                    if !domains.iter().any(|d| d == host) {
                        domains.push(host.to_string());
                    }
                }
                _ => {}
            }
        }
    }
    domains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::xml_codec::parse;

    const TWO_ACTIVITIES: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.game">
  <application>
    <activity android:name=".Settings">
      <intent-filter>
        <action android:name="android.intent.action.MAIN"/>
      </intent-filter>
    </activity>
    <activity android:name=".Main">
      <intent-filter>
        <action android:name="android.intent.action.MAIN"/>
        <category android:name="android.intent.category.LAUNCHER"/>
      </intent-filter>
      <intent-filter android:autoVerify="true">
        <data android:scheme="https" android:host="a.com"/>
        <data android:scheme="http" android:host="b.com"/>
      </intent-filter>
    </activity>
    <activity android:name=".Other">
      <intent-filter android:autoVerify="true">
        <data android:scheme="https" android:host="a.com"/>
        <data android:scheme="https" android:host="c.com"/>
      </intent-filter>
    </activity>
  </application>
</manifest>"#;

    #[test]
    fn test_finds_first_full_match() {
        let doc = parse(TWO_ACTIVITIES.as_bytes()).unwrap();
        let path = find_main_activity(&doc).unwrap();
        assert_eq!(activity_name(&doc, &path).as_deref(), Some(".Main"));
    }

    #[test]
    fn test_wrong_namespace_does_not_match() {
        let xml = r#"<manifest xmlns:a="urn:other"><application><activity>
            <intent-filter>
              <action a:name="android.intent.action.MAIN"/>
              <category a:name="android.intent.category.LAUNCHER"/>
            </intent-filter>
        </activity></application></manifest>"#;
        let doc = parse(xml.as_bytes()).unwrap();
        let err = find_main_activity(&doc).unwrap_err();
        assert!(matches!(err, ReconError::AnchorNotFound { .. }));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let xml = TWO_ACTIVITIES.replace("category.LAUNCHER", "category.launcher");
        let doc = parse(xml.as_bytes()).unwrap();
        assert!(find_main_activity(&doc).is_err());
    }

    #[test]
    fn test_package_name() {
        let doc = parse(TWO_ACTIVITIES.as_bytes()).unwrap();
        assert_eq!(package_name(&doc), Some("com.example.game"));
    }

    #[test]
    fn test_configured_domains_distinct_https_only() {
        let doc = parse(TWO_ACTIVITIES.as_bytes()).unwrap();
        assert_eq!(configured_app_link_domains(&doc), vec!["a.com", "c.com"]);
    }
}
