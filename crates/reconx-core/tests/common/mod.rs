use reconx_core::model::tree::{Element, XmlDocument};
use reconx_core::model::xml_codec;
use reconx_core::ReconcileOptions;
use reconx_core_types::RunId;

/// Generated manifest with a single launcher activity and no data filters
#[allow(dead_code)]
pub const LAUNCHER_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android" xmlns:tools="http://schemas.android.com/tools" package="com.example.shop">
  <uses-permission android:name="android.permission.INTERNET" />
  <application android:label="@string/app_name" android:icon="@mipmap/app_icon">
    <!-- generated by the engine export -->
    <activity android:name="com.unity3d.player.UnityPlayerActivity" android:exported="true" android:theme="@style/UnityThemeSelector">
      <intent-filter>
        <action android:name="android.intent.action.MAIN" />
        <category android:name="android.intent.category.LAUNCHER" />
      </intent-filter>
      <meta-data android:name="unityplayer.UnityActivity" android:value="true" />
    </activity>
    <service android:name=".Sync" tools:node="merge" />
  </application>
</manifest>
"#;

/// Entitlements with one existing associated domain
#[allow(dead_code)]
pub const ENTITLEMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>aps-environment</key>
	<string>development</string>
	<key>com.apple.developer.associated-domains</key>
	<array>
		<string>applinks:old.com</string>
	</array>
</dict>
</plist>
"#;

#[allow(dead_code)]
pub fn options() -> ReconcileOptions {
    ReconcileOptions::new(RunId::from_string("test-run".to_string()))
}

#[allow(dead_code)]
pub fn parse_manifest(bytes: &[u8]) -> XmlDocument {
    xml_codec::parse(bytes).expect("manifest should parse")
}

/// Every element with its attributes, in pre-order, as comparable strings
#[allow(dead_code)]
pub fn element_signatures(doc: &XmlDocument) -> Vec<String> {
    doc.descendants()
        .into_iter()
        .map(|(_, el)| signature(el))
        .collect()
}

#[allow(dead_code)]
pub fn signature(el: &Element) -> String {
    let attrs: Vec<String> = el
        .attributes()
        .iter()
        .map(|a| format!("{}={}", a.qualified_name(), a.value))
        .collect();
    format!("{}[{}]", el.qualified_name(), attrs.join(","))
}
