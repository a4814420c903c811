//! Builders for the minimal content appended on a miss

use crate::facts::PlistScalar;
use crate::locate::{ACTION_VIEW, CATEGORY_BROWSABLE, CATEGORY_DEFAULT};
use crate::matcher::{applinks_entry, SKAN_IDENTIFIER_KEY};
use crate::model::plist::{PlistDict, PlistValue};
use crate::model::tree::{Element, ANDROID};

pub use crate::model::link_list::framework_entry;

/// Verified https app-link filter for one host
///
/// ```xml
/// <intent-filter android:autoVerify="true">
///     <action android:name="android.intent.action.VIEW" />
///     <category android:name="android.intent.category.DEFAULT" />
///     <category android:name="android.intent.category.BROWSABLE" />
///     <data android:scheme="https" android:host="shop.example.com" />
/// </intent-filter>
/// ```
pub fn app_link_filter(domain: &str) -> Element {
    Element::new("intent-filter")
        .attr(Some(ANDROID), "autoVerify", "true")
        .child(Element::new("action").attr(Some(ANDROID), "name", ACTION_VIEW))
        .child(Element::new("category").attr(Some(ANDROID), "name", CATEGORY_DEFAULT))
        .child(Element::new("category").attr(Some(ANDROID), "name", CATEGORY_BROWSABLE))
        .child(
            Element::new("data")
                .attr(Some(ANDROID), "scheme", "https")
                .attr(Some(ANDROID), "host", domain),
        )
}

pub fn associated_domain_value(domain: &str) -> PlistValue {
    PlistValue::String(applinks_entry(domain))
}

/// `SKAdNetworkItems` dict with only the identifier set
pub fn partner_entry(identifier: &str) -> PlistValue {
    PlistValue::Dict(
        PlistDict::new().with(SKAN_IDENTIFIER_KEY, PlistValue::String(identifier.to_string())),
    )
}

pub fn plist_scalar(value: &PlistScalar) -> PlistValue {
    match value {
        PlistScalar::Boolean(b) => PlistValue::Boolean(*b),
        PlistScalar::Integer(i) => PlistValue::Integer(*i),
        PlistScalar::String(s) => PlistValue::String(s.clone()),
    }
}
