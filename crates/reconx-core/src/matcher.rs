//! Equivalence checks between existing document content and a fact

use crate::facts::{LinkMode, PlistScalar};
use crate::locate::{has_named_child, ACTION_VIEW, CATEGORY_BROWSABLE, CATEGORY_DEFAULT};
use crate::model::link_list::LinkListDocument;
use crate::model::plist::{PlistDict, PlistValue};
use crate::model::tree::{Element, Node};

/// Key inside each `SKAdNetworkItems` dict
pub const SKAN_IDENTIFIER_KEY: &str = "SKAdNetworkIdentifier";

/// Prefix of an associated-domain entitlement for universal links
pub const APPLINKS_PREFIX: &str = "applinks:";

/// A well-shaped verified app-link filter: `autoVerify="true"` plus the VIEW
/// action and both DEFAULT and BROWSABLE categories.
pub fn is_app_link_filter(filter: &Element) -> bool {
    filter.name() == "intent-filter"
        && filter.android_attribute("autoVerify") == Some("true")
        && has_named_child(filter, "action", ACTION_VIEW)
        && has_named_child(filter, "category", CATEGORY_DEFAULT)
        && has_named_child(filter, "category", CATEGORY_BROWSABLE)
}

/// Whether `filter` has a `data` child with `scheme=https` and `host=domain`
pub fn filter_declares_host(filter: &Element, domain: &str) -> bool {
    filter.child_elements_named("data").any(|data| {
        data.android_attribute("scheme") == Some("https")
            && data.android_attribute("host") == Some(domain)
    })
}

/// Equivalence predicate over anchor children for an app-link domain
pub fn node_is_app_link_for(node: &Node, domain: &str) -> bool {
    node.as_element()
        .is_some_and(|filter| is_app_link_filter(filter) && filter_declares_host(filter, domain))
}

/// Where a framework fact stands in the link list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameworkMatch {
    Absent,
    Present { index: usize, mode: LinkMode },
    /// Listed, but with a `link` value that is neither required nor weak
    UnrecognizedLink { index: usize, link: String },
}

/// Match a framework by name, whatever its link mode; first entry wins
pub fn find_framework(list: &LinkListDocument, name: &str) -> FrameworkMatch {
    let Some((index, entry)) = list
        .entries()
        .into_iter()
        .find(|(_, entry)| entry.name == name)
    else {
        return FrameworkMatch::Absent;
    };
    match list.unrecognized_link(index) {
        Some(link) => FrameworkMatch::UnrecognizedLink { index, link },
        None => FrameworkMatch::Present {
            index,
            mode: entry.mode,
        },
    }
}

/// The entitlement string for an associated domain
pub fn applinks_entry(domain: &str) -> String {
    format!("{}{}", APPLINKS_PREFIX, domain)
}

/// Exact string match against `applinks:<domain>`
pub fn is_associated_domain(value: &PlistValue, domain: &str) -> bool {
    value
        .as_str()
        .and_then(|s| s.strip_prefix(APPLINKS_PREFIX))
        .is_some_and(|rest| rest == domain)
}

/// A `SKAdNetworkItems` dict whose identifier equals `identifier`
pub fn is_partner_entry(value: &PlistValue, identifier: &str) -> bool {
    value
        .as_dict()
        .and_then(|dict| dict.get(SKAN_IDENTIFIER_KEY))
        .and_then(PlistValue::as_str)
        == Some(identifier)
}

/// State of a top-level scalar key relative to its desired value
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarMatch {
    Absent,
    Equal,
    Different(PlistValue),
}

pub fn match_scalar(dict: &PlistDict, key: &str, desired: &PlistScalar) -> ScalarMatch {
    match dict.get(key) {
        None => ScalarMatch::Absent,
        Some(existing) if scalar_equals(existing, desired) => ScalarMatch::Equal,
        Some(existing) => ScalarMatch::Different(existing.clone()),
    }
}

fn scalar_equals(existing: &PlistValue, desired: &PlistScalar) -> bool {
    match (existing, desired) {
        (PlistValue::Boolean(a), PlistScalar::Boolean(b)) => a == b,
        (PlistValue::Integer(a), PlistScalar::Integer(b)) => a == b,
        (PlistValue::String(a), PlistScalar::String(b)) => a == b,
        _ => false,
    }
}
