//! Framework link list of a generated Xcode target
//!
//! The document is a JSON object. Its `frameworks` array holds one object
//! per linked framework:
//!
//! ```json
//! {
//!   "target": "UnityFramework",
//!   "frameworks": [
//!     { "name": "StoreKit.framework", "link": "required" },
//!     { "name": "AdServices.framework", "link": "weak" }
//!   ],
//!   "build_settings": {
//!     "CODE_SIGN_ENTITLEMENTS": "Entitlements.entitlements"
//!   }
//! }
//! ```
//!
//! A missing `link` field means required. A `link` this tool does not know
//! is reported as-is and never rewritten. `build_settings` maps setting names
//! to string values. Every other key, at any level, is carried through
//! untouched and in its original order.

use crate::facts::LinkMode;
use crate::merge::AppendOnly;
use serde_json::{Map, Value};
use thiserror::Error;

pub const FRAMEWORKS_KEY: &str = "frameworks";
pub const NAME_KEY: &str = "name";
pub const LINK_KEY: &str = "link";
pub const BUILD_SETTINGS_KEY: &str = "build_settings";

#[derive(Error, Debug)]
pub enum LinkListError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("top-level value must be an object")]
    RootNotObject,

    #[error("\"frameworks\" holds a {0}, expected an array")]
    FrameworksNotArray(&'static str),

    #[error("\"build_settings\" holds a {0}, expected an object")]
    BuildSettingsNotObject(&'static str),
}

/// One framework entry as read from the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkEntry {
    pub name: String,
    /// `Required` when `link` is missing or unrecognized
    pub mode: LinkMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkListDocument {
    root: Map<String, Value>,
}

impl Default for LinkListDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkListDocument {
    /// Document with an empty `frameworks` array
    pub fn new() -> Self {
        let mut root = Map::new();
        root.insert(FRAMEWORKS_KEY.to_string(), Value::Array(Vec::new()));
        Self { root }
    }

    pub fn parse(input: &[u8]) -> Result<Self, LinkListError> {
        let value: Value = serde_json::from_slice(input)?;
        let Value::Object(root) = value else {
            return Err(LinkListError::RootNotObject);
        };
        if let Some(frameworks) = root.get(FRAMEWORKS_KEY) {
            if !frameworks.is_array() {
                return Err(LinkListError::FrameworksNotArray(json_type(frameworks)));
            }
        }
        if let Some(settings) = root.get(BUILD_SETTINGS_KEY) {
            if !settings.is_object() {
                return Err(LinkListError::BuildSettingsNotObject(json_type(settings)));
            }
        }
        Ok(Self { root })
    }

    /// Pretty JSON, two-space indent, trailing newline
    pub fn to_json_string(&self) -> Result<String, LinkListError> {
        let mut out = serde_json::to_string_pretty(&self.root)?;
        out.push('\n');
        Ok(out)
    }

    fn frameworks(&self) -> &[Value] {
        self.root
            .get(FRAMEWORKS_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `None` only when `frameworks` holds a non-array, which `parse` rejects
    fn frameworks_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.root
            .entry(FRAMEWORKS_KEY)
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
    }

    /// Entries in list order; entries without a string `name` are skipped
    /// but still count toward positions.
    pub fn entries(&self) -> Vec<(usize, FrameworkEntry)> {
        self.frameworks()
            .iter()
            .enumerate()
            .filter_map(|(index, value)| entry_of(value).map(|entry| (index, entry)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.frameworks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frameworks().is_empty()
    }

    /// Append a new `{name, link}` entry
    pub fn append_framework(&mut self, name: &str, mode: LinkMode) {
        self.append(framework_entry(name, mode));
    }

    /// Replace the entry at `index` with one linked as `mode`
    ///
    /// The entry keeps its position and any fields besides `link`. Returns
    /// `false` when `index` is out of range or the entry is not an object.
    pub(crate) fn replace_link_mode(&mut self, index: usize, mode: LinkMode) -> bool {
        let Some(Value::Object(entry)) = self
            .frameworks_mut()
            .and_then(|items| items.get_mut(index))
        else {
            return false;
        };
        entry.insert(LINK_KEY.to_string(), Value::String(mode.as_str().to_string()));
        true
    }

    /// The raw `link` of the entry at `index` when it is set to something
    /// other than a known mode
    pub fn unrecognized_link(&self, index: usize) -> Option<String> {
        let link = self.frameworks().get(index)?.get(LINK_KEY)?;
        match link.as_str().and_then(LinkMode::parse) {
            Some(_) => None,
            None => Some(link.to_string()),
        }
    }

    /// Value of a build setting; non-string values read as absent
    pub fn build_setting(&self, key: &str) -> Option<&str> {
        self.root
            .get(BUILD_SETTINGS_KEY)?
            .as_object()?
            .get(key)?
            .as_str()
    }

    /// Set a build setting in place, creating `build_settings` when needed
    ///
    /// Returns the value it replaced. A new key goes after the existing ones.
    pub fn set_build_setting(&mut self, key: &str, value: &str) -> Option<Value> {
        let settings = self
            .root
            .entry(BUILD_SETTINGS_KEY)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()?;
        settings.insert(key.to_string(), Value::String(value.to_string()))
    }
}

impl AppendOnly for LinkListDocument {
    type Item = Value;

    fn items(&self) -> &[Value] {
        self.frameworks()
    }

    fn append(&mut self, item: Value) {
        if let Some(items) = self.frameworks_mut() {
            items.push(item);
        }
    }
}

/// `{"name": .., "link": ..}` entry object
pub fn framework_entry(name: &str, mode: LinkMode) -> Value {
    let mut entry = Map::new();
    entry.insert(NAME_KEY.to_string(), Value::String(name.to_string()));
    entry.insert(LINK_KEY.to_string(), Value::String(mode.as_str().to_string()));
    Value::Object(entry)
}

/// The `name` of an entry object, if it has a string one
pub fn entry_name(value: &Value) -> Option<&str> {
    value.get(NAME_KEY)?.as_str()
}

fn entry_of(value: &Value) -> Option<FrameworkEntry> {
    let name = entry_name(value)?;
    let mode = value
        .get(LINK_KEY)
        .and_then(Value::as_str)
        .and_then(LinkMode::parse)
        .unwrap_or_default();
    Some(FrameworkEntry {
        name: name.to_string(),
        mode,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
