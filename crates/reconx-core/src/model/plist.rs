//! XML property list document
//!
//! An ordered key/array/dict model. Dictionaries keep their keys in file
//! order; new keys are appended. Arrays are append-only through
//! [`AppendOnly`]. Serialization follows the layout Xcode writes (tab
//! indentation, Apple DOCTYPE), so a document that went through one
//! reconciliation is byte-stable on the next.

use crate::merge::AppendOnly;
use crate::model::xml_codec::{decode, escape_text, XmlCodecError};
use thiserror::Error;

const PLIST_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
    "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
);

#[derive(Error, Debug)]
pub enum PlistError {
    #[error(transparent)]
    Xml(#[from] XmlCodecError),

    #[error("root element is <{0}>, expected <plist>")]
    NotAPlist(String),

    #[error("top-level value must be a <dict>")]
    RootNotDict,

    #[error("unsupported plist element <{0}>")]
    UnknownElement(String),

    #[error("<dict> entry {0} is missing its <key>")]
    MissingKey(usize),

    #[error("key {0:?} has no value")]
    MissingValue(String),

    #[error("invalid <integer> value {0:?}")]
    InvalidInteger(String),
}

/// Value stored in a plist
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    String(String),
    Integer(i64),
    /// Kept as written so formatting does not drift
    Real(String),
    Boolean(bool),
    Date(String),
    /// Base64 payload with whitespace removed
    Data(String),
    Array(PlistArray),
    Dict(PlistDict),
}

impl PlistValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlistValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&PlistDict> {
        match self {
            PlistValue::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&PlistArray> {
        match self {
            PlistValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Element name used for this value in XML
    pub fn type_name(&self) -> &'static str {
        match self {
            PlistValue::String(_) => "string",
            PlistValue::Integer(_) => "integer",
            PlistValue::Real(_) => "real",
            PlistValue::Boolean(true) => "true",
            PlistValue::Boolean(false) => "false",
            PlistValue::Date(_) => "date",
            PlistValue::Data(_) => "data",
            PlistValue::Array(_) => "array",
            PlistValue::Dict(_) => "dict",
        }
    }
}

/// Ordered array; append-only
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlistArray(Vec<PlistValue>);

impl PlistArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlistValue> {
        self.0.iter()
    }

    pub fn push(&mut self, value: PlistValue) {
        self.0.push(value);
    }
}

impl AppendOnly for PlistArray {
    type Item = PlistValue;

    fn items(&self) -> &[PlistValue] {
        &self.0
    }

    fn append(&mut self, item: PlistValue) {
        self.push(item);
    }
}

impl FromIterator<PlistValue> for PlistArray {
    fn from_iter<I: IntoIterator<Item = PlistValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The value found under a key did not have the expected type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("key {key:?} holds <{found}>, expected <{expected}>")]
pub struct TypeMismatch {
    pub key: String,
    pub expected: &'static str,
    pub found: &'static str,
}

/// Ordered dictionary
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlistDict {
    entries: Vec<(String, PlistValue)>,
}

impl PlistDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlistValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Set `key`, replacing the value in place or appending a new entry
    pub fn set(&mut self, key: impl Into<String>, value: PlistValue) {
        let key = key.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`PlistDict::set`]
    pub fn with(mut self, key: impl Into<String>, value: PlistValue) -> Self {
        self.set(key, value);
        self
    }

    /// Array under `key`, created empty at the end of the dict if absent
    pub fn array_entry(&mut self, key: &str) -> Result<&mut PlistArray, TypeMismatch> {
        let index = match self.position(key) {
            Some(i) => i,
            None => {
                self.entries
                    .push((key.to_string(), PlistValue::Array(PlistArray::new())));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[index].1 {
            PlistValue::Array(array) => Ok(array),
            other => Err(TypeMismatch {
                key: key.to_string(),
                expected: "array",
                found: other.type_name(),
            }),
        }
    }
}

/// A property list whose top-level value is a dictionary
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlistDocument {
    pub root: PlistDict,
}

impl PlistDocument {
    /// Empty document, as written for a file that does not exist yet
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(input: &[u8]) -> Result<Self, PlistError> {
        let text = decode(input)?;
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;
        let parsed =
            roxmltree::Document::parse_with_options(text, options).map_err(XmlCodecError::from)?;

        let plist = parsed.root_element();
        if plist.tag_name().name() != "plist" {
            return Err(PlistError::NotAPlist(plist.tag_name().name().to_string()));
        }
        let top = plist.children().find(|n| n.is_element());
        match top.map(parse_value).transpose()? {
            Some(PlistValue::Dict(root)) => Ok(Self { root }),
            Some(_) => Err(PlistError::RootNotDict),
            None => Ok(Self::new()),
        }
    }

    pub fn to_xml_string(&self) -> String {
        let mut out = String::from(PLIST_HEADER);
        out.push_str("<plist version=\"1.0\">\n");
        write_dict(&mut out, &self.root, 0);
        out.push_str("</plist>\n");
        out
    }
}

/// All text of a scalar element, including text split by comments
fn text_content(node: roxmltree::Node<'_, '_>) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn parse_value(node: roxmltree::Node<'_, '_>) -> Result<PlistValue, PlistError> {
    let name = node.tag_name().name();
    let text = || text_content(node);
    let value = match name {
        "string" => PlistValue::String(text()),
        "integer" => {
            let raw = text();
            let parsed = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| PlistError::InvalidInteger(raw.clone()))?;
            PlistValue::Integer(parsed)
        }
        "real" => PlistValue::Real(text().trim().to_string()),
        "true" => PlistValue::Boolean(true),
        "false" => PlistValue::Boolean(false),
        "date" => PlistValue::Date(text().trim().to_string()),
        "data" => PlistValue::Data(text().split_whitespace().collect()),
        "array" => PlistValue::Array(
            node.children()
                .filter(|n| n.is_element())
                .map(parse_value)
                .collect::<Result<PlistArray, _>>()?,
        ),
        "dict" => PlistValue::Dict(parse_dict(node)?),
        other => return Err(PlistError::UnknownElement(other.to_string())),
    };
    Ok(value)
}

fn parse_dict(node: roxmltree::Node<'_, '_>) -> Result<PlistDict, PlistError> {
    let mut dict = PlistDict::new();
    let mut children = node.children().filter(|n| n.is_element()).enumerate();
    while let Some((index, key_node)) = children.next() {
        if key_node.tag_name().name() != "key" {
            return Err(PlistError::MissingKey(index / 2));
        }
        let key = text_content(key_node);
        let (_, value_node) = children
            .next()
            .ok_or_else(|| PlistError::MissingValue(key.clone()))?;
        // Keep duplicate keys as separate entries so nothing is dropped
        dict.entries.push((key, parse_value(value_node)?));
    }
    Ok(dict)
}

fn write_value(out: &mut String, value: &PlistValue, depth: usize) {
    match value {
        PlistValue::String(s) => write_scalar(out, depth, "string", &escape_text(s)),
        PlistValue::Integer(i) => write_scalar(out, depth, "integer", &i.to_string()),
        PlistValue::Real(r) => write_scalar(out, depth, "real", r),
        PlistValue::Date(d) => write_scalar(out, depth, "date", d),
        PlistValue::Data(d) => write_scalar(out, depth, "data", d),
        PlistValue::Boolean(_) => {
            indent(out, depth);
            out.push_str(&format!("<{}/>\n", value.type_name()));
        }
        PlistValue::Array(array) => {
            indent(out, depth);
            if array.is_empty() {
                out.push_str("<array/>\n");
                return;
            }
            out.push_str("<array>\n");
            for item in array.iter() {
                write_value(out, item, depth + 1);
            }
            indent(out, depth);
            out.push_str("</array>\n");
        }
        PlistValue::Dict(dict) => write_dict(out, dict, depth),
    }
}

fn write_dict(out: &mut String, dict: &PlistDict, depth: usize) {
    indent(out, depth);
    if dict.is_empty() {
        out.push_str("<dict/>\n");
        return;
    }
    out.push_str("<dict>\n");
    for (key, value) in dict.iter() {
        write_scalar(out, depth + 1, "key", &escape_text(key));
        write_value(out, value, depth + 1);
    }
    indent(out, depth);
    out.push_str("</dict>\n");
}

fn write_scalar(out: &mut String, depth: usize, tag: &str, body: &str) {
    indent(out, depth);
    out.push_str(&format!("<{tag}>{body}</{tag}>\n"));
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}
