//! Document models for the three artifact shapes
//!
//! - [`tree`]: ordered attributed element tree (Android manifest)
//! - [`plist`]: ordered key/array/dict document (entitlements, Info.plist)
//! - [`link_list`]: flat named-entry list (framework links)

pub mod link_list;
pub mod plist;
pub mod tree;
pub mod xml_codec;

pub use link_list::{FrameworkEntry, LinkListDocument, LinkListError};
pub use plist::{PlistArray, PlistDict, PlistDocument, PlistError, PlistValue, TypeMismatch};
pub use tree::{Attribute, Element, ElementPath, Namespace, Node, XmlDocument, ANDROID, ANDROID_NS};
pub use xml_codec::XmlCodecError;
