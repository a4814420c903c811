//! Framework link list: match by name, append or promote
//!
//! Promotion only goes from required to weak. A framework already linked
//! weak is left alone when a fact asks for required, and a required entry is
//! relinked at its existing position so build order does not move. An entry
//! whose link mode is not recognized fails its fact and stays as written.
//!
//! The list is owned by this tool, so a missing file starts from an empty
//! document.

use super::{Change, Descriptor};
use crate::errors::{ReconError, Result};
use crate::facts::{DocumentKind, Fact, LinkMode};
use crate::matcher::{find_framework, FrameworkMatch};
use crate::merge::match_then_append;
use crate::model::link_list::{entry_name, LinkListDocument};
use crate::patch;

const FRAMEWORKS_ANCHOR: &str = "frameworks array";

pub struct LinkListDescriptor {
    doc: LinkListDocument,
}

impl LinkListDescriptor {
    pub fn document(&self) -> &LinkListDocument {
        &self.doc
    }

    fn apply_framework(&mut self, fact: &Fact, name: &str, mode: LinkMode) -> Result<Change> {
        match find_framework(&self.doc, name) {
            FrameworkMatch::Present {
                index,
                mode: existing,
            } => {
                if !existing.needs_promotion_to(mode) {
                    return Ok(Change::Unchanged);
                }
                if !self.doc.replace_link_mode(index, mode) {
                    return Err(ReconError::fact(
                        fact,
                        format!("entry {} cannot be relinked", index),
                    ));
                }
                Ok(Change::Promoted {
                    from: existing,
                    to: mode,
                })
            }
            FrameworkMatch::UnrecognizedLink { index, link } => Err(ReconError::fact(
                fact,
                format!("entry {} has unrecognized link {}, left as is", index, link),
            )),
            FrameworkMatch::Absent => Ok(match_then_append(
                &mut self.doc,
                |entry| entry_name(entry) == Some(name),
                || patch::framework_entry(name, mode),
            )
            .into()),
        }
    }

    fn apply_build_setting(&mut self, key: &str, value: &str) -> Change {
        if self.doc.build_setting(key) == Some(value) {
            return Change::Unchanged;
        }
        match self.doc.set_build_setting(key, value) {
            None => Change::Appended,
            Some(previous) => Change::Replaced {
                previous: previous.to_string(),
            },
        }
    }
}

impl Descriptor for LinkListDescriptor {
    type Anchor = ();

    const KIND: DocumentKind = DocumentKind::LinkList;

    fn parse(input: &[u8]) -> Result<Self> {
        let doc = LinkListDocument::parse(input).map_err(|e| ReconError::Parse {
            document: Self::KIND,
            reason: e.to_string(),
        })?;
        Ok(Self { doc })
    }

    fn empty() -> Option<Self> {
        Some(Self {
            doc: LinkListDocument::new(),
        })
    }

    fn locate_anchor(&self) -> Result<()> {
        Ok(())
    }

    fn describe_anchor(&self, _anchor: &()) -> Option<String> {
        Some(FRAMEWORKS_ANCHOR.to_string())
    }

    fn apply_fact(&mut self, _anchor: &(), fact: &Fact) -> Result<Change> {
        match fact {
            Fact::Framework { name, mode } => self.apply_framework(fact, name, *mode),
            Fact::BuildSetting { key, value } => Ok(self.apply_build_setting(key, value)),
            _ => Err(ReconError::fact(fact, "not a link list fact")),
        }
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        let text = self.doc.to_json_string().map_err(|e| ReconError::Serialize {
            document: Self::KIND,
            reason: e.to_string(),
        })?;
        Ok(text.into_bytes())
    }
}
