//! Material resource parsing
//!
//! Builds the part's [`ColorMap`] from `basematerials` groups and from
//! materials-extension `colorgroup` groups. Entries are indexed by their
//! 0-based position within the group.

use crate::error::{Error, Result};
use crate::model::{ColorMap, DEFAULT_COLOR};
use quick_xml::events::BytesStart;

use super::parse_attributes;

/// A material group whose entries are being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct OpenGroup {
    /// Declared resource id
    pub id: usize,
    /// Index the next entry will receive
    pub next_index: usize,
}

impl OpenGroup {
    /// Record the next entry's color and advance the index
    pub fn push(&mut self, colors: &mut ColorMap, color: &str) {
        colors.insert(self.id, self.next_index, color);
        self.next_index += 1;
    }
}

/// Parse a `basematerials` or `colorgroup` start element
pub(super) fn parse_group_start(e: &BytesStart, element: &str) -> Result<OpenGroup> {
    let attrs = parse_attributes(e)?;
    let id = attrs
        .get("id")
        .ok_or_else(|| Error::missing_attribute(element, "id"))?
        .parse::<usize>()?;
    Ok(OpenGroup { id, next_index: 0 })
}

/// Color of a `base` element; materials without a display color are gray
pub(super) fn parse_base_color(e: &BytesStart) -> Result<String> {
    let attrs = parse_attributes(e)?;
    Ok(attrs
        .get("displaycolor")
        .cloned()
        .unwrap_or_else(|| DEFAULT_COLOR.to_string()))
}

/// Color of a `color` element inside a `colorgroup`
pub(super) fn parse_group_color(e: &BytesStart) -> Result<String> {
    let attrs = parse_attributes(e)?;
    Ok(attrs
        .get("color")
        .cloned()
        .unwrap_or_else(|| DEFAULT_COLOR.to_string()))
}
