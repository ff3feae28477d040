//! Color lookup tables built from material resources

use std::collections::HashMap;

/// Color assigned when neither the object nor its triangles name one
pub const DEFAULT_COLOR: &str = "#808080";

/// Normalize a 3MF display color to `#RRGGBB`
///
/// `#RRGGBBAA` drops its alpha channel and hex digits are upper-cased, so
/// `#11223344` and `#112233` map to the same extruder. Values that are not
/// hex colors are returned trimmed but otherwise untouched.
pub fn normalize_color(color: &str) -> String {
    let color = color.trim();
    let Some(hex) = color.strip_prefix('#') else {
        return color.to_string();
    };

    if (hex.len() == 6 || hex.len() == 8) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        format!("#{}", hex[..6].to_ascii_uppercase())
    } else {
        color.to_string()
    }
}

/// Mapping from (material group id, index within group) to a normalized color
///
/// Scoped to one part. When resolution descends into a sub-part, the
/// sub-part's map is laid over the ambient one with [`ColorMap::overlaid`],
/// which returns a new map and leaves both inputs untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMap {
    entries: HashMap<(usize, usize), String>,
}

impl ColorMap {
    /// Create an empty color map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a color for a group entry, normalizing it
    pub fn insert(&mut self, group_id: usize, index: usize, color: &str) {
        self.entries
            .insert((group_id, index), normalize_color(color));
    }

    /// Look up the color for a group entry
    pub fn get(&self, group_id: usize, index: usize) -> Option<&str> {
        self.entries.get(&(group_id, index)).map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy of this map with `local` laid over it; `local` wins on collisions
    pub fn overlaid(&self, local: &ColorMap) -> ColorMap {
        let mut merged = self.clone();
        merged
            .entries
            .extend(local.entries.iter().map(|(k, v)| (*k, v.clone())));
        merged
    }
}
