//! Extruder slot assignment

use crate::model::MeshObject;
use tracing::debug;

/// Mapping from normalized color to a 1-based extruder slot
///
/// Slots follow the order in which colors first appear in the build, so the
/// same resolved model always yields the same map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtruderMap {
    colors: Vec<String>,
}

impl ExtruderMap {
    /// Assign slots to the distinct colors of `objects`, in build order
    pub fn from_objects(objects: &[MeshObject]) -> Self {
        let mut map = Self::default();
        for object in objects {
            if map.slot(&object.color).is_none() {
                map.colors.push(object.color.clone());
                debug!(color = %object.color, slot = map.colors.len(), "assigned extruder");
            }
        }
        map
    }

    /// Slot assigned to `color`
    pub fn slot(&self, color: &str) -> Option<u32> {
        self.colors
            .iter()
            .position(|c| c == color)
            .map(|i| i as u32 + 1)
    }

    /// Color assigned to `slot`
    pub fn color(&self, slot: u32) -> Option<&str> {
        let index = (slot as usize).checked_sub(1)?;
        self.colors.get(index).map(String::as_str)
    }

    /// `(color, slot)` pairs in slot order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.colors
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i as u32 + 1))
    }

    /// Number of distinct colors
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether no color has been assigned
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
