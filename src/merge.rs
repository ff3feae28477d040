//! Merging resolved objects into one painted mesh

use crate::error::{Error, Result};
use crate::extruder::ExtruderMap;
use crate::model::{DEFAULT_COLOR, IDENTITY_TRANSFORM, MeshObject};
use crate::paint::encode_paint_state;
use crate::parser::ColorTally;
use tracing::debug;

/// Id of the single merged object
pub const MERGED_OBJECT_ID: usize = 1;

/// Name of the single merged object
pub const MERGED_OBJECT_NAME: &str = "merged";

/// All objects combined into one mesh with per-triangle paint states
#[derive(Debug, Clone, PartialEq)]
pub struct MergedMesh {
    /// The combined object, colored with the default color
    pub object: MeshObject,
    /// One entry per triangle of `object`; empty for default-colored triangles
    pub paint_states: Vec<String>,
    /// Extruder slot of the color covering the most triangles (0 when empty)
    pub default_slot: u32,
}

impl MergedMesh {
    /// Number of triangles carrying an explicit paint state
    pub fn painted_count(&self) -> usize {
        self.paint_states.iter().filter(|s| !s.is_empty()).count()
    }
}

/// Concatenate `objects` into one mesh, painting non-default colors
///
/// The default color is the one covering the most triangles; ties go to the
/// color seen first in build order. Vertex indices of each object are shifted
/// by the number of vertices appended before it.
pub fn merge_painted(objects: &[MeshObject], extruders: &ExtruderMap) -> Result<MergedMesh> {
    let mut tally = ColorTally::new();
    for object in objects {
        tally.add(&object.color, object.triangles.len());
    }
    let default_color = tally.winner();
    let default_slot = match &default_color {
        Some(color) => slot_for(extruders, color)?,
        None => 0,
    };

    let mut merged = MeshObject::new(MERGED_OBJECT_NAME, MERGED_OBJECT_ID)
        .with_color(default_color.as_deref().unwrap_or(DEFAULT_COLOR));
    merged.transform = objects
        .first()
        .map(|o| o.transform)
        .unwrap_or(IDENTITY_TRANSFORM);

    let vertex_total = objects.iter().map(|o| o.vertices.len()).sum();
    let triangle_total = objects.iter().map(|o| o.triangles.len()).sum();
    merged.vertices.reserve(vertex_total);
    merged.triangles.reserve(triangle_total);
    let mut paint_states = Vec::with_capacity(triangle_total);

    for object in objects {
        let offset = merged.vertices.len();
        let slot = slot_for(extruders, &object.color)?;
        let state = if slot == default_slot {
            String::new()
        } else {
            encode_paint_state(slot)
        };

        merged.vertices.extend_from_slice(&object.vertices);
        merged
            .triangles
            .extend(object.triangles.iter().map(|t| t.offset(offset)));
        paint_states.extend(std::iter::repeat_n(state, object.triangles.len()));
    }

    let result = MergedMesh {
        object: merged,
        paint_states,
        default_slot,
    };
    debug!(
        objects = objects.len(),
        vertices = result.object.vertices.len(),
        triangles = result.object.triangles.len(),
        painted = result.painted_count(),
        default_slot,
        "merged objects"
    );
    Ok(result)
}

fn slot_for(extruders: &ExtruderMap, color: &str) -> Result<u32> {
    extruders
        .slot(color)
        .ok_or_else(|| Error::UnmappedColor(color.to_string()))
}
