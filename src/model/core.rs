//! Core data structures shared by every conversion stage

use std::fmt;

/// Placement transform: a 3x4 affine matrix stored as 12 values in the 3MF order
///
/// Format: `[m00 m01 m02 m10 m11 m12 m20 m21 m22 tx ty tz]`
pub type Transform = [f64; 12];

/// Identity placement
pub const IDENTITY_TRANSFORM: Transform =
    [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];

/// Unit used when the root model part declares none
pub const DEFAULT_UNIT: &str = "millimeter";

/// Render a transform as the space-separated attribute value 3MF expects
pub fn format_transform(transform: &Transform) -> String {
    transform
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A 3D vertex with x, y, z coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Vertex {
    /// Create a new vertex
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A triangle defined by three vertex indices into its mesh's vertex list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// Index of first vertex
    pub v1: usize,
    /// Index of second vertex
    pub v2: usize,
    /// Index of third vertex
    pub v3: usize,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v1: usize, v2: usize, v3: usize) -> Self {
        Self { v1, v2, v3 }
    }

    /// Return this triangle with every index shifted by `offset`
    pub fn offset(self, offset: usize) -> Self {
        Self {
            v1: self.v1 + offset,
            v2: self.v2 + offset,
            v3: self.v3 + offset,
        }
    }

    /// Largest vertex index referenced by this triangle
    pub fn max_index(&self) -> usize {
        self.v1.max(self.v2).max(self.v3)
    }
}

/// A fully resolved mesh object ready for extruder mapping and emission
///
/// Every triangle index is below `vertices.len()`; the resolver and the
/// merger both preserve that.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshObject {
    /// Display name (`object_<id>` when the source declared none)
    pub name: String,
    /// Object id within its source part
    pub id: usize,
    /// Vertex positions in declaration order
    pub vertices: Vec<Vertex>,
    /// Triangles in declaration order
    pub triangles: Vec<Triangle>,
    /// Normalized `#RRGGBB` color
    pub color: String,
    /// Absolute placement from the build item that referenced this object
    pub transform: Transform,
}

impl MeshObject {
    /// Create an empty object with the default color and identity placement
    pub fn new(name: impl Into<String>, id: usize) -> Self {
        Self {
            name: name.into(),
            id,
            vertices: Vec::new(),
            triangles: Vec::new(),
            color: super::DEFAULT_COLOR.to_string(),
            transform: IDENTITY_TRANSFORM,
        }
    }

    /// Set the color, normalizing it first
    pub fn with_color(mut self, color: &str) -> Self {
        self.color = super::normalize_color(color);
        self
    }
}

/// The flat, build-ordered result of component resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    /// Resolved objects in build order
    pub objects: Vec<MeshObject>,
    /// Unit of measurement declared by the root model part
    pub unit: String,
}

impl ResolvedModel {
    /// Create an empty model in millimeters
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            unit: DEFAULT_UNIT.to_string(),
        }
    }

    /// Total number of triangles across all objects
    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(|o| o.triangles.len()).sum()
    }
}

impl Default for ResolvedModel {
    fn default() -> Self {
        Self::new()
    }
}

/// A component or build item that pointed at an object id its part does not define
///
/// The branch contributes no objects and the conversion continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveWarning {
    /// Part in which the object id was looked up
    pub part: String,
    /// The missing object id
    pub object_id: usize,
    /// What held the reference (`build item 0`, `object 3, component 1`)
    pub referenced_from: String,
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} references object {} which is not defined in '{}'",
            self.referenced_from, self.object_id, self.part
        )
    }
}

/// A preview image supplied by an external renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Plain file name, e.g. `plate_1.png`
    pub filename: String,
    /// Raw encoded image bytes
    pub data: Vec<u8>,
}

impl Thumbnail {
    /// Create a new thumbnail entry
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }
}
