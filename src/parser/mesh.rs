//! Mesh extraction and per-triangle color voting

use crate::error::{Error, Result};
use crate::model::{ColorMap, Triangle, Vertex};

/// A triangle as declared in the part, with its optional color property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleRecord {
    /// Vertex indices
    pub triangle: Triangle,
    /// Property group id (`pid`)
    pub pid: Option<usize>,
    /// Property index for the first vertex (`p1`), used as the triangle's color
    pub p1: Option<usize>,
}

impl TriangleRecord {
    /// A triangle without a color property
    pub fn new(v1: usize, v2: usize, v3: usize) -> Self {
        Self {
            triangle: Triangle::new(v1, v2, v3),
            pid: None,
            p1: None,
        }
    }
}

/// Mesh content of one object element, as parsed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertices in declaration order
    pub vertices: Vec<Vertex>,
    /// Triangles in declaration order
    pub triangles: Vec<TriangleRecord>,
}

/// Mesh geometry plus the color its triangles voted for
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMesh {
    /// Vertices in declaration order
    pub vertices: Vec<Vertex>,
    /// Triangles in declaration order
    pub triangles: Vec<Triangle>,
    /// Most frequent triangle color, if any triangle named one
    pub voted_color: Option<String>,
}

impl MeshData {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every triangle references existing, distinct vertices
    pub fn validate(&self, part: &str, object_id: usize) -> Result<()> {
        let vertex_count = self.vertices.len();
        for (idx, record) in self.triangles.iter().enumerate() {
            let t = record.triangle;
            if t.max_index() >= vertex_count {
                return Err(Error::malformed_mesh(
                    part,
                    format!(
                        "object {} triangle {}: vertex index {} out of range (mesh has {} vertices)",
                        object_id,
                        idx,
                        t.max_index(),
                        vertex_count
                    ),
                ));
            }
            if t.v1 == t.v2 || t.v2 == t.v3 || t.v1 == t.v3 {
                return Err(Error::malformed_mesh(
                    part,
                    format!(
                        "object {} triangle {}: vertex indices {} {} {} are not distinct",
                        object_id, idx, t.v1, t.v2, t.v3
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Produce geometry and the majority triangle color under `colors`
    ///
    /// `object_pid` is the owning object's property group, inherited by
    /// triangles that carry `p1` without their own `pid`.
    pub fn extract(&self, colors: &ColorMap, object_pid: Option<usize>) -> ExtractedMesh {
        let mut tally = ColorTally::new();
        for record in &self.triangles {
            if let (Some(pid), Some(p1)) = (record.pid.or(object_pid), record.p1)
                && let Some(color) = colors.get(pid, p1)
            {
                tally.vote(color);
            }
        }

        ExtractedMesh {
            vertices: self.vertices.clone(),
            triangles: self.triangles.iter().map(|r| r.triangle).collect(),
            voted_color: tally.winner(),
        }
    }
}

/// Vote counter that remembers first-seen order
///
/// Ties go to the color that was voted for first, independent of hashing.
#[derive(Debug, Default)]
pub(crate) struct ColorTally {
    counts: Vec<(String, usize)>,
}

impl ColorTally {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn vote(&mut self, color: &str) {
        self.add(color, 1);
    }

    pub(crate) fn add(&mut self, color: &str, votes: usize) {
        match self.counts.iter_mut().find(|(c, _)| c == color) {
            Some((_, count)) => *count += votes,
            None => self.counts.push((color.to_string(), votes)),
        }
    }

    /// The color with the most votes; earliest first-seen on ties
    pub(crate) fn winner(&self) -> Option<String> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.counts {
            if best.is_none_or(|b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(color, _)| color.clone())
    }
}
