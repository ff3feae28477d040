//! Data structures for resolved 3MF content

mod color;
mod config;
mod core;

pub use color::{ColorMap, DEFAULT_COLOR, normalize_color};
pub use config::{ConvertConfig, DEFAULT_MAX_DEPTH, OutputMode};
pub use core::{
    DEFAULT_UNIT, IDENTITY_TRANSFORM, MeshObject, ResolveWarning, ResolvedModel, Thumbnail,
    Transform, Triangle, Vertex, format_transform,
};
