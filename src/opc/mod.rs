//! OPC (Open Packaging Conventions) handling for 3MF files
//!
//! 3MF files are ZIP archives following the OPC standard, containing
//! the main 3D model part, optional sub-model parts and relationships.

mod reader;
mod relationships;
mod writer;

pub use reader::Package;
pub use writer::{PackageEntry, write_entries};

/// Main 3D model file path within the 3MF archive
pub const MODEL_PATH: &str = "3D/3dmodel.model";

/// Content types file path
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Relationships file path
pub const RELS_PATH: &str = "_rels/.rels";

/// Model relationships file path
pub const MODEL_RELS_PATH: &str = "3D/_rels/3dmodel.model.rels";

/// Directory holding one sub-model part per emitted object
pub const OBJECTS_DIR: &str = "3D/Objects";

/// Slicer settings document path
pub const SETTINGS_PATH: &str = "Metadata/model_settings.config";

/// Thumbnail name that doubles as the package thumbnail
pub const PLATE_THUMBNAIL: &str = "plate_1.png";

/// Package thumbnail path
pub const PLATE_THUMBNAIL_PATH: &str = "Metadata/plate_1.png";

/// Directory receiving every supplied thumbnail
pub const THUMBNAILS_DIR: &str = "Auxiliaries/.thumbnails";

/// 3D model relationship type
pub const MODEL_REL_TYPE: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel";

/// Thumbnail relationship type (OPC standard)
pub const THUMBNAIL_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/thumbnail";

/// Content type of relationship parts
pub const RELS_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Content type of 3D model parts
pub const MODEL_CONTENT_TYPE: &str = "application/vnd.ms-package.3dmanufacturing-3dmodel+xml";

/// Archive path of the n-th (1-based) object sub-part
pub fn object_part_path(n: usize) -> String {
    format!("{}/object_{}.model", OBJECTS_DIR, n)
}

/// Normalize a part reference to an archive entry name
///
/// Strips the leading slash OPC part names carry and decodes percent-encoded
/// characters, since ZIP entry names store the decoded form.
pub fn normalize_part_name(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('/');
    match urlencoding::decode(trimmed) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => trimmed.to_string(),
    }
}
