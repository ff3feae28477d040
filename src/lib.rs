//! # bambu3mf
//!
//! Convert standard 3MF packages into the layout Bambu Studio loads, with
//! colors mapped to extruders.
//!
//! The conversion runs in four stages:
//!
//! - **Resolve**: follow build items and components through the root model
//!   part and any referenced sub-parts, giving one colored mesh per source object
//! - **Map**: assign a 1-based extruder slot to each distinct color, in build order
//! - **Merge**: optionally combine all objects into one mesh whose non-default
//!   triangles carry a `paint_color` state
//! - **Emit**: write the Bambu Studio package (model parts, relationships and
//!   `Metadata/model_settings.config`)
//!
//! The library logs through [`tracing`] and never installs a subscriber.
//!
//! ## Example
//!
//! ```no_run
//! use bambu3mf::{ConvertConfig, OutputMode, convert_file};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConvertConfig::new().with_mode(OutputMode::Painted);
//! let report = convert_file("model.3mf", "model_bambu.3mf", &[], &config)?;
//!
//! println!(
//!     "{} objects, {} extruders, {} painted triangles",
//!     report.objects,
//!     report.extruders.len(),
//!     report.painted_triangles
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extruder;
pub mod merge;
pub mod model;
pub mod opc;
pub mod paint;
pub mod parser;
pub mod resolver;
pub mod writer;

pub use error::{Error, Result};
pub use extruder::ExtruderMap;
pub use merge::{MergedMesh, merge_painted};
pub use model::{
    ColorMap, ConvertConfig, MeshObject, OutputMode, ResolveWarning, ResolvedModel, Thumbnail,
    Transform, Triangle, Vertex, normalize_color,
};
pub use paint::{decode_paint_state, encode_paint_state};
pub use resolver::Resolution;
pub use writer::{EmitSummary, write_package};

use opc::{Package, PackageEntry};
use resolver::Resolver;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info};

/// Summary of one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Objects resolved from the input package
    pub objects: usize,
    /// Color to extruder assignment
    pub extruders: ExtruderMap,
    /// Extruder of the merged object, in painted mode
    pub default_slot: Option<u32>,
    /// Triangles carrying an explicit paint state
    pub painted_triangles: usize,
    /// Thumbnails stored in the output
    pub thumbnails: usize,
    /// References skipped during resolution
    pub warnings: Vec<ResolveWarning>,
}

/// Open a 3MF package and resolve its build into colored mesh objects
///
/// # Errors
///
/// [`Error::PackageCorrupt`] for unreadable archives or missing sub-parts,
/// [`Error::NoModelPart`] when no model part exists, [`Error::MalformedMesh`]
/// for bad geometry and [`Error::NoObjectsResolved`] when nothing resolves.
/// References to undefined objects are not errors; they are returned in
/// [`Resolution::warnings`].
pub fn parse_package<R: Read + Seek>(reader: R, config: &ConvertConfig) -> Result<Resolution> {
    let mut package = Package::open(reader)?;
    let root = package.root_model_path()?;
    debug!(root = %root, entries = package.len(), "located root model part");

    let resolution = Resolver::new(&mut package, config.max_depth()).resolve(&root)?;
    info!(
        objects = resolution.model.objects.len(),
        triangles = resolution.model.triangle_count(),
        warnings = resolution.warnings.len(),
        "resolved input package"
    );
    Ok(resolution)
}

/// Resolve the input and build every output archive entry in memory
fn prepare<R: Read + Seek>(
    reader: R,
    thumbnails: &[Thumbnail],
    config: &ConvertConfig,
) -> Result<(Vec<PackageEntry>, ConversionReport)> {
    info!(mode = config.mode().name(), "starting conversion");
    let resolution = parse_package(reader, config)?;
    let extruders = ExtruderMap::from_objects(&resolution.model.objects);
    let (entries, summary) =
        writer::package_entries(&resolution.model, &extruders, thumbnails, config.mode())?;

    let report = ConversionReport {
        objects: resolution.model.objects.len(),
        extruders,
        default_slot: summary.default_slot,
        painted_triangles: summary.painted_triangles,
        thumbnails: summary.thumbnails,
        warnings: resolution.warnings,
    };
    info!(
        objects = report.objects,
        extruders = report.extruders.len(),
        painted = report.painted_triangles,
        thumbnails = report.thumbnails,
        entries = entries.len(),
        "conversion prepared"
    );
    Ok((entries, report))
}

/// Convert a 3MF package read from `reader` into a Bambu Studio package
///
/// Nothing is written to `writer` unless the whole conversion succeeds up to
/// the final archive write.
///
/// # Returns
///
/// Returns the writer after finishing the ZIP archive, plus a report
pub fn convert<R: Read + Seek, W: Write + Seek>(
    reader: R,
    writer: W,
    thumbnails: &[Thumbnail],
    config: &ConvertConfig,
) -> Result<(W, ConversionReport)> {
    let (entries, report) = prepare(reader, thumbnails, config)?;
    let writer = opc::write_entries(writer, &entries)?;
    Ok((writer, report))
}

/// Convert the file at `input` and write the result to `output`
///
/// The output file is only created once the input resolved successfully.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    thumbnails: &[Thumbnail],
    config: &ConvertConfig,
) -> Result<ConversionReport> {
    let reader = BufReader::new(File::open(input.as_ref())?);
    let (entries, report) = prepare(reader, thumbnails, config)?;

    let file = BufWriter::new(File::create(output.as_ref())?);
    let mut file = opc::write_entries(file, &entries)?;
    file.flush()?;

    info!(output = %output.as_ref().display(), "wrote output file");
    Ok(report)
}
