//! Bambu Studio package emission
//!
//! Turns a resolved model into the archive layout Bambu Studio loads: a
//! main model whose objects are containers pointing at one sub-part each,
//! the sub-parts with the actual meshes, and `Metadata/model_settings.config`
//! carrying names and extruder assignments.
//!
//! Every document is generated in memory first; the output writer only sees
//! bytes once all of them succeeded.

mod model;
mod package;
mod settings;

use crate::error::{Error, Result};
use crate::extruder::ExtruderMap;
use crate::merge::merge_painted;
use crate::model::{MeshObject, OutputMode, ResolvedModel, Thumbnail};
use crate::opc::{
    self, CONTENT_TYPES_PATH, MODEL_PATH, MODEL_RELS_PATH, PLATE_THUMBNAIL, PLATE_THUMBNAIL_PATH,
    PackageEntry, RELS_PATH, SETTINGS_PATH, THUMBNAILS_DIR,
};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, Event};
use std::collections::HashSet;
use std::io::{Seek, Write};
use tracing::{debug, info, warn};

/// 3MF core namespace
pub const CORE_NAMESPACE: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

/// 3MF production extension namespace
pub const PRODUCTION_NAMESPACE: &str =
    "http://schemas.microsoft.com/3dmanufacturing/production/2015/06";

/// OPC relationships namespace
pub const RELATIONSHIPS_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

/// OPC content types namespace
pub const CONTENT_TYPES_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";

/// What was written to the output package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitSummary {
    /// Objects in the output (1 in painted mode)
    pub objects: usize,
    /// Triangles carrying a `paint_color` attribute
    pub painted_triangles: usize,
    /// Extruder of the merged object in painted mode
    pub default_slot: Option<u32>,
    /// Thumbnails stored in the package
    pub thumbnails: usize,
    /// Archive entries written
    pub entries: usize,
}

/// One object as it will appear in the output package
pub(crate) struct EmittedObject<'a> {
    pub object: &'a MeshObject,
    pub extruder: u32,
    /// Per-triangle paint states, aligned with `object.triangles`
    pub paint_states: Option<&'a [String]>,
}

/// Write `model` as a Bambu Studio package
///
/// In [`OutputMode::Painted`] all objects are merged into one mesh whose
/// non-default triangles carry paint states; in [`OutputMode::MultiObject`]
/// each object keeps its own sub-part and extruder.
///
/// # Returns
///
/// Returns the writer after finishing the ZIP archive, plus a summary
pub fn write_package<W: Write + Seek>(
    writer: W,
    model: &ResolvedModel,
    extruders: &ExtruderMap,
    thumbnails: &[Thumbnail],
    mode: OutputMode,
) -> Result<(W, EmitSummary)> {
    let (entries, summary) = package_entries(model, extruders, thumbnails, mode)?;
    let writer = opc::write_entries(writer, &entries)?;
    info!(
        mode = mode.name(),
        objects = summary.objects,
        painted = summary.painted_triangles,
        thumbnails = summary.thumbnails,
        "wrote Bambu Studio package"
    );
    Ok((writer, summary))
}

/// Generate every entry of the output package without writing anything
pub fn package_entries(
    model: &ResolvedModel,
    extruders: &ExtruderMap,
    thumbnails: &[Thumbnail],
    mode: OutputMode,
) -> Result<(Vec<PackageEntry>, EmitSummary)> {
    let thumbnails = usable_thumbnails(thumbnails)?;

    match mode {
        OutputMode::Painted => {
            let merged = merge_painted(&model.objects, extruders)?;
            let emitted = [EmittedObject {
                object: &merged.object,
                extruder: merged.default_slot,
                paint_states: Some(&merged.paint_states),
            }];
            let entries = build_entries(&emitted, &model.unit, &thumbnails, mode)?;
            let summary = EmitSummary {
                objects: 1,
                painted_triangles: merged.painted_count(),
                default_slot: Some(merged.default_slot),
                thumbnails: thumbnails.len(),
                entries: entries.len(),
            };
            Ok((entries, summary))
        }
        OutputMode::MultiObject => {
            let emitted = model
                .objects
                .iter()
                .map(|object| {
                    let extruder = extruders
                        .slot(&object.color)
                        .ok_or_else(|| Error::UnmappedColor(object.color.clone()))?;
                    Ok(EmittedObject {
                        object,
                        extruder,
                        paint_states: None,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let entries = build_entries(&emitted, &model.unit, &thumbnails, mode)?;
            let summary = EmitSummary {
                objects: emitted.len(),
                painted_triangles: 0,
                default_slot: None,
                thumbnails: thumbnails.len(),
                entries: entries.len(),
            };
            Ok((entries, summary))
        }
    }
}

fn build_entries(
    objects: &[EmittedObject],
    unit: &str,
    thumbnails: &[&Thumbnail],
    mode: OutputMode,
) -> Result<Vec<PackageEntry>> {
    let has_plate = thumbnails.iter().any(|t| t.filename == PLATE_THUMBNAIL);

    let mut entries = vec![
        PackageEntry::new(CONTENT_TYPES_PATH, package::content_types(thumbnails)?),
        PackageEntry::new(RELS_PATH, package::root_relationships(has_plate)?),
        PackageEntry::new(MODEL_PATH, model::main_model(objects, unit)?),
        PackageEntry::new(MODEL_RELS_PATH, package::model_relationships(objects.len())?),
    ];

    for (i, emitted) in objects.iter().enumerate() {
        entries.push(PackageEntry::new(
            opc::object_part_path(i + 1),
            model::object_model(emitted, unit)?,
        ));
    }

    entries.push(PackageEntry::new(
        SETTINGS_PATH,
        settings::model_settings(objects, mode)?,
    ));

    if let Some(plate) = thumbnails.iter().find(|t| t.filename == PLATE_THUMBNAIL) {
        entries.push(PackageEntry::new(PLATE_THUMBNAIL_PATH, plate.data.clone()));
    }
    for thumbnail in thumbnails {
        entries.push(PackageEntry::new(
            format!("{}/{}", THUMBNAILS_DIR, thumbnail.filename),
            thumbnail.data.clone(),
        ));
    }

    debug!(entries = entries.len(), "generated package entries");
    Ok(entries)
}

/// Validate thumbnail names and drop empty images
fn usable_thumbnails(thumbnails: &[Thumbnail]) -> Result<Vec<&Thumbnail>> {
    let mut seen = HashSet::new();
    let mut usable = Vec::with_capacity(thumbnails.len());

    for thumbnail in thumbnails {
        let name = thumbnail.filename.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(Error::InvalidThumbnail(format!(
                "'{}' is not a plain file name",
                name
            )));
        }
        if !seen.insert(name) {
            return Err(Error::InvalidThumbnail(format!(
                "'{}' was supplied more than once",
                name
            )));
        }
        if thumbnail.data.is_empty() {
            warn!(thumbnail = name, "skipping empty thumbnail");
            continue;
        }
        usable.push(thumbnail);
    }

    Ok(usable)
}

/// Start an indented XML document with its declaration
pub(crate) fn xml_document() -> Result<Writer<Vec<u8>>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        "XML declaration",
    )?;
    Ok(writer)
}

/// Write one event, naming what was being written if it fails
pub(crate) fn write_event(writer: &mut Writer<Vec<u8>>, event: Event, what: &str) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::xml_write(format!("Failed to write {}: {}", what, e)))
}
