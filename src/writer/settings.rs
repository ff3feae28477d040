//! `Metadata/model_settings.config`
//!
//! Bambu Studio reads object names and extruder assignments from here, and
//! expects the part, plate and assemble blocks to exist even when every value
//! in them is neutral.

use crate::error::Result;
use crate::model::{IDENTITY_TRANSFORM, OutputMode, format_transform};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use super::{EmittedObject, write_event, xml_document};

/// Identity 4x4 part matrix, row-major
const PART_MATRIX: &str = "1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1";

const MESH_STAT_FIELDS: [&str; 5] = [
    "edges_fixed",
    "degenerate_facets",
    "facets_removed",
    "facets_reversed",
    "backwards_edges",
];

/// Build the settings document for the emitted objects
///
/// Multi-object output also records `source_*` provenance on each part.
pub(super) fn model_settings(objects: &[EmittedObject], mode: OutputMode) -> Result<Vec<u8>> {
    let mut writer = xml_document()?;
    write_event(&mut writer, Event::Start(BytesStart::new("config")), "config element")?;

    for (i, emitted) in objects.iter().enumerate() {
        write_object(&mut writer, i + 1, emitted, mode)?;
    }
    write_plate(&mut writer, objects.len())?;
    write_assemble(&mut writer, objects.len())?;

    write_event(&mut writer, Event::End(BytesEnd::new("config")), "config element")?;
    Ok(writer.into_inner())
}

fn write_object(
    writer: &mut Writer<Vec<u8>>,
    id: usize,
    emitted: &EmittedObject,
    mode: OutputMode,
) -> Result<()> {
    let id = id.to_string();
    let name = emitted.object.name.as_str();

    let mut object = BytesStart::new("object");
    object.push_attribute(("id", id.as_str()));
    write_event(writer, Event::Start(object), "settings object")?;

    write_key_value(writer, "name", name)?;
    write_key_value(writer, "extruder", &emitted.extruder.to_string())?;
    let face_count = emitted.object.triangles.len().to_string();
    let mut faces = BytesStart::new("metadata");
    faces.push_attribute(("face_count", face_count.as_str()));
    write_event(writer, Event::Empty(faces), "face_count metadata")?;

    let mut part = BytesStart::new("part");
    part.push_attribute(("id", id.as_str()));
    part.push_attribute(("subtype", "normal_part"));
    write_event(writer, Event::Start(part), "part element")?;

    write_key_value(writer, "name", name)?;
    write_key_value(writer, "matrix", PART_MATRIX)?;
    if mode == OutputMode::MultiObject {
        write_key_value(writer, "source_file", &format!("{}.stl", name))?;
        for key in [
            "source_object_id",
            "source_volume_id",
            "source_offset_x",
            "source_offset_y",
            "source_offset_z",
        ] {
            write_key_value(writer, key, "0")?;
        }
    }

    let mut mesh_stat = BytesStart::new("mesh_stat");
    for field in MESH_STAT_FIELDS {
        mesh_stat.push_attribute((field, "0"));
    }
    write_event(writer, Event::Empty(mesh_stat), "mesh_stat element")?;

    write_event(writer, Event::End(BytesEnd::new("part")), "part element")?;
    write_event(writer, Event::End(BytesEnd::new("object")), "settings object")
}

fn write_plate(writer: &mut Writer<Vec<u8>>, object_count: usize) -> Result<()> {
    write_event(writer, Event::Start(BytesStart::new("plate")), "plate element")?;
    write_key_value(writer, "plater_id", "1")?;
    write_key_value(writer, "plater_name", "")?;
    write_key_value(writer, "locked", "false")?;
    write_key_value(writer, "bed_type", "auto")?;
    write_key_value(writer, "print_sequence", "by layer")?;

    for id in 1..=object_count {
        write_event(
            writer,
            Event::Start(BytesStart::new("model_instance")),
            "model_instance element",
        )?;
        write_key_value(writer, "object_id", &id.to_string())?;
        write_key_value(writer, "instance_id", "0")?;
        write_event(
            writer,
            Event::End(BytesEnd::new("model_instance")),
            "model_instance element",
        )?;
    }

    write_event(writer, Event::End(BytesEnd::new("plate")), "plate element")
}

fn write_assemble(writer: &mut Writer<Vec<u8>>, object_count: usize) -> Result<()> {
    write_event(writer, Event::Start(BytesStart::new("assemble")), "assemble element")?;
    let identity = format_transform(&IDENTITY_TRANSFORM);
    for id in 1..=object_count {
        let id = id.to_string();
        let mut item = BytesStart::new("assemble_item");
        item.push_attribute(("object_id", id.as_str()));
        item.push_attribute(("instance_id", "0"));
        item.push_attribute(("transform", identity.as_str()));
        item.push_attribute(("offset", "0 0 0"));
        write_event(writer, Event::Empty(item), "assemble_item")?;
    }
    write_event(writer, Event::End(BytesEnd::new("assemble")), "assemble element")
}

/// `<metadata key=".." value=".."/>`
fn write_key_value(writer: &mut Writer<Vec<u8>>, key: &str, value: &str) -> Result<()> {
    let mut elem = BytesStart::new("metadata");
    elem.push_attribute(("key", key));
    elem.push_attribute(("value", value));
    write_event(writer, Event::Empty(elem), "metadata element")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MeshObject, Triangle, Vertex};

    fn object(name: &str) -> MeshObject {
        let mut object = MeshObject::new(name, 4);
        object.vertices = vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(0.0, 1.0, 0.0),
        ];
        object.triangles = vec![Triangle::new(0, 1, 2)];
        object
    }

    fn settings(objects: &[EmittedObject], mode: OutputMode) -> String {
        String::from_utf8(model_settings(objects, mode).unwrap()).unwrap()
    }

    #[test]
    fn test_painted_settings() {
        let merged = object("merged");
        let emitted = [EmittedObject {
            object: &merged,
            extruder: 2,
            paint_states: None,
        }];
        let xml = settings(&emitted, OutputMode::Painted);

        assert!(xml.contains(r#"<metadata key="extruder" value="2"/>"#));
        assert!(xml.contains(r#"<metadata face_count="1"/>"#));
        assert!(xml.contains(r#"<part id="1" subtype="normal_part">"#));
        assert!(xml.contains(PART_MATRIX));
        assert!(!xml.contains("source_file"));
        assert!(xml.contains(r#"<metadata key="plater_name" value=""/>"#));
        assert!(xml.contains(
            r#"<assemble_item object_id="1" instance_id="0" transform="1 0 0 0 1 0 0 0 1 0 0 0" offset="0 0 0"/>"#
        ));
    }

    #[test]
    fn test_multi_object_settings_record_source() {
        let a = object("left");
        let b = object("right");
        let emitted = [
            EmittedObject {
                object: &a,
                extruder: 1,
                paint_states: None,
            },
            EmittedObject {
                object: &b,
                extruder: 2,
                paint_states: None,
            },
        ];
        let xml = settings(&emitted, OutputMode::MultiObject);

        assert!(xml.contains(r#"<metadata key="source_file" value="right.stl"/>"#));
        assert_eq!(xml.matches("<model_instance>").count(), 2);
        assert_eq!(xml.matches("<assemble_item ").count(), 2);
    }

    #[test]
    fn test_names_are_escaped() {
        let tricky = object(r#"Bolts & "Nuts" <M3>"#);
        let emitted = [EmittedObject {
            object: &tricky,
            extruder: 1,
            paint_states: None,
        }];
        let xml = settings(&emitted, OutputMode::Painted);

        assert!(xml.contains("Bolts &amp; &quot;Nuts&quot; &lt;M3&gt;"));
        assert!(!xml.contains("<M3>"));
    }
}
