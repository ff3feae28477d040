//! Content types and relationship parts

use crate::error::Result;
use crate::model::Thumbnail;
use crate::opc::{
    MODEL_CONTENT_TYPE, MODEL_PATH, MODEL_REL_TYPE, PLATE_THUMBNAIL_PATH, RELS_CONTENT_TYPE,
    THUMBNAIL_REL_TYPE, object_part_path,
};
use quick_xml::events::{BytesEnd, BytesStart, Event};

use super::{CONTENT_TYPES_NAMESPACE, RELATIONSHIPS_NAMESPACE, write_event, xml_document};

/// `[Content_Types].xml`: rels, model and png, plus any other thumbnail extension
pub(super) fn content_types(thumbnails: &[&Thumbnail]) -> Result<Vec<u8>> {
    let mut defaults: Vec<(String, &str)> = vec![
        ("rels".to_string(), RELS_CONTENT_TYPE),
        ("model".to_string(), MODEL_CONTENT_TYPE),
        ("png".to_string(), "image/png"),
    ];
    for thumbnail in thumbnails {
        let Some((_, extension)) = thumbnail.filename.rsplit_once('.') else {
            continue;
        };
        let extension = extension.to_ascii_lowercase();
        if extension.is_empty() || defaults.iter().any(|(e, _)| *e == extension) {
            continue;
        }
        let content_type = image_content_type(&extension);
        defaults.push((extension, content_type));
    }

    let mut writer = xml_document()?;
    let mut types = BytesStart::new("Types");
    types.push_attribute(("xmlns", CONTENT_TYPES_NAMESPACE));
    write_event(&mut writer, Event::Start(types), "Types element")?;

    for (extension, content_type) in &defaults {
        let mut elem = BytesStart::new("Default");
        elem.push_attribute(("Extension", extension.as_str()));
        elem.push_attribute(("ContentType", *content_type));
        write_event(&mut writer, Event::Empty(elem), "Default element")?;
    }

    write_event(&mut writer, Event::End(BytesEnd::new("Types")), "Types element")?;
    Ok(writer.into_inner())
}

fn image_content_type(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// `_rels/.rels`: the main model, and the plate thumbnail when it is stored
pub(super) fn root_relationships(has_plate_thumbnail: bool) -> Result<Vec<u8>> {
    let mut relationships = vec![(format!("/{}", MODEL_PATH), MODEL_REL_TYPE)];
    if has_plate_thumbnail {
        relationships.push((format!("/{}", PLATE_THUMBNAIL_PATH), THUMBNAIL_REL_TYPE));
    }
    relationships_document(&relationships)
}

/// `3D/_rels/3dmodel.model.rels`: one relationship per object sub-part
pub(super) fn model_relationships(object_count: usize) -> Result<Vec<u8>> {
    let relationships: Vec<_> = (1..=object_count)
        .map(|n| (format!("/{}", object_part_path(n)), MODEL_REL_TYPE))
        .collect();
    relationships_document(&relationships)
}

fn relationships_document(relationships: &[(String, &str)]) -> Result<Vec<u8>> {
    let mut writer = xml_document()?;
    let mut root = BytesStart::new("Relationships");
    root.push_attribute(("xmlns", RELATIONSHIPS_NAMESPACE));
    write_event(&mut writer, Event::Start(root), "Relationships element")?;

    for (i, (target, rel_type)) in relationships.iter().enumerate() {
        let id = format!("rel-{}", i + 1);
        let mut elem = BytesStart::new("Relationship");
        elem.push_attribute(("Target", target.as_str()));
        elem.push_attribute(("Id", id.as_str()));
        elem.push_attribute(("Type", *rel_type));
        write_event(&mut writer, Event::Empty(elem), "Relationship element")?;
    }

    write_event(
        &mut writer,
        Event::End(BytesEnd::new("Relationships")),
        "Relationships element",
    )?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_content_types_add_jpeg_once() {
        let a = Thumbnail::new("top.JPG", vec![1]);
        let b = Thumbnail::new("side.jpg", vec![1]);
        let c = Thumbnail::new("plate_1.png", vec![1]);
        let xml = text(content_types(&[&a, &b, &c]).unwrap());

        assert!(xml.contains(r#"Extension="rels""#));
        assert!(xml.contains(r#"Extension="model""#));
        assert_eq!(xml.matches(r#"Extension="png""#).count(), 1);
        assert_eq!(xml.matches(r#"Extension="jpg""#).count(), 1);
        assert!(xml.contains("image/jpeg"));
    }

    #[test]
    fn test_root_relationships() {
        let without = text(root_relationships(false).unwrap());
        assert!(without.contains(r#"Target="/3D/3dmodel.model" Id="rel-1""#));
        assert!(!without.contains("thumbnail"));

        let with = text(root_relationships(true).unwrap());
        assert!(with.contains(r#"Target="/Metadata/plate_1.png" Id="rel-2""#));
    }

    #[test]
    fn test_model_relationships_numbered() {
        let xml = text(model_relationships(3).unwrap());
        assert!(xml.contains(r#"Target="/3D/Objects/object_3.model" Id="rel-3""#));
        assert_eq!(xml.matches("<Relationship ").count(), 3);
    }
}
