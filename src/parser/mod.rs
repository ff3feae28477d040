//! XML parsing for 3MF model parts
//!
//! Each part is parsed once into a [`Part`]: its color map, its object
//! resource table and its build items. Resolution across parts happens in
//! [`crate::resolver`].

mod core;
mod material;
mod mesh;

use crate::error::{Error, Result};
use crate::model::{ColorMap, Transform};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use tracing::debug;

use core::{parse_build_item, parse_component, parse_object, parse_triangle, parse_vertex};
use material::{OpenGroup, parse_base_color, parse_group_color, parse_group_start};

pub use mesh::{ExtractedMesh, MeshData, TriangleRecord};
pub(crate) use mesh::ColorTally;

/// Size of 3MF transformation matrix (4x3 affine transform in row-major order)
const TRANSFORM_MATRIX_SIZE: usize = 12;

/// Default buffer capacity for XML parsing (4KB)
const XML_BUFFER_CAPACITY: usize = 4096;

/// What an object resource contains
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectContent {
    /// Inline mesh geometry
    Mesh(MeshData),
    /// References to other objects, possibly in other parts
    Components(Vec<ComponentRef>),
    /// Neither mesh nor components
    Empty,
}

/// An `object` element from a part's resources
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectResource {
    /// Object id, unique within its part
    pub id: usize,
    /// Optional display name
    pub name: Option<String>,
    /// Object-level property group id
    pub pid: Option<usize>,
    /// Object-level property index
    pub pindex: Option<usize>,
    /// Mesh or component content
    pub content: ObjectContent,
}

/// A `component` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef {
    /// Referenced object id
    pub objectid: usize,
    /// Part holding the referenced object (production extension `path`)
    pub path: Option<String>,
}

/// A build `item`
#[derive(Debug, Clone, PartialEq)]
pub struct BuildItemRef {
    /// Referenced object id
    pub objectid: usize,
    /// Placement, identity when absent
    pub transform: Transform,
    /// Part holding the referenced object (production extension `path`)
    pub path: Option<String>,
}

/// One parsed model part
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Archive path of this part
    pub path: String,
    /// Declared unit, if any
    pub unit: Option<String>,
    /// Colors declared by this part's material groups
    pub colors: ColorMap,
    /// Object resources by id
    pub objects: HashMap<usize, ObjectResource>,
    /// Build items in declaration order
    pub build_items: Vec<BuildItemRef>,
}

impl Part {
    /// Create an empty part
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            unit: None,
            colors: ColorMap::new(),
            objects: HashMap::new(),
            build_items: Vec::new(),
        }
    }
}

/// Parse one model part
///
/// `path` is only used to give errors a location.
pub fn parse_part(path: &str, xml: &str) -> Result<Part> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut builder = PartBuilder::new(path);
    let mut buf = Vec::with_capacity(XML_BUFFER_CAPACITY);

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => {
                return Err(Error::InvalidXml(format!(
                    "'{}' at byte {}: {}",
                    path,
                    reader.error_position(),
                    e
                )));
            }
        };

        match event {
            Event::Start(ref e) => builder.start(e, false)?,
            Event::Empty(ref e) => builder.start(e, true)?,
            Event::End(ref e) => builder.end(e.local_name().as_ref())?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let part = builder.finish();
    debug!(
        part = %part.path,
        objects = part.objects.len(),
        colors = part.colors.len(),
        build_items = part.build_items.len(),
        "parsed model part"
    );
    Ok(part)
}

/// Element-by-element state while reading a part
struct PartBuilder {
    part: Part,
    in_resources: bool,
    in_build: bool,
    current_object: Option<ObjectResource>,
    current_mesh: Option<MeshData>,
    current_components: Option<Vec<ComponentRef>>,
    open_group: Option<OpenGroup>,
}

impl PartBuilder {
    fn new(path: &str) -> Self {
        Self {
            part: Part::new(path),
            in_resources: false,
            in_build: false,
            current_object: None,
            current_mesh: None,
            current_components: None,
            open_group: None,
        }
    }

    fn start(&mut self, e: &BytesStart, is_empty: bool) -> Result<()> {
        let local = e.local_name();
        match local.as_ref() {
            b"model" => {
                let attrs = parse_attributes(e)?;
                if let Some(unit) = attrs.get("unit") {
                    self.part.unit = Some(unit.clone());
                }
            }
            b"resources" => self.in_resources = !is_empty,
            b"build" => self.in_build = !is_empty,
            b"object" if self.in_resources => {
                let object = parse_object(e)?;
                if is_empty {
                    self.part.objects.insert(object.id, object);
                } else {
                    self.current_object = Some(object);
                }
            }
            b"mesh" if self.current_object.is_some() => {
                self.current_mesh = Some(MeshData::new());
            }
            b"vertex" => {
                if let Some(ref mut mesh) = self.current_mesh {
                    let position = mesh.vertices.len();
                    mesh.vertices
                        .push(parse_vertex(e, &self.part.path, position)?);
                }
            }
            b"triangle" => {
                if let Some(ref mut mesh) = self.current_mesh {
                    let position = mesh.triangles.len();
                    mesh.triangles
                        .push(parse_triangle(e, &self.part.path, position)?);
                }
            }
            b"components" if self.current_object.is_some() => {
                self.current_components = Some(Vec::new());
            }
            b"component" => {
                if let Some(ref mut components) = self.current_components {
                    components.push(parse_component(e)?);
                }
            }
            b"basematerials" if self.in_resources && !is_empty => {
                self.open_group = Some(parse_group_start(e, "basematerials")?);
            }
            b"colorgroup" if self.in_resources && !is_empty => {
                self.open_group = Some(parse_group_start(e, "colorgroup")?);
            }
            b"base" => {
                if let Some(ref mut group) = self.open_group {
                    let color = parse_base_color(e)?;
                    group.push(&mut self.part.colors, &color);
                }
            }
            b"color" => {
                if let Some(ref mut group) = self.open_group {
                    let color = parse_group_color(e)?;
                    group.push(&mut self.part.colors, &color);
                }
            }
            b"item" if self.in_build => {
                self.part.build_items.push(parse_build_item(e)?);
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, local_name: &[u8]) -> Result<()> {
        match local_name {
            b"resources" => self.in_resources = false,
            b"build" => self.in_build = false,
            b"basematerials" | b"colorgroup" => self.open_group = None,
            b"object" => {
                if let Some(mut object) = self.current_object.take() {
                    let mesh = self.current_mesh.take();
                    let components = self.current_components.take();
                    object.content = match (mesh, components) {
                        (Some(mesh), _) => {
                            mesh.validate(&self.part.path, object.id)?;
                            ObjectContent::Mesh(mesh)
                        }
                        (None, Some(components)) => ObjectContent::Components(components),
                        (None, None) => ObjectContent::Empty,
                    };
                    if self.part.objects.contains_key(&object.id) {
                        debug!(
                            part = %self.part.path,
                            id = object.id,
                            "duplicate object id, later definition wins"
                        );
                    }
                    self.part.objects.insert(object.id, object);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Part {
        self.part
    }
}

/// Collect an element's attributes, unescaping their values
pub(crate) fn parse_attributes(e: &BytesStart) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::with_capacity(8);

    for attr in e.attributes() {
        let attr = attr?;
        let key =
            std::str::from_utf8(attr.key.as_ref()).map_err(|e| Error::InvalidXml(e.to_string()))?;
        let raw =
            std::str::from_utf8(&attr.value).map_err(|e| Error::InvalidXml(e.to_string()))?;
        let value = quick_xml::escape::unescape(raw)
            .map_err(|e| Error::XmlAttr(format!("Attribute '{}': {}", key, e)))?;

        attrs.insert(key.to_string(), value.into_owned());
    }

    Ok(attrs)
}

/// Extract local name from potentially namespaced XML name
///
/// - `"p:path"` returns `"path"`
/// - `"objectid"` returns `"objectid"`
pub(crate) fn get_local_name(name_str: &str) -> &str {
    match name_str.rfind(':') {
        Some(pos) => &name_str[pos + 1..],
        None => name_str,
    }
}

/// Get an attribute value by its local name, regardless of namespace prefix
fn get_attr_by_local_name(attrs: &HashMap<String, String>, local_name: &str) -> Option<String> {
    attrs.iter().find_map(|(key, value)| {
        if get_local_name(key) == local_name && !key.starts_with("xmlns") {
            Some(value.clone())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PART: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<model unit="inch" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02"
       xmlns:m="http://schemas.microsoft.com/3dmanufacturing/material/2015/02"
       xmlns:p="http://schemas.microsoft.com/3dmanufacturing/production/2015/06">
  <resources>
    <basematerials id="1">
      <base name="Red" displaycolor="#FF0000FF"/>
      <base name="Plain"/>
    </basematerials>
    <m:colorgroup id="2">
      <m:color color="#00ff00"/>
    </m:colorgroup>
    <object id="3" name="Cube" pid="1" pindex="0">
      <mesh>
        <vertices>
          <vertex x="0" y="0" z="0"/>
          <vertex x="1" y="0" z="0"/>
          <vertex x="0" y="1" z="0"/>
        </vertices>
        <triangles>
          <triangle v1="0" v2="1" v3="2" pid="2" p1="0"/>
        </triangles>
      </mesh>
    </object>
    <object id="4" type="model">
      <components>
        <component objectid="3"/>
        <component objectid="1" p:path="/3D/Objects/sub.model"/>
      </components>
    </object>
    <object id="5"/>
  </resources>
  <build>
    <item objectid="4" transform="1 0 0 0 1 0 0 0 1 5 0 0"/>
  </build>
</model>"##;

    #[test]
    fn test_parse_part_tables() {
        let part = parse_part("3D/3dmodel.model", PART).unwrap();

        assert_eq!(part.unit.as_deref(), Some("inch"));
        assert_eq!(part.colors.get(1, 0), Some("#FF0000"));
        assert_eq!(part.colors.get(1, 1), Some("#808080"));
        assert_eq!(part.colors.get(2, 0), Some("#00FF00"));
        assert_eq!(part.objects.len(), 3);

        let cube = &part.objects[&3];
        assert_eq!(cube.name.as_deref(), Some("Cube"));
        assert_eq!(cube.pid, Some(1));
        match &cube.content {
            ObjectContent::Mesh(mesh) => {
                assert_eq!(mesh.vertices.len(), 3);
                assert_eq!(mesh.triangles.len(), 1);
                assert_eq!(mesh.triangles[0].pid, Some(2));
            }
            other => panic!("expected mesh, got {:?}", other),
        }

        match &part.objects[&4].content {
            ObjectContent::Components(components) => {
                assert_eq!(components.len(), 2);
                assert_eq!(components[0].path, None);
                assert_eq!(components[1].path.as_deref(), Some("/3D/Objects/sub.model"));
            }
            other => panic!("expected components, got {:?}", other),
        }

        assert_eq!(part.objects[&5].content, ObjectContent::Empty);
        assert_eq!(part.build_items.len(), 1);
        assert_eq!(part.build_items[0].transform[9], 5.0);
    }

    #[test]
    fn test_malformed_vertex_reports_position() {
        let xml = r#"<model><resources><object id="1"><mesh><vertices>
            <vertex x="0" y="0" z="0"/><vertex x="1" y="zero" z="0"/>
            </vertices></mesh></object></resources></model>"#;
        let err = parse_part("3D/Objects/bad.model", xml).unwrap_err();
        match err {
            Error::MalformedMesh { part, message } => {
                assert_eq!(part, "3D/Objects/bad.model");
                assert!(message.contains("vertex 1"));
            }
            other => panic!("expected MalformedMesh, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_triangle_is_malformed() {
        let xml = r#"<model><resources><object id="1"><mesh>
            <vertices><vertex x="0" y="0" z="0"/><vertex x="1" y="0" z="0"/><vertex x="0" y="1" z="0"/></vertices>
            <triangles><triangle v1="0" v2="1" v3="3"/></triangles>
            </mesh></object></resources></model>"#;
        assert!(matches!(
            parse_part("3D/3dmodel.model", xml),
            Err(Error::MalformedMesh { .. })
        ));
    }

    #[test]
    fn test_broken_xml_names_part() {
        let err = parse_part("3D/3dmodel.model", "<model><resources></model>").unwrap_err();
        assert!(err.to_string().contains("3D/3dmodel.model"));
    }

    #[test]
    fn test_get_local_name() {
        assert_eq!(get_local_name("p:path"), "path");
        assert_eq!(get_local_name("objectid"), "objectid");
    }

    #[test]
    fn test_xmlns_prefix_not_mistaken_for_path() {
        let mut attrs = HashMap::new();
        attrs.insert("xmlns:path".to_string(), "urn:x".to_string());
        assert_eq!(get_attr_by_local_name(&attrs, "path"), None);
        attrs.insert("p:path".to_string(), "/3D/a.model".to_string());
        assert_eq!(
            get_attr_by_local_name(&attrs, "path").as_deref(),
            Some("/3D/a.model")
        );
    }
}
