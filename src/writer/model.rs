//! Main model and object sub-part documents

use crate::error::Result;
use crate::model::{IDENTITY_TRANSFORM, format_transform};
use crate::opc::object_part_path;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use super::{CORE_NAMESPACE, EmittedObject, PRODUCTION_NAMESPACE, write_event, xml_document};

/// Object id every sub-part uses for its single mesh object
const SUB_PART_OBJECT_ID: &str = "1";

/// `3D/3dmodel.model`: one container object and one build item per emitted object
pub(super) fn main_model(objects: &[EmittedObject], unit: &str) -> Result<Vec<u8>> {
    let mut writer = xml_document()?;
    write_model_start(&mut writer, unit)?;

    write_event(&mut writer, Event::Start(BytesStart::new("resources")), "resources element")?;
    let identity = format_transform(&IDENTITY_TRANSFORM);
    for n in 1..=objects.len() {
        let id = n.to_string();
        let mut object = BytesStart::new("object");
        object.push_attribute(("id", id.as_str()));
        object.push_attribute(("type", "model"));
        write_event(&mut writer, Event::Start(object), "object element")?;
        write_event(
            &mut writer,
            Event::Start(BytesStart::new("components")),
            "components element",
        )?;

        let path = format!("/{}", object_part_path(n));
        let mut component = BytesStart::new("component");
        component.push_attribute(("p:path", path.as_str()));
        component.push_attribute(("objectid", SUB_PART_OBJECT_ID));
        component.push_attribute(("transform", identity.as_str()));
        write_event(&mut writer, Event::Empty(component), "component")?;

        write_event(&mut writer, Event::End(BytesEnd::new("components")), "components element")?;
        write_event(&mut writer, Event::End(BytesEnd::new("object")), "object element")?;
    }
    write_event(&mut writer, Event::End(BytesEnd::new("resources")), "resources element")?;

    write_event(&mut writer, Event::Start(BytesStart::new("build")), "build element")?;
    for (i, emitted) in objects.iter().enumerate() {
        let id = (i + 1).to_string();
        let transform = format_transform(&emitted.object.transform);
        let mut item = BytesStart::new("item");
        item.push_attribute(("objectid", id.as_str()));
        item.push_attribute(("transform", transform.as_str()));
        item.push_attribute(("printable", "1"));
        write_event(&mut writer, Event::Empty(item), "build item")?;
    }
    write_event(&mut writer, Event::End(BytesEnd::new("build")), "build element")?;

    write_event(&mut writer, Event::End(BytesEnd::new("model")), "model element")?;
    Ok(writer.into_inner())
}

/// `3D/Objects/object_<n>.model`: the mesh, with paint states where present
pub(super) fn object_model(emitted: &EmittedObject, unit: &str) -> Result<Vec<u8>> {
    let mut writer = xml_document()?;
    write_model_start(&mut writer, unit)?;

    write_event(&mut writer, Event::Start(BytesStart::new("resources")), "resources element")?;
    let mut object = BytesStart::new("object");
    object.push_attribute(("id", SUB_PART_OBJECT_ID));
    object.push_attribute(("type", "model"));
    write_event(&mut writer, Event::Start(object), "object element")?;
    write_mesh(&mut writer, emitted)?;
    write_event(&mut writer, Event::End(BytesEnd::new("object")), "object element")?;
    write_event(&mut writer, Event::End(BytesEnd::new("resources")), "resources element")?;

    write_event(&mut writer, Event::Empty(BytesStart::new("build")), "build element")?;
    write_event(&mut writer, Event::End(BytesEnd::new("model")), "model element")?;
    Ok(writer.into_inner())
}

fn write_model_start(writer: &mut Writer<Vec<u8>>, unit: &str) -> Result<()> {
    let mut model = BytesStart::new("model");
    model.push_attribute(("unit", unit));
    model.push_attribute(("xml:lang", "en-US"));
    model.push_attribute(("xmlns", CORE_NAMESPACE));
    model.push_attribute(("xmlns:p", PRODUCTION_NAMESPACE));
    model.push_attribute(("requiredextensions", "p"));
    write_event(writer, Event::Start(model), "model element")
}

fn write_mesh(writer: &mut Writer<Vec<u8>>, emitted: &EmittedObject) -> Result<()> {
    let mesh = emitted.object;
    write_event(writer, Event::Start(BytesStart::new("mesh")), "mesh element")?;

    write_event(writer, Event::Start(BytesStart::new("vertices")), "vertices element")?;
    for vertex in &mesh.vertices {
        let mut v_elem = BytesStart::new("vertex");
        v_elem.push_attribute(("x", vertex.x.to_string().as_str()));
        v_elem.push_attribute(("y", vertex.y.to_string().as_str()));
        v_elem.push_attribute(("z", vertex.z.to_string().as_str()));
        write_event(writer, Event::Empty(v_elem), "vertex")?;
    }
    write_event(writer, Event::End(BytesEnd::new("vertices")), "vertices element")?;

    write_event(writer, Event::Start(BytesStart::new("triangles")), "triangles element")?;
    for (i, triangle) in mesh.triangles.iter().enumerate() {
        let mut t_elem = BytesStart::new("triangle");
        t_elem.push_attribute(("v1", triangle.v1.to_string().as_str()));
        t_elem.push_attribute(("v2", triangle.v2.to_string().as_str()));
        t_elem.push_attribute(("v3", triangle.v3.to_string().as_str()));

        if let Some(state) = emitted.paint_states.and_then(|states| states.get(i))
            && !state.is_empty()
        {
            t_elem.push_attribute(("paint_color", state.as_str()));
        }

        write_event(writer, Event::Empty(t_elem), "triangle")?;
    }
    write_event(writer, Event::End(BytesEnd::new("triangles")), "triangles element")?;

    write_event(writer, Event::End(BytesEnd::new("mesh")), "mesh element")
}
