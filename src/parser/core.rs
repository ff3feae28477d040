//! Core 3MF element parsing
//!
//! Objects, vertices, triangles, components and build items.

use crate::error::{Error, Result};
use crate::model::{IDENTITY_TRANSFORM, Transform, Vertex};
use quick_xml::events::BytesStart;

use super::mesh::TriangleRecord;
use super::{
    BuildItemRef, ComponentRef, ObjectContent, ObjectResource, TRANSFORM_MATRIX_SIZE,
    get_attr_by_local_name, parse_attributes,
};

/// Parse object element attributes
pub(super) fn parse_object(e: &BytesStart) -> Result<ObjectResource> {
    let attrs = parse_attributes(e)?;

    let id = attrs
        .get("id")
        .ok_or_else(|| Error::missing_attribute("object", "id"))?
        .parse::<usize>()?;

    let mut object = ObjectResource {
        id,
        name: attrs.get("name").cloned(),
        pid: None,
        pindex: None,
        content: ObjectContent::Empty,
    };

    if let Some(pid) = attrs.get("pid") {
        object.pid = Some(pid.parse::<usize>()?);
    }

    if let Some(pindex) = attrs.get("pindex") {
        object.pindex = Some(pindex.parse::<usize>()?);
    }

    Ok(object)
}

/// Parse vertex element attributes
///
/// `position` is the vertex's 0-based index within its mesh, used in errors.
pub(super) fn parse_vertex(e: &BytesStart, part: &str, position: usize) -> Result<Vertex> {
    let mut x_opt: Option<f64> = None;
    let mut y_opt: Option<f64> = None;
    let mut z_opt: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let key = attr.key.as_ref();

        if matches!(key, b"x" | b"y" | b"z") {
            let axis = match key {
                b"x" => "x",
                b"y" => "y",
                _ => "z",
            };
            let value = std::str::from_utf8(&attr.value).unwrap_or("");
            let parsed = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    Error::malformed_mesh(
                        part,
                        format!(
                            "vertex {}: coordinate '{}' is not a finite number (got '{}')",
                            position, axis, value
                        ),
                    )
                })?;

            match key {
                b"x" => x_opt = Some(parsed),
                b"y" => y_opt = Some(parsed),
                _ => z_opt = Some(parsed),
            }
        }
    }

    let missing = |axis: &str| {
        Error::malformed_mesh(
            part,
            format!("vertex {}: missing '{}' coordinate", position, axis),
        )
    };

    let x = x_opt.ok_or_else(|| missing("x"))?;
    let y = y_opt.ok_or_else(|| missing("y"))?;
    let z = z_opt.ok_or_else(|| missing("z"))?;

    Ok(Vertex::new(x, y, z))
}

/// Parse triangle element attributes
///
/// Only the vertex indices and the `pid`/`p1` color property are kept.
pub(super) fn parse_triangle(
    e: &BytesStart,
    part: &str,
    position: usize,
) -> Result<TriangleRecord> {
    let mut v1_opt: Option<usize> = None;
    let mut v2_opt: Option<usize> = None;
    let mut v3_opt: Option<usize> = None;
    let mut pid_opt: Option<usize> = None;
    let mut p1_opt: Option<usize> = None;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let key = attr.key.as_ref();

        if matches!(key, b"v1" | b"v2" | b"v3" | b"pid" | b"p1") {
            let name = std::str::from_utf8(key).unwrap_or("?");
            let value_str = std::str::from_utf8(&attr.value).unwrap_or("");
            let value = value_str.trim().parse::<usize>().map_err(|_| {
                Error::malformed_mesh(
                    part,
                    format!(
                        "triangle {}: attribute '{}' is not a vertex/property index (got '{}')",
                        position, name, value_str
                    ),
                )
            })?;

            match key {
                b"v1" => v1_opt = Some(value),
                b"v2" => v2_opt = Some(value),
                b"v3" => v3_opt = Some(value),
                b"pid" => pid_opt = Some(value),
                _ => p1_opt = Some(value),
            }
        }
    }

    let missing = |name: &str| {
        Error::malformed_mesh(
            part,
            format!("triangle {}: missing '{}' attribute", position, name),
        )
    };

    let v1 = v1_opt.ok_or_else(|| missing("v1"))?;
    let v2 = v2_opt.ok_or_else(|| missing("v2"))?;
    let v3 = v3_opt.ok_or_else(|| missing("v3"))?;

    let mut record = TriangleRecord::new(v1, v2, v3);
    record.pid = pid_opt;
    record.p1 = p1_opt;

    Ok(record)
}

/// Parse a transformation matrix attribute value (12 values)
pub(super) fn parse_transform(value: &str, element: &str) -> Result<Transform> {
    let values: Result<Vec<f64>> = value
        .split_whitespace()
        .enumerate()
        .map(|(idx, s)| {
            s.parse::<f64>().map_err(|_| {
                Error::InvalidXml(format!(
                    "<{}> transform matrix value at index {} is not a number (got '{}')",
                    element, idx, s
                ))
            })
        })
        .collect();
    let values = values?;

    if values.len() != TRANSFORM_MATRIX_SIZE {
        return Err(Error::InvalidXml(format!(
            "<{}> transform matrix must have exactly {} values (got {})",
            element,
            TRANSFORM_MATRIX_SIZE,
            values.len()
        )));
    }

    if let Some((idx, val)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(Error::InvalidXml(format!(
            "<{}> transform matrix value at index {} must be finite (got {})",
            element, idx, val
        )));
    }

    let mut transform = IDENTITY_TRANSFORM;
    transform.copy_from_slice(&values);
    Ok(transform)
}

/// Parse build item element attributes
pub(super) fn parse_build_item(e: &BytesStart) -> Result<BuildItemRef> {
    let attrs = parse_attributes(e)?;

    let objectid = attrs
        .get("objectid")
        .ok_or_else(|| Error::missing_attribute("item", "objectid"))?
        .parse::<usize>()?;

    let transform = match attrs.get("transform") {
        Some(value) => parse_transform(value, "item")?,
        None => IDENTITY_TRANSFORM,
    };

    Ok(BuildItemRef {
        objectid,
        transform,
        path: get_attr_by_local_name(&attrs, "path"),
    })
}

/// Parse component element attributes
///
/// Component transforms are not kept: each resolved object takes its
/// placement from the enclosing build item.
pub(super) fn parse_component(e: &BytesStart) -> Result<ComponentRef> {
    let attrs = parse_attributes(e)?;

    let objectid = attrs
        .get("objectid")
        .ok_or_else(|| Error::missing_attribute("component", "objectid"))?
        .parse::<usize>()?;

    Ok(ComponentRef {
        objectid,
        path: get_attr_by_local_name(&attrs, "path"),
    })
}
