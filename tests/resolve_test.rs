//! Integration tests for package resolution

mod common;

use bambu3mf::{ConvertConfig, Error, parse_package};
use common::{fan_mesh, model_xml, package};

#[test]
fn test_external_sub_part_component() {
    let root = model_xml(
        r#"<object id="5" type="model"><components>
             <component objectid="2" p:path="/3D/Objects/part.model"/>
           </components></object>"#,
        r#"<item objectid="5"/>"#,
    );
    let sub = model_xml(
        &format!(
            r##"<basematerials id="9"><base name="Teal" displaycolor="#008080FF"/></basematerials>
               <object id="2" type="model" pid="9" pindex="0">{}</object>"##,
            fan_mesh(2, None)
        ),
        "",
    );
    let input = package(&[
        ("3D/3dmodel.model", &root),
        ("3D/Objects/part.model", &sub),
    ]);

    let resolution = parse_package(input, &ConvertConfig::default()).unwrap();
    let objects = &resolution.model.objects;
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].triangles.len(), 2);
    assert_eq!(objects[0].color, "#008080");
    assert!(resolution.warnings.is_empty());
}

#[test]
fn test_dangling_component_is_a_warning() {
    let root = model_xml(
        &format!(
            r#"<object id="1">{}</object>
               <object id="2"><components>
                 <component objectid="1"/>
                 <component objectid="99"/>
               </components></object>"#,
            fan_mesh(3, None)
        ),
        r#"<item objectid="2"/>"#,
    );
    let input = package(&[("3D/3dmodel.model", &root)]);

    let resolution = parse_package(input, &ConvertConfig::default()).unwrap();
    assert_eq!(resolution.model.objects.len(), 1);
    assert_eq!(resolution.model.objects[0].triangles.len(), 3);
    assert_eq!(resolution.warnings.len(), 1);

    let warning = &resolution.warnings[0];
    assert_eq!(warning.object_id, 99);
    assert_eq!(warning.part, "3D/3dmodel.model");
    assert!(warning.to_string().contains("object 2, component 1"));
}

#[test]
fn test_triangle_vote_with_colorgroup() {
    let root = model_xml(
        r##"<m:colorgroup id="3" xmlns:m="http://schemas.microsoft.com/3dmanufacturing/material/2015/02">
                 <m:color color="#ff0000"/><m:color color="#0000ff"/>
               </m:colorgroup>
               <object id="1" pid="3">
                 <mesh><vertices>
                   <vertex x="0" y="0" z="0"/><vertex x="1" y="0" z="0"/>
                   <vertex x="1" y="1" z="0"/><vertex x="0" y="1" z="0"/>
                 </vertices><triangles>
                   <triangle v1="0" v2="1" v3="2" p1="1"/>
                   <triangle v1="0" v2="2" v3="3" p1="1"/>
                   <triangle v1="0" v2="1" v3="3" p1="0"/>
                 </triangles></mesh>
               </object>"##,
        r#"<item objectid="1"/>"#,
    );
    let input = package(&[("3D/3dmodel.model", &root)]);

    let resolution = parse_package(input, &ConvertConfig::default()).unwrap();
    assert_eq!(resolution.model.objects[0].color, "#0000FF");
}

#[test]
fn test_build_item_with_path_and_encoded_name() {
    let root = model_xml("", r#"<item objectid="1" p:path="/3D/Objects/my%20part.model"/>"#);
    let sub = model_xml(
        &format!(r#"<object id="1" name="Widget">{}</object>"#, fan_mesh(1, None)),
        "",
    );
    let input = package(&[
        ("3D/3dmodel.model", &root),
        ("3D/Objects/my part.model", &sub),
    ]);

    let resolution = parse_package(input, &ConvertConfig::default()).unwrap();
    assert_eq!(resolution.model.objects[0].name, "Widget");
}

#[test]
fn test_sub_part_shared_by_two_items() {
    let root = model_xml(
        r#"<object id="1"><components><component objectid="1" p:path="/3D/Objects/a.model"/></components></object>
           <object id="2"><components><component objectid="1" p:path="/3D/Objects/a.model"/></components></object>"#,
        r#"<item objectid="1" transform="1 0 0 0 1 0 0 0 1 0 0 0"/>
           <item objectid="2" transform="1 0 0 0 1 0 0 0 1 50 0 0"/>"#,
    );
    let sub = model_xml(&format!(r#"<object id="1">{}</object>"#, fan_mesh(4, None)), "");
    let input = package(&[("3D/3dmodel.model", &root), ("3D/Objects/a.model", &sub)]);

    let resolution = parse_package(input, &ConvertConfig::default()).unwrap();
    let objects = &resolution.model.objects;
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].transform[9], 0.0);
    assert_eq!(objects[1].transform[9], 50.0);
}

#[test]
fn test_root_found_through_relationship() {
    let rels = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/scene.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"#;
    let root = model_xml(
        &format!(r#"<object id="1">{}</object>"#, fan_mesh(2, None)),
        r#"<item objectid="1"/>"#,
    );
    let input = package(&[
        ("_rels/.rels", rels),
        ("3D/aaa.model", "<model/>"),
        ("3D/scene.model", &root),
    ]);

    let resolution = parse_package(input, &ConvertConfig::default()).unwrap();
    assert_eq!(resolution.model.objects.len(), 1);
}

#[test]
fn test_no_model_part() {
    let input = package(&[("readme.txt", "not a model")]);
    assert!(matches!(
        parse_package(input, &ConvertConfig::default()),
        Err(Error::NoModelPart)
    ));
}

#[test]
fn test_malformed_mesh_in_sub_part_names_it() {
    let root = model_xml(
        r#"<object id="1"><components><component objectid="1" p:path="/3D/Objects/bad.model"/></components></object>"#,
        r#"<item objectid="1"/>"#,
    );
    let sub = model_xml(
        r#"<object id="1"><mesh><vertices><vertex x="0" y="0"/></vertices><triangles/></mesh></object>"#,
        "",
    );
    let input = package(&[("3D/3dmodel.model", &root), ("3D/Objects/bad.model", &sub)]);

    match parse_package(input, &ConvertConfig::default()) {
        Err(Error::MalformedMesh { part, message }) => {
            assert_eq!(part, "3D/Objects/bad.model");
            assert!(message.contains("vertex 0"));
        }
        other => panic!("expected MalformedMesh, got {:?}", other),
    }
}

#[test]
fn test_self_referencing_sub_part_is_rejected() {
    let root = model_xml(
        r#"<object id="1"><components><component objectid="1" p:path="/3D/Objects/loop.model"/></components></object>"#,
        r#"<item objectid="1"/>"#,
    );
    let looped = model_xml(
        r#"<object id="1"><components><component objectid="1" p:path="/3D/Objects/loop.model"/></components></object>"#,
        "",
    );
    let input = package(&[("3D/3dmodel.model", &root), ("3D/Objects/loop.model", &looped)]);

    let config = ConvertConfig::new().with_max_depth(16);
    assert!(matches!(
        parse_package(input, &config),
        Err(Error::PackageCorrupt(_))
    ));
}

#[test]
fn test_dangling_build_item_beside_valid_one() {
    let root = model_xml(
        &format!(r#"<object id="1" name="kept">{}</object>"#, fan_mesh(4, None)),
        r#"<item objectid="1" transform="1 0 0 0 1 0 0 0 1 5 0 0"/>
           <item objectid="7"/>"#,
    );
    let input = package(&[("3D/3dmodel.model", &root)]);

    let resolution = parse_package(input, &ConvertConfig::default()).unwrap();
    assert_eq!(resolution.model.objects.len(), 1);
    assert_eq!(resolution.model.objects[0].name, "kept");
    assert_eq!(resolution.model.objects[0].triangles.len(), 4);
    assert_eq!(resolution.model.objects[0].transform[9], 5.0);

    assert_eq!(resolution.warnings.len(), 1);
    let warning = &resolution.warnings[0];
    assert_eq!(warning.object_id, 7);
    assert_eq!(warning.part, "3D/3dmodel.model");
    assert_eq!(warning.referenced_from, "build item 1");
}

#[test]
fn test_all_references_dangling() {
    let root = model_xml("", r#"<item objectid="4"/>"#);
    let input = package(&[("3D/3dmodel.model", &root)]);
    assert!(matches!(
        parse_package(input, &ConvertConfig::default()),
        Err(Error::NoObjectsResolved)
    ));
}
