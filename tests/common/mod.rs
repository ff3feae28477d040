//! Shared helpers for building input packages in memory and reading output back

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const CORE_NS: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";
pub const PROD_NS: &str = "http://schemas.microsoft.com/3dmanufacturing/production/2015/06";

/// Build a ZIP archive from (path, content) pairs
pub fn package(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    let mut cursor = zip.finish().unwrap();
    cursor.set_position(0);
    cursor
}

/// Wrap resources and build sections into a model document
pub fn model_xml(resources: &str, build: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xml:lang="en-US" xmlns="{}" xmlns:p="{}">
  <resources>
{}
  </resources>
  <build>
{}
  </build>
</model>"#,
        CORE_NS, PROD_NS, resources, build
    )
}

/// A mesh element with `triangles` triangles in a fan, optionally colored by `pid`/`p1`
pub fn fan_mesh(triangles: usize, color: Option<(usize, usize)>) -> String {
    let mut xml = String::from("<mesh><vertices>");
    xml.push_str(r#"<vertex x="0" y="0" z="0"/>"#);
    for i in 0..=triangles {
        let angle = i as f64 * 0.3;
        xml.push_str(&format!(
            r#"<vertex x="{}" y="{}" z="1"/>"#,
            angle.cos(),
            angle.sin()
        ));
    }
    xml.push_str("</vertices><triangles>");
    for i in 0..triangles {
        let property = match color {
            Some((pid, p1)) => format!(r#" pid="{}" p1="{}""#, pid, p1),
            None => String::new(),
        };
        xml.push_str(&format!(
            r#"<triangle v1="0" v2="{}" v3="{}"{}/>"#,
            i + 1,
            i + 2,
            property
        ));
    }
    xml.push_str("</triangles></mesh>");
    xml
}

/// Read every entry of an output archive as (name, text)
pub fn read_output(bytes: Vec<u8>) -> Vec<(String, String)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        entries.push((
            file.name().to_string(),
            String::from_utf8_lossy(&data).into_owned(),
        ));
    }
    entries
}

/// Content of the output entry at `path`
pub fn entry<'a>(entries: &'a [(String, String)], path: &str) -> &'a str {
    entries
        .iter()
        .find(|(name, _)| name == path)
        .map(|(_, content)| content.as_str())
        .unwrap_or_else(|| panic!("missing entry {}", path))
}
