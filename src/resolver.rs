//! Component resolution across model parts
//!
//! Walks the build items of the root part, following object and component
//! references into sub-parts, and produces a flat, build-ordered list of
//! colored [`MeshObject`]s.
//!
//! The ambient [`ColorMap`] is passed down each descent: entering a sub-part
//! lays that part's colors over the caller's map and hands the result to the
//! recursive call only, so sibling branches never see each other's colors.

use crate::error::{Error, Result};
use crate::model::{ColorMap, DEFAULT_COLOR, MeshObject, ResolveWarning, ResolvedModel};
use crate::opc::{Package, normalize_part_name};
use crate::parser::{MeshData, ObjectContent, ObjectResource, Part, parse_part};
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::rc::Rc;
use tracing::{debug, warn};

/// Outcome of resolving a package: the model plus any skipped references
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Resolved objects in build order
    pub model: ResolvedModel,
    /// References that pointed at undefined objects and contributed nothing
    pub warnings: Vec<ResolveWarning>,
}

/// Resolves build items of one package, parsing each part at most once
pub struct Resolver<'a, R: Read + Seek> {
    package: &'a mut Package<R>,
    parts: HashMap<String, Rc<Part>>,
    max_depth: usize,
    warnings: Vec<ResolveWarning>,
}

impl<'a, R: Read + Seek> Resolver<'a, R> {
    /// Create a resolver over an opened package
    ///
    /// `max_depth` bounds component nesting; deeper chains are reported as a
    /// corrupt package.
    pub fn new(package: &'a mut Package<R>, max_depth: usize) -> Self {
        Self {
            package,
            parts: HashMap::new(),
            max_depth,
            warnings: Vec::new(),
        }
    }

    /// Resolve every build item of the root part
    ///
    /// Fails with [`Error::NoObjectsResolved`] if no build item yields a mesh.
    pub fn resolve(mut self, root_path: &str) -> Result<Resolution> {
        let root = self.load_part(root_path)?;

        let mut model = ResolvedModel::new();
        if let Some(unit) = &root.unit {
            model.unit = unit.clone();
        }

        for (index, item) in root.build_items.iter().enumerate() {
            let (part, colors) = match &item.path {
                Some(path) => {
                    let sub = self.load_part(&normalize_part_name(path))?;
                    let colors = root.colors.overlaid(&sub.colors);
                    (sub, colors)
                }
                None => (Rc::clone(&root), root.colors.clone()),
            };

            let context = format!("build item {}", index);
            let mut objects = self.resolve_object(&part, item.objectid, &colors, 0, &context)?;
            for object in &mut objects {
                object.transform = item.transform;
            }
            model.objects.extend(objects);
        }

        if model.objects.is_empty() {
            return Err(Error::NoObjectsResolved);
        }

        Ok(Resolution {
            model,
            warnings: self.warnings,
        })
    }

    /// Resolve one object id within `part` under the ambient `colors`
    fn resolve_object(
        &mut self,
        part: &Rc<Part>,
        id: usize,
        colors: &ColorMap,
        depth: usize,
        referenced_from: &str,
    ) -> Result<Vec<MeshObject>> {
        if depth > self.max_depth {
            return Err(Error::package_corrupt(format!(
                "component references nest deeper than {} levels at object {} in '{}' (cyclic reference?)",
                self.max_depth, id, part.path
            )));
        }

        let Some(resource) = part.objects.get(&id) else {
            let warning = ResolveWarning {
                part: part.path.clone(),
                object_id: id,
                referenced_from: referenced_from.to_string(),
            };
            warn!("skipping unresolved reference: {}", warning);
            self.warnings.push(warning);
            return Ok(Vec::new());
        };

        match &resource.content {
            ObjectContent::Mesh(mesh) => Ok(vec![mesh_object(resource, mesh, colors)]),
            ObjectContent::Components(components) => {
                let mut resolved = Vec::new();
                for (index, component) in components.iter().enumerate() {
                    let context = format!("object {}, component {}", id, index);
                    let objects = match &component.path {
                        Some(path) => {
                            let sub = self.load_part(&normalize_part_name(path))?;
                            let sub_colors = colors.overlaid(&sub.colors);
                            self.resolve_object(
                                &sub,
                                component.objectid,
                                &sub_colors,
                                depth + 1,
                                &context,
                            )?
                        }
                        None => self.resolve_object(
                            part,
                            component.objectid,
                            colors,
                            depth + 1,
                            &context,
                        )?,
                    };
                    resolved.extend(objects);
                }
                Ok(resolved)
            }
            ObjectContent::Empty => {
                debug!(part = %part.path, id, "object has neither mesh nor components");
                Ok(Vec::new())
            }
        }
    }

    /// Parse a part, or return the cached parse
    fn load_part(&mut self, path: &str) -> Result<Rc<Part>> {
        if let Some(part) = self.parts.get(path) {
            return Ok(Rc::clone(part));
        }

        debug!(part = %path, "loading model part");
        let xml = self.package.get_file(path)?;
        let part = Rc::new(parse_part(path, &xml)?);
        self.parts.insert(path.to_string(), Rc::clone(&part));
        Ok(part)
    }
}

/// Build a colored mesh object from a mesh-bearing resource
///
/// Color precedence: the object's own `pid`/`pindex`, then the triangle
/// vote, then gray.
fn mesh_object(resource: &ObjectResource, mesh: &MeshData, colors: &ColorMap) -> MeshObject {
    let extracted = mesh.extract(colors, resource.pid);
    let object_color = match (resource.pid, resource.pindex) {
        (Some(pid), Some(pindex)) => colors.get(pid, pindex).map(str::to_string),
        _ => None,
    };
    let color = object_color
        .or(extracted.voted_color)
        .unwrap_or_else(|| DEFAULT_COLOR.to_string());

    let mut object = MeshObject::new(object_name(resource), resource.id).with_color(&color);
    object.vertices = extracted.vertices;
    object.triangles = extracted.triangles;

    debug!(
        name = %object.name,
        id = object.id,
        color = %object.color,
        vertices = object.vertices.len(),
        triangles = object.triangles.len(),
        "resolved mesh object"
    );
    object
}

fn object_name(resource: &ObjectResource) -> String {
    resource
        .name
        .clone()
        .unwrap_or_else(|| format!("object_{}", resource.id))
}
