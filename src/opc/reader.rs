//! Package reading and root part discovery

use super::relationships::find_relationship_target;
use super::{MODEL_PATH, MODEL_REL_TYPE, RELS_PATH, normalize_part_name};
use crate::error::{Error, Result};
use std::io::Read;
use tracing::debug;
use zip::ZipArchive;

/// An opened input package (3MF file)
pub struct Package<R: Read> {
    archive: ZipArchive<R>,
}

impl<R: Read + std::io::Seek> Package<R> {
    /// Open a package from a reader
    ///
    /// Only the ZIP container is checked here. Any entry layout is accepted;
    /// the root model part is located separately by [`Package::root_model_path`].
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)
            .map_err(|e| Error::package_corrupt(format!("cannot open archive: {}", e)))?;
        Ok(Self { archive })
    }

    /// Locate the root model part
    ///
    /// Tries the well-known `3D/3dmodel.model`, then the target of the 3D model
    /// relationship in `_rels/.rels`, then the first entry with a `.model`
    /// extension.
    pub fn root_model_path(&mut self) -> Result<String> {
        if self.has_file(MODEL_PATH) {
            return Ok(MODEL_PATH.to_string());
        }

        if let Some(target) = self.relationship_model_target() {
            return Ok(target);
        }

        self.file_names()
            .into_iter()
            .find(|name| name.to_ascii_lowercase().ends_with(".model"))
            .ok_or(Error::NoModelPart)
    }

    /// Target of the root 3D model relationship, if it names an existing entry
    fn relationship_model_target(&mut self) -> Option<String> {
        if !self.has_file(RELS_PATH) {
            return None;
        }

        // A broken relationships part is not fatal: the extension fallback still applies
        let rels = match self.get_file(RELS_PATH) {
            Ok(content) => content,
            Err(e) => {
                debug!("ignoring unreadable {}: {}", RELS_PATH, e);
                return None;
            }
        };

        match find_relationship_target(&rels, MODEL_REL_TYPE) {
            Ok(Some(target)) => {
                let path = normalize_part_name(&target);
                if self.has_file(&path) {
                    Some(path)
                } else {
                    debug!("model relationship points to missing entry '{}'", path);
                    None
                }
            }
            Ok(None) => None,
            Err(e) => {
                debug!("ignoring malformed {}: {}", RELS_PATH, e);
                None
            }
        }
    }

    /// Read a part as UTF-8 text
    ///
    /// A missing entry is reported as a corrupt package, since every caller
    /// reads a part some other part of the package pointed at.
    pub fn get_file(&mut self, name: &str) -> Result<String> {
        let mut file = self.archive.by_name(name).map_err(|_| {
            Error::package_corrupt(format!("referenced part '{}' does not exist", name))
        })?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content)
    }

    /// Check if an entry exists in the archive
    pub fn has_file(&mut self, name: &str) -> bool {
        self.archive.by_name(name).is_ok()
    }

    /// Get the number of entries in the archive
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Check if the archive is empty
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// List all entry names in archive order
    pub fn file_names(&mut self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|i| self.archive.by_index(i).ok().map(|f| f.name().to_string()))
            .collect()
    }
}
