//! Package writing for generated archives

use crate::error::Result;
use std::io::Write;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One file destined for the output archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Archive path, without a leading slash
    pub path: String,
    /// File contents
    pub data: Vec<u8>,
}

impl PackageEntry {
    /// Create an entry from raw bytes
    pub fn new(path: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }
}

/// Write fully prepared entries into a new ZIP archive, in order
///
/// All entries are deflate-compressed.
///
/// # Returns
///
/// Returns the writer after finishing the ZIP archive
pub fn write_entries<W: Write + std::io::Seek>(writer: W, entries: &[PackageEntry]) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.path.as_str(), options)?;
        zip.write_all(&entry.data)?;
        debug!(path = %entry.path, bytes = entry.data.len(), "wrote package entry");
    }

    Ok(zip.finish()?)
}
