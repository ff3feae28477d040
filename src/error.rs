//! Error types for 3MF conversion
//!
//! Every error carries a bracketed error code so callers and logs can
//! categorize failures without matching on message text.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and archive errors
//! - **E2xxx**: XML parsing and structure errors
//! - **E3xxx**: Model and resolution errors
//! - **E4xxx**: Output package errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading or writing a file
//! - `E1002`: ZIP archive format error
//! - `E1003`: Package corrupt (missing referenced part, runaway component nesting)
//! - `E1004`: No model part in the archive
//! - `E2001`: XML parsing error
//! - `E2002`: XML attribute error
//! - `E2003`: Invalid XML structure
//! - `E3001`: Malformed mesh data
//! - `E3002`: Numeric parse error
//! - `E3003`: No mesh objects resolved
//! - `E3004`: Object color missing from the extruder map
//! - `E4001`: Invalid thumbnail entry
//! - `E4002`: XML writing error
//!
//! Unresolved component references are deliberately absent from this list:
//! they are reported as [`crate::ResolveWarning`] values and do not abort a
//! conversion.

use std::io;
use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a 3MF package
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading or writing a file
    ///
    /// **Error Code**: E1001
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Corrupted ZIP file
    /// - Unsupported compression method or encrypted entries
    /// - Truncated archive
    #[error("[E1002] ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The package cannot be used as a conversion source
    ///
    /// **Error Code**: E1003
    ///
    /// **Common Causes**:
    /// - A component or build item references a part path that is not in the archive
    /// - Component references nest deeper than the configured bound (usually a cycle)
    #[error("[E1003] Package corrupt: {0}")]
    PackageCorrupt(String),

    /// No root model part could be located
    ///
    /// **Error Code**: E1004
    ///
    /// **Suggestions**:
    /// - Ensure the archive contains `3D/3dmodel.model` or another `.model` entry
    #[error("[E1004] No model part found in archive")]
    NoModelPart,

    /// XML parsing error
    ///
    /// **Error Code**: E2001
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// Invalid XML structure
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - Missing required attributes on `object`, `component` or `item`
    /// - Transform with the wrong number of values
    #[error("[E2003] Invalid XML structure: {0}")]
    InvalidXml(String),

    /// Vertex or triangle data is missing, non-numeric or out of range
    ///
    /// **Error Code**: E3001
    #[error("[E3001] Malformed mesh in '{part}': {message}")]
    MalformedMesh {
        /// Archive path of the part containing the bad element
        part: String,
        /// What was wrong and where
        message: String,
    },

    /// Parse error for numeric values
    ///
    /// **Error Code**: E3002
    #[error("[E3002] Parse error: {0}")]
    ParseError(String),

    /// The package resolved to zero mesh objects
    ///
    /// **Error Code**: E3003
    ///
    /// **Common Causes**:
    /// - Empty build section
    /// - All build items reference objects that do not exist
    #[error("[E3003] No mesh objects found in input package")]
    NoObjectsResolved,

    /// An object color has no extruder slot in the supplied map
    ///
    /// **Error Code**: E3004
    #[error("[E3004] Color {0} has no extruder assigned")]
    UnmappedColor(String),

    /// A supplied thumbnail cannot be placed in the output package
    ///
    /// **Error Code**: E4001
    #[error("[E4001] Invalid thumbnail: {0}")]
    InvalidThumbnail(String),

    /// XML writing error
    ///
    /// **Error Code**: E4002
    #[error("[E4002] XML writing error: {0}")]
    XmlWrite(String),
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Self {
        Error::ParseError(format!("Failed to parse floating-point number: {}", err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::ParseError(format!("Failed to parse integer: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(format!("Attribute parsing failed: {}", err))
    }
}

impl Error {
    /// Create a MalformedMesh error for a part
    ///
    /// # Example
    /// ```ignore
    /// Error::malformed_mesh("3D/3dmodel.model", "vertex 4: missing 'y' coordinate")
    /// ```
    pub fn malformed_mesh(part: &str, message: impl Into<String>) -> Self {
        Error::MalformedMesh {
            part: part.to_string(),
            message: message.into(),
        }
    }

    /// Create an InvalidXml error for a missing required attribute
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Error::InvalidXml(format!(
            "Element '<{}>' is missing required attribute '{}'",
            element, attribute
        ))
    }

    /// Create a PackageCorrupt error
    pub fn package_corrupt(message: impl Into<String>) -> Self {
        Error::PackageCorrupt(message.into())
    }

    /// Create an XmlWrite error
    pub fn xml_write(message: String) -> Self {
        Error::XmlWrite(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_in_messages() {
        let io_err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "test"));
        assert!(io_err.to_string().contains("[E1001]"));

        let corrupt = Error::package_corrupt("missing part");
        assert!(corrupt.to_string().contains("[E1003]"));

        assert!(Error::NoModelPart.to_string().contains("[E1004]"));

        let malformed = Error::malformed_mesh("3D/3dmodel.model", "vertex 0: missing 'x'");
        assert!(malformed.to_string().contains("[E3001]"));

        assert!(Error::NoObjectsResolved.to_string().contains("[E3003]"));

        let thumb = Error::InvalidThumbnail("../x.png".to_string());
        assert!(thumb.to_string().contains("[E4001]"));
    }

    #[test]
    fn test_malformed_mesh_carries_part_path() {
        let err = Error::malformed_mesh("3D/Objects/part.model", "triangle 7: missing 'v2'");
        let msg = err.to_string();
        assert!(msg.contains("3D/Objects/part.model"));
        assert!(msg.contains("triangle 7"));
    }

    #[test]
    fn test_missing_attribute_helper() {
        let err = Error::missing_attribute("component", "objectid");
        assert!(err.to_string().contains("Element '<component>'"));
        assert!(err.to_string().contains("'objectid'"));
        assert!(err.to_string().contains("[E2003]"));
    }

    #[test]
    fn test_parse_int_error_conversion() {
        let parse_err: std::num::ParseIntError = "abc".parse::<usize>().unwrap_err();
        let err = Error::from(parse_err);
        assert!(err.to_string().contains("Failed to parse integer"));
        assert!(err.to_string().contains("[E3002]"));
    }

    #[test]
    fn test_parse_float_error_conversion() {
        let parse_err: std::num::ParseFloatError = "not_a_number".parse::<f64>().unwrap_err();
        let err = Error::from(parse_err);
        assert!(err
            .to_string()
            .contains("Failed to parse floating-point number"));
    }
}
