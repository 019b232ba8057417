use crate::sbom_generation::domain::SpdxDocument;
use crate::shared::Result;

/// SbomFormatter port for serializing an assembled SPDX document
///
/// Implementations must be pure: the same document always yields the same
/// bytes. Adding an output format means adding an implementation.
pub trait SbomFormatter: Send + Sync {
    /// Serializes the document
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, document: &SpdxDocument) -> Result<String>;

    /// File extension of the output, without the dot
    fn file_extension(&self) -> &'static str;
}
