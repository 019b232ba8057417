use crate::shared::Result;

/// DocumentSink port receiving fully serialized documents
///
/// The use case only calls the sink once a document is completely
/// serialized, so a sink never sees partial output.
pub trait DocumentSink: Send {
    /// Writes one document
    ///
    /// # Arguments
    /// * `slug` - short identifier of the document (project or ecosystem name),
    ///   used by file-based sinks to name the output
    /// * `extension` - file extension of the serialized format
    /// * `content` - the serialized document
    ///
    /// # Errors
    /// Returns `SbomError::Write` if the destination rejects the write
    fn write_document(&mut self, slug: &str, extension: &str, content: &[u8]) -> Result<()>;
}
