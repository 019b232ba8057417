/// Filesystem and stream sinks for serialized documents
mod file_sink;
mod writer_sink;

pub use file_sink::{document_file_name, FileSystemSink};
pub use writer_sink::WriterSink;
