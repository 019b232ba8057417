mod document_assembler;
mod graph_builder;
mod sbom_generator;

pub use document_assembler::{sanitize, AssemblyOptions, DocumentAssembler};
pub use graph_builder::{GraphBuilder, Subgraph};
pub use sbom_generator::{SbomGenerator, TOOL_NAME};
