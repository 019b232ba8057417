/// Data Transfer Objects for application layer
///
/// DTOs carry options into the use case and results back out, keeping the
/// domain layer isolated from the command layer.
mod document_policy;
mod output_format;
mod sbom_request;
mod sbom_response;

pub use document_policy::DocumentPolicy;
pub use output_format::OutputFormat;
pub use sbom_request::{SbomRequest, DEFAULT_ADAPTER_TIMEOUT, DEFAULT_MAX_DEPTH};
pub use sbom_response::{AdapterWarning, GeneratedDocument, SbomResponse};
