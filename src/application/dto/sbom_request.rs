use super::{DocumentPolicy, OutputFormat};
use crate::sbom_generation::domain::SchemaVersion;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// SbomRequest - options for one SBOM generation run
///
/// Built by the command layer from flags and the config file.
#[derive(Debug, Clone)]
pub struct SbomRequest {
    /// Scan root
    pub project_path: PathBuf,
    pub schema: SchemaVersion,
    pub format: OutputFormat,
    /// Directory file sinks write into
    pub output_dir: PathBuf,
    pub include_license_text: bool,
    /// Ecosystem-specific settings file (alternate Maven global settings)
    pub auxiliary_settings: Option<PathBuf>,
    /// Adapter names restricting and ordering the registry; empty means all
    pub plugins: Vec<String>,
    pub adapter_timeout: Duration,
    /// Depth bound for the detection walk
    pub max_depth: usize,
    pub document_policy: DocumentPolicy,
}

impl SbomRequest {
    pub fn new(project_path: PathBuf) -> Self {
        Self {
            project_path,
            schema: SchemaVersion::default(),
            format: OutputFormat::default(),
            output_dir: PathBuf::from("."),
            include_license_text: false,
            auxiliary_settings: None,
            plugins: Vec::new(),
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            max_depth: DEFAULT_MAX_DEPTH,
            document_policy: DocumentPolicy::default(),
        }
    }

    pub fn with_schema(mut self, schema: SchemaVersion) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_license_text(mut self, include: bool) -> Self {
        self.include_license_text = include;
        self
    }

    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    pub fn with_document_policy(mut self, policy: DocumentPolicy) -> Self {
        self.document_policy = policy;
        self
    }
}
