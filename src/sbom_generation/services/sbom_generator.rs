use crate::sbom_generation::domain::SbomMetadata;
use chrono::{SecondsFormat, Utc};

pub const TOOL_NAME: &str = "spdx-sbom-generator";

/// SbomGenerator service for generating SPDX creation info
pub struct SbomGenerator;

impl SbomGenerator {
    /// Generates metadata stamped with the current UTC time (RFC3339, second precision)
    pub fn generate_metadata(tool_name: &str, tool_version: &str) -> SbomMetadata {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        SbomMetadata::new(timestamp, tool_name.to_string(), tool_version.to_string())
    }

    /// Generates metadata with this tool's name and compile-time version
    pub fn generate_default_metadata() -> SbomMetadata {
        Self::generate_metadata(TOOL_NAME, env!("CARGO_PKG_VERSION"))
    }
}
