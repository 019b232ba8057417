/// SPDX license list version the license identifiers are validated against,
/// as `major.minor`
pub fn license_list_version() -> String {
    let full = spdx::license_version();
    let mut parts = full.splitn(3, '.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => format!("{}.{}", major, minor),
        _ => full.to_string(),
    }
}

/// SbomMetadata value object holding the SPDX creation info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbomMetadata {
    timestamp: String,
    tool_name: String,
    tool_version: String,
    license_list_version: String,
}

impl SbomMetadata {
    pub fn new(timestamp: String, tool_name: String, tool_version: String) -> Self {
        Self {
            timestamp,
            tool_name,
            tool_version,
            license_list_version: license_list_version(),
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    pub fn license_list_version(&self) -> &str {
        &self.license_list_version
    }

    /// Creator line in SPDX form, e.g. `Tool: spdx-sbom-generator-0.4.0`
    pub fn tool_creator(&self) -> String {
        format!("Tool: {}-{}", self.tool_name, self.tool_version)
    }

    /// Same metadata with a different timestamp
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sbom_metadata_new() {
        let metadata = SbomMetadata::new(
            "2024-01-01T00:00:00Z".to_string(),
            "spdx-sbom-generator".to_string(),
            "0.4.0".to_string(),
        );

        assert_eq!(metadata.timestamp(), "2024-01-01T00:00:00Z");
        assert_eq!(metadata.tool_name(), "spdx-sbom-generator");
        assert_eq!(metadata.tool_version(), "0.4.0");
        assert_eq!(metadata.license_list_version(), license_list_version());
        assert_eq!(metadata.tool_creator(), "Tool: spdx-sbom-generator-0.4.0");
    }

    #[test]
    fn test_license_list_version_follows_spdx_crate() {
        let version = license_list_version();
        assert!(spdx::license_version().starts_with(&format!("{}.", version)));
        assert_eq!(version.split('.').count(), 2);
    }

    #[test]
    fn test_with_timestamp() {
        let metadata = SbomMetadata::new("a".to_string(), "t".to_string(), "1".to_string())
            .with_timestamp("2020-02-02T00:00:00Z");
        assert_eq!(metadata.timestamp(), "2020-02-02T00:00:00Z");
    }
}
