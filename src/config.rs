//! Configuration file support.
//!
//! Provides YAML-based configuration through `sbomgen.config.yml` files,
//! including data structures, file loading, validation and merging with
//! command-line arguments.

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::application::dto::{DocumentPolicy, OutputFormat, SbomRequest};
use crate::cli::Args;
use crate::sbom_generation::domain::SchemaVersion;
use crate::shared::error::SbomError;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "sbomgen.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub format: Option<String>,
    pub schema: Option<String>,
    pub include_license_text: Option<bool>,
    pub global_settings: Option<PathBuf>,
    pub plugins: Option<Vec<String>>,
    pub adapter_timeout_secs: Option<u64>,
    pub max_depth: Option<usize>,
    pub document_policy: Option<DocumentPolicy>,
    pub output_dir: Option<PathBuf>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    // An empty file deserializes to YAML null
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.is_file() {
        return Ok(None);
    }

    tracing::debug!(path = %config_path.display(), "Using discovered config file");
    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

fn config_error(message: String) -> anyhow::Error {
    SbomError::Configuration { message }.into()
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(format) = &config.format {
        OutputFormat::from_str(format).map_err(config_error)?;
    }
    if let Some(schema) = &config.schema {
        SchemaVersion::from_str(schema)?;
    }
    if config.adapter_timeout_secs == Some(0) {
        return Err(config_error(
            "adapter_timeout_secs must be greater than 0".to_string(),
        ));
    }
    if let Some(plugins) = &config.plugins {
        if let Some(i) = plugins.iter().position(|p| p.trim().is_empty()) {
            return Err(config_error(format!("plugins[{}] must not be empty", i)));
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        tracing::warn!(field = %key, "Unknown config field will be ignored");
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}

/// Builds the generation request: CLI flags override file values, which
/// override built-in defaults.
pub fn build_request(args: &Args, config: Option<ConfigFile>) -> Result<SbomRequest> {
    let config = config.unwrap_or_default();
    let project_path = args.path.clone().unwrap_or_else(|| PathBuf::from("."));

    let format = match (args.format, &config.format) {
        (Some(format), _) => format,
        (None, Some(format)) => OutputFormat::from_str(format).map_err(config_error)?,
        (None, None) => OutputFormat::default(),
    };
    let schema = match (args.schema, &config.schema) {
        (Some(schema), _) => schema,
        (None, Some(schema)) => SchemaVersion::from_str(schema)?,
        (None, None) => SchemaVersion::default(),
    };

    let mut request = SbomRequest::new(project_path)
        .with_format(format)
        .with_schema(schema)
        .with_license_text(args.include_license_text || config.include_license_text.unwrap_or(false));

    if let Some(timeout) = args.timeout.or(config.adapter_timeout_secs) {
        request = request.with_adapter_timeout(Duration::from_secs(timeout));
    }
    if let Some(max_depth) = args.max_depth.or(config.max_depth) {
        request.max_depth = max_depth;
    }
    if let Some(output_dir) = args.output_dir.clone().or(config.output_dir) {
        request.output_dir = output_dir;
    }
    request.auxiliary_settings = args.global_settings.clone().or(config.global_settings);
    request.plugins = if args.plugins.is_empty() {
        config.plugins.unwrap_or_default()
    } else {
        args.plugins.clone()
    };

    let policy = if args.per_ecosystem {
        DocumentPolicy::PerEcosystem
    } else {
        config.document_policy.unwrap_or_default()
    };
    Ok(request.with_document_policy(policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
format: json
schema: "2.2"
include_license_text: true
global_settings: /etc/maven/settings.xml
plugins:
  - cargo
  - npm
adapter_timeout_secs: 30
max_depth: 2
document_policy: per-ecosystem
"#,
        );

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.format.as_deref(), Some("json"));
        assert_eq!(config.schema.as_deref(), Some("2.2"));
        assert_eq!(config.include_license_text, Some(true));
        assert_eq!(
            config.global_settings,
            Some(PathBuf::from("/etc/maven/settings.xml"))
        );
        assert_eq!(
            config.plugins.as_deref(),
            Some(&["cargo".to_string(), "npm".to_string()][..])
        );
        assert_eq!(config.adapter_timeout_secs, Some(30));
        assert_eq!(config.max_depth, Some(2));
        assert_eq!(config.document_policy, Some(DocumentPolicy::PerEcosystem));
        assert!(config.unknown_fields.is_empty());
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "format: spdx\n");

        let config = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.format.as_deref(), Some("spdx"));
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_empty_config_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "\n");
        let config = load_config_from_path(&path).unwrap();
        assert!(config.format.is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config_from_path(Path::new("/nonexistent/config.yml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "invalid: yaml: [[[broken");

        let err = load_config_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();

        let path = write_config(&dir, "format: cyclonedx\n");
        let err = load_config_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid format"));

        let path = write_config(&dir, "schema: \"3.0\"\n");
        let err = load_config_from_path(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SbomError>(),
            Some(SbomError::Schema { .. })
        ));

        let path = write_config(&dir, "adapter_timeout_secs: 0\n");
        assert!(load_config_from_path(&path).is_err());
    }

    #[test]
    fn test_unknown_fields_warning() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "format: json\ncheck_cve: true\n");

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.unknown_fields.len(), 1);
        assert!(config.unknown_fields.contains_key("check_cve"));
    }

    #[test]
    fn test_build_request_defaults() {
        let request = build_request(&Args::default(), None).unwrap();

        assert_eq!(request.project_path, PathBuf::from("."));
        assert_eq!(request.format, OutputFormat::Spdx);
        assert_eq!(request.schema, SchemaVersion::V2_3);
        assert_eq!(request.adapter_timeout, Duration::from_secs(120));
        assert_eq!(request.document_policy, DocumentPolicy::Merged);
    }

    #[test]
    fn test_build_request_cli_overrides_config() {
        let config = ConfigFile {
            format: Some("json".to_string()),
            schema: Some("2.2".to_string()),
            plugins: Some(vec!["npm".to_string()]),
            adapter_timeout_secs: Some(30),
            max_depth: Some(1),
            document_policy: Some(DocumentPolicy::PerEcosystem),
            ..Default::default()
        };
        let args = Args {
            format: Some(OutputFormat::Spdx),
            plugins: vec!["cargo".to_string()],
            timeout: Some(5),
            ..Default::default()
        };

        let request = build_request(&args, Some(config)).unwrap();
        assert_eq!(request.format, OutputFormat::Spdx);
        assert_eq!(request.schema, SchemaVersion::V2_2);
        assert_eq!(request.plugins, vec!["cargo"]);
        assert_eq!(request.adapter_timeout, Duration::from_secs(5));
        assert_eq!(request.max_depth, 1);
        assert_eq!(request.document_policy, DocumentPolicy::PerEcosystem);
    }
}
