/// Output format enumeration for SPDX documents
///
/// Both the CLI (inbound adapter) and the formatter factory need to
/// understand it, so it lives in the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// SPDX tag-value text (default)
    #[default]
    Spdx,
    /// SPDX JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spdx" | "tag-value" | "tv" => Ok(OutputFormat::Spdx),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid format: {}. Please specify 'spdx' or 'json'",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Spdx => write!(f, "spdx"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("spdx").unwrap(), OutputFormat::Spdx);
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("tag-value").unwrap(), OutputFormat::Spdx);
    }

    #[test]
    fn test_output_format_from_str_case_insensitive() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("Spdx").unwrap(), OutputFormat::Spdx);
    }

    #[test]
    fn test_output_format_from_str_invalid() {
        let error = OutputFormat::from_str("cyclonedx").unwrap_err();
        assert!(error.contains("Invalid format"));
        assert!(error.contains("cyclonedx"));
        assert!(error.contains("spdx"));
        assert!(OutputFormat::from_str("").is_err());
    }

    #[test]
    fn test_output_format_default_and_display() {
        assert_eq!(OutputFormat::default(), OutputFormat::Spdx);
        assert_eq!(OutputFormat::Spdx.to_string(), "spdx");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
