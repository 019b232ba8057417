use clap::Parser;
use std::path::PathBuf;

use crate::application::dto::OutputFormat;
use crate::sbom_generation::domain::SchemaVersion;

/// Generate SPDX SBOMs for projects in any supported package ecosystem
///
/// Options left unset fall back to the config file, then to built-in defaults.
#[derive(Parser, Debug, Default)]
#[command(name = "spdx-sbom-generator")]
#[command(version)]
#[command(
    about = "Generate SPDX 2.2/2.3 SBOMs for npm, yarn, Cargo, Go, Python, Composer, Maven, NuGet and Bundler projects",
    long_about = None
)]
pub struct Args {
    /// Path to the project directory to scan (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Include the full text of each referenced license
    #[arg(short, long)]
    pub include_license_text: bool,

    /// Target SPDX schema version: 2.2 or 2.3 (default 2.3)
    #[arg(short, long)]
    pub schema: Option<SchemaVersion>,

    /// Directory the documents are written to (defaults to current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output format: spdx (tag-value) or json (default spdx); other values are rejected, not treated as spdx
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Alternate Maven global settings file
    #[arg(short, long, value_name = "FILE")]
    pub global_settings: Option<PathBuf>,

    /// Restrict and order the adapters to run; repeatable: --plugin npm --plugin cargo
    #[arg(long = "plugin", value_name = "NAME")]
    pub plugins: Vec<String>,

    /// Write one document per ecosystem instead of a single merged document
    #[arg(long)]
    pub per_ecosystem: bool,

    /// Per-adapter timeout in seconds (default 120)
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Maximum directory depth searched for projects (default 4)
    #[arg(long, value_name = "DEPTH")]
    pub max_depth: Option<usize>,

    /// Path to a config file (default: sbomgen.config.yml in the scan root)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write documents to stdout instead of files
    #[arg(long)]
    pub stdout: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("spdx-sbom-generator").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_are_unset() {
        let args = parse(&[]).unwrap();
        assert!(args.path.is_none());
        assert!(!args.include_license_text);
        assert!(args.schema.is_none());
        assert!(args.format.is_none());
        assert!(args.plugins.is_empty());
        assert!(!args.per_ecosystem);
        assert!(args.timeout.is_none());
        assert!(!args.stdout);
    }

    #[test]
    fn test_short_flags() {
        let args = parse(&[
            "-p", "/project", "-i", "-s", "2.2", "-o", "/out", "-f", "JSON", "-g", "settings.xml",
        ])
        .unwrap();

        assert_eq!(args.path, Some(PathBuf::from("/project")));
        assert!(args.include_license_text);
        assert_eq!(args.schema, Some(SchemaVersion::V2_2));
        assert_eq!(args.output_dir, Some(PathBuf::from("/out")));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.global_settings, Some(PathBuf::from("settings.xml")));
    }

    #[test]
    fn test_repeatable_plugin() {
        let args = parse(&["--plugin", "cargo", "--plugin", "npm", "--per-ecosystem"]).unwrap();
        assert_eq!(args.plugins, vec!["cargo", "npm"]);
        assert!(args.per_ecosystem);
    }

    #[test]
    fn test_format_help_states_unknown_values_are_rejected() {
        use clap::CommandFactory;

        let help = Args::command().render_help().to_string();
        assert!(help.contains("other values are rejected, not treated as spdx"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse(&["-f", "cyclonedx"]).is_err());
        assert!(parse(&["-s", "3.0"]).is_err());
        assert!(parse(&["--timeout", "0"]).is_err());
    }
}
