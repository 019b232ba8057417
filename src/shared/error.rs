use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// Warnings from individual ecosystems do not change the exit code; a run
/// that produced a document always exits with `Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// A document was written (possibly with adapter warnings)
    Success = 0,
    /// The run failed and no document was written
    Failure = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::Failure => write!(f, "Failure (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
        }
    }
}

/// Application-specific errors for SBOM generation.
///
/// `AdapterExecution` and `NotFound` are scoped to a single ecosystem and are
/// downgraded to warnings by the generation use case. Every other variant is
/// fatal for the run.
#[derive(Debug, Error)]
pub enum SbomError {
    #[error("No supported package manager found in: {path}\nSearched with: {searched}\n\n💡 Hint: Run from a project root containing a manifest (package.json, Cargo.toml, go.mod, pom.xml, ...) or pass --path")]
    Detection { path: PathBuf, searched: String },

    #[error("{adapter}: package manager execution failed\nDetails: {details}")]
    AdapterExecution { adapter: String, details: String },

    #[error("{adapter}: manifest {manifest} not found in {path}")]
    NotFound {
        adapter: String,
        manifest: String,
        path: PathBuf,
    },

    #[error("Dependency reference {reference} could not be resolved\nDetails: {details}")]
    Resolution { reference: String, details: String },

    #[error("Unsupported SPDX schema version: {requested}\n\n💡 Hint: Supported versions are {supported}")]
    Schema { requested: String, supported: String },

    #[error("Failed to write SBOM to {target}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    Write { target: String, details: String },

    #[error("None of the {attempted} applicable package manager(s) produced dependency data; no document was written")]
    NoAdapterSucceeded { attempted: usize },

    #[error("SBOM generation was cancelled before the document was written")]
    Cancelled,

    #[error("Invalid project path: {path}\nReason: {reason}\n\n💡 Hint: Please specify a valid project directory")]
    InvalidProjectPath { path: PathBuf, reason: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Failed to parse {path}\nDetails: {details}")]
    ManifestParse { path: PathBuf, details: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl SbomError {
    /// Whether this error only affects one ecosystem adapter.
    pub fn is_adapter_scoped(&self) -> bool {
        matches!(
            self,
            SbomError::AdapterExecution { .. }
                | SbomError::NotFound { .. }
                | SbomError::ManifestParse { .. }
                | SbomError::FileReadError { .. }
                | SbomError::SecurityError { .. }
        )
    }
}
