use crate::ports::outbound::DocumentSink;
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// FileSystemSink adapter writing each document to `bom-<slug>.<ext>`
///
/// Documents land in the configured output directory. Existing files are
/// overwritten, but never through a symbolic link.
pub struct FileSystemSink {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileSystemSink {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            written: Vec::new(),
        }
    }

    /// Paths written so far, in write order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_error(path: &Path, details: impl Into<String>) -> anyhow::Error {
        SbomError::Write {
            target: path.display().to_string(),
            details: details.into(),
        }
        .into()
    }

    /// Validates that the output directory exists
    fn validate_output_dir(&self, target: &Path) -> Result<()> {
        if !self.output_dir.is_dir() {
            return Err(Self::write_error(
                target,
                format!(
                    "Output directory does not exist: {}",
                    self.output_dir.display()
                ),
            ));
        }
        Ok(())
    }

    /// Rejects an existing target that is a symbolic link
    fn validate_target(target: &Path) -> Result<()> {
        let Ok(metadata) = fs::symlink_metadata(target) else {
            return Ok(());
        };
        if metadata.is_symlink() {
            return Err(Self::write_error(
                target,
                "Security: Output path is a symbolic link. For security reasons, writing to symbolic links is not allowed.",
            ));
        }
        Ok(())
    }
}

/// Output file name for a document slug
pub fn document_file_name(slug: &str, extension: &str) -> String {
    format!("bom-{}.{}", slug, extension)
}

impl DocumentSink for FileSystemSink {
    fn write_document(&mut self, slug: &str, extension: &str, content: &[u8]) -> Result<()> {
        let target = self.output_dir.join(document_file_name(slug, extension));
        self.validate_output_dir(&target)?;
        Self::validate_target(&target)?;

        fs::write(&target, content).map_err(|e| Self::write_error(&target, e.to_string()))?;

        tracing::info!(path = %target.display(), bytes = content.len(), "Document written");
        self.written.push(target);
        Ok(())
    }
}
