use crate::shared::error::SbomError;
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum manifest or lockfile size (100 MB).
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Rejects symbolic links for the given path.
///
/// Uses `symlink_metadata()` so the link itself is inspected, not its target.
pub fn validate_not_symlink(path: &Path, operation: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read metadata for {} operation on {}: {}",
            operation,
            path.display(),
            e
        )
    })?;

    if metadata.is_symlink() {
        return Err(SbomError::SecurityError {
            path: path.to_path_buf(),
            reason: format!("{} operations on symbolic links are not allowed", operation),
            hint: "Point the tool at the real file or directory instead of a link".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Reads a manifest or lockfile after the safety checks:
/// - the path must be a regular file, not a symlink
/// - the file must not exceed [`MAX_FILE_SIZE`]
///
/// Failures map to [`SbomError::FileReadError`] or [`SbomError::SecurityError`].
pub fn read_manifest(path: &Path) -> Result<String> {
    let metadata = fs::symlink_metadata(path).map_err(|e| SbomError::FileReadError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    if metadata.is_symlink() {
        return Err(SbomError::SecurityError {
            path: path.to_path_buf(),
            reason: "Manifest is a symbolic link".to_string(),
            hint: "Symbolic links are not followed when reading manifests".to_string(),
        }
        .into());
    }

    if !metadata.is_file() {
        return Err(SbomError::FileReadError {
            path: path.to_path_buf(),
            details: "not a regular file".to_string(),
        }
        .into());
    }

    if metadata.len() > MAX_FILE_SIZE {
        return Err(SbomError::SecurityError {
            path: path.to_path_buf(),
            reason: format!(
                "File is too large ({} bytes). Maximum allowed size is {} bytes",
                metadata.len(),
                MAX_FILE_SIZE
            ),
            hint: "Check that the file is a real manifest and not generated output".to_string(),
        }
        .into());
    }

    fs::read_to_string(path).map_err(|e| {
        SbomError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        }
        .into()
    })
}

/// Validates the scan root: it must exist, be a directory and not be a symlink.
pub fn validate_project_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(SbomError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Directory does not exist".to_string(),
        }
        .into());
    }

    let metadata = fs::symlink_metadata(path).map_err(|e| SbomError::InvalidProjectPath {
        path: path.to_path_buf(),
        reason: format!("Failed to read path metadata: {}", e),
    })?;

    if metadata.is_symlink() {
        return Err(SbomError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Project path is a symbolic link".to_string(),
        }
        .into());
    }

    if !path.is_dir() {
        return Err(SbomError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Not a directory".to_string(),
        }
        .into());
    }

    Ok(())
}
