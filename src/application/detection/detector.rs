//! Project detection: which adapters apply to which directories

use super::AdapterRegistry;
use crate::application::dto::DEFAULT_MAX_DEPTH;
use crate::ports::outbound::EcosystemAdapter;
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

/// Vendor and dependency-cache directories never scanned for projects
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "__pycache__",
    "venv",
    ".venv",
    "bower_components",
    "build",
    "dist",
    "bin",
    "obj",
];

/// One (adapter, project directory) pair to extract
#[derive(Clone)]
pub struct ExtractionJob {
    /// Position in job order
    pub index: usize,
    pub adapter: Arc<dyn EcosystemAdapter>,
    pub directory: PathBuf,
}

impl std::fmt::Debug for ExtractionJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionJob")
            .field("index", &self.index)
            .field("adapter", &self.adapter.name())
            .field("directory", &self.directory)
            .finish()
    }
}

pub struct Detector {
    max_depth: usize,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Detector {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Walks `root` and pairs every applicable adapter with every project directory.
    ///
    /// Jobs are ordered by adapter registration order, then by directory path.
    /// An `is_applicable` error only disqualifies that adapter for that directory.
    ///
    /// # Errors
    /// `SbomError::Detection` when no adapter applies anywhere.
    pub fn detect(&self, registry: &AdapterRegistry, root: &Path) -> Result<Vec<ExtractionJob>> {
        let directories = self.project_directories(root);
        tracing::debug!(
            root = %root.display(),
            directories = directories.len(),
            "Scanned directory tree"
        );

        let mut jobs = Vec::new();
        for adapter in registry.adapters() {
            for directory in &directories {
                match adapter.is_applicable(directory) {
                    Ok(true) => {
                        tracing::info!(
                            adapter = adapter.name(),
                            directory = %directory.display(),
                            "Detected project"
                        );
                        jobs.push(ExtractionJob {
                            index: jobs.len(),
                            adapter: Arc::clone(adapter),
                            directory: directory.clone(),
                        });
                    }
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(
                            adapter = adapter.name(),
                            directory = %directory.display(),
                            error = %e,
                            "Applicability check failed; skipping"
                        );
                    }
                }
            }
        }

        if jobs.is_empty() {
            return Err(SbomError::Detection {
                path: root.to_path_buf(),
                searched: registry.names().join(", "),
            }
            .into());
        }

        Ok(jobs)
    }

    /// Candidate directories under `root`, sorted by path
    fn project_directories(&self, root: &Path) -> Vec<PathBuf> {
        let mut directories: Vec<PathBuf> = WalkDir::new(root)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_entry(|e| !is_excluded(e, root))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable path during detection");
                    None
                }
            })
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();

        directories.sort();
        directories
    }
}

fn is_excluded(entry: &DirEntry, root: &Path) -> bool {
    if entry.path() == root || !entry.file_type().is_dir() {
        return false;
    }

    match entry.file_name().to_str() {
        Some(name) => {
            EXCLUDED_DIRS.contains(&name) || (name.starts_with('.') && name.len() > 1)
        }
        None => false,
    }
}
