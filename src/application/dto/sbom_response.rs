use std::path::PathBuf;

/// Non-fatal failure of one extraction job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterWarning {
    pub adapter: String,
    pub directory: PathBuf,
    pub message: String,
}

impl std::fmt::Display for AdapterWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.adapter,
            self.directory.display(),
            self.message
        )
    }
}

/// Summary of one written document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub slug: String,
    pub name: String,
    pub package_count: usize,
    pub relationship_count: usize,
}

/// SbomResponse - aggregate result of a successful run
///
/// A run that failed outright is an `Err`; a response always means at least
/// one document was written, possibly with adapter warnings.
#[derive(Debug, Clone, Default)]
pub struct SbomResponse {
    pub documents: Vec<GeneratedDocument>,
    pub warnings: Vec<AdapterWarning>,
}

impl SbomResponse {
    pub fn new(documents: Vec<GeneratedDocument>, warnings: Vec<AdapterWarning>) -> Self {
        Self {
            documents,
            warnings,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn total_packages(&self) -> usize {
        self.documents.iter().map(|d| d.package_count).sum()
    }
}
