use spdx_sbom_generator::prelude::*;

/// One document captured by [`MemorySink`]
#[derive(Debug, Clone)]
pub struct CapturedDocument {
    pub slug: String,
    pub extension: String,
    pub content: String,
}

/// Mock DocumentSink that keeps documents in memory
#[derive(Default)]
pub struct MemorySink {
    pub documents: Vec<CapturedDocument>,
    pub should_fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure() -> Self {
        Self {
            documents: Vec::new(),
            should_fail: true,
        }
    }
}

impl DocumentSink for MemorySink {
    fn write_document(&mut self, slug: &str, extension: &str, content: &[u8]) -> Result<()> {
        if self.should_fail {
            return Err(SbomError::Write {
                target: format!("memory:{}", slug),
                details: "Mock sink failure".to_string(),
            }
            .into());
        }
        self.documents.push(CapturedDocument {
            slug: slug.to_string(),
            extension: extension.to_string(),
            content: String::from_utf8_lossy(content).into_owned(),
        });
        Ok(())
    }
}
