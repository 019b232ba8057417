use spdx_sbom_generator::prelude::*;
use std::collections::HashMap;

/// Mock LicenseRepository serving fixed license texts
#[derive(Default)]
pub struct MockLicenseRepository {
    pub texts: HashMap<String, String>,
}

impl MockLicenseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, license_id: &str, text: &str) -> Self {
        self.texts.insert(license_id.to_string(), text.to_string());
        self
    }
}

impl LicenseRepository for MockLicenseRepository {
    fn license_text(&self, license_id: &str) -> Option<String> {
        self.texts.get(license_id).cloned()
    }
}
