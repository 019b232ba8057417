use crate::ports::outbound::LicenseRepository;

/// SpdxLicenseRepository resolves license texts from the SPDX license
/// list compiled into the `spdx` crate.
///
/// No network access is involved. Identifiers are matched exactly first,
/// then leniently (`apache-2.0`). `LicenseRef-` identifiers and
/// unknown names resolve to `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpdxLicenseRepository;

impl SpdxLicenseRepository {
    pub fn new() -> Self {
        Self
    }
}

impl LicenseRepository for SpdxLicenseRepository {
    fn license_text(&self, license_id: &str) -> Option<String> {
        let license_id = license_id.trim();
        if license_id.is_empty() || license_id.starts_with("LicenseRef-") {
            return None;
        }

        let id = spdx::license_id(license_id)
            .or_else(|| spdx::imprecise_license_id(license_id).map(|(id, _)| id))?;

        tracing::debug!(license = id.name, "Resolved license text");
        Some(id.text().to_string())
    }
}
