/// LicenseRepository port for resolving full license texts
///
/// Lookups are a pure function of the SPDX license identifier, so
/// implementations may cache freely and be shared across runs.
pub trait LicenseRepository: Send + Sync {
    /// Returns the full text of the license, or `None` when the identifier is unknown
    ///
    /// # Arguments
    /// * `license_id` - SPDX license identifier such as `MIT` or `Apache-2.0`
    fn license_text(&self, license_id: &str) -> Option<String>;
}
