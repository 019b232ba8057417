use crate::ports::outbound::LicenseRepository;
use dashmap::DashMap;
use std::sync::Arc;

/// CachingLicenseRepository wraps a LicenseRepository and memoizes lookups.
///
/// Misses are cached too, so an unknown identifier is only looked up once.
/// The cache is shared between clones and safe for concurrent access.
pub struct CachingLicenseRepository<R: LicenseRepository> {
    inner: R,
    cache: Arc<DashMap<String, Option<String>>>,
}

impl<R: LicenseRepository> CachingLicenseRepository<R> {
    /// Creates a new caching repository wrapping the given inner repository
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Returns the current cache size (for testing/monitoring)
    #[cfg(test)]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl<R: LicenseRepository> LicenseRepository for CachingLicenseRepository<R> {
    fn license_text(&self, license_id: &str) -> Option<String> {
        if let Some(cached) = self.cache.get(license_id) {
            return cached.clone();
        }

        let text = self.inner.license_text(license_id);
        self.cache.insert(license_id.to_string(), text.clone());
        text
    }
}
