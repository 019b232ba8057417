/// License text repositories backed by the bundled SPDX license list
mod caching_license_repository;
mod spdx_license_repository;

pub use caching_license_repository::CachingLicenseRepository;
pub use spdx_license_repository::SpdxLicenseRepository;
