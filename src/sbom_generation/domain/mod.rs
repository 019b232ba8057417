pub mod dependency_graph;
pub mod license_info;
pub mod module;
pub mod sbom_metadata;
pub mod spdx_document;

pub use dependency_graph::DependencyGraph;
pub use license_info::LicenseInfo;
pub use module::{
    Checksum, ChecksumAlgorithm, Ecosystem, Module, ModuleKey, Supplier, SupplierKind,
};
pub use sbom_metadata::{license_list_version, SbomMetadata};
pub use spdx_document::{
    ExtractedLicense, PackagePurpose, PurlReference, Relationship, RelationshipType,
    SchemaVersion, SpdxDocument, SpdxPackage, DATA_LICENSE, DOCUMENT_SPDX_ID, NOASSERTION,
};
