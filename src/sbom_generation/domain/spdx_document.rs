use super::{Checksum, SbomMetadata};
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::fmt;
use std::str::FromStr;

pub const NOASSERTION: &str = "NOASSERTION";
pub const DOCUMENT_SPDX_ID: &str = "SPDXRef-DOCUMENT";
pub const DATA_LICENSE: &str = "CC0-1.0";

/// Target SPDX schema version.
///
/// The version only selects which fields are emitted; graph construction is
/// identical for every version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemaVersion {
    V2_2,
    #[default]
    V2_3,
}

impl SchemaVersion {
    pub const SUPPORTED: &'static [&'static str] = &["2.2", "2.3"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V2_2 => "2.2",
            SchemaVersion::V2_3 => "2.3",
        }
    }

    /// Value of the `SPDXVersion` / `spdxVersion` field
    pub fn spdx_version(&self) -> &'static str {
        match self {
            SchemaVersion::V2_2 => "SPDX-2.2",
            SchemaVersion::V2_3 => "SPDX-2.3",
        }
    }

    /// 2.2 makes `PackageCopyrightText` mandatory
    pub fn requires_copyright_text(&self) -> bool {
        matches!(self, SchemaVersion::V2_2)
    }

    /// `PrimaryPackagePurpose` was introduced in 2.3
    pub fn supports_primary_purpose(&self) -> bool {
        matches!(self, SchemaVersion::V2_3)
    }

    /// Spelling of the package-manager external reference category.
    ///
    /// The 2.2 JSON schema uses an underscore; tag-value and 2.3 use a hyphen.
    pub fn package_manager_category(&self, json: bool) -> &'static str {
        match (self, json) {
            (SchemaVersion::V2_2, true) => "PACKAGE_MANAGER",
            _ => "PACKAGE-MANAGER",
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = anyhow::Error;

    /// Accepts `2.3`, `v2.3` and `SPDX-2.3` spellings.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let normalized = trimmed
            .strip_prefix("SPDX-")
            .or_else(|| trimmed.strip_prefix("spdx-"))
            .or_else(|| trimmed.strip_prefix('v'))
            .unwrap_or(trimmed);

        match normalized {
            "2.2" => Ok(SchemaVersion::V2_2),
            "2.3" => Ok(SchemaVersion::V2_3),
            _ => Err(SbomError::Schema {
                requested: s.to_string(),
                supported: Self::SUPPORTED.join(", "),
            }
            .into()),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagePurpose {
    Application,
    Library,
}

impl PackagePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackagePurpose::Application => "APPLICATION",
            PackagePurpose::Library => "LIBRARY",
        }
    }
}

/// Package URL external reference (category `PACKAGE-MANAGER`, type `purl`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurlReference {
    pub locator: String,
}

impl PurlReference {
    pub const REFERENCE_TYPE: &'static str = "purl";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpdxPackage {
    pub spdx_id: String,
    pub name: String,
    pub version: String,
    /// `Person: ...`, `Organization: ...` or `NOASSERTION`
    pub supplier: String,
    pub download_location: String,
    pub homepage: Option<String>,
    pub checksum: Option<Checksum>,
    pub license_concluded: String,
    pub license_declared: String,
    /// Present only for schemas that require it
    pub copyright_text: Option<String>,
    /// Present only for schemas that support it
    pub primary_purpose: Option<PackagePurpose>,
    pub purl: Option<PurlReference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipType {
    Describes,
    DependsOn,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Describes => "DESCRIBES",
            RelationshipType::DependsOn => "DEPENDS_ON",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub element: String,
    pub kind: RelationshipType,
    pub related: String,
}

impl Relationship {
    pub fn describes(related: impl Into<String>) -> Self {
        Self {
            element: DOCUMENT_SPDX_ID.to_string(),
            kind: RelationshipType::Describes,
            related: related.into(),
        }
    }

    pub fn depends_on(element: impl Into<String>, related: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            kind: RelationshipType::DependsOn,
            related: related.into(),
        }
    }
}

/// Extracted licensing info carrying the full text of a referenced license
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLicense {
    /// `LicenseRef-<id>`
    pub license_id: String,
    /// The SPDX identifier the text was looked up for
    pub name: String,
    pub text: String,
}

/// Assembled SPDX document, independent of the output format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpdxDocument {
    pub schema: SchemaVersion,
    pub name: String,
    pub namespace: String,
    pub metadata: SbomMetadata,
    pub packages: Vec<SpdxPackage>,
    pub extracted_licenses: Vec<ExtractedLicense>,
    pub relationships: Vec<Relationship>,
}

impl SpdxDocument {
    pub fn relationships_of(&self, kind: RelationshipType) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter().filter(move |r| r.kind == kind)
    }
}
