use crate::ports::outbound::SbomFormatter;
use crate::sbom_generation::domain::{
    ExtractedLicense, PurlReference, Relationship, SpdxDocument, SpdxPackage, DATA_LICENSE,
    DOCUMENT_SPDX_ID,
};
use crate::shared::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

const INDENT: &[u8] = b"    ";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    spdx_version: &'a str,
    data_license: &'a str,
    #[serde(rename = "SPDXID")]
    spdx_id: &'a str,
    name: &'a str,
    document_namespace: &'a str,
    creation_info: CreationInfo<'a>,
    packages: Vec<Package<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    has_extracted_licensing_infos: Vec<ExtractedLicensingInfo<'a>>,
    relationships: Vec<JsonRelationship<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreationInfo<'a> {
    created: &'a str,
    creators: Vec<String>,
    license_list_version: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Package<'a> {
    name: &'a str,
    #[serde(rename = "SPDXID")]
    spdx_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    version_info: &'a str,
    supplier: &'a str,
    download_location: &'a str,
    files_analyzed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    checksums: Vec<JsonChecksum<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage: Option<&'a str>,
    license_concluded: &'a str,
    license_declared: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    copyright_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_package_purpose: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external_refs: Vec<ExternalRef<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonChecksum<'a> {
    algorithm: &'static str,
    checksum_value: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExternalRef<'a> {
    reference_category: &'static str,
    reference_type: &'static str,
    reference_locator: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractedLicensingInfo<'a> {
    license_id: &'a str,
    name: &'a str,
    extracted_text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRelationship<'a> {
    spdx_element_id: &'a str,
    relationship_type: &'static str,
    related_spdx_element: &'a str,
}

/// SpdxJsonFormatter adapter for SPDX JSON output
///
/// Output is indented with four spaces.
pub struct SpdxJsonFormatter;

impl SpdxJsonFormatter {
    pub fn new() -> Self {
        Self
    }

    fn build_package<'a>(&self, document: &'a SpdxDocument, package: &'a SpdxPackage) -> Package<'a> {
        let category = document.schema.package_manager_category(true);

        Package {
            name: &package.name,
            spdx_id: &package.spdx_id,
            version_info: &package.version,
            supplier: &package.supplier,
            download_location: &package.download_location,
            files_analyzed: false,
            checksums: package
                .checksum
                .iter()
                .map(|c| JsonChecksum {
                    algorithm: c.algorithm.as_spdx(),
                    checksum_value: &c.value,
                })
                .collect(),
            homepage: package.homepage.as_deref(),
            license_concluded: &package.license_concluded,
            license_declared: &package.license_declared,
            copyright_text: package.copyright_text.as_deref(),
            primary_package_purpose: package.primary_purpose.map(|p| p.as_str()),
            external_refs: package
                .purl
                .iter()
                .map(|purl: &PurlReference| ExternalRef {
                    reference_category: category,
                    reference_type: PurlReference::REFERENCE_TYPE,
                    reference_locator: &purl.locator,
                })
                .collect(),
        }
    }

    fn build_extracted<'a>(&self, license: &'a ExtractedLicense) -> ExtractedLicensingInfo<'a> {
        ExtractedLicensingInfo {
            license_id: &license.license_id,
            name: &license.name,
            extracted_text: &license.text,
        }
    }

    fn build_relationship<'a>(&self, relationship: &'a Relationship) -> JsonRelationship<'a> {
        JsonRelationship {
            spdx_element_id: &relationship.element,
            relationship_type: relationship.kind.as_str(),
            related_spdx_element: &relationship.related,
        }
    }
}

impl Default for SpdxJsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SbomFormatter for SpdxJsonFormatter {
    fn format(&self, document: &SpdxDocument) -> Result<String> {
        let json = Document {
            spdx_version: document.schema.spdx_version(),
            data_license: DATA_LICENSE,
            spdx_id: DOCUMENT_SPDX_ID,
            name: &document.name,
            document_namespace: &document.namespace,
            creation_info: CreationInfo {
                created: document.metadata.timestamp(),
                creators: vec![document.metadata.tool_creator()],
                license_list_version: document.metadata.license_list_version(),
            },
            packages: document
                .packages
                .iter()
                .map(|p| self.build_package(document, p))
                .collect(),
            has_extracted_licensing_infos: document
                .extracted_licenses
                .iter()
                .map(|l| self.build_extracted(l))
                .collect(),
            relationships: document
                .relationships
                .iter()
                .map(|r| self.build_relationship(r))
                .collect(),
        };

        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
        json.serialize(&mut serializer)?;
        buffer.push(b'\n');

        Ok(String::from_utf8(buffer)?)
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }
}
