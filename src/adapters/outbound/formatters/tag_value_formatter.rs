use crate::ports::outbound::SbomFormatter;
use crate::sbom_generation::domain::{
    PurlReference, SpdxDocument, SpdxPackage, DATA_LICENSE, DOCUMENT_SPDX_ID,
};
use crate::shared::Result;
use std::fmt::Write;

/// TagValueFormatter adapter for the SPDX tag-value format
///
/// Emits the document header, every package in document order, the
/// extracted licensing infos and finally the relationships.
pub struct TagValueFormatter;

impl TagValueFormatter {
    pub fn new() -> Self {
        Self
    }

    fn write_header(&self, out: &mut String, document: &SpdxDocument) -> std::fmt::Result {
        writeln!(out, "SPDXVersion: {}", document.schema.spdx_version())?;
        writeln!(out, "DataLicense: {}", DATA_LICENSE)?;
        writeln!(out, "SPDXID: {}", DOCUMENT_SPDX_ID)?;
        writeln!(out, "DocumentName: {}", document.name)?;
        writeln!(out, "DocumentNamespace: {}", document.namespace)?;
        writeln!(out, "Creator: {}", document.metadata.tool_creator())?;
        writeln!(out, "Created: {}", document.metadata.timestamp())?;
        writeln!(
            out,
            "LicenseListVersion: {}",
            document.metadata.license_list_version()
        )
    }

    fn write_package(
        &self,
        out: &mut String,
        document: &SpdxDocument,
        package: &SpdxPackage,
    ) -> std::fmt::Result {
        writeln!(out)?;
        writeln!(out, "##### Package: {}", package.name)?;
        writeln!(out)?;
        writeln!(out, "PackageName: {}", package.name)?;
        writeln!(out, "SPDXID: {}", package.spdx_id)?;
        if !package.version.is_empty() {
            writeln!(out, "PackageVersion: {}", package.version)?;
        }
        writeln!(out, "PackageSupplier: {}", package.supplier)?;
        writeln!(out, "PackageDownloadLocation: {}", package.download_location)?;
        writeln!(out, "FilesAnalyzed: false")?;
        if let Some(checksum) = &package.checksum {
            writeln!(
                out,
                "PackageChecksum: {}: {}",
                checksum.algorithm.as_spdx(),
                checksum.value
            )?;
        }
        if let Some(homepage) = &package.homepage {
            writeln!(out, "PackageHomePage: {}", homepage)?;
        }
        writeln!(out, "PackageLicenseConcluded: {}", package.license_concluded)?;
        writeln!(out, "PackageLicenseDeclared: {}", package.license_declared)?;
        if let Some(copyright) = &package.copyright_text {
            writeln!(out, "PackageCopyrightText: {}", copyright)?;
        }
        if let Some(purpose) = package.primary_purpose {
            writeln!(out, "PrimaryPackagePurpose: {}", purpose.as_str())?;
        }
        if let Some(purl) = &package.purl {
            writeln!(
                out,
                "ExternalRef: {} {} {}",
                document.schema.package_manager_category(false),
                PurlReference::REFERENCE_TYPE,
                purl.locator
            )?;
        }
        Ok(())
    }

    fn write_document(&self, out: &mut String, document: &SpdxDocument) -> std::fmt::Result {
        self.write_header(out, document)?;

        for package in &document.packages {
            self.write_package(out, document, package)?;
        }

        if !document.extracted_licenses.is_empty() {
            writeln!(out)?;
            writeln!(out, "##### Other Licenses")?;
            for license in &document.extracted_licenses {
                writeln!(out)?;
                writeln!(out, "LicenseID: {}", license.license_id)?;
                writeln!(out, "LicenseName: {}", license.name)?;
                writeln!(out, "ExtractedText: <text>{}</text>", license.text)?;
            }
        }

        if !document.relationships.is_empty() {
            writeln!(out)?;
            writeln!(out, "##### Relationships")?;
            writeln!(out)?;
            for relationship in &document.relationships {
                writeln!(
                    out,
                    "Relationship: {} {} {}",
                    relationship.element,
                    relationship.kind.as_str(),
                    relationship.related
                )?;
            }
        }
        Ok(())
    }
}

impl Default for TagValueFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SbomFormatter for TagValueFormatter {
    fn format(&self, document: &SpdxDocument) -> Result<String> {
        let mut output = String::new();
        self.write_document(&mut output, document)?;
        Ok(output)
    }

    fn file_extension(&self) -> &'static str {
        "spdx"
    }
}
