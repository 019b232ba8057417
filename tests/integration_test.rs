/// Integration tests for the application layer
mod test_utilities;

use spdx_sbom_generator::adapters::outbound::ecosystems::{NpmAdapter, ToolRunner};
use spdx_sbom_generator::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_utilities::mocks::*;

const PACKAGE_JSON: &str = r#"{
  "name": "web",
  "version": "1.0.0",
  "license": "MIT",
  "dependencies": { "left-pad": "^1.3.0", "ghost": "^2.0.0" }
}"#;

const PACKAGE_LOCK: &str = r#"{
  "name": "web",
  "version": "1.0.0",
  "lockfileVersion": 3,
  "packages": {
    "": {
      "name": "web",
      "version": "1.0.0",
      "dependencies": { "left-pad": "^1.3.0", "ghost": "^2.0.0" }
    },
    "node_modules/left-pad": {
      "version": "1.3.0",
      "resolved": "https://registry.npmjs.org/left-pad/-/left-pad-1.3.0.tgz",
      "license": "WTFPL"
    }
  }
}"#;

const CARGO_TOML: &str = r#"
[package]
name = "engine"
version = "0.3.0"
license = "Apache-2.0"

[dependencies]
itoa = "1"
"#;

const CARGO_LOCK: &str = r#"
version = 3

[[package]]
name = "engine"
version = "0.3.0"
dependencies = ["itoa"]

[[package]]
name = "itoa"
version = "1.0.11"
source = "registry+https://github.com/rust-lang/crates.io-index"
checksum = "a0a7eb79b1b3c30f8f2305963533f972fdb65420c43e902b1044bb2b625562d6"
"#;

fn write_npm_project(dir: &Path) {
    fs::write(dir.join("package.json"), PACKAGE_JSON).unwrap();
    fs::write(dir.join("package-lock.json"), PACKAGE_LOCK).unwrap();
}

fn write_cargo_project(dir: &Path) {
    fs::write(dir.join("Cargo.toml"), CARGO_TOML).unwrap();
    fs::write(dir.join("Cargo.lock"), CARGO_LOCK).unwrap();
}

/// npm project at the root, Cargo project in `engine/`
fn polyglot_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_npm_project(temp.path());
    let engine = temp.path().join("engine");
    fs::create_dir(&engine).unwrap();
    write_cargo_project(&engine);
    temp
}

fn use_case(
    registry: AdapterRegistry,
    licenses: MockLicenseRepository,
) -> (GenerateSbomUseCase<MockLicenseRepository, MockProgressReporter>, MockProgressReporter) {
    let reporter = MockProgressReporter::new();
    (
        GenerateSbomUseCase::new(registry, licenses, reporter.clone()),
        reporter,
    )
}

#[tokio::test]
async fn test_merged_document_across_ecosystems() {
    let project = polyglot_project();
    let (use_case, _) = use_case(
        AdapterFactory::default_registry(Duration::from_secs(30)),
        MockLicenseRepository::new(),
    );

    let mut sink = MemorySink::new();
    let response = use_case
        .execute(SbomRequest::new(project.path().to_path_buf()), &mut sink)
        .await
        .unwrap();

    assert!(!response.has_warnings());
    assert_eq!(sink.documents.len(), 1);

    let document = &sink.documents[0];
    assert_eq!(document.slug, "web");
    assert_eq!(document.extension, "spdx");
    assert!(document.content.starts_with("SPDXVersion: SPDX-2.3\n"));
    for name in ["web", "left-pad", "engine", "itoa"] {
        assert!(
            document.content.contains(&format!("PackageName: {}\n", name)),
            "missing package {}",
            name
        );
    }
    assert!(document.content.contains(
        "Relationship: SPDXRef-DOCUMENT DESCRIBES SPDXRef-Package-npm-web-1.0.0"
    ));
    assert!(document.content.contains(
        "Relationship: SPDXRef-DOCUMENT DESCRIBES SPDXRef-Package-cargo-engine-0.3.0"
    ));
    assert!(document.content.contains(
        "Relationship: SPDXRef-Package-npm-web-1.0.0 DEPENDS_ON SPDXRef-Package-npm-left-pad-1.3.0"
    ));
    assert!(document.content.contains(
        "PackageChecksum: SHA256: a0a7eb79b1b3c30f8f2305963533f972fdb65420c43e902b1044bb2b625562d6"
    ));
}

#[tokio::test]
async fn test_unresolved_dependency_becomes_placeholder() {
    let project = TempDir::new().unwrap();
    write_npm_project(project.path());
    let (use_case, _) = use_case(
        AdapterFactory::default_registry(Duration::from_secs(30)),
        MockLicenseRepository::new(),
    );

    let mut sink = MemorySink::new();
    use_case
        .execute(
            SbomRequest::new(project.path().to_path_buf()).with_format(OutputFormat::Json),
            &mut sink,
        )
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&sink.documents[0].content).unwrap();
    let packages = json["packages"].as_array().unwrap();
    let ghost = packages
        .iter()
        .find(|p| p["name"] == "ghost")
        .expect("placeholder package");
    assert_eq!(ghost["downloadLocation"], "NOASSERTION");
    assert_eq!(ghost["licenseConcluded"], "NOASSERTION");
    assert_eq!(ghost["licenseDeclared"], "NOASSERTION");

    let ghost_id = ghost["SPDXID"].as_str().unwrap();
    let relationships = json["relationships"].as_array().unwrap();
    assert!(relationships.iter().any(|r| {
        r["spdxElementId"] == "SPDXRef-Package-npm-web-1.0.0"
            && r["relationshipType"] == "DEPENDS_ON"
            && r["relatedSpdxElement"] == ghost_id
    }));
}

#[tokio::test]
async fn test_per_ecosystem_documents() {
    let project = polyglot_project();
    let (use_case, _) = use_case(
        AdapterFactory::default_registry(Duration::from_secs(30)),
        MockLicenseRepository::new(),
    );

    let mut sink = MemorySink::new();
    let request = SbomRequest::new(project.path().to_path_buf())
        .with_format(OutputFormat::Json)
        .with_schema(SchemaVersion::V2_2)
        .with_document_policy(DocumentPolicy::PerEcosystem);
    let response = use_case.execute(request, &mut sink).await.unwrap();

    assert_eq!(response.documents.len(), 2);
    let mut slugs: Vec<&str> = sink.documents.iter().map(|d| d.slug.as_str()).collect();
    slugs.sort();
    assert_eq!(slugs, vec!["engine-cargo", "web-npm"]);

    for document in &sink.documents {
        let json: serde_json::Value = serde_json::from_str(&document.content).unwrap();
        assert_eq!(json["spdxVersion"], "SPDX-2.2");
        assert_eq!(document.extension, "json");
    }

    let cargo = sink
        .documents
        .iter()
        .find(|d| d.slug == "engine-cargo")
        .unwrap();
    assert!(!cargo.content.contains("left-pad"));
}

#[tokio::test]
async fn test_license_text_included() {
    let project = TempDir::new().unwrap();
    write_npm_project(project.path());
    let (use_case, _) = use_case(
        AdapterFactory::default_registry(Duration::from_secs(30)),
        MockLicenseRepository::new().with_text("MIT", "MIT license full text"),
    );

    let mut sink = MemorySink::new();
    use_case
        .execute(
            SbomRequest::new(project.path().to_path_buf()).with_license_text(true),
            &mut sink,
        )
        .await
        .unwrap();

    let content = &sink.documents[0].content;
    assert!(content.contains("PackageLicenseDeclared: MIT\n"));
    assert!(content.contains("LicenseID: LicenseRef-MIT"));
    assert!(content.contains("MIT license full text"));
    assert!(content.contains("LicenseID: LicenseRef-WTFPL"));
}

#[tokio::test]
async fn test_timed_out_adapter_is_a_warning() {
    let project = TempDir::new().unwrap();
    write_npm_project(project.path());
    fs::write(project.path().join("slow.lock"), "").unwrap();

    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(NpmAdapter::new(ToolRunner::new(Duration::from_secs(30)))));
    registry.register(Arc::new(
        MockAdapter::new(
            "slow",
            Ecosystem::Cargo,
            "slow.lock",
            Module::new(Ecosystem::Cargo, "slow", "1.0.0"),
        )
        .with_delay(Duration::from_secs(10)),
    ));
    let (use_case, reporter) = use_case(registry, MockLicenseRepository::new());

    let mut sink = MemorySink::new();
    let request = SbomRequest::new(project.path().to_path_buf())
        .with_adapter_timeout(Duration::from_millis(200));
    let response = use_case.execute(request, &mut sink).await.unwrap();

    assert_eq!(response.warnings.len(), 1);
    assert_eq!(response.warnings[0].adapter, "slow");
    assert!(response.warnings[0].message.contains("timed out"));
    assert!(!sink.documents[0].content.contains("PackageName: slow"));
    let errors = reporter.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("slow"));
    assert_eq!(reporter.last_progress(), Some((2, 2)));
    assert!(reporter
        .completion()
        .is_some_and(|m| m.contains("skipped with warnings")));
}

#[tokio::test]
async fn test_all_adapters_failing() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("broken.lock"), "").unwrap();

    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(
        MockAdapter::new(
            "broken",
            Ecosystem::Go,
            "broken.lock",
            Module::new(Ecosystem::Go, "broken", ""),
        )
        .failing("exit status 1"),
    ));
    let (use_case, _) = use_case(registry, MockLicenseRepository::new());

    let mut sink = MemorySink::new();
    let err = use_case
        .execute(SbomRequest::new(project.path().to_path_buf()), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SbomError>(),
        Some(SbomError::NoAdapterSucceeded { attempted: 1 })
    ));
    assert!(sink.documents.is_empty());
}

#[tokio::test]
async fn test_no_applicable_adapter() {
    let project = TempDir::new().unwrap();
    let (use_case, _) = use_case(
        AdapterFactory::default_registry(Duration::from_secs(30)),
        MockLicenseRepository::new(),
    );

    let mut sink = MemorySink::new();
    let err = use_case
        .execute(SbomRequest::new(project.path().to_path_buf()), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SbomError>(),
        Some(SbomError::Detection { .. })
    ));
}

#[tokio::test]
async fn test_cancellation_leaves_sink_untouched() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("slow.lock"), "").unwrap();

    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(
        MockAdapter::new(
            "slow",
            Ecosystem::Npm,
            "slow.lock",
            Module::new(Ecosystem::Npm, "slow", "1.0.0"),
        )
        .with_delay(Duration::from_secs(10)),
    ));
    let (use_case, _) = use_case(registry, MockLicenseRepository::new());

    let mut sink = MemorySink::new();
    let err = use_case
        .create_sbom_cancellable(
            SbomRequest::new(project.path().to_path_buf()),
            &mut sink,
            Box::pin(async {}),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SbomError>(),
        Some(SbomError::Cancelled)
    ));
    assert!(sink.documents.is_empty());
}

#[tokio::test]
async fn test_sink_failure_is_fatal() {
    let project = TempDir::new().unwrap();
    write_npm_project(project.path());
    let (use_case, _) = use_case(
        AdapterFactory::default_registry(Duration::from_secs(30)),
        MockLicenseRepository::new(),
    );

    let mut sink = MemorySink::with_failure();
    let err = use_case
        .execute(SbomRequest::new(project.path().to_path_buf()), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SbomError>(),
        Some(SbomError::Write { .. })
    ));
}

#[tokio::test]
async fn test_plugin_selection_restricts_adapters() {
    let project = polyglot_project();
    let (use_case, _) = use_case(
        AdapterFactory::default_registry(Duration::from_secs(30)),
        MockLicenseRepository::new(),
    );

    let mut request = SbomRequest::new(project.path().to_path_buf());
    request.plugins = vec!["cargo".to_string()];

    let mut sink = MemorySink::new();
    use_case.execute(request, &mut sink).await.unwrap();

    let content = &sink.documents[0].content;
    assert_eq!(sink.documents[0].slug, "engine");
    assert!(content.contains("PackageName: itoa"));
    assert!(!content.contains("PackageName: left-pad"));
}
