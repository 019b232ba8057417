/// End-to-end tests for the CLI
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_npm_project(dir: &Path) {
    fs::write(
        dir.join("package.json"),
        r#"{ "name": "web", "version": "1.0.0", "license": "MIT", "dependencies": { "left-pad": "^1.3.0" } }"#,
    )
    .unwrap();
    fs::write(
        dir.join("package-lock.json"),
        r#"{
  "name": "web",
  "version": "1.0.0",
  "lockfileVersion": 3,
  "packages": {
    "": { "name": "web", "version": "1.0.0", "dependencies": { "left-pad": "^1.3.0" } },
    "node_modules/left-pad": {
      "version": "1.3.0",
      "resolved": "https://registry.npmjs.org/left-pad/-/left-pad-1.3.0.tgz",
      "license": "WTFPL"
    }
  }
}"#,
    )
    .unwrap();
}

fn npm_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_npm_project(dir.path());
    dir
}

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: Success - normal execution
    #[test]
    fn test_exit_code_success() {
        let project = npm_project();
        let out = TempDir::new().unwrap();

        cargo_bin_cmd!("spdx-sbom-generator")
            .arg("-p")
            .arg(project.path())
            .arg("-o")
            .arg(out.path())
            .assert()
            .code(0);
    }

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        cargo_bin_cmd!("spdx-sbom-generator")
            .arg("--help")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("--include-license-text"));
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        cargo_bin_cmd!("spdx-sbom-generator")
            .arg("--version")
            .assert()
            .code(0);
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        cargo_bin_cmd!("spdx-sbom-generator")
            .arg("--invalid-option")
            .assert()
            .code(2);
    }

    /// Exit code 2: Invalid format value
    #[test]
    fn test_exit_code_invalid_format() {
        cargo_bin_cmd!("spdx-sbom-generator")
            .args(["-f", "cyclonedx"])
            .assert()
            .code(2);
    }

    /// Exit code 2: Unsupported schema version
    #[test]
    fn test_exit_code_invalid_schema() {
        cargo_bin_cmd!("spdx-sbom-generator")
            .args(["-s", "2.1"])
            .assert()
            .code(2);
    }

    /// Exit code 1: non-existent project path
    #[test]
    fn test_exit_code_nonexistent_path() {
        cargo_bin_cmd!("spdx-sbom-generator")
            .args(["-p", "/nonexistent/path/that/does/not/exist"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("An error occurred"));
    }

    /// Exit code 1: no adapter applies anywhere under the path
    #[test]
    fn test_exit_code_no_project_found() {
        let empty = TempDir::new().unwrap();

        cargo_bin_cmd!("spdx-sbom-generator")
            .arg("-p")
            .arg(empty.path())
            .arg("-o")
            .arg(empty.path())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("No supported package manager"));
    }

    /// Exit code 1: unknown adapter name
    #[test]
    fn test_exit_code_unknown_plugin() {
        let project = npm_project();

        cargo_bin_cmd!("spdx-sbom-generator")
            .arg("-p")
            .arg(project.path())
            .args(["--plugin", "gradle", "--stdout"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("gradle"));
    }
}

#[test]
fn test_e2e_tag_value_file() {
    let project = npm_project();
    let out = TempDir::new().unwrap();

    cargo_bin_cmd!("spdx-sbom-generator")
        .arg("-p")
        .arg(project.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Output complete"));

    let content = fs::read_to_string(out.path().join("bom-web.spdx")).unwrap();
    assert!(content.starts_with("SPDXVersion: SPDX-2.3\n"));
    assert!(content.contains("DataLicense: CC0-1.0"));
    assert!(content.contains("PackageName: left-pad"));
    assert!(content.contains(
        "PackageDownloadLocation: https://registry.npmjs.org/left-pad/-/left-pad-1.3.0.tgz"
    ));
    assert!(content.contains("PackageLicenseDeclared: NOASSERTION"));
}

#[test]
fn test_e2e_json_schema_2_2() {
    let project = npm_project();
    let out = TempDir::new().unwrap();

    cargo_bin_cmd!("spdx-sbom-generator")
        .arg("-p")
        .arg(project.path())
        .arg("-o")
        .arg(out.path())
        .args(["-f", "json", "-s", "2.2"])
        .assert()
        .success();

    let content = fs::read_to_string(out.path().join("bom-web.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["spdxVersion"], "SPDX-2.2");
    assert_eq!(json["SPDXID"], "SPDXRef-DOCUMENT");
    assert_eq!(json["name"], "web");
    assert_eq!(json["packages"].as_array().unwrap().len(), 2);
    assert_eq!(json["relationships"].as_array().unwrap().len(), 2);
}

#[test]
fn test_e2e_include_license_text() {
    let project = npm_project();
    let out = TempDir::new().unwrap();

    cargo_bin_cmd!("spdx-sbom-generator")
        .arg("-p")
        .arg(project.path())
        .arg("-o")
        .arg(out.path())
        .arg("-i")
        .assert()
        .success();

    let content = fs::read_to_string(out.path().join("bom-web.spdx")).unwrap();
    assert!(content.contains("PackageLicenseDeclared: MIT"));
    assert!(content.contains("LicenseID: LicenseRef-MIT"));
    assert!(content.contains("Permission is hereby granted"));
}

#[test]
fn test_e2e_stdout() {
    let project = npm_project();

    cargo_bin_cmd!("spdx-sbom-generator")
        .arg("-p")
        .arg(project.path())
        .args(["--stdout", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"spdxVersion\": \"SPDX-2.3\""))
        .stdout(predicate::str::contains("left-pad"));

    assert!(!project.path().join("bom-web.json").exists());
}

#[test]
fn test_e2e_missing_output_dir() {
    let project = npm_project();

    cargo_bin_cmd!("spdx-sbom-generator")
        .arg("-p")
        .arg(project.path())
        .arg("-o")
        .arg(project.path().join("missing"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Output directory does not exist"));
}

#[test]
fn test_e2e_per_ecosystem() {
    let project = npm_project();
    let engine = project.path().join("engine");
    fs::create_dir(&engine).unwrap();
    fs::write(
        engine.join("Cargo.toml"),
        "[package]\nname = \"engine\"\nversion = \"0.3.0\"\n",
    )
    .unwrap();
    let out = TempDir::new().unwrap();

    cargo_bin_cmd!("spdx-sbom-generator")
        .arg("-p")
        .arg(project.path())
        .arg("-o")
        .arg(out.path())
        .arg("--per-ecosystem")
        .assert()
        .success();

    assert!(out.path().join("bom-web-npm.spdx").exists());
    assert!(out.path().join("bom-engine-cargo.spdx").exists());
}
