use super::*;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Ecosystem, Module};
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct MarkerAdapter {
    name: &'static str,
    marker: &'static str,
}

#[async_trait::async_trait]
impl EcosystemAdapter for MarkerAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(dir.join(self.marker).is_file())
    }

    async fn get_root_module(&self, _dir: &Path) -> Result<Module> {
        Ok(Module::new(Ecosystem::Npm, "root", "1.0.0"))
    }

    async fn list_modules_with_dependencies(&self, _dir: &Path) -> Result<Vec<Module>> {
        Ok(vec![])
    }

    async fn get_tool_version(&self) -> Result<String> {
        Ok("test".to_string())
    }
}

struct FailingAdapter;

#[async_trait::async_trait]
impl EcosystemAdapter for FailingAdapter {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn is_applicable(&self, _dir: &Path) -> Result<bool> {
        anyhow::bail!("permission denied")
    }

    async fn get_root_module(&self, _dir: &Path) -> Result<Module> {
        unreachable!()
    }

    async fn list_modules_with_dependencies(&self, _dir: &Path) -> Result<Vec<Module>> {
        unreachable!()
    }

    async fn get_tool_version(&self) -> Result<String> {
        unreachable!()
    }
}

fn registry(adapters: Vec<Arc<dyn EcosystemAdapter>>) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    for adapter in adapters {
        registry.register(adapter);
    }
    registry
}

fn marker(name: &'static str, marker: &'static str) -> Arc<dyn EcosystemAdapter> {
    Arc::new(MarkerAdapter { name, marker })
}

#[test]
fn test_registry_select_restricts_and_reorders() {
    let registry = registry(vec![marker("npm", "a"), marker("cargo", "b"), marker("go", "c")]);

    let selected = registry
        .select(&["go".to_string(), "NPM".to_string(), "go".to_string()])
        .unwrap();

    assert_eq!(selected.names(), vec!["go", "npm"]);
}

#[test]
fn test_registry_select_unknown_plugin() {
    let registry = registry(vec![marker("npm", "a")]);

    let err = registry.select(&["gradle".to_string()]).unwrap_err();
    let sbom_err = err.downcast_ref::<SbomError>().unwrap();
    assert!(matches!(sbom_err, SbomError::Configuration { .. }));
    assert!(err.to_string().contains("gradle"));
    assert!(err.to_string().contains("npm"));
}

#[test]
fn test_registry_select_empty_keeps_all() {
    let registry = registry(vec![marker("npm", "a"), marker("cargo", "b")]);
    assert_eq!(registry.select(&[]).unwrap().len(), 2);
}

#[test]
fn test_detect_orders_by_registration_then_path() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("b-svc")).unwrap();
    fs::create_dir_all(root.join("a-web")).unwrap();
    fs::write(root.join("a-web/package.json"), "{}").unwrap();
    fs::write(root.join("b-svc/package.json"), "{}").unwrap();
    fs::write(root.join("b-svc/Cargo.toml"), "").unwrap();

    let registry = registry(vec![
        marker("cargo", "Cargo.toml"),
        marker("npm", "package.json"),
    ]);
    let jobs = Detector::default().detect(&registry, root).unwrap();

    let summary: Vec<(&str, PathBuf)> = jobs
        .iter()
        .map(|j| (j.adapter.name(), j.directory.strip_prefix(root).unwrap().to_path_buf()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("cargo", PathBuf::from("b-svc")),
            ("npm", PathBuf::from("a-web")),
            ("npm", PathBuf::from("b-svc")),
        ]
    );
    assert_eq!(jobs.iter().map(|j| j.index).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn test_detect_skips_excluded_and_hidden_directories() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for dir in ["node_modules/left-pad", ".git", "vendor/pkg", "app"] {
        fs::create_dir_all(root.join(dir)).unwrap();
        fs::write(root.join(dir).join("package.json"), "{}").unwrap();
    }

    let registry = registry(vec![marker("npm", "package.json")]);
    let jobs = Detector::default().detect(&registry, root).unwrap();

    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].directory.ends_with("app"));
}

#[test]
fn test_detect_respects_max_depth() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let deep = root.join("a/b/c");
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("package.json"), "{}").unwrap();

    let registry = registry(vec![marker("npm", "package.json")]);

    assert!(Detector::new(2).detect(&registry, root).is_err());
    assert_eq!(Detector::new(3).detect(&registry, root).unwrap().len(), 1);
}

#[test]
fn test_detect_no_applicable_adapter() {
    let temp = TempDir::new().unwrap();
    let registry = registry(vec![marker("npm", "package.json")]);

    let err = Detector::default().detect(&registry, temp.path()).unwrap_err();
    let sbom_err = err.downcast_ref::<SbomError>().unwrap();
    assert!(matches!(sbom_err, SbomError::Detection { .. }));
}

#[test]
fn test_detect_treats_applicability_error_as_not_applicable() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("package.json"), "{}").unwrap();

    let failing: Arc<dyn EcosystemAdapter> = Arc::new(FailingAdapter);
    let registry = registry(vec![failing, marker("npm", "package.json")]);
    let jobs = Detector::default().detect(&registry, temp.path()).unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].adapter.name(), "npm");
}
