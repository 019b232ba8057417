use super::manifest::{has_files, parse_toml, read_required, retain_reachable};
use super::python::{normalize_name, PyProject, PYPROJECT_TOML};
use super::ToolRunner;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Checksum, Ecosystem, Module, ModuleKey};
use crate::shared::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const UV_LOCK: &str = "uv.lock";

#[derive(Debug, Deserialize)]
struct UvLock {
    #[serde(default)]
    package: Vec<UvPackage>,
}

#[derive(Debug, Deserialize)]
struct UvPackage {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    source: BTreeMap<String, String>,
    #[serde(default)]
    dependencies: Vec<UvDependency>,
    #[serde(default)]
    sdist: Option<UvArtifact>,
}

impl UvPackage {
    /// The project itself is an editable or virtual source
    fn is_project(&self) -> bool {
        self.source.contains_key("editable") || self.source.contains_key("virtual")
    }
}

#[derive(Debug, Deserialize)]
struct UvDependency {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UvArtifact {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    hash: Option<String>,
}

/// uv adapter reading `pyproject.toml` and `uv.lock`
pub struct UvAdapter {
    runner: ToolRunner,
}

impl UvAdapter {
    pub const NAME: &'static str = "uv";

    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    fn resolve(lock: &UvLock, dependency: &UvDependency) -> ModuleKey {
        let name = normalize_name(&dependency.name);
        let found = lock.package.iter().find(|p| {
            normalize_name(&p.name) == name
                && dependency
                    .version
                    .as_ref()
                    .map_or(true, |v| p.version.as_ref() == Some(v))
        });
        let version = found
            .and_then(|p| p.version.clone())
            .or_else(|| dependency.version.clone())
            .unwrap_or_default();
        ModuleKey::new(Ecosystem::PyPi, name, version)
    }

    /// Development dependency groups are skipped, along with packages only
    /// they pull in.
    fn modules_from_lock(lock: &UvLock, root: Module) -> Vec<Module> {
        let mut modules = vec![root];
        let mut project_found = false;

        for package in &lock.package {
            let name = normalize_name(&package.name);
            let is_root = package.is_project() && name == modules[0].name;
            project_found |= is_root;

            let mut module = if is_root {
                modules[0].clone()
            } else {
                let sdist = package.sdist.as_ref();
                Module::new(
                    Ecosystem::PyPi,
                    &name,
                    package.version.clone().unwrap_or_default(),
                )
                .with_download_location(sdist.and_then(|s| s.url.clone()))
                .with_checksum(
                    sdist
                        .and_then(|s| s.hash.as_deref())
                        .and_then(Checksum::from_prefixed_hex),
                )
            };

            for dependency in &package.dependencies {
                module.add_dependency(Self::resolve(lock, dependency));
            }

            if is_root {
                modules[0] = module;
            } else {
                modules.push(module);
            }
        }

        if project_found {
            retain_reachable(modules)
        } else {
            modules
        }
    }
}

#[async_trait]
impl EcosystemAdapter for UvAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::PyPi
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(has_files(dir, &[PYPROJECT_TOML, UV_LOCK]))
    }

    async fn get_root_module(&self, dir: &Path) -> Result<Module> {
        PyProject::read(Self::NAME, dir)?.root_module(Self::NAME, dir)
    }

    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>> {
        let root = PyProject::read(Self::NAME, dir)?.root_module(Self::NAME, dir)?;
        let content = read_required(Self::NAME, dir, UV_LOCK)?;
        let lock: UvLock = parse_toml(dir, UV_LOCK, &content)?;

        tracing::debug!(packages = lock.package.len(), "Parsed uv.lock");
        Ok(Self::modules_from_lock(&lock, root))
    }

    async fn get_tool_version(&self) -> Result<String> {
        self.runner.version(Self::NAME, "uv").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PYPROJECT: &str = r#"
[project]
name = "api"
version = "0.1.0"
license = "MIT"
"#;

    const LOCK: &str = r#"
version = 1

[[package]]
name = "api"
version = "0.1.0"
source = { editable = "." }
dependencies = [{ name = "requests" }]

[package.dev-dependencies]
dev = [{ name = "pytest" }]

[[package]]
name = "requests"
version = "2.32.3"
source = { registry = "https://pypi.org/simple" }
dependencies = [{ name = "urllib3" }]
sdist = { url = "https://files.pythonhosted.org/requests-2.32.3.tar.gz", hash = "sha256:55365417734eb18255590a9ff9eb97e9e1da868d4ccd6402399eaf68af20a760" }

[[package]]
name = "urllib3"
version = "2.2.2"
source = { registry = "https://pypi.org/simple" }

[[package]]
name = "pytest"
version = "8.2.0"
source = { registry = "https://pypi.org/simple" }
"#;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PYPROJECT_TOML), PYPROJECT).unwrap();
        fs::write(dir.path().join(UV_LOCK), LOCK).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_root_module() {
        let dir = project();
        let adapter = UvAdapter::new(ToolRunner::default());
        assert!(adapter.is_applicable(dir.path()).unwrap());

        let root = adapter.get_root_module(dir.path()).await.unwrap();
        assert_eq!(root.key(), ModuleKey::new(Ecosystem::PyPi, "api", "0.1.0"));
        assert_eq!(root.declared_license.as_deref(), Some("MIT"));
    }

    #[tokio::test]
    async fn test_modules_from_lock() {
        let dir = project();
        let modules = UvAdapter::new(ToolRunner::default())
            .list_modules_with_dependencies(dir.path())
            .await
            .unwrap();

        assert_eq!(modules.len(), 3);
        assert_eq!(
            modules[0].dependencies,
            vec![ModuleKey::new(Ecosystem::PyPi, "requests", "2.32.3")]
        );

        let requests = &modules[1];
        assert_eq!(
            requests.dependencies,
            vec![ModuleKey::new(Ecosystem::PyPi, "urllib3", "2.2.2")]
        );
        assert!(requests.checksum.is_some());
        assert_eq!(
            requests.package_url.as_deref(),
            Some("pkg:pypi/requests@2.32.3")
        );
    }

    #[tokio::test]
    async fn test_dev_dependency_groups_are_skipped() {
        let dir = project();
        let modules = UvAdapter::new(ToolRunner::default())
            .list_modules_with_dependencies(dir.path())
            .await
            .unwrap();

        assert!(modules.iter().all(|m| m.name != "pytest"));
        assert!(modules
            .iter()
            .flat_map(|m| m.dependencies.iter())
            .all(|dep| dep.name != "pytest"));
    }
}
