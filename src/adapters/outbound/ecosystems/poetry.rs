use super::manifest::{has_files, parse_toml, read_required, retain_reachable};
use super::python::{normalize_name, pypi_download_location, PyProject, PYPROJECT_TOML};
use super::ToolRunner;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Checksum, Ecosystem, Module, ModuleKey};
use crate::shared::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const POETRY_LOCK: &str = "poetry.lock";

#[derive(Debug, Deserialize)]
struct PoetryLock {
    #[serde(default)]
    package: Vec<PoetryPackage>,
}

#[derive(Debug, Deserialize)]
struct PoetryPackage {
    name: String,
    version: String,
    /// `dev` in lockfiles written before Poetry 1.5
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    files: Vec<PoetryFile>,
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
struct PoetryFile {
    #[serde(default)]
    file: String,
    #[serde(default)]
    hash: String,
}

impl PoetryPackage {
    /// Hash of the source distribution when listed, else the first file
    fn checksum(&self) -> Option<Checksum> {
        self.files
            .iter()
            .find(|f| f.file.ends_with(".tar.gz"))
            .or_else(|| self.files.first())
            .and_then(|f| Checksum::from_prefixed_hex(&f.hash))
    }
}

/// Poetry adapter reading `pyproject.toml` and `poetry.lock`
pub struct PoetryAdapter {
    runner: ToolRunner,
}

impl PoetryAdapter {
    pub const NAME: &'static str = "poetry";

    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    /// Root edges come from `[tool.poetry.dependencies]` only, so packages
    /// pulled in by dev groups end up unreachable and are dropped.
    fn modules_from_lock(lock: &PoetryLock, pyproject: &PyProject, mut root: Module) -> Vec<Module> {
        let versions: HashMap<String, &str> = lock
            .package
            .iter()
            .map(|p| (normalize_name(&p.name), p.version.as_str()))
            .collect();
        let key_for = |name: &str| {
            let name = normalize_name(name);
            let version = versions.get(&name).copied().unwrap_or_default();
            ModuleKey::new(Ecosystem::PyPi, name, version)
        };

        let direct = pyproject
            .tool
            .as_ref()
            .and_then(|t| t.poetry.as_ref())
            .map(|p| p.dependencies.keys().collect::<Vec<_>>())
            .unwrap_or_default();
        for name in direct {
            if !name.eq_ignore_ascii_case("python") {
                root.add_dependency(key_for(name));
            }
        }

        let mut modules = vec![root];
        for package in &lock.package {
            if package.category.as_deref() == Some("dev") {
                continue;
            }
            let name = normalize_name(&package.name);
            let mut module = Module::new(Ecosystem::PyPi, &name, &package.version)
                .with_download_location(Some(pypi_download_location(&name)))
                .with_checksum(package.checksum());
            for dependency in package.dependencies.keys() {
                module.add_dependency(key_for(dependency));
            }
            modules.push(module);
        }
        retain_reachable(modules)
    }
}

#[async_trait]
impl EcosystemAdapter for PoetryAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::PyPi
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(has_files(dir, &[PYPROJECT_TOML, POETRY_LOCK]))
    }

    async fn get_root_module(&self, dir: &Path) -> Result<Module> {
        PyProject::read(Self::NAME, dir)?.root_module(Self::NAME, dir)
    }

    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>> {
        let pyproject = PyProject::read(Self::NAME, dir)?;
        let root = pyproject.root_module(Self::NAME, dir)?;
        let content = read_required(Self::NAME, dir, POETRY_LOCK)?;
        let lock: PoetryLock = parse_toml(dir, POETRY_LOCK, &content)?;

        Ok(Self::modules_from_lock(&lock, &pyproject, root))
    }

    async fn get_tool_version(&self) -> Result<String> {
        self.runner.version(Self::NAME, "poetry").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PYPROJECT: &str = r#"
[tool.poetry]
name = "cli-tool"
version = "0.2.0"
license = "BSD-3-Clause"

[tool.poetry.dependencies]
python = "^3.10"
Click = "^8.1"
"#;

    const LOCK: &str = r#"
[[package]]
name = "click"
version = "8.1.7"
files = [
    {file = "click-8.1.7-py3-none-any.whl", hash = "sha256:ae74fb96c20a0277a1d615f1e4d73c8414f5a98db8b799a7931d1582f3390c28"},
    {file = "click-8.1.7.tar.gz", hash = "sha256:ca9853ad459e787e2192211578cc907e7594e294c7ccc834310722b41b9ca6de"},
]

[package.dependencies]
colorama = {version = "*", markers = "platform_system == \"Windows\""}

[[package]]
name = "colorama"
version = "0.4.6"
files = []

[[package]]
name = "pytest"
version = "8.2.0"
files = []

[package.dependencies]
pluggy = ">=1.5"

[[package]]
name = "pluggy"
version = "1.5.0"
files = []

[[package]]
name = "black"
version = "24.4.2"
category = "dev"
files = []
"#;

    #[tokio::test]
    async fn test_modules_from_lock() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PYPROJECT_TOML), PYPROJECT).unwrap();
        fs::write(dir.path().join(POETRY_LOCK), LOCK).unwrap();

        let adapter = PoetryAdapter::new(ToolRunner::default());
        assert!(adapter.is_applicable(dir.path()).unwrap());

        let modules = adapter
            .list_modules_with_dependencies(dir.path())
            .await
            .unwrap();
        assert_eq!(modules.len(), 3);

        let root = &modules[0];
        assert_eq!(root.name, "cli-tool");
        assert_eq!(root.declared_license.as_deref(), Some("BSD-3-Clause"));
        assert_eq!(
            root.dependencies,
            vec![ModuleKey::new(Ecosystem::PyPi, "click", "8.1.7")]
        );

        let click = &modules[1];
        assert_eq!(
            click.checksum.as_ref().map(|c| c.value.as_str()),
            Some("ca9853ad459e787e2192211578cc907e7594e294c7ccc834310722b41b9ca6de")
        );
        assert_eq!(
            click.dependencies,
            vec![ModuleKey::new(Ecosystem::PyPi, "colorama", "0.4.6")]
        );
        assert_eq!(
            click.download_location.as_deref(),
            Some("https://pypi.org/project/click/")
        );
    }

    #[test]
    fn test_dev_group_packages_are_skipped() {
        let pyproject: PyProject = toml::from_str(PYPROJECT).unwrap();
        let lock: PoetryLock = toml::from_str(LOCK).unwrap();
        let root = Module::new(Ecosystem::PyPi, "cli-tool", "0.2.0");

        let modules = PoetryAdapter::modules_from_lock(&lock, &pyproject, root);

        let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["cli-tool", "click", "colorama"]);
    }
}
