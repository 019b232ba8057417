use super::manifest::{directory_name, parse_toml, read_optional, read_required, retain_reachable};
use super::ToolRunner;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Checksum, ChecksumAlgorithm, Ecosystem, Module, ModuleKey, Supplier};
use crate::shared::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

const CARGO_TOML: &str = "Cargo.toml";
const CARGO_LOCK: &str = "Cargo.lock";
const CRATES_IO_SOURCE: &str = "registry+https://github.com/rust-lang/crates.io-index";

#[derive(Debug, Deserialize)]
struct CargoManifest {
    #[serde(default)]
    package: Option<ManifestPackage>,
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
    #[serde(default, rename = "build-dependencies")]
    build_dependencies: BTreeMap<String, toml::Value>,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: BTreeMap<String, toml::Value>,
}

impl CargoManifest {
    /// Crates listed only under `[dev-dependencies]`
    fn dev_only(&self) -> HashSet<String> {
        let shipped: HashSet<String> = self
            .dependencies
            .iter()
            .chain(self.build_dependencies.iter())
            .map(|(key, spec)| crate_name(key, spec))
            .collect();
        self.dev_dependencies
            .iter()
            .map(|(key, spec)| crate_name(key, spec))
            .filter(|name| !shipped.contains(name))
            .collect()
    }
}

/// Crate name of a dependency entry, honoring `package = "..."` renames
fn crate_name(key: &str, spec: &toml::Value) -> String {
    spec.get("package")
        .and_then(toml::Value::as_str)
        .unwrap_or(key)
        .to_string()
}

#[derive(Debug, Deserialize)]
struct ManifestPackage {
    name: String,
    /// A string, or `{ workspace = true }`
    #[serde(default)]
    version: Option<toml::Value>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    repository: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CargoLock {
    #[serde(default)]
    package: Vec<LockPackage>,
}

#[derive(Debug, Deserialize)]
struct LockPackage {
    name: String,
    version: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    checksum: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

impl LockPackage {
    fn download_location(&self) -> Option<String> {
        match self.source.as_deref()? {
            CRATES_IO_SOURCE => Some(format!(
                "https://crates.io/api/v1/crates/{}/{}/download",
                self.name, self.version
            )),
            source => source
                .split_once('+')
                .map(|(_, url)| url.to_string()),
        }
    }
}

/// Cargo adapter reading `Cargo.toml` and, when present, `Cargo.lock`
pub struct CargoAdapter {
    runner: ToolRunner,
}

impl CargoAdapter {
    pub const NAME: &'static str = "cargo";

    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    fn read_manifest(dir: &Path) -> Result<CargoManifest> {
        let content = read_required(Self::NAME, dir, CARGO_TOML)?;
        parse_toml(dir, CARGO_TOML, &content)
    }

    fn root_module(dir: &Path, manifest: &CargoManifest) -> Module {
        let Some(package) = &manifest.package else {
            // Virtual workspace manifest
            return Module::new(Ecosystem::Cargo, directory_name(dir), "");
        };

        let version = package
            .version
            .as_ref()
            .and_then(toml::Value::as_str)
            .unwrap_or_default();
        Module::new(Ecosystem::Cargo, &package.name, version)
            .with_declared_license(package.license.clone())
            .with_homepage(package.homepage.clone().or_else(|| package.repository.clone()))
            .with_supplier(package.authors.first().and_then(|a| Supplier::person_from_author(a)))
    }

    /// Resolves a `Cargo.lock` dependency entry: `name`, `name version`
    /// or `name version (source)`.
    fn resolve(lock: &CargoLock, entry: &str) -> ModuleKey {
        let mut parts = entry.split_whitespace();
        let name = parts.next().unwrap_or(entry);
        let version = parts.next();

        let found = lock
            .package
            .iter()
            .find(|p| p.name == name && version.map_or(true, |v| p.version == v));
        match found {
            Some(p) => ModuleKey::new(Ecosystem::Cargo, &p.name, &p.version),
            None => ModuleKey::new(Ecosystem::Cargo, name, version.unwrap_or_default()),
        }
    }

    /// Root edges to `dev_only` crates are dropped, along with packages
    /// only they pull in.
    fn from_lock(lock: &CargoLock, root: Module, dev_only: &HashSet<String>) -> Vec<Module> {
        let root_key = root.key();
        let mut modules = vec![root];
        let mut root_found = false;

        for package in &lock.package {
            let is_root = package.name == root_key.name && package.source.is_none();
            root_found |= is_root;
            let mut module = if is_root {
                modules[0].clone()
            } else {
                Module::new(Ecosystem::Cargo, &package.name, &package.version)
                    .with_download_location(package.download_location())
                    .with_checksum(
                        package
                            .checksum
                            .as_deref()
                            .and_then(|c| Checksum::from_hex(ChecksumAlgorithm::Sha256, c)),
                    )
            };

            for entry in &package.dependencies {
                let name = entry.split_whitespace().next().unwrap_or(entry);
                if is_root && dev_only.contains(name) {
                    continue;
                }
                module.add_dependency(Self::resolve(lock, entry));
            }

            if is_root {
                modules[0] = module;
            } else {
                modules.push(module);
            }
        }

        if root_found {
            retain_reachable(modules)
        } else {
            modules
        }
    }

    /// Direct dependencies of `Cargo.toml` when no lockfile exists
    fn from_manifest(manifest: &CargoManifest, mut root: Module) -> Vec<Module> {
        let mut modules = Vec::new();
        for (name, spec) in &manifest.dependencies {
            let requirement = match spec {
                toml::Value::String(v) => v.clone(),
                toml::Value::Table(t) => t
                    .get("version")
                    .and_then(toml::Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                _ => String::new(),
            };
            let module = Module::new(Ecosystem::Cargo, name, requirement);
            root.add_dependency(module.key());
            modules.push(module);
        }
        modules.insert(0, root);
        modules
    }
}

#[async_trait]
impl EcosystemAdapter for CargoAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Cargo
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(dir.join(CARGO_TOML).is_file())
    }

    async fn get_root_module(&self, dir: &Path) -> Result<Module> {
        let manifest = Self::read_manifest(dir)?;
        Ok(Self::root_module(dir, &manifest))
    }

    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>> {
        let manifest = Self::read_manifest(dir)?;
        let root = Self::root_module(dir, &manifest);

        match read_optional(dir, CARGO_LOCK)? {
            Some(content) => {
                let lock: CargoLock = parse_toml(dir, CARGO_LOCK, &content)?;
                Ok(Self::from_lock(&lock, root, &manifest.dev_only()))
            }
            None => {
                tracing::debug!(dir = %dir.display(), "No Cargo.lock, listing direct dependencies only");
                Ok(Self::from_manifest(&manifest, root))
            }
        }
    }

    async fn get_tool_version(&self) -> Result<String> {
        self.runner.version(Self::NAME, "cargo").await
    }
}
