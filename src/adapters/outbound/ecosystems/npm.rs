use super::manifest::{has_files, parse_json, read_required};
use super::ToolRunner;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Checksum, Ecosystem, Module, ModuleKey, Supplier};
use crate::sbom_generation::policies::LicensePriority;
use crate::shared::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub(super) const PACKAGE_JSON: &str = "package.json";
const PACKAGE_LOCK: &str = "package-lock.json";
const NODE_MODULES: &str = "node_modules/";

#[derive(Debug, Default, Deserialize)]
pub(super) struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub license: Option<Value>,
    #[serde(default)]
    pub licenses: Option<Vec<Value>>,
    #[serde(default)]
    pub author: Option<Value>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

impl PackageJson {
    pub fn read(adapter: &str, dir: &Path) -> Result<Self> {
        let content = read_required(adapter, dir, PACKAGE_JSON)?;
        parse_json(dir, PACKAGE_JSON, &content)
    }

    /// `license` as a string or `{ "type": ... }`, else the legacy `licenses` array
    pub fn declared_license(&self) -> Option<String> {
        let single = self.license.as_ref().and_then(license_value);
        let legacy = self.licenses.as_ref().and_then(|licenses| {
            let ids: Vec<String> = licenses.iter().filter_map(license_value).collect();
            LicensePriority::from_alternatives(&ids)
        });
        LicensePriority::select_license(single, legacy, &[])
    }

    pub fn supplier(&self) -> Option<Supplier> {
        match self.author.as_ref()? {
            Value::String(author) => Supplier::person_from_author(author),
            Value::Object(author) => {
                let name = author.get("name").and_then(Value::as_str)?;
                let formatted = match author.get("email").and_then(Value::as_str) {
                    Some(email) => format!("{} <{}>", name, email),
                    None => name.to_string(),
                };
                Supplier::person_from_author(&formatted)
            }
            _ => None,
        }
    }

    /// Root module of a Node.js project
    pub fn root_module(&self, dir: &Path) -> Module {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| super::manifest::directory_name(dir));
        Module::new(Ecosystem::Npm, name, self.version.clone().unwrap_or_default())
            .with_declared_license(self.declared_license())
            .with_supplier(self.supplier())
            .with_homepage(self.homepage.clone())
    }
}

fn license_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => o.get("type").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageLock {
    #[serde(default)]
    lockfile_version: u32,
    /// v2/v3 flat layout keyed by install path
    #[serde(default)]
    packages: BTreeMap<String, LockPackage>,
    /// v1 nested layout
    #[serde(default)]
    dependencies: BTreeMap<String, LockDependencyV1>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LockPackage {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    resolved: Option<String>,
    #[serde(default)]
    integrity: Option<String>,
    #[serde(default)]
    license: Option<Value>,
    #[serde(default)]
    dev: bool,
    #[serde(default)]
    link: bool,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    optional_dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct LockDependencyV1 {
    #[serde(default)]
    version: String,
    #[serde(default)]
    resolved: Option<String>,
    #[serde(default)]
    integrity: Option<String>,
    #[serde(default)]
    dev: bool,
    #[serde(default)]
    requires: BTreeMap<String, String>,
    #[serde(default)]
    dependencies: BTreeMap<String, LockDependencyV1>,
}

/// npm adapter reading `package.json` and `package-lock.json`
pub struct NpmAdapter {
    runner: ToolRunner,
}

impl NpmAdapter {
    pub const NAME: &'static str = "npm";

    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    fn parse_lock(dir: &Path, manifest: &PackageJson) -> Result<Vec<Module>> {
        let content = read_required(Self::NAME, dir, PACKAGE_LOCK)?;
        let lock: PackageLock = parse_json(dir, PACKAGE_LOCK, &content)?;
        let root = manifest.root_module(dir);

        tracing::debug!(lockfile_version = lock.lockfile_version, "Parsing package-lock.json");
        if lock.packages.is_empty() {
            Ok(Self::parse_v1(&lock.dependencies, &manifest.dependencies, &root))
        } else {
            Ok(Self::parse_v2(&lock.packages, &root))
        }
    }

    /// Flat `packages` map: dependencies resolve by walking up the
    /// `node_modules` hierarchy from the requiring package.
    fn parse_v2(packages: &BTreeMap<String, LockPackage>, root: &Module) -> Vec<Module> {
        let key_at = |path: &str| -> Option<ModuleKey> {
            let package = packages.get(path)?;
            let name = package_name(path, package);
            Some(ModuleKey::new(
                Ecosystem::Npm,
                name,
                package.version.clone().unwrap_or_default(),
            ))
        };

        let mut modules = Vec::new();
        for (path, package) in packages {
            if package.link || (package.dev && !path.is_empty()) {
                continue;
            }

            let mut module = if path.is_empty() {
                root.clone()
            } else {
                Module::new(
                    Ecosystem::Npm,
                    package_name(path, package),
                    package.version.clone().unwrap_or_default(),
                )
                .with_declared_license(package.license.as_ref().and_then(license_value))
                .with_download_location(package.resolved.clone())
                .with_checksum(package.integrity.as_deref().and_then(Checksum::from_sri))
            };

            for (dep_name, range) in package
                .dependencies
                .iter()
                .chain(package.optional_dependencies.iter())
            {
                let resolved = resolve_install_path(path, dep_name, |candidate| {
                    packages.get(candidate).is_some_and(|p| !p.link)
                })
                .and_then(|found| key_at(&found));
                module.add_dependency(
                    resolved.unwrap_or_else(|| ModuleKey::new(Ecosystem::Npm, dep_name, range)),
                );
            }
            modules.push(module);
        }
        modules
    }

    /// Nested v1 `dependencies` tree; `requires` resolve against the
    /// nearest enclosing scope that declares the name.
    ///
    /// v1 hoists transitive packages to the top level, so the root's edges
    /// come from the `package.json` dependencies resolved against that level.
    fn parse_v1(
        dependencies: &BTreeMap<String, LockDependencyV1>,
        direct: &BTreeMap<String, String>,
        root: &Module,
    ) -> Vec<Module> {
        let mut modules = Vec::new();
        let mut root = root.clone();
        let scopes: Vec<&BTreeMap<String, LockDependencyV1>> = vec![dependencies];

        for (name, range) in direct {
            match dependencies.get(name) {
                Some(dep) if dep.dev => {}
                Some(dep) => root.add_dependency(ModuleKey::new(Ecosystem::Npm, name, &dep.version)),
                None => root.add_dependency(ModuleKey::new(Ecosystem::Npm, name, range)),
            }
        }
        modules.push(root);

        let mut stack: Vec<(Vec<&BTreeMap<String, LockDependencyV1>>, &String, &LockDependencyV1)> =
            dependencies
                .iter()
                .rev()
                .map(|(name, dep)| (scopes.clone(), name, dep))
                .collect();

        while let Some((scopes, name, dep)) = stack.pop() {
            if dep.dev {
                continue;
            }

            let mut inner_scopes = scopes.clone();
            inner_scopes.push(&dep.dependencies);

            let mut module = Module::new(Ecosystem::Npm, name, &dep.version)
                .with_download_location(dep.resolved.clone())
                .with_checksum(dep.integrity.as_deref().and_then(Checksum::from_sri));

            for (required, range) in &dep.requires {
                let version = inner_scopes
                    .iter()
                    .rev()
                    .find_map(|scope| scope.get(required))
                    .map(|d| d.version.as_str())
                    .unwrap_or(range.as_str());
                module.add_dependency(ModuleKey::new(Ecosystem::Npm, required, version));
            }
            modules.push(module);

            for (child_name, child) in dep.dependencies.iter().rev() {
                stack.push((inner_scopes.clone(), child_name, child));
            }
        }
        modules
    }
}

/// Package name from the lock entry, falling back to the install path
fn package_name(path: &str, package: &LockPackage) -> String {
    package.name.clone().unwrap_or_else(|| {
        path.rfind(NODE_MODULES)
            .map(|idx| path[idx + NODE_MODULES.len()..].to_string())
            .unwrap_or_else(|| path.to_string())
    })
}

/// Node's module resolution: try `<from>/node_modules/<name>`, then each
/// ancestor `node_modules` directory up to the top level.
fn resolve_install_path(from: &str, name: &str, exists: impl Fn(&str) -> bool) -> Option<String> {
    let mut base = from.to_string();
    loop {
        let candidate = if base.is_empty() {
            format!("{}{}", NODE_MODULES, name)
        } else {
            format!("{}/{}{}", base, NODE_MODULES, name)
        };
        if exists(&candidate) {
            return Some(candidate);
        }
        if base.is_empty() {
            return None;
        }
        base = match base.rfind(NODE_MODULES) {
            Some(0) => String::new(),
            Some(idx) => base[..idx].trim_end_matches('/').to_string(),
            None => String::new(),
        };
    }
}

#[async_trait]
impl EcosystemAdapter for NpmAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(has_files(dir, &[PACKAGE_JSON, PACKAGE_LOCK]))
    }

    async fn get_root_module(&self, dir: &Path) -> Result<Module> {
        Ok(PackageJson::read(Self::NAME, dir)?.root_module(dir))
    }

    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>> {
        let manifest = PackageJson::read(Self::NAME, dir)?;
        Self::parse_lock(dir, &manifest)
    }

    async fn get_tool_version(&self) -> Result<String> {
        self.runner.version(Self::NAME, "npm").await
    }
}
