use super::manifest::{directory_name, has_files, parse_json, read_required};
use super::ToolRunner;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Checksum, ChecksumAlgorithm, Ecosystem, Module, ModuleKey, Supplier};
use crate::sbom_generation::policies::LicensePriority;
use crate::shared::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const COMPOSER_JSON: &str = "composer.json";
const COMPOSER_LOCK: &str = "composer.lock";

#[derive(Debug, Default, Deserialize)]
struct ComposerPackage {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    /// A string or an array of alternatives
    #[serde(default)]
    license: Option<Value>,
    #[serde(default)]
    authors: Vec<ComposerAuthor>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    require: BTreeMap<String, String>,
    #[serde(default)]
    dist: Option<ComposerDist>,
}

#[derive(Debug, Default, Deserialize)]
struct ComposerAuthor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ComposerDist {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    shasum: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ComposerLock {
    /// `packages-dev` is not read; development packages are not shipped
    #[serde(default)]
    packages: Vec<ComposerPackage>,
}

impl ComposerPackage {
    fn declared_license(&self) -> Option<String> {
        match self.license.as_ref()? {
            Value::String(license) => Some(license.clone()),
            Value::Array(licenses) => {
                let ids: Vec<String> = licenses
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
                LicensePriority::from_alternatives(&ids)
            }
            _ => None,
        }
    }

    fn supplier(&self) -> Option<Supplier> {
        let author = self.authors.first()?;
        let name = author.name.as_deref()?;
        let formatted = match &author.email {
            Some(email) => format!("{} <{}>", name, email),
            None => name.to_string(),
        };
        Supplier::person_from_author(&formatted)
    }

    fn module(&self, name: &str) -> Module {
        let dist = self.dist.as_ref();
        Module::new(Ecosystem::Composer, name, self.version.clone().unwrap_or_default())
            .with_declared_license(self.declared_license())
            .with_supplier(self.supplier())
            .with_homepage(self.homepage.clone())
            .with_download_location(dist.and_then(|d| d.url.clone()))
            .with_checksum(
                dist.and_then(|d| d.shasum.as_deref())
                    .and_then(|s| Checksum::from_hex(ChecksumAlgorithm::Sha1, s)),
            )
    }
}

/// Platform requirements are not packages
fn is_platform_requirement(name: &str) -> bool {
    name == "php" || name.starts_with("ext-") || name.starts_with("lib-") || !name.contains('/')
}

/// Composer adapter reading `composer.json` and `composer.lock`
pub struct ComposerAdapter {
    runner: ToolRunner,
}

impl ComposerAdapter {
    pub const NAME: &'static str = "composer";

    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    fn read_manifest(dir: &Path) -> Result<ComposerPackage> {
        let content = read_required(Self::NAME, dir, COMPOSER_JSON)?;
        parse_json(dir, COMPOSER_JSON, &content)
    }

    fn root_module(dir: &Path, manifest: &ComposerPackage) -> Module {
        let name = manifest
            .name
            .clone()
            .unwrap_or_else(|| directory_name(dir));
        manifest.module(&name)
    }
}

#[async_trait]
impl EcosystemAdapter for ComposerAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Composer
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(has_files(dir, &[COMPOSER_JSON, COMPOSER_LOCK]))
    }

    async fn get_root_module(&self, dir: &Path) -> Result<Module> {
        let manifest = Self::read_manifest(dir)?;
        Ok(Self::root_module(dir, &manifest))
    }

    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>> {
        let manifest = Self::read_manifest(dir)?;
        let content = read_required(Self::NAME, dir, COMPOSER_LOCK)?;
        let lock: ComposerLock = parse_json(dir, COMPOSER_LOCK, &content)?;

        let locked: Vec<&ComposerPackage> = lock
            .packages
            .iter()
            .filter(|p| p.name.is_some())
            .collect();
        let versions: HashMap<String, String> = locked
            .iter()
            .filter_map(|p| Some((p.name.clone()?.to_lowercase(), p.version.clone().unwrap_or_default())))
            .collect();
        let key_for = |name: &str, constraint: &str| {
            let version = versions
                .get(&name.to_lowercase())
                .cloned()
                .unwrap_or_else(|| constraint.to_string());
            ModuleKey::new(Ecosystem::Composer, name, version)
        };

        let mut root = Self::root_module(dir, &manifest);
        for (name, constraint) in &manifest.require {
            if !is_platform_requirement(name) {
                root.add_dependency(key_for(name, constraint));
            }
        }

        let mut modules = vec![root];
        for package in locked {
            let Some(name) = &package.name else {
                continue;
            };
            let mut module = package.module(name);
            for (dep, constraint) in &package.require {
                if !is_platform_requirement(dep) {
                    module.add_dependency(key_for(dep, constraint));
                }
            }
            modules.push(module);
        }
        Ok(modules)
    }

    async fn get_tool_version(&self) -> Result<String> {
        self.runner.version(Self::NAME, "composer").await
    }
}
