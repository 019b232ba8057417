use super::manifest::{parse_json, parse_xml, read_optional};
use super::ToolRunner;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Checksum, ChecksumAlgorithm, Ecosystem, Module, ModuleKey, Supplier};
use crate::shared::error::SbomError;
use crate::shared::security::read_manifest;
use crate::shared::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

const PACKAGES_LOCK_JSON: &str = "packages.lock.json";
const PROJECT_EXTENSION: &str = "csproj";

#[derive(Debug, Deserialize)]
struct PackagesLock {
    /// Target framework moniker to package entries
    #[serde(default)]
    dependencies: BTreeMap<String, BTreeMap<String, LockEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LockEntry {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    resolved: Option<String>,
    #[serde(default)]
    content_hash: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

impl LockEntry {
    fn is_direct(&self) -> bool {
        self.kind.as_deref() == Some("Direct")
    }
}

/// Properties and package references of an SDK-style project file
#[derive(Debug, Default)]
struct ProjectFile {
    name: String,
    version: String,
    authors: Option<String>,
    license: Option<String>,
    homepage: Option<String>,
    references: Vec<(String, String)>,
}

impl ProjectFile {
    fn parse(document: &roxmltree::Document<'_>, fallback_name: &str) -> Self {
        let property = |tag: &str| {
            document
                .descendants()
                .filter(|n| n.has_tag_name("PropertyGroup"))
                .flat_map(|g| g.children())
                .find(|n| n.has_tag_name(tag))
                .and_then(|n| n.text())
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        };

        let references = document
            .descendants()
            .filter(|n| n.has_tag_name("PackageReference"))
            .filter_map(|n| {
                let name = n.attribute("Include").or_else(|| n.attribute("Update"))?;
                let version = n
                    .attribute("Version")
                    .map(str::to_string)
                    .or_else(|| {
                        n.children()
                            .find(|c| c.has_tag_name("Version"))
                            .and_then(|c| c.text())
                            .map(|t| t.trim().to_string())
                    })
                    .unwrap_or_default();
                Some((name.to_string(), version))
            })
            .collect();

        ProjectFile {
            name: property("PackageId")
                .or_else(|| property("AssemblyName"))
                .unwrap_or_else(|| fallback_name.to_string()),
            version: property("Version")
                .or_else(|| property("VersionPrefix"))
                .unwrap_or_default(),
            authors: property("Authors"),
            license: property("PackageLicenseExpression"),
            homepage: property("PackageProjectUrl"),
            references,
        }
    }
}

fn nuget_download_location(name: &str, version: &str) -> Option<String> {
    (!version.is_empty()).then(|| {
        format!(
            "https://www.nuget.org/api/v2/package/{}/{}",
            name, version
        )
    })
}

/// NuGet adapter reading an SDK-style `*.csproj` and, when present,
/// its `packages.lock.json`
pub struct NuGetAdapter {
    runner: ToolRunner,
}

impl NuGetAdapter {
    pub const NAME: &'static str = "nuget";

    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    /// First project file in name order
    fn project_path(dir: &Path) -> Option<PathBuf> {
        let mut projects: Vec<PathBuf> = fs::read_dir(dir)
            .ok()?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(PROJECT_EXTENSION)
            })
            .collect();
        projects.sort();
        projects.into_iter().next()
    }

    fn read_project(dir: &Path) -> Result<ProjectFile> {
        let path = Self::project_path(dir).ok_or_else(|| SbomError::NotFound {
            adapter: Self::NAME.to_string(),
            manifest: format!("*.{}", PROJECT_EXTENSION),
            path: dir.to_path_buf(),
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let stem = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let content = read_manifest(&path)?;
        let document = parse_xml(dir, &file_name, &content)?;
        Ok(ProjectFile::parse(&document, &stem))
    }

    fn root_module(project: &ProjectFile) -> Module {
        Module::new(Ecosystem::NuGet, &project.name, &project.version)
            .with_declared_license(project.license.clone())
            .with_supplier(
                project
                    .authors
                    .as_deref()
                    .and_then(|a| a.split([',', ';']).next())
                    .and_then(Supplier::person_from_author),
            )
            .with_homepage(project.homepage.clone())
    }

    fn modules_from_lock(lock: &PackagesLock, mut root: Module) -> Vec<Module> {
        let mut seen: HashSet<ModuleKey> = HashSet::new();
        let mut modules = Vec::new();

        for entries in lock.dependencies.values() {
            let resolved: HashMap<String, &str> = entries
                .iter()
                .filter_map(|(name, e)| Some((name.to_lowercase(), e.resolved.as_deref()?)))
                .collect();
            let key_for = |name: &str, range: &str| {
                let version = resolved
                    .get(&name.to_lowercase())
                    .copied()
                    .unwrap_or(range);
                ModuleKey::new(Ecosystem::NuGet, name, version)
            };

            for (name, entry) in entries {
                if entry.kind.as_deref() == Some("Project") {
                    continue;
                }
                let version = entry.resolved.clone().unwrap_or_default();
                let key = ModuleKey::new(Ecosystem::NuGet, name, &version);
                if entry.is_direct() {
                    root.add_dependency(key.clone());
                }
                if !seen.insert(key) {
                    continue;
                }

                let mut module = Module::new(Ecosystem::NuGet, name, &version)
                    .with_download_location(nuget_download_location(name, &version))
                    .with_checksum(
                        entry
                            .content_hash
                            .as_deref()
                            .and_then(|h| Checksum::from_base64(ChecksumAlgorithm::Sha512, h)),
                    );
                for (dep, range) in &entry.dependencies {
                    module.add_dependency(key_for(dep.as_str(), range.as_str()));
                }
                modules.push(module);
            }
        }

        modules.insert(0, root);
        modules
    }
}

#[async_trait]
impl EcosystemAdapter for NuGetAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::NuGet
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(Self::project_path(dir).is_some())
    }

    async fn get_root_module(&self, dir: &Path) -> Result<Module> {
        Ok(Self::root_module(&Self::read_project(dir)?))
    }

    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>> {
        let project = Self::read_project(dir)?;
        let mut root = Self::root_module(&project);

        if let Some(content) = read_optional(dir, PACKAGES_LOCK_JSON)? {
            let lock: PackagesLock = parse_json(dir, PACKAGES_LOCK_JSON, &content)?;
            return Ok(Self::modules_from_lock(&lock, root));
        }

        tracing::debug!(
            "No {} found, reporting direct package references only",
            PACKAGES_LOCK_JSON
        );
        let mut modules = Vec::new();
        for (name, version) in &project.references {
            let module = Module::new(Ecosystem::NuGet, name, version)
                .with_download_location(nuget_download_location(name, version));
            root.add_dependency(module.key());
            modules.push(module);
        }
        modules.insert(0, root);
        Ok(modules)
    }

    async fn get_tool_version(&self) -> Result<String> {
        self.runner.version(Self::NAME, "dotnet").await
    }
}
