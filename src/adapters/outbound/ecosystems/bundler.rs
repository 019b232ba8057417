use super::manifest::{directory_name, has_files, read_required};
use super::ToolRunner;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Ecosystem, Module, ModuleKey};
use crate::shared::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::path::Path;

const GEMFILE: &str = "Gemfile";
const GEMFILE_LOCK: &str = "Gemfile.lock";

/// A locked gem with the names of the gems it requires
#[derive(Debug, Clone, PartialEq, Eq)]
struct LockedGem {
    name: String,
    version: String,
    dependencies: Vec<String>,
}

/// Parsed `Gemfile.lock`: the `GEM` specs and top-level `DEPENDENCIES`
#[derive(Debug, Default)]
struct GemfileLock {
    gems: IndexMap<String, LockedGem>,
    direct: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Specs,
    Dependencies,
    Other,
}

/// `name (version)` or a bare `name`, returning the name and the text in parentheses
fn split_spec(line: &str) -> (&str, Option<&str>) {
    match line.split_once(" (") {
        Some((name, rest)) => (name.trim(), Some(rest.trim_end_matches(')').trim())),
        None => (line.trim().trim_end_matches('!'), None),
    }
}

impl GemfileLock {
    fn parse(content: &str) -> Self {
        let mut lock = GemfileLock::default();
        let mut section = Section::Other;
        let mut current: Option<String> = None;

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let indent = line.len() - line.trim_start().len();
            let text = line.trim();

            if indent == 0 {
                section = if text == "DEPENDENCIES" {
                    Section::Dependencies
                } else {
                    Section::Other
                };
                current = None;
                continue;
            }

            match (section, indent) {
                (Section::Dependencies, 2) => {
                    let (name, _) = split_spec(text);
                    lock.direct.push(name.to_string());
                }
                (Section::Other | Section::Specs, 2) if text == "specs:" => {
                    section = Section::Specs;
                }
                (Section::Specs, 4) => {
                    let (name, version) = split_spec(text);
                    // Platform-specific gems repeat the name with a suffixed version
                    let version = version.unwrap_or_default();
                    let version = version.split('-').next().unwrap_or(version);
                    lock.gems.entry(name.to_string()).or_insert_with(|| LockedGem {
                        name: name.to_string(),
                        version: version.to_string(),
                        dependencies: Vec::new(),
                    });
                    current = Some(name.to_string());
                }
                (Section::Specs, 6) => {
                    let (name, _) = split_spec(text);
                    if let Some(gem) = current.as_ref().and_then(|c| lock.gems.get_mut(c)) {
                        if !gem.dependencies.iter().any(|d| d == name) {
                            gem.dependencies.push(name.to_string());
                        }
                    }
                }
                _ => {}
            }
        }
        lock
    }

    fn key_for(&self, name: &str) -> ModuleKey {
        let version = self
            .gems
            .get(name)
            .map(|g| g.version.clone())
            .unwrap_or_default();
        ModuleKey::new(Ecosystem::RubyGems, name, version)
    }
}

/// Bundler adapter reading `Gemfile.lock`
///
/// Gemfiles carry no project metadata, so the root module is named after
/// the project directory.
pub struct BundlerAdapter {
    runner: ToolRunner,
}

impl BundlerAdapter {
    pub const NAME: &'static str = "bundler";

    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    fn root_module(dir: &Path) -> Module {
        Module::new(Ecosystem::RubyGems, directory_name(dir), "")
    }
}

#[async_trait]
impl EcosystemAdapter for BundlerAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::RubyGems
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(has_files(dir, &[GEMFILE, GEMFILE_LOCK]))
    }

    async fn get_root_module(&self, dir: &Path) -> Result<Module> {
        read_required(Self::NAME, dir, GEMFILE)?;
        Ok(Self::root_module(dir))
    }

    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>> {
        read_required(Self::NAME, dir, GEMFILE)?;
        let content = read_required(Self::NAME, dir, GEMFILE_LOCK)?;
        let lock = GemfileLock::parse(&content);

        let mut root = Self::root_module(dir);
        for name in &lock.direct {
            root.add_dependency(lock.key_for(name));
        }

        let mut modules = vec![root];
        for gem in lock.gems.values() {
            let location = format!(
                "https://rubygems.org/downloads/{}-{}.gem",
                gem.name, gem.version
            );
            let mut module = Module::new(Ecosystem::RubyGems, &gem.name, &gem.version)
                .with_download_location(Some(location));
            for dependency in &gem.dependencies {
                module.add_dependency(lock.key_for(dependency));
            }
            modules.push(module);
        }
        Ok(modules)
    }

    async fn get_tool_version(&self) -> Result<String> {
        self.runner.version(Self::NAME, "bundle").await
    }
}
