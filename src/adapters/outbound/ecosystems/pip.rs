use super::manifest::{directory_name, read_required};
use super::python::{normalize_name, pypi_download_location};
use super::ToolRunner;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Ecosystem, Module};
use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;

const REQUIREMENTS_TXT: &str = "requirements.txt";

/// One requirement line: name and the pinned version, if any
#[derive(Debug, PartialEq, Eq)]
struct Requirement {
    name: String,
    version: String,
}

/// Parses requirement lines, skipping comments, options (`-r`, `--hash`)
/// and URL or path requirements.
fn parse_requirements(content: &str) -> Vec<Requirement> {
    content
        .lines()
        .map(|line| line.split(" #").next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .filter(|line| !line.contains("://") && !line.starts_with('.') && !line.starts_with('/'))
        .filter_map(|line| {
            let spec = line.split(';').next().unwrap_or_default().trim();
            let spec = spec.split(" \\").next().unwrap_or_default().trim();
            let name_end = spec
                .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
                .unwrap_or(spec.len());
            let name = &spec[..name_end];
            if name.is_empty() {
                return None;
            }

            let version = spec
                .split_once("===")
                .or_else(|| spec.split_once("=="))
                .map(|(_, v)| v.split(',').next().unwrap_or_default().trim().to_string())
                .unwrap_or_default();

            Some(Requirement {
                name: normalize_name(name),
                version,
            })
        })
        .collect()
}

/// pip adapter reading `requirements.txt`
///
/// Requirements files carry no dependency graph, so only direct
/// dependencies of the project are reported.
pub struct PipAdapter {
    runner: ToolRunner,
}

impl PipAdapter {
    pub const NAME: &'static str = "pip";

    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    fn root_module(dir: &Path) -> Module {
        Module::new(Ecosystem::PyPi, normalize_name(&directory_name(dir)), "")
    }
}

#[async_trait]
impl EcosystemAdapter for PipAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::PyPi
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(dir.join(REQUIREMENTS_TXT).is_file())
    }

    async fn get_root_module(&self, dir: &Path) -> Result<Module> {
        read_required(Self::NAME, dir, REQUIREMENTS_TXT)?;
        Ok(Self::root_module(dir))
    }

    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>> {
        let content = read_required(Self::NAME, dir, REQUIREMENTS_TXT)?;
        let mut root = Self::root_module(dir);

        let mut modules = Vec::new();
        for requirement in parse_requirements(&content) {
            let module = Module::new(Ecosystem::PyPi, &requirement.name, requirement.version)
                .with_download_location(Some(pypi_download_location(&requirement.name)));
            root.add_dependency(module.key());
            modules.push(module);
        }
        modules.insert(0, root);
        Ok(modules)
    }

    async fn get_tool_version(&self) -> Result<String> {
        self.runner.version(Self::NAME, "pip").await
    }
}
