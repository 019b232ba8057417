use super::manifest::{has_files, parse_error, read_required, retain_reachable};
use super::npm::{PackageJson, PACKAGE_JSON};
use super::ToolRunner;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Checksum, Ecosystem, Module, ModuleKey};
use crate::shared::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

const YARN_LOCK: &str = "yarn.lock";

/// One resolved block of a yarn v1 lockfile
#[derive(Debug, Default)]
struct LockEntry {
    name: String,
    version: String,
    resolved: Option<String>,
    integrity: Option<String>,
    dependencies: Vec<(String, String)>,
}

/// Parsed lockfile: entries in file order plus the selector index
#[derive(Debug, Default)]
struct YarnLock {
    entries: Vec<LockEntry>,
    /// `name@range` selector to entry index
    selectors: HashMap<String, usize>,
}

impl YarnLock {
    fn parse(content: &str) -> std::result::Result<Self, String> {
        let mut lock = YarnLock::default();
        let mut current: Option<LockEntry> = None;
        let mut in_dependencies = false;

        for (line_no, raw) in content.lines().enumerate() {
            if raw.trim().is_empty() || raw.trim_start().starts_with('#') {
                continue;
            }
            let indent = raw.len() - raw.trim_start().len();
            let line = raw.trim();

            match indent {
                0 => {
                    if let Some(entry) = current.take() {
                        lock.entries.push(entry);
                    }
                    let header = line
                        .strip_suffix(':')
                        .ok_or_else(|| format!("line {}: expected an entry header", line_no + 1))?;

                    let mut entry = LockEntry::default();
                    for selector in header.split(", ").map(unquote) {
                        let (name, _) = split_selector(selector)
                            .ok_or_else(|| format!("line {}: invalid selector {}", line_no + 1, selector))?;
                        entry.name = name.to_string();
                        lock.selectors.insert(selector.to_string(), lock.entries.len());
                    }
                    current = Some(entry);
                    in_dependencies = false;
                }
                2 => {
                    let entry = current
                        .as_mut()
                        .ok_or_else(|| format!("line {}: field outside of an entry", line_no + 1))?;
                    in_dependencies = matches!(line, "dependencies:" | "optionalDependencies:");
                    if in_dependencies {
                        continue;
                    }
                    if let Some((key, value)) = line.split_once(' ') {
                        let value = unquote(value.trim()).to_string();
                        match key {
                            "version" => entry.version = value,
                            "resolved" => entry.resolved = Some(value),
                            "integrity" => entry.integrity = Some(value),
                            _ => {}
                        }
                    }
                }
                _ if in_dependencies => {
                    if let (Some(entry), Some((name, range))) = (current.as_mut(), line.split_once(' ')) {
                        entry
                            .dependencies
                            .push((unquote(name).to_string(), unquote(range.trim()).to_string()));
                    }
                }
                _ => {}
            }
        }

        if let Some(entry) = current.take() {
            lock.entries.push(entry);
        }
        Ok(lock)
    }

    fn resolve(&self, name: &str, range: &str) -> ModuleKey {
        match self.selectors.get(&format!("{}@{}", name, range)) {
            Some(&index) => {
                let entry = &self.entries[index];
                ModuleKey::new(Ecosystem::Npm, &entry.name, &entry.version)
            }
            None => ModuleKey::new(Ecosystem::Npm, name, range),
        }
    }
}

fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}

/// Splits `name@range`, keeping the leading `@` of scoped names
fn split_selector(selector: &str) -> Option<(&str, &str)> {
    let (at, _) = selector.char_indices().skip(1).find(|(_, c)| *c == '@')?;
    Some((&selector[..at], &selector[at + 1..]))
}

/// yarn (classic) adapter reading `package.json` and `yarn.lock`
pub struct YarnAdapter {
    runner: ToolRunner,
}

impl YarnAdapter {
    pub const NAME: &'static str = "yarn";

    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl EcosystemAdapter for YarnAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(has_files(dir, &[PACKAGE_JSON, YARN_LOCK]))
    }

    async fn get_root_module(&self, dir: &Path) -> Result<Module> {
        Ok(PackageJson::read(Self::NAME, dir)?.root_module(dir))
    }

    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>> {
        let package = PackageJson::read(Self::NAME, dir)?;
        let content = read_required(Self::NAME, dir, YARN_LOCK)?;
        let lock = YarnLock::parse(&content).map_err(|e| parse_error(dir, YARN_LOCK, e))?;

        let mut root = package.root_module(dir);
        for (name, range) in &package.dependencies {
            root.add_dependency(lock.resolve(name, range));
        }

        let mut modules = vec![root];
        for entry in &lock.entries {
            let mut module = Module::new(Ecosystem::Npm, &entry.name, &entry.version)
                .with_download_location(entry.resolved.clone())
                .with_checksum(entry.integrity.as_deref().and_then(Checksum::from_sri));
            for (name, range) in &entry.dependencies {
                module.add_dependency(lock.resolve(name, range));
            }
            modules.push(module);
        }

        tracing::debug!(entries = lock.entries.len(), "Parsed yarn.lock");
        // yarn.lock does not mark devDependencies; they are unreachable from the root
        Ok(retain_reachable(modules))
    }

    async fn get_tool_version(&self) -> Result<String> {
        self.runner.version(Self::NAME, "yarn").await
    }
}
