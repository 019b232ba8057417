use crate::sbom_generation::domain::{Module, ModuleKey};
use crate::shared::error::SbomError;
use crate::shared::security::read_manifest;
use crate::shared::Result;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Reads a manifest the adapter cannot work without.
///
/// A missing file maps to [`SbomError::NotFound`] scoped to `adapter`.
pub(crate) fn read_required(adapter: &str, dir: &Path, file_name: &str) -> Result<String> {
    let path = dir.join(file_name);
    if !path.exists() {
        return Err(SbomError::NotFound {
            adapter: adapter.to_string(),
            manifest: file_name.to_string(),
            path: dir.to_path_buf(),
        }
        .into());
    }
    read_manifest(&path)
}

/// Reads an optional lockfile, `None` when it does not exist
pub(crate) fn read_optional(dir: &Path, file_name: &str) -> Result<Option<String>> {
    let path = dir.join(file_name);
    if !path.exists() {
        return Ok(None);
    }
    read_manifest(&path).map(Some)
}

pub(crate) fn parse_json<T: DeserializeOwned>(dir: &Path, file_name: &str, content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| {
        SbomError::ManifestParse {
            path: dir.join(file_name),
            details: e.to_string(),
        }
        .into()
    })
}

pub(crate) fn parse_toml<T: DeserializeOwned>(dir: &Path, file_name: &str, content: &str) -> Result<T> {
    toml::from_str(content).map_err(|e| {
        SbomError::ManifestParse {
            path: dir.join(file_name),
            details: e.to_string(),
        }
        .into()
    })
}

pub(crate) fn parse_xml<'a>(
    dir: &Path,
    file_name: &str,
    content: &'a str,
) -> Result<roxmltree::Document<'a>> {
    roxmltree::Document::parse(content).map_err(|e| {
        SbomError::ManifestParse {
            path: dir.join(file_name),
            details: e.to_string(),
        }
        .into()
    })
}

pub(crate) fn parse_error(dir: &Path, file_name: &str, details: impl Into<String>) -> anyhow::Error {
    SbomError::ManifestParse {
        path: dir.join(file_name),
        details: details.into(),
    }
    .into()
}

/// Whether every listed file exists in `dir` as a regular file
pub(crate) fn has_files(dir: &Path, file_names: &[&str]) -> bool {
    file_names.iter().all(|name| dir.join(name).is_file())
}

/// Final path component, used as the root name for manifest-less ecosystems
pub(crate) fn directory_name(dir: &Path) -> String {
    dir.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(dir)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

/// First non-empty string among the candidates
pub(crate) fn first_present<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Keeps the root (first module) and every module reachable from it.
///
/// Lockfiles that do not mark development packages still leave them
/// unreachable once the root's development edges are dropped.
pub(crate) fn retain_reachable(modules: Vec<Module>) -> Vec<Module> {
    let Some(root) = modules.first() else {
        return modules;
    };
    let by_key: HashMap<ModuleKey, &Module> = modules.iter().map(|m| (m.key(), m)).collect();
    let mut reachable: HashSet<ModuleKey> = HashSet::from([root.key()]);
    let mut pending: Vec<&ModuleKey> = root.dependencies.iter().collect();

    while let Some(key) = pending.pop() {
        if reachable.insert(key.clone()) {
            if let Some(module) = by_key.get(key) {
                pending.extend(module.dependencies.iter());
            }
        }
    }

    let dropped = modules.len() - modules.iter().filter(|m| reachable.contains(&m.key())).count();
    if dropped > 0 {
        tracing::debug!(dropped, "Skipping packages not reachable from the root");
    }
    modules
        .into_iter()
        .filter(|m| reachable.contains(&m.key()))
        .collect()
}
