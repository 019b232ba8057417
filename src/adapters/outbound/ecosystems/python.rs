use super::manifest::{parse_toml, read_required};
use crate::sbom_generation::domain::{Ecosystem, Module, Supplier};
use crate::sbom_generation::policies::LicensePriority;
use crate::shared::error::SbomError;
use crate::shared::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub(super) const PYPROJECT_TOML: &str = "pyproject.toml";

#[derive(Debug, Default, Deserialize)]
pub(super) struct PyProject {
    #[serde(default)]
    pub project: Option<ProjectTable>,
    #[serde(default)]
    pub tool: Option<ToolTable>,
}

/// PEP 621 `[project]` table
#[derive(Debug, Default, Deserialize)]
pub(super) struct ProjectTable {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// PEP 639 expression string, or the legacy `{ text = ... }` table
    #[serde(default)]
    pub license: Option<toml::Value>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub classifiers: Vec<String>,
    #[serde(default)]
    pub urls: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct Author {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ToolTable {
    #[serde(default)]
    pub poetry: Option<PoetryTable>,
}

/// `[tool.poetry]` table
#[derive(Debug, Default, Deserialize)]
pub(super) struct PoetryTable {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, toml::Value>,
}

impl PyProject {
    pub fn read(adapter: &str, dir: &Path) -> Result<Self> {
        let content = read_required(adapter, dir, PYPROJECT_TOML)?;
        parse_toml(dir, PYPROJECT_TOML, &content)
    }

    /// Root module from `[project]`, falling back to `[tool.poetry]`
    pub fn root_module(&self, adapter: &str, dir: &Path) -> Result<Module> {
        if let Some(project) = &self.project {
            return Ok(project.root_module());
        }
        if let Some(poetry) = self.tool.as_ref().and_then(|t| t.poetry.as_ref()) {
            if let Some(name) = &poetry.name {
                return Ok(Module::new(
                    Ecosystem::PyPi,
                    normalize_name(name),
                    poetry.version.clone().unwrap_or_default(),
                )
                .with_declared_license(poetry.license.clone())
                .with_supplier(poetry.authors.first().and_then(|a| Supplier::person_from_author(a)))
                .with_homepage(poetry.homepage.clone()));
            }
        }
        Err(SbomError::ManifestParse {
            path: dir.join(PYPROJECT_TOML),
            details: format!("{}: no [project] or [tool.poetry] name", adapter),
        }
        .into())
    }
}

impl ProjectTable {
    fn root_module(&self) -> Module {
        let (license, expression) = match &self.license {
            Some(toml::Value::String(expression)) => (None, Some(expression.clone())),
            Some(toml::Value::Table(table)) => (
                table
                    .get("text")
                    .and_then(toml::Value::as_str)
                    .map(str::to_string),
                None,
            ),
            _ => (None, None),
        };

        let supplier = self.authors.first().and_then(|author| {
            let name = author.name.as_deref()?;
            let formatted = match &author.email {
                Some(email) => format!("{} <{}>", name, email),
                None => name.to_string(),
            };
            Supplier::person_from_author(&formatted)
        });

        let homepage = self
            .urls
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("homepage"))
            .map(|(_, url)| url.clone());

        Module::new(
            Ecosystem::PyPi,
            normalize_name(&self.name),
            self.version.clone().unwrap_or_default(),
        )
        .with_declared_license(LicensePriority::select_license(
            license,
            expression,
            &self.classifiers,
        ))
        .with_supplier(supplier)
        .with_homepage(homepage)
    }
}

/// PEP 503 normalized distribution name
pub(super) fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut last_was_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_was_separator {
                normalized.push('-');
            }
            last_was_separator = true;
        } else {
            normalized.extend(c.to_lowercase());
            last_was_separator = false;
        }
    }
    normalized
}

/// PyPI download URL for a source distribution
pub(super) fn pypi_download_location(name: &str) -> String {
    format!("https://pypi.org/project/{}/", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Flask_SQLAlchemy"), "flask-sqlalchemy");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("a__b"), "a-b");
    }

    #[test]
    fn test_root_module_from_project_table() {
        let pyproject: PyProject = toml::from_str(
            r#"
[project]
name = "My_App"
version = "1.2.0"
license = { text = "UNKNOWN" }
classifiers = ["License :: OSI Approved :: MIT License"]
authors = [{ name = "Ada", email = "ada@example.com" }]

[project.urls]
Homepage = "https://example.com"
"#,
        )
        .unwrap();

        let root = pyproject.root_module("uv", Path::new(".")).unwrap();
        assert_eq!(root.name, "my-app");
        assert_eq!(root.version, "1.2.0");
        assert_eq!(root.declared_license.as_deref(), Some("MIT"));
        assert_eq!(root.homepage.as_deref(), Some("https://example.com"));
        assert_eq!(
            root.supplier.map(|s| s.to_string()).as_deref(),
            Some("Person: Ada (ada@example.com)")
        );
    }

    #[test]
    fn test_root_module_from_poetry_table() {
        let pyproject: PyProject = toml::from_str(
            r#"
[tool.poetry]
name = "tool"
version = "0.1.0"
license = "Apache-2.0"
authors = ["Bo <bo@example.com>"]
"#,
        )
        .unwrap();

        let root = pyproject.root_module("poetry", Path::new(".")).unwrap();
        assert_eq!(root.name, "tool");
        assert_eq!(root.declared_license.as_deref(), Some("Apache-2.0"));
    }

    #[test]
    fn test_root_module_without_name_is_error() {
        let pyproject = PyProject::default();
        assert!(pyproject.root_module("uv", Path::new(".")).is_err());
    }
}
