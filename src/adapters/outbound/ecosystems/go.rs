use super::manifest::{parse_error, read_required};
use super::ToolRunner;
use crate::ports::outbound::EcosystemAdapter;
use crate::sbom_generation::domain::{Ecosystem, Module, ModuleKey};
use crate::shared::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::path::Path;

const GO_MOD: &str = "go.mod";

/// Parsed `go.mod`: module path and require directives
#[derive(Debug, Default, PartialEq, Eq)]
struct GoMod {
    module: String,
    requires: Vec<(String, String)>,
}

impl GoMod {
    fn parse(content: &str) -> std::result::Result<Self, String> {
        let mut go_mod = GoMod::default();
        let mut in_require_block = false;

        for raw in content.lines() {
            let line = raw.split("//").next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            if in_require_block {
                if line == ")" {
                    in_require_block = false;
                } else if let Some(require) = parse_require(line) {
                    go_mod.requires.push(require);
                }
                continue;
            }

            if let Some(path) = line.strip_prefix("module ") {
                go_mod.module = path.trim().trim_matches('"').to_string();
            } else if line == "require (" {
                in_require_block = true;
            } else if let Some(rest) = line.strip_prefix("require ") {
                if let Some(require) = parse_require(rest) {
                    go_mod.requires.push(require);
                }
            }
        }

        if go_mod.module.is_empty() {
            return Err("missing module directive".to_string());
        }
        Ok(go_mod)
    }
}

fn parse_require(line: &str) -> Option<(String, String)> {
    let mut parts = line.split_whitespace();
    let path = parts.next()?;
    let version = parts.next()?;
    Some((path.to_string(), version.to_string()))
}

/// `path@version`, or a bare path for the main module
fn parse_graph_node(node: &str) -> ModuleKey {
    match node.rsplit_once('@') {
        Some((path, version)) => ModuleKey::new(Ecosystem::Go, path, version),
        None => ModuleKey::new(Ecosystem::Go, node, ""),
    }
}

/// Go modules adapter
///
/// Runs `go mod graph` for the full module graph and falls back to the
/// `go.mod` require directives when the `go` executable is not installed.
pub struct GoAdapter {
    runner: ToolRunner,
    executable: String,
}

impl GoAdapter {
    pub const NAME: &'static str = "go";

    pub fn new(runner: ToolRunner) -> Self {
        Self::with_executable(runner, "go")
    }

    pub fn with_executable(runner: ToolRunner, executable: impl Into<String>) -> Self {
        Self {
            runner,
            executable: executable.into(),
        }
    }

    fn read_go_mod(dir: &Path) -> Result<GoMod> {
        let content = read_required(Self::NAME, dir, GO_MOD)?;
        GoMod::parse(&content).map_err(|e| parse_error(dir, GO_MOD, e))
    }

    fn from_graph(output: &str, root: Module) -> Vec<Module> {
        let mut modules: IndexMap<ModuleKey, Module> = IndexMap::new();
        modules.insert(root.key(), root.clone());

        for line in output.lines() {
            let Some((from, to)) = line.split_once(' ') else {
                continue;
            };
            let mut from = parse_graph_node(from.trim());
            if from.version.is_empty() {
                from = root.key();
            }
            let to = parse_graph_node(to.trim());

            modules
                .entry(to.clone())
                .or_insert_with(|| Module::new(Ecosystem::Go, &to.name, &to.version));
            modules
                .entry(from.clone())
                .or_insert_with(|| Module::new(Ecosystem::Go, &from.name, &from.version))
                .add_dependency(to);
        }
        modules.into_values().collect()
    }

    fn from_go_mod(go_mod: &GoMod, mut root: Module) -> Vec<Module> {
        let mut modules = Vec::new();
        for (path, version) in &go_mod.requires {
            let module = Module::new(Ecosystem::Go, path, version);
            root.add_dependency(module.key());
            modules.push(module);
        }
        modules.insert(0, root);
        modules
    }
}

#[async_trait]
impl EcosystemAdapter for GoAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(dir.join(GO_MOD).is_file())
    }

    async fn get_root_module(&self, dir: &Path) -> Result<Module> {
        let go_mod = Self::read_go_mod(dir)?;
        Ok(Module::new(Ecosystem::Go, go_mod.module, ""))
    }

    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>> {
        let go_mod = Self::read_go_mod(dir)?;
        let root = Module::new(Ecosystem::Go, &go_mod.module, "");

        match self
            .runner
            .run(Self::NAME, &self.executable, &["mod", "graph"], Some(dir))
            .await?
        {
            Some(output) => Ok(Self::from_graph(&output, root)),
            None => {
                tracing::warn!(
                    executable = %self.executable,
                    "go executable not found, using go.mod require directives"
                );
                Ok(Self::from_go_mod(&go_mod, root))
            }
        }
    }

    async fn get_tool_version(&self) -> Result<String> {
        self.runner
            .version_with(Self::NAME, &self.executable, &["version"])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const GO_MOD_CONTENT: &str = r#"module example.com/shop

go 1.22

require github.com/google/uuid v1.6.0

require (
    golang.org/x/text v0.14.0 // indirect
    github.com/pkg/errors v0.9.1
)
"#;

    #[test]
    fn test_parse_go_mod() {
        let go_mod = GoMod::parse(GO_MOD_CONTENT).unwrap();
        assert_eq!(go_mod.module, "example.com/shop");
        assert_eq!(
            go_mod.requires,
            vec![
                ("github.com/google/uuid".to_string(), "v1.6.0".to_string()),
                ("golang.org/x/text".to_string(), "v0.14.0".to_string()),
                ("github.com/pkg/errors".to_string(), "v0.9.1".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_go_mod_requires_module() {
        assert!(GoMod::parse("go 1.22\n").is_err());
    }

    #[test]
    fn test_from_graph() {
        let root = Module::new(Ecosystem::Go, "example.com/shop", "");
        let output = "example.com/shop github.com/google/uuid@v1.6.0\n\
                      example.com/shop golang.org/x/text@v0.14.0\n\
                      golang.org/x/text@v0.14.0 golang.org/x/tools@v0.1.0\n";

        let modules = GoAdapter::from_graph(output, root);
        assert_eq!(modules.len(), 4);
        assert_eq!(modules[0].dependencies.len(), 2);

        let text = modules.iter().find(|m| m.name == "golang.org/x/text").unwrap();
        assert_eq!(
            text.dependencies,
            vec![ModuleKey::new(Ecosystem::Go, "golang.org/x/tools", "v0.1.0")]
        );
        assert_eq!(
            text.package_url.as_deref(),
            Some("pkg:golang/golang.org/x/text@v0.14.0")
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_go_mod_without_executable() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(GO_MOD), GO_MOD_CONTENT).unwrap();

        let adapter = GoAdapter::with_executable(ToolRunner::default(), "no-such-go-binary-4711");
        let root = adapter.get_root_module(dir.path()).await.unwrap();
        assert_eq!(root.name, "example.com/shop");

        let modules = adapter
            .list_modules_with_dependencies(dir.path())
            .await
            .unwrap();
        assert_eq!(modules.len(), 4);
        assert_eq!(modules[0].dependencies.len(), 3);
    }

    #[tokio::test]
    async fn test_tool_version_without_executable_is_error() {
        let adapter = GoAdapter::with_executable(ToolRunner::default(), "no-such-go-binary-4711");
        assert!(adapter.get_tool_version().await.is_err());
    }
}
