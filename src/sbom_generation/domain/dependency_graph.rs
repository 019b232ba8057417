use super::{Ecosystem, Module, ModuleKey};
use crate::shared::error::SbomError;
use crate::shared::Result;
use indexmap::IndexMap;

/// DependencyGraph aggregate: every module keyed by identity, plus the
/// project roots. Edges live in each module's dependency list.
///
/// Iteration order is insertion order, which the graph builder derives from
/// adapter registration order; downstream output depends on it.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    modules: IndexMap<ModuleKey, Module>,
    roots: Vec<ModuleKey>,
}

impl DependencyGraph {
    pub fn new(modules: IndexMap<ModuleKey, Module>, roots: Vec<ModuleKey>) -> Self {
        Self { modules, roots }
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ModuleKey> {
        self.modules.keys()
    }

    pub fn get(&self, key: &ModuleKey) -> Option<&Module> {
        self.modules.get(key)
    }

    pub fn contains(&self, key: &ModuleKey) -> bool {
        self.modules.contains_key(key)
    }

    pub fn roots(&self) -> &[ModuleKey] {
        &self.roots
    }

    pub fn is_root(&self, key: &ModuleKey) -> bool {
        self.roots.contains(key)
    }

    pub fn total_module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn edge_count(&self) -> usize {
        self.modules.values().map(|m| m.dependencies.len()).sum()
    }

    pub fn placeholder_count(&self) -> usize {
        self.modules.values().filter(|m| m.is_placeholder()).count()
    }

    /// Ecosystems that contributed modules, in first-seen order (placeholders excluded)
    pub fn ecosystems(&self) -> Vec<Ecosystem> {
        let mut seen = Vec::new();
        for module in self.modules.values() {
            if !module.is_placeholder() && !seen.contains(&module.ecosystem) {
                seen.push(module.ecosystem);
            }
        }
        seen
    }

    /// Restricts the graph to one ecosystem.
    ///
    /// Placeholders referenced from the retained modules are kept so every
    /// edge of the subgraph still resolves.
    pub fn subgraph_for(&self, ecosystem: Ecosystem) -> DependencyGraph {
        let mut modules: IndexMap<ModuleKey, Module> = self
            .modules
            .iter()
            .filter(|(key, _)| key.ecosystem == ecosystem)
            .map(|(key, module)| (key.clone(), module.clone()))
            .collect();

        let referenced: Vec<ModuleKey> = modules
            .values()
            .flat_map(|m| m.dependencies.iter())
            .filter(|dep| !modules.contains_key(*dep))
            .cloned()
            .collect();

        for key in referenced {
            if let Some(module) = self.modules.get(&key) {
                modules.entry(key).or_insert_with(|| module.clone());
            }
        }

        let roots = self
            .roots
            .iter()
            .filter(|key| key.ecosystem == ecosystem)
            .cloned()
            .collect();

        DependencyGraph::new(modules, roots)
    }

    /// Checks that every root and every dependency reference resolves to a node.
    pub fn validate(&self) -> Result<()> {
        for root in &self.roots {
            if !self.modules.contains_key(root) {
                return Err(SbomError::Resolution {
                    reference: root.to_string(),
                    details: "root module is not part of the graph".to_string(),
                }
                .into());
            }
        }

        for module in self.modules.values() {
            for dep in &module.dependencies {
                if !self.modules.contains_key(dep) {
                    return Err(SbomError::Resolution {
                        reference: dep.to_string(),
                        details: format!("referenced by {} but missing from the graph", module.key()),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}
