use crate::sbom_generation::domain::{DependencyGraph, Module, ModuleKey};
use crate::sbom_generation::policies::FieldMerge;
use crate::shared::Result;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Output of one successful extraction job
#[derive(Debug, Clone)]
pub struct Subgraph {
    /// Name of the adapter that produced it, for diagnostics
    pub adapter: String,
    pub root: Module,
    pub modules: Vec<Module>,
}

impl Subgraph {
    pub fn new(adapter: impl Into<String>, root: Module, modules: Vec<Module>) -> Self {
        Self {
            adapter: adapter.into(),
            root,
            modules,
        }
    }
}

/// GraphBuilder service merging per-adapter subgraphs into one graph
///
/// Pure logic with no I/O. Subgraphs must be supplied in adapter
/// registration order: that order drives both the field merge precedence
/// and the node order of the resulting graph.
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn build(subgraphs: Vec<Subgraph>) -> Result<DependencyGraph> {
        let mut modules: IndexMap<ModuleKey, Module> = IndexMap::new();
        let mut roots: Vec<ModuleKey> = Vec::new();

        for subgraph in subgraphs {
            let root_key = subgraph.root.key();
            tracing::debug!(
                adapter = %subgraph.adapter,
                root = %root_key,
                modules = subgraph.modules.len(),
                "Merging subgraph"
            );

            Self::insert(&mut modules, subgraph.root.as_root());

            for mut module in subgraph.modules {
                // Nothing inside a subgraph may depend on its own root.
                module.dependencies.retain(|dep| dep != &root_key);
                Self::insert(&mut modules, module);
            }

            if !roots.contains(&root_key) {
                roots.push(root_key);
            }
        }

        Self::materialize_placeholders(&mut modules);

        let graph = DependencyGraph::new(modules, roots);
        graph.validate()?;
        Ok(graph)
    }

    fn insert(modules: &mut IndexMap<ModuleKey, Module>, module: Module) {
        match modules.get_mut(&module.key()) {
            Some(existing) => FieldMerge::merge_into(existing, module),
            None => {
                modules.insert(module.key(), module);
            }
        }
    }

    /// Rewrites every unresolved dependency reference to a placeholder node.
    fn materialize_placeholders(modules: &mut IndexMap<ModuleKey, Module>) {
        let known: HashSet<ModuleKey> = modules.keys().cloned().collect();
        let mut placeholders: IndexMap<ModuleKey, Module> = IndexMap::new();

        for module in modules.values_mut() {
            if module.dependencies.iter().all(|dep| known.contains(dep)) {
                continue;
            }

            let dependencies = std::mem::take(&mut module.dependencies);
            for dep in dependencies {
                if known.contains(&dep) {
                    module.add_dependency(dep);
                    continue;
                }

                let placeholder_key = dep.as_placeholder();
                if !known.contains(&placeholder_key) {
                    placeholders
                        .entry(placeholder_key.clone())
                        .or_insert_with(|| Module::placeholder(&dep));
                }
                tracing::debug!(
                    from = %module.key(),
                    reference = %dep,
                    "Unresolved dependency reference replaced with placeholder"
                );
                module.add_dependency(placeholder_key);
            }
        }

        if !placeholders.is_empty() {
            tracing::info!(count = placeholders.len(), "Added placeholder modules");
        }
        modules.extend(placeholders);
    }
}
