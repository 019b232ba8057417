//! Ordered registry of ecosystem adapters

use crate::ports::outbound::EcosystemAdapter;
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::sync::Arc;

/// Registry of ecosystem adapters.
///
/// Registration order is the tie-break for every ordering decision
/// downstream: job order, merge precedence and document order.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn EcosystemAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn EcosystemAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn adapters(&self) -> &[Arc<dyn EcosystemAdapter>] {
        &self.adapters
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Adapter names in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn EcosystemAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(name))
    }

    /// Restricts and reorders the registry to the named adapters.
    ///
    /// An empty selection keeps every adapter. Duplicate names are ignored.
    ///
    /// # Errors
    /// `SbomError::Configuration` for a name no adapter answers to.
    pub fn select(&self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self.clone());
        }

        let mut selected = Self::new();
        for name in names {
            let adapter = self.get(name.trim()).ok_or_else(|| SbomError::Configuration {
                message: format!(
                    "Unknown plugin '{}'. Available plugins: {}",
                    name,
                    self.names().join(", ")
                ),
            })?;

            if selected.get(adapter.name()).is_none() {
                selected.register(Arc::clone(adapter));
            }
        }

        Ok(selected)
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.names())
            .finish()
    }
}
