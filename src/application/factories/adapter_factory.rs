use crate::adapters::outbound::ecosystems::{
    BundlerAdapter, CargoAdapter, ComposerAdapter, GoAdapter, MavenAdapter, NpmAdapter,
    NuGetAdapter, PipAdapter, PoetryAdapter, ToolRunner, UvAdapter, YarnAdapter,
};
use crate::application::detection::AdapterRegistry;
use std::sync::Arc;
use std::time::Duration;

/// Factory for the built-in adapter registry
///
/// Registration order is the default detection and document order. Within
/// an ecosystem the lockfile-backed adapters come before the manifest-only
/// ones (uv and poetry before pip).
pub struct AdapterFactory;

impl AdapterFactory {
    /// Creates a registry holding every built-in adapter
    ///
    /// # Examples
    /// ```
    /// use spdx_sbom_generator::application::factories::AdapterFactory;
    /// use std::time::Duration;
    ///
    /// let registry = AdapterFactory::default_registry(Duration::from_secs(30));
    /// assert_eq!(registry.names()[0], "npm");
    /// ```
    pub fn default_registry(timeout: Duration) -> AdapterRegistry {
        let runner = ToolRunner::new(timeout);
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(NpmAdapter::new(runner)));
        registry.register(Arc::new(YarnAdapter::new(runner)));
        registry.register(Arc::new(CargoAdapter::new(runner)));
        registry.register(Arc::new(GoAdapter::new(runner)));
        registry.register(Arc::new(UvAdapter::new(runner)));
        registry.register(Arc::new(PoetryAdapter::new(runner)));
        registry.register(Arc::new(PipAdapter::new(runner)));
        registry.register(Arc::new(ComposerAdapter::new(runner)));
        registry.register(Arc::new(MavenAdapter::new(runner)));
        registry.register(Arc::new(NuGetAdapter::new(runner)));
        registry.register(Arc::new(BundlerAdapter::new(runner)));
        registry
    }

    /// Names of the built-in adapters, in registration order
    pub fn adapter_names() -> Vec<&'static str> {
        vec![
            NpmAdapter::NAME,
            YarnAdapter::NAME,
            CargoAdapter::NAME,
            GoAdapter::NAME,
            UvAdapter::NAME,
            PoetryAdapter::NAME,
            PipAdapter::NAME,
            ComposerAdapter::NAME,
            MavenAdapter::NAME,
            NuGetAdapter::NAME,
            BundlerAdapter::NAME,
        ]
    }
}
