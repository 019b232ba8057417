use crate::sbom_generation::domain::{Ecosystem, Module};
use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;

/// EcosystemAdapter port: dependency extraction for one package manager
///
/// One implementation exists per package manager. Adapters are registered
/// into a caller-constructed registry and may run concurrently, so
/// implementations must be `Send + Sync`.
///
/// Errors returned from the extraction methods are expected to be
/// [`SbomError`](crate::shared::error::SbomError) variants scoped to the
/// adapter (`NotFound`, `AdapterExecution`, `ManifestParse`, ...). The
/// generation use case turns them into warnings instead of failing the run.
#[async_trait]
pub trait EcosystemAdapter: Send + Sync {
    /// Stable adapter name used for plugin selection and diagnostics
    fn name(&self) -> &'static str;

    /// Ecosystem tag of the modules this adapter produces.
    ///
    /// A subgraph with a module from another ecosystem is rejected.
    fn ecosystem(&self) -> Ecosystem;

    /// One-time setup with the optional auxiliary settings path.
    ///
    /// Most adapters ignore it.
    fn initialize(&self, _auxiliary_settings: Option<&Path>) -> Result<()> {
        Ok(())
    }

    /// Whether `dir` holds a project this adapter can handle
    fn is_applicable(&self, dir: &Path) -> Result<bool>;

    /// The project's own module, read from its manifest
    ///
    /// # Errors
    /// `SbomError::NotFound` if the manifest is absent.
    async fn get_root_module(&self, dir: &Path) -> Result<Module>;

    /// Every module visible from lock or manifest data, with dependency keys filled.
    ///
    /// Each call re-reads the inputs.
    async fn list_modules_with_dependencies(&self, dir: &Path) -> Result<Vec<Module>>;

    /// Version of the backing package manager, for diagnostics only
    async fn get_tool_version(&self) -> Result<String>;
}
