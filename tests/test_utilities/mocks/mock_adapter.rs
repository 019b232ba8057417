use spdx_sbom_generator::prelude::*;
use std::path::Path;
use std::time::Duration;

/// Mock EcosystemAdapter applicable wherever its marker file exists
pub struct MockAdapter {
    pub name: &'static str,
    pub ecosystem: Ecosystem,
    pub marker: &'static str,
    pub root: Module,
    pub modules: Vec<Module>,
    pub delay: Option<Duration>,
    pub fail_with: Option<&'static str>,
}

impl MockAdapter {
    pub fn new(name: &'static str, ecosystem: Ecosystem, marker: &'static str, root: Module) -> Self {
        Self {
            name,
            ecosystem,
            marker,
            root,
            modules: Vec::new(),
            delay: None,
            fail_with: None,
        }
    }

    pub fn with_modules(mut self, modules: Vec<Module>) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self, message: &'static str) -> Self {
        self.fail_with = Some(message);
        self
    }
}

#[async_trait::async_trait]
impl EcosystemAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    fn is_applicable(&self, dir: &Path) -> Result<bool> {
        Ok(dir.join(self.marker).exists())
    }

    async fn get_root_module(&self, _dir: &Path) -> Result<Module> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.fail_with {
            return Err(SbomError::AdapterExecution {
                adapter: self.name.to_string(),
                details: message.to_string(),
            }
            .into());
        }
        Ok(self.root.clone())
    }

    async fn list_modules_with_dependencies(&self, _dir: &Path) -> Result<Vec<Module>> {
        let mut modules = vec![self.root.clone()];
        modules.extend(self.modules.iter().cloned());
        Ok(modules)
    }

    async fn get_tool_version(&self) -> Result<String> {
        Ok("mock 1.0".to_string())
    }
}
