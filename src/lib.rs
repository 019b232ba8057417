//! spdx-sbom-generator - multi-ecosystem SPDX SBOM generation
//!
//! This library discovers the projects under a directory, extracts their
//! dependency graphs through one adapter per package manager, merges the
//! results into a single graph and writes SPDX 2.2 or 2.3 documents in
//! tag-value or JSON form.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`sbom_generation`): Modules, the dependency graph, SPDX document model and the graph/document services
//! - **Application Layer** (`application`): Detection, the generation use case, DTOs and factories
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Ecosystem adapters, formatters, sinks, license texts and console output
//! - **Shared** (`shared`): Error taxonomy, logging and file safety checks
//!
//! # Example
//!
//! ```no_run
//! use spdx_sbom_generator::prelude::*;
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! # async fn generate() -> Result<()> {
//! // Create adapters
//! let registry = AdapterFactory::default_registry(Duration::from_secs(120));
//! let license_repository = CachingLicenseRepository::new(SpdxLicenseRepository::new());
//! let progress_reporter = StderrProgressReporter::new();
//!
//! // Create use case
//! let use_case = GenerateSbomUseCase::new(registry, license_repository, progress_reporter);
//!
//! // Execute, writing bom-<project>.json into ./out
//! let request = SbomRequest::new(PathBuf::from(".")).with_format(OutputFormat::Json);
//! let mut sink = FileSystemSink::new(PathBuf::from("out"));
//! let response = use_case.execute(request, &mut sink).await?;
//! println!("{} package(s)", response.total_packages());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod ports;
pub mod sbom_generation;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{FileSystemSink, WriterSink};
    pub use crate::adapters::outbound::formatters::{SpdxJsonFormatter, TagValueFormatter};
    pub use crate::adapters::outbound::licenses::{
        CachingLicenseRepository, SpdxLicenseRepository,
    };
    pub use crate::application::detection::{AdapterRegistry, Detector};
    pub use crate::application::dto::{
        AdapterWarning, DocumentPolicy, OutputFormat, SbomRequest, SbomResponse,
    };
    pub use crate::application::factories::{AdapterFactory, FormatterFactory};
    pub use crate::application::use_cases::GenerateSbomUseCase;
    pub use crate::ports::inbound::SbomGenerationPort;
    pub use crate::ports::outbound::{
        DocumentSink, EcosystemAdapter, LicenseRepository, ProgressReporter, SbomFormatter,
    };
    pub use crate::sbom_generation::domain::{
        DependencyGraph, Ecosystem, Module, ModuleKey, SchemaVersion, SpdxDocument,
    };
    pub use crate::sbom_generation::services::{DocumentAssembler, GraphBuilder};
    pub use crate::shared::error::SbomError;
    pub use crate::shared::Result;
}
