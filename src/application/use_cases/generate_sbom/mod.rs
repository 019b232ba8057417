use crate::application::detection::{AdapterRegistry, Detector, ExtractionJob};
use crate::application::dto::{
    AdapterWarning, DocumentPolicy, GeneratedDocument, SbomRequest, SbomResponse,
};
use crate::application::factories::FormatterFactory;
use crate::ports::inbound::{CancelSignal, SbomGenerationPort};
use crate::ports::outbound::{DocumentSink, EcosystemAdapter, LicenseRepository, ProgressReporter};
use crate::sbom_generation::domain::{DependencyGraph, SbomMetadata};
use crate::sbom_generation::services::{
    sanitize, AssemblyOptions, DocumentAssembler, GraphBuilder, SbomGenerator, Subgraph,
};
use crate::shared::error::SbomError;
use crate::shared::security::validate_project_dir;
use crate::shared::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// A serialized document waiting for the sink
struct RenderedDocument {
    summary: GeneratedDocument,
    content: String,
}

const TOOL_VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one extraction job
type JobOutcome = (usize, Result<Subgraph>);

/// GenerateSbomUseCase - Core use case for SBOM generation
///
/// Orchestrates detection, concurrent extraction, graph merge, document
/// assembly and serialization. Infrastructure is injected: the adapter
/// registry, a license text repository and a progress reporter.
///
/// # Type Parameters
/// * `LREPO` - LicenseRepository implementation
/// * `PR` - ProgressReporter implementation
pub struct GenerateSbomUseCase<LREPO, PR> {
    registry: AdapterRegistry,
    license_repository: LREPO,
    progress_reporter: PR,
}

impl<LREPO, PR> GenerateSbomUseCase<LREPO, PR>
where
    LREPO: LicenseRepository,
    PR: ProgressReporter,
{
    /// Creates a new GenerateSbomUseCase with injected dependencies
    pub fn new(registry: AdapterRegistry, license_repository: LREPO, progress_reporter: PR) -> Self {
        Self {
            registry,
            license_repository,
            progress_reporter,
        }
    }

    /// Executes the use case and writes the documents to `sink`
    ///
    /// # Returns
    /// SbomResponse describing the written documents and any adapter warnings
    ///
    /// # Errors
    /// Detection, schema, configuration and write errors, or
    /// `NoAdapterSucceeded` when every extraction job failed.
    pub async fn execute(
        &self,
        request: SbomRequest,
        sink: &mut dyn DocumentSink,
    ) -> Result<SbomResponse> {
        self.execute_cancellable(request, sink, std::future::pending::<()>())
            .await
    }

    /// Like [`execute`](Self::execute), but aborts when `cancel` resolves.
    ///
    /// On cancellation every in-flight extraction task is dropped, which
    /// kills any package-manager child process, and the sink is never touched.
    pub async fn execute_cancellable<C>(
        &self,
        request: SbomRequest,
        sink: &mut dyn DocumentSink,
        cancel: C,
    ) -> Result<SbomResponse>
    where
        C: Future<Output = ()>,
    {
        let (documents, warnings) = tokio::select! {
            biased;
            _ = cancel => {
                tracing::warn!("Generation cancelled");
                return Err(SbomError::Cancelled.into());
            }
            rendered = self.render_documents(&request) => rendered?,
        };

        let mut summaries = Vec::with_capacity(documents.len());
        let extension = FormatterFactory::create(request.format).file_extension();
        for document in documents {
            sink.write_document(&document.summary.slug, extension, document.content.as_bytes())?;
            summaries.push(document.summary);
        }

        let response = SbomResponse::new(summaries, warnings);
        self.report_summary(&response);
        Ok(response)
    }

    /// Runs everything up to and including serialization; no sink access.
    async fn render_documents(
        &self,
        request: &SbomRequest,
    ) -> Result<(Vec<RenderedDocument>, Vec<AdapterWarning>)> {
        validate_project_dir(&request.project_path)?;
        let registry = self.registry.select(&request.plugins)?;

        self.progress_reporter.report(&format!(
            "🔎 Detecting projects in: {}",
            request.project_path.display()
        ));
        let jobs = Detector::new(request.max_depth).detect(&registry, &request.project_path)?;
        self.progress_reporter
            .report(&format!("✅ Detected {} project(s)", jobs.len()));

        let attempted = jobs.len();
        let (subgraphs, warnings) = self.run_jobs(jobs, request).await;
        if subgraphs.is_empty() {
            return Err(SbomError::NoAdapterSucceeded { attempted }.into());
        }

        let graph = GraphBuilder::build(subgraphs)?;
        tracing::info!(
            modules = graph.total_module_count(),
            edges = graph.edge_count(),
            placeholders = graph.placeholder_count(),
            roots = graph.roots().len(),
            "Dependency graph built"
        );

        let metadata = SbomGenerator::generate_default_metadata();
        let documents = self.render(&graph, request, metadata)?;
        Ok((documents, warnings))
    }

    /// Runs every extraction job concurrently, one task per job.
    ///
    /// Results are returned in job order regardless of completion order.
    async fn run_jobs(
        &self,
        jobs: Vec<ExtractionJob>,
        request: &SbomRequest,
    ) -> (Vec<Subgraph>, Vec<AdapterWarning>) {
        let total = jobs.len();
        let mut warnings: Vec<(usize, AdapterWarning)> = Vec::new();
        let mut initialized: HashMap<&'static str, Option<String>> = HashMap::new();
        let mut job_info: HashMap<usize, (String, PathBuf)> = HashMap::new();
        let mut task_index: HashMap<tokio::task::Id, usize> = HashMap::new();
        let mut join_set: JoinSet<JobOutcome> = JoinSet::new();

        for job in jobs {
            job_info.insert(
                job.index,
                (job.adapter.name().to_string(), job.directory.clone()),
            );

            let init_error = initialized
                .entry(job.adapter.name())
                .or_insert_with(|| {
                    job.adapter
                        .initialize(request.auxiliary_settings.as_deref())
                        .err()
                        .map(|e| e.to_string())
                })
                .clone();
            if let Some(message) = init_error {
                warnings.push((
                    job.index,
                    AdapterWarning {
                        adapter: job.adapter.name().to_string(),
                        directory: job.directory,
                        message,
                    },
                ));
                continue;
            }

            let timeout = request.adapter_timeout;
            let handle = join_set.spawn(async move {
                let outcome =
                    extract_with_timeout(Arc::clone(&job.adapter), &job.directory, timeout).await;
                if outcome.is_ok() && tracing::enabled!(tracing::Level::DEBUG) {
                    log_tool_version(job.adapter.as_ref()).await;
                }
                (job.index, outcome)
            });
            task_index.insert(handle.id(), job.index);
        }

        let mut completed = 0;
        let mut successes: Vec<(usize, Subgraph)> = Vec::new();
        while let Some(joined) = join_set.join_next_with_id().await {
            completed += 1;
            let (index, outcome) = match joined {
                Ok((_, (index, outcome))) => (index, outcome),
                Err(join_error) => {
                    let index = task_index.get(&join_error.id()).copied().unwrap_or(usize::MAX);
                    (index, Err(anyhow::anyhow!("extraction task failed: {}", join_error)))
                }
            };

            match outcome {
                Ok(subgraph) => {
                    self.progress_reporter.report_progress(
                        completed,
                        total,
                        Some(&format!("{} finished", subgraph.adapter)),
                    );
                    successes.push((index, subgraph));
                }
                Err(e) => {
                    let (adapter, directory) = job_info
                        .get(&index)
                        .cloned()
                        .unwrap_or_else(|| ("unknown".to_string(), PathBuf::new()));
                    tracing::warn!(
                        adapter = %adapter,
                        directory = %directory.display(),
                        error = %e,
                        "Extraction failed"
                    );
                    self.progress_reporter.report_progress(
                        completed,
                        total,
                        Some(&format!("{} failed", adapter)),
                    );
                    warnings.push((
                        index,
                        AdapterWarning {
                            adapter,
                            directory,
                            message: e.to_string(),
                        },
                    ));
                }
            }
        }

        successes.sort_by_key(|(index, _)| *index);
        warnings.sort_by_key(|(index, _)| *index);

        for (_, warning) in &warnings {
            self.progress_reporter
                .report_error(&format!("⚠️  Warning: {}", warning));
        }

        (
            successes.into_iter().map(|(_, s)| s).collect(),
            warnings.into_iter().map(|(_, w)| w).collect(),
        )
    }

    /// Assembles and serializes one document per the document policy
    fn render(
        &self,
        graph: &DependencyGraph,
        request: &SbomRequest,
        metadata: SbomMetadata,
    ) -> Result<Vec<RenderedDocument>> {
        let formatter = FormatterFactory::create(request.format);
        self.progress_reporter
            .report(FormatterFactory::progress_message(request.format));

        let options = AssemblyOptions {
            schema: request.schema,
            include_license_text: request.include_license_text,
        };

        let graphs: Vec<(Option<String>, DependencyGraph)> = match request.document_policy {
            DocumentPolicy::Merged => vec![(None, graph.clone())],
            DocumentPolicy::PerEcosystem => graph
                .ecosystems()
                .into_iter()
                .map(|eco| (Some(eco.to_string()), graph.subgraph_for(eco)))
                .collect(),
        };

        graphs
            .into_iter()
            .map(|(suffix, graph)| {
                let document = DocumentAssembler::assemble(
                    &graph,
                    options,
                    metadata.clone(),
                    |id: &str| self.license_repository.license_text(id),
                );
                let slug = match suffix {
                    Some(suffix) => format!("{}-{}", sanitize(&document.name), suffix),
                    None => sanitize(&document.name),
                };
                let content = formatter.format(&document)?;

                Ok(RenderedDocument {
                    summary: GeneratedDocument {
                        slug,
                        name: document.name.clone(),
                        package_count: document.packages.len(),
                        relationship_count: document.relationships.len(),
                    },
                    content,
                })
            })
            .collect()
    }

    fn report_summary(&self, response: &SbomResponse) {
        let message = if response.has_warnings() {
            format!(
                "✅ Wrote {} document(s) with {} package(s); {} project(s) skipped with warnings",
                response.documents.len(),
                response.total_packages(),
                response.warnings.len()
            )
        } else {
            format!(
                "✅ Wrote {} document(s) with {} package(s)",
                response.documents.len(),
                response.total_packages()
            )
        };
        self.progress_reporter.report_completion(&message);
    }
}

#[async_trait]
impl<LREPO, PR> SbomGenerationPort for GenerateSbomUseCase<LREPO, PR>
where
    LREPO: LicenseRepository,
    PR: ProgressReporter,
{
    async fn create_sbom(
        &self,
        request: SbomRequest,
        sink: &mut dyn DocumentSink,
    ) -> Result<SbomResponse> {
        self.execute(request, sink).await
    }

    async fn create_sbom_cancellable(
        &self,
        request: SbomRequest,
        sink: &mut dyn DocumentSink,
        cancel: CancelSignal,
    ) -> Result<SbomResponse> {
        self.execute_cancellable(request, sink, cancel).await
    }
}

/// Extracts one subgraph, bounded by `timeout`.
async fn extract_with_timeout(
    adapter: Arc<dyn EcosystemAdapter>,
    directory: &Path,
    timeout: Duration,
) -> Result<Subgraph> {
    let name = adapter.name();
    match tokio::time::timeout(timeout, extract(adapter, directory)).await {
        Ok(result) => result,
        Err(_) => Err(SbomError::AdapterExecution {
            adapter: name.to_string(),
            details: format!("timed out after {:?}", timeout),
        }
        .into()),
    }
}

async fn extract(adapter: Arc<dyn EcosystemAdapter>, directory: &Path) -> Result<Subgraph> {
    let root = adapter.get_root_module(directory).await?;
    let modules = adapter.list_modules_with_dependencies(directory).await?;

    let ecosystem = adapter.ecosystem();
    if let Some(foreign) = std::iter::once(&root)
        .chain(modules.iter())
        .find(|m| m.ecosystem != ecosystem)
    {
        return Err(SbomError::AdapterExecution {
            adapter: adapter.name().to_string(),
            details: format!(
                "reported module {} outside its ecosystem {}",
                foreign.key(),
                ecosystem
            ),
        }
        .into());
    }

    tracing::info!(
        adapter = adapter.name(),
        root = %root.key(),
        modules = modules.len(),
        "Extracted modules"
    );

    Ok(Subgraph::new(adapter.name(), root, modules))
}

/// Logs the package manager version once extraction is done.
///
/// Runs outside the extraction timeout with its own bound.
async fn log_tool_version(adapter: &dyn EcosystemAdapter) {
    match tokio::time::timeout(TOOL_VERSION_TIMEOUT, adapter.get_tool_version()).await {
        Ok(Ok(version)) => tracing::debug!(adapter = adapter.name(), version = %version, "Tool version"),
        Ok(Err(e)) => tracing::debug!(adapter = adapter.name(), error = %e, "Tool version unavailable"),
        Err(_) => tracing::debug!(adapter = adapter.name(), "Tool version query timed out"),
    }
}
