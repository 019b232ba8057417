use spdx_sbom_generator::adapters::outbound::console::StderrProgressReporter;
use spdx_sbom_generator::adapters::outbound::filesystem::{FileSystemSink, WriterSink};
use spdx_sbom_generator::adapters::outbound::licenses::{
    CachingLicenseRepository, SpdxLicenseRepository,
};
use spdx_sbom_generator::application::factories::AdapterFactory;
use spdx_sbom_generator::application::use_cases::GenerateSbomUseCase;
use spdx_sbom_generator::cli::Args;
use spdx_sbom_generator::config::{build_request, discover_config, load_config_from_path};
use spdx_sbom_generator::shared::error::ExitCode;
use spdx_sbom_generator::shared::logging::{init_logging, LoggingConfig};
use spdx_sbom_generator::shared::Result;
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();
    init_logging(LoggingConfig::from_env());

    let code = match run(args).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            for cause in e.chain().skip(1) {
                eprintln!("\nCaused by: {}", cause);
            }

            eprintln!();
            ExitCode::Failure
        }
    };
    process::exit(code.as_i32());
}

async fn run(args: Args) -> Result<()> {
    let scan_root = args.path.as_deref().unwrap_or(Path::new("."));
    let config = match &args.config {
        Some(path) => Some(load_config_from_path(path)?),
        None => discover_config(scan_root)?,
    };
    let request = build_request(&args, config)?;
    tracing::debug!(?request, "Resolved generation request");

    let registry = AdapterFactory::default_registry(request.adapter_timeout);
    let license_repository = CachingLicenseRepository::new(SpdxLicenseRepository::new());
    let use_case =
        GenerateSbomUseCase::new(registry, license_repository, StderrProgressReporter::new());

    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available; never cancel.
            std::future::pending::<()>().await;
        }
        eprintln!("\n🛑 Interrupted, stopping package manager processes...");
    };

    if args.stdout {
        let mut sink = WriterSink::stdout();
        use_case
            .execute_cancellable(request, &mut sink, cancel)
            .await?;
    } else {
        let mut sink = FileSystemSink::new(request.output_dir.clone());
        use_case
            .execute_cancellable(request, &mut sink, cancel)
            .await?;
        for path in sink.written() {
            eprintln!("✅ Output complete: {}", path.display());
        }
    }

    Ok(())
}
