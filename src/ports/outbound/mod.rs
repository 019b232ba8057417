/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (package managers, file system, console).
pub mod document_sink;
pub mod ecosystem_adapter;
pub mod formatter;
pub mod license_repository;
pub mod progress_reporter;

pub use document_sink::DocumentSink;
pub use ecosystem_adapter::EcosystemAdapter;
pub use formatter::SbomFormatter;
pub use license_repository::LicenseRepository;
pub use progress_reporter::ProgressReporter;
