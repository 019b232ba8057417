/// Mock implementations for testing
mod mock_adapter;
mod mock_license_repository;
mod mock_progress_reporter;
mod mock_sink;

pub use mock_adapter::MockAdapter;
pub use mock_license_repository::MockLicenseRepository;
pub use mock_progress_reporter::{MockProgressReporter, ReportedEvent};
pub use mock_sink::{CapturedDocument, MemorySink};
