use crate::application::dto::{SbomRequest, SbomResponse};
use crate::ports::outbound::DocumentSink;
use crate::shared::Result;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

/// Cancellation signal accepted by [`SbomGenerationPort::create_sbom_cancellable`]
pub type CancelSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// SbomGenerationPort - Inbound port for SBOM generation
///
/// This is the engine's public contract: the command layer hands over the
/// options and a writable sink and gets back a single result.
#[async_trait]
pub trait SbomGenerationPort {
    /// Generates the SBOM document(s) for the project and writes them to `sink`
    ///
    /// # Errors
    /// Returns an error if:
    /// - The project directory does not exist or is invalid
    /// - No adapter applies, or every applicable adapter failed
    /// - The schema version or plugin selection is invalid
    /// - The sink rejects the write
    async fn create_sbom(
        &self,
        request: SbomRequest,
        sink: &mut dyn DocumentSink,
    ) -> Result<SbomResponse>;

    /// Same as [`create_sbom`](Self::create_sbom), aborting with
    /// `SbomError::Cancelled` when `cancel` resolves first.
    async fn create_sbom_cancellable(
        &self,
        request: SbomRequest,
        sink: &mut dyn DocumentSink,
        cancel: CancelSignal,
    ) -> Result<SbomResponse>;
}
