use crate::adapters::outbound::formatters::{SpdxJsonFormatter, TagValueFormatter};
use crate::application::dto::OutputFormat;
use crate::ports::outbound::SbomFormatter;

/// Factory for creating SPDX formatters
///
/// Maps the requested output format onto a concrete writer adapter.
pub struct FormatterFactory;

impl FormatterFactory {
    /// Creates a formatter instance for the specified output format
    ///
    /// # Examples
    /// ```
    /// use spdx_sbom_generator::application::dto::OutputFormat;
    /// use spdx_sbom_generator::application::factories::FormatterFactory;
    ///
    /// let formatter = FormatterFactory::create(OutputFormat::Json);
    /// assert_eq!(formatter.file_extension(), "json");
    /// ```
    pub fn create(format: OutputFormat) -> Box<dyn SbomFormatter> {
        match format {
            OutputFormat::Spdx => Box::new(TagValueFormatter::new()),
            OutputFormat::Json => Box::new(SpdxJsonFormatter::new()),
        }
    }

    /// Returns the progress message for the specified output format
    ///
    /// # Examples
    /// ```
    /// use spdx_sbom_generator::application::dto::OutputFormat;
    /// use spdx_sbom_generator::application::factories::FormatterFactory;
    ///
    /// let message = FormatterFactory::progress_message(OutputFormat::Json);
    /// assert_eq!(message, "📝 Generating SPDX JSON output...");
    /// ```
    pub fn progress_message(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Spdx => "📝 Generating SPDX tag-value output...",
            OutputFormat::Json => "📝 Generating SPDX JSON output...",
        }
    }
}
