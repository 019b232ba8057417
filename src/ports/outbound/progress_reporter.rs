/// ProgressReporter port for reporting progress during generation
///
/// This port abstracts user-facing progress output (e.g., to stderr),
/// kept separate from diagnostic logging.
pub trait ProgressReporter: Send + Sync {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports progress with a count
    ///
    /// # Arguments
    /// * `current` - Current progress value
    /// * `total` - Total expected value
    /// * `message` - Optional message to include
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports an error or warning message
    fn report_error(&self, message: &str);

    /// Reports completion of an operation
    fn report_completion(&self, message: &str);
}
