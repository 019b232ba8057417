use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::sync::Mutex;

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// This adapter implements the ProgressReporter port, writing progress
/// information to stderr so it doesn't interfere with documents written
/// to stdout. Extraction progress uses an indicatif bar; warnings and the
/// completion line are colored when stderr is a terminal.
pub struct StderrProgressReporter {
    progress_bar: Mutex<Option<ProgressBar>>,
    colored: bool,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            progress_bar: Mutex::new(None),
            colored: std::io::stderr().is_terminal(),
        }
    }

    /// Reporter that never emits ANSI color codes
    pub fn plain() -> Self {
        Self {
            progress_bar: Mutex::new(None),
            colored: false,
        }
    }

    fn get_or_create_progress_bar(&self, total: usize) -> Option<ProgressBar> {
        let mut pb_option = self.progress_bar.lock().ok()?;
        if let Some(pb) = pb_option.as_ref() {
            return Some(pb.clone());
        }

        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) - {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        *pb_option = Some(pb.clone());
        Some(pb)
    }

    fn finish_progress_bar(&self) {
        if let Ok(mut pb_option) = self.progress_bar.lock() {
            if let Some(pb) = pb_option.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        let Some(pb) = self.get_or_create_progress_bar(total) else {
            return;
        };
        pb.set_position(current as u64);
        if let Some(msg) = message {
            pb.set_message(msg.to_string());
        }
        if current >= total {
            self.finish_progress_bar();
        }
    }

    fn report_error(&self, message: &str) {
        self.finish_progress_bar();
        if self.colored {
            eprintln!("{}", message.yellow());
        } else {
            eprintln!("{}", message);
        }
    }

    fn report_completion(&self, message: &str) {
        self.finish_progress_bar();
        eprintln!();
        if self.colored {
            eprintln!("{}", message.green());
        } else {
            eprintln!("{}", message);
        }
    }
}
