use spdx_sbom_generator::prelude::*;
use std::sync::{Arc, Mutex};

/// One call recorded by [`MockProgressReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportedEvent {
    Message(String),
    Progress { current: usize, total: usize },
    Error(String),
    Completion(String),
}

/// ProgressReporter that records every call; clones share the log
#[derive(Default, Clone)]
pub struct MockProgressReporter {
    events: Arc<Mutex<Vec<ReportedEvent>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReportedEvent::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Final `(current, total)` progress step, if any job finished
    pub fn last_progress(&self) -> Option<(usize, usize)> {
        self.events().into_iter().rev().find_map(|event| match event {
            ReportedEvent::Progress { current, total } => Some((current, total)),
            _ => None,
        })
    }

    pub fn completion(&self) -> Option<String> {
        self.events().into_iter().find_map(|event| match event {
            ReportedEvent::Completion(message) => Some(message),
            _ => None,
        })
    }

    fn record(&self, event: ReportedEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, message: &str) {
        self.record(ReportedEvent::Message(message.to_string()));
    }

    fn report_progress(&self, current: usize, total: usize, _message: Option<&str>) {
        self.record(ReportedEvent::Progress { current, total });
    }

    fn report_error(&self, message: &str) {
        self.record(ReportedEvent::Error(message.to_string()));
    }

    fn report_completion(&self, message: &str) {
        self.record(ReportedEvent::Completion(message.to_string()));
    }
}
