/// Adapter registry and project detection
mod detector;
mod registry;

pub use detector::{Detector, ExtractionJob};
pub use registry::AdapterRegistry;

#[cfg(test)]
mod tests;
