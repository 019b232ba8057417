/// Outbound adapters - Infrastructure implementations of outbound ports
pub mod console;
pub mod ecosystems;
pub mod filesystem;
pub mod formatters;
pub mod licenses;
