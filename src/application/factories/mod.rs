mod adapter_factory;
mod formatter_factory;

pub use adapter_factory::AdapterFactory;
pub use formatter_factory::FormatterFactory;
