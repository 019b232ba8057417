/// Ecosystem adapters - one per supported package manager
///
/// Static adapters parse manifest and lock files directly. Only the Go
/// adapter runs a tool during extraction: it shells out to the `go`
/// toolchain through [`ToolRunner`] and falls back to `go.mod` when the
/// toolchain is unavailable. Every adapter spawns its tool for
/// `get_tool_version`, which the engine calls only for debug diagnostics
/// after extraction has finished.
mod bundler;
mod cargo;
mod composer;
mod go;
mod manifest;
mod maven;
mod npm;
mod nuget;
mod pip;
mod poetry;
mod python;
mod tool_runner;
mod uv;
mod yarn;

pub use bundler::BundlerAdapter;
pub use cargo::CargoAdapter;
pub use composer::ComposerAdapter;
pub use go::GoAdapter;
pub use maven::MavenAdapter;
pub use npm::NpmAdapter;
pub use nuget::NuGetAdapter;
pub use pip::PipAdapter;
pub use poetry::PoetryAdapter;
pub use tool_runner::ToolRunner;
pub use uv::UvAdapter;
pub use yarn::YarnAdapter;
