//! Common runtime for Kustomize exec generator plugins
//!
//! An exec plugin is a standalone binary that Kustomize runs with the path
//! of a temporary file holding the plugin's resource YAML. The plugin writes
//! the generated manifest to stdout and signals failure through its exit
//! status. This crate owns all of that plumbing; a plugin only implements
//! [`Generator`] for its input type and calls [`generator_main`].

pub mod config;
pub mod error;
pub mod generator;
pub mod runner;

pub use config::{LogConfig, RuntimeConfig};
pub use error::{PluginError, PluginResult};
pub use generator::{run_generator, GenerationContext, Generator};
pub use runner::{generator_main, run_file, run_with_args};
