//! Error types for exec generator plugins

use std::path::PathBuf;

/// Exit status for a successful run
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status for I/O, decode, generate and encode failures
pub const EXIT_FAILURE: u8 = 1;

/// Exit status for a malformed command line
pub const EXIT_USAGE: u8 = 2;

/// Everything that can stop a plugin invocation
#[derive(thiserror::Error, Debug)]
pub enum PluginError {
    /// The command line did not name exactly one input file
    #[error("{0}")]
    Usage(String),

    #[error("open input: {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    Decode(#[source] serde_yaml::Error),

    #[error("invalid input: no YAML document found")]
    EmptyInput,

    #[error("invalid input: {0}")]
    Read(#[source] std::io::Error),

    /// Returned by the generator itself, passed through untouched
    #[error(transparent)]
    Generate(anyhow::Error),

    #[error("encode: {0}")]
    Encode(#[source] serde_yaml::Error),

    #[error("write output: {0}")]
    Write(#[source] std::io::Error),
}

impl PluginError {
    /// Build the usage error reported for a wrong argument count
    pub fn argument_count(got: usize) -> Self {
        Self::Usage(format!("expecting exactly one argument, got {got}"))
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }

    /// Whether the error was raised while running the generator pipeline,
    /// as opposed to while setting it up
    pub fn is_generation_failure(&self) -> bool {
        !matches!(self, Self::Usage(_) | Self::Open { .. })
    }
}

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;
