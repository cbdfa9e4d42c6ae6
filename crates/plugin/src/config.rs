//! Runtime configuration read from the process environment

use std::path::PathBuf;

use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Directory of the kustomization that declared the plugin
pub const CONFIG_ROOT_ENV: &str = "KUSTOMIZE_PLUGIN_CONFIG_ROOT";

/// Raw resource YAML handed to the plugin by Kustomize
pub const CONFIG_STRING_ENV: &str = "KUSTOMIZE_PLUGIN_CONFIG_STRING";

/// Turns timestamps back on in diagnostic output
pub const LOG_TIMESTAMPS_ENV: &str = "PLUGIN_LOG_TIMESTAMPS";

/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Target of the failure diagnostic, enabled at error level whatever the
/// filter says
pub const DIAGNOSTIC_TARGET: &str = "kustomize_exec_plugin::diagnostic";

/// Settings collected once at process start
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Logging configuration
    pub log: LogConfig,

    /// Value of `KUSTOMIZE_PLUGIN_CONFIG_ROOT`
    pub config_root: Option<PathBuf>,

    /// Value of `KUSTOMIZE_PLUGIN_CONFIG_STRING`
    pub config_string: Option<String>,
}

impl RuntimeConfig {
    /// Build the configuration from the current process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let mut log = LogConfig::default();
        if let Some(filter) = non_empty(EnvFilter::DEFAULT_ENV) {
            log.filter = filter;
        }
        if let Some(flag) = non_empty(LOG_TIMESTAMPS_ENV) {
            log.timestamps = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        Self {
            log,
            config_root: non_empty(CONFIG_ROOT_ENV).map(PathBuf::from),
            config_string: non_empty(CONFIG_STRING_ENV),
        }
    }
}

/// Diagnostic output settings
///
/// The defaults produce bare message lines on stderr: no timestamp, level,
/// target or colors. A successful run logs nothing at the default filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives
    pub filter: String,

    /// Prefix each line with a timestamp
    pub timestamps: bool,

    /// Prefix each line with its level
    pub level: bool,

    /// Prefix each line with its target module
    pub target: bool,

    /// Emit ANSI colors
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            timestamps: false,
            level: false,
            target: false,
            ansi: false,
        }
    }
}

impl LogConfig {
    /// Install a stderr subscriber for this configuration.
    ///
    /// Returns `false` if a global subscriber was already installed.
    pub fn init(&self) -> bool {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_writer(std::io::stderr)
            .with_level(self.level)
            .with_target(self.target)
            .with_ansi(self.ansi);

        if self.timestamps {
            builder.try_init().is_ok()
        } else {
            builder.without_time().try_init().is_ok()
        }
    }

    /// Build the event filter.
    ///
    /// An invalid `filter` falls back to the default. The diagnostic target
    /// is always enabled at error level, so a `RUST_LOG` meant for another
    /// tool cannot hide why the plugin failed.
    pub fn env_filter(&self) -> EnvFilter {
        let filter = EnvFilter::try_new(&self.filter)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
        match format!("{DIAGNOSTIC_TARGET}=error").parse::<Directive>() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    }
}
