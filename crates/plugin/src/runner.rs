//! Command-line driver shared by exec generator plugins

use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::config::{RuntimeConfig, DIAGNOSTIC_TARGET};
use crate::error::{PluginError, PluginResult};
use crate::generator::{run_generator, GenerationContext, Generator};

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Generate from the given input file
    Generate(PathBuf),

    /// Help or version text was requested and has been rendered
    Info(String),
}

/// Build the command-line definition
pub fn command() -> Command {
    Command::new("exec-plugin")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Kustomize exec generator plugin")
        .arg(
            Arg::new("input")
                .help("Resource file written by Kustomize")
                .value_name("INPUT")
                .value_parser(clap::value_parser!(PathBuf))
                .num_args(0..)
                .action(ArgAction::Append),
        )
}

/// Parse command-line arguments, including the program name
pub fn parse_args<I, T>(args: I) -> PluginResult<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    Ok(Invocation::Info(err.render().to_string()))
                }
                _ => Err(PluginError::Usage(err.render().to_string().trim_end().to_string())),
            }
        }
    };

    let mut inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("input")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    match inputs.len() {
        1 => Ok(Invocation::Generate(inputs.remove(0))),
        n => Err(PluginError::argument_count(n)),
    }
}

/// Open `path` and run generator `G` on it, writing to `output`.
///
/// The file is closed before this returns, whatever the outcome.
pub async fn run_file<G, W>(path: &Path, output: &mut W, context: &GenerationContext) -> PluginResult<()>
where
    G: Generator + DeserializeOwned,
    W: Write + ?Sized,
{
    let file = File::open(path).map_err(|source| PluginError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "opened input");

    run_generator::<G, _, _>(output, file, context).await
}

/// Run a complete invocation against explicit arguments and output
pub async fn run_with_args<G, I, T, W>(
    args: I,
    config: &RuntimeConfig,
    output: &mut W,
) -> PluginResult<()>
where
    G: Generator + DeserializeOwned,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write + ?Sized,
{
    match parse_args(args)? {
        Invocation::Info(text) => output
            .write_all(text.as_bytes())
            .map_err(PluginError::Write),
        Invocation::Generate(path) => {
            let context = GenerationContext::from_config(config).with_source(&path);
            run_file::<G, _>(&path, output, &context).await
        }
    }
}

/// Entry point for a generator plugin binary.
///
/// Reads the configuration from the environment, installs logging, runs
/// generator `G` on the file named by the single command-line argument and
/// writes the manifest to stdout. Failures are logged once to stderr and
/// mapped to the process exit status.
pub async fn generator_main<G>() -> ExitCode
where
    G: Generator + DeserializeOwned,
{
    let config = RuntimeConfig::from_env();
    config.log.init();

    let mut stdout = std::io::stdout().lock();
    match run_with_args::<G, _, _, _>(std::env::args_os(), &config, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

/// Log `err` the way the driver reports it
fn report(err: &PluginError) {
    if err.is_generation_failure() {
        error!(target: DIAGNOSTIC_TARGET, "generate: {err}");
    } else {
        error!(target: DIAGNOSTIC_TARGET, "{err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EXIT_FAILURE, EXIT_USAGE};
    use async_trait::async_trait;
    use rstest::rstest;
    use serde::Deserialize;
    use tempfile::NamedTempFile;

    #[derive(Debug, Deserialize)]
    struct Greeting {
        #[serde(default)]
        name: String,
    }

    #[async_trait]
    impl Generator for Greeting {
        type Output = String;

        async fn generate(&self, _context: &GenerationContext) -> anyhow::Result<String> {
            Ok(format!("hello {}", self.name))
        }
    }

    #[rstest]
    #[case(vec![], 0)]
    #[case(vec!["a.yaml", "b.yaml"], 2)]
    #[case(vec!["a.yaml", "b.yaml", "c.yaml"], 3)]
    fn test_wrong_argument_count(#[case] args: Vec<&str>, #[case] got: usize) {
        let argv = std::iter::once("MyPlugin").chain(args);
        let err = parse_args(argv).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
        assert_eq!(
            err.to_string(),
            format!("expecting exactly one argument, got {got}")
        );
    }

    #[test]
    fn test_single_argument() {
        let invocation = parse_args(["MyPlugin", "/tmp/input.yaml"]).unwrap();
        assert_eq!(invocation, Invocation::Generate(PathBuf::from("/tmp/input.yaml")));
    }

    #[test]
    fn test_unknown_flag_is_a_usage_error() {
        let err = parse_args(["MyPlugin", "--bogus", "in.yaml"]).unwrap_err();
        assert!(matches!(err, PluginError::Usage(_)));
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn test_help_is_not_an_error() {
        match parse_args(["MyPlugin", "--help"]).unwrap() {
            Invocation::Info(text) => assert!(text.contains("INPUT")),
            other => panic!("unexpected invocation: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_file() {
        let mut input = NamedTempFile::new().unwrap();
        writeln!(input, "name: world").unwrap();

        let mut out = Vec::new();
        run_file::<Greeting, _>(input.path(), &mut out, &GenerationContext::default())
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hello world\n");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");

        let mut out = Vec::new();
        let err = run_file::<Greeting, _>(&path, &mut out, &GenerationContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::Open { .. }));
        assert!(err.to_string().starts_with("open input: "));
        assert_eq!(err.exit_code(), EXIT_FAILURE);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_with_args() {
        let mut input = NamedTempFile::new().unwrap();
        writeln!(input, "name: args").unwrap();
        let argv = vec![OsString::from("MyPlugin"), input.path().as_os_str().to_owned()];

        let mut out = Vec::new();
        run_with_args::<Greeting, _, _, _>(argv, &RuntimeConfig::default(), &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hello args\n");
    }

    #[tokio::test]
    async fn test_run_with_args_rejects_extra_arguments() {
        let mut out = Vec::new();
        let err = run_with_args::<Greeting, _, _, _>(
            ["MyPlugin", "a.yaml", "b.yaml"],
            &RuntimeConfig::default(),
            &mut out,
        )
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
        assert!(out.is_empty());
    }
}
