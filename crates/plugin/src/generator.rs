//! Generator trait and the decode / generate / encode pipeline

use std::io::{Read, Write};
use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::error::{PluginError, PluginResult};

/// A Kustomize generator plugin.
///
/// The implementing type is the plugin's input: it is decoded from the
/// resource YAML Kustomize hands over, then asked to produce the manifest
/// that gets encoded to stdout.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Value encoded as the generated manifest
    type Output: Serialize + Send;

    /// Produce the manifest for this input
    async fn generate(&self, context: &GenerationContext) -> anyhow::Result<Self::Output>;
}

/// Invocation details available to a generator
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    /// Input file the resource was read from
    pub source: Option<PathBuf>,

    /// Directory of the kustomization that declared the plugin
    pub config_root: Option<PathBuf>,

    /// Raw resource YAML as passed through the environment
    pub config_string: Option<String>,
}

impl GenerationContext {
    /// Create a context from runtime configuration
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            source: None,
            config_root: config.config_root.clone(),
            config_string: config.config_string.clone(),
        }
    }

    /// Set the input file
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Run generator `G` with `input` as the resource YAML, writing the encoded
/// manifest to `output`.
///
/// Unknown fields in the input are ignored. The Kustomize resource always
/// carries `apiVersion` and `kind`, which generator inputs rarely model.
///
/// Nothing is written to `output` unless decoding, generation and encoding
/// all succeed.
pub async fn run_generator<G, W, R>(
    output: &mut W,
    input: R,
    context: &GenerationContext,
) -> PluginResult<()>
where
    G: Generator + DeserializeOwned,
    W: Write + ?Sized,
    R: Read,
{
    let plugin: G = decode(input)?;
    debug!("decoded generator input");

    let target = plugin
        .generate(context)
        .await
        .map_err(PluginError::Generate)?;

    let encoded = serde_yaml::to_string(&target).map_err(PluginError::Encode)?;
    output
        .write_all(encoded.as_bytes())
        .and_then(|_| output.flush())
        .map_err(PluginError::Write)?;
    debug!(bytes = encoded.len(), "wrote generated manifest");

    Ok(())
}

/// Decode the first YAML document of `input`
fn decode<T, R>(mut input: R) -> PluginResult<T>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut buf = Vec::new();
    input.read_to_end(&mut buf).map_err(PluginError::Read)?;

    // a stream of only whitespace and comments holds no document
    let document = serde_yaml::Deserializer::from_slice(&buf)
        .next()
        .ok_or(PluginError::EmptyInput)?;
    T::deserialize(document).map_err(PluginError::Decode)
}
