//! Example Kustomize generator plugin
//!
//! Turns a `MyPlugin` resource into a `ConfigMap`:
//!
//! ```yaml
//! apiVersion: example.com/v1beta1
//! kind: MyPlugin
//! metadata:
//!   name: example-configmap-test
//! data:
//!   username: whatever
//! ```
//!
//! `metadata` is copied verbatim and `data.username` becomes the only entry
//! of the ConfigMap's `data`.

use async_trait::async_trait;
use kustomize_exec_plugin::{GenerationContext, Generator};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use tracing::debug;

/// Plugin input, decoded from the resource Kustomize hands over
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MyPlugin {
    /// Passed through to the output untouched
    pub metadata: Value,

    #[serde(deserialize_with = "null_as_default")]
    pub data: PluginData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PluginData {
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
}

/// Decode an explicit null (`~`, `null` or an empty value) as the default,
/// the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Generated manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    pub kind: String,
    pub api_version: String,
    pub metadata: Value,
    pub data: ConfigMapData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMapData {
    pub username: String,
}

impl ConfigMap {
    pub const KIND: &'static str = "ConfigMap";
    pub const API_VERSION: &'static str = "v1";

    /// Create a ConfigMap with the given metadata and username
    pub fn new(metadata: Value, username: impl Into<String>) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            api_version: Self::API_VERSION.to_string(),
            metadata,
            data: ConfigMapData {
                username: username.into(),
            },
        }
    }
}

#[async_trait]
impl Generator for MyPlugin {
    type Output = ConfigMap;

    async fn generate(&self, _context: &GenerationContext) -> anyhow::Result<ConfigMap> {
        debug!(username = %self.data.username, "generating ConfigMap");
        Ok(ConfigMap::new(self.metadata.clone(), self.data.username.clone()))
    }
}
