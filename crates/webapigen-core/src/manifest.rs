//! Manifest of a template directory.
//!
//! A template directory may carry a `manifest.yaml` (or `manifest.toml`)
//! describing the template set and the shell commands to run once the
//! generated units are written.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;
use tokio::fs;

/// The root manifest structure for a template set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// The name of the template set
    #[serde(default = "default_name")]
    pub name: String,

    /// A short description of what the template set generates
    #[serde(default)]
    pub description: String,

    /// The version of the template set (should follow semantic versioning)
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional hooks that run before/after generation
    #[serde(default)]
    pub hooks: TemplateHooks,
}

/// Hooks that run at specific points during code generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateHooks {
    /// Commands to run before any unit is written
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub pre_generate: Vec<String>,

    /// Commands to run in the output directory after all units are written
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub post_generate: Vec<String>,
}

fn default_name() -> String {
    String::from("default")
}

fn default_version() -> String {
    String::from("0.1.0")
}

impl Default for TemplateManifest {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: String::from("Embedded templates"),
            version: default_version(),
            hooks: TemplateHooks::default(),
        }
    }
}

impl TemplateManifest {
    /// Load the manifest of a template directory, trying YAML first, then TOML.
    ///
    /// A directory without a manifest gets the default one.
    pub async fn load_from_dir(template_dir: &Path) -> crate::Result<Self> {
        let yaml_path = template_dir.join("manifest.yaml");
        let toml_path = template_dir.join("manifest.toml");

        if yaml_path.exists() {
            let content = fs::read_to_string(&yaml_path).await?;
            log::debug!("Loaded template manifest {}", yaml_path.display());
            return serde_yaml::from_str(&content).map_err(|e| {
                crate::Error::template(format!(
                    "Invalid YAML in template manifest at {}: {}",
                    yaml_path.display(),
                    e
                ))
            });
        }

        if toml_path.exists() {
            let content = fs::read_to_string(&toml_path).await?;
            log::debug!("Loaded template manifest {}", toml_path.display());
            return toml::from_str(&content).map_err(|e| {
                crate::Error::template(format!(
                    "Invalid TOML in template manifest at {}: {}",
                    toml_path.display(),
                    e
                ))
            });
        }

        Ok(Self::default())
    }
}

/// Helper function to deserialize either a single command or a list of commands
fn deserialize_commands<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    // Try to deserialize as a single string or a vector of strings
    let value = SerdeValue::deserialize(deserializer)?;

    match value {
        SerdeValue::String(s) => Ok(vec![s]),
        SerdeValue::Seq(seq) => {
            let mut result = Vec::new();
            for item in seq {
                if let SerdeValue::String(s) = item {
                    result.push(s);
                } else {
                    return Err(serde::de::Error::custom(
                        "Expected string or array of strings",
                    ));
                }
            }
            Ok(result)
        }
        _ => Err(serde::de::Error::custom(
            "Expected string or array of strings",
        )),
    }
}
