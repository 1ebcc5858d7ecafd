//! Configuration management for webapigen client generation.
//!
//! This module defines the `Config` struct holding the settings of one
//! generation run. A configuration can be created programmatically or loaded
//! from a YAML, TOML or JSON file; command-line flags are layered on top by
//! the CLI.
//!
//! # Examples
//!
//! ```no_run
//! use webapigen_core::config::Config;
//!
//! # async fn example() -> webapigen_core::Result<()> {
//! // Create a new config programmatically
//! let mut config = Config::new("users-client", "contracts/users.yaml", "src/generated");
//! config.include_interfaces = vec!["IUserApi".to_string()];
//!
//! // Or load from a config file
//! let config = Config::from_file("webapigen.toml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::Path;

use crate::synth::SynthOptions;
use crate::templates::TemplateKind;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

/// Configuration for webapigen client generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Project name
    pub project_name: String,

    /// Contract documents (paths or `http(s)://` URLs), merged in order
    pub contract_paths: Vec<String>,

    /// Output directory for generated code
    pub output_dir: String,

    /// Template set to use for code generation
    #[serde(default = "default_template")]
    pub template_kind: String,

    /// Optional path to template directory
    #[serde(default)]
    pub template_dir: Option<String>,

    /// Interfaces to generate; empty means all
    #[serde(default)]
    pub include_interfaces: Vec<String>,

    /// Interfaces to leave out
    #[serde(default)]
    pub exclude_interfaces: Vec<String>,

    /// Base address for interfaces that declare none
    #[serde(default)]
    pub base_url: Option<Url>,

    /// Token manager used by wrap layers that name none
    #[serde(default = "default_token_manage")]
    pub default_token_manage: String,

    /// Extra `use` paths added to every generated unit
    #[serde(default)]
    pub imports: Vec<String>,

    /// Write the runtime support unit
    #[serde(default = "default_true")]
    pub emit_support: bool,

    /// Write the module index
    #[serde(default = "default_true")]
    pub emit_module_index: bool,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(
        project_name: impl Into<String>,
        contract_path: impl Into<String>,
        output_dir: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            contract_paths: vec![contract_path.into()],
            output_dir: output_dir.into(),
            template_kind: default_template(),
            template_dir: None,
            include_interfaces: Vec::new(),
            exclude_interfaces: Vec::new(),
            base_url: None,
            default_token_manage: default_token_manage(),
            imports: Vec::new(),
            emit_support: true,
            emit_module_index: true,
        }
    }

    /// Load configuration from a file; the format follows the extension.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config = match Format::of(path)? {
            Format::Yaml => serde_yaml::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
            Format::Json => serde_json::from_str(&content)?,
        };
        Ok(config)
    }

    /// Save configuration to a file; the format follows the extension.
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let content = match Format::of(path)? {
            Format::Yaml => serde_yaml::to_string(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        };
        fs::write(path, content).await?;
        Ok(())
    }

    /// Parsed template kind
    pub fn template_kind(&self) -> crate::Result<TemplateKind> {
        self.template_kind.parse().map_err(crate::Error::config)
    }

    /// Whether `interface` passes the include and exclude lists
    pub fn selects(&self, interface: &str) -> bool {
        (self.include_interfaces.is_empty() || self.include_interfaces.iter().any(|i| i == interface))
            && !self.exclude_interfaces.iter().any(|i| i == interface)
    }

    pub fn synth_options(&self) -> SynthOptions {
        let token_manage = self.default_token_manage.trim();
        SynthOptions {
            base_url: self
                .base_url
                .as_ref()
                .map(|url| url.as_str().trim_end_matches('/').to_string()),
            default_token_manage: (!token_manage.is_empty()).then(|| token_manage.to_string()),
        }
    }
}

enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    fn of(path: &Path) -> crate::Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(crate::Error::config(format!(
                "Unsupported configuration file '{}': expected .yaml, .yml, .toml or .json",
                path.display()
            ))),
        }
    }
}

fn default_template() -> String {
    TemplateKind::default().as_str().to_string()
}

fn default_token_manage() -> String {
    crate::synth::wrap::DEFAULT_TOKEN_MANAGE.to_string()
}

fn default_true() -> bool {
    true
}
