//! Contract document loading.
//!
//! Contract documents are YAML or JSON files (or URLs) declaring the
//! interfaces to synthesize. Several documents merge into one
//! [`DeclarationSet`], which the analyzer reads to resolve ancestors and enums.
//!
//! # Examples
//!
//! ```no_run
//! use webapigen_core::declarations::ContractSource;
//! use webapigen_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let source = ContractSource::from_file_or_url("contracts/users.yaml").await?;
//! for interface in &source.document.interfaces {
//!     println!("{} declares {} methods", interface.name, interface.methods.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod annotation;
pub mod types;

// Internal imports (std, crate)
use std::collections::HashMap;
use std::path::Path;

use crate::diagnostics::{self, Diagnostic, DiagnosticSink, Location};

pub use annotation::Annotation;
pub use types::*;

// External imports (alphabetized)
use tokio::fs;

/// A parsed contract document together with where it came from.
#[derive(Debug, Clone)]
pub struct ContractSource {
    /// File path or URL of the document
    pub location: String,
    pub document: ContractDocument,
}

impl ContractSource {
    /// Load a contract document from a file or URL (supports both YAML and JSON)
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> crate::Result<Self> {
        let location = location.as_ref();

        if location.starts_with("http://") || location.starts_with("https://") {
            return Self::from_url(location).await;
        }

        Self::from_file(location).await
    }

    /// Load a contract document from a file (supports both YAML and JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse_content(&content, &path.display().to_string())
    }

    /// Load a contract document from a URL (supports both YAML and JSON)
    pub async fn from_url(url: &str) -> crate::Result<Self> {
        let response = reqwest::get(url).await.map_err(|e| {
            crate::Error::contract(format!("Failed to fetch contracts from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(crate::Error::contract(format!(
                "Failed to fetch contracts from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await?;
        Self::parse_content(&content, url)
    }

    /// Parse content as either JSON or YAML
    pub fn parse_content(content: &str, location: &str) -> crate::Result<Self> {
        let document = match serde_json::from_str::<ContractDocument>(content) {
            Ok(document) => document,
            Err(_) => serde_yaml::from_str(content).map_err(|e| {
                crate::Error::contract(format!(
                    "{} is neither a valid JSON nor YAML contract document: {}",
                    location, e
                ))
            })?,
        };

        let mut document = document;
        for interface in &mut document.interfaces {
            interface.source = location.to_string();
        }

        Ok(Self {
            location: location.to_string(),
            document,
        })
    }
}

/// All declarations of one run, indexed by name.
#[derive(Debug, Default)]
pub struct DeclarationSet {
    interfaces: Vec<InterfaceDecl>,
    index: HashMap<String, usize>,
    enums: HashMap<String, EnumDecl>,
}

impl DeclarationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and merge every location, in order.
    pub async fn load<S: AsRef<str>>(
        locations: &[S],
        sink: &dyn DiagnosticSink,
    ) -> crate::Result<Self> {
        let mut set = Self::new();
        for location in locations {
            let source = ContractSource::from_file_or_url(location.as_ref()).await?;
            log::debug!(
                "Loaded {} interfaces from {}",
                source.document.interfaces.len(),
                source.location
            );
            set.add_source(source, sink);
        }
        Ok(set)
    }

    /// Merge one document. A name declared twice keeps its first declaration.
    pub fn add_source(&mut self, source: ContractSource, sink: &dyn DiagnosticSink) {
        for decl in source.document.enums {
            if self.enums.contains_key(&decl.name) {
                sink.report(Diagnostic::warning(
                    diagnostics::DUPLICATE_DECLARATION,
                    format!("enum '{}' is declared more than once", decl.name),
                    Location::new(&source.location, &decl.name),
                ));
                continue;
            }
            self.enums.insert(decl.name.clone(), decl);
        }

        for decl in source.document.interfaces {
            if self.index.contains_key(&decl.name) {
                sink.report(Diagnostic::warning(
                    diagnostics::DUPLICATE_DECLARATION,
                    format!("interface '{}' is declared more than once", decl.name),
                    Location::new(&source.location, &decl.name),
                ));
                continue;
            }
            self.index.insert(decl.name.clone(), self.interfaces.len());
            self.interfaces.push(decl);
        }
    }

    /// Interfaces in load order.
    pub fn interfaces(&self) -> &[InterfaceDecl] {
        &self.interfaces
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceDecl> {
        self.index.get(name).map(|&i| &self.interfaces[i])
    }

    pub fn enum_decl(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.get(name)
    }
}
