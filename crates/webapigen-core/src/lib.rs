//! webapigen Core Library
//!
//! This library synthesizes typed HTTP API clients from declarative,
//! annotated interface contracts: a trait per interface, a `reqwest`-based
//! implementation with hooks, optional token-hiding wrap layers and the
//! registration code tying them together.

pub mod analyzer;
pub mod backend;
pub mod config;
pub mod contract;
pub mod declarations;
pub mod diagnostics;
pub mod error;
pub mod generate;
pub mod ir;
pub mod manifest;
pub mod output;
pub mod synth;
pub mod templates;
pub mod utils;

pub use crate::{
    analyzer::ContractAnalyzer,
    config::Config,
    contract::InterfaceContract,
    declarations::{ContractSource, DeclarationSet},
    diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, Severity},
    error::{Error, Result},
    generate::{check, generate, GenerationReport},
    output::{GeneratedUnit, MemoryOutput, OutputSink},
    templates::{TemplateDir, TemplateKind, TemplateManager},
};

/// Name written into every generated file header
pub const GENERATOR: &str = "webapigen";
/// Version written into every generated file header
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
