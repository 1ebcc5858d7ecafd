//! Synthesizers turning analyzed contracts into IR units.
//!
//! Each interface yields a primary client unit and, when requested, a wrap
//! trait unit and a wrap implementation unit. A single registration unit
//! covers every interface of the batch.

pub mod binder;
pub mod body;
pub mod client;
pub mod execution;
pub mod registration;
pub mod token;
pub mod url;
pub mod wrap;

use crate::contract::InterfaceContract;
use crate::diagnostics::DiagnosticSink;
use crate::ir::Unit;
use crate::utils::to_snake_ident;

/// Unit name of the registration entry points
pub const REGISTRATION_UNIT: &str = "WebApiRegistration";
/// Unit name of the runtime support code
pub const SUPPORT_UNIT: &str = "WebApiSupport";
/// Unit name of the module index
pub const MODULE_INDEX_UNIT: &str = "mod";

/// Knobs shared by every synthesizer
#[derive(Debug, Clone, Default)]
pub struct SynthOptions {
    /// Base address for interfaces that declare none
    pub base_url: Option<String>,
    /// Token manager used by wrap layers that name none
    pub default_token_manage: Option<String>,
}

/// Everything a synthesizer needs besides the contract itself
pub struct SynthContext<'a> {
    pub options: &'a SynthOptions,
    pub sink: &'a dyn DiagnosticSink,
}

impl<'a> SynthContext<'a> {
    pub fn new(options: &'a SynthOptions, sink: &'a dyn DiagnosticSink) -> Self {
        Self { options, sink }
    }
}

/// Units generated for one interface: primary first, then the wrap pair.
pub fn interface_units(contract: &InterfaceContract, cx: &SynthContext<'_>) -> Vec<Unit> {
    let mut units = vec![client::client_unit(contract, cx)];
    units.extend(wrap::wrap_units(contract, cx));
    units
}

/// Names of the locals a generated method body introduces.
///
/// A local sharing its name with a parameter gets a trailing underscore so
/// the parameter stays reachable.
#[derive(Debug, Clone)]
pub struct Locals {
    pub path: String,
    pub query: String,
    pub url: String,
    pub builder: String,
    pub request: String,
    pub response: String,
    pub status: String,
    pub body: String,
    pub text: String,
    pub result: String,
    pub error: String,
}

impl Locals {
    pub fn new<'p>(params: impl IntoIterator<Item = &'p str>) -> Self {
        let taken: Vec<String> = params.into_iter().map(to_snake_ident).collect();
        let local = |name: &str| {
            let mut candidate = name.to_string();
            while taken.contains(&candidate) {
                candidate.push('_');
            }
            candidate
        };
        Self {
            path: local("path"),
            query: local("query"),
            url: local("url"),
            builder: local("builder"),
            request: local("request"),
            response: local("response"),
            status: local("status"),
            body: local("body"),
            text: local("text"),
            result: local("result"),
            error: local("error"),
        }
    }
}
