//! Raw declarations as written in a contract document.
//!
//! Nothing here is interpreted yet: annotations keep their raw arguments and
//! types stay plain strings. The analyzer turns these into contracts.

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use super::Annotation;

/// Root of one contract document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractDocument {
    /// Enumerations referenced by parameter types
    #[serde(default)]
    pub enums: Vec<EnumDecl>,

    /// Interface declarations
    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,
}

/// An enumeration with its members.
#[derive(Debug, Clone, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub members: Vec<EnumMemberDecl>,
}

impl EnumDecl {
    /// Members paired with their numeric value. Members without an explicit
    /// value count up from the previous one, starting at zero.
    pub fn values(&self) -> Vec<(&str, i64)> {
        let mut next = 0;
        self.members
            .iter()
            .map(|member| {
                let value = member.value.unwrap_or(next);
                next = value + 1;
                (member.name.as_str(), value)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumMemberDecl {
    pub name: String,
    #[serde(default)]
    pub value: Option<i64>,
}

/// An interface declaration with its annotations and members.
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceDecl {
    /// Interface name, e.g. `IUserApi`
    pub name: String,

    /// Names of ancestor interfaces, in declaration order
    #[serde(default)]
    pub extends: Vec<String>,

    /// Interface-level annotations (client and wrap descriptors)
    #[serde(default)]
    pub attributes: Vec<Annotation>,

    /// Declared methods
    #[serde(default)]
    pub methods: Vec<MethodDecl>,

    /// Document the declaration was loaded from
    #[serde(skip)]
    pub source: String,
}

impl InterfaceDecl {
    /// First annotation answering to any of `names`.
    pub fn annotation(&self, names: &[&str]) -> Option<&Annotation> {
        self.attributes
            .iter()
            .find(|a| names.iter().any(|name| a.is(name)))
    }
}

/// A method declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodDecl {
    pub name: String,

    /// Declared result; absent means an async method without a value
    #[serde(default)]
    pub returns: Option<ReturnsDecl>,

    #[serde(default)]
    pub attributes: Vec<Annotation>,

    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
}

impl MethodDecl {
    pub fn annotation(&self, names: &[&str]) -> Option<&Annotation> {
        self.attributes
            .iter()
            .find(|a| names.iter().any(|name| a.is(name)))
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.is(name))
    }
}

/// Declared result of a method.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnsDecl {
    /// Result type; `None` for methods that produce no value
    #[serde(rename = "type", default)]
    pub ty: Option<String>,

    /// Whether the method is asynchronous
    #[serde(rename = "async", default)]
    pub is_async: bool,
}

/// A parameter declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterDecl {
    pub name: String,

    /// Declared type in Rust syntax, e.g. `Option<Vec<String>>`
    #[serde(rename = "type")]
    pub ty: String,

    /// Default value. `Some(Null)` is an explicit null default.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub default: Option<JsonValue>,

    #[serde(default)]
    pub attributes: Vec<Annotation>,
}

/// Keeps an explicit `null` distinguishable from an absent field.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}
