//! Typed contract model produced by the analyzer.
//!
//! Contracts are built once per declaration and read by every emitter.
//! Annotation dispatch happens exactly once, in the analyzer: downstream code
//! matches on [`ParameterRole`] and never looks at raw annotations again.

mod types;

pub use types::{TypeFamily, TypeRef};

use serde::Serialize;

use crate::utils;

/// HTTP verb of a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpVerb {
    pub const ALL: [HttpVerb; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Head,
        Self::Options,
    ];

    /// Annotation name declaring this verb
    pub fn annotation_name(&self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::Post => "Post",
            Self::Put => "Put",
            Self::Delete => "Delete",
            Self::Patch => "Patch",
            Self::Head => "Head",
            Self::Options => "Options",
        }
    }

    /// Recognize a verb annotation name, with or without an `Http` prefix.
    pub fn from_annotation(name: &str) -> Option<Self> {
        let name = name.strip_suffix("Attribute").unwrap_or(name);
        let name = name.strip_prefix("Http").unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|verb| verb.annotation_name() == name)
    }

    /// Upper-case method token, e.g. `GET`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

/// Declared result of a method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReturnShape {
    /// Synchronous method producing a value
    Sync(TypeRef),
    /// Asynchronous method producing one value
    Async(TypeRef),
    /// Asynchronous method without a value
    AsyncVoid,
}

impl ReturnShape {
    pub fn is_async(&self) -> bool {
        !matches!(self, Self::Sync(_))
    }

    pub fn value(&self) -> Option<&TypeRef> {
        match self {
            Self::Sync(ty) | Self::Async(ty) => Some(ty),
            Self::AsyncVoid => None,
        }
    }

    /// Rust type of the successful result
    pub fn value_type(&self) -> &str {
        self.value().map_or("()", |ty| ty.raw.as_str())
    }
}

/// Scope of a token parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenScope {
    Tenant,
    User,
    /// Ambiguous scope, expanded into one method per concrete scope
    Both,
}

impl TokenScope {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.rsplit(['.', ':']).next().unwrap_or(raw);
        match raw.to_ascii_lowercase().as_str() {
            "tenant" => Some(Self::Tenant),
            "user" => Some(Self::User),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tenant => "Tenant",
            Self::User => "User",
            Self::Both => "Both",
        }
    }

    /// Concrete scopes a parameter of this scope stands for
    pub fn concrete(&self) -> &'static [TokenScope] {
        match self {
            Self::Tenant => &[Self::Tenant],
            Self::User => &[Self::User],
            Self::Both => &[Self::Tenant, Self::User],
        }
    }

    /// Token-manager getter acquiring a token of this scope
    pub fn getter(&self, is_async: bool) -> &'static str {
        match (self, is_async) {
            (Self::User, true) => "get_user_token_async",
            (Self::User, false) => "get_user_token",
            (_, true) => "get_tenant_token_async",
            (_, false) => "get_tenant_token",
        }
    }
}

/// How a simple query value is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueryShape {
    /// Text value, guarded against empty and URL-encoded
    Text,
    /// Any other simple value, added unencoded
    Value,
    /// Structured value flattened into one pair per field
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryBinding {
    /// Resolved query key
    pub name: String,
    pub format: Option<String>,
    pub shape: QueryShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyBinding {
    /// Content type given on the parameter itself
    pub content_type: Option<String>,
    /// Send the textual form instead of JSON
    pub use_string_content: bool,
}

/// The single structural role of a parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParameterRole {
    Path { format: Option<String> },
    Query(QueryBinding),
    ArrayQuery { name: String, separator: Option<String> },
    Header { name: String },
    Body(BodyBinding),
    /// Credential sent as a header, hidden from the wrap surface
    Token { scope: TokenScope, header: String },
    /// Carried in the signature, not bound to the request
    Plain,
    CancellationToken,
}

impl ParameterRole {
    pub fn is_token(&self) -> bool {
        matches!(self, Self::Token { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Path { .. } => "Path",
            Self::Query(_) => "Query",
            Self::ArrayQuery { .. } => "ArrayQuery",
            Self::Header { .. } => "Header",
            Self::Body(_) => "Body",
            Self::Token { .. } => "Token",
            Self::Plain => "Plain",
            Self::CancellationToken => "CancellationToken",
        }
    }
}

/// Default value of a parameter, classified by type family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DefaultLiteral {
    Str(String),
    Bool(bool),
    Char(char),
    /// Raw numeric text
    Number(String),
    EnumMember { enum_name: String, member: String },
    /// Numeric value with no matching enum member
    EnumNumeric { enum_name: String, value: String },
    /// Textual form of any other value
    Text(String),
    Null,
}

impl DefaultLiteral {
    /// Literal as written in documentation
    pub fn display(&self) -> String {
        match self {
            Self::Str(s) | Self::Text(s) => rust_string_literal(s),
            Self::Bool(b) => b.to_string(),
            Self::Char(c) => rust_char_literal(*c),
            Self::Number(n) => n.clone(),
            Self::EnumMember { enum_name, member } => format!("{enum_name}::{member}"),
            Self::EnumNumeric { value, .. } => value.clone(),
            Self::Null => "None".to_string(),
        }
    }

    /// Expression yielding `Option<T>` for a parameter of type `ty`, if one exists.
    ///
    /// Text that matched no family is parsed at runtime, which needs `FromStr`;
    /// enums and structured types get no fallback.
    pub fn fallback_expr(&self, ty: &TypeRef) -> Option<String> {
        match self {
            Self::Str(s) if ty.base.starts_with('&') => Some(format!("Some({})", rust_string_literal(s))),
            Self::Str(s) => Some(format!("Some({}.to_string())", rust_string_literal(s))),
            Self::Bool(b) => Some(format!("Some({b})")),
            Self::Char(c) => Some(format!("Some({})", rust_char_literal(*c))),
            Self::Number(n) if ty.is_float() && !n.contains(['.', 'e', 'E']) => {
                Some(format!("Some({n}.0)"))
            }
            Self::Number(n) => Some(format!("Some({n})")),
            Self::EnumMember { enum_name, member } => Some(format!("Some({enum_name}::{member})")),
            Self::Text(s) if ty.family.parses_from_str() => {
                Some(format!("{}.parse().ok()", rust_string_literal(s)))
            }
            Self::Text(_) | Self::EnumNumeric { .. } | Self::Null => None,
        }
    }
}

/// Quote and escape a Rust string literal
pub fn rust_string_literal(value: &str) -> String {
    format!("\"{}\"", value.escape_default())
}

/// Quote and escape a Rust char literal
pub fn rust_char_literal(value: char) -> String {
    format!("'{}'", value.escape_default())
}

/// An analyzed parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterContract {
    pub name: String,
    pub ty: TypeRef,
    pub role: ParameterRole,
    pub default: Option<DefaultLiteral>,
}

/// An analyzed method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodContract {
    pub name: String,
    pub verb: HttpVerb,
    pub url_template: String,
    pub returns: ReturnShape,
    pub parameters: Vec<ParameterContract>,
    /// Method-level content type
    pub content_type: Option<String>,
    pub ignore_implementation: bool,
    pub ignore_wrap: bool,
    /// Interface that declared the method
    pub declared_in: String,
}

impl MethodContract {
    /// Generated (snake_case) method name
    pub fn fn_name(&self) -> String {
        utils::to_snake_case(&self.name)
    }

    /// Name and types, used to tell identical inherited copies from overloads
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.parameters.iter().map(|p| p.ty.raw.as_str()).collect();
        format!(
            "{}({}) -> {}{}",
            self.name,
            params.join(", "),
            if self.returns.is_async() { "async " } else { "" },
            self.returns.value_type()
        )
    }

    pub fn body(&self) -> Option<&ParameterContract> {
        self.parameters
            .iter()
            .find(|p| matches!(p.role, ParameterRole::Body(_)))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &ParameterContract> {
        self.parameters.iter().filter(|p| p.role.is_token())
    }

    pub fn cancellation(&self) -> Option<&ParameterContract> {
        self.parameters
            .iter()
            .find(|p| p.role == ParameterRole::CancellationToken)
    }
}

/// Interface-level client descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientDescriptor {
    pub base_address: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Default content type for bodies
    pub content_type: Option<String>,
    pub registry_group: Option<String>,
    pub is_abstract: bool,
    pub token_manage: Option<String>,
}

/// Interface-level wrap descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WrapDescriptor {
    /// Wrap interface name override
    pub name: Option<String>,
    pub token_manage: Option<String>,
}

/// An analyzed interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceContract {
    pub name: String,
    /// Contract document the interface came from
    pub source: String,
    /// Ancestors in resolution order, transitively
    pub ancestors: Vec<String>,
    pub methods: Vec<MethodContract>,
    pub client: ClientDescriptor,
    pub wrap: Option<WrapDescriptor>,
}

impl InterfaceContract {
    /// Name of the generated client type, e.g. `UserApi`
    pub fn impl_name(&self) -> String {
        utils::implementation_name(&self.name)
    }

    pub fn hooks_trait(&self) -> String {
        format!("{}Hooks", self.impl_name())
    }

    pub fn default_hooks(&self) -> String {
        format!("{}DefaultHooks", self.impl_name())
    }

    pub fn manual_trait(&self) -> String {
        format!("{}Manual", self.impl_name())
    }

    pub fn has_manual_methods(&self) -> bool {
        self.methods.iter().any(|m| m.ignore_implementation)
    }

    /// Wrap interface name, when a wrap layer is requested
    pub fn wrap_name(&self) -> Option<String> {
        self.wrap
            .as_ref()
            .map(|w| utils::wrap_interface_name(&self.name, w.name.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_from_annotation() {
        assert_eq!(HttpVerb::from_annotation("Get"), Some(HttpVerb::Get));
        assert_eq!(HttpVerb::from_annotation("HttpPost"), Some(HttpVerb::Post));
        assert_eq!(HttpVerb::from_annotation("HttpDeleteAttribute"), Some(HttpVerb::Delete));
        assert_eq!(HttpVerb::from_annotation("Query"), None);
        assert_eq!(HttpVerb::Patch.as_str(), "PATCH");
    }

    #[test]
    fn test_token_scope() {
        assert_eq!(TokenScope::parse("TokenType.Both"), Some(TokenScope::Both));
        assert_eq!(TokenScope::parse("user"), Some(TokenScope::User));
        assert_eq!(TokenScope::parse("Admin"), None);
        assert_eq!(TokenScope::Both.concrete(), &[TokenScope::Tenant, TokenScope::User]);
        assert_eq!(TokenScope::User.getter(false), "get_user_token");
    }

    #[test]
    fn test_default_literal_expressions() {
        let string = TypeRef::parse("Option<String>", |_| false);
        let float = TypeRef::parse("Option<f64>", |_| false);
        let date = TypeRef::parse("Option<NaiveDate>", |_| false);

        assert_eq!(
            DefaultLiteral::Str("a\"b".into()).fallback_expr(&string).as_deref(),
            Some("Some(\"a\\\"b\".to_string())")
        );
        assert_eq!(
            DefaultLiteral::Number("1".into()).fallback_expr(&float).as_deref(),
            Some("Some(1.0)")
        );
        assert_eq!(
            DefaultLiteral::Text("2024-01-01".into()).fallback_expr(&date).as_deref(),
            Some("\"2024-01-01\".parse().ok()")
        );
        assert_eq!(DefaultLiteral::Null.fallback_expr(&string), None);

        // no member named `Pending` and enums have no parser to fall back on
        let status = TypeRef::parse("Option<UserStatus>", |name| name == "UserStatus");
        assert_eq!(DefaultLiteral::Text("Pending".into()).fallback_expr(&status), None);
        let filter = TypeRef::parse("Option<UserFilter>", |_| false);
        assert_eq!(DefaultLiteral::Text("{}".into()).fallback_expr(&filter), None);
        assert_eq!(DefaultLiteral::Char('\n').display(), "'\\n'");
    }

    #[test]
    fn test_return_shape() {
        let user = TypeRef::parse("UserDto", |_| false);
        assert!(ReturnShape::Async(user.clone()).is_async());
        assert!(!ReturnShape::Sync(user).is_async());
        assert_eq!(ReturnShape::AsyncVoid.value_type(), "()");
    }
}
