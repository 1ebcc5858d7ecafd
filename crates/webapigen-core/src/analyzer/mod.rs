//! Declaration analysis.
//!
//! Turns annotated interface declarations into [`InterfaceContract`]s: the
//! HTTP verb and URL template of every method, the role of every parameter
//! and the client and wrap descriptors of the interface. Problems with a
//! single method or interface become diagnostics; analysis of the rest of the
//! batch goes on.

// Internal imports (std, crate)
use std::collections::HashSet;

use crate::contract::{
    ClientDescriptor, HttpVerb, InterfaceContract, MethodContract, ParameterContract,
    ParameterRole, ReturnShape, TokenScope, TypeRef, WrapDescriptor,
};
use crate::declarations::{Annotation, DeclarationSet, InterfaceDecl, MethodDecl};
use crate::diagnostics::{self, Diagnostic, DiagnosticSink, Location};
use crate::error::{Error, Result};
use crate::synth::url::unmatched_placeholders;

pub mod inherit;
pub mod literal;
pub mod roles;

/// Interface annotation marking an HTTP client
pub const CLIENT_ANNOTATION: &[&str] = &["HttpClientApi"];
/// Interface annotation requesting a wrap layer
pub const WRAP_ANNOTATION: &[&str] = &["WrapApi", "HttpClientApiWrap"];

const CONTENT_TYPE_ANNOTATION: &[&str] = &["ContentType"];
const IGNORE_IMPLEMENTATION: &str = "IgnoreImplementation";
const IGNORE_WRAP: &str = "IgnoreWrap";

/// Analyzes the interfaces of one declaration set.
pub struct ContractAnalyzer<'a> {
    declarations: &'a DeclarationSet,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> ContractAnalyzer<'a> {
    pub fn new(declarations: &'a DeclarationSet, sink: &'a dyn DiagnosticSink) -> Self {
        Self { declarations, sink }
    }

    /// Contracts of every concrete client interface, in declaration order.
    ///
    /// An interface that fails to resolve is reported and left out.
    pub fn analyze_all(&self) -> Vec<InterfaceContract> {
        self.analyze_matching(|_| true)
    }

    /// Like [`analyze_all`](Self::analyze_all), restricted to the interfaces
    /// whose name passes `select`.
    pub fn analyze_matching(&self, select: impl Fn(&str) -> bool) -> Vec<InterfaceContract> {
        self.declarations
            .interfaces()
            .iter()
            .filter(|decl| select(&decl.name))
            .filter_map(|decl| match self.analyze_interface(decl) {
                Ok(contract) => contract,
                Err(e) => {
                    self.sink.report(Diagnostic::error(
                        diagnostics::UNRESOLVED_MEMBER,
                        e.to_string(),
                        Location::new(&decl.source, &decl.name),
                    ));
                    None
                }
            })
            .collect()
    }

    /// Contract of one interface.
    ///
    /// Returns `Ok(None)` for interfaces that are not HTTP clients, for
    /// abstract clients and for clients without any usable method.
    pub fn analyze_interface(&self, decl: &InterfaceDecl) -> Result<Option<InterfaceContract>> {
        let Some(annotation) = decl.annotation(CLIENT_ANNOTATION) else {
            log::debug!("Skipping {}: not an HTTP client", decl.name);
            return Ok(None);
        };
        let client =
            client_descriptor(annotation).map_err(|message| Error::resolution(&decl.name, message))?;
        if client.is_abstract {
            log::debug!("Skipping {}: abstract client", decl.name);
            return Ok(None);
        }

        let wrap = decl
            .annotation(WRAP_ANNOTATION)
            .and_then(|annotation| match wrap_descriptor(annotation) {
                Ok(wrap) => Some(wrap),
                Err(message) => {
                    self.sink.report(Diagnostic::warning(
                        diagnostics::WRAP_METADATA,
                        format!("wrap layer of '{}' is skipped: {message}", decl.name),
                        Location::new(&decl.source, &decl.name),
                    ));
                    None
                }
            });

        let interfaces = inherit::linearize(self.declarations, decl, self.sink);
        let ancestors = interfaces
            .iter()
            .skip(1)
            .map(|i| i.name.clone())
            .collect();

        let mut methods = Vec::new();
        for inherited in inherit::collect_methods(&interfaces, self.sink) {
            match self.analyze_method(inherited.owner, inherited.method) {
                Ok(Some(method)) => methods.push(method),
                Ok(None) => {}
                Err(e) => self.sink.report(Diagnostic::error(
                    diagnostics::UNRESOLVED_MEMBER,
                    e.to_string(),
                    Location::new(
                        &inherited.owner.source,
                        format!("{}.{}", inherited.owner.name, inherited.method.name),
                    ),
                )),
            }
        }

        if methods.is_empty() {
            self.sink.report(Diagnostic::warning(
                diagnostics::NO_HTTP_METHODS,
                format!(
                    "interface '{}' has no method with a recognized HTTP verb",
                    decl.name
                ),
                Location::new(&decl.source, &decl.name),
            ));
            return Ok(None);
        }

        log::debug!(
            "Analyzed {} with {} methods ({} ancestors)",
            decl.name,
            methods.len(),
            interfaces.len() - 1
        );
        Ok(Some(InterfaceContract {
            name: decl.name.clone(),
            source: decl.source.clone(),
            ancestors,
            methods,
            client,
            wrap,
        }))
    }

    /// Contract of one method declared on `owner`.
    ///
    /// A method without a verb annotation is reported and yields `Ok(None)`,
    /// as does one with several body parameters. Members that cannot be
    /// resolved fail with [`Error::Resolution`].
    pub fn analyze_method(
        &self,
        owner: &InterfaceDecl,
        method: &MethodDecl,
    ) -> Result<Option<MethodContract>> {
        let symbol = format!("{}.{}", owner.name, method.name);
        let location = || Location::new(&owner.source, &symbol);
        let resolution = |message: String| Error::resolution(&symbol, message);

        let Some((verb, annotation)) = method
            .attributes
            .iter()
            .find_map(|a| HttpVerb::from_annotation(&a.name).map(|verb| (verb, a)))
        else {
            self.sink.report(Diagnostic::warning(
                diagnostics::MISSING_VERB,
                format!(
                    "method '{}' has no HTTP verb annotation and is not implemented",
                    method.name
                ),
                location(),
            ));
            return Ok(None);
        };
        let url_template = annotation
            .str_arg(0, "url")
            .map_err(resolution)?
            .unwrap_or_default();

        let declarations = self.declarations;
        let is_enum = move |name: &str| declarations.enum_decl(name).is_some();

        let returns = match &method.returns {
            None => ReturnShape::AsyncVoid,
            Some(returns) => {
                let ty = returns
                    .ty
                    .as_deref()
                    .map(str::trim)
                    .filter(|ty| !ty.is_empty() && *ty != "()");
                match (returns.is_async, ty) {
                    (true, Some(ty)) => ReturnShape::Async(TypeRef::parse(ty, is_enum)),
                    (true, None) => ReturnShape::AsyncVoid,
                    (false, Some(ty)) => ReturnShape::Sync(TypeRef::parse(ty, is_enum)),
                    (false, None) => {
                        return Err(resolution(
                            "a synchronous method must declare its result type".to_string(),
                        ))
                    }
                }
            }
        };

        let mut seen = HashSet::new();
        let mut parameters = Vec::with_capacity(method.parameters.len());
        for param in &method.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(resolution(format!(
                    "parameter '{}' is declared twice",
                    param.name
                )));
            }
            let ty = TypeRef::parse(&param.ty, is_enum);
            let role = roles::classify(param, &ty)
                .map_err(|message| resolution(format!("parameter '{}': {message}", param.name)))?;
            let default = param.default.as_ref().map(|value| {
                literal::default_literal(value, &ty, declarations.enum_decl(ty.name()))
            });
            parameters.push(ParameterContract {
                name: param.name.clone(),
                ty,
                role,
                default,
            });
        }

        let bodies = parameters
            .iter()
            .filter(|p| matches!(p.role, ParameterRole::Body(_)))
            .count();
        if bodies > 1 {
            self.sink.report(Diagnostic::warning(
                diagnostics::MULTIPLE_BODIES,
                format!(
                    "method '{}' declares {bodies} body parameters and is skipped",
                    method.name
                ),
                location(),
            ));
            return Ok(None);
        }

        let ambiguous = parameters
            .iter()
            .filter(|p| {
                matches!(
                    p.role,
                    ParameterRole::Token {
                        scope: TokenScope::Both,
                        ..
                    }
                )
            })
            .count();
        if ambiguous > 1 {
            return Err(resolution(
                "only one token parameter may use the Both scope".to_string(),
            ));
        }

        for placeholder in unmatched_placeholders(&url_template, &parameters) {
            self.sink.report(Diagnostic::warning(
                diagnostics::UNMATCHED_PLACEHOLDER,
                format!(
                    "placeholder '{{{placeholder}}}' of '{url_template}' has no path parameter and is sent as written"
                ),
                location(),
            ));
        }

        let content_type = match method.annotation(CONTENT_TYPE_ANNOTATION) {
            Some(annotation) => annotation
                .str_arg(0, "content_type")
                .map_err(resolution)?,
            None => None,
        };

        Ok(Some(MethodContract {
            name: method.name.clone(),
            verb,
            url_template,
            returns,
            parameters,
            content_type,
            ignore_implementation: method.has_annotation(IGNORE_IMPLEMENTATION),
            ignore_wrap: method.has_annotation(IGNORE_WRAP),
            declared_in: owner.name.clone(),
        }))
    }
}

fn client_descriptor(annotation: &Annotation) -> std::result::Result<ClientDescriptor, String> {
    Ok(ClientDescriptor {
        base_address: annotation.str_arg(0, "base_address")?,
        timeout_secs: annotation.named_u64("timeout")?,
        content_type: annotation.named_str("content_type")?,
        registry_group: annotation.named_str("registry_group")?,
        is_abstract: annotation.named_bool("abstract")?.unwrap_or(false),
        token_manage: annotation.named_str("token_manage")?,
    })
}

fn wrap_descriptor(annotation: &Annotation) -> std::result::Result<WrapDescriptor, String> {
    Ok(WrapDescriptor {
        name: annotation.str_arg(0, "name")?,
        token_manage: annotation.named_str("token_manage")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{DefaultLiteral, QueryShape};
    use crate::declarations::ContractSource;
    use crate::diagnostics::{Diagnostics, Severity};

    fn analyze(yaml: &str) -> (Vec<InterfaceContract>, Vec<Diagnostic>) {
        let sink = Diagnostics::new();
        let mut set = DeclarationSet::new();
        set.add_source(ContractSource::parse_content(yaml, "test.yaml").unwrap(), &sink);
        let contracts = ContractAnalyzer::new(&set, &sink).analyze_all();
        (contracts, sink.entries())
    }

    const USERS: &str = r#"
enums:
  - name: UserStatus
    members: [{ name: Active, value: 0 }, { name: Disabled, value: 1 }]
interfaces:
  - name: IUserApi
    attributes:
      - HttpClientApi: { base_address: "https://api.example.com", timeout: 60, registry_group: Admin }
      - WrapApi: { token_manage: IUserTokenManage }
    methods:
      - name: GetUserAsync
        returns: { type: UserDto, async: true }
        attributes: [{ Get: "/users/{id}" }, { ContentType: "text/xml" }, IgnoreWrap]
        parameters:
          - { name: id, type: i64, attributes: [{ Path: { format: "04" } }] }
          - { name: status, type: UserStatus, default: 1, attributes: [Query] }
          - { name: token, type: String, attributes: [{ Token: Both }] }
          - { name: cancel, type: CancellationToken }
      - name: Describe
        returns: { type: String }
"#;

    #[test]
    fn test_analyze_interface() {
        let (contracts, diagnostics) = analyze(USERS);
        assert_eq!(contracts.len(), 1);
        let contract = &contracts[0];
        assert_eq!(contract.name, "IUserApi");
        assert_eq!(contract.client.base_address.as_deref(), Some("https://api.example.com"));
        assert_eq!(contract.client.timeout_secs, Some(60));
        assert_eq!(contract.client.registry_group.as_deref(), Some("Admin"));
        assert_eq!(
            contract.wrap.as_ref().and_then(|w| w.token_manage.as_deref()),
            Some("IUserTokenManage")
        );

        let method = &contract.methods[0];
        assert_eq!(method.verb, HttpVerb::Get);
        assert_eq!(method.url_template, "/users/{id}");
        assert_eq!(method.content_type.as_deref(), Some("text/xml"));
        assert!(method.ignore_wrap);
        assert!(!method.ignore_implementation);
        assert!(matches!(method.returns, ReturnShape::Async(ref ty) if ty.raw == "UserDto"));
        assert!(matches!(
            method.parameters[1].role,
            ParameterRole::Query(ref q) if q.shape == QueryShape::Value
        ));
        assert_eq!(
            method.parameters[1].default,
            Some(DefaultLiteral::EnumMember {
                enum_name: "UserStatus".into(),
                member: "Disabled".into()
            })
        );
        assert_eq!(method.parameters[3].role, ParameterRole::CancellationToken);

        assert_eq!(contract.methods.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, diagnostics::MISSING_VERB);
        assert!(diagnostics[0].message.contains("'Describe'"));
        assert_eq!(diagnostics[0].location.symbol, "IUserApi.Describe");
    }

    #[test]
    fn test_non_clients_and_abstract_are_skipped() {
        let (contracts, diagnostics) = analyze(
            r#"
interfaces:
  - name: IPlain
    methods:
      - { name: PingAsync, returns: { async: true }, attributes: [{ Get: /ping }] }
  - name: IBaseApi
    attributes: [{ HttpClientApi: { abstract: true } }]
    methods:
      - { name: PingAsync, returns: { async: true }, attributes: [{ Get: /ping }] }
"#,
        );
        assert!(contracts.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_no_http_methods() {
        let (contracts, diagnostics) = analyze(
            r#"
interfaces:
  - name: IEmptyApi
    attributes: [HttpClientApi]
    methods:
      - { name: Describe, returns: { type: String } }
"#,
        );
        assert!(contracts.is_empty());
        let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![diagnostics::MISSING_VERB, diagnostics::NO_HTTP_METHODS]);
    }

    #[test]
    fn test_diamond_inheritance() {
        let (contracts, diagnostics) = analyze(
            r#"
interfaces:
  - name: IBase
    methods:
      - { name: PingAsync, returns: { async: true }, attributes: [{ Get: /ping }] }
  - name: ILeft
    extends: [IBase]
    methods:
      - { name: LeftAsync, returns: { async: true }, attributes: [{ Get: /left }] }
  - name: IRight
    extends: [IBase]
  - name: IBothApi
    extends: [ILeft, IRight]
    attributes: [HttpClientApi]
"#,
        );
        assert!(diagnostics.is_empty());
        let contract = &contracts[0];
        assert_eq!(contract.ancestors, vec!["ILeft", "IBase", "IRight"]);
        let names: Vec<_> = contract.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["LeftAsync", "PingAsync"]);
        assert_eq!(contract.methods[1].declared_in, "IBase");
    }

    #[test]
    fn test_method_level_problems() {
        let (contracts, diagnostics) = analyze(
            r#"
interfaces:
  - name: IFileApi
    attributes: [HttpClientApi]
    methods:
      - name: UploadAsync
        returns: { async: true }
        attributes: [{ Post: /files }]
        parameters:
          - { name: a, type: String, attributes: [Body] }
          - { name: b, type: String, attributes: [Body] }
      - name: ReadAsync
        returns: { type: String, async: true }
        attributes: [{ Get: "/files/{name}" }]
      - name: CountFiles
        attributes: [{ Get: /files/count }]
        returns: { async: false }
      - name: DeleteAsync
        returns: { async: true }
        attributes: [{ Delete: "/files/{id}" }]
        parameters:
          - { name: id, type: i64, attributes: [Path, Query] }
"#,
        );
        let contract = &contracts[0];
        let names: Vec<_> = contract.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["ReadAsync"]);

        let codes: Vec<_> = diagnostics.iter().map(|d| (d.code, d.severity)).collect();
        assert_eq!(
            codes,
            vec![
                (diagnostics::MULTIPLE_BODIES, Severity::Warning),
                (diagnostics::UNMATCHED_PLACEHOLDER, Severity::Warning),
                (diagnostics::UNRESOLVED_MEMBER, Severity::Error),
                (diagnostics::UNRESOLVED_MEMBER, Severity::Error),
            ]
        );
        assert!(diagnostics[1].message.contains("{name}"));
    }

    #[test]
    fn test_bad_wrap_metadata() {
        let (contracts, diagnostics) = analyze(
            r#"
interfaces:
  - name: IPingApi
    attributes: [HttpClientApi, { WrapApi: { token_manage: [ITokenManage] } }]
    methods:
      - { name: PingAsync, returns: { async: true }, attributes: [{ Get: /ping }] }
"#,
        );
        assert!(contracts[0].wrap.is_none());
        assert_eq!(diagnostics[0].code, diagnostics::WRAP_METADATA);
    }

    #[test]
    fn test_bad_client_descriptor() {
        let (contracts, diagnostics) = analyze(
            r#"
interfaces:
  - name: IPingApi
    attributes: [{ HttpClientApi: { timeout: soon } }]
    methods:
      - { name: PingAsync, returns: { async: true }, attributes: [{ Get: /ping }] }
"#,
        );
        assert!(contracts.is_empty());
        assert_eq!(diagnostics[0].code, diagnostics::UNRESOLVED_MEMBER);
        assert_eq!(diagnostics[0].severity, Severity::Error);
    }
}
