//! Primary client unit: interface trait, hooks, client struct and its
//! implementation of the interface.

use std::collections::BTreeSet;

use crate::contract::{rust_string_literal, InterfaceContract, MethodContract};
use crate::ir::{
    ConstDecl, Expr, Field, FnDecl, ImplBlock, Item, Stmt, StructDecl, TraitDecl, Unit,
};

use super::execution::{execution_body, manual_body, method_decl, method_docs, MethodHooks};
use super::SynthContext;

/// Build the primary unit of `contract`.
pub fn client_unit(contract: &InterfaceContract, cx: &SynthContext<'_>) -> Unit {
    let implementation = contract.impl_name();
    let mut unit = Unit::new(&implementation, &contract.source);

    unit.items.push(Item::Trait(interface_trait(contract)));
    unit.items.push(Item::Trait(hooks_trait(contract)));
    unit.items.push(Item::Struct(StructDecl {
        name: contract.default_hooks(),
        doc: vec![format!("`{}` that does nothing.", contract.hooks_trait())],
        derives: vec![
            "Debug".into(),
            "Clone".into(),
            "Copy".into(),
            "Default".into(),
        ],
        fields: Vec::new(),
    }));
    unit.items.push(Item::Impl(ImplBlock {
        trait_name: Some(contract.hooks_trait()),
        target: contract.default_hooks(),
        ..Default::default()
    }));

    if contract.has_manual_methods() {
        unit.items.push(Item::Trait(TraitDecl {
            name: contract.manual_trait(),
            doc: vec![
                format!("Methods of `{}` implemented by hand.", contract.name),
                String::new(),
                format!("Implement this trait for `{implementation}` next to the generated code."),
            ],
            supertraits: vec!["Send".into(), "Sync".into()],
            is_async: true,
            methods: contract
                .methods
                .iter()
                .filter(|m| m.ignore_implementation)
                .map(method_decl)
                .collect(),
        }));
    }

    unit.items.push(Item::Struct(StructDecl {
        name: implementation.clone(),
        doc: vec![format!("HTTP client implementing `{}`.", contract.name)],
        derives: vec!["Clone".into()],
        fields: vec![
            Field::new("client", "reqwest::Client"),
            Field::new("base_address", "String"),
            Field::new("hooks", format!("Arc<dyn {}>", contract.hooks_trait())),
        ],
    }));
    unit.items.push(Item::Impl(inherent_impl(contract, cx)));
    unit.items.push(Item::Impl(ImplBlock {
        trait_name: Some(contract.name.clone()),
        target: implementation.clone(),
        is_async: true,
        consts: Vec::new(),
        methods: contract
            .methods
            .iter()
            .map(|m| {
                let body = if m.ignore_implementation {
                    manual_body(m, &contract.manual_trait())
                } else {
                    execution_body(m, contract.client.content_type.as_deref())
                };
                method_decl(m).body(body)
            })
            .collect(),
    }));
    unit
}

fn interface_trait(contract: &InterfaceContract) -> TraitDecl {
    let mut doc = vec![format!("Web API client `{}`.", contract.name)];
    if !contract.ancestors.is_empty() {
        doc.push(String::new());
        doc.push(format!(
            "Includes the methods of {}.",
            contract
                .ancestors
                .iter()
                .map(|a| format!("`{a}`"))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    TraitDecl {
        name: contract.name.clone(),
        doc,
        supertraits: vec!["Send".into(), "Sync".into()],
        is_async: true,
        methods: contract
            .methods
            .iter()
            .map(|m| method_docs(m).into_iter().fold(method_decl(m), FnDecl::doc))
            .collect(),
    }
}

/// Interface-level hooks followed by the hooks of every method, each once.
fn hooks_trait(contract: &InterfaceContract) -> TraitDecl {
    let mut methods = vec![
        hook("on_before_request")
            .doc("Called with every request before it is sent.")
            .param("_method", "&str")
            .param("_request", "&mut reqwest::Request"),
        hook("on_after_response")
            .doc("Called with every successful response before it is read.")
            .param("_method", "&str")
            .param("_response", "&reqwest::Response"),
        hook("on_request_fail")
            .doc("Called when the server answers with a non-success status.")
            .param("_method", "&str")
            .param("_status", "reqwest::StatusCode")
            .param("_body", "&str"),
        hook("on_request_error")
            .doc("Called with every error a method returns.")
            .param("_method", "&str")
            .param("_error", "&WebApiError"),
    ];

    let mut seen = BTreeSet::new();
    for method in contract
        .methods
        .iter()
        .filter(|m| !m.ignore_implementation)
    {
        if seen.insert(method.fn_name()) {
            methods.extend(method_hooks(method));
        }
    }

    TraitDecl {
        name: contract.hooks_trait(),
        doc: vec![
            format!("Hooks around the requests of `{}`.", contract.impl_name()),
            String::new(),
            "Every hook defaults to doing nothing.".to_string(),
        ],
        supertraits: vec!["Send".into(), "Sync".into()],
        is_async: false,
        methods,
    }
}

fn method_hooks(method: &MethodContract) -> Vec<FnDecl> {
    let names = MethodHooks::new(method);
    vec![
        hook(names.before).param("_request", "&mut reqwest::Request"),
        hook(names.after).param("_response", "&reqwest::Response"),
        hook(names.fail)
            .param("_status", "reqwest::StatusCode")
            .param("_body", "&str"),
        hook(names.error).param("_error", "&WebApiError"),
    ]
}

fn hook(name: impl Into<String>) -> FnDecl {
    FnDecl::method(name).body(Vec::new())
}

fn inherent_impl(contract: &InterfaceContract, cx: &SynthContext<'_>) -> ImplBlock {
    let base_address = contract
        .client
        .base_address
        .as_deref()
        .or(cx.options.base_url.as_deref())
        .unwrap_or_default();
    let timeout = contract
        .client
        .timeout_secs
        .map_or_else(|| "None".to_string(), |secs| format!("Some({secs})"));

    ImplBlock {
        trait_name: None,
        target: contract.impl_name(),
        is_async: false,
        consts: vec![
            ConstDecl {
                name: "BASE_ADDRESS".into(),
                ty: "&'static str".into(),
                value: rust_string_literal(base_address),
            },
            ConstDecl {
                name: "TIMEOUT_SECS".into(),
                ty: "Option<u64>".into(),
                value: timeout,
            },
        ],
        methods: vec![
            FnDecl::function("new")
                .public()
                .doc("Client against [`Self::BASE_ADDRESS`].")
                .param("client", "reqwest::Client")
                .returns("Self")
                .body(vec![Stmt::Tail(Expr::call(
                    "Self::with_base_address",
                    vec![Expr::ident("client"), Expr::raw("Self::BASE_ADDRESS")],
                ))]),
            FnDecl::function("with_base_address")
                .public()
                .param("client", "reqwest::Client")
                .param("base_address", "impl Into<String>")
                .returns("Self")
                .body(vec![Stmt::Tail(Expr::StructLit {
                    name: "Self".into(),
                    fields: vec![
                        ("client".into(), Expr::ident("client")),
                        (
                            "base_address".into(),
                            Expr::ident("base_address").method("into", vec![]),
                        ),
                        (
                            "hooks".into(),
                            Expr::call("Arc::new", vec![Expr::raw(contract.default_hooks())]),
                        ),
                    ],
                })]),
            FnDecl::consuming("with_hooks")
                .public()
                .doc("Replace the hooks.")
                .param("hooks", format!("Arc<dyn {}>", contract.hooks_trait()))
                .returns("Self")
                .body(vec![Stmt::Tail(Expr::raw("Self { hooks, ..self }"))]),
            FnDecl::method("base_address")
                .public()
                .returns("&str")
                .body(vec![Stmt::Tail(Expr::raw("&self.base_address"))]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{rust::RustBackend, Backend};
    use crate::contract::{
        ClientDescriptor, HttpVerb, ParameterContract, ParameterRole, ReturnShape, TypeRef,
    };
    use crate::diagnostics::Diagnostics;
    use crate::synth::SynthOptions;

    fn method(name: &str, ignore_implementation: bool) -> MethodContract {
        MethodContract {
            name: name.to_string(),
            verb: HttpVerb::Post,
            url_template: "/files".to_string(),
            returns: ReturnShape::AsyncVoid,
            parameters: vec![ParameterContract {
                name: "name".to_string(),
                ty: TypeRef::parse("String", |_| false),
                role: ParameterRole::Plain,
                default: None,
            }],
            content_type: None,
            ignore_implementation,
            ignore_wrap: false,
            declared_in: "IFileApi".to_string(),
        }
    }

    fn contract() -> InterfaceContract {
        InterfaceContract {
            name: "IFileApi".to_string(),
            source: "files.yaml".to_string(),
            ancestors: vec!["IBaseApi".to_string()],
            methods: vec![method("CreateAsync", false), method("UploadAsync", true)],
            client: ClientDescriptor {
                base_address: Some("https://files.example.com".to_string()),
                timeout_secs: Some(30),
                ..Default::default()
            },
            wrap: None,
        }
    }

    #[test]
    fn test_client_unit() {
        let options = SynthOptions::default();
        let sink = Diagnostics::new();
        let unit = client_unit(&contract(), &SynthContext::new(&options, &sink));
        assert_eq!(unit.name, "FileApi");
        assert_eq!(unit.source, "files.yaml");

        let text = RustBackend::new().render_items(&unit.items);
        assert!(text.contains("#[async_trait]\npub trait IFileApi: Send + Sync {"));
        assert!(text.contains("/// Includes the methods of `IBaseApi`."));
        assert!(text.contains("    /// `POST /files`\n    async fn create_async(&self, name: String) -> Result<(), WebApiError>;"));
        assert!(text.contains("pub trait FileApiHooks: Send + Sync {"));
        assert!(text.contains("    fn on_create_async_before(&self, _request: &mut reqwest::Request) {}"));
        assert!(!text.contains("on_upload_async_before"));
        assert!(text.contains("pub struct FileApiDefaultHooks;"));
        assert!(text.contains("impl FileApiHooks for FileApiDefaultHooks {}"));
        assert!(text.contains("pub trait FileApiManual: Send + Sync {"));
        assert!(text.contains("    pub const BASE_ADDRESS: &'static str = \"https://files.example.com\";"));
        assert!(text.contains("    pub const TIMEOUT_SECS: Option<u64> = Some(30);"));
        assert!(text.contains("    pub fn with_hooks(self, hooks: Arc<dyn FileApiHooks>) -> Self {"));
        assert!(text.contains("        FileApiManual::upload_async(self, name).await"));
        assert!(text.contains("hooks: Arc::new(FileApiDefaultHooks)"));
    }

    #[test]
    fn test_base_url_fallback() {
        let mut contract = contract();
        contract.client.base_address = None;
        contract.client.timeout_secs = None;
        contract.methods.truncate(1);
        let options = SynthOptions {
            base_url: Some("http://localhost:8080".to_string()),
            ..Default::default()
        };
        let sink = Diagnostics::new();
        let unit = client_unit(&contract, &SynthContext::new(&options, &sink));
        let text = RustBackend::new().render_items(&unit.items);
        assert!(text.contains("pub const BASE_ADDRESS: &'static str = \"http://localhost:8080\";"));
        assert!(text.contains("pub const TIMEOUT_SECS: Option<u64> = None;"));
        assert!(!text.contains("FileApiManual"));
    }
}
