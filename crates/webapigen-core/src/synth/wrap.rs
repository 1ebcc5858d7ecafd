//! Wrap layer: a trait without token parameters and an implementation that
//! acquires tokens from a token manager and forwards to the primary client.

use crate::contract::{InterfaceContract, ParameterContract, ParameterRole, TypeRef};
use crate::diagnostics::{self, Diagnostic, Location};
use crate::ir::{Block, Expr, Field, FnDecl, ImplBlock, Item, LogLevel, Stmt, StructDecl, TraitDecl, Unit};
use crate::utils::implementation_name;

use super::execution::{method_docs, return_type};
use super::token::{expand_interface, WrapMethod};
use super::{Locals, SynthContext};

/// Token manager trait shipped with the support unit
pub const DEFAULT_TOKEN_MANAGE: &str = "ITokenManage";

/// Resolved names of a wrap layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapNames {
    /// Wrap trait, e.g. `IUserApiWrap`
    pub interface: String,
    /// Implementing struct, e.g. `UserApiWrap`
    pub implementation: String,
    pub token_manage: String,
}

/// Names of the wrap layer of `contract`.
///
/// The token manager comes from the wrap descriptor, then the client
/// descriptor, then the configured default. An explicitly empty name is an
/// error.
pub fn wrap_names(contract: &InterfaceContract, cx: &SynthContext<'_>) -> Option<Result<WrapNames, String>> {
    let wrap = contract.wrap.as_ref()?;
    let interface = contract.wrap_name()?;
    let token_manage = wrap
        .token_manage
        .as_deref()
        .or(contract.client.token_manage.as_deref())
        .or(cx.options.default_token_manage.as_deref())
        .unwrap_or(DEFAULT_TOKEN_MANAGE)
        .trim()
        .to_string();
    if token_manage.is_empty() {
        return Some(Err("the token manager name is empty".to_string()));
    }
    Some(Ok(WrapNames {
        implementation: implementation_name(&interface),
        interface,
        token_manage,
    }))
}

/// The wrap trait unit and the wrap implementation unit, if requested.
///
/// Missing wrap metadata is reported and yields no units; the primary unit
/// is unaffected.
pub fn wrap_units(contract: &InterfaceContract, cx: &SynthContext<'_>) -> Vec<Unit> {
    let names = match wrap_names(contract, cx) {
        None => return Vec::new(),
        Some(Ok(names)) => names,
        Some(Err(message)) => {
            cx.sink.report(Diagnostic::warning(
                diagnostics::WRAP_METADATA,
                format!("wrap layer of '{}' skipped: {}", contract.name, message),
                Location::new(&contract.source, &contract.name),
            ));
            return Vec::new();
        }
    };
    let methods = expand_interface(contract, cx.sink);

    let mut trait_unit = Unit::new(format!("{}.Wrap", contract.name), &contract.source);
    trait_unit.items.push(Item::Trait(TraitDecl {
        name: names.interface.clone(),
        doc: vec![format!(
            "`{}` with tokens supplied by `{}`.",
            contract.name, names.token_manage
        )],
        supertraits: vec!["Send".into(), "Sync".into()],
        is_async: true,
        methods: methods
            .iter()
            .map(|m| method_docs(m.target).into_iter().fold(wrap_decl(m), FnDecl::doc))
            .collect(),
    }));

    let mut impl_unit = Unit::new(format!("{}.WrapImpl", contract.name), &contract.source);
    let api_ty = format!("Arc<dyn {}>", contract.name);
    let manage_ty = format!("Arc<dyn {}>", names.token_manage);
    impl_unit.items.push(Item::Struct(StructDecl {
        name: names.implementation.clone(),
        doc: vec![format!("Forwards to `{}`, acquiring tokens first.", contract.name)],
        derives: vec!["Clone".into()],
        fields: vec![Field::new("api", &api_ty), Field::new("token_manage", &manage_ty)],
    }));
    impl_unit.items.push(Item::Impl(ImplBlock {
        target: names.implementation.clone(),
        methods: vec![FnDecl::function("new")
            .public()
            .param("api", &api_ty)
            .param("token_manage", &manage_ty)
            .returns("Self")
            .body(vec![Stmt::Tail(Expr::StructLit {
                name: "Self".into(),
                fields: vec![
                    ("api".into(), Expr::ident("api")),
                    ("token_manage".into(), Expr::ident("token_manage")),
                ],
            })])],
        ..Default::default()
    }));
    impl_unit.items.push(Item::Impl(ImplBlock {
        trait_name: Some(names.interface.clone()),
        target: names.implementation,
        is_async: true,
        consts: Vec::new(),
        methods: methods
            .iter()
            .map(|m| wrap_decl(m).body(forward_body(m)))
            .collect(),
    }));

    vec![trait_unit, impl_unit]
}

fn wrap_decl(method: &WrapMethod<'_>) -> FnDecl {
    method
        .params
        .iter()
        .fold(FnDecl::method(&method.name), |decl, p| decl.param(&p.name, &p.ty.raw))
        .asynchronous(method.target.returns.is_async())
        .returns(return_type(method.target))
}

/// Acquire every token, then forward the call to the primary client.
fn forward_body(method: &WrapMethod<'_>) -> Block {
    let is_async = method.target.returns.is_async();
    let mut inner = Vec::new();

    for slot in &method.tokens {
        let getter = Expr::raw("self.token_manage").method(slot.scope.getter(is_async), vec![]);
        let getter = if is_async { getter.await_() } else { getter };
        inner.push(Stmt::let_(&slot.param.name, getter.try_()));
        inner.push(Stmt::if_(
            Expr::ident(&slot.param.name).method("is_empty", vec![]),
            vec![Stmt::log(
                LogLevel::Warn,
                format!(
                    "{}: token manager returned an empty {} token",
                    method.name,
                    slot.scope.as_str().to_lowercase()
                ),
                vec![],
            )],
        ));
    }

    let args = method
        .target
        .parameters
        .iter()
        .map(|p| match p.role {
            ParameterRole::Token { .. } => token_arg(p),
            _ => Expr::ident(&p.name),
        })
        .collect();
    let call = Expr::raw("self.api").method(&method.target.name, args);
    inner.push(Stmt::Tail(if is_async { call.await_() } else { call }));

    let locals = Locals::new(method.target.parameters.iter().map(|p| p.name.as_str()));
    let result_ty = return_type(method.target);
    let request = if is_async {
        Expr::block(true, inner).await_()
    } else {
        Expr::Invoke(Box::new(Expr::Closure {
            params: Vec::new(),
            ret: Some(result_ty.clone()),
            body: Box::new(Expr::block(false, inner)),
        }))
    };

    vec![
        Stmt::let_typed(&locals.result, result_ty, request),
        Stmt::if_let(
            "Err",
            &locals.error,
            Expr::ident(&locals.result).by_ref(),
            vec![Stmt::log(
                LogLevel::Error,
                format!("{} failed: {{}}", method.name),
                vec![Expr::ident(&locals.error)],
            )],
        ),
        Stmt::Tail(Expr::ident(&locals.result)),
    ]
}

/// Acquired token as the primary method expects it.
fn token_arg(param: &ParameterContract) -> Expr {
    let token = Expr::ident(&param.name);
    let TypeRef {
        nullable, base, ..
    } = &param.ty;
    match (*nullable, base.starts_with('&')) {
        (false, false) => token,
        (false, true) => token.by_ref(),
        (true, false) => Expr::call("Some", vec![token]),
        (true, true) => Expr::call("Some", vec![token.method("as_str", vec![])]),
    }
}
