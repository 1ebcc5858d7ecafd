//! Request execution and hook emission for primary client methods.
//!
//! Every method body follows the same shape:
//! defaults, path, query, builder, headers, body, before hooks, send,
//! then either fail hooks and a transport error or after hooks and
//! deserialization. Any error leaving the request block triggers the error
//! hooks before it is returned.

use crate::contract::{MethodContract, ParameterContract, ParameterRole};
use crate::ir::{Block, Expr, FnDecl, LogLevel, Stmt};

use super::{binder, body, url, Locals};

/// Error type of every generated method
pub const ERROR_TYPE: &str = "WebApiError";

/// Names of the per-method hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodHooks {
    pub before: String,
    pub after: String,
    pub fail: String,
    pub error: String,
}

impl MethodHooks {
    pub fn new(method: &MethodContract) -> Self {
        let base = method.fn_name();
        Self {
            before: format!("on_{base}_before"),
            after: format!("on_{base}_after"),
            fail: format!("on_{base}_fail"),
            error: format!("on_{base}_error"),
        }
    }
}

/// `Result<T, WebApiError>` for the method's value type
pub fn return_type(method: &MethodContract) -> String {
    format!("Result<{}, {}>", method.returns.value_type(), ERROR_TYPE)
}

/// Declaration of `method` without a body: name, parameters, return type.
pub fn method_decl(method: &MethodContract) -> FnDecl {
    method
        .parameters
        .iter()
        .fold(FnDecl::method(&method.name), |decl, p| decl.param(&p.name, &p.ty.raw))
        .asynchronous(method.returns.is_async())
        .returns(return_type(method))
}

/// Documentation lines for a method of the interface trait.
pub fn method_docs(method: &MethodContract) -> Vec<String> {
    let mut doc = vec![format!("`{} {}`", method.verb.as_str(), method.url_template)];
    let defaults: Vec<String> = method
        .parameters
        .iter()
        .filter_map(|p| {
            p.default
                .as_ref()
                .map(|d| format!("`{}` defaults to `{}`.", p.name, d.display()))
        })
        .collect();
    if !defaults.is_empty() {
        doc.push(String::new());
        doc.extend(defaults);
    }
    doc
}

/// Cancellation argument handed to the transport helpers.
pub fn cancel_arg(method: &MethodContract) -> Expr {
    let Some(param) = method.cancellation() else {
        return Expr::raw("None");
    };
    let ident = Expr::ident(&param.name);
    match (param.ty.nullable, param.ty.is_borrowed()) {
        (true, true) => ident,
        (true, false) => ident.method("as_ref", vec![]),
        (false, true) => Expr::call("Some", vec![ident]),
        (false, false) => Expr::call("Some", vec![ident.by_ref()]),
    }
}

/// Rebind nullable parameters that declare a default.
///
/// Defaults without a literal form (`null`, enum values matching no member)
/// are documented only.
pub fn default_statements(parameters: &[ParameterContract]) -> Block {
    parameters
        .iter()
        .filter(|p| p.ty.nullable && p.role != ParameterRole::CancellationToken)
        .filter_map(|p| {
            let fallback = p.default.as_ref()?.fallback_expr(&p.ty)?;
            Some(Stmt::let_(
                &p.name,
                Expr::ident(&p.name).method(
                    "or_else",
                    vec![Expr::closure(&[], Expr::raw(fallback))],
                ),
            ))
        })
        .collect()
}

/// Body of a primary client method.
pub fn execution_body(method: &MethodContract, interface_content_type: Option<&str>) -> Block {
    let locals = Locals::new(method.parameters.iter().map(|p| p.name.as_str()));
    let cancel = cancel_arg(method);
    let hooks = MethodHooks::new(method);
    let name = Expr::str(&method.name);

    let mut inner = default_statements(&method.parameters);
    inner.push(Stmt::let_(
        &locals.path,
        url::path_expr(&method.url_template, &method.parameters),
    ));
    inner.extend(binder::query_statements(&method.parameters, &locals));
    inner.push(Stmt::let_(
        &locals.url,
        Expr::call(
            "build_url",
            vec![
                Expr::raw("&self.base_address"),
                Expr::ident(&locals.path).by_ref(),
                Expr::ident(&locals.query).by_ref(),
            ],
        ),
    ));

    let mut bindings = binder::header_statements(&method.parameters, &locals);
    bindings.extend(body::body_statements(
        method.body(),
        method.content_type.as_deref(),
        interface_content_type,
        &locals,
    ));
    inner.push(Stmt::Let {
        name: locals.builder.clone(),
        mutable: !bindings.is_empty(),
        ty: None,
        value: Expr::raw("self.client").method(
            "request",
            vec![
                Expr::raw(format!("reqwest::Method::{}", method.verb.as_str())),
                Expr::ident(&locals.url),
            ],
        ),
    });
    inner.extend(bindings);

    let request_mut = Expr::raw(format!("&mut {}", locals.request));
    inner.push(Stmt::let_mut(
        &locals.request,
        Expr::ident(&locals.builder).method("build", vec![]).try_(),
    ));
    inner.push(Stmt::hook("on_before_request", vec![name.clone(), request_mut.clone()]));
    inner.push(Stmt::hook(&hooks.before, vec![request_mut]));
    inner.push(Stmt::let_(
        &locals.response,
        Expr::call(
            "send_request",
            vec![
                Expr::raw("&self.client"),
                Expr::ident(&locals.request),
                cancel.clone(),
            ],
        )
        .await_()
        .try_(),
    ));
    inner.push(Stmt::let_(
        &locals.status,
        Expr::ident(&locals.response).method("status", vec![]),
    ));

    let status = Expr::ident(&locals.status);
    let fail_body = Expr::ident(&locals.body);
    inner.push(Stmt::if_(
        status.clone().method("is_success", vec![]).negate(),
        vec![
            Stmt::let_(
                &locals.body,
                Expr::call("read_body", vec![Expr::ident(&locals.response), cancel.clone()])
                    .await_()
                    .method("unwrap_or_default", vec![]),
            ),
            Stmt::hook(
                "on_request_fail",
                vec![name.clone(), status.clone(), fail_body.clone().by_ref()],
            ),
            Stmt::hook(&hooks.fail, vec![status.clone(), fail_body.clone().by_ref()]),
            Stmt::log(
                LogLevel::Error,
                format!("{} failed with HTTP {{}}: {{}}", method.name),
                vec![status.clone(), fail_body.clone()],
            ),
            Stmt::Return(Expr::call(
                "Err",
                vec![Expr::StructLit {
                    name: format!("{ERROR_TYPE}::Transport"),
                    fields: vec![
                        ("status".to_string(), status.method("as_u16", vec![])),
                        ("body".to_string(), fail_body),
                    ],
                }],
            )),
        ],
    ));

    let response_ref = Expr::ident(&locals.response).by_ref();
    inner.push(Stmt::hook(
        "on_after_response",
        vec![name.clone(), response_ref.clone()],
    ));
    inner.push(Stmt::hook(&hooks.after, vec![response_ref]));

    match method.returns.value() {
        None => inner.push(Stmt::Tail(Expr::raw("Ok(())"))),
        Some(_) => {
            let text = Expr::ident(&locals.text);
            inner.push(Stmt::let_(
                &locals.text,
                Expr::call("read_body", vec![Expr::ident(&locals.response), cancel])
                    .await_()
                    .try_(),
            ));
            inner.push(Stmt::if_(
                text.clone()
                    .method("trim", vec![])
                    .method("is_empty", vec![]),
                vec![Stmt::Return(Expr::raw("Ok(Default::default())"))],
            ));
            inner.push(Stmt::Tail(Expr::call(
                "Ok",
                vec![Expr::call("serde_json::from_str", vec![text.by_ref()]).try_()],
            )));
        }
    }

    let request = if method.returns.is_async() {
        Expr::block(true, inner).await_()
    } else {
        Expr::call("block_on", vec![Expr::block(true, inner)])
    };

    let error = Expr::ident(&locals.error);
    vec![
        Stmt::let_typed(&locals.result, return_type(method), request),
        Stmt::if_let(
            "Err",
            &locals.error,
            Expr::ident(&locals.result).by_ref(),
            vec![
                Stmt::log(
                    LogLevel::Error,
                    format!("{} failed: {{}}", method.name),
                    vec![error.clone()],
                ),
                Stmt::hook("on_request_error", vec![name, error.clone()]),
                Stmt::hook(&hooks.error, vec![error]),
            ],
        ),
        Stmt::Tail(Expr::ident(&locals.result)),
    ]
}

/// Body forwarding to the hand-written implementation in `manual_trait`.
pub fn manual_body(method: &MethodContract, manual_trait: &str) -> Block {
    let mut args = vec![Expr::raw("self")];
    args.extend(method.parameters.iter().map(|p| Expr::ident(&p.name)));
    let call = Expr::call(format!("{}::{}", manual_trait, method.fn_name()), args);
    let call = if method.returns.is_async() {
        call.await_()
    } else {
        call
    };
    vec![Stmt::Tail(call)]
}
