//! Body content negotiation.

use crate::contract::{BodyBinding, ParameterContract, ParameterRole};
use crate::ir::{Block, Expr, Stmt};

use super::binder::guard_null;
use super::Locals;

/// Content type used when nothing more specific is declared
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Effective content type: parameter, then method, then interface, then JSON.
///
/// An explicit parameter content type is used as written; the method and
/// interface defaults contribute their media type only.
///
/// The header does not follow the serialization: a JSON-serialized body
/// under a `text/plain` interface default is sent as `text/plain`. Declare
/// the content type on the body parameter to override it.
pub fn resolve_content_type(
    parameter: Option<&str>,
    method: Option<&str>,
    interface: Option<&str>,
) -> String {
    fn declared(ct: Option<&str>) -> Option<&str> {
        ct.map(str::trim).filter(|ct| !ct.is_empty())
    }

    if let Some(explicit) = declared(parameter) {
        return explicit.to_string();
    }
    declared(method)
        .or_else(|| declared(interface))
        .map(media_type)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// Media type without parameters: `text/plain; charset=utf-8` → `text/plain`
pub fn media_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}

/// Statements attaching the body parameter, if any, to the request builder.
///
/// String content sends the value's text form; everything else is
/// serialized as JSON. A `None` body sends nothing.
pub fn body_statements(
    body: Option<&ParameterContract>,
    method_content_type: Option<&str>,
    interface_content_type: Option<&str>,
    locals: &Locals,
) -> Block {
    let Some(param) = body else {
        return Vec::new();
    };
    let ParameterRole::Body(BodyBinding {
        content_type,
        use_string_content,
    }) = &param.role
    else {
        return Vec::new();
    };

    let content_type = resolve_content_type(
        content_type.as_deref(),
        method_content_type,
        interface_content_type,
    );
    let use_string_content = *use_string_content;
    let nullable = param.ty.nullable;

    guard_null(param, |value| {
        let payload = if use_string_content {
            value.method("to_string", vec![])
        } else if nullable {
            Expr::call("serde_json::to_string", vec![value]).try_()
        } else {
            Expr::call("serde_json::to_string", vec![value.by_ref()]).try_()
        };
        vec![Stmt::Assign {
            target: locals.builder.clone(),
            value: Expr::ident(&locals.builder)
                .method(
                    "header",
                    vec![
                        Expr::raw("reqwest::header::CONTENT_TYPE"),
                        Expr::str(content_type),
                    ],
                )
                .method("body", vec![payload]),
        }]
    })
}
