//! Binds query and header parameters onto the outgoing request.
//!
//! Query pairs are collected into a `Vec<(String, String)>` local; keys are
//! percent-encoded when the URL is assembled. Text values are encoded here,
//! other scalars go out as their display form.

use crate::contract::{ParameterContract, ParameterRole, QueryShape};
use crate::ir::{Block, Expr, Stmt};

use super::url::format_value;
use super::Locals;

/// Statements declaring the query local and pushing every query parameter.
pub fn query_statements(parameters: &[ParameterContract], locals: &Locals) -> Block {
    let mut block = Vec::new();
    let query_params: Vec<&ParameterContract> = parameters
        .iter()
        .filter(|p| matches!(p.role, ParameterRole::Query(_) | ParameterRole::ArrayQuery { .. }))
        .collect();

    let init = Expr::call("Vec::new", vec![]);
    if query_params.is_empty() {
        block.push(Stmt::let_typed(&locals.query, "Vec<(String, String)>", init));
        return block;
    }
    block.push(Stmt::Let {
        name: locals.query.clone(),
        mutable: true,
        ty: Some("Vec<(String, String)>".to_string()),
        value: init,
    });

    for param in query_params {
        match &param.role {
            ParameterRole::Query(binding) => {
                let push = |value: Expr| match binding.shape {
                    QueryShape::Text => text_query(&binding.name, value, locals),
                    QueryShape::Value => {
                        vec![push_pair(&locals.query, &binding.name, display(binding.format.as_deref(), value))]
                    }
                    QueryShape::Object => vec![Stmt::Expr(
                        Expr::ident(&locals.query).method(
                            "extend",
                            vec![Expr::call("query_pairs", vec![value.by_ref()]).try_()],
                        ),
                    )],
                };
                block.extend(guard_null(param, push));
            }
            ParameterRole::ArrayQuery { name, separator } => {
                let push = |value: Expr| {
                    array_query(name, separator.as_deref(), param, value, locals)
                };
                block.extend(guard_null(param, push));
            }
            _ => {}
        }
    }
    block
}

/// Statements adding header and token parameters to the request builder.
pub fn header_statements(parameters: &[ParameterContract], locals: &Locals) -> Block {
    let mut block = Vec::new();
    for param in parameters {
        let header = match &param.role {
            ParameterRole::Header { name } => name,
            ParameterRole::Token { header, .. } => header,
            _ => continue,
        };
        let is_text = param.ty.is_text();
        let set = |value: Expr| {
            let assign = Stmt::Assign {
                target: locals.builder.clone(),
                value: Expr::ident(&locals.builder).method(
                    "header",
                    vec![Expr::str(header), value.clone().method("to_string", vec![])],
                ),
            };
            if is_text {
                vec![Stmt::if_(
                    value.method("is_empty", vec![]).negate(),
                    vec![assign],
                )]
            } else {
                vec![assign]
            }
        };
        block.extend(guard_null(param, set));
    }
    block
}

/// Run `emit` on the parameter value, inside `if let Some(..)` when nullable.
///
/// The emitted statements see the value by reference when nullable.
pub fn guard_null(param: &ParameterContract, emit: impl FnOnce(Expr) -> Block) -> Block {
    if param.ty.nullable {
        vec![Stmt::if_let(
            "Some",
            &param.name,
            Expr::ident(&param.name).by_ref(),
            emit(Expr::ident(&param.name)),
        )]
    } else {
        emit(Expr::ident(&param.name))
    }
}

/// Empty text is skipped; anything else is percent-encoded.
fn text_query(name: &str, value: Expr, locals: &Locals) -> Block {
    let encoded = Expr::call("encode_query_value", vec![value.clone().by_ref()]);
    vec![Stmt::if_(
        value.method("is_empty", vec![]).negate(),
        vec![push_pair(&locals.query, name, encoded)],
    )]
}

fn array_query(
    name: &str,
    separator: Option<&str>,
    param: &ParameterContract,
    value: Expr,
    locals: &Locals,
) -> Block {
    let mut items = value.method("iter", vec![]);
    if param.ty.element.as_ref().map(|e| e.nullable).unwrap_or(false) {
        items = items.method("flatten", vec![]);
    }
    let encode = |item: Expr| {
        Expr::call(
            "encode_query_value",
            vec![item.method("to_string", vec![]).by_ref()],
        )
    };

    match separator {
        Some(separator) => {
            let values = format!("{}_values", param.name);
            let joined = Expr::ident(&values).method("join", vec![Expr::str(separator)]);
            vec![
                Stmt::let_typed(
                    &values,
                    "Vec<String>",
                    items
                        .method("map", vec![Expr::closure(&["item"], encode(Expr::ident("item")))])
                        .method("collect", vec![]),
                ),
                Stmt::if_(
                    Expr::ident(&values).method("is_empty", vec![]).negate(),
                    vec![push_pair(&locals.query, name, joined)],
                ),
            ]
        }
        None => vec![Stmt::ForEach {
            binding: "item".to_string(),
            iter: items,
            body: vec![push_pair(&locals.query, name, encode(Expr::ident("item")))],
        }],
    }
}

/// `value` in its display form, honoring a format string.
fn display(format: Option<&str>, value: Expr) -> Expr {
    match format.map(str::trim).filter(|f| !f.is_empty()) {
        Some(f) if f.contains('%') => {
            let (_, arg) = format_value(f, value);
            arg.method("to_string", vec![])
        }
        Some(f) => {
            let (spec, arg) = format_value(f, value);
            Expr::format(spec, vec![arg])
        }
        None => value.method("to_string", vec![]),
    }
}

fn push_pair(query: &str, name: &str, value: Expr) -> Stmt {
    Stmt::Expr(Expr::ident(query).method(
        "push",
        vec![Expr::Tuple(vec![Expr::str(name).method("to_string", vec![]), value])],
    ))
}
