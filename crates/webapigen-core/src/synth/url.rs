//! URL template handling: placeholder scanning and path expressions.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::{ParameterContract, ParameterRole};
use crate::ir::Expr;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// A `{name}` occurrence in a URL template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub name: &'a str,
    /// Byte range of the whole `{name}` token
    pub span: Range<usize>,
}

/// All placeholders of `template`, left to right.
pub fn placeholders(template: &str) -> Vec<Placeholder<'_>> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(Placeholder {
                name: name.as_str(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Path parameter bound to the placeholder `name` (ASCII case-insensitive).
pub fn path_parameter<'a>(
    name: &str,
    parameters: &'a [ParameterContract],
) -> Option<&'a ParameterContract> {
    parameters.iter().find(|p| {
        matches!(p.role, ParameterRole::Path { .. }) && p.name.eq_ignore_ascii_case(name)
    })
}

/// Placeholders of `template` without a path parameter to fill them.
pub fn unmatched_placeholders(template: &str, parameters: &[ParameterContract]) -> Vec<String> {
    placeholders(template)
        .into_iter()
        .filter(|p| path_parameter(p.name, parameters).is_none())
        .map(|p| p.name.to_string())
        .collect()
}

/// Expression producing the request path.
///
/// Placeholders with a path parameter are substituted, applying the
/// parameter's format when it has one. Unmatched placeholders stay in the
/// path as literal text. A template without substitutions is a plain string.
pub fn path_expr(template: &str, parameters: &[ParameterContract]) -> Expr {
    let mut format = String::new();
    let mut args = Vec::new();
    let mut cursor = 0;

    for placeholder in placeholders(template) {
        let Some(param) = path_parameter(placeholder.name, parameters) else {
            continue;
        };
        format.push_str(&escape_braces(&template[cursor..placeholder.span.start]));
        let (spec, arg) = path_argument(param);
        format.push_str(&spec);
        args.push(arg);
        cursor = placeholder.span.end;
    }

    if args.is_empty() {
        return Expr::str(template);
    }
    format.push_str(&escape_braces(&template[cursor..]));
    Expr::format(format, args)
}

/// Format spec and argument for one path parameter.
fn path_argument(param: &ParameterContract) -> (String, Expr) {
    let format = match &param.role {
        ParameterRole::Path { format } => format.as_deref(),
        _ => None,
    };
    let format = format.map(str::trim).filter(|f| !f.is_empty());

    if !param.ty.nullable {
        return match format {
            Some(f) => format_value(f, Expr::ident(&param.name)),
            None => ("{}".to_string(), Expr::ident(&param.name)),
        };
    }

    // `None` renders as an empty segment
    let render = match format {
        Some(f) => {
            let (spec, arg) = format_value(f, Expr::ident("value"));
            Expr::closure(&["value"], Expr::format(spec, vec![arg]))
        }
        None => Expr::raw("ToString::to_string"),
    };
    let value = Expr::ident(&param.name)
        .method("as_ref", vec![])
        .method("map", vec![render])
        .method("unwrap_or_default", vec![]);
    ("{}".to_string(), value)
}

/// Format spec and argument applying `format` to `value`.
///
/// A format containing `%` is a strftime pattern passed to the value's
/// `format` method; anything else is a `std::fmt` spec (`04`, `.2`, `:x`).
pub fn format_value(format: &str, value: Expr) -> (String, Expr) {
    if format.contains('%') {
        let arg = value.method("format", vec![Expr::str(format)]);
        return ("{}".to_string(), arg);
    }
    let spec = format.strip_prefix(':').unwrap_or(format);
    (format!("{{:{spec}}}"), value)
}

fn escape_braces(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}
