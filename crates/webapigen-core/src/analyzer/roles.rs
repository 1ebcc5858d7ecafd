//! Parameter role classification.
//!
//! Each parameter gets exactly one role. Role annotations win over `Plain`;
//! a `CancellationToken` is recognized by its type alone. The only accepted
//! combination of role annotations is `Token` with a `Header` name override.

use crate::contract::{
    BodyBinding, ParameterRole, QueryBinding, QueryShape, TokenScope, TypeFamily, TypeRef,
};
use crate::declarations::{Annotation, ParameterDecl};

/// Default header carrying a token
pub const DEFAULT_TOKEN_HEADER: &str = "Authorization";

const ROLE_TAGS: &[&str] = &["Path", "Query", "ArrayQuery", "Header", "Body", "Token"];

/// Resolve the role of `param` with declared type `ty`.
pub fn classify(param: &ParameterDecl, ty: &TypeRef) -> Result<ParameterRole, String> {
    if ty.family == TypeFamily::CancellationToken {
        return Ok(ParameterRole::CancellationToken);
    }

    let tags: Vec<&Annotation> = param
        .attributes
        .iter()
        .filter(|a| ROLE_TAGS.iter().any(|tag| a.is(tag)))
        .collect();
    let find = |tag: &str| tags.iter().copied().find(|a| a.is(tag));

    if let Some(token) = find("Token") {
        let others: Vec<&str> = tags
            .iter()
            .filter(|a| !a.is("Token") && !a.is("Header"))
            .map(|a| a.name.as_str())
            .collect();
        if !others.is_empty() || tags.iter().filter(|a| a.is("Header")).count() > 1 {
            return Err(conflict(&tags));
        }
        return token_role(token, find("Header"), param);
    }

    match tags.as_slice() {
        [] => Ok(ParameterRole::Plain),
        [tag] => single_role(tag, param, ty),
        _ => Err(conflict(&tags)),
    }
}

fn single_role(tag: &Annotation, param: &ParameterDecl, ty: &TypeRef) -> Result<ParameterRole, String> {
    if tag.is("Path") {
        return Ok(ParameterRole::Path {
            format: tag.str_arg(0, "format")?,
        });
    }

    if tag.is("Query") {
        let name = tag.str_arg(0, "name")?.unwrap_or_else(|| param.name.clone());
        if ty.is_sequence() {
            return Ok(ParameterRole::ArrayQuery {
                name,
                separator: None,
            });
        }
        let shape = match ty.family {
            TypeFamily::Text => QueryShape::Text,
            TypeFamily::Object => QueryShape::Object,
            _ => QueryShape::Value,
        };
        return Ok(ParameterRole::Query(QueryBinding {
            name,
            format: tag.str_arg(1, "format")?,
            shape,
        }));
    }

    if tag.is("ArrayQuery") {
        if !ty.is_sequence() {
            return Err(format!(
                "[ArrayQuery] parameter '{}' must be a sequence, found '{}'",
                param.name, ty.raw
            ));
        }
        return Ok(ParameterRole::ArrayQuery {
            name: tag.str_arg(0, "name")?.unwrap_or_else(|| param.name.clone()),
            separator: tag.str_arg(1, "separator")?.filter(|s| !s.is_empty()),
        });
    }

    if tag.is("Header") {
        return Ok(ParameterRole::Header {
            name: tag.str_arg(0, "name")?.unwrap_or_else(|| param.name.clone()),
        });
    }

    if tag.is("Body") {
        return Ok(ParameterRole::Body(BodyBinding {
            content_type: tag.str_arg(0, "content_type")?.filter(|s| !s.trim().is_empty()),
            use_string_content: tag.named_bool("use_string_content")?.unwrap_or(false),
        }));
    }

    Err(format!("unsupported role annotation [{}]", tag.name))
}

fn token_role(
    token: &Annotation,
    header: Option<&Annotation>,
    param: &ParameterDecl,
) -> Result<ParameterRole, String> {
    let scope = match token.str_arg(0, "scope")? {
        Some(raw) => TokenScope::parse(&raw).ok_or_else(|| {
            format!(
                "unknown token scope '{}' on parameter '{}' (expected Tenant, User or Both)",
                raw, param.name
            )
        })?,
        None => TokenScope::Tenant,
    };

    let header = match header {
        Some(header) => header
            .str_arg(0, "name")?
            .unwrap_or_else(|| param.name.clone()),
        None => DEFAULT_TOKEN_HEADER.to_string(),
    };

    Ok(ParameterRole::Token { scope, header })
}

fn conflict(tags: &[&Annotation]) -> String {
    let names: Vec<&str> = tags.iter().map(|a| a.name.as_str()).collect();
    format!("conflicting role annotations: {}", names.join(", "))
}
