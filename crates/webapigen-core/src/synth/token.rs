//! Token scope expansion for wrap layers.
//!
//! Wrap methods drop their token parameters from the public signature and
//! acquire the tokens from the token manager instead. A parameter with the
//! `Both` scope yields two methods, one per concrete scope, named with a
//! scope infix (`GetUserAsync` → `GetUser_Tenant_Async`).

use std::collections::HashSet;

use crate::contract::{InterfaceContract, MethodContract, ParameterContract, ParameterRole, TokenScope};
use crate::diagnostics::{self, Diagnostic, DiagnosticSink, Location};
use crate::utils::{insert_scope_infix, to_snake_case};

/// One token acquisition of a wrap method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSlot<'a> {
    pub param: &'a ParameterContract,
    /// Concrete scope, never `Both`
    pub scope: TokenScope,
}

/// A method of the wrap layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapMethod<'a> {
    /// Logical name, with a scope infix for expanded methods
    pub name: String,
    /// Primary method the call is forwarded to
    pub target: &'a MethodContract,
    /// Parameters of the wrap signature
    pub params: Vec<&'a ParameterContract>,
    pub tokens: Vec<TokenSlot<'a>>,
}

/// Wrap methods for one primary method.
///
/// Methods without a `Both` token map one to one. A `Both` token yields one
/// method per concrete scope, tenant first.
pub fn expand_method(method: &MethodContract) -> Vec<WrapMethod<'_>> {
    let params: Vec<&ParameterContract> = method
        .parameters
        .iter()
        .filter(|p| !p.role.is_token())
        .collect();

    let has_both = method
        .tokens()
        .any(|p| matches!(p.role, ParameterRole::Token { scope: TokenScope::Both, .. }));

    if !has_both {
        return vec![WrapMethod {
            name: method.name.clone(),
            target: method,
            params,
            tokens: token_slots(method, None),
        }];
    }

    TokenScope::Both
        .concrete()
        .iter()
        .map(|scope| WrapMethod {
            name: insert_scope_infix(&method.name, scope.as_str()),
            target: method,
            params: params.clone(),
            tokens: token_slots(method, Some(*scope)),
        })
        .collect()
}

/// Token slots of `method`, with `Both` resolved to `both`.
fn token_slots(method: &MethodContract, both: Option<TokenScope>) -> Vec<TokenSlot<'_>> {
    method
        .tokens()
        .filter_map(|param| match &param.role {
            ParameterRole::Token {
                scope: TokenScope::Both,
                ..
            } => both.map(|scope| TokenSlot { param, scope }),
            ParameterRole::Token { scope, .. } => Some(TokenSlot {
                param,
                scope: *scope,
            }),
            _ => None,
        })
        .collect()
}

/// Wrap methods of `contract`, skipping methods opted out of wrapping.
///
/// An expanded name that collides with another method of the wrap layer is
/// reported and the expanded method is dropped.
pub fn expand_interface<'a>(
    contract: &'a InterfaceContract,
    sink: &dyn DiagnosticSink,
) -> Vec<WrapMethod<'a>> {
    let wrapped: Vec<&MethodContract> = contract.methods.iter().filter(|m| !m.ignore_wrap).collect();

    let mut taken: HashSet<String> = wrapped.iter().map(|m| to_snake_case(&m.name)).collect();
    let mut result = Vec::new();

    for method in wrapped {
        let expanded = expand_method(method);
        let is_expanded = expanded.len() > 1;
        for wrap_method in expanded {
            if is_expanded && !taken.insert(to_snake_case(&wrap_method.name)) {
                sink.report(Diagnostic::warning(
                    diagnostics::EXPANSION_COLLISION,
                    format!(
                        "expanding '{}' produces '{}', which already exists; the method is skipped",
                        method.name, wrap_method.name
                    ),
                    Location::new(&contract.source, format!("{}.{}", contract.name, method.name)),
                ));
                continue;
            }
            result.push(wrap_method);
        }
    }
    result
}
