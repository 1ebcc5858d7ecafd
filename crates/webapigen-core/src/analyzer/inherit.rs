//! Ancestor traversal and method deduplication.

use std::collections::{HashMap, HashSet};

use crate::declarations::{DeclarationSet, InterfaceDecl, MethodDecl};
use crate::diagnostics::{self, Diagnostic, DiagnosticSink, Location};

/// A method together with the interface that declared it.
#[derive(Debug, Clone, Copy)]
pub struct InheritedMethod<'a> {
    pub owner: &'a InterfaceDecl,
    pub method: &'a MethodDecl,
}

/// All interfaces reachable from `root` (itself first), depth-first in
/// declaration order, each visited once.
///
/// Unknown ancestors are reported and skipped.
pub fn linearize<'a>(
    declarations: &'a DeclarationSet,
    root: &'a InterfaceDecl,
    sink: &dyn DiagnosticSink,
) -> Vec<&'a InterfaceDecl> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    visit(declarations, root, sink, &mut visited, &mut order);
    order
}

fn visit<'a>(
    declarations: &'a DeclarationSet,
    decl: &'a InterfaceDecl,
    sink: &dyn DiagnosticSink,
    visited: &mut HashSet<&'a str>,
    order: &mut Vec<&'a InterfaceDecl>,
) {
    if !visited.insert(decl.name.as_str()) {
        return;
    }
    order.push(decl);

    for ancestor in &decl.extends {
        match declarations.interface(ancestor) {
            Some(parent) => visit(declarations, parent, sink, visited, order),
            None => sink.report(Diagnostic::warning(
                diagnostics::UNKNOWN_ANCESTOR,
                format!("ancestor '{}' of '{}' is not declared", ancestor, decl.name),
                Location::new(&decl.source, &decl.name),
            )),
        }
    }
}

/// Methods of `interfaces` with duplicates removed.
///
/// A method reached again with the same signature (diamond inheritance) is
/// dropped silently. A same-name method with a different signature cannot
/// coexist in one trait: it is reported and dropped.
pub fn collect_methods<'a>(
    interfaces: &[&'a InterfaceDecl],
    sink: &dyn DiagnosticSink,
) -> Vec<InheritedMethod<'a>> {
    let mut seen: HashMap<&str, String> = HashMap::new();
    let mut methods = Vec::new();

    for &owner in interfaces {
        for method in &owner.methods {
            let signature = signature(method);
            match seen.get(method.name.as_str()) {
                Some(existing) if *existing == signature => continue,
                Some(existing) => {
                    sink.report(Diagnostic::warning(
                        diagnostics::DUPLICATE_METHOD,
                        format!(
                            "method '{}' conflicts with '{}' and is skipped",
                            signature, existing
                        ),
                        Location::new(&owner.source, format!("{}.{}", owner.name, method.name)),
                    ));
                }
                None => {
                    seen.insert(method.name.as_str(), signature);
                    methods.push(InheritedMethod { owner, method });
                }
            }
        }
    }

    methods
}

fn signature(method: &MethodDecl) -> String {
    let params: Vec<&str> = method.parameters.iter().map(|p| p.ty.trim()).collect();
    let returns = match &method.returns {
        Some(r) => format!(
            "{}{}",
            if r.is_async { "async " } else { "" },
            r.ty.as_deref().unwrap_or("()")
        ),
        None => "async ()".to_string(),
    };
    format!("{}({}) -> {}", method.name, params.join(", "), returns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::ContractSource;
    use crate::diagnostics::Diagnostics;

    const DIAMOND: &str = r#"
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
    methods:
      - { name: RightAsync, returns: { async: true }, attributes: [{ Get: /right }] }
  - name: IBoth
    extends: [ILeft, IRight, IMissing]
"#;

    #[test]
    fn test_diamond_visits_each_ancestor_once() {
        let sink = Diagnostics::new();
        let mut set = DeclarationSet::new();
        set.add_source(ContractSource::parse_content(DIAMOND, "diamond.yaml").unwrap(), &sink);
        let root = set.interface("IBoth").unwrap();

        let order: Vec<&str> = linearize(&set, root, &sink)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(order, vec!["IBoth", "ILeft", "IBase", "IRight"]);

        let codes: Vec<_> = sink.entries().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![diagnostics::UNKNOWN_ANCESTOR]);
    }

    #[test]
    fn test_overload_is_reported() {
        let sink = Diagnostics::new();
        let mut set = DeclarationSet::new();
        let yaml = r#"
interfaces:
  - name: IA
    methods:
      - { name: FindAsync, returns: { async: true }, attributes: [{ Get: /a }] }
  - name: IB
    extends: [IA]
    methods:
      - name: FindAsync
        returns: { async: true }
        attributes: [{ Get: /b }]
        parameters: [{ name: q, type: String, attributes: [Query] }]
"#;
        set.add_source(ContractSource::parse_content(yaml, "o.yaml").unwrap(), &sink);
        let root = set.interface("IB").unwrap();
        let interfaces = linearize(&set, root, &sink);
        let methods = collect_methods(&interfaces, &sink);

        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].owner.name, "IB");
        assert_eq!(sink.entries()[0].code, diagnostics::DUPLICATE_METHOD);
    }
}
