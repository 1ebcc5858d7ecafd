//! Registration entry points, one per registry group.

use std::collections::BTreeMap;

use crate::contract::InterfaceContract;
use crate::ir::{Block, Expr, FnDecl, Item, Stmt, Unit};
use crate::utils::registration_entry_name;

use super::wrap::wrap_names;
use super::{SynthContext, REGISTRATION_UNIT};

/// Registration unit for every contract of the batch.
///
/// Each group gets `add_<group>_web_api_http_client`, registering the typed
/// clients, and `add_<group>_web_api_http_client_wrap` when the group has
/// wrap layers. Ungrouped interfaces land in the default entry point.
/// Returns `None` for an empty batch.
pub fn registration_unit(contracts: &[InterfaceContract], cx: &SynthContext<'_>) -> Option<Unit> {
    if contracts.is_empty() {
        return None;
    }

    let mut groups: BTreeMap<Option<&str>, Vec<&InterfaceContract>> = BTreeMap::new();
    for contract in contracts {
        let group = contract
            .client
            .registry_group
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty());
        groups.entry(group).or_default().push(contract);
    }

    let mut unit = Unit::new(REGISTRATION_UNIT, "");
    for (group, members) in groups {
        let label = group.unwrap_or("default");

        let mut body: Block = members.iter().map(|c| client_registration(c)).collect();
        body.push(Stmt::Tail(Expr::raw("Ok(())")));
        unit.items.push(Item::Function(
            FnDecl::function(registration_entry_name(group, false))
                .public()
                .doc(format!("Registers the typed clients of the `{label}` group."))
                .param("registry", "&mut WebApiRegistry")
                .returns("Result<(), WebApiError>")
                .body(body),
        ));

        let wraps: Block = members
            .iter()
            .filter_map(|c| wrap_registration(c, cx))
            .collect();
        if !wraps.is_empty() {
            unit.items.push(Item::Function(
                FnDecl::function(registration_entry_name(group, true))
                    .public()
                    .doc(format!("Registers the wrap clients of the `{label}` group."))
                    .doc("")
                    .doc("Needs the typed clients and the token managers registered first.")
                    .param("registry", "&mut WebApiRegistry")
                    .body(wraps),
            ));
        }
    }
    unit.source = contracts
        .iter()
        .map(|c| c.source.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Some(unit)
}

/// `registry.add_http_client::<dyn I>(..)?;`
fn client_registration(contract: &InterfaceContract) -> Stmt {
    let implementation = contract.impl_name();
    Stmt::Expr(
        Expr::call(
            format!("registry.add_http_client::<dyn {}>", contract.name),
            vec![
                Expr::raw(format!("{implementation}::BASE_ADDRESS")),
                Expr::raw(format!(
                    "{implementation}::TIMEOUT_SECS.map(Duration::from_secs)"
                )),
                Expr::closure(
                    &["client", "base_address"],
                    Expr::call(
                        "Arc::new",
                        vec![Expr::call(
                            format!("{implementation}::with_base_address"),
                            vec![Expr::ident("client"), Expr::ident("base_address")],
                        )],
                    ),
                ),
            ],
        )
        .try_(),
    )
}

/// `registry.add_transient::<dyn IWrap, _>(..);` when the contract has a usable wrap layer.
fn wrap_registration(contract: &InterfaceContract, cx: &SynthContext<'_>) -> Option<Stmt> {
    let names = wrap_names(contract, cx)?.ok()?;
    let build = Expr::call(
        format!("{}::new", names.implementation),
        vec![
            Expr::call(format!("registry.resolve::<dyn {}>", contract.name), vec![]).try_(),
            Expr::call(format!("registry.resolve::<dyn {}>", names.token_manage), vec![]).try_(),
        ],
    );
    Some(Stmt::Expr(Expr::call(
        format!("registry.add_transient::<dyn {}, _>", names.interface),
        vec![Expr::closure(
            &["registry"],
            Expr::call("Ok", vec![Expr::call("Arc::new", vec![build])]),
        )],
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{rust::RustBackend, Backend};
    use crate::contract::{ClientDescriptor, WrapDescriptor};
    use crate::diagnostics::Diagnostics;
    use crate::synth::SynthOptions;

    fn contract(name: &str, group: Option<&str>, wrap: bool) -> InterfaceContract {
        InterfaceContract {
            name: name.to_string(),
            source: format!("{name}.yaml"),
            ancestors: vec![],
            methods: vec![],
            client: ClientDescriptor {
                registry_group: group.map(str::to_string),
                ..Default::default()
            },
            wrap: wrap.then(WrapDescriptor::default),
        }
    }

    #[test]
    fn test_empty_batch() {
        let options = SynthOptions::default();
        let sink = Diagnostics::new();
        assert!(registration_unit(&[], &SynthContext::new(&options, &sink)).is_none());
    }

    #[test]
    fn test_groups() {
        let options = SynthOptions::default();
        let sink = Diagnostics::new();
        let cx = SynthContext::new(&options, &sink);
        let contracts = vec![
            contract("IUserApi", None, true),
            contract("IAuditApi", Some("admin"), false),
            contract("IOrderApi", None, false),
        ];
        let unit = registration_unit(&contracts, &cx).unwrap();
        assert_eq!(unit.name, REGISTRATION_UNIT);
        assert_eq!(unit.items.len(), 3);

        let text = RustBackend::new().render_items(&unit.items);
        let expected_default = r#"/// Registers the typed clients of the `default` group.
pub fn add_web_api_http_client(registry: &mut WebApiRegistry) -> Result<(), WebApiError> {
    registry.add_http_client::<dyn IUserApi>(UserApi::BASE_ADDRESS, UserApi::TIMEOUT_SECS.map(Duration::from_secs), |client, base_address| Arc::new(UserApi::with_base_address(client, base_address)))?;
    registry.add_http_client::<dyn IOrderApi>(OrderApi::BASE_ADDRESS, OrderApi::TIMEOUT_SECS.map(Duration::from_secs), |client, base_address| Arc::new(OrderApi::with_base_address(client, base_address)))?;
    Ok(())
}
"#;
        assert!(text.starts_with(expected_default), "{text}");
        assert!(text.contains(
            "pub fn add_web_api_http_client_wrap(registry: &mut WebApiRegistry) {\n    \
             registry.add_transient::<dyn IUserApiWrap, _>(|registry| Ok(Arc::new(UserApiWrap::new(registry.resolve::<dyn IUserApi>()?, registry.resolve::<dyn ITokenManage>()?))));"
        ));
        assert!(text.contains("pub fn add_admin_web_api_http_client(registry: &mut WebApiRegistry)"));
        assert!(!text.contains("add_admin_web_api_http_client_wrap"));
    }
}
