//! Naming conventions shared by the synthesis stages.
//!
//! Everything here is a pure string function: no state, no configuration.

/// Trailing marker of asynchronous method names.
pub const ASYNC_SUFFIX: &str = "Async";

/// Convert a string to snake_case
///
/// Acronyms stay together (`HTTPResponse` → `http_response`) and `-`, `.`,
/// spaces and repeated underscores collapse into a single separator.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.map_or(false, char::is_lowercase),
                _ => false,
            };
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch.is_alphanumeric() {
            result.push(ch);
        } else if matches!(ch, '-' | '_' | ' ' | '.') && !result.is_empty() && !result.ends_with('_')
        {
            result.push('_');
        }
    }

    result.trim_matches('_').to_string()
}

/// snake_case for identifiers: leading and trailing underscores are kept.
///
/// `_method` stays `_method` and `queryParam_` becomes `query_param_`, so a
/// suffixed name never collapses onto its unsuffixed twin.
pub fn to_snake_ident(s: &str) -> String {
    let core = s.trim_matches('_');
    if core.is_empty() {
        return s.to_string();
    }
    let start = s.len() - s.trim_start_matches('_').len();
    let end = s.len() - s.trim_end_matches('_').len();
    format!("{}{}{}", &s[..start], to_snake_case(core), &s[s.len() - end..])
}

/// Convert a string to UpperCamelCase (PascalCase)
pub fn to_upper_camel_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Returns `name` without its interface marker, if it has one.
///
/// Only an `I` followed by an uppercase letter counts, so `Invoice` keeps its
/// first letter.
pub fn strip_interface_prefix(name: &str) -> Option<&str> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some('I'), Some(second)) if second.is_uppercase() => Some(&name[1..]),
        _ => None,
    }
}

/// Name of the type implementing an interface: strip the leading `I`, else append `Impl`.
pub fn implementation_name(interface: &str) -> String {
    match strip_interface_prefix(interface) {
        Some(stripped) => stripped.to_string(),
        None => format!("{interface}Impl"),
    }
}

/// Name of the wrap interface for `interface`, honoring an explicit override.
pub fn wrap_interface_name(interface: &str, name_override: Option<&str>) -> String {
    match name_override {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => format!("{interface}Wrap"),
    }
}

/// Insert a token-scope infix into a method name.
///
/// The infix lands right before a trailing `Async` suffix
/// (`GetUserAsync` → `GetUser_Tenant_Async`); names without the suffix get
/// it prepended (`GetUser` → `Tenant_GetUser`).
pub fn insert_scope_infix(name: &str, scope: &str) -> String {
    match name.strip_suffix(ASYNC_SUFFIX) {
        Some(base) if !base.is_empty() => format!("{base}_{scope}_{ASYNC_SUFFIX}"),
        _ => format!("{scope}_{name}"),
    }
}

/// Registration entry point name for a registry group: `Add<Group>WebApiHttpClient[Wrap]`.
pub fn registration_entry_name(group: Option<&str>, wrap: bool) -> String {
    let group = group.map(to_upper_camel_case).unwrap_or_default();
    let suffix = if wrap { "Wrap" } else { "" };
    format!("Add{group}WebApiHttpClient{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_ident_keeps_edge_underscores() {
        assert_eq!(to_snake_ident("query_"), "query_");
        assert_eq!(to_snake_ident("body__"), "body__");
        assert_eq!(to_snake_ident("_method"), "_method");
        assert_eq!(to_snake_ident("userId_"), "user_id_");
        assert_eq!(to_snake_ident("Query"), "query");
        assert_eq!(to_snake_ident("_"), "_");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("FindPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("find-pets-by-status"), "find_pets_by_status");
        assert_eq!(to_snake_case("find_pets_by_status"), "find_pets_by_status");
        assert_eq!(to_snake_case("HTTPResponse"), "http_response");
        assert_eq!(to_snake_case("getHTTPResponse"), "get_http_response");
        assert_eq!(to_snake_case("get HTTP Response"), "get_http_response");
        assert_eq!(to_snake_case("IUserApi"), "i_user_api");
        assert_eq!(to_snake_case("IUserApi.WrapImpl"), "i_user_api_wrap_impl");
        assert_eq!(to_snake_case("GetUser_Tenant_Async"), "get_user_tenant_async");
    }

    #[test]
    fn test_to_upper_camel_case() {
        assert_eq!(
            to_upper_camel_case("find_pets_by_status"),
            "FindPetsByStatus"
        );
        assert_eq!(to_upper_camel_case("findPetsByStatus"), "FindPetsByStatus");
        assert_eq!(
            to_upper_camel_case("FIND_PETS_BY_STATUS"),
            "FindPetsByStatus"
        );
        assert_eq!(to_upper_camel_case("admin"), "Admin");
        assert_eq!(to_upper_camel_case("billing-core"), "BillingCore");
    }

    #[test]
    fn test_implementation_name() {
        assert_eq!(implementation_name("IUserApi"), "UserApi");
        assert_eq!(implementation_name("Invoices"), "InvoicesImpl");
        assert_eq!(implementation_name("UserApi"), "UserApiImpl");
        assert_eq!(implementation_name("I"), "IImpl");
    }

    #[test]
    fn test_wrap_interface_name() {
        assert_eq!(wrap_interface_name("IUserApi", None), "IUserApiWrap");
        assert_eq!(wrap_interface_name("IUserApi", Some("  ")), "IUserApiWrap");
        assert_eq!(wrap_interface_name("IUserApi", Some("IUsers")), "IUsers");
    }

    #[test]
    fn test_insert_scope_infix() {
        assert_eq!(insert_scope_infix("GetUserAsync", "Tenant"), "GetUser_Tenant_Async");
        assert_eq!(insert_scope_infix("GetUserAsync", "User"), "GetUser_User_Async");
        assert_eq!(insert_scope_infix("GetUser", "Tenant"), "Tenant_GetUser");
        assert_eq!(insert_scope_infix("Async", "User"), "User_Async");
    }

    #[test]
    fn test_registration_entry_name() {
        assert_eq!(registration_entry_name(None, false), "AddWebApiHttpClient");
        assert_eq!(registration_entry_name(None, true), "AddWebApiHttpClientWrap");
        assert_eq!(
            registration_entry_name(Some("admin"), true),
            "AddAdminWebApiHttpClientWrap"
        );
    }
}
