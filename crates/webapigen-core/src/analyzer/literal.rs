//! Default-value literals, rendered per type family.

use serde_json::Value as JsonValue;

use crate::contract::{DefaultLiteral, TypeFamily, TypeRef};
use crate::declarations::EnumDecl;

/// Classify a declared default against the parameter type.
///
/// Values that do not fit their family fall back to [`DefaultLiteral::Text`].
pub fn default_literal(
    value: &JsonValue,
    ty: &TypeRef,
    enum_decl: Option<&EnumDecl>,
) -> DefaultLiteral {
    if value.is_null() {
        return DefaultLiteral::Null;
    }

    match ty.family {
        TypeFamily::Text => DefaultLiteral::Str(textual(value)),
        TypeFamily::Bool => match value {
            JsonValue::Bool(b) => DefaultLiteral::Bool(*b),
            JsonValue::String(s) if s.eq_ignore_ascii_case("true") => DefaultLiteral::Bool(true),
            JsonValue::String(s) if s.eq_ignore_ascii_case("false") => DefaultLiteral::Bool(false),
            other => DefaultLiteral::Text(textual(other)),
        },
        TypeFamily::Char => {
            let text = textual(value);
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => DefaultLiteral::Char(c),
                _ => DefaultLiteral::Text(text),
            }
        }
        TypeFamily::Numeric => match value {
            JsonValue::Number(n) => DefaultLiteral::Number(n.to_string()),
            JsonValue::String(s) if s.trim().parse::<f64>().is_ok() => {
                DefaultLiteral::Number(s.trim().to_string())
            }
            other => DefaultLiteral::Text(textual(other)),
        },
        TypeFamily::Enum => enum_literal(value, ty, enum_decl),
        _ => DefaultLiteral::Text(textual(value)),
    }
}

/// Member name when one matches, else the numeric value.
fn enum_literal(value: &JsonValue, ty: &TypeRef, enum_decl: Option<&EnumDecl>) -> DefaultLiteral {
    let enum_name = enum_decl.map_or_else(|| ty.base.clone(), |decl| decl.name.clone());
    let members = enum_decl.map(EnumDecl::values).unwrap_or_default();

    let numeric = match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    if let Some(number) = numeric {
        return match members.iter().find(|(_, v)| *v == number) {
            Some((member, _)) => DefaultLiteral::EnumMember {
                enum_name,
                member: member.to_string(),
            },
            None => DefaultLiteral::EnumNumeric {
                enum_name,
                value: number.to_string(),
            },
        };
    }

    // `UserStatus.Active` and `UserStatus::Active` name the member too
    let text = textual(value);
    let member = text.rsplit(['.', ':']).next().unwrap_or(&text);
    match members.iter().find(|(name, _)| *name == member) {
        Some((name, _)) => DefaultLiteral::EnumMember {
            enum_name,
            member: name.to_string(),
        },
        None => DefaultLiteral::Text(text),
    }
}

fn textual(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status() -> EnumDecl {
        serde_yaml::from_str("name: UserStatus\nmembers: [{ name: Active }, { name: Disabled }]")
            .unwrap()
    }

    fn ty(raw: &str) -> TypeRef {
        TypeRef::parse(raw, |name| name == "UserStatus")
    }

    #[test]
    fn test_primitive_families() {
        assert_eq!(
            default_literal(&json!("hi"), &ty("String"), None).display(),
            "\"hi\""
        );
        assert_eq!(
            default_literal(&json!(true), &ty("bool"), None),
            DefaultLiteral::Bool(true)
        );
        assert_eq!(
            default_literal(&json!("'"), &ty("char"), None).display(),
            "'\\''"
        );
        assert_eq!(
            default_literal(&json!(25), &ty("u32"), None),
            DefaultLiteral::Number("25".into())
        );
        assert_eq!(default_literal(&json!(null), &ty("Option<u32>"), None), DefaultLiteral::Null);
    }

    #[test]
    fn test_enum_members() {
        let decl = status();
        assert_eq!(
            default_literal(&json!(1), &ty("UserStatus"), Some(&decl)).display(),
            "UserStatus::Disabled"
        );
        assert_eq!(
            default_literal(&json!("UserStatus.Active"), &ty("UserStatus"), Some(&decl)).display(),
            "UserStatus::Active"
        );
        assert_eq!(
            default_literal(&json!(7), &ty("UserStatus"), Some(&decl)),
            DefaultLiteral::EnumNumeric {
                enum_name: "UserStatus".into(),
                value: "7".into()
            }
        );
    }

    #[test]
    fn test_other_types_are_quoted_text() {
        assert_eq!(
            default_literal(&json!("2024-01-01"), &ty("NaiveDate"), None).display(),
            "\"2024-01-01\""
        );
        assert_eq!(
            default_literal(&json!(12), &ty("UserFilter"), None),
            DefaultLiteral::Text("12".into())
        );
    }
}
