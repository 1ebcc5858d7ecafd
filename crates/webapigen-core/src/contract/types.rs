//! Declared parameter and result types.

use serde::Serialize;

/// Broad classification of a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeFamily {
    Text,
    Bool,
    Char,
    Numeric,
    Enum,
    /// Well-known scalar value types (dates, `Uuid`, `Decimal`)
    Scalar,
    Sequence,
    CancellationToken,
    /// Any structured type
    Object,
}

impl TypeFamily {
    /// Families whose values implement `FromStr`
    pub fn parses_from_str(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Bool | Self::Char | Self::Numeric | Self::Scalar
        )
    }
}

const NUMERIC: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
    "f32", "f64",
];

const SCALAR: &[&str] = &[
    "DateTime",
    "NaiveDate",
    "NaiveDateTime",
    "NaiveTime",
    "Uuid",
    "Decimal",
    "Duration",
];

/// A declared type with its classification.
///
/// `Option<T>` is unwrapped into a nullable `T`; sequences keep their element type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    /// Type as declared, e.g. `Option<Vec<String>>`
    pub raw: String,
    /// Declared type without its `Option` wrapper
    pub base: String,
    pub family: TypeFamily,
    pub nullable: bool,
    /// Element type of a sequence
    pub element: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// Classify `raw`; `is_enum` tells whether a name refers to a declared enum.
    pub fn parse(raw: &str, is_enum: impl Fn(&str) -> bool + Copy) -> Self {
        let raw = raw.trim();

        if let Some(inner) = generic_argument(raw, "Option") {
            let inner = Self::parse(inner, is_enum);
            return Self {
                raw: raw.to_string(),
                nullable: true,
                ..inner
            };
        }

        let element = generic_argument(raw, "Vec")
            .or_else(|| slice_element(raw))
            .map(|element| Box::new(Self::parse(element, is_enum)));
        if element.is_some() {
            return Self {
                raw: raw.to_string(),
                base: raw.to_string(),
                family: TypeFamily::Sequence,
                nullable: false,
                element,
            };
        }

        Self {
            raw: raw.to_string(),
            base: raw.to_string(),
            family: classify(raw, is_enum),
            nullable: false,
            element: None,
        }
    }

    /// Bare type name: `chrono::DateTime<Utc>` → `DateTime`
    pub fn name(&self) -> &str {
        type_name(&self.base)
    }

    pub fn is_text(&self) -> bool {
        self.family == TypeFamily::Text
    }

    pub fn is_sequence(&self) -> bool {
        self.family == TypeFamily::Sequence
    }

    pub fn is_float(&self) -> bool {
        matches!(self.base.as_str(), "f32" | "f64")
    }

    /// Whether values are passed by reference (`&str`, `&[T]`, ...)
    pub fn is_borrowed(&self) -> bool {
        self.base.starts_with('&')
    }

    /// Whether the type is simple enough to be sent as a single query value
    pub fn is_simple(&self) -> bool {
        !matches!(
            self.family,
            TypeFamily::Object | TypeFamily::Sequence | TypeFamily::CancellationToken
        )
    }
}

/// Last path segment with generic arguments stripped: `chrono::DateTime<Utc>` → `DateTime`.
fn type_name(raw: &str) -> &str {
    let raw = raw.trim_start_matches('&').trim();
    let raw = raw.strip_prefix("'static ").unwrap_or(raw);
    let head = raw.split('<').next().unwrap_or(raw);
    head.rsplit("::").next().unwrap_or(head).trim()
}

fn classify(raw: &str, is_enum: impl Fn(&str) -> bool) -> TypeFamily {
    let name = type_name(raw);
    match name {
        "String" | "str" | "Cow" => TypeFamily::Text,
        "bool" => TypeFamily::Bool,
        "char" => TypeFamily::Char,
        "CancellationToken" => TypeFamily::CancellationToken,
        _ if NUMERIC.contains(&name) => TypeFamily::Numeric,
        _ if SCALAR.contains(&name) => TypeFamily::Scalar,
        _ if is_enum(name) => TypeFamily::Enum,
        _ => TypeFamily::Object,
    }
}

/// `T` of `Wrapper<T>`, also when the wrapper is path-qualified.
fn generic_argument<'a>(raw: &'a str, wrapper: &str) -> Option<&'a str> {
    let open = raw.find('<')?;
    if type_name(&raw[..open]) != wrapper || !raw.ends_with('>') {
        return None;
    }
    Some(raw[open + 1..raw.len() - 1].trim())
}

/// `T` of `[T]` or `&[T]`.
fn slice_element(raw: &str) -> Option<&str> {
    let raw = raw.trim_start_matches('&').trim();
    raw.strip_prefix('[')?.strip_suffix(']').map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> TypeRef {
        TypeRef::parse(raw, |name| name == "UserStatus")
    }

    #[test]
    fn test_families() {
        assert_eq!(parse("String").family, TypeFamily::Text);
        assert_eq!(parse("&str").family, TypeFamily::Text);
        assert_eq!(parse("u16").family, TypeFamily::Numeric);
        assert_eq!(parse("chrono::DateTime<Utc>").family, TypeFamily::Scalar);
        assert_eq!(parse("UserStatus").family, TypeFamily::Enum);
        assert_eq!(parse("UserFilter").family, TypeFamily::Object);
        assert_eq!(
            parse("&tokio_util::sync::CancellationToken").family,
            TypeFamily::CancellationToken
        );
    }

    #[test]
    fn test_option_unwraps() {
        let ty = parse("Option<i64>");
        assert!(ty.nullable);
        assert_eq!(ty.base, "i64");
        assert_eq!(ty.raw, "Option<i64>");
        assert_eq!(ty.family, TypeFamily::Numeric);
    }

    #[test]
    fn test_sequences() {
        let ty = parse("Option<Vec<String>>");
        assert!(ty.nullable && ty.is_sequence());
        assert_eq!(ty.element.as_ref().map(|e| e.family), Some(TypeFamily::Text));

        let slice = parse("&[UserStatus]");
        assert!(slice.is_sequence() && slice.is_borrowed());
        assert_eq!(slice.element.map(|e| e.family), Some(TypeFamily::Enum));
    }
}
