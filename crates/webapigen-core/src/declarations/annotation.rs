//! Structured annotations attached to interfaces, methods and parameters.
//!
//! In a contract document an annotation is written as a bare name
//! (`IgnoreWrap`) or as a single-key map whose value carries the arguments:
//! a scalar is one positional argument, a sequence is a list of positional
//! arguments and a map holds named arguments.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use serde_value::Value as SerdeValue;

/// One annotation with its raw, not yet evaluated arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub positional: Vec<JsonValue>,
    pub named: BTreeMap<String, JsonValue>,
}

impl Annotation {
    /// Annotation without arguments
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Annotation with a single positional argument
    pub fn with_arg(name: impl Into<String>, arg: impl Into<JsonValue>) -> Self {
        Self {
            name: name.into(),
            positional: vec![arg.into()],
            named: BTreeMap::new(),
        }
    }

    /// Annotation with named arguments
    pub fn with_named<I, K>(name: impl Into<String>, named: I) -> Self
    where
        I: IntoIterator<Item = (K, JsonValue)>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            positional: Vec::new(),
            named: named.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Whether this annotation answers to `name`, with or without an `Attribute` suffix.
    pub fn is(&self, name: &str) -> bool {
        self.name == name || self.name.strip_suffix("Attribute") == Some(name)
    }

    /// Argument by position first, then by name.
    pub fn arg(&self, index: usize, key: &str) -> Option<&JsonValue> {
        self.positional
            .get(index)
            .or_else(|| self.named.get(key))
            .filter(|v| !v.is_null())
    }

    /// Named argument only.
    pub fn named_arg(&self, key: &str) -> Option<&JsonValue> {
        self.named.get(key).filter(|v| !v.is_null())
    }

    /// String argument. Numbers and booleans are accepted in their textual form.
    pub fn str_arg(&self, index: usize, key: &str) -> Result<Option<String>, String> {
        self.arg(index, key).map(|v| self.as_text(key, v)).transpose()
    }

    /// String argument looked up by name only.
    pub fn named_str(&self, key: &str) -> Result<Option<String>, String> {
        self.named_arg(key).map(|v| self.as_text(key, v)).transpose()
    }

    /// Boolean argument looked up by name only. Accepts `true`/`false` strings.
    pub fn named_bool(&self, key: &str) -> Result<Option<bool>, String> {
        match self.named_arg(key) {
            None => Ok(None),
            Some(JsonValue::Bool(b)) => Ok(Some(*b)),
            Some(JsonValue::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(self.bad_arg(key, "a boolean")),
            },
            Some(_) => Err(self.bad_arg(key, "a boolean")),
        }
    }

    /// Unsigned integer argument looked up by name only. Accepts numeric strings.
    pub fn named_u64(&self, key: &str) -> Result<Option<u64>, String> {
        match self.named_arg(key) {
            None => Ok(None),
            Some(JsonValue::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.bad_arg(key, "a non-negative integer")),
            Some(JsonValue::String(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.bad_arg(key, "a non-negative integer")),
            Some(_) => Err(self.bad_arg(key, "a non-negative integer")),
        }
    }

    fn as_text(&self, key: &str, value: &JsonValue) -> Result<String, String> {
        match value {
            JsonValue::String(s) => Ok(s.clone()),
            JsonValue::Number(n) => Ok(n.to_string()),
            JsonValue::Bool(b) => Ok(b.to_string()),
            _ => Err(self.bad_arg(key, "a string")),
        }
    }

    fn bad_arg(&self, key: &str, expected: &str) -> String {
        format!("argument '{}' of [{}] must be {}", key, self.name, expected)
    }
}

impl<'de> Deserialize<'de> for Annotation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = SerdeValue::deserialize(deserializer)?;

        match value {
            SerdeValue::String(name) => Ok(Self::marker(name)),
            SerdeValue::Map(map) if map.len() == 1 => {
                let (key, args) = map
                    .into_iter()
                    .next()
                    .ok_or_else(|| serde::de::Error::custom("empty annotation"))?;
                let name = match key {
                    SerdeValue::String(name) => name,
                    _ => return Err(serde::de::Error::custom("annotation name must be a string")),
                };
                let args: JsonValue = args.deserialize_into().map_err(serde::de::Error::custom)?;
                let mut annotation = Self::marker(name);
                match args {
                    JsonValue::Null => {}
                    JsonValue::Array(items) => annotation.positional = items,
                    JsonValue::Object(fields) => annotation.named = fields.into_iter().collect(),
                    scalar => annotation.positional.push(scalar),
                }
                Ok(annotation)
            }
            _ => Err(serde::de::Error::custom(
                "expected an annotation name or a single-key map",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(yaml: &str) -> Annotation {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_marker() {
        let annotation = parse("IgnoreWrap");
        assert_eq!(annotation, Annotation::marker("IgnoreWrap"));
    }

    #[test]
    fn test_scalar_argument() {
        let annotation = parse("Get: \"/users/{id}\"");
        assert_eq!(annotation.name, "Get");
        assert_eq!(annotation.positional, vec![json!("/users/{id}")]);
    }

    #[test]
    fn test_sequence_and_map_arguments() {
        let annotation = parse("ArrayQuery: [ids, ',']");
        assert_eq!(annotation.str_arg(1, "separator").unwrap(), Some(",".into()));

        let annotation = parse("HttpClientApi: { timeout: 30, abstract: true }");
        assert_eq!(annotation.named_u64("timeout").unwrap(), Some(30));
        assert_eq!(annotation.named_bool("abstract").unwrap(), Some(true));
    }

    #[test]
    fn test_bad_argument_types() {
        let annotation = parse("HttpClientApi: { timeout: soon }");
        assert!(annotation.named_u64("timeout").is_err());

        let annotation = parse("Query: { name: [a, b] }");
        assert!(annotation.str_arg(0, "name").is_err());
    }

    #[test]
    fn test_attribute_suffix() {
        assert!(Annotation::marker("QueryAttribute").is("Query"));
        assert!(!Annotation::marker("ArrayQuery").is("Query"));
    }

    #[test]
    fn test_rejects_multi_key_maps() {
        let result: Result<Annotation, _> = serde_yaml::from_str("{ Get: /a, Post: /b }");
        assert!(result.is_err());
    }
}
