//! Output dialect identifiers.
//!
//! # Examples
//!
//! ```
//! use webapigen_core::templates::TemplateKind;
//! use std::str::FromStr;
//!
//! let kind = TemplateKind::from_str("rust_reqwest").unwrap();
//! assert_eq!(kind, TemplateKind::RustReqwest);
//! assert_eq!(kind.to_string(), "rust_reqwest");
//! assert_eq!(TemplateKind::default(), TemplateKind::RustReqwest);
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};

/// Supported template kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Rust clients on top of reqwest
    #[default]
    RustReqwest,
    /// Rust backend with every template taken from a custom directory
    Custom,
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rust_reqwest" => Ok(TemplateKind::RustReqwest),
            "custom" => Ok(TemplateKind::Custom),
            _ => Err(format!("Unknown template kind: {}", s)),
        }
    }
}

impl TemplateKind {
    /// Returns the template identifier as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RustReqwest => "rust_reqwest",
            Self::Custom => "custom",
        }
    }

    /// Returns an iterator over all available template kinds
    pub fn all() -> impl Iterator<Item = Self> {
        use TemplateKind::*;
        [RustReqwest, Custom].iter().copied()
    }

    /// Whether the kind ships embedded templates
    pub fn has_builtin_templates(&self) -> bool {
        matches!(self, Self::RustReqwest)
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            "RUST_REQWEST".parse::<TemplateKind>().unwrap(),
            TemplateKind::RustReqwest
        );
        assert_eq!("custom".parse::<TemplateKind>().unwrap(), TemplateKind::Custom);
        assert!("rust_axum".parse::<TemplateKind>().is_err());
        assert!("".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn test_all_round_trips_through_display() {
        for kind in TemplateKind::all() {
            assert_eq!(kind.to_string().parse::<TemplateKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_serde_name() {
        let kind: TemplateKind = serde_yaml::from_str("rust_reqwest").unwrap();
        assert_eq!(kind, TemplateKind::RustReqwest);
    }
}
