//! Template directory resolution.
//!
//! Template directories override the embedded templates. They are looked up in:
//! 1. The directory passed explicitly (`--template-dir`)
//! 2. `WEBAPIGEN_TEMPLATE_DIR`
//! 3. `./templates`
//! 4. `~/.webapigen/templates`
//!
//! Inside the root, templates of a kind live in a sub-directory named after
//! the kind (`templates/rust_reqwest/unit.rs.tera`); a path that already ends
//! with the kind name is used as is.

use std::io;
use std::path::{Path, PathBuf};

use super::TemplateKind;

/// Environment variable naming the template root
pub const TEMPLATE_DIR_ENV: &str = "WEBAPIGEN_TEMPLATE_DIR";

/// A resolved template directory
#[derive(Debug, Clone)]
pub struct TemplateDir {
    /// Root directory containing the templates
    root_dir: PathBuf,
    /// Path to the specific template directory (root_dir/template_name)
    template_path: PathBuf,
    kind: TemplateKind,
}

impl TemplateDir {
    /// Create a new TemplateDir with explicit paths
    pub fn new(root_dir: PathBuf, template_path: PathBuf, kind: TemplateKind) -> Self {
        Self {
            root_dir,
            template_path,
            kind,
        }
    }

    /// Returns a displayable version of the template path
    pub fn display(&self) -> std::path::Display<'_> {
        self.template_path.display()
    }

    /// Resolve the template directory for `kind`.
    ///
    /// An explicit directory must exist. Without one, the standard locations
    /// are searched and `Ok(None)` means the embedded templates apply.
    pub fn discover(kind: TemplateKind, custom_dir: Option<&Path>) -> io::Result<Option<Self>> {
        let root_dir = match custom_dir {
            Some(dir) => {
                if !dir.exists() {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("Template directory not found: {}", dir.display()),
                    ));
                }
                dir.to_path_buf()
            }
            None => match Self::find_template_base_dir() {
                Some(dir) => dir,
                None => return Ok(None),
            },
        };

        let ends_with_kind = root_dir
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name == kind.as_str())
            .unwrap_or(false);

        let (root_dir, template_path) = if ends_with_kind {
            let root = root_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root_dir.clone());
            (root, root_dir)
        } else {
            let template_path = root_dir.join(kind.as_str());
            (root_dir, template_path)
        };

        if !template_path.exists() {
            if custom_dir.is_some() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Template directory not found: {}", template_path.display()),
                ));
            }
            log::debug!(
                "No {} templates under {}, using embedded templates",
                kind,
                root_dir.display()
            );
            return Ok(None);
        }

        Ok(Some(Self::new(root_dir, template_path, kind)))
    }

    /// Find the base template directory by checking standard locations
    fn find_template_base_dir() -> Option<PathBuf> {
        // 1. Check environment variable
        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            let path = PathBuf::from(dir);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check current directory
        let templates_dir = PathBuf::from(".").join("templates");
        if templates_dir.exists() {
            return Some(templates_dir);
        }

        // 3. Check in the user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            let templates_dir = home_dir.join(".webapigen").join("templates");
            if templates_dir.exists() {
                return Some(templates_dir);
            }
        }

        None
    }

    /// Get the root directory containing the templates
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the template kind
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Get the path to the specific template directory
    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Check if the template directory exists
    pub fn exists(&self) -> bool {
        self.template_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_root() {
        let temp_dir = tempdir().unwrap();
        let template_dir = temp_dir.path().join("templates/rust_reqwest");
        fs::create_dir_all(&template_dir).unwrap();

        let found = TemplateDir::discover(
            TemplateKind::RustReqwest,
            Some(temp_dir.path().join("templates").as_path()),
        )
        .unwrap()
        .unwrap();
        assert_eq!(found.template_path(), template_dir.as_path());
        assert_eq!(found.kind(), TemplateKind::RustReqwest);
    }

    #[test]
    fn test_explicit_kind_dir() {
        let temp_dir = tempdir().unwrap();
        let template_dir = temp_dir.path().join("rust_reqwest");
        fs::create_dir_all(&template_dir).unwrap();

        let found = TemplateDir::discover(TemplateKind::RustReqwest, Some(&template_dir))
            .unwrap()
            .unwrap();
        assert_eq!(found.template_path(), template_dir.as_path());
        assert_eq!(found.root_dir(), temp_dir.path());
    }

    #[test]
    fn test_missing_explicit_dir() {
        let result = TemplateDir::discover(TemplateKind::RustReqwest, Some(Path::new("/nonexistent")));
        assert!(result.is_err());

        let temp_dir = tempdir().unwrap();
        let result = TemplateDir::discover(TemplateKind::Custom, Some(temp_dir.path()));
        assert!(result.is_err());
    }
}
