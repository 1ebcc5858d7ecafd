//! Template system for the unit envelopes and the support units

// Internal imports (std, crate)
use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::task;

use crate::{error::Result, manifest::TemplateManifest};

use super::{TemplateDir, TemplateKind};

// External imports (alphabetized)
use serde::Serialize;
use tera::{Context, Tera};

/// Envelope wrapped around every rendered unit
pub const UNIT_TEMPLATE: &str = "unit.rs.tera";
/// Runtime support unit
pub const SUPPORT_TEMPLATE: &str = "support.rs.tera";
/// Module index declaring every unit
pub const MODULE_INDEX_TEMPLATE: &str = "mod.rs.tera";

const BUILTIN_RUST_REQWEST: &[(&str, &str)] = &[
    (
        UNIT_TEMPLATE,
        include_str!("../../templates/rust_reqwest/unit.rs.tera"),
    ),
    (
        SUPPORT_TEMPLATE,
        include_str!("../../templates/rust_reqwest/support.rs.tera"),
    ),
    (
        MODULE_INDEX_TEMPLATE,
        include_str!("../../templates/rust_reqwest/mod.rs.tera"),
    ),
];

/// Context of the unit envelope
#[derive(Debug, Clone, Serialize)]
pub struct UnitContext<'a> {
    pub unit_name: &'a str,
    /// Declaration the unit came from
    pub source: &'a str,
    pub generator: &'static str,
    pub version: &'static str,
    /// Extra `use` paths
    pub imports: &'a [String],
    /// Rendered items
    pub body: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct IndexContext<'a> {
    generator: &'static str,
    version: &'static str,
    modules: &'a [String],
}

/// Manages loading and rendering of code generation templates
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Cached Tera template engine instance
    tera: Arc<Tera>,
    kind: TemplateKind,
    /// Directory overriding the embedded templates, if any
    template_dir: Option<TemplateDir>,
    manifest: TemplateManifest,
}

impl TemplateManager {
    /// Create a TemplateManager for `template_kind`.
    ///
    /// Embedded templates are loaded first; every `.tera` file of the
    /// template directory (explicit or discovered) replaces the embedded
    /// template of the same name.
    pub async fn new(template_kind: TemplateKind, template_dir: Option<PathBuf>) -> Result<Self> {
        let template_dir = TemplateDir::discover(template_kind, template_dir.as_deref())?;

        let mut tera = Tera::default();
        if template_kind.has_builtin_templates() {
            tera.add_raw_templates(BUILTIN_RUST_REQWEST.iter().copied())?;
        }

        let manifest = match &template_dir {
            Some(dir) => {
                log::debug!("Loading templates from {}", dir.display());
                let files = Self::discover_template_files(dir.template_path()).await?;
                let named: Vec<(PathBuf, Option<String>)> = files
                    .into_iter()
                    .map(|path| {
                        let name = path
                            .strip_prefix(dir.template_path())
                            .unwrap_or(&path)
                            .to_string_lossy()
                            .replace('\\', "/");
                        (path, Some(name))
                    })
                    .collect();
                tera.add_template_files(named)?;
                TemplateManifest::load_from_dir(dir.template_path()).await?
            }
            None => TemplateManifest::default(),
        };

        for required in [UNIT_TEMPLATE, SUPPORT_TEMPLATE, MODULE_INDEX_TEMPLATE] {
            if !tera.get_template_names().any(|name| name == required) {
                return Err(crate::Error::template(format!(
                    "Template set '{}' has no {}",
                    template_kind, required
                )));
            }
        }

        Ok(Self {
            tera: Arc::new(tera),
            kind: template_kind,
            template_dir,
            manifest,
        })
    }

    /// Get the template kind this template manager is configured for
    pub fn template_kind(&self) -> TemplateKind {
        self.kind
    }

    /// Get the overriding template directory, if any
    pub fn template_dir(&self) -> Option<&TemplateDir> {
        self.template_dir.as_ref()
    }

    pub fn manifest(&self) -> &TemplateManifest {
        &self.manifest
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Discovers all `.tera` files under `dir`.
    ///
    /// Runs on the blocking pool to keep filesystem walks off the runtime.
    pub async fn discover_template_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let dir_buf = dir.to_path_buf();

        task::spawn_blocking(move || -> Result<Vec<PathBuf>> {
            fn walk_dir(dir: &Path, templates: &mut Vec<PathBuf>) -> std::io::Result<()> {
                for entry in std::fs::read_dir(dir)? {
                    let path = entry?.path();
                    if path.is_dir() {
                        walk_dir(&path, templates)?;
                    } else if path.extension().and_then(|e| e.to_str()) == Some("tera") {
                        templates.push(path);
                    }
                }
                Ok(())
            }

            let mut templates = Vec::new();
            walk_dir(&dir_buf, &mut templates)?;
            templates.sort();
            Ok(templates)
        })
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }

    /// Wrap rendered items into the unit envelope.
    ///
    /// The envelope supplies the final newline, so trailing whitespace of the
    /// body is dropped.
    pub fn render_unit(&self, context: &UnitContext<'_>) -> Result<String> {
        let context = Context::from_serialize(UnitContext {
            body: context.body.trim_end(),
            ..*context
        })?;
        Ok(self.tera.render(UNIT_TEMPLATE, &context)?)
    }

    /// Render the runtime support unit.
    pub fn render_support(&self) -> Result<String> {
        let mut context = Context::new();
        context.insert("generator", crate::GENERATOR);
        context.insert("version", crate::VERSION);
        Ok(self.tera.render(SUPPORT_TEMPLATE, &context)?)
    }

    /// Render the module index for `modules`.
    pub fn render_module_index(&self, modules: &[String]) -> Result<String> {
        let context = Context::from_serialize(IndexContext {
            generator: crate::GENERATOR,
            version: crate::VERSION,
            modules,
        })?;
        Ok(self.tera.render(MODULE_INDEX_TEMPLATE, &context)?)
    }

    /// Run the manifest's `pre_generate` commands in `output_path`.
    pub async fn execute_pre_generation_hooks(&self, output_path: &Path) -> Result<()> {
        run_commands("pre-generation", &self.manifest.hooks.pre_generate, output_path).await
    }

    /// Run the manifest's `post_generate` commands in `output_path`.
    pub async fn execute_post_generation_hooks(&self, output_path: &Path) -> Result<()> {
        run_commands("post-generation", &self.manifest.hooks.post_generate, output_path).await
    }
}

async fn run_commands(stage: &str, commands: &[String], output_path: &Path) -> Result<()> {
    use tokio::process::Command as AsyncCommand;

    for command in commands {
        log::info!("Running {} hook: {}", stage, command);
        let output = AsyncCommand::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(output_path)
            .output()
            .await
            .map_err(|e| {
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("Failed to execute {} hook '{}': {}", stage, command, e),
                )
            })?;

        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "{} hook '{}' failed with status {}\n{}{}",
                    stage,
                    command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr),
                    String::from_utf8_lossy(&output.stdout)
                ),
            )
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedded_templates() -> Result<()> {
        let manager = TemplateManager::new(TemplateKind::RustReqwest, None).await?;
        assert!(manager.has_template(UNIT_TEMPLATE));

        let imports = vec!["crate::models::*".to_string()];
        let text = manager.render_unit(&UnitContext {
            unit_name: "UserApi",
            source: "users.yaml",
            generator: crate::GENERATOR,
            version: crate::VERSION,
            imports: &imports,
            body: "pub struct UserApi;\n",
        })?;
        assert!(text.starts_with("//! UserApi\n"));
        assert!(text.contains("use crate::models::*;\n"));
        assert!(text.ends_with("use crate::models::*;\n\npub struct UserApi;\n"));

        let support = manager.render_support()?;
        assert!(support.contains("pub enum WebApiError"));
        assert!(!support.contains("{% raw %}"));
        // sync clients work with and without a multi-threaded runtime
        assert!(support.contains("match Handle::try_current() {"));
        assert!(support.contains(
            "Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {"
        ));
        assert!(support.contains("Err(_) => run_detached(future),"));
        assert!(!support.contains("Handle::current()"));

        let index = manager.render_module_index(&["user_api".into(), "web_api_support".into()])?;
        assert!(index.contains("mod user_api;\npub use user_api::*;\nmod web_api_support;"));
        Ok(())
    }

    #[tokio::test]
    async fn test_directory_overrides_embedded() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let template_dir = temp_dir.path().join("rust_reqwest");
        tokio::fs::create_dir_all(&template_dir).await?;
        tokio::fs::write(template_dir.join(UNIT_TEMPLATE), "// {{ unit_name }}\n{{ body }}").await?;
        tokio::fs::write(
            template_dir.join("manifest.yaml"),
            "name: acme\nhooks:\n  post_generate: touch formatted\n",
        )
        .await?;

        let manager =
            TemplateManager::new(TemplateKind::RustReqwest, Some(temp_dir.path().to_path_buf()))
                .await?;
        assert_eq!(manager.manifest().name, "acme");

        let text = manager.render_unit(&UnitContext {
            unit_name: "UserApi",
            source: "users.yaml",
            generator: crate::GENERATOR,
            version: crate::VERSION,
            imports: &[],
            body: "body",
        })?;
        assert_eq!(text, "// UserApi\nbody");

        let output = tempfile::tempdir()?;
        manager.execute_post_generation_hooks(output.path()).await?;
        assert!(output.path().join("formatted").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_custom_kind_needs_all_templates() {
        let temp_dir = tempfile::tempdir().unwrap();
        let template_dir = temp_dir.path().join("custom");
        tokio::fs::create_dir_all(&template_dir).await.unwrap();
        tokio::fs::write(template_dir.join(UNIT_TEMPLATE), "{{ body }}").await.unwrap();

        let result = TemplateManager::new(TemplateKind::Custom, Some(template_dir)).await;
        assert!(matches!(result, Err(crate::Error::Template(_))));
    }
}
