//! webapigen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;
use webapigen_core::{Config, GenerationReport, Severity, TemplateKind};

/// Log filter used when `RUST_LOG` is not set. Diagnostics are printed by the
/// CLI itself, so their log mirror is switched off.
const DEFAULT_LOG_FILTER: &str = "info,webapigen_core::diagnostics=off";

#[derive(Parser)]
#[command(name = "webapigen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate typed HTTP clients from contract documents
    Generate {
        #[command(flatten)]
        contracts: ContractArgs,
        /// Output directory for generated code
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Project name
        #[arg(long)]
        project_name: Option<String>,
        /// Template set to use for code generation
        #[arg(long)]
        template_kind: Option<TemplateKind>,
        /// Custom template directory overriding the embedded templates
        #[arg(long)]
        template_dir: Option<PathBuf>,
        /// Base address for interfaces that declare none
        #[arg(long)]
        base_url: Option<Url>,
        /// Token manager used by wrap layers that name none
        #[arg(long)]
        default_token_manage: Option<String>,
        /// Extra `use` path added to every unit (repeatable)
        #[arg(long = "import")]
        imports: Vec<String>,
        /// Do not write the runtime support unit
        #[arg(long)]
        no_support: bool,
        /// Do not write the module index
        #[arg(long)]
        no_module_index: bool,
        /// Render everything but write nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Analyze contract documents and print the diagnostics
    Check {
        #[command(flatten)]
        contracts: ContractArgs,
    },
}

/// Arguments shared by every subcommand
#[derive(clap::Args, Debug)]
pub struct ContractArgs {
    /// Path or URL of a contract document (YAML or JSON, repeatable)
    ///
    /// Example: --contract contracts/users.yaml
    /// Example: --contract https://example.com/contracts/users.json
    #[arg(long = "contract")]
    contract_paths: Vec<String>,
    /// Configuration file (.yaml, .yml, .toml or .json); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Only generate these interfaces (repeatable)
    #[arg(long = "include")]
    include_interfaces: Vec<String>,
    /// Leave these interfaces out (repeatable)
    #[arg(long = "exclude")]
    exclude_interfaces: Vec<String>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Exit with an error when warnings were reported
    #[arg(long)]
    fail_on_warnings: bool,
}

impl ContractArgs {
    /// Configuration file (if any) with the command-line values layered on top
    async fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .await
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => Config::new("webapigen", String::new(), "generated"),
        };

        if !self.contract_paths.is_empty() {
            config.contract_paths = self.contract_paths.clone();
        }
        config.contract_paths.retain(|path| !path.trim().is_empty());
        if config.contract_paths.is_empty() {
            anyhow::bail!("No contract documents given; pass --contract or --config");
        }
        if !self.include_interfaces.is_empty() {
            config.include_interfaces = self.include_interfaces.clone();
        }
        if !self.exclude_interfaces.is_empty() {
            config.exclude_interfaces = self.exclude_interfaces.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Generate {
            contracts,
            output_dir,
            project_name,
            template_kind,
            template_dir,
            base_url,
            default_token_manage,
            imports,
            no_support,
            no_module_index,
            dry_run,
        } => {
            let mut config = contracts.load_config().await?;
            if let Some(output_dir) = output_dir {
                config.output_dir = output_dir.to_string_lossy().to_string();
            }
            if let Some(project_name) = project_name {
                config.project_name = project_name.clone();
            }
            if let Some(template_kind) = template_kind {
                config.template_kind = template_kind.to_string();
            }
            if let Some(template_dir) = template_dir {
                config.template_dir = Some(template_dir.to_string_lossy().to_string());
            }
            if let Some(base_url) = base_url {
                config.base_url = Some(base_url.clone());
            }
            if let Some(token_manage) = default_token_manage {
                config.default_token_manage = token_manage.clone();
            }
            config.imports.extend(imports.iter().cloned());
            config.emit_support &= !no_support;
            config.emit_module_index &= !no_module_index;
            tracing::debug!(?config, "Resolved configuration");

            let report = webapigen_core::generate(&config, *dry_run)
                .await
                .context("Generation failed")?;
            print_report(&report, contracts.json)?;
            if !contracts.json {
                if *dry_run {
                    for unit in &report.units {
                        println!("would write {}", unit.file_name);
                    }
                } else {
                    println!(
                        "Generated {} interfaces into {}",
                        report.interfaces.len(),
                        config.output_dir
                    );
                }
            }
            exit_status(&report, contracts.fail_on_warnings)
        }
        Commands::Check { contracts } => {
            let config = contracts.load_config().await?;
            let report = webapigen_core::check(&config)
                .await
                .context("Analysis failed")?;
            print_report(&report, contracts.json)?;
            if !contracts.json {
                println!("Checked {} interfaces", report.interfaces.len());
            }
            exit_status(&report, contracts.fail_on_warnings)
        }
    }
}

fn print_report(report: &GenerationReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for diagnostic in &report.diagnostics {
        eprintln!("{diagnostic}");
    }
    Ok(())
}

fn exit_status(report: &GenerationReport, fail_on_warnings: bool) -> anyhow::Result<()> {
    let errors = report.count(Severity::Error);
    let warnings = report.count(Severity::Warning);
    if errors > 0 {
        anyhow::bail!("{errors} error(s) and {warnings} warning(s) reported");
    }
    if fail_on_warnings && warnings > 0 {
        anyhow::bail!("{warnings} warning(s) reported");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from([
            "webapigen",
            "generate",
            "--contract",
            "a.yaml",
            "--contract",
            "b.yaml",
            "--exclude",
            "IAuditApi",
            "--template-kind",
            "rust_reqwest",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Generate {
                contracts,
                template_kind,
                dry_run,
                ..
            } => {
                assert_eq!(contracts.contract_paths, vec!["a.yaml", "b.yaml"]);
                assert_eq!(contracts.exclude_interfaces, vec!["IAuditApi"]);
                assert_eq!(template_kind, Some(TemplateKind::RustReqwest));
                assert!(dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_flags_override_config_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("webapigen.toml");
        let mut file_config = Config::new("users", "users.yaml", "out");
        file_config.include_interfaces = vec!["IUserApi".to_string()];
        file_config.save(&path).await?;

        let args = ContractArgs {
            contract_paths: vec!["other.yaml".to_string()],
            config: Some(path),
            include_interfaces: Vec::new(),
            exclude_interfaces: vec!["IAuditApi".to_string()],
            json: false,
            fail_on_warnings: false,
        };
        let config = args.load_config().await?;
        assert_eq!(config.project_name, "users");
        assert_eq!(config.contract_paths, vec!["other.yaml"]);
        assert_eq!(config.include_interfaces, vec!["IUserApi"]);
        assert_eq!(config.exclude_interfaces, vec!["IAuditApi"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_contracts_required() {
        let args = ContractArgs {
            contract_paths: Vec::new(),
            config: None,
            include_interfaces: Vec::new(),
            exclude_interfaces: Vec::new(),
            json: false,
            fail_on_warnings: false,
        };
        assert!(args.load_config().await.is_err());
    }
}
