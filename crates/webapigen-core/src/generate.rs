//! Generation pipeline: load, analyze, synthesize, render, write.
//!
//! Interfaces are emitted in parallel on the blocking pool. A failing or
//! panicking interface becomes a [`GENERATION_FAILED`] diagnostic; the rest of
//! the batch is still written.
//!
//! [`GENERATION_FAILED`]: crate::diagnostics::GENERATION_FAILED

// Internal imports (std, crate)
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    analyzer::ContractAnalyzer,
    backend::{backend_for, Backend},
    config::Config,
    contract::InterfaceContract,
    declarations::DeclarationSet,
    diagnostics::{self, Diagnostic, DiagnosticSink, Diagnostics, Location, Severity},
    error::Result,
    ir::Unit,
    output::{GeneratedUnit, MemoryOutput, OutputSink},
    synth::{self, SynthContext, SynthOptions, MODULE_INDEX_UNIT, SUPPORT_UNIT},
    templates::{TemplateManager, UnitContext},
};

// External imports (alphabetized)
use futures::future::join_all;
use serde::Serialize;
use tokio::task;

/// `use` paths every generated unit starts with
pub const DEFAULT_IMPORTS: &[&str] = &[
    "std::sync::Arc",
    "std::time::Duration",
    "async_trait::async_trait",
];

/// Outcome of a generation or check run
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    /// Interfaces that were analyzed into contracts
    pub interfaces: Vec<String>,
    /// Rendered units, ordered by file name
    pub units: Vec<GeneratedUnit>,
    /// Files written; empty for dry runs and checks
    pub written: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.count(Severity::Warning) > 0
    }
}

/// Main entry point for code generation.
///
/// With `dry_run` every unit is rendered but nothing is written and no
/// template hooks run.
pub async fn generate(config: &Config, dry_run: bool) -> Result<GenerationReport> {
    log::info!(
        "Generating {} from {} contract document(s)",
        config.project_name,
        config.contract_paths.len()
    );

    // 1. Load and analyze the declarations
    let sink = Arc::new(Diagnostics::new());
    let contracts = analyze(config, sink.as_ref()).await?;

    // 2. Initialize template manager and backend
    let template_kind = config.template_kind()?;
    let template_dir = config.template_dir.as_ref().map(PathBuf::from);
    let manager = TemplateManager::new(template_kind, template_dir).await?;

    let mut imports: Vec<String> = DEFAULT_IMPORTS.iter().map(|i| i.to_string()).collect();
    for import in &config.imports {
        if !imports.contains(import) {
            imports.push(import.clone());
        }
    }

    let output = Arc::new(MemoryOutput::new());
    let emitter = Arc::new(Emitter {
        manager,
        backend: backend_for(template_kind),
        options: config.synth_options(),
        imports,
        sink: Arc::clone(&sink),
        output: Arc::clone(&output),
    });

    // 3. Emit every interface, then the batch-wide units
    let emitted = emit_interfaces(&emitter, &contracts).await;
    emitter.emit_registration(&emitted);
    if config.emit_support {
        emitter.emit_support();
    }
    if config.emit_module_index {
        emitter.emit_module_index();
    }

    // 4. Write
    let mut written = Vec::new();
    if dry_run {
        log::info!("Dry run: {} units rendered, nothing written", output.len());
    } else {
        let output_dir = PathBuf::from(&config.output_dir);
        tokio::fs::create_dir_all(&output_dir).await?;
        emitter.manager.execute_pre_generation_hooks(&output_dir).await?;
        written = output.write_to(&output_dir).await?;
        emitter.manager.execute_post_generation_hooks(&output_dir).await?;
        log::info!("Wrote {} files to {}", written.len(), output_dir.display());
    }

    let report = GenerationReport {
        interfaces: emitted.iter().map(|c| c.name.clone()).collect(),
        units: output.units(),
        written,
        diagnostics: sink.entries(),
    };
    log::info!(
        "Generated {} interfaces: {} errors, {} warnings",
        report.interfaces.len(),
        report.count(Severity::Error),
        report.count(Severity::Warning)
    );
    Ok(report)
}

/// Analyze the contracts of `config` without rendering anything.
pub async fn check(config: &Config) -> Result<GenerationReport> {
    let sink = Diagnostics::new();
    let contracts = analyze(config, &sink).await?;
    Ok(GenerationReport {
        interfaces: contracts.into_iter().map(|c| c.name).collect(),
        diagnostics: sink.entries(),
        ..Default::default()
    })
}

/// Load the contract documents of `config` and analyze the selected interfaces.
pub async fn analyze(config: &Config, sink: &dyn DiagnosticSink) -> Result<Vec<InterfaceContract>> {
    let declarations = DeclarationSet::load(&config.contract_paths[..], sink).await?;
    let contracts = ContractAnalyzer::new(&declarations, sink)
        .analyze_matching(|name| config.selects(name));
    log::debug!("Analyzed {} client interfaces", contracts.len());
    Ok(contracts)
}

/// Shared state of the emission stage
struct Emitter {
    manager: TemplateManager,
    backend: Box<dyn Backend>,
    options: SynthOptions,
    imports: Vec<String>,
    sink: Arc<Diagnostics>,
    output: Arc<MemoryOutput>,
}

impl Emitter {
    fn emit_interface(&self, contract: &InterfaceContract) -> Result<()> {
        let cx = SynthContext::new(&self.options, self.sink.as_ref());
        let units = synth::interface_units(contract, &cx);
        // Render everything first so a failing unit leaves nothing half-emitted
        let rendered = units
            .iter()
            .map(|unit| self.render(unit))
            .collect::<Result<Vec<_>>>()?;
        for unit in rendered {
            self.output.emit(unit)?;
        }
        log::debug!("Emitted {}", contract.name);
        Ok(())
    }

    fn emit_registration(&self, contracts: &[InterfaceContract]) {
        let cx = SynthContext::new(&self.options, self.sink.as_ref());
        if let Some(unit) = synth::registration::registration_unit(contracts, &cx) {
            let result = self.render(&unit).and_then(|unit| self.output.emit(unit));
            self.report_failure(&unit.name, result);
        }
    }

    fn emit_support(&self) {
        let result = self.manager.render_support().and_then(|text| {
            self.output.emit(GeneratedUnit {
                name: SUPPORT_UNIT.to_string(),
                file_name: self.backend.file_name(SUPPORT_UNIT),
                text,
            })
        });
        self.report_failure(SUPPORT_UNIT, result);
    }

    fn emit_module_index(&self) {
        let modules: Vec<String> = self
            .output
            .units()
            .iter()
            .filter(|unit| unit.name != MODULE_INDEX_UNIT)
            .map(|unit| self.backend.module_name(&unit.name))
            .collect();
        let result = self
            .manager
            .render_module_index(&modules)
            .and_then(|text| {
                self.output.emit(GeneratedUnit {
                    name: MODULE_INDEX_UNIT.to_string(),
                    file_name: self.backend.file_name(MODULE_INDEX_UNIT),
                    text,
                })
            });
        self.report_failure(MODULE_INDEX_UNIT, result);
    }

    /// Render `unit` and wrap it into the unit envelope.
    fn render(&self, unit: &Unit) -> Result<GeneratedUnit> {
        let body = self.backend.render_items(&unit.items);
        let text = self.manager.render_unit(&UnitContext {
            unit_name: &unit.name,
            source: &unit.source,
            generator: crate::GENERATOR,
            version: crate::VERSION,
            imports: &self.imports,
            body: &body,
        })?;
        Ok(GeneratedUnit {
            name: unit.name.clone(),
            file_name: self.backend.file_name(&unit.name),
            text,
        })
    }

    fn report_failure(&self, unit: &str, result: Result<()>) {
        if let Err(e) = result {
            self.sink.report(Diagnostic::error(
                diagnostics::GENERATION_FAILED,
                format!("generation of '{unit}' failed: {e}"),
                Location::new("", unit),
            ));
        }
    }
}

/// Emit each contract on the blocking pool; returns the ones that succeeded.
async fn emit_interfaces(
    emitter: &Arc<Emitter>,
    contracts: &[InterfaceContract],
) -> Vec<InterfaceContract> {
    let tasks = contracts.iter().cloned().map(|contract| {
        let emitter = Arc::clone(emitter);
        task::spawn_blocking(move || emitter.emit_interface(&contract))
    });
    let results = join_all(tasks).await;

    let mut emitted = Vec::new();
    for (contract, result) in contracts.iter().zip(results) {
        let failure = match result {
            Ok(Ok(())) => {
                emitted.push(contract.clone());
                continue;
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) => join_failure(e),
        };
        emitter.sink.report(Diagnostic::error(
            diagnostics::GENERATION_FAILED,
            format!("generation of '{}' failed: {failure}", contract.name),
            Location::new(&contract.source, &contract.name),
        ));
    }
    emitted
}

fn join_failure(error: task::JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panicked".to_string())
}
