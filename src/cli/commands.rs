//! CLI command implementations
//!
//! Each command reads its input, does its work through the library API, and reports failures as [`CliError`]s.
//! Emission and validation failures are rendered with miette so the diagnostic code and help text reach the user.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use shadec_core::lang::targets::TARGETS;
use shadec_ir::{InstKind, Module, Rate};

use super::{CliError, CliResult, EXIT_REJECTED, ExitCode};
use crate::backend::{EmitError, EmitOptions, EmittedSource, SourceEmitter};

/// Read a file to a string, with a CLI-friendly error.
pub fn read_source(file_path: &Path) -> CliResult<String> {
    fs::read_to_string(file_path)
        .map_err(|e| CliError::failure(format!("Error reading {}: {}", file_path.display(), e)))
}

/// Read and deserialize a JSON IR module.
pub fn load_module(file_path: &Path) -> CliResult<Module> {
    let text = read_source(file_path)?;
    Module::from_json(&text).map_err(|e| CliError::with_code(format!("{}: {}", file_path.display(), e), EXIT_REJECTED))
}

fn render(err: EmitError) -> CliError {
    CliError::with_code(format!("{:?}", miette::Report::new(err)), EXIT_REJECTED)
}

/// Emit a module file without writing the result anywhere.
pub fn emit_source(file_path: &Path, options: &EmitOptions) -> CliResult<EmittedSource> {
    let module = load_module(file_path)?;
    SourceEmitter::new(options.clone()).emit(&module).map_err(render)
}

/// `shadec emit`: write the source to `output` (or stdout) and report the required SM on stderr.
pub fn emit_file(file_path: &Path, options: &EmitOptions, output: Option<&Path>) -> CliResult<ExitCode> {
    let emitted = emit_source(file_path, options)?;

    match output {
        Some(out) => {
            fs::write(out, &emitted.code)
                .map_err(|e| CliError::failure(format!("Error writing {}: {}", out.display(), e)))?;
            tracing::info!(path = %out.display(), bytes = emitted.code.len(), "wrote emitted source");
        }
        None => print!("{}", emitted.code),
    }

    eprintln!("required SM version: {}", emitted.required_version);
    Ok(ExitCode::SUCCESS)
}

/// Counts reported by `shadec check`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub name: Option<String>,
    pub instructions: usize,
    pub types: usize,
    pub structs: usize,
    pub shared_globals: usize,
    pub thread_globals: usize,
    pub functions: usize,
    pub declarations: usize,
    pub entry_points: usize,
}

impl ModuleSummary {
    pub fn of(module: &Module) -> Self {
        let mut summary = ModuleSummary {
            name: module.name.clone(),
            instructions: module.len(),
            ..Default::default()
        };
        for (_, inst) in module.iter() {
            match &inst.kind {
                InstKind::StructType { .. } => {
                    summary.types += 1;
                    summary.structs += 1;
                }
                kind if kind.is_type() => summary.types += 1,
                InstKind::GlobalVar { rate: Rate::GroupShared } => summary.shared_globals += 1,
                InstKind::GlobalVar { rate: Rate::ThreadLocal } => summary.thread_globals += 1,
                InstKind::Func { body: Some(_), .. } => {
                    summary.functions += 1;
                    if inst.is_entry_point() {
                        summary.entry_points += 1;
                    }
                }
                InstKind::Func { body: None, .. } => summary.declarations += 1,
                _ => {}
            }
        }
        summary
    }
}

impl fmt::Display for ModuleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module: {}", self.name.as_deref().unwrap_or("<unnamed>"))?;
        writeln!(f, "  instructions: {}", self.instructions)?;
        writeln!(f, "  types:        {} ({} structs)", self.types, self.structs)?;
        writeln!(
            f,
            "  globals:      {} shared, {} thread-local",
            self.shared_globals, self.thread_globals
        )?;
        write!(
            f,
            "  functions:    {} defined ({} entry points), {} declared",
            self.functions, self.entry_points, self.declarations
        )
    }
}

/// `shadec check`: validate a module and print its summary (as JSON when `json` is set).
pub fn check_file(file_path: &Path, json: bool) -> CliResult<ExitCode> {
    let module = load_module(file_path)?;
    module.validate().map_err(|e| render(EmitError::from(e)))?;
    let summary = ModuleSummary::of(&module);
    if json {
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::failure(format!("Error serializing summary: {}", e)))?;
        println!("{text}");
    } else {
        println!("{summary}");
        println!("✓ {} is valid", file_path.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// `shadec targets`: list the supported dialects.
pub fn list_targets() -> CliResult<ExitCode> {
    for target in TARGETS {
        let aliases = if target.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", target.aliases.join(", "))
        };
        println!(
            "{:<6} .{:<4} {}{}",
            target.name, target.file_extension, target.description, aliases
        );
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shadec_ir::{BaseType, ModuleBuilder};

    fn sample_module() -> Module {
        let mut b = ModuleBuilder::new().with_name("sample");
        let void = b.basic(BaseType::Void);
        let float = b.basic(BaseType::Float);
        let point = b.struct_type("Point", &[("x", float), ("y", float)]);
        b.global_var("tile", point, Rate::GroupShared);
        let mut f = b.func("main_kernel", void);
        f.entry_point();
        f.ret(None);
        f.finish();
        let _ = b.func("helper", void).finish_declaration();
        b.finish()
    }

    #[test]
    fn test_summary_counts() {
        let summary = ModuleSummary::of(&sample_module());
        assert_eq!(summary.name.as_deref(), Some("sample"));
        assert_eq!(summary.structs, 1);
        assert_eq!(summary.types, 3);
        assert_eq!(summary.shared_globals, 1);
        assert_eq!(summary.thread_globals, 0);
        assert_eq!(summary.functions, 1);
        assert_eq!(summary.entry_points, 1);
        assert_eq!(summary.declarations, 1);
    }

    #[test]
    fn test_summary_display() {
        let text = ModuleSummary::of(&sample_module()).to_string();
        assert!(text.starts_with("module: sample\n"));
        assert!(text.contains("1 shared, 0 thread-local"));
    }

    #[test]
    fn test_summary_serializes_field_names() {
        let value = serde_json::to_value(ModuleSummary::of(&sample_module())).unwrap();
        assert_eq!(value["entry_points"], 1);
        assert_eq!(value["name"], "sample");
    }

    #[test]
    fn test_load_module_reports_missing_file() {
        let err = load_module(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("Error reading"));
    }
}
