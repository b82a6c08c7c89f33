//! CLI module for shadec
//!
//! This module provides the command-line interface for the emitter.
//!
//! ## Commands
//!
//! - `emit <module.json>` - Emit CUDA (or C++) source for a JSON IR module
//! - `check <module.json>` - Validate a JSON IR module and print a summary
//! - `targets` - List the supported target dialects
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use shadec_core::SemanticVersion;
use shadec_core::lang::targets::{self, TargetDialect};

use crate::backend::emit::DEFAULT_SM_FLOOR;
use crate::version::SHADEC_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create an error with a custom exit code.
    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self::new(message, ExitCode(code))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Exit code for a module that was read but rejected (invalid IR or unsupported construct).
pub const EXIT_REJECTED: i32 = 2;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// CUDA and C++ source emission for shader IR modules
#[derive(Parser, Debug)]
#[command(name = "shadec")]
#[command(version = SHADEC_VERSION)]
#[command(about = "CUDA and C++ source emission for shader IR modules", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Emit source text for a JSON IR module
    Emit {
        /// JSON IR module to emit
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Target dialect (see `shadec targets`)
        #[arg(long, value_name = "TARGET", default_value = "cuda", value_parser = parse_target)]
        target: TargetDialect,
        /// Lowest SM version the output may claim to require
        #[arg(long = "sm", value_name = "VERSION", default_value_t = DEFAULT_SM_FLOOR)]
        sm: SemanticVersion,
        /// Write the source here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Spaces per indentation level
        #[arg(long, value_name = "N", default_value_t = 4)]
        indent: usize,
        /// Omit the `// Generated by shadec` header comment
        #[arg(long)]
        no_header: bool,
    },

    /// Validate a JSON IR module and print a summary
    Check {
        /// JSON IR module to validate
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the supported target dialects
    Targets,
}

fn parse_target(name: &str) -> Result<TargetDialect, String> {
    targets::from_str(name).ok_or_else(|| {
        let known: Vec<&str> = targets::TARGETS.iter().map(|t| t.name).collect();
        format!("unknown target `{name}` (expected one of: {})", known.join(", "))
    })
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Emit {
            file,
            target,
            sm,
            output,
            indent,
            no_header,
        } => {
            let options = crate::EmitOptions::new()
                .with_target(target)
                .with_capability_floor(sm)
                .with_indent_width(indent)
                .with_header(!no_header);
            commands::emit_file(&file, &options, output.as_deref())
        }
        Command::Check { file, json } => commands::check_file(&file, json),
        Command::Targets => commands::list_targets(),
    }
}

// ============================================================================
// Tests
// ============================================================================
