//! Emission options.

use shadec_core::SemanticVersion;
use shadec_core::lang::targets::TargetDialect;

/// Default CUDA SM floor when the caller does not ask for one.
pub const DEFAULT_SM_FLOOR: SemanticVersion = SemanticVersion::new(5, 0, 0);

/// Options for one emission pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Dialect to emit
    pub target: TargetDialect,
    /// Lowest capability version the output may claim to require
    pub capability_floor: SemanticVersion,
    /// Number of spaces per indentation level
    pub indent_width: usize,
    /// Whether to prepend the `// Generated by shadec ...` header comment
    pub emit_header: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            target: TargetDialect::Cuda,
            capability_floor: DEFAULT_SM_FLOOR,
            indent_width: 4,
            emit_header: true,
        }
    }
}

impl EmitOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target dialect
    pub fn with_target(mut self, target: TargetDialect) -> Self {
        self.target = target;
        self
    }

    /// Set the capability floor
    pub fn with_capability_floor(mut self, floor: SemanticVersion) -> Self {
        self.capability_floor = floor;
        self
    }

    /// Set the indentation width
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Enable or disable the header comment
    pub fn with_header(mut self, emit_header: bool) -> Self {
        self.emit_header = emit_header;
        self
    }
}
