//! Target dialects the emitter can produce.
//!
//! ## Examples
//! ```rust
//! use shadec_core::lang::targets::{self, TargetDialect};
//!
//! assert_eq!(targets::from_str("cuda"), Some(TargetDialect::Cuda));
//! assert_eq!(TargetDialect::Cuda.file_extension(), "cu");
//! ```

use std::fmt;

/// Stable identifier for every target dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetDialect {
    /// CUDA C++ (`nvrtc`/`nvcc` input).
    #[default]
    Cuda,
    /// Portable C++ with no device extensions.
    Cpp,
}

/// Metadata for a target dialect.
#[derive(Debug, Clone, Copy)]
pub struct TargetInfo {
    pub id: TargetDialect,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub file_extension: &'static str,
    pub description: &'static str,
}

/// Registry of all target dialects.
pub const TARGETS: &[TargetInfo] = &[
    TargetInfo {
        id: TargetDialect::Cuda,
        name: "cuda",
        aliases: &["cu"],
        file_extension: "cu",
        description: "CUDA C++ kernels (extern \"C\" __global__ entry points)",
    },
    TargetInfo {
        id: TargetDialect::Cpp,
        name: "cpp",
        aliases: &["c++", "cxx"],
        file_extension: "cpp",
        description: "Portable C++ with generated vector and matrix structs",
    },
];

impl TargetDialect {
    /// Return the registry entry for this dialect.
    pub fn info(self) -> &'static TargetInfo {
        TARGETS
            .iter()
            .find(|t| t.id == self)
            .expect("INVARIANT: every TargetDialect has a registry entry")
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn file_extension(self) -> &'static str {
        self.info().file_extension
    }
}

impl fmt::Display for TargetDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a dialect name or alias (case-insensitive) to its identifier.
pub fn from_str(name: &str) -> Option<TargetDialect> {
    TARGETS
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name) || t.aliases.iter().any(|a| a.eq_ignore_ascii_case(name)))
        .map(|t| t.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve() {
        assert_eq!(from_str("CUDA"), Some(TargetDialect::Cuda));
        assert_eq!(from_str("c++"), Some(TargetDialect::Cpp));
        assert_eq!(from_str("metal"), None);
    }

    #[test]
    fn display_uses_canonical_name() {
        assert_eq!(TargetDialect::Cpp.to_string(), "cpp");
        assert_eq!(TargetDialect::default(), TargetDialect::Cuda);
    }
}
