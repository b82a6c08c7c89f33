//! Decorations: metadata attached to an instruction outside its operand list.

use serde::{Deserialize, Serialize};
use shadec_core::SemanticVersion;
use shadec_core::lang::semantics::SystemValueSemantic;

/// Pipeline stage of an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Compute,
}

/// Loop-control hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopControlMode {
    /// Ask the target compiler to fully unroll the loop.
    Unroll,
    /// Keep the loop rolled.
    Loop,
}

/// Metadata attached to an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decoration {
    /// The function is an externally launchable kernel.
    EntryPoint { stage: Stage },
    /// Minimum CUDA SM version, in packed `major << 32 | minor << 16 | patch` form.
    RequireCudaSmVersion { version: u64 },
    /// The parameter is bound to implicit launch state.
    SystemValue { semantic: SystemValueSemantic },
    LoopControl { mode: LoopControlMode },
}

impl Decoration {
    /// Build a [`Decoration::RequireCudaSmVersion`] from a structured version.
    pub fn require_cuda_sm(version: SemanticVersion) -> Self {
        Decoration::RequireCudaSmVersion {
            version: version.to_integer(),
        }
    }
}
