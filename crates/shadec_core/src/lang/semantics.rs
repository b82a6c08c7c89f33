//! System-value semantics.
//!
//! A parameter decorated with a system-value semantic is not passed by the caller; the target supplies it from
//! implicit launch state (thread and group indices).
//!
//! ## Notes
//! - [`from_str`] accepts the HLSL-style spelling (`SV_DispatchThreadID`) and matches **case-insensitively**, the
//!   way shader front ends treat semantic names.

use serde::{Deserialize, Serialize};

/// Stable identifier for every supported system-value semantic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemValueSemantic {
    /// Global thread index across the whole dispatch.
    DispatchThreadId,
    /// Index of the thread group within the dispatch.
    GroupId,
    /// Index of the thread within its group.
    GroupThreadId,
    /// Flattened index of the thread within its group.
    GroupIndex,
}

/// Metadata for a system-value semantic.
#[derive(Debug, Clone, Copy)]
pub struct SemanticInfo {
    pub id: SystemValueSemantic,
    pub spelling: &'static str,
    pub description: &'static str,
}

/// Registry of all system-value semantics.
pub const SEMANTICS: &[SemanticInfo] = &[
    SemanticInfo {
        id: SystemValueSemantic::DispatchThreadId,
        spelling: "SV_DispatchThreadID",
        description: "global thread index (group id * group size + group thread id)",
    },
    SemanticInfo {
        id: SystemValueSemantic::GroupId,
        spelling: "SV_GroupID",
        description: "thread group index",
    },
    SemanticInfo {
        id: SystemValueSemantic::GroupThreadId,
        spelling: "SV_GroupThreadID",
        description: "thread index within the group",
    },
    SemanticInfo {
        id: SystemValueSemantic::GroupIndex,
        spelling: "SV_GroupIndex",
        description: "flattened thread index within the group",
    },
];

/// Return the metadata entry for a semantic.
pub fn info_for(id: SystemValueSemantic) -> &'static SemanticInfo {
    SEMANTICS
        .iter()
        .find(|s| s.id == id)
        .expect("INVARIANT: every SystemValueSemantic has a registry entry")
}

/// Resolve a semantic spelling (e.g. `"SV_GroupID"`) to its identifier.
pub fn from_str(spelling: &str) -> Option<SystemValueSemantic> {
    SEMANTICS
        .iter()
        .find(|s| s.spelling.eq_ignore_ascii_case(spelling))
        .map(|s| s.id)
}

/// Return the canonical spelling of a semantic.
pub fn as_str(id: SystemValueSemantic) -> &'static str {
    info_for(id).spelling
}
