//! shadec vocabulary registries.
//!
//! This module is the "front door" for the vocabulary shared by the IR and the emitter: intrinsic operations,
//! system-value semantics, and target dialects.
//!
//! Callers work with **stable IDs** (e.g. `IntrinsicOpId`, `SystemValueSemantic`) and look up spellings and metadata
//! via registry tables instead of matching on strings.
//!
//! ## Notes
//! - Registries are **pure**: no IR types, no IO, no side effects.
//!
//! ## Examples
//! ```rust
//! use shadec_core::lang::intrinsics::{self, IntrinsicOpId};
//!
//! assert_eq!(intrinsics::from_str("add"), Some(IntrinsicOpId::Add));
//! assert_eq!(intrinsics::info_for(IntrinsicOpId::Add).operator, Some("+"));
//! ```

pub mod intrinsics;
pub mod semantics;
pub mod targets;
