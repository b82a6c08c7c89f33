//! Provide the shared, pure vocabulary of the shadec shader compiler.
//!
//! This crate is intentionally small. It holds the tables that both the IR crate and the emitter backend agree on:
//! - intrinsic operations and their spellings ([`lang::intrinsics`]),
//! - system-value semantics ([`lang::semantics`]),
//! - target dialects ([`lang::targets`]),
//! - capability versions ([`version::SemanticVersion`]).
//!
//! ## Notes
//!
//! - No IO, no global state, and no IR types live here.

pub mod lang;
pub mod version;

pub use version::SemanticVersion;
