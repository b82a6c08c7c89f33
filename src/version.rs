//! shadec version information.
//!
//! This module exposes the compiler version as a single constant so the CLI and the generated-source header agree
//! on the same value.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.

/// The shadec version string (for example, `0.1.0`).
pub const SHADEC_VERSION: &str = env!("CARGO_PKG_VERSION");
