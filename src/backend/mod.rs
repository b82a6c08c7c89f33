//! shadec compiler backend
//!
//! Source emission from the shader IR (`shadec_ir`) into target dialects.
//!
//! ## Module Organization
//!
//! - `emit/` - IR → CUDA / C++ source emitter

#![deny(clippy::unwrap_used)]

pub mod emit;

pub use emit::{EmitError, EmitOptions, EmittedSource, SourceEmitter, emit_module};
