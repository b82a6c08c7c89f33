#![forbid(unsafe_code)]
//! shadec: source emission for a shader-compiler IR.
//!
//! The crate turns a validated [`shadec_ir::Module`] into CUDA C++ (or portable C++) text, together with the lowest
//! CUDA SM version the text needs. The IR itself lives in `shadec_ir`; the shared vocabulary (intrinsics,
//! system-value semantics, targets, versions) lives in `shadec_core`.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `backend` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents an emitter bug (logic error), use `.expect("INVARIANT: reason")` with
//!   a clear explanation.
//!
//! ## Examples
//! ```rust
//! use shadec::{EmitOptions, emit_module};
//! use shadec_ir::ModuleBuilder;
//!
//! let module = ModuleBuilder::new().finish();
//! let out = emit_module(&module, &EmitOptions::new().with_header(false)).unwrap();
//! assert_eq!(out.required_version.to_string(), "5.0");
//! ```

pub mod backend;
pub mod cli;
pub mod version;

pub use backend::{EmitError, EmitOptions, EmittedSource, SourceEmitter, emit_module};
pub use version::SHADEC_VERSION;
