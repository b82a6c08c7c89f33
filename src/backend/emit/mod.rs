//! IR → CUDA-flavored source emission.
//!
//! ## Pipeline
//!
//! ```text
//! Module → validate → TypeSet + implicit intrinsics → emission plan
//!        → forward decls → shared globals → globals → functions → preprocessor section
//! ```
//!
//! ## Module Organization
//!
//! - `module.rs` - [`SourceEmitter`] / [`emit_module`], the pass driver and its phase machine
//! - `context.rs` - [`EmitContext`], all mutable per-pass state
//! - `dialect.rs` - the `TypeNamer` / `IntrinsicLowerer` / `DeclEmitter` capability traits
//! - `c_like/` - the default C++ dialect and the shared instruction, statement and declaration walkers
//! - `cuda/` - the CUDA dialect, layered on `c_like`
//! - `actions.rs` - dependency-ordered emission plan
//! - `type_set.rs`, `intrinsics.rs`, `extensions.rs` - type registry, used intrinsic specializations,
//!   capability tracking
//! - `writer.rs` - indentation-aware output buffer
//!
//! ## Examples
//! ```rust
//! use shadec::backend::emit::{EmitOptions, emit_module};
//! use shadec_ir::{BaseType, ModuleBuilder, SystemValueSemantic};
//!
//! let mut b = ModuleBuilder::new();
//! let void = b.basic(BaseType::Void);
//! let uint = b.basic(BaseType::UInt32);
//! let uint3 = b.vector(uint, 3);
//! let mut kernel = b.func("main", void);
//! kernel.entry_point();
//! kernel.system_value_param("tid", uint3, SystemValueSemantic::DispatchThreadId);
//! kernel.ret(None);
//! kernel.finish();
//!
//! let out = emit_module(&b.finish(), &EmitOptions::default()).unwrap();
//! assert!(out.code.contains("extern \"C\" __global__ void main()"));
//! ```

pub mod actions;
pub mod c_like;
pub mod config;
pub mod context;
pub mod cuda;
pub mod dialect;
pub mod errors;
pub mod expr;
pub mod extensions;
pub mod intrinsics;
pub mod module;
pub mod type_set;
pub mod writer;

pub use actions::{EmitAction, EmitLevel, compute_emit_actions};
pub use c_like::CLikeEmitter;
pub use config::{DEFAULT_SM_FLOOR, EmitOptions};
pub use context::{EmitContext, Phase};
pub use cuda::CudaEmitter;
pub use dialect::{DeclEmitter, Dialect, IntrinsicLowerer, TypeNamer, dialect_for};
pub use errors::EmitError;
pub use extensions::ExtensionTracker;
pub use intrinsics::{IntrinsicSet, SpecializedIntrinsic};
pub use module::{EmittedSource, SourceEmitter, emit_module};
pub use type_set::{TypeData, TypeId, TypeSet};
