//! The shadec intermediate representation.
//!
//! A [`Module`] owns a flat arena of [`Inst`]s addressed by [`InstId`]. Types, global variables, functions,
//! blocks, and values are all instructions; operands are non-owning ids into the same arena.
//!
//! ## Notes
//!
//! - Modules are built once (by a front end, the [`ModuleBuilder`], or from JSON) and are read-only afterwards.
//! - [`Module::validate`] checks the invariants the emitters rely on: no dangling ids, scalar vector/matrix
//!   elements, and operand counts that match each opcode.
//!
//! ## Examples
//! ```rust
//! use shadec_ir::{BaseType, ModuleBuilder};
//!
//! let mut b = ModuleBuilder::new();
//! let uint = b.basic(BaseType::UInt32);
//! let uint3 = b.vector(uint, 3);
//! let module = b.finish();
//! assert!(module.validate().is_ok());
//! assert_eq!(module.inst(uint3).unwrap().operands, vec![uint]);
//! ```

mod builder;
mod decorations;
mod error;
mod inst;
mod module;
mod types;

pub use builder::{FunctionBuilder, ModuleBuilder};
pub use decorations::{Decoration, LoopControlMode, Stage};
pub use error::IrError;
pub use inst::{Inst, InstId, InstKind, OperandCount, Rate, StructField};
pub use module::{MAX_MATRIX_DIMENSION, Module};
pub use types::{BaseType, ResourceAccess};

pub use shadec_core::lang::intrinsics::IntrinsicOpId;
pub use shadec_core::lang::semantics::SystemValueSemantic;
