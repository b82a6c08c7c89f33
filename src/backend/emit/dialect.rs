//! Target dialect capabilities.
//!
//! A dialect is split into three capability traits: [`TypeNamer`], [`IntrinsicLowerer`] and [`DeclEmitter`].
//! [`CLikeEmitter`](super::c_like::CLikeEmitter) implements all of them for plain C++; other dialects hold a
//! `CLikeEmitter` and forward whatever they do not specialize.
//!
//! ## Notes
//! - Every method receives `outer`, the outermost dialect of the pass. Shared code recurses through `outer`
//!   rather than `self`, so an override (say, CUDA scalar names) is seen from inside default logic (say,
//!   matrix names built from their element spelling).
//! - Dialects are immutable; all pass state lives in [`EmitContext`].

use shadec_core::lang::intrinsics::IntrinsicOpId;
use shadec_core::lang::targets::TargetDialect;
use shadec_ir::{BaseType, InstId};

use super::c_like::CLikeEmitter;
use super::context::EmitContext;
use super::cuda::CudaEmitter;
use super::errors::EmitError;
use super::expr::Expr;
use super::type_set::{TypeId, TypeSet};
use super::writer::SourceWriter;

/// Spelling of types and typed literals.
pub trait TypeNamer {
    /// Resolve the target spelling of `ty`.
    fn calc_type_name(&self, types: &TypeSet, ty: TypeId, outer: &dyn Dialect) -> Result<String, EmitError>;

    /// Literal text for a floating-point constant of scalar type `base`.
    fn float_literal(&self, base: BaseType, value: f64, outer: &dyn Dialect) -> String;
}

/// Lowering of operations to target expressions.
pub trait IntrinsicLowerer {
    /// Function used for a call-style operation on scalars of `base`.
    fn calc_scalar_func_name(&self, op: IntrinsicOpId, base: BaseType, outer: &dyn Dialect) -> String;

    /// Render an `arith` instruction.
    fn emit_intrinsic(
        &self,
        ctx: &mut EmitContext<'_>,
        inst: InstId,
        op: IntrinsicOpId,
        outer: &dyn Dialect,
    ) -> Result<Expr, EmitError>;

    /// Render a vector or matrix construction whose result type is `ty`.
    fn emit_init(&self, ctx: &mut EmitContext<'_>, inst: InstId, ty: TypeId, outer: &dyn Dialect)
    -> Result<Expr, EmitError>;

    /// Render an array literal whose result type is `ty`.
    fn emit_make_array(
        &self,
        ctx: &mut EmitContext<'_>,
        inst: InstId,
        ty: TypeId,
        outer: &dyn Dialect,
    ) -> Result<Expr, EmitError>;

    /// Render a warp-level mask operation.
    fn emit_wave_op(&self, ctx: &mut EmitContext<'_>, inst: InstId, outer: &dyn Dialect) -> Result<Expr, EmitError>;

    /// Render a call instruction.
    fn emit_call(&self, ctx: &mut EmitContext<'_>, inst: InstId, outer: &dyn Dialect) -> Result<Expr, EmitError>;

    /// Build a vector value of type `ty` from rendered components (used inside helper definitions).
    fn vector_from_components(
        &self,
        types: &TypeSet,
        ty: TypeId,
        components: &[String],
        outer: &dyn Dialect,
    ) -> Result<String, EmitError>;
}

/// Declarations, signatures and the preprocessor section.
pub trait DeclEmitter {
    /// Write whatever precedes a function's return type.
    fn emit_function_preamble(&self, ctx: &mut EmitContext<'_>, func: InstId, outer: &dyn Dialect)
    -> Result<(), EmitError>;

    /// Whether a parameter is left out of the signature.
    fn is_param_elided(&self, ctx: &EmitContext<'_>, param: InstId) -> Result<bool, EmitError>;

    /// Render a use of a parameter.
    fn emit_param_ref(&self, ctx: &mut EmitContext<'_>, param: InstId, outer: &dyn Dialect)
    -> Result<Expr, EmitError>;

    /// Write the storage qualifier of a global variable.
    fn emit_storage_qualifier(&self, ctx: &mut EmitContext<'_>, var: InstId, outer: &dyn Dialect)
    -> Result<(), EmitError>;

    /// Write any directive that precedes a loop.
    fn emit_loop_control(&self, ctx: &mut EmitContext<'_>, loop_inst: InstId, outer: &dyn Dialect)
    -> Result<(), EmitError>;

    /// Qualifier prepended to generated helper functions.
    fn helper_qualifier(&self) -> &'static str;

    /// Register intrinsics the dialect's own lowering may call implicitly.
    fn register_builtin_intrinsics(&self, ctx: &mut EmitContext<'_>, outer: &dyn Dialect) -> Result<(), EmitError>;

    /// Includes and typedefs at the very top of the preprocessor section.
    fn emit_prelude(&self, w: &mut SourceWriter);

    /// Whether the dialect needs a struct definition for the vector type `ty`.
    fn needs_vector_struct(&self, types: &TypeSet, ty: TypeId) -> bool;

    /// Write a struct definition (and any helpers) for the vector type `ty`.
    fn emit_vector_struct(
        &self,
        types: &TypeSet,
        ty: TypeId,
        w: &mut SourceWriter,
        outer: &dyn Dialect,
    ) -> Result<(), EmitError>;

    /// Generate the preprocessor section from what the pass registered.
    fn emit_preprocessor(&self, ctx: &mut EmitContext<'_>, outer: &dyn Dialect) -> Result<String, EmitError>;
}

/// A complete target dialect.
pub trait Dialect: TypeNamer + IntrinsicLowerer + DeclEmitter + Send + Sync {
    fn target(&self) -> TargetDialect;
}

/// Dialect implementation for a target.
pub fn dialect_for(target: TargetDialect) -> Box<dyn Dialect> {
    match target {
        TargetDialect::Cuda => Box::new(CudaEmitter::new()),
        TargetDialect::Cpp => Box::new(CLikeEmitter::new()),
    }
}
