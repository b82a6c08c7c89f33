//! CUDA operation lowering and aggregate initializers.

use shadec_core::SemanticVersion;
use shadec_core::lang::intrinsics::IntrinsicOpId;
use shadec_ir::{BaseType, InstId, InstKind};

use super::CudaEmitter;
use crate::backend::emit::c_like::exprs::emit_args;
use crate::backend::emit::c_like::initializers::emit_initializer_list_value;
use crate::backend::emit::context::EmitContext;
use crate::backend::emit::dialect::{Dialect, IntrinsicLowerer};
use crate::backend::emit::errors::EmitError;
use crate::backend::emit::expr::Expr;
use crate::backend::emit::type_set::{Shape, TypeId, TypeSet};

/// Warp-synchronous mask intrinsics need independent thread scheduling.
pub const WAVE_SM_VERSION: SemanticVersion = SemanticVersion::new(7, 0, 0);

impl IntrinsicLowerer for CudaEmitter {
    fn calc_scalar_func_name(&self, op: IntrinsicOpId, base: BaseType, outer: &dyn Dialect) -> String {
        match (op, base) {
            (IntrinsicOpId::FRem, BaseType::Half | BaseType::Float) => "fmodf".to_string(),
            (IntrinsicOpId::FRem, BaseType::Double) => "fmod".to_string(),
            _ => self.base.calc_scalar_func_name(op, base, outer),
        }
    }

    fn emit_intrinsic(
        &self,
        ctx: &mut EmitContext<'_>,
        inst: InstId,
        op: IntrinsicOpId,
        outer: &dyn Dialect,
    ) -> Result<Expr, EmitError> {
        self.base.emit_intrinsic(ctx, inst, op, outer)
    }

    fn emit_init(
        &self,
        ctx: &mut EmitContext<'_>,
        inst: InstId,
        ty: TypeId,
        outer: &dyn Dialect,
    ) -> Result<Expr, EmitError> {
        let operands = ctx.inst(inst)?.operands.clone();
        match ctx.types.shape(ty) {
            Shape::Vector { count, .. } if operands.len() == count as usize => {
                let name = outer.calc_type_name(&ctx.types, ty, outer)?;
                let args = emit_args(ctx, &operands, outer)?;
                Ok(Expr::atom(format!("make_{name}({args})")))
            }
            Shape::Matrix { rows, cols, .. }
                if operands.len() == rows as usize || operands.len() == rows as usize * cols as usize =>
            {
                let name = outer.calc_type_name(&ctx.types, ty, outer)?;
                let list = emit_initializer_list_value(ctx, ty, inst, outer)?;
                Ok(Expr::atom(format!("{name}{list}")))
            }
            _ => self.base.emit_init(ctx, inst, ty, outer),
        }
    }

    fn emit_make_array(
        &self,
        ctx: &mut EmitContext<'_>,
        inst: InstId,
        ty: TypeId,
        outer: &dyn Dialect,
    ) -> Result<Expr, EmitError> {
        self.base.emit_make_array(ctx, inst, ty, outer)
    }

    fn emit_wave_op(&self, ctx: &mut EmitContext<'_>, inst: InstId, outer: &dyn Dialect) -> Result<Expr, EmitError> {
        let instruction = ctx.inst(inst)?;
        let func = match instruction.kind {
            InstKind::WaveMaskBallot => "__ballot_sync",
            InstKind::WaveMaskMatch => "__match_any_sync",
            _ => return self.base.emit_wave_op(ctx, inst, outer),
        };
        ctx.require_sm_version(WAVE_SM_VERSION);
        let args = emit_args(ctx, &instruction.operands, outer)?;
        Ok(Expr::atom(format!("{func}({args})")))
    }

    fn emit_call(&self, ctx: &mut EmitContext<'_>, inst: InstId, outer: &dyn Dialect) -> Result<Expr, EmitError> {
        // Look through specializations to the function, collecting declared requirements on the way.
        let mut callee = ctx.inst(inst)?.operands.first().copied();
        while let Some(id) = callee {
            let callee_inst = ctx.inst(id)?;
            for packed in callee_inst.required_cuda_sm_versions() {
                ctx.extensions.require_packed_sm_version(packed);
            }
            callee = match callee_inst.kind {
                InstKind::Specialize => callee_inst.operands.first().copied(),
                _ => None,
            };
        }
        self.base.emit_call(ctx, inst, outer)
    }

    fn vector_from_components(
        &self,
        types: &TypeSet,
        ty: TypeId,
        components: &[String],
        outer: &dyn Dialect,
    ) -> Result<String, EmitError> {
        let name = outer.calc_type_name(types, ty, outer)?;
        Ok(format!("make_{name}({})", components.join(", ")))
    }
}
