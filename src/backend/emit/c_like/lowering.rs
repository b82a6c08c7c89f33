//! Default operation lowering.
//!
//! Scalar operations become C operators or calls. Anything over vectors or matrices is routed to a specialized
//! helper (`add_float3_float3`) that is recorded in the pass's [`IntrinsicSet`](crate::backend::emit::intrinsics::IntrinsicSet)
//! and defined later in the preprocessor section.

use shadec_core::lang::intrinsics::{self, Fixity, IntrinsicOpId, IntrinsicShape};
use shadec_ir::{BaseType, InstId};

use super::CLikeEmitter;
use super::exprs::{emit_args, emit_construct, emit_operand, operand};
use super::initializers::{emit_initializer_list_value, initializer_list};
use crate::backend::emit::context::EmitContext;
use crate::backend::emit::dialect::{Dialect, IntrinsicLowerer};
use crate::backend::emit::errors::EmitError;
use crate::backend::emit::expr::{Expr, Precedence};
use crate::backend::emit::intrinsics::{SpecializedIntrinsic, specialized_name};
use crate::backend::emit::type_set::{Shape, TypeData, TypeId, TypeSet};

/// Record a specialization of `op` for the instruction's signature and call it.
pub fn emit_specialized_call(
    ctx: &mut EmitContext<'_>,
    inst: InstId,
    op: IntrinsicOpId,
    outer: &dyn Dialect,
) -> Result<Expr, EmitError> {
    let operands = ctx.inst(inst)?.operands.clone();
    let return_type = ctx.type_of(inst)?;
    let mut param_types = Vec::with_capacity(operands.len());
    for &op in &operands {
        param_types.push(ctx.type_of(op)?);
    }
    let intrinsic = SpecializedIntrinsic::new(op, return_type, param_types);
    let name = specialized_name(&ctx.types, &intrinsic, outer)?;
    ctx.intrinsics.add(intrinsic);
    let args = emit_args(ctx, &operands, outer)?;
    Ok(Expr::atom(format!("{name}({args})")))
}

impl IntrinsicLowerer for CLikeEmitter {
    fn calc_scalar_func_name(&self, op: IntrinsicOpId, _base: BaseType, _outer: &dyn Dialect) -> String {
        intrinsics::func_name(op).to_string()
    }

    fn emit_intrinsic(
        &self,
        ctx: &mut EmitContext<'_>,
        inst: InstId,
        op: IntrinsicOpId,
        outer: &dyn Dialect,
    ) -> Result<Expr, EmitError> {
        let info = intrinsics::info_for(op);
        if info.shape == IntrinsicShape::Constructor {
            return emit_construct(ctx, inst, outer);
        }
        let operands = ctx.inst(inst)?.operands.clone();
        if let Some(arity) = info.arity {
            if operands.len() != usize::from(arity) {
                return Err(EmitError::malformed(
                    inst,
                    format!("{} takes {arity} operands, found {}", info.func_name, operands.len()),
                ));
            }
        }

        let mut element = None;
        let mut all_scalar = true;
        for &op in &operands {
            let ty = ctx.type_of(op)?;
            match ctx.types.shape(ty) {
                Shape::Scalar(base) => {
                    element.get_or_insert(base);
                }
                _ => all_scalar = false,
            }
        }
        if !all_scalar {
            return emit_specialized_call(ctx, inst, op, outer);
        }
        let base = element.ok_or_else(|| EmitError::malformed(inst, format!("{} has no operands", info.func_name)))?;

        match (info.fixity, info.operator) {
            (Fixity::Infix, Some(symbol)) => binary(ctx, inst, symbol, outer),
            (Fixity::Prefix, Some(symbol)) => {
                let value = operand(ctx, inst, 0)?;
                let value = emit_operand(ctx, value, Precedence::Postfix, outer)?;
                Ok(Expr::new(format!("{symbol}{value}"), Precedence::Prefix))
            }
            // A scalar dot product is a plain multiply.
            _ if info.shape == IntrinsicShape::Reduction => binary(ctx, inst, "*", outer),
            _ => {
                let name = outer.calc_scalar_func_name(op, base, outer);
                let args = emit_args(ctx, &operands, outer)?;
                Ok(Expr::atom(format!("{name}({args})")))
            }
        }
    }

    fn emit_init(
        &self,
        ctx: &mut EmitContext<'_>,
        inst: InstId,
        ty: TypeId,
        outer: &dyn Dialect,
    ) -> Result<Expr, EmitError> {
        let operands = ctx.inst(inst)?.operands.clone();
        if let Shape::Vector { count, .. } = ctx.types.shape(ty) {
            let mut all_scalar = operands.len() == count as usize;
            for &op in &operands {
                let op_ty = ctx.type_of(op)?;
                all_scalar &= ctx.types.is_scalar(op_ty);
            }
            if all_scalar {
                let name = outer.calc_type_name(&ctx.types, ty, outer)?;
                let args = emit_args(ctx, &operands, outer)?;
                return Ok(Expr::atom(format!("{name}{{{args}}}")));
            }
        }
        emit_specialized_call(ctx, inst, IntrinsicOpId::Init, outer)
    }

    fn emit_make_array(
        &self,
        ctx: &mut EmitContext<'_>,
        inst: InstId,
        ty: TypeId,
        outer: &dyn Dialect,
    ) -> Result<Expr, EmitError> {
        let element = array_element(ctx, inst, ty)?;
        let name = outer.calc_type_name(&ctx.types, ty, outer)?;
        let operands = ctx.inst(inst)?.operands.clone();
        let mut items = Vec::with_capacity(operands.len());
        for &op in &operands {
            items.push(emit_initializer_list_value(ctx, element, op, outer)?);
        }
        // FixedArray wraps a C array: struct braces, then array braces.
        Ok(Expr::atom(format!("{name}{{{}}}", initializer_list(&items))))
    }

    fn emit_wave_op(&self, ctx: &mut EmitContext<'_>, inst: InstId, _outer: &dyn Dialect) -> Result<Expr, EmitError> {
        Err(EmitError::unsupported(format!(
            "{} requires a dialect with warp-level intrinsics",
            ctx.inst(inst)?.kind.name()
        )))
    }

    fn emit_call(&self, ctx: &mut EmitContext<'_>, inst: InstId, outer: &dyn Dialect) -> Result<Expr, EmitError> {
        let operands = ctx.inst(inst)?.operands.clone();
        let Some((&callee, args)) = operands.split_first() else {
            return Err(EmitError::malformed(inst, "call without a callee"));
        };
        let callee = emit_operand(ctx, callee, Precedence::Postfix, outer)?;
        let args = emit_args(ctx, args, outer)?;
        Ok(Expr::atom(format!("{callee}({args})")))
    }

    fn vector_from_components(
        &self,
        types: &TypeSet,
        ty: TypeId,
        components: &[String],
        outer: &dyn Dialect,
    ) -> Result<String, EmitError> {
        let name = outer.calc_type_name(types, ty, outer)?;
        Ok(format!("{name}{}", initializer_list(components)))
    }
}

fn binary(ctx: &mut EmitContext<'_>, inst: InstId, symbol: &str, outer: &dyn Dialect) -> Result<Expr, EmitError> {
    let lhs = operand(ctx, inst, 0)?;
    let rhs = operand(ctx, inst, 1)?;
    let lhs = emit_operand(ctx, lhs, Precedence::Prefix, outer)?;
    let rhs = emit_operand(ctx, rhs, Precedence::Prefix, outer)?;
    Ok(Expr::new(format!("{lhs} {symbol} {rhs}"), Precedence::Infix))
}

/// Element type of an array literal's result type.
fn array_element(ctx: &EmitContext<'_>, inst: InstId, ty: TypeId) -> Result<TypeId, EmitError> {
    match ctx.types.get(ty) {
        TypeData::Array { element, count } => {
            let found = ctx.inst(inst)?.operands.len();
            if found != *count as usize {
                return Err(EmitError::malformed(
                    inst,
                    format!("array literal of {count} elements has {found} operands"),
                ));
            }
            Ok(*element)
        }
        _ => Err(EmitError::unsupported(format!(
            "array literal of type {}",
            ctx.types.describe(ty)
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::emit::c_like::exprs::emit_expr;
    use crate::backend::emit::config::EmitOptions;
    use shadec_ir::{Module, ModuleBuilder};

    fn render(module: &Module, id: InstId) -> (Result<String, EmitError>, usize) {
        let outer = CLikeEmitter::new();
        let mut ctx = EmitContext::new(module, EmitOptions::default());
        let text = emit_expr(&mut ctx, id, &outer).map(|e| e.text);
        (text, ctx.intrinsics.len())
    }

    #[test]
    fn scalar_ops_use_operators() {
        let mut b = ModuleBuilder::new();
        let int = b.basic(BaseType::Int32);
        let mut f = b.func("f", int);
        let x = f.param("x", int);
        let y = f.param("y", int);
        let sum = f.arith(IntrinsicOpId::Add, int, &[x, y]);
        let product = f.arith(IntrinsicOpId::Mul, int, &[sum, y]);
        let negated = f.arith(IntrinsicOpId::Neg, int, &[product]);
        let smallest = f.arith(IntrinsicOpId::Min, int, &[x, y]);
        f.ret(Some(negated));
        f.finish();
        let module = b.finish();
        assert_eq!(render(&module, product).0.unwrap(), "(x + y) * y");
        assert_eq!(render(&module, negated).0.unwrap(), "-((x + y) * y)");
        assert_eq!(render(&module, smallest).0.unwrap(), "min(x, y)");
    }

    #[test]
    fn vector_ops_call_a_specialized_helper() {
        let mut b = ModuleBuilder::new();
        let float = b.basic(BaseType::Float);
        let float3 = b.vector(float, 3);
        let mut f = b.func("f", float3);
        let v = f.param("v", float3);
        let s = f.param("s", float);
        let scaled = f.arith(IntrinsicOpId::Mul, float3, &[v, s]);
        f.ret(Some(scaled));
        f.finish();
        let module = b.finish();
        let (text, registered) = render(&module, scaled);
        assert_eq!(text.unwrap(), "mul_float3_float(v, s)");
        assert_eq!(registered, 1);
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let mut b = ModuleBuilder::new();
        let int = b.basic(BaseType::Int32);
        let mut f = b.func("f", int);
        let x = f.param("x", int);
        let bad = f.arith(IntrinsicOpId::Add, int, &[x]);
        f.ret(Some(bad));
        f.finish();
        let module = b.finish();
        assert!(matches!(render(&module, bad).0, Err(EmitError::MalformedIr { .. })));
    }

    #[test]
    fn vector_init_uses_braces_or_the_generic_helper() {
        let mut b = ModuleBuilder::new();
        let float = b.basic(BaseType::Float);
        let float2 = b.vector(float, 2);
        let float3 = b.vector(float, 3);
        let mut f = b.func("f", float3);
        let x = f.param("x", float);
        let xy = f.param("xy", float2);
        let full = f.make_vector(float3, &[x, x, x]);
        let mixed = f.make_vector(float3, &[xy, x]);
        f.ret(Some(mixed));
        f.finish();
        let module = b.finish();
        assert_eq!(render(&module, full).0.unwrap(), "float3{x, x, x}");
        assert_eq!(render(&module, mixed).0.unwrap(), "init_float3_float2_float(xy, x)");
    }

    #[test]
    fn array_literal_has_struct_and_array_braces() {
        let mut b = ModuleBuilder::new();
        let float = b.basic(BaseType::Float);
        let float2 = b.vector(float, 2);
        let arr = b.array(float2, Some(2));
        let mut f = b.func("f", arr);
        let x = f.param("x", float);
        let first = f.make_vector(float2, &[x, x]);
        let second = f.param("second", float2);
        let list = f.make_array(arr, &[first, second]);
        f.ret(Some(list));
        f.finish();
        let module = b.finish();
        assert_eq!(
            render(&module, list).0.unwrap(),
            "FixedArray<float2, 2>{{{x, x}, second}}"
        );
    }

    #[test]
    fn wave_ops_are_unsupported() {
        let mut b = ModuleBuilder::new();
        let uint = b.basic(BaseType::UInt32);
        let boolean = b.basic(BaseType::Bool);
        let mut f = b.func("f", uint);
        let mask = f.param("mask", uint);
        let cond = f.param("cond", boolean);
        let ballot = f.wave_ballot(uint, mask, cond);
        f.ret(Some(ballot));
        f.finish();
        let module = b.finish();
        assert!(matches!(render(&module, ballot).0, Err(EmitError::Unsupported(_))));
    }
}
