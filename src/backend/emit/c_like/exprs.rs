//! Expression emission shared by every dialect.
//!
//! [`emit_expr`] dispatches on the closed opcode enum. Anything a dialect may specialize (intrinsics,
//! initializers, calls, wave ops, parameter references, literals) is routed through `outer`.

use shadec_core::lang::intrinsics::IntrinsicOpId;
use shadec_ir::{BaseType, InstId, InstKind};

use super::types::format_int;
use crate::backend::emit::context::{EmitContext, sanitize_identifier};
use crate::backend::emit::dialect::Dialect;
use crate::backend::emit::errors::EmitError;
use crate::backend::emit::expr::{Expr, Precedence};
use crate::backend::emit::type_set::{Shape, TypeData, TypeId};

/// Component names used for vector member access.
pub const COMPONENTS: [&str; 4] = ["x", "y", "z", "w"];

/// Render a use of `id` so that it binds at least as tightly as `min`.
pub fn emit_operand(
    ctx: &mut EmitContext<'_>,
    id: InstId,
    min: Precedence,
    outer: &dyn Dialect,
) -> Result<String, EmitError> {
    Ok(emit_value(ctx, id, outer)?.at_least(min))
}

/// Comma-joined call arguments.
pub fn emit_args(ctx: &mut EmitContext<'_>, ids: &[InstId], outer: &dyn Dialect) -> Result<String, EmitError> {
    let mut args = Vec::with_capacity(ids.len());
    for &id in ids {
        args.push(emit_operand(ctx, id, Precedence::Infix, outer)?);
    }
    Ok(args.join(", "))
}

/// Render a use of value `id`: its name if it has one, otherwise its expression.
pub fn emit_value(ctx: &mut EmitContext<'_>, id: InstId, outer: &dyn Dialect) -> Result<Expr, EmitError> {
    let inst = ctx.inst(id)?;
    match inst.kind {
        InstKind::Param => return outer.emit_param_ref(ctx, id, outer),
        InstKind::Func { .. } => return Ok(Expr::atom(ctx.name_or_assign(id)?)),
        // A variable used as a value is its address.
        InstKind::Var | InstKind::GlobalVar { .. } => {
            return Ok(Expr::new(format!("&{}", ctx.name_or_assign(id)?), Precedence::Prefix));
        }
        _ => {}
    }
    if let Some(name) = ctx.name(id) {
        return Ok(Expr::atom(name));
    }
    emit_expr(ctx, id, outer)
}

/// Render the expression computing `id`.
pub fn emit_expr(ctx: &mut EmitContext<'_>, id: InstId, outer: &dyn Dialect) -> Result<Expr, EmitError> {
    let inst = ctx.inst(id)?;
    match &inst.kind {
        InstKind::IntLit { value } => {
            let ty = ctx.type_of(id)?;
            match ctx.types.shape(ty) {
                Shape::Scalar(base) if base.is_float() => Ok(literal(outer.float_literal(base, *value as f64, outer))),
                Shape::Scalar(base) => Ok(literal(format_int(base, *value))),
                _ => Err(EmitError::malformed(id, "integer literal with a non-scalar type")),
            }
        }
        InstKind::FloatLit { value } => {
            let ty = ctx.type_of(id)?;
            match ctx.types.shape(ty) {
                Shape::Scalar(base) => Ok(literal(outer.float_literal(base, *value, outer))),
                _ => Err(EmitError::malformed(id, "float literal with a non-scalar type")),
            }
        }
        InstKind::BoolLit { value } => Ok(Expr::atom(value.to_string())),
        InstKind::Construct
        | InstKind::Arith {
            intrinsic: IntrinsicOpId::Init,
        } => emit_construct(ctx, id, outer),
        InstKind::Arith { intrinsic } => outer.emit_intrinsic(ctx, id, *intrinsic, outer),
        InstKind::MakeVector | InstKind::MakeMatrix => {
            let ty = ctx.type_of(id)?;
            outer.emit_init(ctx, id, ty, outer)
        }
        InstKind::MakeArray => {
            let ty = ctx.type_of(id)?;
            outer.emit_make_array(ctx, id, ty, outer)
        }
        InstKind::Call => outer.emit_call(ctx, id, outer),
        InstKind::Specialize => {
            let generic = operand(ctx, id, 0)?;
            emit_value(ctx, generic, outer)
        }
        InstKind::Load => {
            let source = operand(ctx, id, 0)?;
            Ok(Expr::atom(emit_lvalue(ctx, source, outer)?))
        }
        InstKind::GetElementPtr | InstKind::FieldAddress { .. } => Ok(Expr::new(
            format!("&{}", emit_lvalue(ctx, id, outer)?),
            Precedence::Prefix,
        )),
        InstKind::GetElement => {
            let base = operand(ctx, id, 0)?;
            let index = operand(ctx, id, 1)?;
            let base_ty = ctx.type_of(base)?;
            let base_text = emit_operand(ctx, base, Precedence::Postfix, outer)?;
            Ok(Expr::atom(index_access(ctx, base_ty, base_text, index, outer)?))
        }
        InstKind::FieldExtract { field } => {
            let base = operand(ctx, id, 0)?;
            let base_ty = ctx.type_of(base)?;
            let field_name = field_identifier(ctx, base_ty, *field, id)?;
            let base_text = emit_operand(ctx, base, Precedence::Postfix, outer)?;
            Ok(Expr::atom(format!("{base_text}.{field_name}")))
        }
        InstKind::Swizzle { indices } => {
            let [component] = indices.as_slice() else {
                return Err(EmitError::unsupported(format!(
                    "swizzle of {} components (only single-component swizzles are supported)",
                    indices.len()
                )));
            };
            let name = COMPONENTS
                .get(*component as usize)
                .ok_or_else(|| EmitError::malformed(id, format!("swizzle component {component} is out of range")))?;
            let base = operand(ctx, id, 0)?;
            let base_text = emit_operand(ctx, base, Precedence::Postfix, outer)?;
            Ok(Expr::atom(format!("{base_text}.{name}")))
        }
        InstKind::WaveMaskBallot | InstKind::WaveMaskMatch => outer.emit_wave_op(ctx, id, outer),
        InstKind::Param | InstKind::Var | InstKind::GlobalVar { .. } | InstKind::Func { .. } => {
            emit_value(ctx, id, outer)
        }
        InstKind::BasicType { .. }
        | InstKind::VectorType { .. }
        | InstKind::MatrixType { .. }
        | InstKind::ArrayType { .. }
        | InstKind::PtrType
        | InstKind::TextureType { .. }
        | InstKind::TextureSamplerType
        | InstKind::SamplerStateType { .. }
        | InstKind::StructType { .. }
        | InstKind::Block { .. }
        | InstKind::Store
        | InstKind::IfElse { .. }
        | InstKind::Loop { .. }
        | InstKind::Break
        | InstKind::Continue
        | InstKind::Return => Err(EmitError::malformed(
            id,
            format!("{} is not a value", inst.kind.name()),
        )),
    }
}

fn literal(text: String) -> Expr {
    if text.starts_with('-') {
        Expr::new(text, Precedence::Prefix)
    } else {
        Expr::atom(text)
    }
}

/// Operand `index` of `id`, or malformed IR if it is missing.
pub fn operand(ctx: &EmitContext<'_>, id: InstId, index: usize) -> Result<InstId, EmitError> {
    let inst = ctx.inst(id)?;
    inst.operands.get(index).copied().ok_or_else(|| {
        EmitError::malformed(id, format!("{} is missing operand {index}", inst.kind.name()))
    })
}

/// Whether a basic type cannot be called like a constructor (`T(x)`) and needs a cast instead.
pub fn needs_cast(base: BaseType) -> bool {
    matches!(
        base,
        BaseType::Int64 | BaseType::UInt8 | BaseType::UInt16 | BaseType::UInt32 | BaseType::UInt64
    )
}

/// Render an explicit construction of the instruction's result type.
pub fn emit_construct(ctx: &mut EmitContext<'_>, id: InstId, outer: &dyn Dialect) -> Result<Expr, EmitError> {
    let ty = ctx.type_of(id)?;
    let data = ctx.types.get(ty).clone();
    let operands = ctx.inst(id)?.operands.clone();
    match data {
        TypeData::Basic(base) => {
            let name = outer.calc_type_name(&ctx.types, ty, outer)?;
            if needs_cast(base) {
                let [arg] = operands.as_slice() else {
                    return Err(EmitError::malformed(
                        id,
                        format!("a cast to {name} takes one argument, found {}", operands.len()),
                    ));
                };
                let arg = emit_operand(ctx, *arg, Precedence::Infix, outer)?;
                Ok(Expr::new(format!("({name})({arg})"), Precedence::Prefix))
            } else {
                let args = emit_args(ctx, &operands, outer)?;
                Ok(Expr::atom(format!("{name}({args})")))
            }
        }
        TypeData::Vector { .. } | TypeData::Matrix { .. } => outer.emit_init(ctx, id, ty, outer),
        TypeData::Array { .. } => outer.emit_make_array(ctx, id, ty, outer),
        TypeData::Struct { .. } => {
            let name = outer.calc_type_name(&ctx.types, ty, outer)?;
            let args = emit_args(ctx, &operands, outer)?;
            Ok(Expr::atom(format!("{name}{{{args}}}")))
        }
        _ => Err(EmitError::unsupported(format!(
            "constructing a value of type {}",
            ctx.types.describe(ty)
        ))),
    }
}

/// Type of the storage an address names.
pub fn storage_type(ctx: &mut EmitContext<'_>, address: InstId) -> Result<TypeId, EmitError> {
    let ty = ctx.type_of(address)?;
    let is_address = matches!(
        ctx.inst(address)?.kind,
        InstKind::Var | InstKind::GlobalVar { .. } | InstKind::GetElementPtr | InstKind::FieldAddress { .. }
    );
    match ctx.types.get(ty) {
        TypeData::Ptr { pointee } if !is_address => Ok(*pointee),
        _ => Ok(ty),
    }
}

/// Render the storage named by `address` as an assignable expression.
pub fn emit_lvalue(ctx: &mut EmitContext<'_>, address: InstId, outer: &dyn Dialect) -> Result<String, EmitError> {
    let inst = ctx.inst(address)?;
    match &inst.kind {
        InstKind::Var | InstKind::GlobalVar { .. } => ctx.name_or_assign(address),
        InstKind::GetElementPtr => {
            let base = operand(ctx, address, 0)?;
            let index = operand(ctx, address, 1)?;
            let base_ty = storage_type(ctx, base)?;
            let base_text = emit_lvalue(ctx, base, outer)?;
            index_access(ctx, base_ty, base_text, index, outer)
        }
        InstKind::FieldAddress { field } => {
            let base = operand(ctx, address, 0)?;
            let base_ty = storage_type(ctx, base)?;
            let field_name = field_identifier(ctx, base_ty, *field, address)?;
            let base_text = emit_lvalue(ctx, base, outer)?;
            Ok(format!("{base_text}.{field_name}"))
        }
        _ => {
            let ty = ctx.type_of(address)?;
            match ctx.types.get(ty) {
                TypeData::Ptr { .. } | TypeData::UnsizedArray { .. } => {
                    let pointer = emit_operand(ctx, address, Precedence::Postfix, outer)?;
                    if matches!(ctx.types.get(ty), TypeData::Ptr { .. }) {
                        Ok(format!("(*{pointer})"))
                    } else {
                        Ok(pointer)
                    }
                }
                _ => Err(EmitError::malformed(
                    address,
                    format!("{} does not name storage", inst.kind.name()),
                )),
            }
        }
    }
}

/// `base[index]`, or `.x`-style member access for a vector indexed by a constant.
fn index_access(
    ctx: &mut EmitContext<'_>,
    base_ty: TypeId,
    base_text: String,
    index: InstId,
    outer: &dyn Dialect,
) -> Result<String, EmitError> {
    if let Shape::Vector { count, .. } = ctx.types.shape(base_ty) {
        if let InstKind::IntLit { value } = ctx.inst(index)?.kind {
            if (0..i64::from(count.min(4))).contains(&value) {
                return Ok(format!("{base_text}.{}", COMPONENTS[value as usize]));
            }
        }
    }
    let index_text = emit_operand(ctx, index, Precedence::Infix, outer)?;
    Ok(format!("{base_text}[{index_text}]"))
}

/// Declared identifier of field `field` of struct type `struct_ty`.
pub fn field_identifier(
    ctx: &EmitContext<'_>,
    struct_ty: TypeId,
    field: u32,
    at: InstId,
) -> Result<String, EmitError> {
    let TypeData::Struct { decl, .. } = ctx.types.get(struct_ty) else {
        return Err(EmitError::malformed(
            at,
            format!("field access on non-struct type {}", ctx.types.describe(struct_ty)),
        ));
    };
    let InstKind::StructType { fields } = &ctx.inst(*decl)?.kind else {
        return Err(EmitError::malformed(*decl, "expected a struct type"));
    };
    let declared = fields
        .get(field as usize)
        .ok_or_else(|| EmitError::malformed(at, format!("struct has no field {field}")))?;
    Ok(member_name(&declared.name, field))
}

/// Identifier used for a struct member, both where it is declared and where it is accessed.
pub fn member_name(declared: &str, index: u32) -> String {
    sanitize_identifier(declared).unwrap_or_else(|| format!("field{index}"))
}
