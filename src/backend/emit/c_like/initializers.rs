//! Brace-initializer rendering for aggregates.
//!
//! [`emit_initializer_list_value`] renders a value as it should appear inside an initializer for a destination
//! of type `dst`. A construction whose type matches `dst` is flattened into nested braces; anything else (or a
//! construction with an unexpected operand count) falls back to ordinary operand emission.
//!
//! ## Notes
//! - Matrices are `struct { row rows[R]; }`, so a matrix initializer has an outer struct level and an array
//!   level: `{{r0, r1}}` from rows, `{{{a, b}, {c, d}}}` from scalars.
//! - A width-1 row is a scalar, never a one-element vector.

use shadec_ir::{InstId, InstKind};

use super::exprs::emit_operand;
use crate::backend::emit::context::EmitContext;
use crate::backend::emit::dialect::Dialect;
use crate::backend::emit::errors::EmitError;
use crate::backend::emit::expr::Precedence;
use crate::backend::emit::type_set::{Shape, TypeData, TypeId};

/// `{a, b, c}`
pub fn initializer_list(items: &[String]) -> String {
    format!("{{{}}}", items.join(", "))
}

/// Render `value` for a slot of type `dst`.
pub fn emit_initializer_list_value(
    ctx: &mut EmitContext<'_>,
    dst: TypeId,
    value: InstId,
    outer: &dyn Dialect,
) -> Result<String, EmitError> {
    let inst = ctx.inst(value)?;
    let is_construction = matches!(
        inst.kind,
        InstKind::Construct | InstKind::MakeVector | InstKind::MakeMatrix
    ) || matches!(
        inst.kind,
        InstKind::Arith {
            intrinsic: shadec_ir::IntrinsicOpId::Init
        }
    );
    // Named values are already materialized.
    if !is_construction || ctx.name(value).is_some() {
        return emit_operand(ctx, value, Precedence::Infix, outer);
    }
    let ty = ctx.type_of(value)?;
    if !ctx.types.are_equivalent(ty, dst) {
        return emit_operand(ctx, value, Precedence::Infix, outer);
    }

    let operands = &inst.operands;
    match ctx.types.shape(dst) {
        Shape::Vector { count, .. } if operands.len() == count as usize => {
            let TypeData::Vector { element, .. } = *ctx.types.get(dst) else {
                return emit_operand(ctx, value, Precedence::Infix, outer);
            };
            let mut items = Vec::with_capacity(operands.len());
            for &op in operands {
                items.push(emit_initializer_list_value(ctx, element, op, outer)?);
            }
            Ok(initializer_list(&items))
        }
        // Also covers single-column matrices, whose rows are scalars.
        Shape::Matrix { rows, .. } if operands.len() == rows as usize => {
            let row_ty = ctx
                .types
                .matrix_row_type(dst)
                .ok_or_else(|| EmitError::malformed(value, "matrix type without a row type"))?;
            let mut items = Vec::with_capacity(operands.len());
            for &row in operands {
                items.push(emit_initializer_list_value(ctx, row_ty, row, outer)?);
            }
            Ok(format!("{{{}}}", initializer_list(&items)))
        }
        Shape::Matrix { rows, cols, .. } if operands.len() == rows as usize * cols as usize => {
            let TypeData::Matrix { element, .. } = *ctx.types.get(dst) else {
                return emit_operand(ctx, value, Precedence::Infix, outer);
            };
            let mut row_lists = Vec::with_capacity(rows as usize);
            for row in operands.chunks(cols as usize) {
                let mut items = Vec::with_capacity(row.len());
                for &op in row {
                    items.push(emit_initializer_list_value(ctx, element, op, outer)?);
                }
                row_lists.push(initializer_list(&items));
            }
            Ok(format!("{{{}}}", initializer_list(&row_lists)))
        }
        _ => emit_operand(ctx, value, Precedence::Infix, outer),
    }
}
