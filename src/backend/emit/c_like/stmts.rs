//! Statement emission shared by every dialect.

use shadec_ir::{BaseType, InstId, InstKind};

use super::exprs::{emit_expr, emit_lvalue, emit_operand, operand};
use crate::backend::emit::context::EmitContext;
use crate::backend::emit::dialect::Dialect;
use crate::backend::emit::errors::EmitError;
use crate::backend::emit::expr::Precedence;
use crate::backend::emit::type_set::TypeData;

/// Emit every statement of `block` at the current indentation.
pub fn emit_block_contents(ctx: &mut EmitContext<'_>, block: InstId, outer: &dyn Dialect) -> Result<(), EmitError> {
    let InstKind::Block { insts } = &ctx.inst(block)?.kind else {
        return Err(EmitError::malformed(block, "expected a block"));
    };
    for &inst in insts {
        emit_statement(ctx, inst, outer)?;
    }
    Ok(())
}

/// Emit `block` wrapped in braces.
pub fn emit_braced_block(ctx: &mut EmitContext<'_>, block: InstId, outer: &dyn Dialect) -> Result<(), EmitError> {
    ctx.writer.open_block();
    emit_block_contents(ctx, block, outer)?;
    ctx.writer.close_block("");
    Ok(())
}

/// Emit one instruction of a block.
pub fn emit_statement(ctx: &mut EmitContext<'_>, id: InstId, outer: &dyn Dialect) -> Result<(), EmitError> {
    let inst = ctx.inst(id)?;
    match &inst.kind {
        InstKind::Var => {
            let ty = ctx.type_of(id)?;
            let ty_name = outer.calc_type_name(&ctx.types, ty, outer)?;
            let name = ctx.name_or_assign(id)?;
            ctx.writer.writeln(&format!("{ty_name} {name};"));
        }
        InstKind::Store => {
            let destination = operand(ctx, id, 0)?;
            let value = operand(ctx, id, 1)?;
            let lhs = emit_lvalue(ctx, destination, outer)?;
            let rhs = emit_operand(ctx, value, Precedence::Infix, outer)?;
            ctx.writer.writeln(&format!("{lhs} = {rhs};"));
        }
        InstKind::IfElse { then_block, else_block } => {
            let condition = operand(ctx, id, 0)?;
            let condition = emit_operand(ctx, condition, Precedence::Infix, outer)?;
            ctx.writer.writeln(&format!("if ({condition})"));
            emit_braced_block(ctx, *then_block, outer)?;
            if let Some(else_block) = else_block {
                ctx.writer.writeln("else");
                emit_braced_block(ctx, *else_block, outer)?;
            }
        }
        InstKind::Loop { body } => {
            outer.emit_loop_control(ctx, id, outer)?;
            ctx.writer.writeln("for (;;)");
            emit_braced_block(ctx, *body, outer)?;
        }
        InstKind::Break => ctx.writer.writeln("break;"),
        InstKind::Continue => ctx.writer.writeln("continue;"),
        InstKind::Return => match inst.operands.first() {
            Some(&value) => {
                let value = emit_operand(ctx, value, Precedence::Infix, outer)?;
                ctx.writer.writeln(&format!("return {value};"));
            }
            None => ctx.writer.writeln("return;"),
        },
        InstKind::Block { .. } => emit_braced_block(ctx, id, outer)?,
        // Rendered at every use.
        InstKind::IntLit { .. }
        | InstKind::FloatLit { .. }
        | InstKind::BoolLit { .. }
        | InstKind::Specialize
        | InstKind::GetElementPtr
        | InstKind::FieldAddress { .. } => {}
        InstKind::Param | InstKind::GlobalVar { .. } | InstKind::Func { .. } => {
            return Err(EmitError::malformed(
                id,
                format!("{} cannot appear inside a block", inst.kind.name()),
            ));
        }
        kind if kind.is_type() => {
            return Err(EmitError::malformed(id, "types cannot appear inside a block"));
        }
        _ => emit_value_statement(ctx, id, outer)?,
    }
    Ok(())
}

/// Emit a value-producing instruction as a temporary, or as an expression statement when it has no value.
fn emit_value_statement(ctx: &mut EmitContext<'_>, id: InstId, outer: &dyn Dialect) -> Result<(), EmitError> {
    if ctx.is_folded(id) {
        return Ok(());
    }
    let ty = ctx.type_of(id)?;
    let expr = emit_expr(ctx, id, outer)?;
    if matches!(ctx.types.get(ty), TypeData::Basic(BaseType::Void)) {
        ctx.writer.writeln(&format!("{};", expr.text));
        return Ok(());
    }
    let ty_name = outer.calc_type_name(&ctx.types, ty, outer)?;
    let name = ctx.name_or_assign(id)?;
    ctx.writer.writeln(&format!("{ty_name} {name} = {};", expr.text));
    Ok(())
}
