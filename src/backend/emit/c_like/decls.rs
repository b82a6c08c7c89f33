//! Declaration emission shared by every dialect, and the default [`DeclEmitter`].

use shadec_ir::{InstId, InstKind, StructField};

use super::CLikeEmitter;
use super::exprs::member_name;
use super::preprocessor;
use super::stmts::emit_block_contents;
use crate::backend::emit::actions::EmitLevel;
use crate::backend::emit::context::EmitContext;
use crate::backend::emit::dialect::{DeclEmitter, Dialect};
use crate::backend::emit::errors::EmitError;
use crate::backend::emit::expr::Expr;
use crate::backend::emit::type_set::{TypeId, TypeSet};
use crate::backend::emit::writer::SourceWriter;

/// Emit a function prototype or full definition.
///
/// ## Parameters
/// - `func`: A `func` instruction.
/// - `level`: [`EmitLevel::ForwardDeclaration`] writes `ret name(params);`, [`EmitLevel::Definition`] writes
///   the body as well (the function must have one).
pub fn emit_function(
    ctx: &mut EmitContext<'_>,
    func: InstId,
    level: EmitLevel,
    outer: &dyn Dialect,
) -> Result<(), EmitError> {
    let inst = ctx.inst(func)?;
    let InstKind::Func { params, body } = &inst.kind else {
        return Err(EmitError::malformed(func, format!("expected a function, found {}", inst.kind.name())));
    };
    let return_type = ctx.type_of(func)?;
    let return_name = outer.calc_type_name(&ctx.types, return_type, outer)?;
    let name = ctx.name_or_assign(func)?;

    let mut declared = Vec::with_capacity(params.len());
    for &param in params {
        if outer.is_param_elided(ctx, param)? {
            continue;
        }
        let ty = ctx.type_of(param)?;
        let ty_name = outer.calc_type_name(&ctx.types, ty, outer)?;
        let param_name = ctx.name_or_assign(param)?;
        declared.push(format!("{ty_name} {param_name}"));
    }

    outer.emit_function_preamble(ctx, func, outer)?;
    ctx.writer
        .write(&format!("{return_name} {name}({})", declared.join(", ")));

    match level {
        EmitLevel::ForwardDeclaration => ctx.writer.writeln(";"),
        EmitLevel::Definition => {
            let body = body.ok_or_else(|| EmitError::malformed(func, "cannot define a function without a body"))?;
            ctx.begin_function(body)?;
            ctx.writer.open_block();
            emit_block_contents(ctx, body, outer)?;
            ctx.writer.close_block("");
            ctx.writer.newline();
        }
    }
    Ok(())
}

/// Emit `struct Name;` or a full struct definition.
pub fn emit_struct(
    ctx: &mut EmitContext<'_>,
    id: InstId,
    level: EmitLevel,
    outer: &dyn Dialect,
) -> Result<(), EmitError> {
    let ty = ctx.import_type(id)?;
    let name = outer.calc_type_name(&ctx.types, ty, outer)?;
    let InstKind::StructType { fields } = &ctx.inst(id)?.kind else {
        return Err(EmitError::malformed(id, "expected a struct type"));
    };
    match level {
        EmitLevel::ForwardDeclaration => ctx.writer.writeln(&format!("struct {name};")),
        EmitLevel::Definition => {
            let members = struct_members(ctx, fields, outer)?;
            ctx.writer.writeln(&format!("struct {name}"));
            ctx.writer.open_block();
            for member in members {
                ctx.writer.writeln(&member);
            }
            ctx.writer.close_block(";");
            ctx.writer.newline();
        }
    }
    Ok(())
}

fn struct_members(
    ctx: &mut EmitContext<'_>,
    fields: &[StructField],
    outer: &dyn Dialect,
) -> Result<Vec<String>, EmitError> {
    let mut members = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let ty = ctx.import_type(field.ty)?;
        let ty_name = outer.calc_type_name(&ctx.types, ty, outer)?;
        members.push(format!("{ty_name} {};", member_name(&field.name, index as u32)));
    }
    Ok(members)
}

/// Emit a global variable definition.
pub fn emit_global_var(ctx: &mut EmitContext<'_>, id: InstId, outer: &dyn Dialect) -> Result<(), EmitError> {
    let ty = ctx.type_of(id)?;
    let ty_name = outer.calc_type_name(&ctx.types, ty, outer)?;
    let name = ctx.name_or_assign(id)?;
    outer.emit_storage_qualifier(ctx, id, outer)?;
    ctx.writer.writeln(&format!("{ty_name} {name};"));
    Ok(())
}

impl DeclEmitter for CLikeEmitter {
    fn emit_function_preamble(
        &self,
        _ctx: &mut EmitContext<'_>,
        _func: InstId,
        _outer: &dyn Dialect,
    ) -> Result<(), EmitError> {
        Ok(())
    }

    fn is_param_elided(&self, _ctx: &EmitContext<'_>, _param: InstId) -> Result<bool, EmitError> {
        Ok(false)
    }

    fn emit_param_ref(
        &self,
        ctx: &mut EmitContext<'_>,
        param: InstId,
        _outer: &dyn Dialect,
    ) -> Result<Expr, EmitError> {
        Ok(Expr::atom(ctx.name_or_assign(param)?))
    }

    fn emit_storage_qualifier(
        &self,
        _ctx: &mut EmitContext<'_>,
        _var: InstId,
        _outer: &dyn Dialect,
    ) -> Result<(), EmitError> {
        Ok(())
    }

    fn emit_loop_control(
        &self,
        _ctx: &mut EmitContext<'_>,
        _loop_inst: InstId,
        _outer: &dyn Dialect,
    ) -> Result<(), EmitError> {
        Ok(())
    }

    fn helper_qualifier(&self) -> &'static str {
        ""
    }

    fn register_builtin_intrinsics(&self, _ctx: &mut EmitContext<'_>, _outer: &dyn Dialect) -> Result<(), EmitError> {
        Ok(())
    }

    fn emit_prelude(&self, w: &mut SourceWriter) {
        for header in ["cstdint", "cmath", "algorithm"] {
            w.writeln(&format!("#include <{header}>"));
        }
        w.newline();
        w.writeln("using std::abs;");
        w.writeln("using std::fmod;");
        w.writeln("using std::max;");
        w.writeln("using std::min;");
        w.writeln("using std::sqrt;");
        w.newline();
        w.writeln("typedef float half;");
        w.newline();
    }

    fn needs_vector_struct(&self, _types: &TypeSet, _ty: TypeId) -> bool {
        true
    }

    fn emit_vector_struct(
        &self,
        types: &TypeSet,
        ty: TypeId,
        w: &mut SourceWriter,
        outer: &dyn Dialect,
    ) -> Result<(), EmitError> {
        preprocessor::emit_vector_struct_body(types, ty, w, outer)
    }

    fn emit_preprocessor(&self, ctx: &mut EmitContext<'_>, outer: &dyn Dialect) -> Result<String, EmitError> {
        preprocessor::generate(ctx, outer)
    }
}
