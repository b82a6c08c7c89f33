//! Module emission driver.
//!
//! One call to [`SourceEmitter::emit`] is one pass: validate, register types and implicit intrinsics, plan,
//! then emit forward declarations, shared globals, remaining globals and function bodies, and finally the
//! preprocessor section that goes in front of all of it. The pass either returns the whole text or an error.

use shadec_core::SemanticVersion;
use shadec_core::lang::targets::TargetDialect;
use shadec_ir::{InstKind, Module, Rate};

use super::actions::{EmitAction, EmitLevel, compute_emit_actions};
use super::c_like::decls::{emit_function, emit_global_var, emit_struct};
use super::config::EmitOptions;
use super::context::{EmitContext, Phase};
use super::dialect::{Dialect, dialect_for};
use super::errors::EmitError;
use crate::version::SHADEC_VERSION;

/// Result of a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedSource {
    /// Complete generated source text
    pub code: String,
    /// Dialect the text is written in
    pub target: TargetDialect,
    /// Lowest CUDA SM version the text needs; never below the requested floor
    pub required_version: SemanticVersion,
}

/// Reusable emitter for one target configuration.
pub struct SourceEmitter {
    options: EmitOptions,
    dialect: Box<dyn Dialect>,
}

impl SourceEmitter {
    pub fn new(options: EmitOptions) -> Self {
        Self {
            dialect: dialect_for(options.target),
            options,
        }
    }

    pub fn options(&self) -> &EmitOptions {
        &self.options
    }

    /// Emit `module` as source text.
    ///
    /// ## Returns
    /// - The generated source and the final capability requirement.
    /// - The first error any step reports; no partial text is returned.
    #[tracing::instrument(skip_all, fields(target = %self.options.target, insts = module.len()))]
    pub fn emit(&self, module: &Module) -> Result<EmittedSource, EmitError> {
        module.validate()?;
        let outer = self.dialect.as_ref();
        let mut ctx = EmitContext::new(module, self.options.clone());

        ctx.types.add_all_builtin_types(module)?;
        ctx.types.add_vector_for_matrix_types();
        outer.register_builtin_intrinsics(&mut ctx, outer)?;
        ctx.advance(Phase::TypesRegistered)?;

        let actions = compute_emit_actions(module)?;
        ctx.reserve_generated_names(outer);
        ctx.reserve_global_names()?;
        ctx.advance(Phase::ActionsPlanned)?;

        emit_declarations(&mut ctx, &actions, outer)?;
        ctx.advance(Phase::ForwardDeclsEmitted)?;

        emit_globals(&mut ctx, &actions, Rate::GroupShared, outer)?;
        ctx.advance(Phase::SharedGlobalsEmitted)?;
        emit_globals(&mut ctx, &actions, Rate::ThreadLocal, outer)?;
        ctx.advance(Phase::ThreadLocalGlobalsEmitted)?;

        for action in &actions {
            let is_function = matches!(ctx.inst(action.inst)?.kind, InstKind::Func { .. });
            if is_function && action.level == EmitLevel::Definition {
                emit_function(&mut ctx, action.inst, EmitLevel::Definition, outer)?;
            }
        }
        ctx.advance(Phase::FunctionsEmitted)?;

        let preprocessor = outer.emit_preprocessor(&mut ctx, outer)?;
        ctx.advance(Phase::Done)?;

        let required_version = ctx.extensions.sm_version();
        let mut code = String::new();
        if self.options.emit_header {
            code.push_str(&header(self.options.target, required_version));
        }
        code.push_str(&preprocessor);
        code.push_str(ctx.writer.as_str());
        tracing::debug!(bytes = code.len(), required = %required_version, "emitted module");

        Ok(EmittedSource {
            code,
            target: self.options.target,
            required_version,
        })
    }
}

/// Emit `module` with `options`.
pub fn emit_module(module: &Module, options: &EmitOptions) -> Result<EmittedSource, EmitError> {
    SourceEmitter::new(options.clone()).emit(module)
}

fn header(target: TargetDialect, required: SemanticVersion) -> String {
    match target {
        TargetDialect::Cuda => {
            format!("// Generated by shadec {SHADEC_VERSION} (target: {target}, requires SM {required})\n\n")
        }
        TargetDialect::Cpp => format!("// Generated by shadec {SHADEC_VERSION} (target: {target})\n\n"),
    }
}

/// Function prototypes and struct declarations/definitions, in plan order.
fn emit_declarations(ctx: &mut EmitContext<'_>, actions: &[EmitAction], outer: &dyn Dialect) -> Result<(), EmitError> {
    let mut wrote_prototype = false;
    for action in actions {
        match ctx.inst(action.inst)?.kind {
            InstKind::Func { .. } if action.level == EmitLevel::ForwardDeclaration => {
                emit_function(ctx, action.inst, EmitLevel::ForwardDeclaration, outer)?;
                wrote_prototype = true;
            }
            InstKind::StructType { .. } => {
                if wrote_prototype {
                    ctx.writer.newline();
                    wrote_prototype = false;
                }
                emit_struct(ctx, action.inst, action.level, outer)?;
            }
            _ => {}
        }
    }
    if wrote_prototype {
        ctx.writer.newline();
    }
    Ok(())
}

fn emit_globals(
    ctx: &mut EmitContext<'_>,
    actions: &[EmitAction],
    rate: Rate,
    outer: &dyn Dialect,
) -> Result<(), EmitError> {
    let mut wrote_any = false;
    for action in actions {
        if let InstKind::GlobalVar { rate: var_rate } = ctx.inst(action.inst)?.kind {
            if var_rate == rate {
                emit_global_var(ctx, action.inst, outer)?;
                wrote_any = true;
            }
        }
    }
    if wrote_any {
        ctx.writer.newline();
    }
    Ok(())
}
