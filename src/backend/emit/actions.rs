//! Dependency-ordered emission plan.
//!
//! Planning walks every non-type global depth-first. Before a definition is recorded, everything it needs is
//! ensured first: struct fields and by-value element types at definition level, pointees at forward-declaration
//! level, and callees at definition level. A callee that is still open (recursion, mutual recursion) falls back
//! to a forward declaration instead. Each instruction is recorded at most once per level.
//!
//! ## Notes
//! - Types are never roots: a struct is only emitted if something emitted uses it.
//! - Functions without a body are only ever declared.

use std::collections::{HashMap, HashSet};

use shadec_ir::{InstId, InstKind, Module};

use super::errors::EmitError;

/// How much of an instruction an action emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EmitLevel {
    ForwardDeclaration,
    Definition,
}

/// One step of the emission plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitAction {
    pub inst: InstId,
    pub level: EmitLevel,
}

/// Compute the emission plan for a module.
#[tracing::instrument(skip_all, fields(globals = module.globals.len()))]
pub fn compute_emit_actions(module: &Module) -> Result<Vec<EmitAction>, EmitError> {
    let mut planner = Planner {
        module,
        actions: Vec::new(),
        levels: HashMap::new(),
        open: HashSet::new(),
    };
    for &global in &module.globals {
        if planner.inst_kind(global)?.is_type() {
            continue;
        }
        planner.ensure_global(global, EmitLevel::Definition)?;
    }
    tracing::debug!(actions = planner.actions.len(), "planned emission");
    Ok(planner.actions)
}

struct Planner<'m> {
    module: &'m Module,
    actions: Vec<EmitAction>,
    levels: HashMap<InstId, EmitLevel>,
    open: HashSet<InstId>,
}

impl<'m> Planner<'m> {
    fn inst_kind(&self, id: InstId) -> Result<&'m InstKind, EmitError> {
        self.module
            .get(id)
            .map(|inst| &inst.kind)
            .ok_or_else(|| EmitError::malformed(id, "reference to a missing instruction"))
    }

    fn record(&mut self, inst: InstId, level: EmitLevel) {
        self.levels.insert(inst, level);
        self.actions.push(EmitAction { inst, level });
    }

    fn ensure_global(&mut self, id: InstId, required: EmitLevel) -> Result<(), EmitError> {
        let kind = self.inst_kind(id)?;
        let required = match kind {
            InstKind::Func { body: None, .. } => EmitLevel::ForwardDeclaration,
            InstKind::Func { .. } | InstKind::StructType { .. } | InstKind::GlobalVar { .. } => required,
            _ if kind.is_type() => return self.ensure_type(id, required),
            _ => return Ok(()),
        };

        let existing = self.levels.get(&id).copied();
        if existing.is_some_and(|level| level >= required) {
            return Ok(());
        }

        if required == EmitLevel::ForwardDeclaration {
            self.record(id, EmitLevel::ForwardDeclaration);
            return Ok(());
        }

        if self.open.contains(&id) {
            return match kind {
                InstKind::Func { .. } => {
                    if existing.is_none() {
                        self.record(id, EmitLevel::ForwardDeclaration);
                    }
                    Ok(())
                }
                _ => Err(EmitError::malformed(
                    id,
                    format!("{} depends on itself by value", kind.name()),
                )),
            };
        }

        self.open.insert(id);
        self.ensure_dependencies(id, kind)?;
        self.open.remove(&id);
        self.record(id, EmitLevel::Definition);
        Ok(())
    }

    fn ensure_type(&mut self, ty: InstId, required: EmitLevel) -> Result<(), EmitError> {
        let inst = self.module.inst(ty).map_err(|_| EmitError::malformed(ty, "reference to a missing type"))?;
        match &inst.kind {
            InstKind::StructType { .. } => self.ensure_global(ty, required),
            InstKind::PtrType => match inst.operands.first() {
                Some(&pointee) => self.ensure_type(pointee, EmitLevel::ForwardDeclaration),
                None => Ok(()),
            },
            InstKind::VectorType { .. }
            | InstKind::MatrixType { .. }
            | InstKind::ArrayType { .. }
            | InstKind::TextureType { .. }
            | InstKind::TextureSamplerType => match inst.operands.first() {
                Some(&element) => self.ensure_type(element, required),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn ensure_dependencies(&mut self, id: InstId, kind: &'m InstKind) -> Result<(), EmitError> {
        let inst = self.module.inst(id)?;
        if let Some(ty) = inst.ty {
            self.ensure_type(ty, EmitLevel::Definition)?;
        }
        match kind {
            InstKind::StructType { fields } => {
                for field in fields {
                    self.ensure_type(field.ty, EmitLevel::Definition)?;
                }
            }
            InstKind::Func { params, body } => {
                for &param in params {
                    self.ensure_local(param)?;
                }
                if let Some(body) = body {
                    self.ensure_block(*body)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn ensure_block(&mut self, block: InstId) -> Result<(), EmitError> {
        let InstKind::Block { insts } = self.inst_kind(block)? else {
            return Err(EmitError::malformed(block, "expected a block"));
        };
        for &inst in insts {
            self.ensure_local(inst)?;
        }
        Ok(())
    }

    /// Ensure what a function-local instruction refers to.
    fn ensure_local(&mut self, id: InstId) -> Result<(), EmitError> {
        let inst = self.module.inst(id)?;
        if let Some(ty) = inst.ty {
            self.ensure_type(ty, EmitLevel::Definition)?;
        }
        for &operand in &inst.operands {
            self.ensure_operand(operand)?;
        }
        match &inst.kind {
            InstKind::IfElse { then_block, else_block } => {
                self.ensure_block(*then_block)?;
                if let Some(else_block) = else_block {
                    self.ensure_block(*else_block)?;
                }
            }
            InstKind::Loop { body } => self.ensure_block(*body)?,
            _ => {}
        }
        Ok(())
    }

    fn ensure_operand(&mut self, operand: InstId) -> Result<(), EmitError> {
        let operand_inst = self.module.inst(operand)?;
        match &operand_inst.kind {
            InstKind::Func { .. } | InstKind::GlobalVar { .. } => self.ensure_global(operand, EmitLevel::Definition),
            kind if kind.is_type() => self.ensure_type(operand, EmitLevel::Definition),
            // Arena-only values: walk them here since no block lists them.
            InstKind::Specialize | InstKind::IntLit { .. } | InstKind::FloatLit { .. } | InstKind::BoolLit { .. } => {
                self.ensure_local(operand)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shadec_ir::{BaseType, ModuleBuilder, Rate};

    fn fd(inst: InstId) -> EmitAction {
        EmitAction {
            inst,
            level: EmitLevel::ForwardDeclaration,
        }
    }

    fn def(inst: InstId) -> EmitAction {
        EmitAction {
            inst,
            level: EmitLevel::Definition,
        }
    }

    #[test]
    fn callee_is_defined_before_caller() {
        let mut b = ModuleBuilder::new();
        let int = b.basic(BaseType::Int32);
        // caller first in source order
        let mut main = b.func("main_fn", int);
        let main_id = main.id();
        main.finish_declaration();
        let mut helper = b.func("helper", int);
        let x = helper.param("x", int);
        helper.ret(Some(x));
        let helper_id = helper.finish();
        // give main a body that calls helper by rebuilding it
        let mut caller = b.func("caller", int);
        let one = caller.int(int, 1);
        let r = caller.call(helper_id, int, &[one]);
        caller.ret(Some(r));
        let caller_id = caller.finish();
        let module = b.finish();

        let actions = compute_emit_actions(&module).unwrap();
        assert_eq!(actions, vec![fd(main_id), def(helper_id), def(caller_id)]);
    }

    #[test]
    fn recursion_gets_a_forward_declaration() {
        let mut b = ModuleBuilder::new();
        let int = b.basic(BaseType::Int32);
        let mut f = b.func("fact", int);
        let id = f.id();
        let n = f.param("n", int);
        let r = f.call(id, int, &[n]);
        f.ret(Some(r));
        f.finish();
        let module = b.finish();

        let actions = compute_emit_actions(&module).unwrap();
        assert_eq!(actions, vec![fd(id), def(id)]);
    }

    #[test]
    fn mutual_recursion_declares_the_first() {
        let mut b = ModuleBuilder::new();
        let int = b.basic(BaseType::Int32);
        let mut even = b.func("is_even", int);
        let even_id = even.id();
        even.finish_declaration();
        let mut odd = b.func("is_odd", int);
        let odd_id = odd.id();
        let n = odd.param("n", int);
        let r = odd.call(even_id, int, &[n]);
        odd.ret(Some(r));
        odd.finish();
        let module = b.finish();

        // is_even has no body here, so it is only declared
        let actions = compute_emit_actions(&module).unwrap();
        assert_eq!(actions, vec![fd(even_id), def(odd_id)]);
    }

    #[test]
    fn struct_fields_are_defined_first_and_unused_structs_skipped() {
        let mut b = ModuleBuilder::new();
        let float = b.basic(BaseType::Float);
        let inner = b.struct_type("Inner", &[("v", float)]);
        let outer = b.struct_type("Outer", &[("inner", inner)]);
        let unused = b.struct_type("Unused", &[("v", float)]);
        let g = b.global_var("g", outer, Rate::ThreadLocal);
        let module = b.finish();

        let actions = compute_emit_actions(&module).unwrap();
        assert_eq!(actions, vec![def(inner), def(outer), def(g)]);
        assert!(actions.iter().all(|a| a.inst != unused));
    }

    #[test]
    fn pointers_only_need_a_declaration() {
        let mut b = ModuleBuilder::new();
        let int = b.basic(BaseType::Int32);
        let node = b.struct_type("Node", &[("value", int)]);
        let ptr = b.ptr(node);
        let g = b.global_var("head", ptr, Rate::ThreadLocal);
        let module = b.finish();

        let actions = compute_emit_actions(&module).unwrap();
        assert_eq!(actions, vec![fd(node), def(g)]);
    }

    #[test]
    fn self_containing_struct_is_malformed() {
        let mut module = Module::new();
        let s = module.push(
            shadec_ir::Inst::new(InstKind::StructType {
                fields: vec![shadec_ir::StructField {
                    name: "me".into(),
                    ty: InstId::from_raw(0),
                }],
            })
            .with_name("Loop"),
        );
        let g = module.push(
            shadec_ir::Inst::new(InstKind::GlobalVar { rate: Rate::ThreadLocal })
                .with_ty(s)
                .with_name("g"),
        );
        module.globals.push(g);
        assert!(matches!(
            compute_emit_actions(&module),
            Err(EmitError::MalformedIr { .. })
        ));
    }
}
