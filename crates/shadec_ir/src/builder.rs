//! A thin builder for assembling modules in tests, demos, and front ends.
//!
//! ## Notes
//! - Structural types are memoized so repeated requests return the same id.
//! - Functions are registered in `globals` when building starts, so a body can call its own function.
//! - Literals are arena-only; every other value is appended to the innermost open block.

use std::collections::HashMap;

use shadec_core::lang::intrinsics::IntrinsicOpId;
use shadec_core::lang::semantics::SystemValueSemantic;

use crate::decorations::{Decoration, LoopControlMode, Stage};
use crate::inst::{Inst, InstId, InstKind, Rate, StructField};
use crate::module::Module;
use crate::types::{BaseType, ResourceAccess};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TypeKey {
    Basic(BaseType),
    Vector(InstId, u32),
    Matrix(InstId, u32, u32),
    Array(InstId, Option<u32>),
    Ptr(InstId),
}

/// Builds a [`Module`] one instruction at a time.
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    module: Module,
    types: HashMap<TypeKey, InstId>,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.module.name = Some(name.into());
        self
    }

    /// Append an instruction without listing it as a global.
    pub fn push(&mut self, inst: Inst) -> InstId {
        self.module.push(inst)
    }

    /// Append an instruction and list it as a global.
    pub fn push_global(&mut self, inst: Inst) -> InstId {
        let id = self.module.push(inst);
        self.module.globals.push(id);
        id
    }

    pub fn decorate(&mut self, id: InstId, decoration: Decoration) {
        if let Some(inst) = self.module.get_mut(id) {
            inst.decorations.push(decoration);
        }
    }

    fn interned(&mut self, key: TypeKey, make: impl FnOnce() -> Inst) -> InstId {
        if let Some(&id) = self.types.get(&key) {
            return id;
        }
        let id = self.push_global(make());
        self.types.insert(key, id);
        id
    }

    pub fn basic(&mut self, base: BaseType) -> InstId {
        self.interned(TypeKey::Basic(base), || Inst::new(InstKind::BasicType { base }))
    }

    pub fn vector(&mut self, element: InstId, count: u32) -> InstId {
        self.interned(TypeKey::Vector(element, count), || {
            Inst::new(InstKind::VectorType { count }).with_operands(vec![element])
        })
    }

    pub fn matrix(&mut self, element: InstId, rows: u32, cols: u32) -> InstId {
        self.interned(TypeKey::Matrix(element, rows, cols), || {
            Inst::new(InstKind::MatrixType { rows, cols }).with_operands(vec![element])
        })
    }

    pub fn array(&mut self, element: InstId, count: Option<u32>) -> InstId {
        self.interned(TypeKey::Array(element, count), || {
            Inst::new(InstKind::ArrayType { count }).with_operands(vec![element])
        })
    }

    pub fn ptr(&mut self, pointee: InstId) -> InstId {
        self.interned(TypeKey::Ptr(pointee), || {
            Inst::new(InstKind::PtrType).with_operands(vec![pointee])
        })
    }

    pub fn texture(&mut self, element: InstId, access: ResourceAccess, multisample: bool) -> InstId {
        self.push_global(Inst::new(InstKind::TextureType { access, multisample }).with_operands(vec![element]))
    }

    pub fn texture_sampler(&mut self, element: InstId) -> InstId {
        self.push_global(Inst::new(InstKind::TextureSamplerType).with_operands(vec![element]))
    }

    pub fn sampler_state(&mut self, comparison: bool) -> InstId {
        self.push_global(Inst::new(InstKind::SamplerStateType { comparison }))
    }

    pub fn struct_type(&mut self, name: &str, fields: &[(&str, InstId)]) -> InstId {
        let fields = fields
            .iter()
            .map(|(name, ty)| StructField {
                name: (*name).to_string(),
                ty: *ty,
            })
            .collect();
        self.push_global(Inst::new(InstKind::StructType { fields }).with_name(name))
    }

    pub fn global_var(&mut self, name: &str, ty: InstId, rate: Rate) -> InstId {
        self.push_global(Inst::new(InstKind::GlobalVar { rate }).with_ty(ty).with_name(name))
    }

    /// Start a function returning `return_ty`.
    pub fn func(&mut self, name: &str, return_ty: InstId) -> FunctionBuilder<'_> {
        let func = self.push_global(
            Inst::new(InstKind::Func {
                params: Vec::new(),
                body: None,
            })
            .with_ty(return_ty)
            .with_name(name),
        );
        FunctionBuilder {
            builder: self,
            func,
            params: Vec::new(),
            blocks: vec![Vec::new()],
        }
    }

    pub fn finish(self) -> Module {
        self.module
    }
}

/// Builds one function body. Obtained from [`ModuleBuilder::func`].
#[derive(Debug)]
pub struct FunctionBuilder<'m> {
    builder: &'m mut ModuleBuilder,
    func: InstId,
    params: Vec<InstId>,
    blocks: Vec<Vec<InstId>>,
}

impl FunctionBuilder<'_> {
    /// Id of the function being built (usable as a callee before [`Self::finish`]).
    pub fn id(&self) -> InstId {
        self.func
    }

    /// Access the module builder, e.g. to create types mid-body.
    pub fn module(&mut self) -> &mut ModuleBuilder {
        self.builder
    }

    pub fn decorate(&mut self, decoration: Decoration) -> &mut Self {
        self.builder.decorate(self.func, decoration);
        self
    }

    pub fn entry_point(&mut self) -> &mut Self {
        self.decorate(Decoration::EntryPoint { stage: Stage::Compute })
    }

    pub fn param(&mut self, name: &str, ty: InstId) -> InstId {
        let id = self.builder.push(Inst::new(InstKind::Param).with_ty(ty).with_name(name));
        self.params.push(id);
        id
    }

    pub fn system_value_param(&mut self, name: &str, ty: InstId, semantic: SystemValueSemantic) -> InstId {
        let id = self.param(name, ty);
        self.builder.decorate(id, Decoration::SystemValue { semantic });
        id
    }

    /// Open a nested block; values emitted until [`Self::end_block`] land in it.
    pub fn begin_block(&mut self) {
        self.blocks.push(Vec::new());
    }

    /// Close the innermost block and return its id.
    pub fn end_block(&mut self) -> InstId {
        let insts = self.blocks.pop().unwrap_or_default();
        if self.blocks.is_empty() {
            self.blocks.push(Vec::new());
        }
        self.builder.push(Inst::new(InstKind::Block { insts }))
    }

    /// Append an instruction to the innermost open block.
    pub fn emit(&mut self, inst: Inst) -> InstId {
        let id = self.builder.push(inst);
        if let Some(block) = self.blocks.last_mut() {
            block.push(id);
        }
        id
    }

    fn value(&mut self, kind: InstKind, ty: InstId, operands: Vec<InstId>) -> InstId {
        self.emit(Inst::new(kind).with_ty(ty).with_operands(operands))
    }

    pub fn int(&mut self, ty: InstId, value: i64) -> InstId {
        self.builder.push(Inst::new(InstKind::IntLit { value }).with_ty(ty))
    }

    pub fn float(&mut self, ty: InstId, value: f64) -> InstId {
        self.builder.push(Inst::new(InstKind::FloatLit { value }).with_ty(ty))
    }

    pub fn bool(&mut self, ty: InstId, value: bool) -> InstId {
        self.builder.push(Inst::new(InstKind::BoolLit { value }).with_ty(ty))
    }

    pub fn arith(&mut self, intrinsic: IntrinsicOpId, ty: InstId, operands: &[InstId]) -> InstId {
        self.value(InstKind::Arith { intrinsic }, ty, operands.to_vec())
    }

    pub fn construct(&mut self, ty: InstId, args: &[InstId]) -> InstId {
        self.value(InstKind::Construct, ty, args.to_vec())
    }

    pub fn make_vector(&mut self, ty: InstId, elements: &[InstId]) -> InstId {
        self.value(InstKind::MakeVector, ty, elements.to_vec())
    }

    pub fn make_matrix(&mut self, ty: InstId, elements: &[InstId]) -> InstId {
        self.value(InstKind::MakeMatrix, ty, elements.to_vec())
    }

    pub fn make_array(&mut self, ty: InstId, elements: &[InstId]) -> InstId {
        self.value(InstKind::MakeArray, ty, elements.to_vec())
    }

    pub fn call(&mut self, callee: InstId, return_ty: InstId, args: &[InstId]) -> InstId {
        let operands = std::iter::once(callee).chain(args.iter().copied()).collect();
        self.value(InstKind::Call, return_ty, operands)
    }

    /// Specialize a generic callee; arena-only, like literals.
    pub fn specialize(&mut self, generic: InstId, ty: InstId, type_args: &[InstId]) -> InstId {
        let operands: Vec<InstId> = std::iter::once(generic).chain(type_args.iter().copied()).collect();
        self.builder
            .push(Inst::new(InstKind::Specialize).with_ty(ty).with_operands(operands))
    }

    pub fn var(&mut self, name: &str, ty: InstId) -> InstId {
        self.emit(Inst::new(InstKind::Var).with_ty(ty).with_name(name))
    }

    pub fn load(&mut self, ty: InstId, source: InstId) -> InstId {
        self.value(InstKind::Load, ty, vec![source])
    }

    pub fn store(&mut self, destination: InstId, value: InstId) -> InstId {
        self.emit(Inst::new(InstKind::Store).with_operands(vec![destination, value]))
    }

    pub fn element_ptr(&mut self, ty: InstId, base: InstId, index: InstId) -> InstId {
        self.value(InstKind::GetElementPtr, ty, vec![base, index])
    }

    pub fn element(&mut self, ty: InstId, base: InstId, index: InstId) -> InstId {
        self.value(InstKind::GetElement, ty, vec![base, index])
    }

    pub fn field_address(&mut self, ty: InstId, base: InstId, field: u32) -> InstId {
        self.value(InstKind::FieldAddress { field }, ty, vec![base])
    }

    pub fn field_extract(&mut self, ty: InstId, base: InstId, field: u32) -> InstId {
        self.value(InstKind::FieldExtract { field }, ty, vec![base])
    }

    pub fn swizzle(&mut self, ty: InstId, base: InstId, indices: &[u32]) -> InstId {
        self.value(
            InstKind::Swizzle {
                indices: indices.to_vec(),
            },
            ty,
            vec![base],
        )
    }

    pub fn wave_ballot(&mut self, ty: InstId, mask: InstId, condition: InstId) -> InstId {
        self.value(InstKind::WaveMaskBallot, ty, vec![mask, condition])
    }

    pub fn wave_match(&mut self, ty: InstId, mask: InstId, value: InstId) -> InstId {
        self.value(InstKind::WaveMaskMatch, ty, vec![mask, value])
    }

    pub fn if_else(&mut self, condition: InstId, then_block: InstId, else_block: Option<InstId>) -> InstId {
        self.emit(Inst::new(InstKind::IfElse { then_block, else_block }).with_operands(vec![condition]))
    }

    pub fn loop_(&mut self, body: InstId, control: Option<LoopControlMode>) -> InstId {
        let mut inst = Inst::new(InstKind::Loop { body });
        if let Some(mode) = control {
            inst = inst.with_decoration(Decoration::LoopControl { mode });
        }
        self.emit(inst)
    }

    pub fn break_(&mut self) -> InstId {
        self.emit(Inst::new(InstKind::Break))
    }

    pub fn continue_(&mut self) -> InstId {
        self.emit(Inst::new(InstKind::Continue))
    }

    pub fn ret(&mut self, value: Option<InstId>) -> InstId {
        self.emit(Inst::new(InstKind::Return).with_operands(value.into_iter().collect::<Vec<_>>()))
    }

    /// Close the body block and attach it and the parameters to the function.
    pub fn finish(mut self) -> InstId {
        while self.blocks.len() > 1 {
            self.end_block();
        }
        let insts = self.blocks.pop().unwrap_or_default();
        let body = self.builder.push(Inst::new(InstKind::Block { insts }));
        self.set_signature(Some(body));
        self.func
    }

    /// Finish as a prototype with no body.
    pub fn finish_declaration(mut self) -> InstId {
        self.set_signature(None);
        self.func
    }

    fn set_signature(&mut self, body: Option<InstId>) {
        let params = std::mem::take(&mut self.params);
        if let Some(inst) = self.builder.module.get_mut(self.func) {
            inst.kind = InstKind::Func { params, body };
        }
    }
}
