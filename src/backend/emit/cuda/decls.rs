//! CUDA declarations: kernel preambles, system values, storage and the typedef prelude.

use shadec_core::lang::intrinsics::IntrinsicOpId;
use shadec_core::lang::semantics::{self, SystemValueSemantic};
use shadec_ir::{BaseType, InstId, InstKind, LoopControlMode, Rate};

use super::CudaEmitter;
use crate::backend::emit::context::EmitContext;
use crate::backend::emit::dialect::{DeclEmitter, Dialect};
use crate::backend::emit::errors::EmitError;
use crate::backend::emit::expr::{Expr, Precedence};
use crate::backend::emit::intrinsics::{SpecializedIntrinsic, specialized_name};
use crate::backend::emit::type_set::{Shape, TypeData, TypeId, TypeSet};
use crate::backend::emit::writer::SourceWriter;

/// Scalar typedefs behind the CUDA scalar names that the toolkit headers do not define.
const SCALAR_TYPEDEFS: &[(&str, &str)] = &[
    ("long long", "longlong"),
    ("unsigned long long", "ulonglong"),
    ("unsigned char", "uchar"),
    ("unsigned short", "ushort"),
    ("unsigned int", "uint"),
];

/// The `uint3` helpers used for thread-index arithmetic.
fn uint3_intrinsics(types: &mut TypeSet) -> [SpecializedIntrinsic; 2] {
    let uint = types.add(TypeData::Basic(BaseType::UInt32));
    let uint3 = types.add_vector_type(uint, 3);
    [
        SpecializedIntrinsic::new(IntrinsicOpId::Mul, uint3, vec![uint3, uint3]),
        SpecializedIntrinsic::new(IntrinsicOpId::Add, uint3, vec![uint3, uint3]),
    ]
}

/// Expression for a system value, as a `uint3` (or a scalar for the flattened group index).
pub fn system_value_expr(
    types: &mut TypeSet,
    semantic: SystemValueSemantic,
    outer: &dyn Dialect,
) -> Result<Expr, EmitError> {
    Ok(match semantic {
        SystemValueSemantic::DispatchThreadId => {
            let [mul, add] = uint3_intrinsics(types);
            let mul = specialized_name(types, &mul, outer)?;
            let add = specialized_name(types, &add, outer)?;
            Expr::atom(format!("{add}({mul}(blockIdx, blockDim), threadIdx)"))
        }
        SystemValueSemantic::GroupId => Expr::atom("blockIdx"),
        SystemValueSemantic::GroupThreadId => Expr::atom("threadIdx"),
        SystemValueSemantic::GroupIndex => Expr::new(
            "(threadIdx.z * blockDim.y + threadIdx.y) * blockDim.x + threadIdx.x",
            Precedence::Infix,
        ),
    })
}

impl DeclEmitter for CudaEmitter {
    fn emit_function_preamble(
        &self,
        ctx: &mut EmitContext<'_>,
        func: InstId,
        _outer: &dyn Dialect,
    ) -> Result<(), EmitError> {
        if ctx.inst(func)?.is_entry_point() {
            ctx.writer.write("extern \"C\" __global__ ");
        } else {
            ctx.writer.write("__device__ ");
        }
        Ok(())
    }

    fn is_param_elided(&self, ctx: &EmitContext<'_>, param: InstId) -> Result<bool, EmitError> {
        Ok(ctx.inst(param)?.system_value().is_some())
    }

    fn emit_param_ref(
        &self,
        ctx: &mut EmitContext<'_>,
        param: InstId,
        outer: &dyn Dialect,
    ) -> Result<Expr, EmitError> {
        let Some(semantic) = ctx.inst(param)?.system_value() else {
            return self.base.emit_param_ref(ctx, param, outer);
        };
        let ty = ctx.type_of(param)?;
        let shape = ctx.types.shape(ty);
        let value = system_value_expr(&mut ctx.types, semantic, outer)?;
        let is_index = |base: BaseType| matches!(base, BaseType::UInt32 | BaseType::Int32);
        match (semantic, shape) {
            (SystemValueSemantic::GroupIndex, Shape::Scalar(base)) if is_index(base) => Ok(value),
            (SystemValueSemantic::GroupIndex, _) => Err(EmitError::unsupported(format!(
                "group index bound to a parameter of type {}",
                ctx.types.describe(ty)
            ))),
            (
                _,
                Shape::Vector {
                    element: BaseType::UInt32,
                    count: 3,
                },
            ) => Ok(value),
            (_, Shape::Scalar(base)) if is_index(base) => Ok(Expr::atom(format!("{}.x", value.text))),
            _ => Err(EmitError::unsupported(format!(
                "{} bound to a parameter of type {}",
                semantics::as_str(semantic),
                ctx.types.describe(ty)
            ))),
        }
    }

    fn emit_storage_qualifier(
        &self,
        ctx: &mut EmitContext<'_>,
        var: InstId,
        outer: &dyn Dialect,
    ) -> Result<(), EmitError> {
        match ctx.inst(var)?.kind {
            InstKind::GlobalVar {
                rate: Rate::GroupShared,
            } => {
                ctx.writer.write("__shared__ ");
                Ok(())
            }
            _ => self.base.emit_storage_qualifier(ctx, var, outer),
        }
    }

    fn emit_loop_control(
        &self,
        ctx: &mut EmitContext<'_>,
        loop_inst: InstId,
        outer: &dyn Dialect,
    ) -> Result<(), EmitError> {
        match ctx.inst(loop_inst)?.loop_control() {
            Some(LoopControlMode::Unroll) => {
                ctx.writer.writeln("#pragma unroll");
                Ok(())
            }
            _ => self.base.emit_loop_control(ctx, loop_inst, outer),
        }
    }

    fn helper_qualifier(&self) -> &'static str {
        "__device__ "
    }

    fn register_builtin_intrinsics(&self, ctx: &mut EmitContext<'_>, _outer: &dyn Dialect) -> Result<(), EmitError> {
        for intrinsic in uint3_intrinsics(&mut ctx.types) {
            ctx.intrinsics.add(intrinsic);
        }
        Ok(())
    }

    fn emit_prelude(&self, w: &mut SourceWriter) {
        for (spelled, name) in SCALAR_TYPEDEFS {
            w.writeln(&format!("typedef {spelled} {name};"));
        }
        w.newline();
    }

    fn needs_vector_struct(&self, types: &TypeSet, ty: TypeId) -> bool {
        matches!(types.shape(ty), Shape::Vector { element: BaseType::Bool, .. })
    }

    fn emit_vector_struct(
        &self,
        types: &TypeSet,
        ty: TypeId,
        w: &mut SourceWriter,
        outer: &dyn Dialect,
    ) -> Result<(), EmitError> {
        self.base.emit_vector_struct(types, ty, w, outer)?;

        // Give the struct the same make_ factory the built-in vectors have.
        let Shape::Vector { count, .. } = types.shape(ty) else {
            return Ok(());
        };
        let name = outer.calc_type_name(types, ty, outer)?;
        let components = &crate::backend::emit::c_like::exprs::COMPONENTS[..count as usize];
        let params: Vec<String> = components.iter().map(|c| format!("bool {c}")).collect();
        w.writeln(&format!(
            "{}{name} make_{name}({})",
            outer.helper_qualifier(),
            params.join(", ")
        ));
        w.open_block();
        w.writeln(&format!("return {name}{{{}}};", components.join(", ")));
        w.close_block("");
        w.newline();
        Ok(())
    }

    fn emit_preprocessor(&self, ctx: &mut EmitContext<'_>, outer: &dyn Dialect) -> Result<String, EmitError> {
        self.base.emit_preprocessor(ctx, outer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::emit::c_like::decls::{emit_function, emit_global_var};
    use crate::backend::emit::actions::EmitLevel;
    use crate::backend::emit::config::EmitOptions;
    use shadec_ir::{Module, ModuleBuilder};

    fn emit_fn(module: &Module, func: InstId) -> Result<String, EmitError> {
        let outer = CudaEmitter::new();
        let mut ctx = EmitContext::new(module, EmitOptions::default());
        ctx.reserve_global_names()?;
        emit_function(&mut ctx, func, EmitLevel::Definition, &outer)?;
        Ok(ctx.writer.as_str().to_string())
    }

    #[test]
    fn entry_points_are_kernels_and_others_device_functions() {
        let mut b = ModuleBuilder::new();
        let void = b.basic(BaseType::Void);
        let mut kernel = b.func("main_kernel", void);
        kernel.entry_point();
        kernel.ret(None);
        let kernel = kernel.finish();
        let mut helper = b.func("helper", void);
        helper.ret(None);
        let helper = helper.finish();
        let module = b.finish();
        assert!(emit_fn(&module, kernel).unwrap().starts_with("extern \"C\" __global__ void main_kernel()"));
        assert!(emit_fn(&module, helper).unwrap().starts_with("__device__ void helper()"));
    }

    #[test]
    fn system_value_params_are_elided_and_read_from_builtins() {
        let mut b = ModuleBuilder::new();
        let void = b.basic(BaseType::Void);
        let uint = b.basic(BaseType::UInt32);
        let uint3 = b.vector(uint, 3);
        let out = b.global_var("out", uint3, Rate::ThreadLocal);
        let mut kernel = b.func("k", void);
        kernel.entry_point();
        let tid = kernel.system_value_param("tid", uint3, SystemValueSemantic::DispatchThreadId);
        kernel.param("scale", uint);
        kernel.store(out, tid);
        kernel.ret(None);
        let kernel = kernel.finish();
        let module = b.finish();
        assert_eq!(
            emit_fn(&module, kernel).unwrap(),
            "extern \"C\" __global__ void k(uint scale)\n{\n    out = add_uint3_uint3(mul_uint3_uint3(blockIdx, blockDim), threadIdx);\n    return;\n}\n\n"
        );
    }

    #[test]
    fn scalar_system_values_take_the_x_component() {
        let mut b = ModuleBuilder::new();
        let uint = b.basic(BaseType::UInt32);
        let mut f = b.func("lane", uint);
        let group = f.system_value_param("g", uint, SystemValueSemantic::GroupId);
        let index = f.system_value_param("i", uint, SystemValueSemantic::GroupIndex);
        let sum = f.arith(IntrinsicOpId::Add, uint, &[group, index]);
        f.ret(Some(sum));
        let func = f.finish();
        let module = b.finish();
        assert!(
            emit_fn(&module, func)
                .unwrap()
                .contains("return blockIdx.x + ((threadIdx.z * blockDim.y + threadIdx.y) * blockDim.x + threadIdx.x);")
        );
    }

    #[test]
    fn float_system_values_are_unsupported() {
        let mut b = ModuleBuilder::new();
        let float = b.basic(BaseType::Float);
        let mut f = b.func("bad", float);
        let tid = f.system_value_param("t", float, SystemValueSemantic::GroupThreadId);
        f.ret(Some(tid));
        let func = f.finish();
        let module = b.finish();
        assert!(matches!(emit_fn(&module, func), Err(EmitError::Unsupported(_))));
    }

    #[test]
    fn shared_globals_are_qualified() {
        let mut b = ModuleBuilder::new();
        let float = b.basic(BaseType::Float);
        let tile = b.global_var("tile", float, Rate::GroupShared);
        let plain = b.global_var("plain", float, Rate::ThreadLocal);
        let module = b.finish();
        let outer = CudaEmitter::new();
        let mut ctx = EmitContext::new(&module, EmitOptions::default());
        ctx.reserve_global_names().unwrap();
        emit_global_var(&mut ctx, tile, &outer).unwrap();
        emit_global_var(&mut ctx, plain, &outer).unwrap();
        assert_eq!(ctx.writer.as_str(), "__shared__ float tile;\nfloat plain;\n");
    }

    #[test]
    fn unroll_emits_a_pragma() {
        let mut b = ModuleBuilder::new();
        let void = b.basic(BaseType::Void);
        let mut f = b.func("spin", void);
        f.begin_block();
        f.break_();
        let body = f.end_block();
        f.loop_(body, Some(LoopControlMode::Unroll));
        f.begin_block();
        f.break_();
        let plain_body = f.end_block();
        f.loop_(plain_body, Some(LoopControlMode::Loop));
        f.ret(None);
        let func = f.finish();
        let module = b.finish();
        let text = emit_fn(&module, func).unwrap();
        assert_eq!(text.matches("#pragma unroll").count(), 1);
        assert!(text.contains("    #pragma unroll\n    for (;;)\n"));
    }

    #[test]
    fn bool_vectors_get_a_struct_and_factory() {
        let mut types = TypeSet::new();
        let boolean = types.add(TypeData::Basic(BaseType::Bool));
        let float = types.add(TypeData::Basic(BaseType::Float));
        let bool2 = types.add_vector_type(boolean, 2);
        let float2 = types.add_vector_type(float, 2);
        let outer = CudaEmitter::new();
        assert!(outer.needs_vector_struct(&types, bool2));
        assert!(!outer.needs_vector_struct(&types, float2));
        let mut w = SourceWriter::new(4);
        outer.emit_vector_struct(&types, bool2, &mut w, &outer).unwrap();
        assert_eq!(
            w.finish(),
            "struct bool2\n{\n    bool x;\n    bool y;\n};\n\n__device__ bool2 make_bool2(bool x, bool y)\n{\n    return bool2{x, y};\n}\n\n"
        );
    }
}
