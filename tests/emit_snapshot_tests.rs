//! Golden snapshot tests for emitted source
//!
//! These tests build small IR modules, emit them without the version header,
//! and compare the output against stored snapshots. This ensures emitter
//! changes are reviewed and intentional.
//!
//! Run with: `cargo test --test emit_snapshot_tests`
//! Review changes: `cargo insta review`

use shadec::{EmitOptions, emit_module};
use shadec_core::lang::semantics::SystemValueSemantic;
use shadec_core::lang::targets::TargetDialect;
use shadec_ir::{BaseType, Inst, InstKind, IntrinsicOpId, Module, ModuleBuilder};

fn emit(module: &Module, target: TargetDialect) -> String {
    let options = EmitOptions::new().with_target(target).with_header(false);
    emit_module(module, &options).expect("emission failed").code
}

/// `result[i] = a[i] + b[i]` over buffers of `uint3`, indexed by the dispatch thread id.
fn sum_vectors_module() -> Module {
    let mut b = ModuleBuilder::new().with_name("sum_vectors");
    let void = b.basic(BaseType::Void);
    let uint = b.basic(BaseType::UInt32);
    let uint3 = b.vector(uint, 3);
    let buffer = b.array(uint3, None);

    let mut f = b.func("sum_vectors", void);
    f.entry_point();
    let tid = f.system_value_param("tid", uint3, SystemValueSemantic::DispatchThreadId);
    let lhs = f.param("a", buffer);
    let rhs = f.param("b", buffer);
    let out = f.param("result", buffer);
    let index = f.emit(
        Inst::new(InstKind::Swizzle { indices: vec![0] })
            .with_ty(uint)
            .with_operands(vec![tid])
            .with_name("index"),
    );
    let x = f.element(uint3, lhs, index);
    let y = f.element(uint3, rhs, index);
    let sum = f.arith(IntrinsicOpId::Add, uint3, &[x, y]);
    let slot = f.element_ptr(uint3, out, index);
    f.store(slot, sum);
    f.ret(None);
    f.finish();
    b.finish()
}

/// `total` calls `length_sq`, but is listed first; the callee must still be defined first.
fn point_math_module() -> Module {
    let mut b = ModuleBuilder::new().with_name("point_math");
    let float = b.basic(BaseType::Float);
    let point = b.struct_type("Point", &[("x", float), ("y", float)]);

    let mut f = b.func("length_sq", float);
    let p = f.param("p", point);
    let px = f.field_extract(float, p, 0);
    let py = f.field_extract(float, p, 1);
    let xx = f.arith(IntrinsicOpId::Mul, float, &[px, px]);
    let yy = f.arith(IntrinsicOpId::Mul, float, &[py, py]);
    let sum = f.arith(IntrinsicOpId::Add, float, &[xx, yy]);
    f.ret(Some(sum));
    let length_sq = f.finish();

    let mut f = b.func("total", float);
    let first = f.param("a", point);
    let second = f.param("b", point);
    let la = f.call(length_sq, float, &[first]);
    let lb = f.call(length_sq, float, &[second]);
    let sum = f.arith(IntrinsicOpId::Add, float, &[la, lb]);
    f.ret(Some(sum));
    let total = f.finish();

    let mut module = b.finish();
    module.globals.sort_by_key(|&id| id != total);
    module
}

#[test]
fn test_sum_vectors_cuda() {
    let code = emit(&sum_vectors_module(), TargetDialect::Cuda);
    insta::assert_snapshot!("sum_vectors_cuda", code);
}

#[test]
fn test_point_math_cpp() {
    let code = emit(&point_math_module(), TargetDialect::Cpp);
    insta::assert_snapshot!("point_math_cpp", code);
}
