//! Failures abort the whole pass
//!
//! Unsupported constructs and malformed IR must come back as a single
//! `EmitError` with a stable diagnostic code, never as partial source.

use miette::Diagnostic;
use shadec::{EmitError, EmitOptions, emit_module};
use shadec_core::lang::targets::TargetDialect;
use shadec_ir::{BaseType, Inst, InstKind, Module, ModuleBuilder, StructField};

fn code_of(err: &EmitError) -> String {
    err.code().map(|c| c.to_string()).unwrap_or_default()
}

#[test]
fn wave_ops_are_unsupported_in_portable_cpp() {
    let mut b = ModuleBuilder::new();
    let uint = b.basic(BaseType::UInt32);
    let mut f = b.func("vote", uint);
    let mask = f.param("mask", uint);
    let ballot = f.wave_match(uint, mask, mask);
    f.ret(Some(ballot));
    f.finish();

    let options = EmitOptions::new().with_target(TargetDialect::Cpp);
    let err = emit_module(&b.finish(), &options).unwrap_err();
    assert!(matches!(err, EmitError::Unsupported(_)), "{err}");
    assert_eq!(code_of(&err), "shadec::emit::unsupported");
}

#[test]
fn combined_texture_sampler_fails_on_cuda() {
    let mut b = ModuleBuilder::new();
    let void = b.basic(BaseType::Void);
    let float = b.basic(BaseType::Float);
    let combined = b.texture_sampler(float);
    let mut f = b.func("shade", void);
    f.param("tex", combined);
    f.ret(None);
    f.finish();

    let err = emit_module(&b.finish(), &EmitOptions::new()).unwrap_err();
    assert!(matches!(err, EmitError::UnsupportedType { .. }), "{err}");
    assert_eq!(code_of(&err), "shadec::emit::unsupported_type");
}

#[test]
fn later_failure_discards_earlier_functions() {
    let mut b = ModuleBuilder::new();
    let void = b.basic(BaseType::Void);
    let float = b.basic(BaseType::Float);
    let mut ok = b.func("fine", void);
    ok.ret(None);
    ok.finish();
    let combined = b.texture_sampler(float);
    let mut bad = b.func("broken", void);
    bad.param("tex", combined);
    bad.ret(None);
    bad.finish();

    let result = emit_module(&b.finish(), &EmitOptions::new());
    assert!(result.is_err(), "a failing function must fail the whole module");
}

#[test]
fn struct_containing_itself_is_malformed() {
    let mut module = Module::new();
    let float = module.push(Inst::new(InstKind::BasicType { base: BaseType::Float }));
    let node = module.push(
        Inst::new(InstKind::StructType {
            fields: vec![
                StructField {
                    name: "value".to_string(),
                    ty: float,
                },
                StructField {
                    name: "next".to_string(),
                    ty: shadec_ir::InstId::from_raw(1),
                },
            ],
        })
        .with_name("Node"),
    );
    let void = module.push(Inst::new(InstKind::BasicType { base: BaseType::Void }));
    let param = module.push(Inst::new(InstKind::Param).with_ty(node).with_name("n"));
    let body = module.push(Inst::new(InstKind::Block { insts: vec![] }));
    let func = module.push(
        Inst::new(InstKind::Func {
            params: vec![param],
            body: Some(body),
        })
        .with_ty(void)
        .with_name("walk"),
    );
    module.globals = vec![float, node, void, func];

    let err = emit_module(&module, &EmitOptions::new()).unwrap_err();
    assert!(matches!(err, EmitError::MalformedIr { .. }), "{err}");
    assert_eq!(code_of(&err), "shadec::emit::malformed_ir");
}

#[test]
fn dangling_operands_are_rejected_up_front() {
    let mut module = Module::new();
    let vector = module.push(
        Inst::new(InstKind::VectorType { count: 2 }).with_operands(vec![shadec_ir::InstId::from_raw(9)]),
    );
    module.globals.push(vector);

    let err = emit_module(&module, &EmitOptions::new()).unwrap_err();
    assert!(matches!(err, EmitError::InvalidModule(_)), "{err}");
    assert_eq!(code_of(&err), "shadec::emit::invalid_module");
}

#[test]
fn oversized_matrix_is_rejected_before_emission() {
    let mut b = ModuleBuilder::new();
    let float = b.basic(BaseType::Float);
    let matrix = b.matrix(float, 65536, 65536);
    let mut f = b.func("splat", matrix);
    let s = f.param("s", float);
    let made = f.make_matrix(matrix, &[s]);
    f.ret(Some(made));
    f.finish();

    let err = emit_module(&b.finish(), &EmitOptions::new()).unwrap_err();
    assert!(
        matches!(err, EmitError::InvalidModule(shadec_ir::IrError::MatrixDimension { .. })),
        "{err}"
    );
    assert_eq!(code_of(&err), "shadec::emit::invalid_module");
}
