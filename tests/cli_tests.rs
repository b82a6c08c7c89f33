//! CLI round trips through real files
//!
//! Modules are written as JSON into a temporary directory, run through the
//! command implementations, and compared with direct library calls.

use std::fs;

use shadec::cli::commands::{check_file, emit_file, emit_source, load_module};
use shadec::cli::{Cli, EXIT_REJECTED, ExitCode, execute};
use shadec::{EmitOptions, emit_module};
use shadec_core::lang::targets::TargetDialect;
use shadec_ir::{BaseType, IntrinsicOpId, Module, ModuleBuilder};

use clap::Parser;

fn saxpy_module() -> Module {
    let mut b = ModuleBuilder::new().with_name("saxpy");
    let float = b.basic(BaseType::Float);
    let mut f = b.func("saxpy", float);
    f.entry_point();
    let a = f.param("a", float);
    let x = f.param("x", float);
    let y = f.param("y", float);
    let ax = f.arith(IntrinsicOpId::Mul, float, &[a, x]);
    let sum = f.arith(IntrinsicOpId::Add, float, &[ax, y]);
    f.ret(Some(sum));
    f.finish();
    b.finish()
}

fn write_module(dir: &tempfile::TempDir, module: &Module) -> std::path::PathBuf {
    let path = dir.path().join("module.json");
    fs::write(&path, module.to_json_pretty().unwrap()).unwrap();
    path
}

#[test]
fn test_emit_writes_library_output() {
    let dir = tempfile::tempdir().unwrap();
    let module = saxpy_module();
    let input = write_module(&dir, &module);
    let output = dir.path().join("saxpy.cu");

    let options = EmitOptions::new();
    let code = emit_file(&input, &options, Some(&output)).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written, emit_module(&module, &options).unwrap().code);
    assert!(written.contains("extern \"C\" __global__ float saxpy(float a, float x, float y)"));
}

#[test]
fn test_cli_flags_reach_the_emitter() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(&dir, &saxpy_module());
    let output = dir.path().join("saxpy.cpp");

    let cli = Cli::try_parse_from([
        "shadec",
        "emit",
        input.to_str().unwrap(),
        "--target",
        "cpp",
        "--indent",
        "2",
        "--no-header",
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(execute(cli).unwrap(), ExitCode::SUCCESS);

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("#include <cstdint>"), "{written}");
    assert!(written.contains("float saxpy(float a, float x, float y)\n{\n  return (a * x) + y;\n}\n"), "{written}");
}

#[test]
fn test_json_round_trip_preserves_emission() {
    let dir = tempfile::tempdir().unwrap();
    let module = saxpy_module();
    let input = write_module(&dir, &module);

    assert_eq!(load_module(&input).unwrap(), module);
    let options = EmitOptions::new().with_target(TargetDialect::Cpp);
    assert_eq!(
        emit_source(&input, &options).unwrap(),
        emit_module(&module, &options).unwrap()
    );
}

#[test]
fn test_check_accepts_valid_module() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(&dir, &saxpy_module());
    assert_eq!(check_file(&input, false).unwrap(), ExitCode::SUCCESS);
    assert_eq!(check_file(&input, true).unwrap(), ExitCode::SUCCESS);
}

#[test]
fn test_malformed_json_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.json");
    fs::write(&input, r#"{"insts": [{"op": "vector_type", "count": 3, "operands": [7]}], "globals": []}"#).unwrap();

    let err = check_file(&input, false).unwrap_err();
    assert_eq!(err.exit_code, ExitCode(EXIT_REJECTED));
    assert!(err.message.contains("not in the module"), "{}", err.message);

    fs::write(&input, "not json").unwrap();
    let err = emit_source(&input, &EmitOptions::new()).unwrap_err();
    assert_eq!(err.exit_code, ExitCode(EXIT_REJECTED));
}

#[test]
fn test_bundled_demo_emits() {
    let demo = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/hello_world.json");
    let emitted = emit_source(&demo, &EmitOptions::new().with_header(false)).unwrap();
    assert!(emitted.code.contains("extern \"C\" __global__ void hello_world(float* output)"), "{}", emitted.code);
}
