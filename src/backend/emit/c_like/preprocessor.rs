//! The preprocessor section: everything the emitted body relies on but the target does not provide.
//!
//! It is generated after the body, so it knows which types and intrinsic specializations were used, and is
//! placed before the body in the final text. Contents, in order:
//!
//! 1. the dialect prelude (includes, scalar typedefs);
//! 2. the `FixedArray` template, when any sized array type is registered;
//! 3. struct definitions for vector types the dialect lacks;
//! 4. one struct per matrix type, holding an array of row vectors;
//! 5. one helper function per distinct specialized intrinsic.
//!
//! Definitions are keyed by their spelled names, not by type id: CUDA spells `half` as `float`, so `half3` and
//! `float3` share one struct and one set of helpers.

use std::collections::HashSet;

use shadec_core::lang::intrinsics::{self, Fixity, IntrinsicShape};
use shadec_ir::BaseType;

use super::exprs::COMPONENTS;
use crate::backend::emit::context::EmitContext;
use crate::backend::emit::dialect::Dialect;
use crate::backend::emit::errors::EmitError;
use crate::backend::emit::intrinsics::{SpecializedIntrinsic, specialized_name};
use crate::backend::emit::type_set::{Shape, TypeData, TypeId, TypeSet};
use crate::backend::emit::writer::SourceWriter;

/// Generate the preprocessor section for everything the pass registered.
#[tracing::instrument(skip_all, fields(types = ctx.types.len(), intrinsics = ctx.intrinsics.len()))]
pub fn generate(ctx: &mut EmitContext<'_>, outer: &dyn Dialect) -> Result<String, EmitError> {
    let mut w = SourceWriter::new(ctx.options.indent_width);
    outer.emit_prelude(&mut w);

    // Row types must exist before the vector structs are written.
    ctx.types.add_vector_for_matrix_types();
    let types = &mut ctx.types;
    let mut written: HashSet<String> = HashSet::new();

    if types.iter().any(|(_, data)| matches!(data, TypeData::Array { .. })) {
        emit_fixed_array(&mut w, outer);
    }

    let vectors: Vec<TypeId> = types
        .iter()
        .filter(|(_, data)| matches!(data, TypeData::Vector { .. }))
        .map(|(id, _)| id)
        .collect();
    for ty in vectors {
        if outer.needs_vector_struct(types, ty) && written.insert(outer.calc_type_name(types, ty, outer)?) {
            outer.emit_vector_struct(types, ty, &mut w, outer)?;
        }
    }

    let matrices: Vec<TypeId> = types
        .iter()
        .filter(|(_, data)| matches!(data, TypeData::Matrix { .. }))
        .map(|(id, _)| id)
        .collect();
    for ty in matrices {
        if written.insert(outer.calc_type_name(types, ty, outer)?) {
            emit_matrix_struct(types, ty, &mut w, outer)?;
        }
    }

    let used: Vec<SpecializedIntrinsic> = ctx.intrinsics.iter().cloned().collect();
    for intrinsic in &used {
        let name = specialized_name(&ctx.types, intrinsic, outer)?;
        let return_name = outer.calc_type_name(&ctx.types, intrinsic.return_type, outer)?;
        if written.insert(format!("{return_name} {name}")) {
            emit_intrinsic_definition(&mut ctx.types, intrinsic, &mut w, outer)?;
        }
    }
    Ok(w.finish())
}

fn emit_fixed_array(w: &mut SourceWriter, outer: &dyn Dialect) {
    let helper = outer.helper_qualifier();
    w.writeln("template<typename T, int SIZE>");
    w.writeln("struct FixedArray");
    w.open_block();
    w.writeln(&format!("{helper}const T& operator[](int index) const {{ return m_data[index]; }}"));
    w.writeln(&format!("{helper}T& operator[](int index) {{ return m_data[index]; }}"));
    w.newline();
    w.writeln("T m_data[SIZE];");
    w.close_block(";");
    w.newline();
}

/// `struct float3 { float x; float y; float z; };`
pub fn emit_vector_struct_body(
    types: &TypeSet,
    ty: TypeId,
    w: &mut SourceWriter,
    outer: &dyn Dialect,
) -> Result<(), EmitError> {
    let TypeData::Vector { element, count } = *types.get(ty) else {
        return Err(EmitError::unsupported(format!("{} is not a vector type", types.describe(ty))));
    };
    if count as usize > COMPONENTS.len() {
        return Err(EmitError::UnsupportedType {
            ty: types.describe(ty),
            target: outer.target(),
            reason: "vectors have at most four components".to_string(),
        });
    }
    let name = outer.calc_type_name(types, ty, outer)?;
    let element_name = outer.calc_type_name(types, element, outer)?;
    w.writeln(&format!("struct {name}"));
    w.open_block();
    for component in &COMPONENTS[..count as usize] {
        w.writeln(&format!("{element_name} {component};"));
    }
    w.close_block(";");
    w.newline();
    Ok(())
}

fn emit_matrix_struct(
    types: &mut TypeSet,
    ty: TypeId,
    w: &mut SourceWriter,
    outer: &dyn Dialect,
) -> Result<(), EmitError> {
    let Shape::Matrix { rows, .. } = types.shape(ty) else {
        return Ok(());
    };
    let Some(row_ty) = types.matrix_row_type(ty) else {
        return Ok(());
    };
    let name = outer.calc_type_name(types, ty, outer)?;
    let row_name = outer.calc_type_name(types, row_ty, outer)?;
    w.writeln(&format!("struct {name}"));
    w.open_block();
    w.writeln(&format!("{row_name} rows[{rows}];"));
    w.close_block(";");
    w.newline();
    Ok(())
}

/// Parameter names of generated helpers: `a`, `b`, `c`, ...
fn param_name(index: usize) -> String {
    const NAMES: &[&str] = &["a", "b", "c", "d", "e", "f", "g", "h"];
    NAMES
        .get(index)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("p{index}"))
}

/// Text of scalar component `k` of a value named `name` of shape `shape`.
fn component(name: &str, shape: Shape, k: u32) -> Option<String> {
    match shape {
        Shape::Scalar(_) => Some(name.to_string()),
        Shape::Vector { count, .. } if k < count => COMPONENTS.get(k as usize).map(|c| format!("{name}.{c}")),
        Shape::Matrix { rows, cols, .. } if rows.checked_mul(cols).is_some_and(|n| k < n) => {
            if cols == 1 {
                Some(format!("{name}.rows[{k}]"))
            } else {
                COMPONENTS
                    .get((k % cols) as usize)
                    .map(|c| format!("{name}.rows[{}].{c}", k / cols))
            }
        }
        _ => None,
    }
}

/// Assemble a value of type `ty` from its scalar components.
fn build_value(
    types: &mut TypeSet,
    ty: TypeId,
    components: Vec<String>,
    outer: &dyn Dialect,
) -> Result<String, EmitError> {
    match types.shape(ty) {
        Shape::Scalar(_) => components
            .into_iter()
            .next()
            .ok_or_else(|| EmitError::unsupported("empty scalar value")),
        Shape::Vector { .. } => outer.vector_from_components(types, ty, &components, outer),
        Shape::Matrix { cols, .. } => {
            let row_ty = types
                .matrix_row_type(ty)
                .ok_or_else(|| EmitError::unsupported("matrix without a row type"))?;
            let rows = if cols == 1 {
                components
            } else {
                let mut rows = Vec::new();
                for chunk in components.chunks(cols as usize) {
                    rows.push(outer.vector_from_components(types, row_ty, chunk, outer)?);
                }
                rows
            };
            let name = outer.calc_type_name(types, ty, outer)?;
            Ok(format!("{name}{{{{{}}}}}", rows.join(", ")))
        }
        Shape::Other => Err(EmitError::unsupported(format!(
            "cannot build a value of type {}",
            types.describe(ty)
        ))),
    }
}

/// Emit the helper function for one specialization.
pub fn emit_intrinsic_definition(
    types: &mut TypeSet,
    intrinsic: &SpecializedIntrinsic,
    w: &mut SourceWriter,
    outer: &dyn Dialect,
) -> Result<(), EmitError> {
    let info = intrinsics::info_for(intrinsic.op);
    let name = specialized_name(types, intrinsic, outer)?;
    let return_name = outer.calc_type_name(types, intrinsic.return_type, outer)?;
    let mut params = Vec::with_capacity(intrinsic.param_types.len());
    for (index, &ty) in intrinsic.param_types.iter().enumerate() {
        params.push(format!("{} {}", outer.calc_type_name(types, ty, outer)?, param_name(index)));
    }
    let shapes: Vec<Shape> = intrinsic.param_types.iter().map(|&ty| types.shape(ty)).collect();
    let result_shape = types.shape(intrinsic.return_type);
    let signature = format!("{name}({})", params.join(", "));
    let mismatch = || EmitError::unsupported(format!("no component-wise definition for {signature}"));

    let body = match info.shape {
        IntrinsicShape::Constructor => {
            let total = result_shape.component_count().ok_or_else(mismatch)?;
            let mut flat = Vec::new();
            for (index, &shape) in shapes.iter().enumerate() {
                let count = shape.component_count().ok_or_else(mismatch)?;
                for k in 0..count {
                    flat.push(component(&param_name(index), shape, k).ok_or_else(mismatch)?);
                }
            }
            let components = if flat.len() == total as usize {
                flat
            } else if let [Shape::Scalar(_)] = shapes.as_slice() {
                vec![param_name(0); total as usize]
            } else {
                return Err(mismatch());
            };
            build_value(types, intrinsic.return_type, components, outer)?
        }
        IntrinsicShape::Reduction => {
            let [Shape::Vector { count: ca, .. }, Shape::Vector { count: cb, .. }] = shapes.as_slice() else {
                return Err(mismatch());
            };
            if ca != cb {
                return Err(mismatch());
            }
            let mut terms = Vec::with_capacity(*ca as usize);
            for k in 0..*ca {
                let a = component("a", shapes[0], k).ok_or_else(mismatch)?;
                let b = component("b", shapes[1], k).ok_or_else(mismatch)?;
                terms.push(format!("{a} * {b}"));
            }
            terms.join(" + ")
        }
        IntrinsicShape::ComponentWise => {
            let lanes = result_shape.component_count().ok_or_else(mismatch)?;
            let element = shapes
                .iter()
                .find_map(|shape| shape.element())
                .unwrap_or(BaseType::Float);
            let mut components = Vec::with_capacity(lanes as usize);
            for k in 0..lanes {
                let mut args = Vec::with_capacity(shapes.len());
                for (index, &shape) in shapes.iter().enumerate() {
                    let matches_result = shape.component_count() == Some(lanes) || matches!(shape, Shape::Scalar(_));
                    if !matches_result {
                        return Err(mismatch());
                    }
                    args.push(component(&param_name(index), shape, k).ok_or_else(mismatch)?);
                }
                components.push(match (info.fixity, info.operator, args.as_slice()) {
                    (Fixity::Infix, Some(symbol), [lhs, rhs]) => format!("{lhs} {symbol} {rhs}"),
                    (Fixity::Prefix, Some(symbol), [value]) => format!("{symbol}{value}"),
                    _ => format!(
                        "{}({})",
                        outer.calc_scalar_func_name(intrinsic.op, element, outer),
                        args.join(", ")
                    ),
                });
            }
            build_value(types, intrinsic.return_type, components, outer)?
        }
    };

    w.writeln(&format!("{}{return_name} {signature}", outer.helper_qualifier()));
    w.open_block();
    w.writeln(&format!("return {body};"));
    w.close_block("");
    w.newline();
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::emit::c_like::CLikeEmitter;
    use shadec_core::lang::intrinsics::IntrinsicOpId;

    fn definition(types: &mut TypeSet, intrinsic: SpecializedIntrinsic) -> Result<String, EmitError> {
        let outer = CLikeEmitter::new();
        let mut w = SourceWriter::new(4);
        emit_intrinsic_definition(types, &intrinsic, &mut w, &outer)?;
        Ok(w.finish())
    }

    #[test]
    fn component_wise_add() {
        let mut types = TypeSet::new();
        let uint = types.add(TypeData::Basic(BaseType::UInt32));
        let uint3 = types.add_vector_type(uint, 3);
        let text = definition(
            &mut types,
            SpecializedIntrinsic::new(IntrinsicOpId::Add, uint3, vec![uint3, uint3]),
        )
        .unwrap();
        assert_eq!(
            text,
            "uint32_t3 add_uint32_t3_uint32_t3(uint32_t3 a, uint32_t3 b)\n{\n    return uint32_t3{a.x + b.x, a.y + b.y, a.z + b.z};\n}\n\n"
        );
    }

    #[test]
    fn scalar_operands_broadcast() {
        let mut types = TypeSet::new();
        let float = types.add(TypeData::Basic(BaseType::Float));
        let float2 = types.add_vector_type(float, 2);
        let text = definition(
            &mut types,
            SpecializedIntrinsic::new(IntrinsicOpId::Max, float2, vec![float2, float]),
        )
        .unwrap();
        assert!(text.contains("return float2{max(a.x, b), max(a.y, b)};"), "{text}");
    }

    #[test]
    fn dot_is_a_sum_of_products() {
        let mut types = TypeSet::new();
        let float = types.add(TypeData::Basic(BaseType::Float));
        let float3 = types.add_vector_type(float, 3);
        let text = definition(
            &mut types,
            SpecializedIntrinsic::new(IntrinsicOpId::Dot, float, vec![float3, float3]),
        )
        .unwrap();
        assert!(text.contains("return a.x * b.x + a.y * b.y + a.z * b.z;"), "{text}");
    }

    #[test]
    fn init_flattens_or_broadcasts() {
        let mut types = TypeSet::new();
        let float = types.add(TypeData::Basic(BaseType::Float));
        let float2 = types.add_vector_type(float, 2);
        let float3 = types.add_vector_type(float, 3);
        let flat = definition(
            &mut types,
            SpecializedIntrinsic::new(IntrinsicOpId::Init, float3, vec![float2, float]),
        )
        .unwrap();
        assert!(flat.contains("return float3{a.x, a.y, b};"), "{flat}");
        let splat = definition(
            &mut types,
            SpecializedIntrinsic::new(IntrinsicOpId::Init, float3, vec![float]),
        )
        .unwrap();
        assert!(splat.contains("return float3{a, a, a};"), "{splat}");
        let bad = definition(
            &mut types,
            SpecializedIntrinsic::new(IntrinsicOpId::Init, float3, vec![float2, float2]),
        );
        assert!(matches!(bad, Err(EmitError::Unsupported(_))));
    }

    #[test]
    fn matrix_results_are_built_from_rows() {
        let mut types = TypeSet::new();
        let float = types.add(TypeData::Basic(BaseType::Float));
        let m = types.add(TypeData::Matrix {
            element: float,
            rows: 2,
            cols: 2,
        });
        let text = definition(&mut types, SpecializedIntrinsic::new(IntrinsicOpId::Neg, m, vec![m])).unwrap();
        assert!(
            text.contains("return float2x2{{float2{-a.rows[0].x, -a.rows[0].y}, float2{-a.rows[1].x, -a.rows[1].y}}};"),
            "{text}"
        );
    }
}
