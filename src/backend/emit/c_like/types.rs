//! Default type spelling and literal formatting.

use shadec_ir::BaseType;

use super::CLikeEmitter;
use crate::backend::emit::dialect::{Dialect, TypeNamer};
use crate::backend::emit::errors::EmitError;
use crate::backend::emit::type_set::{TypeData, TypeId, TypeSet};

/// Fixed-width C++ spelling of a scalar.
pub fn scalar_name(base: BaseType) -> &'static str {
    match base {
        BaseType::Void => "void",
        BaseType::Bool => "bool",
        BaseType::Int8 => "int8_t",
        BaseType::Int16 => "int16_t",
        BaseType::Int32 => "int32_t",
        BaseType::Int64 => "int64_t",
        BaseType::UInt8 => "uint8_t",
        BaseType::UInt16 => "uint16_t",
        BaseType::UInt32 => "uint32_t",
        BaseType::UInt64 => "uint64_t",
        BaseType::Half => "half",
        BaseType::Float => "float",
        BaseType::Double => "double",
    }
}

pub fn sampler_state_name(comparison: bool) -> &'static str {
    if comparison {
        "SamplerComparisonState"
    } else {
        "SamplerState"
    }
}

/// Type-name failure for `ty` under the pass's outermost dialect.
pub fn unsupported_type(types: &TypeSet, ty: TypeId, outer: &dyn Dialect, reason: &str) -> EmitError {
    EmitError::UnsupportedType {
        ty: types.describe(ty),
        target: outer.target(),
        reason: reason.to_string(),
    }
}

/// Format a floating-point constant; `suffix` is `"f"` for single precision.
///
/// Integral values keep one decimal (`1.0f`), everything else uses exponent form (`2.5e-1f`). NaN and the
/// infinities become compiler builtins since C has no literal for them.
pub fn format_float(value: f64, suffix: &str) -> String {
    let single = !suffix.is_empty();
    if value.is_nan() {
        return if single { "__builtin_nanf(\"\")" } else { "__builtin_nan(\"\")" }.to_string();
    }
    if value.is_infinite() {
        let inf = if single { "__builtin_inff()" } else { "__builtin_inf()" };
        return if value < 0.0 { format!("-{inf}") } else { inf.to_string() };
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}{suffix}")
    } else {
        format!("{value:e}{suffix}")
    }
}

/// Format an integer constant of scalar type `base`.
///
/// The most negative `int` and `long long` have no literal of their own (`-2147483648` negates an
/// out-of-range literal), so they are written as `(MIN + 1) - 1`.
pub fn format_int(base: BaseType, value: i64) -> String {
    match base {
        BaseType::Bool => (value != 0).to_string(),
        BaseType::Int64 if value == i64::MIN => format!("({}LL - 1)", i64::MIN + 1),
        BaseType::Int64 => format!("{value}LL"),
        BaseType::Int32 if value == i64::from(i32::MIN) => format!("({} - 1)", i32::MIN + 1),
        BaseType::UInt64 => format!("{}ULL", value as u64),
        BaseType::UInt32 => format!("{}U", value as u32),
        BaseType::UInt8 | BaseType::UInt16 => format!("{}U", value as u64),
        BaseType::Half | BaseType::Float => format_float(value as f64, "f"),
        BaseType::Double => format_float(value as f64, ""),
        _ => value.to_string(),
    }
}

impl TypeNamer for CLikeEmitter {
    fn calc_type_name(&self, types: &TypeSet, ty: TypeId, outer: &dyn Dialect) -> Result<String, EmitError> {
        let spelled = |element: TypeId| outer.calc_type_name(types, element, outer);
        match types.get(ty) {
            TypeData::Basic(base) => Ok(scalar_name(*base).to_string()),
            TypeData::Vector { element, count } => Ok(format!("{}{count}", spelled(*element)?)),
            TypeData::Matrix { element, rows, cols } => Ok(format!("{}{rows}x{cols}", spelled(*element)?)),
            TypeData::Array { element, count } => Ok(format!("FixedArray<{}, {count}>", spelled(*element)?)),
            TypeData::UnsizedArray { element } | TypeData::Ptr { pointee: element } => {
                Ok(format!("{}*", spelled(*element)?))
            }
            TypeData::SamplerState { comparison } => Ok(sampler_state_name(*comparison).to_string()),
            TypeData::Struct { name, .. } => Ok(name.clone()),
            TypeData::Texture { .. } | TypeData::TextureSampler { .. } => Err(unsupported_type(
                types,
                ty,
                outer,
                "texture resources have no generic spelling",
            )),
        }
    }

    fn float_literal(&self, base: BaseType, value: f64, _outer: &dyn Dialect) -> String {
        match base {
            BaseType::Double => format_float(value, ""),
            _ => format_float(value, "f"),
        }
    }
}
