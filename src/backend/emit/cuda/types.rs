//! CUDA type names.

use shadec_ir::{BaseType, ResourceAccess};

use super::CudaEmitter;
use crate::backend::emit::c_like::types::unsupported_type;
use crate::backend::emit::dialect::{Dialect, TypeNamer};
use crate::backend::emit::errors::EmitError;
use crate::backend::emit::type_set::{TypeData, TypeId, TypeSet};

/// CUDA spelling of a scalar; also the prefix of its vector types.
///
/// `half` is spelled `float`: values are widened wherever they appear.
pub fn scalar_name(base: BaseType) -> &'static str {
    match base {
        BaseType::Void => "void",
        BaseType::Bool => "bool",
        BaseType::Int8 => "char",
        BaseType::Int16 => "short",
        BaseType::Int32 => "int",
        BaseType::Int64 => "longlong",
        BaseType::UInt8 => "uchar",
        BaseType::UInt16 => "ushort",
        BaseType::UInt32 => "uint",
        BaseType::UInt64 => "ulonglong",
        BaseType::Half | BaseType::Float => "float",
        BaseType::Double => "double",
    }
}

impl TypeNamer for CudaEmitter {
    fn calc_type_name(&self, types: &TypeSet, ty: TypeId, outer: &dyn Dialect) -> Result<String, EmitError> {
        match types.get(ty) {
            TypeData::Basic(base) => Ok(scalar_name(*base).to_string()),
            TypeData::Vector { element, count } => {
                let prefix = match types.get(*element) {
                    TypeData::Basic(base) if base.is_value() => scalar_name(*base),
                    _ => {
                        return Err(unsupported_type(types, ty, outer, "vector element has no CUDA vector prefix"));
                    }
                };
                if !(1..=4).contains(count) {
                    return Err(unsupported_type(types, ty, outer, "CUDA vectors have 1 to 4 components"));
                }
                Ok(format!("{prefix}{count}"))
            }
            TypeData::Texture {
                multisample: true, ..
            } => Err(unsupported_type(types, ty, outer, "multisampled textures have no CUDA object type")),
            TypeData::Texture { access, .. } => match access {
                ResourceAccess::Read => Ok("CUtexObject".to_string()),
                ResourceAccess::ReadWrite => Ok("CUsurfObject".to_string()),
                other => Err(unsupported_type(
                    types,
                    ty,
                    outer,
                    &format!("{other:?} texture access has no CUDA object type"),
                )),
            },
            TypeData::TextureSampler { .. } => Err(unsupported_type(
                types,
                ty,
                outer,
                "combined texture-samplers have no CUDA object type",
            )),
            _ => self.base.calc_type_name(types, ty, outer),
        }
    }

    fn float_literal(&self, base: BaseType, value: f64, outer: &dyn Dialect) -> String {
        // half is spelled float, so its literals are float literals too.
        let base = if base == BaseType::Half { BaseType::Float } else { base };
        self.base.float_literal(base, value, outer)
    }
}
