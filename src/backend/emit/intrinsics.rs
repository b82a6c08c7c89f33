//! Specialized intrinsic signatures used by a pass.
//!
//! When an operation cannot be spelled with a target operator (component-wise `add` on `uint3`, a `dot` product,
//! a vector built from mixed parts) the emitter calls a helper named after the operation and its parameter types,
//! e.g. `add_uint3_uint3`. Each distinct signature is recorded once here; the preprocessor section later emits
//! one definition per entry.

use std::collections::HashSet;

use shadec_core::lang::intrinsics::{self, IntrinsicOpId, IntrinsicShape};

use super::dialect::Dialect;
use super::errors::EmitError;
use super::type_set::{TypeId, TypeSet};

/// One specialization of an intrinsic: operation plus concrete signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecializedIntrinsic {
    pub op: IntrinsicOpId,
    pub return_type: TypeId,
    pub param_types: Vec<TypeId>,
}

impl SpecializedIntrinsic {
    pub fn new(op: IntrinsicOpId, return_type: TypeId, param_types: Vec<TypeId>) -> Self {
        Self {
            op,
            return_type,
            param_types,
        }
    }
}

/// Insertion-ordered, deduplicated set of specialized intrinsics.
#[derive(Debug, Default)]
pub struct IntrinsicSet {
    items: Vec<SpecializedIntrinsic>,
    seen: HashSet<SpecializedIntrinsic>,
}

impl IntrinsicSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a specialization; returns `true` the first time a signature is seen.
    pub fn add(&mut self, intrinsic: SpecializedIntrinsic) -> bool {
        if self.seen.contains(&intrinsic) {
            return false;
        }
        tracing::debug!(op = ?intrinsic.op, params = intrinsic.param_types.len(), "registered intrinsic");
        self.seen.insert(intrinsic.clone());
        self.items.push(intrinsic);
        true
    }

    pub fn contains(&self, intrinsic: &SpecializedIntrinsic) -> bool {
        self.seen.contains(intrinsic)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpecializedIntrinsic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Helper-function name for a specialization.
///
/// ## Returns
/// - `<func>_<param type names joined by _>` for operations (`add_uint3_uint3`).
/// - `<func>_<return type>_<param types>` for constructors, whose result is not implied by the parameters
///   (`init_float3_float2_float`).
///
/// Type names are spelled through `outer`, then reduced to identifier characters.
pub fn specialized_name(
    types: &TypeSet,
    intrinsic: &SpecializedIntrinsic,
    outer: &dyn Dialect,
) -> Result<String, EmitError> {
    let info = intrinsics::info_for(intrinsic.op);
    let mut parts = vec![info.func_name.to_string()];
    if info.shape == IntrinsicShape::Constructor {
        parts.push(identifier_part(&outer.calc_type_name(types, intrinsic.return_type, outer)?));
    }
    for &param in &intrinsic.param_types {
        parts.push(identifier_part(&outer.calc_type_name(types, param, outer)?));
    }
    Ok(parts.join("_"))
}

/// Reduce a type spelling (`FixedArray<float, 3>`, `float*`) to identifier characters.
pub(crate) fn identifier_part(spelling: &str) -> String {
    let mut out = String::with_capacity(spelling.len());
    for ch in spelling.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if ch == '*' {
            out.push_str("ptr");
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::emit::type_set::TypeData;
    use shadec_ir::BaseType;

    #[test]
    fn duplicates_are_dropped_and_order_kept() {
        let mut types = TypeSet::new();
        let uint = types.add(TypeData::Basic(BaseType::UInt32));
        let uint3 = types.add_vector_type(uint, 3);
        let mut set = IntrinsicSet::new();
        assert!(set.add(SpecializedIntrinsic::new(IntrinsicOpId::Mul, uint3, vec![uint3, uint3])));
        assert!(set.add(SpecializedIntrinsic::new(IntrinsicOpId::Add, uint3, vec![uint3, uint3])));
        assert!(!set.add(SpecializedIntrinsic::new(IntrinsicOpId::Mul, uint3, vec![uint3, uint3])));
        let ops: Vec<_> = set.iter().map(|i| i.op).collect();
        assert_eq!(ops, vec![IntrinsicOpId::Mul, IntrinsicOpId::Add]);
    }

    #[test]
    fn identifier_parts_are_sanitized() {
        assert_eq!(identifier_part("FixedArray<float, 3>"), "FixedArray_float_3");
        assert_eq!(identifier_part("float*"), "floatptr");
        assert_eq!(identifier_part("uint3"), "uint3");
    }
}
