//! Intrinsic operation vocabulary.
//!
//! Every arithmetic, logical, and comparison operation the IR can express is identified by an [`IntrinsicOpId`].
//! The registry records the function-style name used when an operation has to be lowered to a helper call (e.g.
//! `add_uint3_uint3`), the operator symbol used for scalar operands, and the operation's shape.
//!
//! ## Notes
//! - Lookup via [`from_str`] matches the function name and is **case-sensitive**.
//! - Operations with no operator symbol (`min`, `fmod`, ...) always lower to call syntax.
//!
//! ## Examples
//! ```rust
//! use shadec_core::lang::intrinsics::{self, Fixity, IntrinsicOpId};
//!
//! let info = intrinsics::info_for(IntrinsicOpId::Neg);
//! assert_eq!(info.fixity, Fixity::Prefix);
//! assert_eq!(info.operator, Some("-"));
//! ```

use serde::{Deserialize, Serialize};

/// Define how an operation is spelled when its operands are scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    /// `a <op> b`
    Infix,
    /// `<op>a`
    Prefix,
    /// `name(a, b, ...)`
    Call,
}

/// Define how an operation combines aggregate (vector/matrix) operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrinsicShape {
    /// Applied per component; the result has the shape of the operands.
    ComponentWise,
    /// Combines all components into one scalar (e.g. `dot`).
    Reduction,
    /// Builds an aggregate from its parts.
    Constructor,
}

/// Stable identifier for every intrinsic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntrinsicOpId {
    Init,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    IRem,
    FRem,
    Neg,

    // Bitwise and logical
    Not,
    BitNot,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    And,
    Or,

    // Comparison
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,

    // Math library
    Min,
    Max,
    Abs,
    Sqrt,
    Dot,
}

/// Metadata for an intrinsic operation.
///
/// ## Notes
/// - `arity` is `None` for variadic operations (only `init`).
/// - `operator` is `None` when the target has no operator spelling and a call must be emitted.
#[derive(Debug, Clone, Copy)]
pub struct IntrinsicInfo {
    pub id: IntrinsicOpId,
    pub func_name: &'static str,
    pub operator: Option<&'static str>,
    pub fixity: Fixity,
    pub arity: Option<u8>,
    pub shape: IntrinsicShape,
    pub is_comparison: bool,
}

/// Registry of all intrinsic operations.
pub const INTRINSICS: &[IntrinsicInfo] = &[
    IntrinsicInfo {
        id: IntrinsicOpId::Init,
        func_name: "init",
        operator: None,
        fixity: Fixity::Call,
        arity: None,
        shape: IntrinsicShape::Constructor,
        is_comparison: false,
    },
    // Arithmetic
    binary(IntrinsicOpId::Add, "add", "+"),
    binary(IntrinsicOpId::Sub, "sub", "-"),
    binary(IntrinsicOpId::Mul, "mul", "*"),
    binary(IntrinsicOpId::Div, "div", "/"),
    binary(IntrinsicOpId::IRem, "irem", "%"),
    call(IntrinsicOpId::FRem, "fmod", 2),
    unary(IntrinsicOpId::Neg, "neg", "-"),
    // Bitwise and logical
    unary(IntrinsicOpId::Not, "not", "!"),
    unary(IntrinsicOpId::BitNot, "bitnot", "~"),
    binary(IntrinsicOpId::BitAnd, "bitand", "&"),
    binary(IntrinsicOpId::BitOr, "bitor", "|"),
    binary(IntrinsicOpId::BitXor, "bitxor", "^"),
    binary(IntrinsicOpId::Shl, "shl", "<<"),
    binary(IntrinsicOpId::Shr, "shr", ">>"),
    binary(IntrinsicOpId::And, "and", "&&"),
    binary(IntrinsicOpId::Or, "or", "||"),
    // Comparison
    comparison(IntrinsicOpId::Eq, "eq", "=="),
    comparison(IntrinsicOpId::Neq, "neq", "!="),
    comparison(IntrinsicOpId::Lt, "lt", "<"),
    comparison(IntrinsicOpId::Leq, "leq", "<="),
    comparison(IntrinsicOpId::Gt, "gt", ">"),
    comparison(IntrinsicOpId::Geq, "geq", ">="),
    // Math library
    call(IntrinsicOpId::Min, "min", 2),
    call(IntrinsicOpId::Max, "max", 2),
    call(IntrinsicOpId::Abs, "abs", 1),
    call(IntrinsicOpId::Sqrt, "sqrt", 1),
    IntrinsicInfo {
        id: IntrinsicOpId::Dot,
        func_name: "dot",
        operator: None,
        fixity: Fixity::Call,
        arity: Some(2),
        shape: IntrinsicShape::Reduction,
        is_comparison: false,
    },
];

/// Return the metadata entry for an intrinsic identifier.
///
/// ## Parameters
/// - `id`: The intrinsic to look up.
///
/// ## Returns
/// - The registry entry for `id`.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (guarded by the registry tests).
pub fn info_for(id: IntrinsicOpId) -> &'static IntrinsicInfo {
    INTRINSICS
        .iter()
        .find(|i| i.id == id)
        .expect("INVARIANT: every IntrinsicOpId has a registry entry")
}

/// Resolve an intrinsic function name to its identifier.
///
/// ## Parameters
/// - `name`: Candidate function name (e.g. `"add"`, `"fmod"`).
///
/// ## Returns
/// - `Some(IntrinsicOpId)` if the name exists in [`INTRINSICS`].
/// - `None` otherwise.
pub fn from_str(name: &str) -> Option<IntrinsicOpId> {
    INTRINSICS.iter().find(|i| i.func_name == name).map(|i| i.id)
}

/// Return the function-style name of an intrinsic (e.g. `"add"`).
pub fn func_name(id: IntrinsicOpId) -> &'static str {
    info_for(id).func_name
}

// --- helpers -----------------------------------------------------------------

const fn binary(id: IntrinsicOpId, func_name: &'static str, operator: &'static str) -> IntrinsicInfo {
    IntrinsicInfo {
        id,
        func_name,
        operator: Some(operator),
        fixity: Fixity::Infix,
        arity: Some(2),
        shape: IntrinsicShape::ComponentWise,
        is_comparison: false,
    }
}

const fn comparison(id: IntrinsicOpId, func_name: &'static str, operator: &'static str) -> IntrinsicInfo {
    IntrinsicInfo {
        is_comparison: true,
        ..binary(id, func_name, operator)
    }
}

const fn unary(id: IntrinsicOpId, func_name: &'static str, operator: &'static str) -> IntrinsicInfo {
    IntrinsicInfo {
        id,
        func_name,
        operator: Some(operator),
        fixity: Fixity::Prefix,
        arity: Some(1),
        shape: IntrinsicShape::ComponentWise,
        is_comparison: false,
    }
}

const fn call(id: IntrinsicOpId, func_name: &'static str, arity: u8) -> IntrinsicInfo {
    IntrinsicInfo {
        id,
        func_name,
        operator: None,
        fixity: Fixity::Call,
        arity: Some(arity),
        shape: IntrinsicShape::ComponentWise,
        is_comparison: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_are_only_set_for_infix_and_prefix() {
        for info in INTRINSICS {
            match info.fixity {
                Fixity::Infix | Fixity::Prefix => assert!(info.operator.is_some(), "{:?}", info.id),
                Fixity::Call => assert!(info.operator.is_none(), "{:?}", info.id),
            }
        }
    }

    #[test]
    fn comparisons_are_binary_infix() {
        let comparisons: Vec<_> = INTRINSICS.iter().filter(|i| i.is_comparison).map(|i| i.id).collect();
        assert_eq!(
            comparisons,
            vec![
                IntrinsicOpId::Eq,
                IntrinsicOpId::Neq,
                IntrinsicOpId::Lt,
                IntrinsicOpId::Leq,
                IntrinsicOpId::Gt,
                IntrinsicOpId::Geq
            ]
        );
        for id in comparisons {
            assert_eq!(info_for(id).fixity, Fixity::Infix);
        }
    }

    #[test]
    fn frem_has_no_operator_spelling() {
        let info = info_for(IntrinsicOpId::FRem);
        assert_eq!(info.func_name, "fmod");
        assert_eq!(info.operator, None);
    }
}
