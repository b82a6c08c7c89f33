//! Instructions, instruction ids, and opcodes.

use std::fmt;

use serde::{Deserialize, Serialize};
use shadec_core::lang::intrinsics::{self, IntrinsicOpId};
use shadec_core::lang::semantics::SystemValueSemantic;

use crate::decorations::{Decoration, LoopControlMode};
use crate::types::{BaseType, ResourceAccess};

/// Stable, non-owning handle to an instruction in a [`crate::Module`].
///
/// Ids are arena indices: they are only meaningful for the module that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstId(u32);

impl InstId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Storage rate of a global variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rate {
    /// One copy per thread.
    #[default]
    ThreadLocal,
    /// One copy per thread group, visible to every thread in it.
    GroupShared,
}

/// A named member of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: InstId,
}

/// Opcode plus per-opcode payload.
///
/// Operand conventions (the ids in [`Inst::operands`]):
/// - element-carrying types (`vector_type`, `matrix_type`, `array_type`, `ptr_type`, `texture_type`,
///   `texture_sampler_type`): `[element]`
/// - `call`: `[callee, args...]`; `specialize`: `[generic, type_args...]`
/// - `store`: `[destination, value]`; `get_element_ptr` / `get_element`: `[base, index]`
/// - `field_address` / `field_extract` / `swizzle` / `load`: `[base]`
/// - `wave_mask_ballot`: `[mask, condition]`; `wave_mask_match`: `[mask, value]`
/// - `if_else`: `[condition]`; `return`: `[]` or `[value]`
///
/// Addresses (`var`, `global_var`, `get_element_ptr`, `field_address`) carry the type of the storage they
/// name, not a pointer type; `load` and `store` go through them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InstKind {
    // Types
    BasicType { base: BaseType },
    VectorType { count: u32 },
    MatrixType { rows: u32, cols: u32 },
    ArrayType {
        #[serde(default)]
        count: Option<u32>,
    },
    PtrType,
    TextureType {
        access: ResourceAccess,
        #[serde(default)]
        multisample: bool,
    },
    TextureSamplerType,
    SamplerStateType {
        #[serde(default)]
        comparison: bool,
    },
    StructType { fields: Vec<StructField> },

    // Globals and structure
    GlobalVar {
        #[serde(default)]
        rate: Rate,
    },
    Func {
        params: Vec<InstId>,
        #[serde(default)]
        body: Option<InstId>,
    },
    Param,
    Block { insts: Vec<InstId> },

    // Values
    IntLit { value: i64 },
    FloatLit { value: f64 },
    BoolLit { value: bool },
    Construct,
    MakeVector,
    MakeMatrix,
    MakeArray,
    Arith { intrinsic: IntrinsicOpId },
    Call,
    Specialize,
    Var,
    Load,
    Store,
    GetElementPtr,
    GetElement,
    FieldAddress { field: u32 },
    FieldExtract { field: u32 },
    Swizzle { indices: Vec<u32> },
    WaveMaskBallot,
    WaveMaskMatch,

    // Control flow
    IfElse {
        then_block: InstId,
        #[serde(default)]
        else_block: Option<InstId>,
    },
    Loop { body: InstId },
    Break,
    Continue,
    Return,
}

/// Number of operands an opcode accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandCount {
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
    Any,
}

impl OperandCount {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            OperandCount::Exactly(k) => n == k,
            OperandCount::AtLeast(k) => n >= k,
            OperandCount::AtMost(k) => n <= k,
            OperandCount::Any => true,
        }
    }
}

impl fmt::Display for OperandCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandCount::Exactly(k) => write!(f, "exactly {k}"),
            OperandCount::AtLeast(k) => write!(f, "at least {k}"),
            OperandCount::AtMost(k) => write!(f, "at most {k}"),
            OperandCount::Any => f.write_str("any number of"),
        }
    }
}

impl InstKind {
    /// Short opcode name, matching the JSON `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            InstKind::BasicType { .. } => "basic_type",
            InstKind::VectorType { .. } => "vector_type",
            InstKind::MatrixType { .. } => "matrix_type",
            InstKind::ArrayType { .. } => "array_type",
            InstKind::PtrType => "ptr_type",
            InstKind::TextureType { .. } => "texture_type",
            InstKind::TextureSamplerType => "texture_sampler_type",
            InstKind::SamplerStateType { .. } => "sampler_state_type",
            InstKind::StructType { .. } => "struct_type",
            InstKind::GlobalVar { .. } => "global_var",
            InstKind::Func { .. } => "func",
            InstKind::Param => "param",
            InstKind::Block { .. } => "block",
            InstKind::IntLit { .. } => "int_lit",
            InstKind::FloatLit { .. } => "float_lit",
            InstKind::BoolLit { .. } => "bool_lit",
            InstKind::Construct => "construct",
            InstKind::MakeVector => "make_vector",
            InstKind::MakeMatrix => "make_matrix",
            InstKind::MakeArray => "make_array",
            InstKind::Arith { .. } => "arith",
            InstKind::Call => "call",
            InstKind::Specialize => "specialize",
            InstKind::Var => "var",
            InstKind::Load => "load",
            InstKind::Store => "store",
            InstKind::GetElementPtr => "get_element_ptr",
            InstKind::GetElement => "get_element",
            InstKind::FieldAddress { .. } => "field_address",
            InstKind::FieldExtract { .. } => "field_extract",
            InstKind::Swizzle { .. } => "swizzle",
            InstKind::WaveMaskBallot => "wave_mask_ballot",
            InstKind::WaveMaskMatch => "wave_mask_match",
            InstKind::IfElse { .. } => "if_else",
            InstKind::Loop { .. } => "loop",
            InstKind::Break => "break",
            InstKind::Continue => "continue",
            InstKind::Return => "return",
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            InstKind::BasicType { .. }
                | InstKind::VectorType { .. }
                | InstKind::MatrixType { .. }
                | InstKind::ArrayType { .. }
                | InstKind::PtrType
                | InstKind::TextureType { .. }
                | InstKind::TextureSamplerType
                | InstKind::SamplerStateType { .. }
                | InstKind::StructType { .. }
        )
    }

    /// Instructions that may appear in [`crate::Module::globals`].
    pub fn is_global(&self) -> bool {
        self.is_type() || matches!(self, InstKind::GlobalVar { .. } | InstKind::Func { .. })
    }

    /// Control-flow and side-effecting instructions that only make sense as statements.
    pub fn is_statement_only(&self) -> bool {
        matches!(
            self,
            InstKind::Store
                | InstKind::IfElse { .. }
                | InstKind::Loop { .. }
                | InstKind::Break
                | InstKind::Continue
                | InstKind::Return
        )
    }

    /// Expressions with no side effects whose value depends only on their operands.
    pub fn is_pure(&self) -> bool {
        matches!(
            self,
            InstKind::IntLit { .. }
                | InstKind::FloatLit { .. }
                | InstKind::BoolLit { .. }
                | InstKind::Construct
                | InstKind::MakeVector
                | InstKind::MakeMatrix
                | InstKind::MakeArray
                | InstKind::Arith { .. }
                | InstKind::GetElement
                | InstKind::FieldExtract { .. }
                | InstKind::Swizzle { .. }
        )
    }

    /// Number of operands this opcode accepts.
    pub fn operand_count(&self) -> OperandCount {
        match self {
            InstKind::VectorType { .. }
            | InstKind::MatrixType { .. }
            | InstKind::ArrayType { .. }
            | InstKind::PtrType
            | InstKind::TextureType { .. }
            | InstKind::TextureSamplerType => OperandCount::Exactly(1),
            InstKind::BasicType { .. }
            | InstKind::SamplerStateType { .. }
            | InstKind::StructType { .. }
            | InstKind::GlobalVar { .. }
            | InstKind::Func { .. }
            | InstKind::Param
            | InstKind::Block { .. }
            | InstKind::IntLit { .. }
            | InstKind::FloatLit { .. }
            | InstKind::BoolLit { .. }
            | InstKind::Var
            | InstKind::Loop { .. }
            | InstKind::Break
            | InstKind::Continue => OperandCount::Exactly(0),
            InstKind::Construct | InstKind::MakeVector | InstKind::MakeMatrix | InstKind::MakeArray => {
                OperandCount::Any
            }
            InstKind::Arith { intrinsic } => match intrinsics::info_for(*intrinsic).arity {
                Some(n) => OperandCount::Exactly(n as usize),
                None => OperandCount::Any,
            },
            InstKind::Call | InstKind::Specialize => OperandCount::AtLeast(1),
            InstKind::Load
            | InstKind::FieldAddress { .. }
            | InstKind::FieldExtract { .. }
            | InstKind::Swizzle { .. }
            | InstKind::IfElse { .. } => OperandCount::Exactly(1),
            InstKind::Store
            | InstKind::GetElementPtr
            | InstKind::GetElement
            | InstKind::WaveMaskBallot
            | InstKind::WaveMaskMatch => OperandCount::Exactly(2),
            InstKind::Return => OperandCount::AtMost(1),
        }
    }

    /// Ids held in the payload (as opposed to the operand list).
    pub fn payload_ids(&self) -> Vec<InstId> {
        match self {
            InstKind::StructType { fields } => fields.iter().map(|f| f.ty).collect(),
            InstKind::Func { params, body } => params.iter().copied().chain(*body).collect(),
            InstKind::Block { insts } => insts.clone(),
            InstKind::IfElse { then_block, else_block } => std::iter::once(*then_block).chain(*else_block).collect(),
            InstKind::Loop { body } => vec![*body],
            _ => Vec::new(),
        }
    }
}

/// One node of the IR graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inst {
    #[serde(flatten)]
    pub kind: InstKind,
    /// Result type (for values) or declared type (for globals, params, vars).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<InstId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operands: Vec<InstId>,
    /// Name hint; globals and functions keep it verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorations: Vec<Decoration>,
}

impl Inst {
    pub fn new(kind: InstKind) -> Self {
        Self {
            kind,
            ty: None,
            operands: Vec::new(),
            name: None,
            decorations: Vec::new(),
        }
    }

    pub fn with_ty(mut self, ty: InstId) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_operands(mut self, operands: impl Into<Vec<InstId>>) -> Self {
        self.operands = operands.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_decoration(mut self, decoration: Decoration) -> Self {
        self.decorations.push(decoration);
        self
    }

    pub fn is_entry_point(&self) -> bool {
        self.decorations
            .iter()
            .any(|d| matches!(d, Decoration::EntryPoint { .. }))
    }

    pub fn system_value(&self) -> Option<SystemValueSemantic> {
        self.decorations.iter().find_map(|d| match d {
            Decoration::SystemValue { semantic } => Some(*semantic),
            _ => None,
        })
    }

    pub fn loop_control(&self) -> Option<LoopControlMode> {
        self.decorations.iter().find_map(|d| match d {
            Decoration::LoopControl { mode } => Some(*mode),
            _ => None,
        })
    }

    /// Every packed SM version this instruction declares it requires.
    pub fn required_cuda_sm_versions(&self) -> impl Iterator<Item = u64> + '_ {
        self.decorations.iter().filter_map(|d| match d {
            Decoration::RequireCudaSmVersion { version } => Some(*version),
            _ => None,
        })
    }

    /// Every id this instruction refers to: type, operands, then payload ids.
    pub fn referenced_ids(&self) -> Vec<InstId> {
        let mut ids: Vec<InstId> = self.ty.into_iter().collect();
        ids.extend(self.operands.iter().copied());
        ids.extend(self.kind.payload_ids());
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arith_operand_count_follows_registry() {
        let add = InstKind::Arith {
            intrinsic: IntrinsicOpId::Add,
        };
        assert_eq!(add.operand_count(), OperandCount::Exactly(2));
        let neg = InstKind::Arith {
            intrinsic: IntrinsicOpId::Neg,
        };
        assert_eq!(neg.operand_count(), OperandCount::Exactly(1));
        let init = InstKind::Arith {
            intrinsic: IntrinsicOpId::Init,
        };
        assert_eq!(init.operand_count(), OperandCount::Any);
    }

    #[test]
    fn referenced_ids_cover_payload() {
        let func = Inst::new(InstKind::Func {
            params: vec![InstId::from_raw(3)],
            body: Some(InstId::from_raw(4)),
        })
        .with_ty(InstId::from_raw(0));
        assert_eq!(
            func.referenced_ids(),
            vec![InstId::from_raw(0), InstId::from_raw(3), InstId::from_raw(4)]
        );
    }

    #[test]
    fn decoration_queries() {
        let param = Inst::new(InstKind::Param).with_decoration(Decoration::SystemValue {
            semantic: SystemValueSemantic::GroupId,
        });
        assert_eq!(param.system_value(), Some(SystemValueSemantic::GroupId));
        assert!(!param.is_entry_point());
        assert_eq!(param.required_cuda_sm_versions().count(), 0);
    }

    #[test]
    fn json_uses_op_tag() {
        let inst = Inst::new(InstKind::VectorType { count: 3 }).with_operands(vec![InstId::from_raw(1)]);
        let json = serde_json::to_string(&inst).unwrap();
        assert_eq!(json, r#"{"op":"vector_type","count":3,"operands":[1]}"#);
        let back: Inst = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inst);
    }
}
