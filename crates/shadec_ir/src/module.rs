//! The instruction arena and its invariants.

use serde::{Deserialize, Serialize};

use crate::error::IrError;
use crate::inst::{Inst, InstId, InstKind};

/// Largest row or column count of a matrix type, matching the widest target vector.
pub const MAX_MATRIX_DIMENSION: u32 = 4;

/// A finalized IR module: an arena of instructions plus the ordered list of top-level ones.
///
/// ## Notes
/// - An instruction's id is its index in `insts` (also in the JSON form, where ids are implicit).
/// - `globals` holds types, global variables, and functions in source order. Instructions only reachable from a
///   global (blocks, params, values) are not listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub insts: Vec<Inst>,
    pub globals: Vec<InstId>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction and return its id.
    pub fn push(&mut self, inst: Inst) -> InstId {
        let id = InstId::from_raw(self.insts.len() as u32);
        self.insts.push(inst);
        id
    }

    pub fn get(&self, id: InstId) -> Option<&Inst> {
        self.insts.get(id.index())
    }

    pub fn get_mut(&mut self, id: InstId) -> Option<&mut Inst> {
        self.insts.get_mut(id.index())
    }

    /// Look up an instruction, reporting a dangling id as an error.
    ///
    /// ## Parameters
    /// - `id`: The id to resolve.
    ///
    /// ## Returns
    /// - The instruction, or [`IrError::DanglingReference`] (with `from == to`) when `id` is out of range.
    pub fn inst(&self, id: InstId) -> Result<&Inst, IrError> {
        self.get(id).ok_or(IrError::DanglingReference { from: id, to: id })
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstId, &Inst)> {
        self.insts
            .iter()
            .enumerate()
            .map(|(i, inst)| (InstId::from_raw(i as u32), inst))
    }

    /// Parse a module from its JSON interchange form.
    pub fn from_json(text: &str) -> Result<Self, IrError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, IrError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the invariants emitters rely on.
    ///
    /// ## Returns
    /// - `Ok(())` when every reference resolves, every opcode has an acceptable operand count, vector and matrix
    ///   elements are scalar, matrix dimensions are within [`MAX_MATRIX_DIMENSION`], values carry a result type, and `globals` only lists types, variables, and functions.
    /// - The first violation found otherwise.
    #[tracing::instrument(skip_all, fields(insts = self.insts.len(), globals = self.globals.len()))]
    pub fn validate(&self) -> Result<(), IrError> {
        for (id, inst) in self.iter() {
            for referenced in inst.referenced_ids() {
                if self.get(referenced).is_none() {
                    return Err(IrError::DanglingReference { from: id, to: referenced });
                }
            }

            let expected = inst.kind.operand_count();
            if !expected.accepts(inst.operands.len()) {
                return Err(IrError::OperandCount {
                    inst: id,
                    op: inst.kind.name(),
                    expected,
                    found: inst.operands.len(),
                });
            }

            self.validate_payload(id, inst)?;
        }

        for &global in &self.globals {
            let inst = self.inst(global)?;
            if !inst.kind.is_global() {
                return Err(IrError::InvalidGlobal {
                    inst: global,
                    op: inst.kind.name(),
                });
            }
        }

        tracing::debug!("module validated");
        Ok(())
    }

    fn validate_payload(&self, id: InstId, inst: &Inst) -> Result<(), IrError> {
        match &inst.kind {
            InstKind::VectorType { .. } | InstKind::MatrixType { .. } => {
                let element = inst.operands[0];
                let element_inst = self.inst(element)?;
                let is_scalar = matches!(element_inst.kind, InstKind::BasicType { base } if base.is_value());
                if !is_scalar {
                    return Err(IrError::NonScalarElement {
                        inst: id,
                        op: inst.kind.name(),
                        element,
                        element_op: element_inst.kind.name(),
                    });
                }
                if let InstKind::MatrixType { rows, cols } = inst.kind {
                    let in_range = |n: u32| (1..=MAX_MATRIX_DIMENSION).contains(&n);
                    if !in_range(rows) || !in_range(cols) {
                        return Err(IrError::MatrixDimension {
                            inst: id,
                            op: inst.kind.name(),
                            rows,
                            cols,
                            max: MAX_MATRIX_DIMENSION,
                        });
                    }
                }
            }
            InstKind::StructType { fields } => {
                for field in fields {
                    self.expect_type(field.ty)?;
                }
            }
            InstKind::Func { params, body } => {
                for &param in params {
                    self.expect_kind(param, "param", |k| matches!(k, InstKind::Param))?;
                }
                if let Some(body) = body {
                    self.expect_kind(*body, "block", |k| matches!(k, InstKind::Block { .. }))?;
                }
            }
            InstKind::IfElse { then_block, else_block } => {
                self.expect_kind(*then_block, "block", |k| matches!(k, InstKind::Block { .. }))?;
                if let Some(else_block) = else_block {
                    self.expect_kind(*else_block, "block", |k| matches!(k, InstKind::Block { .. }))?;
                }
            }
            InstKind::Loop { body } => {
                self.expect_kind(*body, "block", |k| matches!(k, InstKind::Block { .. }))?;
            }
            _ => {}
        }

        let needs_type = !inst.kind.is_type()
            && !inst.kind.is_statement_only()
            && !matches!(inst.kind, InstKind::Block { .. });
        if needs_type {
            match inst.ty {
                Some(ty) => self.expect_type(ty)?,
                None => {
                    return Err(IrError::MissingType {
                        inst: id,
                        op: inst.kind.name(),
                    });
                }
            }
        }
        Ok(())
    }

    fn expect_type(&self, id: InstId) -> Result<(), IrError> {
        self.expect_kind(id, "a type", InstKind::is_type)
    }

    fn expect_kind(
        &self,
        id: InstId,
        expected: &'static str,
        pred: impl Fn(&InstKind) -> bool,
    ) -> Result<(), IrError> {
        let inst = self.inst(id)?;
        if pred(&inst.kind) {
            Ok(())
        } else {
            Err(IrError::UnexpectedKind {
                inst: id,
                expected,
                found: inst.kind.name(),
            })
        }
    }
}
