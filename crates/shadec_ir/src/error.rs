//! IR validation and loading errors.

use thiserror::Error;

use crate::inst::{InstId, OperandCount};

/// A module that breaks an IR invariant, or that could not be loaded.
#[derive(Debug, Error)]
pub enum IrError {
    #[error("{from} refers to {to}, which is not in the module")]
    DanglingReference { from: InstId, to: InstId },

    #[error("{inst} ({op}) expects {expected} operands, found {found}")]
    OperandCount {
        inst: InstId,
        op: &'static str,
        expected: OperandCount,
        found: usize,
    },

    #[error("{inst} ({op}) must have a scalar element type, but {element} is a {element_op}")]
    NonScalarElement {
        inst: InstId,
        op: &'static str,
        element: InstId,
        element_op: &'static str,
    },

    #[error("{inst} ({op}) has {rows}x{cols} components; each dimension must be between 1 and {max}")]
    MatrixDimension {
        inst: InstId,
        op: &'static str,
        rows: u32,
        cols: u32,
        max: u32,
    },

    #[error("{inst} ({op}) cannot appear in the module's global list")]
    InvalidGlobal { inst: InstId, op: &'static str },

    #[error("{inst} expected {expected}, found {found}")]
    UnexpectedKind {
        inst: InstId,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{inst} ({op}) has no result type")]
    MissingType { inst: InstId, op: &'static str },

    #[error("invalid IR JSON: {0}")]
    Json(#[from] serde_json::Error),
}
