//! Define error types for IR → source emission.
//!
//! These errors represent *backend emission* failures. Capability shortfalls are not errors: they raise the
//! tracked SM version instead (see [`super::extensions`]).
//!
//! ## Notes
//!
//! - Every variant carries a stable diagnostic code so tooling can match on it.
//! - A failed pass returns no text; callers never see partially emitted source.

use miette::Diagnostic;
use shadec_core::lang::targets::TargetDialect;
use shadec_ir::{InstId, IrError};
use thiserror::Error;

use super::context::Phase;

/// Error during source emission.
#[derive(Debug, Error, Diagnostic)]
pub enum EmitError {
    /// The target dialect has no spelling for a type.
    #[error("the {target} target cannot express {ty}: {reason}")]
    #[diagnostic(code(shadec::emit::unsupported_type))]
    UnsupportedType {
        ty: String,
        target: TargetDialect,
        reason: String,
    },

    /// An instruction has no valid rendering in the target dialect.
    #[error("unsupported: {0}")]
    #[diagnostic(code(shadec::emit::unsupported))]
    Unsupported(String),

    /// The module breaks an invariant the emitter depends on.
    #[error("malformed IR at {inst}: {message}")]
    #[diagnostic(code(shadec::emit::malformed_ir), help("run `shadec check` on the module for a full report"))]
    MalformedIr { inst: InstId, message: String },

    /// The module failed validation before emission started.
    #[error(transparent)]
    #[diagnostic(code(shadec::emit::invalid_module))]
    InvalidModule(#[from] IrError),

    /// Emission phases were driven out of order (an emitter bug, not a user error).
    #[error("emission phase {to:?} cannot follow {from:?}")]
    #[diagnostic(code(shadec::emit::phase))]
    Phase { from: Phase, to: Phase },
}

impl EmitError {
    pub(crate) fn malformed(inst: InstId, message: impl Into<String>) -> Self {
        EmitError::MalformedIr {
            inst,
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        EmitError::Unsupported(message.into())
    }
}
