//! Default C++ dialect and the shared emission walkers.
//!
//! [`CLikeEmitter`] implements every dialect capability for plain C++ (the `cpp` target). The free functions in
//! the submodules walk instructions, statements, declarations and the preprocessor section; they are shared by
//! all dialects and always dispatch through `outer`, so a wrapping dialect only overrides what differs.
//!
//! ## See also
//! - [`super::cuda`] for the CUDA dialect built on top of this one.

pub mod decls;
pub mod exprs;
pub mod initializers;
pub mod lowering;
pub mod preprocessor;
pub mod stmts;
pub mod types;

use shadec_core::lang::targets::TargetDialect;

use super::dialect::Dialect;

/// The default dialect. Other dialects hold one and delegate to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CLikeEmitter;

impl CLikeEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for CLikeEmitter {
    fn target(&self) -> TargetDialect {
        TargetDialect::Cpp
    }
}
