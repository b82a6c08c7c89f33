//! CUDA dialect.
//!
//! [`CudaEmitter`] holds a [`CLikeEmitter`] and forwards to it for everything CUDA spells the same way. What
//! it overrides:
//!
//! - scalar and vector names (`uint`, `uint3`, `longlong2`), texture objects;
//! - `make_<vector>(...)` factories and matrix brace initializers;
//! - warp intrinsics and capability tracking on calls;
//! - kernel/device preambles, system-value parameters, `__shared__`, `#pragma unroll`;
//! - a typedef prelude and bool vector structs.

mod decls;
mod lowering;
mod types;

use shadec_core::lang::targets::TargetDialect;

use super::c_like::CLikeEmitter;
use super::dialect::Dialect;

pub use decls::system_value_expr;

/// CUDA source dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct CudaEmitter {
    base: CLikeEmitter,
}

impl CudaEmitter {
    pub fn new() -> Self {
        Self {
            base: CLikeEmitter::new(),
        }
    }
}

impl Dialect for CudaEmitter {
    fn target(&self) -> TargetDialect {
        TargetDialect::Cuda
    }
}
