//! Interned type registry for one emission pass.
//!
//! IR modules may spell the same structural type several times (two `vector_type` instructions over `uint32`
//! with count 3). The emitter works on [`TypeId`]s from a [`TypeSet`] instead, which holds at most one id per
//! distinct shape. Nominal structs stay distinct per declaring instruction.
//!
//! ## Notes
//! - Importing checks the element invariant: vector and matrix elements must be non-void scalars.
//! - Width-1 matrix rows are scalars, so [`TypeSet::add_vector_type`] with a count of 1 returns the element.

use std::collections::{HashMap, HashSet};

use shadec_ir::{BaseType, InstId, InstKind, Module, ResourceAccess};

use super::errors::EmitError;

/// Canonical handle to an interned type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

/// Structural description of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeData {
    Basic(BaseType),
    Vector { element: TypeId, count: u32 },
    Matrix { element: TypeId, rows: u32, cols: u32 },
    Array { element: TypeId, count: u32 },
    UnsizedArray { element: TypeId },
    Ptr { pointee: TypeId },
    Texture {
        element: TypeId,
        access: ResourceAccess,
        multisample: bool,
    },
    TextureSampler { element: TypeId },
    SamplerState { comparison: bool },
    Struct { decl: InstId, name: String },
}

/// Value shape used by intrinsic lowering and initializer emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar(BaseType),
    Vector { element: BaseType, count: u32 },
    Matrix { element: BaseType, rows: u32, cols: u32 },
    Other,
}

impl Shape {
    /// Total number of scalar components, or `None` for non-numeric shapes.
    pub fn component_count(self) -> Option<u32> {
        match self {
            Shape::Scalar(_) => Some(1),
            Shape::Vector { count, .. } => Some(count),
            Shape::Matrix { rows, cols, .. } => rows.checked_mul(cols),
            Shape::Other => None,
        }
    }

    pub fn element(self) -> Option<BaseType> {
        match self {
            Shape::Scalar(element) | Shape::Vector { element, .. } | Shape::Matrix { element, .. } => Some(element),
            Shape::Other => None,
        }
    }
}

/// Deduplicating registry of every type the pass has seen.
#[derive(Debug, Default)]
pub struct TypeSet {
    types: Vec<TypeData>,
    index: HashMap<TypeData, TypeId>,
    imported: HashMap<InstId, TypeId>,
}

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a type, returning the existing id when the shape is already known.
    pub fn add(&mut self, data: TypeData) -> TypeId {
        if let Some(&id) = self.index.get(&data) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(data.clone());
        self.index.insert(data, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &TypeData {
        &self.types[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Every registered type in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeData)> {
        self.types.iter().enumerate().map(|(i, data)| (TypeId(i as u32), data))
    }

    /// Import an IR type instruction.
    ///
    /// ## Parameters
    /// - `module`: The module that owns `id`.
    /// - `id`: A type instruction.
    ///
    /// ## Returns
    /// - The canonical [`TypeId`] for the instruction's shape.
    /// - [`EmitError::MalformedIr`] if `id` is not a type, or breaks the scalar-element invariant.
    pub fn import(&mut self, module: &Module, id: InstId) -> Result<TypeId, EmitError> {
        if let Some(&known) = self.imported.get(&id) {
            return Ok(known);
        }
        let inst = module
            .get(id)
            .ok_or_else(|| EmitError::malformed(id, "reference to a missing type"))?;
        let element = |set: &mut TypeSet| -> Result<TypeId, EmitError> {
            let element = inst
                .operands
                .first()
                .copied()
                .ok_or_else(|| EmitError::malformed(id, format!("{} has no element type", inst.kind.name())))?;
            set.import(module, element)
        };

        let data = match &inst.kind {
            InstKind::BasicType { base } => TypeData::Basic(*base),
            InstKind::VectorType { count } => {
                let element = element(self)?;
                self.expect_scalar_element(id, element)?;
                if *count == 0 {
                    return Err(EmitError::malformed(id, "vector types need at least one element"));
                }
                TypeData::Vector { element, count: *count }
            }
            InstKind::MatrixType { rows, cols } => {
                let element = element(self)?;
                self.expect_scalar_element(id, element)?;
                if *rows == 0 || *cols == 0 {
                    return Err(EmitError::malformed(id, "matrix types need at least one row and column"));
                }
                TypeData::Matrix {
                    element,
                    rows: *rows,
                    cols: *cols,
                }
            }
            InstKind::ArrayType { count } => {
                let element = element(self)?;
                match count {
                    Some(count) => TypeData::Array { element, count: *count },
                    None => TypeData::UnsizedArray { element },
                }
            }
            InstKind::PtrType => TypeData::Ptr {
                pointee: element(self)?,
            },
            InstKind::TextureType { access, multisample } => TypeData::Texture {
                element: element(self)?,
                access: *access,
                multisample: *multisample,
            },
            InstKind::TextureSamplerType => TypeData::TextureSampler {
                element: element(self)?,
            },
            InstKind::SamplerStateType { comparison } => TypeData::SamplerState {
                comparison: *comparison,
            },
            InstKind::StructType { .. } => {
                let name = inst
                    .name
                    .clone()
                    .ok_or_else(|| EmitError::malformed(id, "struct types must be named"))?;
                TypeData::Struct { decl: id, name }
            }
            other => {
                return Err(EmitError::malformed(
                    id,
                    format!("expected a type, found {}", other.name()),
                ));
            }
        };

        let ty = self.add(data);
        self.imported.insert(id, ty);
        Ok(ty)
    }

    fn expect_scalar_element(&self, owner: InstId, element: TypeId) -> Result<(), EmitError> {
        match self.get(element) {
            TypeData::Basic(base) if base.is_value() => Ok(()),
            _ => Err(EmitError::malformed(
                owner,
                format!("element type {} is not a scalar", self.describe(element)),
            )),
        }
    }

    /// Register every type reachable from the module's globals.
    #[tracing::instrument(skip_all)]
    pub fn add_all_builtin_types(&mut self, module: &Module) -> Result<(), EmitError> {
        let mut visited = HashSet::new();
        let mut stack: Vec<InstId> = module.globals.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let inst = module
                .get(id)
                .ok_or_else(|| EmitError::malformed(id, "reference to a missing instruction"))?;
            if inst.kind.is_type() {
                self.import(module, id)?;
            }
            stack.extend(inst.referenced_ids().into_iter().rev());
        }
        tracing::debug!(types = self.len(), "registered module types");
        Ok(())
    }

    /// Register (or find) the vector of `count` elements; a count of 1 yields the element itself.
    pub fn add_vector_type(&mut self, element: TypeId, count: u32) -> TypeId {
        if count == 1 {
            return element;
        }
        self.add(TypeData::Vector { element, count })
    }

    /// Register the row vector type of every registered matrix.
    pub fn add_vector_for_matrix_types(&mut self) {
        let rows: Vec<(TypeId, u32)> = self
            .types
            .iter()
            .filter_map(|data| match data {
                TypeData::Matrix { element, cols, .. } => Some((*element, *cols)),
                _ => None,
            })
            .collect();
        for (element, cols) in rows {
            self.add_vector_type(element, cols);
        }
    }

    /// Row type of a matrix: a vector of `cols` elements, or the element when `cols == 1`.
    pub fn matrix_row_type(&mut self, matrix: TypeId) -> Option<TypeId> {
        match *self.get(matrix) {
            TypeData::Matrix { element, cols, .. } => Some(self.add_vector_type(element, cols)),
            _ => None,
        }
    }

    /// Whether two types have the same shape.
    pub fn are_equivalent(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (
                TypeData::Vector { element: ea, count: ca },
                TypeData::Vector { element: eb, count: cb },
            ) => ca == cb && self.are_equivalent(*ea, *eb),
            (
                TypeData::Matrix {
                    element: ea,
                    rows: ra,
                    cols: ca,
                },
                TypeData::Matrix {
                    element: eb,
                    rows: rb,
                    cols: cb,
                },
            ) => ra == rb && ca == cb && self.are_equivalent(*ea, *eb),
            (TypeData::Basic(x), TypeData::Basic(y)) => x == y,
            _ => false,
        }
    }

    pub fn shape(&self, id: TypeId) -> Shape {
        let base_of = |element: TypeId| match self.get(element) {
            TypeData::Basic(base) => Some(*base),
            _ => None,
        };
        match self.get(id) {
            TypeData::Basic(base) if base.is_value() => Shape::Scalar(*base),
            TypeData::Vector { element, count } => match base_of(*element) {
                Some(element) => Shape::Vector { element, count: *count },
                None => Shape::Other,
            },
            TypeData::Matrix { element, rows, cols } => match base_of(*element) {
                Some(element) => Shape::Matrix {
                    element,
                    rows: *rows,
                    cols: *cols,
                },
                None => Shape::Other,
            },
            _ => Shape::Other,
        }
    }

    pub fn is_scalar(&self, id: TypeId) -> bool {
        matches!(self.shape(id), Shape::Scalar(_))
    }

    /// Human-readable description for diagnostics.
    pub fn describe(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeData::Basic(base) => format!("{base:?}").to_lowercase(),
            TypeData::Vector { element, count } => format!("vector<{}, {count}>", self.describe(*element)),
            TypeData::Matrix { element, rows, cols } => {
                format!("matrix<{}, {rows}, {cols}>", self.describe(*element))
            }
            TypeData::Array { element, count } => format!("array<{}, {count}>", self.describe(*element)),
            TypeData::UnsizedArray { element } => format!("array<{}>", self.describe(*element)),
            TypeData::Ptr { pointee } => format!("ptr<{}>", self.describe(*pointee)),
            TypeData::Texture {
                element,
                access,
                multisample,
            } => {
                let ms = if *multisample { ", multisample" } else { "" };
                format!("texture<{}, {access:?}{ms}>", self.describe(*element))
            }
            TypeData::TextureSampler { element } => format!("sampler_texture<{}>", self.describe(*element)),
            TypeData::SamplerState { comparison } => {
                if *comparison {
                    "sampler_comparison_state".to_string()
                } else {
                    "sampler_state".to_string()
                }
            }
            TypeData::Struct { name, .. } => format!("struct {name}"),
        }
    }
}
