//! Per-pass emission state.
//!
//! An [`EmitContext`] owns everything one module emission mutates: the output writer, the type and intrinsic
//! registries, the capability tracker, the name table and the pass phase. Dialects are immutable and receive
//! the context explicitly, so independent passes never share state.
//!
//! ## Notes
//! - Global names are reserved verbatim before any body is emitted; a later collision gets a numeric suffix.
//! - Locals are named from their hint (sanitized, never a reserved word) or `_S<n>`.
//! - Names the preprocessor section may define (type spellings, `<func>_<types>` helpers, `make_<type>`) are
//!   never handed out to module symbols.

use std::collections::{HashMap, HashSet};

use shadec_core::SemanticVersion;
use shadec_core::lang::intrinsics::INTRINSICS;
use shadec_ir::{Inst, InstId, InstKind, Module};

use super::config::EmitOptions;
use super::dialect::Dialect;
use super::errors::EmitError;
use super::extensions::ExtensionTracker;
use super::intrinsics::{IntrinsicSet, identifier_part};
use super::type_set::{TypeData, TypeId, TypeSet};
use super::writer::SourceWriter;

/// Module emission phase. Transitions only ever move to the immediate successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Idle,
    TypesRegistered,
    ActionsPlanned,
    ForwardDeclsEmitted,
    SharedGlobalsEmitted,
    ThreadLocalGlobalsEmitted,
    FunctionsEmitted,
    Done,
}

impl Phase {
    pub fn successor(self) -> Option<Phase> {
        match self {
            Phase::Idle => Some(Phase::TypesRegistered),
            Phase::TypesRegistered => Some(Phase::ActionsPlanned),
            Phase::ActionsPlanned => Some(Phase::ForwardDeclsEmitted),
            Phase::ForwardDeclsEmitted => Some(Phase::SharedGlobalsEmitted),
            Phase::SharedGlobalsEmitted => Some(Phase::ThreadLocalGlobalsEmitted),
            Phase::ThreadLocalGlobalsEmitted => Some(Phase::FunctionsEmitted),
            Phase::FunctionsEmitted => Some(Phase::Done),
            Phase::Done => None,
        }
    }
}

/// Identifiers generated code must never declare.
const RESERVED_WORDS: &[&str] = &[
    "auto", "blockDim", "blockIdx", "bool", "break", "case", "char", "class", "const", "continue", "CUsurfObject",
    "CUtexObject", "default", "delete", "do", "double", "else", "enum", "extern", "false", "FixedArray", "float",
    "for", "goto", "gridDim", "half", "if", "inline", "int", "long", "longlong", "namespace", "new", "operator",
    "private", "protected", "public", "register", "return", "SamplerComparisonState", "SamplerState", "short",
    "signed", "sizeof", "static", "struct", "switch", "template", "this", "threadIdx", "true", "typedef", "uchar",
    "uint", "ulonglong", "union", "unsigned", "ushort", "virtual", "void", "volatile", "warpSize", "while",
];

/// Prefix of CUDA's native vector constructors (`make_float3`).
const VECTOR_CONSTRUCTOR_PREFIX: &str = "make";

/// Spellings the preprocessor section can define for the registered types.
#[derive(Debug, Default)]
struct GeneratedNames {
    /// Full type spellings: `float3`, `float2x2`.
    types: HashSet<String>,
    /// Type spellings as they appear inside mangled helper names.
    parts: HashSet<String>,
}

impl GeneratedNames {
    fn contains(&self, name: &str) -> bool {
        if self.types.contains(name) {
            return true;
        }
        INTRINSICS
            .iter()
            .map(|info| info.func_name)
            .chain(std::iter::once(VECTOR_CONSTRUCTOR_PREFIX))
            .filter_map(|prefix| name.strip_prefix(prefix)?.strip_prefix('_'))
            .any(|rest| self.spells_types(rest))
    }

    /// Whether `rest` is one or more type parts joined by `_`.
    fn spells_types(&self, rest: &str) -> bool {
        self.parts.contains(rest)
            || self.parts.iter().any(|part| {
                rest.strip_prefix(part.as_str())
                    .and_then(|tail| tail.strip_prefix('_'))
                    .is_some_and(|tail| self.spells_types(tail))
            })
    }
}

#[derive(Debug, Default)]
struct NameTable {
    names: HashMap<InstId, String>,
    taken: HashSet<String>,
    generated: GeneratedNames,
    next_temp: u32,
}

impl NameTable {
    fn claim(&mut self, id: InstId, base: String) -> String {
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.taken.contains(&candidate) || self.generated.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        self.taken.insert(candidate.clone());
        self.names.insert(id, candidate.clone());
        candidate
    }

    fn temp(&mut self, id: InstId) -> String {
        loop {
            self.next_temp += 1;
            let candidate = format!("_S{}", self.next_temp);
            if !self.taken.contains(&candidate) {
                return self.claim(id, candidate);
            }
        }
    }
}

/// Reduce a name hint to a C identifier, or `None` if nothing usable remains.
pub fn sanitize_identifier(hint: &str) -> Option<String> {
    let mut out: String = hint
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' { ch } else { '_' })
        .collect();
    if out.is_empty() || out.chars().all(|ch| ch == '_') {
        return None;
    }
    if out.starts_with(|ch: char| ch.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if RESERVED_WORDS.contains(&out.as_str()) {
        out.push('_');
    }
    Some(out)
}

/// Which function-local values are rendered inline at their single use.
#[derive(Debug, Default)]
struct FoldPlan {
    folded: HashSet<InstId>,
}

impl FoldPlan {
    fn analyze(module: &Module, body: InstId) -> Result<Self, EmitError> {
        let mut block_of = HashMap::new();
        let mut users: HashMap<InstId, Vec<InstId>> = HashMap::new();
        let mut stack = vec![body];
        while let Some(block) = stack.pop() {
            let InstKind::Block { insts } = &module.inst(block)?.kind else {
                return Err(EmitError::malformed(block, "expected a block"));
            };
            for &id in insts {
                block_of.insert(id, block);
                let inst = module.inst(id)?;
                for &operand in &inst.operands {
                    users.entry(operand).or_default().push(id);
                }
                match &inst.kind {
                    InstKind::IfElse { then_block, else_block } => {
                        stack.push(*then_block);
                        stack.extend(else_block.iter().copied());
                    }
                    InstKind::Loop { body } => stack.push(*body),
                    _ => {}
                }
            }
        }

        let mut folded = HashSet::new();
        for (&id, &block) in &block_of {
            let inst = module.inst(id)?;
            if !inst.kind.is_pure() || inst.name.is_some() {
                continue;
            }
            // Reading through a variable inline could observe a later store.
            let reads_memory = inst.operands.iter().any(|&op| {
                module
                    .get(op)
                    .is_some_and(|o| matches!(o.kind, InstKind::Var | InstKind::GlobalVar { .. }))
            });
            if reads_memory {
                continue;
            }
            if let Some([user]) = users.get(&id).map(Vec::as_slice) {
                if block_of.get(user) == Some(&block) {
                    folded.insert(id);
                }
            }
        }
        Ok(Self { folded })
    }
}

/// Mutable state of one module emission.
pub struct EmitContext<'m> {
    pub module: &'m Module,
    pub options: EmitOptions,
    pub writer: SourceWriter,
    pub types: TypeSet,
    pub intrinsics: IntrinsicSet,
    pub extensions: ExtensionTracker,
    names: NameTable,
    phase: Phase,
    fold: FoldPlan,
}

impl<'m> EmitContext<'m> {
    pub fn new(module: &'m Module, options: EmitOptions) -> Self {
        Self {
            module,
            writer: SourceWriter::new(options.indent_width),
            extensions: ExtensionTracker::new(options.capability_floor),
            options,
            types: TypeSet::new(),
            intrinsics: IntrinsicSet::new(),
            names: NameTable::default(),
            phase: Phase::Idle,
            fold: FoldPlan::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to `next`, which must be the current phase's successor.
    pub fn advance(&mut self, next: Phase) -> Result<(), EmitError> {
        if self.phase.successor() != Some(next) {
            return Err(EmitError::Phase {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!(from = ?self.phase, to = ?next, "emission phase");
        self.phase = next;
        Ok(())
    }

    pub fn inst(&self, id: InstId) -> Result<&'m Inst, EmitError> {
        self.module
            .get(id)
            .ok_or_else(|| EmitError::malformed(id, "reference to a missing instruction"))
    }

    /// Canonical type of a type instruction.
    pub fn import_type(&mut self, ty: InstId) -> Result<TypeId, EmitError> {
        self.types.import(self.module, ty)
    }

    /// Canonical result type of a value instruction.
    pub fn type_of(&mut self, value: InstId) -> Result<TypeId, EmitError> {
        let inst = self.inst(value)?;
        let ty = inst
            .ty
            .ok_or_else(|| EmitError::malformed(value, format!("{} has no result type", inst.kind.name())))?;
        self.import_type(ty)
    }

    pub fn require_sm_version(&mut self, version: SemanticVersion) {
        self.extensions.require_sm_version(version);
    }

    /// Keep module symbols off every name the preprocessor section may define for the registered types.
    pub fn reserve_generated_names(&mut self, outer: &dyn Dialect) {
        for (id, data) in self.types.iter() {
            if matches!(data, TypeData::Struct { .. }) {
                continue;
            }
            // Types without a spelling fail later, where they are used.
            if let Ok(name) = outer.calc_type_name(&self.types, id, outer) {
                self.names.generated.parts.insert(identifier_part(&name));
                self.names.generated.types.insert(name);
            }
        }
    }

    /// Reserve the names of every global, in module order.
    pub fn reserve_global_names(&mut self) -> Result<(), EmitError> {
        for &id in &self.module.globals {
            let inst = self.inst(id)?;
            if self.names.names.contains_key(&id) {
                continue;
            }
            match (&inst.kind, inst.name.as_deref()) {
                // Struct spellings come from the type registry, so they are taken verbatim.
                (InstKind::StructType { .. }, Some(name)) => {
                    self.names.taken.insert(name.to_string());
                    self.names.names.insert(id, name.to_string());
                }
                (kind, hint) if !kind.is_type() => {
                    match hint.and_then(sanitize_identifier) {
                        Some(base) => self.names.claim(id, base),
                        None => self.names.temp(id),
                    };
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Name assigned to `id`, if any.
    pub fn name(&self, id: InstId) -> Option<&str> {
        self.names.names.get(&id).map(String::as_str)
    }

    /// Name of `id`, assigning one from its hint (or a temporary) on first use.
    pub fn name_or_assign(&mut self, id: InstId) -> Result<String, EmitError> {
        if let Some(existing) = self.names.names.get(&id) {
            return Ok(existing.clone());
        }
        let hint = self.inst(id)?.name.as_deref().and_then(sanitize_identifier);
        Ok(match hint {
            Some(base) => self.names.claim(id, base),
            None => self.names.temp(id),
        })
    }

    /// Prepare per-function state before emitting `body`.
    pub fn begin_function(&mut self, body: InstId) -> Result<(), EmitError> {
        self.fold = FoldPlan::analyze(self.module, body)?;
        Ok(())
    }

    /// Whether `id` is rendered at its single use instead of as a temporary.
    pub fn is_folded(&self, id: InstId) -> bool {
        self.fold.folded.contains(&id)
    }
}
