//! The whole-program unit the driver runs the analysis over.

use std::collections::BTreeMap;

use super::{BasicBlockId, Cell, Function, FunctionId, ValueId, ValueKind};

/// A lowered translation unit: every function (defined or merely
/// declared) plus the value arena shared across all of them.
///
/// Values are scoped to the whole module, not to a single function,
/// because a pointer computed in one function can be read back by
/// another through a global, a store/load pair, or a return value —
/// `Cell`s must compare equal across that boundary.
#[derive(Debug, Clone, Default)]
pub struct Module {
    functions: Vec<Function>,
    values: Vec<ValueKind>,
}

impl Module {
    /// An empty module. Use [`ModuleBuilder`] to populate one.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every function in the module, defined or declared.
    #[must_use]
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Looks up a function by id.
    #[must_use]
    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[usize::try_from(u32::from(id)).expect("id fits in usize")]
    }

    /// Looks up a function by its source-level name.
    #[must_use]
    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }

    /// The kind of SSA entity a value refers to.
    #[must_use]
    pub fn value_kind(&self, id: ValueId) -> ValueKind {
        self.values[usize::try_from(u32::from(id)).expect("id fits in usize")]
    }

    /// The function a value denotes, if the value is a function symbol.
    #[must_use]
    pub fn as_function_symbol(&self, id: ValueId) -> Option<FunctionId> {
        match self.value_kind(id) {
            ValueKind::FunctionSymbol(f) => Some(f),
            _ => None,
        }
    }

    /// Whether `cell` is the self-pointing cell of a function symbol —
    /// "a function Value always points to itself" holds unconditionally
    /// and is never stored as mutable lattice state, only consulted here.
    #[must_use]
    pub fn is_function_cell(&self, cell: Cell) -> bool {
        self.as_function_symbol(cell.value()).is_some()
    }
}

/// The reserved prefix LLVM IR uses for compiler intrinsics.
pub const INTRINSIC_PREFIX: &str = "llvm.";

/// Whether `name` is a debug intrinsic (`llvm.dbg.*`), dropped entirely
/// rather than modeled or reported as a call target.
#[must_use]
pub fn is_debug_intrinsic(name: &str) -> bool {
    name.starts_with("llvm.dbg.")
}

/// Whether `name` is one of the memory intrinsics the transfer models
/// directly (`llvm.memcpy.*` / `llvm.memset.*`).
#[must_use]
pub fn is_memcpy_intrinsic(name: &str) -> bool {
    name.starts_with("llvm.memcpy.")
}

/// See [`is_memcpy_intrinsic`].
#[must_use]
pub fn is_memset_intrinsic(name: &str) -> bool {
    name.starts_with("llvm.memset.")
}

/// Whether `name` falls under the reserved intrinsic prefix at all.
#[must_use]
pub fn is_llvm_intrinsic(name: &str) -> bool {
    name.starts_with(INTRINSIC_PREFIX)
}

/// Incrementally assembles a [`Module`].
///
/// Exists mainly so tests can build small IR fixtures by hand without
/// going through the `inkwell` frontend; the frontend itself also uses
/// it, one `inkwell` function/instruction at a time.
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    functions: Vec<Function>,
    values: Vec<ValueKind>,
    names: BTreeMap<String, FunctionId>,
    next_block: u32,
}

impl ModuleBuilder {
    /// Starts an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next `ValueId` and records what kind of entity it
    /// is. Functions, parameters, and instruction results are all
    /// minted through this single counter.
    pub fn alloc_value(&mut self, kind: ValueKind) -> ValueId {
        let id = ValueId::new(u32::try_from(self.values.len()).expect("value arena overflow"));
        self.values.push(kind);
        id
    }

    /// Reserves the next `FunctionId` without yet knowing its body —
    /// needed so a function's own value and any forward call references
    /// to it can be created before the function is finished.
    pub fn alloc_function_id(&mut self) -> FunctionId {
        let id =
            FunctionId::new(u32::try_from(self.functions.len()).expect("function arena overflow"));
        self.functions
            .push(Function::declaration(id, String::new(), Vec::new()));
        id
    }

    /// Registers a finished function definition or declaration,
    /// replacing the placeholder created by [`Self::alloc_function_id`].
    pub fn finish_function(&mut self, function: Function) {
        let index = usize::try_from(u32::from(function.id())).expect("id fits in usize");
        self.names.insert(function.name().to_owned(), function.id());
        self.functions[index] = function;
    }

    /// Reserves the next `BasicBlockId`. Block ids are unique across
    /// the whole module, not just within one function, matching how
    /// `ValueId`s are allocated.
    pub fn alloc_block_id(&mut self) -> BasicBlockId {
        let id = BasicBlockId::new(self.next_block);
        self.next_block += 1;
        id
    }

    /// Looks up a function id previously allocated by name.
    #[must_use]
    pub fn function_id_by_name(&self, name: &str) -> Option<FunctionId> {
        self.names.get(name).copied()
    }

    /// Finalizes the module.
    #[must_use]
    pub fn build(self) -> Module {
        Module {
            functions: self.functions,
            values: self.values,
        }
    }
}
