//! SSA instruction kinds distinguished by the points-to transfer.
//!
//! Only the instruction kinds the analysis actually models carry their own
//! variant. Everything else — branches, comparisons, arithmetic, vector
//! ops, inline assembly, and so on — is lowered to [`Instruction::Other`]
//! by the frontend and is an identity transfer.

use super::{BasicBlockId, DebugLocation, ValueId};

/// A single SSA instruction, as seen by the points-to transfer.
///
/// Control-flow edges (predecessor/successor) are a property of the
/// owning [`BasicBlock`](super::BasicBlock), not of individual
/// instructions — branch/switch terminators contribute only to the CFG,
/// never to the pointer lattice, so they are not modeled as a variant
/// here.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Instruction {
    /// `result = alloca ...` — allocates a new cell, identified by its own
    /// result value.
    #[display("{result} = alloca")]
    Alloca { result: ValueId },

    /// `result = bitcast operand to ...` — a pointer-preserving cast.
    #[display("{result} = bitcast {operand}")]
    BitCast { result: ValueId, operand: ValueId },

    /// `result = getelementptr base, indices...` — field/element address
    /// computation. Indices are not distinguished (cells are
    /// field-collapsed).
    #[display("{result} = getelementptr {base}")]
    GetElementPtr {
        result: ValueId,
        base: ValueId,
        /// Kept for fidelity to the source IR; never consulted by the
        /// transfer.
        indices: Vec<ValueId>,
    },

    /// `result = load pointer`
    #[display("{result} = load {pointer}")]
    Load { result: ValueId, pointer: ValueId },

    /// `store value, pointer`
    #[display("store {value}, {pointer}")]
    Store { value: ValueId, pointer: ValueId },

    /// `result = phi [block1: v1], [block2: v2], ...`
    #[display("{result} = phi(...)")]
    Phi {
        result: ValueId,
        incoming: Vec<(BasicBlockId, ValueId)>,
    },

    /// `result? = call callee(args...)`
    #[display("{}call {callee}(...)", result.map(|r| format!("{r} = ")).unwrap_or_default())]
    Call {
        result: Option<ValueId>,
        callee: ValueId,
        args: Vec<ValueId>,
        debug_location: Option<DebugLocation>,
    },

    /// `llvm.memcpy.*(dst, src, ...)`
    #[display("memcpy {dst}, {src}")]
    MemCpy { dst: ValueId, src: ValueId },

    /// `llvm.memset.*(dst, ...)`
    #[display("memset {dst}")]
    MemSet { dst: ValueId },

    /// `return value?`
    #[display("return{}", value.map(|v| format!(" {v}")).unwrap_or_default())]
    Return { value: Option<ValueId> },

    /// Any instruction kind the transfer does not model. Identity on the
    /// lattice; logged once when diagnostics are enabled.
    #[display("<unsupported: {opcode_name}>")]
    Other {
        result: Option<ValueId>,
        opcode_name: String,
    },
}

impl Instruction {
    /// The value defined by this instruction, if any.
    #[must_use]
    pub fn result(&self) -> Option<ValueId> {
        match self {
            Self::Alloca { result }
            | Self::BitCast { result, .. }
            | Self::GetElementPtr { result, .. }
            | Self::Load { result, .. }
            | Self::Phi { result, .. } => Some(*result),
            Self::Call { result, .. } => *result,
            Self::Other { result, .. } => *result,
            Self::Store { .. } | Self::MemCpy { .. } | Self::MemSet { .. } | Self::Return { .. } => {
                None
            }
        }
    }
}
