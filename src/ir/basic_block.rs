//! Basic blocks: a straight-line run of instructions ending in a
//! terminator.

use super::{BasicBlockId, Instruction};

/// A single basic block within a [`Function`](super::Function).
///
/// Successor edges are recorded here, on the block, because they come
/// from the block's own terminator; predecessor edges are derived once
/// for the whole function by [`super::control_flow::ControlFlowGraph`].
#[derive(Debug, Clone)]
pub struct BasicBlock {
    id: BasicBlockId,
    instructions: Vec<Instruction>,
    successors: Vec<BasicBlockId>,
}

impl BasicBlock {
    /// Builds a basic block from its instructions (in program order) and
    /// the blocks its terminator may transfer control to.
    #[must_use]
    pub fn new(
        id: BasicBlockId,
        instructions: Vec<Instruction>,
        successors: Vec<BasicBlockId>,
    ) -> Self {
        Self {
            id,
            instructions,
            successors,
        }
    }

    /// This block's identity within its owning function.
    #[must_use]
    pub const fn id(&self) -> BasicBlockId {
        self.id
    }

    /// The block's instructions, in program order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The blocks this block's terminator may transfer control to.
    #[must_use]
    pub fn successors(&self) -> &[BasicBlockId] {
        &self.successors
    }
}
