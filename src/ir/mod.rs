//! The in-memory SSA representation the analysis runs over.
//!
//! This is a deliberately small IR: just enough opcode variety for a
//! points-to analysis to say something useful about indirect calls.
//! Everything not modeled by [`Instruction`] collapses to
//! [`Instruction::Other`], an identity transfer.

mod basic_block;
mod control_flow;
mod debug_location;
mod function;
mod ids;
mod instruction;
mod module;
mod value;

pub use basic_block::BasicBlock;
pub use control_flow::ControlFlowGraph;
pub use debug_location::DebugLocation;
pub use function::Function;
pub use ids::{BasicBlockId, FunctionId};
pub use instruction::Instruction;
pub use module::{
    is_debug_intrinsic, is_llvm_intrinsic, is_memcpy_intrinsic, is_memset_intrinsic, Module,
    ModuleBuilder, INTRINSIC_PREFIX,
};
pub use value::{Cell, ValueId, ValueKind};
