//! Functions: a name, a parameter list, and (if defined) a body.

use super::control_flow::ControlFlowGraph;
use super::{BasicBlock, BasicBlockId, FunctionId, ValueId};

/// A function as seen by the analysis.
///
/// A declaration (no body, e.g. an external symbol such as `libc`'s
/// `malloc`) carries an empty block list; the driver and the points-to
/// transfer both treat it as opaque — its address may be taken and
/// passed around, but it is never entered.
#[derive(Debug, Clone)]
pub struct Function {
    id: FunctionId,
    name: String,
    params: Vec<ValueId>,
    blocks: Vec<BasicBlock>,
    cfg: Option<ControlFlowGraph>,
}

impl Function {
    /// Builds a function definition with a body.
    #[must_use]
    pub fn new(
        id: FunctionId,
        name: impl Into<String>,
        params: Vec<ValueId>,
        blocks: Vec<BasicBlock>,
    ) -> Self {
        let entry = blocks
            .first()
            .map(BasicBlock::id)
            .expect("a function with a body has at least one block");
        let edges = blocks
            .iter()
            .flat_map(|b| b.successors().iter().map(move |&s| (b.id(), s)));
        let cfg = ControlFlowGraph::new(entry, edges, blocks.iter().map(BasicBlock::id));
        Self {
            id,
            name: name.into(),
            params,
            blocks,
            cfg: Some(cfg),
        }
    }

    /// Builds a function declaration: a name and signature with no body.
    #[must_use]
    pub fn declaration(id: FunctionId, name: impl Into<String>, params: Vec<ValueId>) -> Self {
        Self {
            id,
            name: name.into(),
            params,
            blocks: Vec::new(),
            cfg: None,
        }
    }

    /// This function's identity within its owning module.
    #[must_use]
    pub const fn id(&self) -> FunctionId {
        self.id
    }

    /// The function's source-level name, as it appears in call-target
    /// reports.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function's formal parameters, in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ValueId] {
        &self.params
    }

    /// Whether this function has no body (an external declaration).
    #[must_use]
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The function's basic blocks, in unspecified order. Empty for a
    /// declaration.
    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Looks up a block by id.
    #[must_use]
    pub fn block(&self, id: BasicBlockId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    /// The function's control-flow graph. `None` for a declaration.
    #[must_use]
    pub fn control_flow_graph(&self) -> Option<&ControlFlowGraph> {
        self.cfg.as_ref()
    }

    /// The entry block, the seed location of the forward dataflow
    /// problem. `None` for a declaration.
    #[must_use]
    pub fn entry_block(&self) -> Option<BasicBlockId> {
        self.cfg.as_ref().map(ControlFlowGraph::entry)
    }
}
