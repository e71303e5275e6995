//! The control-flow graph induced by a function's block terminators.
//!
//! Predecessor/successor iteration is the only control-flow surface the
//! points-to transfer needs to read, backed here by `petgraph` rather
//! than a hand-rolled adjacency structure.

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use super::BasicBlockId;

/// The control-flow graph of a single function.
///
/// Built once when the function is lowered into the [`super::Module`],
/// from each block's terminator-induced successor list.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    graph: DiGraphMap<BasicBlockId, ()>,
    entry: BasicBlockId,
}

impl ControlFlowGraph {
    /// Builds the control-flow graph of a function from `(block,
    /// successors)` edges, rooted at `entry`.
    pub fn new(
        entry: BasicBlockId,
        edges: impl IntoIterator<Item = (BasicBlockId, BasicBlockId)>,
        blocks: impl IntoIterator<Item = BasicBlockId>,
    ) -> Self {
        let mut graph = DiGraphMap::new();
        for block in blocks {
            graph.add_node(block);
        }
        for (from, to) in edges {
            graph.add_edge(from, to, ());
        }
        Self { graph, entry }
    }

    /// The function's entry block.
    #[must_use]
    pub const fn entry(&self) -> BasicBlockId {
        self.entry
    }

    /// Every block in the function, in unspecified order.
    pub fn blocks(&self) -> impl Iterator<Item = BasicBlockId> + '_ {
        self.graph.nodes()
    }

    /// The predecessors of `block` (blocks with an edge into `block`).
    pub fn predecessors(&self, block: BasicBlockId) -> impl Iterator<Item = BasicBlockId> + '_ {
        self.graph.neighbors_directed(block, Direction::Incoming)
    }

    /// The successors of `block` (blocks reachable by `block`'s
    /// terminator).
    pub fn successors(&self, block: BasicBlockId) -> impl Iterator<Item = BasicBlockId> + '_ {
        self.graph.neighbors_directed(block, Direction::Outgoing)
    }

    /// Blocks with no successors — the function's exit points.
    pub fn exits(&self) -> impl Iterator<Item = BasicBlockId> + '_ {
        self.graph
            .nodes()
            .filter(move |&b| self.graph.neighbors_directed(b, Direction::Outgoing).count() == 0)
    }
}
