//! The flow-sensitive, context-sensitive points-to analysis.
//!
//! [`lattice`] defines the dataflow fact; [`transfer`] defines how each
//! instruction transforms it, instantiating
//! [`crate::analysis::fixed_point::DataflowProblem`] once per function.

mod lattice;
mod transfer;

pub use lattice::{LatticeValue, PointsToMap, PointsToSet, ReturnSummary};
pub use transfer::PointsToProblem;
