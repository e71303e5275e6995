//! Orchestrates the points-to analysis over a whole module.

use std::collections::BTreeMap;

use tracing::{debug, info_span, warn};

use crate::analysis::fixed_point::solve;
use crate::analysis::points_to::{LatticeValue, PointsToProblem};
use crate::analysis::report::CallSiteReport;
use crate::ir::{is_llvm_intrinsic, BasicBlockId, Module};

/// Runs the points-to analysis over every function defined in `module`
/// and returns the combined call-target report.
///
/// Each function with a body is analyzed top-level, once, with a fresh
/// [`PointsToProblem`] and an empty incoming fact — functions are not
/// (yet) analyzed in call-graph order, so a call from function `a` to
/// function `b` re-enters `b`'s own fixed point context-sensitively at
/// the call site in addition to `b`'s own top-level pass here. Both
/// passes contribute to the same report; duplicate call-target entries
/// collapse because [`CallSiteReport`] is set-valued per line.
#[must_use]
pub fn analyze(module: &Module) -> CallSiteReport {
    let mut report = CallSiteReport::new();

    for function in module.functions() {
        if function.is_declaration() || is_llvm_intrinsic(function.name()) {
            continue;
        }

        let span = info_span!("analyze_function", function = function.name());
        let _entered = span.enter();

        if let Some(cfg) = function.control_flow_graph() {
            debug!(
                blocks = cfg.blocks().count(),
                exits = cfg.exits().count(),
                "control-flow graph built"
            );
            if cfg.predecessors(cfg.entry()).next().is_some() {
                warn!("entry block has incoming edges, function loops back to its own entry");
            }
        }

        let mut problem = PointsToProblem::top_level(module, function.id(), &mut report);
        let _: BTreeMap<BasicBlockId, LatticeValue> =
            solve(&mut problem).unwrap_or_else(|never| match never {});
    }

    report
}
