//! The per-instruction points-to transfer function.

use std::collections::BTreeMap;
use std::convert::Infallible;

use tracing::{debug, trace, warn};

use crate::analysis::fixed_point::{solve, DataflowProblem};
use crate::analysis::report::CallSiteReport;
use crate::ir::{
    is_llvm_intrinsic, BasicBlockId, Cell, DebugLocation, FunctionId, Instruction, Module, ValueId,
    ValueKind,
};

use super::lattice::{LatticeValue, PointsToMap, PointsToSet, ReturnSummary};

/// The points-to dataflow problem for a single function invocation.
///
/// One `PointsToProblem` is solved per call — the top-level entry from
/// [`crate::driver`], and one more for every indirect or direct call to
/// a function with a body encountered along the way, context-sensitive
/// by construction since each invocation gets its own freshly seeded
/// parameter bindings.
pub struct PointsToProblem<'m, 'r> {
    module: &'m Module,
    function: FunctionId,
    entry_fact: LatticeValue,
    call_stack: Vec<FunctionId>,
    report: &'r mut CallSiteReport,
    return_summary: ReturnSummary,
}

impl<'m, 'r> PointsToProblem<'m, 'r> {
    /// Starts a fresh, top-level analysis of `function` (not reached
    /// through any call site already on the stack).
    pub fn top_level(module: &'m Module, function: FunctionId, report: &'r mut CallSiteReport) -> Self {
        Self {
            module,
            function,
            entry_fact: LatticeValue::empty(),
            call_stack: vec![function],
            report,
            return_summary: ReturnSummary::empty(),
        }
    }

    /// The accumulated summary of every `return` reached while solving
    /// this invocation's fixed point. Only meaningful once
    /// [`solve`](crate::analysis::fixed_point::solve) has converged.
    #[must_use]
    pub fn into_return_summary(self) -> ReturnSummary {
        self.return_summary
    }

    fn function_name(&self, function: FunctionId) -> &str {
        self.module.function(function).name()
    }

    /// The points-to set of `value`: the fact's own recorded set, or —
    /// if `value` denotes a function symbol or a global — the singleton
    /// set containing that value's own cell. A function value always
    /// points to itself, and a global is its own cell the way an
    /// `Alloca` result is, except no instruction ever initializes one
    /// (there is no `Instruction::Global`); neither is ever stored as
    /// mutable lattice state, only resolved here, so it can never be
    /// forgotten or require special-casing in `join`.
    fn points_to(&self, fact: &LatticeValue, value: ValueId) -> PointsToSet {
        match self.module.value_kind(value) {
            ValueKind::FunctionSymbol(_) | ValueKind::Global => {
                PointsToSet::singleton(Cell::of(value))
            }
            _ => fact.points_to(value),
        }
    }

    /// Resolves a call's possible targets: the single target of a
    /// direct call, or every function-symbol cell in the callee
    /// operand's points-to set for an indirect call.
    fn resolve_callees(&self, callee: ValueId, fact: &LatticeValue) -> Vec<FunctionId> {
        if let Some(direct) = self.module.as_function_symbol(callee) {
            return vec![direct];
        }
        self.points_to(fact, callee)
            .iter()
            .filter_map(|cell| self.module.as_function_symbol(cell.value()))
            .collect()
    }

    fn apply_call(
        &mut self,
        result: Option<ValueId>,
        callee: ValueId,
        args: &[ValueId],
        debug_location: Option<DebugLocation>,
        fact: &mut LatticeValue,
    ) {
        let line = DebugLocation::line_or_synthetic(debug_location);
        // Accumulated across every target with a body; replaces (not joins
        // with) the caller's pre-call alias map once the loop is done, per
        // the context-propagation semantics of the call transfer: a
        // callee's writes through shared pointers must be visible at the
        // call site exactly as the callee left them, not blended with
        // whatever the caller's cells aliased before the call.
        let mut accumulated_alias: Option<PointsToMap<Cell>> = None;

        for target in self.resolve_callees(callee, fact) {
            let name = self.function_name(target);
            if is_llvm_intrinsic(name) {
                continue;
            }
            self.report.record(line, name.to_owned());

            if self.module.function(target).is_declaration() {
                trace!(callee = name, "call target has no body, treated as opaque");
                continue;
            }
            if self.call_stack.contains(&target) {
                debug!(
                    callee = name,
                    "recursive call target already on the analysis stack, not re-entered"
                );
                continue;
            }

            let params = self
                .module
                .function(target)
                .params()
                .iter()
                .zip(
                    args.iter()
                        .map(|&arg| self.points_to(fact, arg))
                        .chain(std::iter::repeat(PointsToSet::empty())),
                )
                .map(|(&param, targets)| (param, targets));
            let entry_fact = LatticeValue::seed_for_call(params, fact.alias_map().clone());

            let mut callee_stack = self.call_stack.clone();
            callee_stack.push(target);
            let mut child = PointsToProblem {
                module: self.module,
                function: target,
                entry_fact,
                call_stack: callee_stack,
                report: &mut *self.report,
                return_summary: ReturnSummary::empty(),
            };
            let _: BTreeMap<BasicBlockId, LatticeValue> =
                solve(&mut child).unwrap_or_else(|never: Infallible| match never {});
            let summary = child.into_return_summary();

            if let Some(result) = result {
                fact.union_points_to(result, summary.returned_cells().clone());
            }
            accumulated_alias = Some(match accumulated_alias {
                Some(acc) => acc.join(summary.alias_map().clone()),
                None => summary.alias_map().clone(),
            });
        }

        if let Some(accumulated_alias) = accumulated_alias {
            fact.replace_alias_map(accumulated_alias);
        }
    }

    fn apply_instruction(&mut self, instruction: &Instruction, fact: &mut LatticeValue) {
        match instruction {
            Instruction::Alloca { result } => {
                fact.set_points_to(*result, PointsToSet::singleton(Cell::of(*result)));
            }
            Instruction::BitCast { result, operand } | Instruction::GetElementPtr { result, base: operand, .. } => {
                let targets = self.points_to(fact, *operand);
                fact.set_points_to(*result, targets);
            }
            Instruction::Load { result, pointer } => {
                let mut loaded = PointsToSet::empty();
                for cell in self.points_to(fact, *pointer).iter() {
                    loaded = loaded.join(fact.alias_of(cell));
                }
                fact.set_points_to(*result, loaded);
            }
            Instruction::Store { value, pointer } => {
                let pointer_targets = self.points_to(fact, *pointer);
                let value_targets = self.points_to(fact, *value);
                match pointer_targets.as_singleton() {
                    Some(only) if !self.module.is_function_cell(only) => {
                        fact.set_alias(only, value_targets);
                    }
                    Some(only) => fact.union_alias(only, value_targets),
                    None => {
                        for cell in pointer_targets.iter() {
                            fact.union_alias(cell, value_targets.clone());
                        }
                    }
                }
            }
            Instruction::Phi { result, incoming } => {
                let mut merged = PointsToSet::empty();
                for (_, value) in incoming {
                    merged = merged.join(self.points_to(fact, *value));
                }
                fact.set_points_to(*result, merged);
            }
            Instruction::Call {
                result,
                callee,
                args,
                debug_location,
            } => {
                self.apply_call(*result, *callee, args, *debug_location, fact);
            }
            Instruction::MemCpy { dst, src } => {
                let mut copied = PointsToSet::empty();
                for cell in self.points_to(fact, *src).iter() {
                    copied = copied.join(fact.alias_of(cell));
                }
                for cell in self.points_to(fact, *dst).iter() {
                    fact.union_alias(cell, copied.clone());
                }
            }
            Instruction::MemSet { dst } => {
                let dst_targets = self.points_to(fact, *dst);
                if let Some(only) = dst_targets.as_singleton() {
                    if !self.module.is_function_cell(only) {
                        fact.set_alias(only, PointsToSet::empty());
                    }
                    // A weak-update destination (more than one possible
                    // target cell) is left untouched: the spec's singleton
                    // rule only clears aliasing when the destination is
                    // known to be exactly one non-function cell.
                }
            }
            Instruction::Return { value } => {
                if let Some(value) = value {
                    let targets = self.points_to(fact, *value);
                    self.return_summary.record_return(targets);
                }
                self.return_summary.record_alias(fact.alias_map());
            }
            Instruction::Other { opcode_name, .. } => {
                warn!(opcode = opcode_name.as_str(), "unsupported instruction, treated as identity");
            }
        }
    }
}

impl DataflowProblem for PointsToProblem<'_, '_> {
    type Location = BasicBlockId;
    type Fact = LatticeValue;
    type Err = Infallible;

    fn seeds(&self) -> impl IntoIterator<Item = (Self::Location, Self::Fact)> {
        let entry = self
            .module
            .function(self.function)
            .entry_block()
            .expect("a function with a body has an entry block");
        std::iter::once((entry, self.entry_fact.clone()))
    }

    fn flow(
        &mut self,
        location: &Self::Location,
        fact: &Self::Fact,
    ) -> Result<impl IntoIterator<Item = (Self::Location, Self::Fact)>, Self::Err> {
        let mut working = fact.clone();
        let function = self.module.function(self.function);
        let block = function
            .block(*location)
            .expect("location is a block of the function under analysis");
        for instruction in block.instructions() {
            self.apply_instruction(instruction, &mut working);
        }
        let successors = block.successors().to_vec();
        Ok(successors.into_iter().map(move |s| (s, working.clone())))
    }
}
