//! Reproduces the end-to-end scenarios against hand-built `ir::Module`
//! fixtures, bypassing the `inkwell` frontend entirely — the analysis
//! core only ever sees `ir::Module`, so these fixtures exercise exactly
//! the same surface a real LLVM module would after lowering.

use icall_resolve::driver;
use icall_resolve::ir::{
    BasicBlock, DebugLocation, Function, Instruction, ModuleBuilder, ValueKind,
};

/// A two-parameter external function with no body (stands in for `plus`,
/// `minus`, and similar leaf callees whose internals the scenarios never
/// need to inspect).
fn declare_binary_fn(builder: &mut ModuleBuilder, name: &str) -> icall_resolve::ir::FunctionId {
    let id = builder.alloc_function_id();
    let p0 = builder.alloc_value(ValueKind::Parameter { function: id, index: 0 });
    let p1 = builder.alloc_value(ValueKind::Parameter { function: id, index: 1 });
    builder.finish_function(Function::declaration(id, name, vec![p0, p1]));
    id
}

#[test]
fn scenario_1_direct_call_only() {
    let mut builder = ModuleBuilder::new();
    let plus = declare_binary_fn(&mut builder, "plus");
    let plus_value = builder.alloc_value(ValueKind::FunctionSymbol(plus));

    let foo = builder.alloc_function_id();
    let c1 = builder.alloc_value(ValueKind::Constant);
    let c2 = builder.alloc_value(ValueKind::Constant);
    let block = builder.alloc_block_id();
    let call_result = builder.alloc_value(ValueKind::Instruction { function: foo, block });
    let body = BasicBlock::new(
        block,
        vec![
            Instruction::Call {
                result: Some(call_result),
                callee: plus_value,
                args: vec![c1, c2],
                debug_location: Some(DebugLocation::new(10)),
            },
            Instruction::Return { value: None },
        ],
        vec![],
    );
    builder.finish_function(Function::new(foo, "foo", vec![], vec![body]));

    let report = driver::analyze(&builder.build());
    assert_eq!(report.to_string(), "10 : plus\n");
}

#[test]
fn scenario_2_branching_function_pointer() {
    let mut builder = ModuleBuilder::new();
    let plus = declare_binary_fn(&mut builder, "plus");
    let minus = declare_binary_fn(&mut builder, "minus");
    let plus_value = builder.alloc_value(ValueKind::FunctionSymbol(plus));
    let minus_value = builder.alloc_value(ValueKind::FunctionSymbol(minus));

    let foo = builder.alloc_function_id();
    let entry = builder.alloc_block_id();
    let branch_a = builder.alloc_block_id();
    let branch_b = builder.alloc_block_id();
    let join = builder.alloc_block_id();

    let fp = builder.alloc_value(ValueKind::Instruction { function: foo, block: join });
    let c1 = builder.alloc_value(ValueKind::Constant);
    let c2 = builder.alloc_value(ValueKind::Constant);

    let entry_block = BasicBlock::new(entry, vec![], vec![branch_a, branch_b]);
    let block_a = BasicBlock::new(branch_a, vec![], vec![join]);
    let block_b = BasicBlock::new(branch_b, vec![], vec![join]);
    let join_block = BasicBlock::new(
        join,
        vec![
            Instruction::Phi {
                result: fp,
                incoming: vec![(branch_a, plus_value), (branch_b, minus_value)],
            },
            Instruction::Call {
                result: None,
                callee: fp,
                args: vec![c1, c2],
                debug_location: Some(DebugLocation::new(6)),
            },
            Instruction::Return { value: None },
        ],
        vec![],
    );

    builder.finish_function(Function::new(
        foo,
        "foo",
        vec![],
        vec![entry_block, block_a, block_b, join_block],
    ));

    let report = driver::analyze(&builder.build());
    assert_eq!(report.to_string(), "6 : minus, plus\n");
}

#[test]
fn scenario_3_pointer_passed_through_a_function() {
    let mut builder = ModuleBuilder::new();
    let plus = declare_binary_fn(&mut builder, "plus");
    let minus = declare_binary_fn(&mut builder, "minus");
    let plus_value = builder.alloc_value(ValueKind::FunctionSymbol(plus));
    let minus_value = builder.alloc_value(ValueKind::FunctionSymbol(minus));

    // clever(fp) { fp(); }  -- calls its sole parameter on line 12.
    let clever = builder.alloc_function_id();
    let clever_fp = builder.alloc_value(ValueKind::Parameter { function: clever, index: 0 });
    let clever_value = builder.alloc_value(ValueKind::FunctionSymbol(clever));
    let clever_block = builder.alloc_block_id();
    let clever_body = BasicBlock::new(
        clever_block,
        vec![
            Instruction::Call {
                result: None,
                callee: clever_fp,
                args: vec![],
                debug_location: Some(DebugLocation::new(12)),
            },
            Instruction::Return { value: None },
        ],
        vec![],
    );
    builder.finish_function(Function::new(clever, "clever", vec![clever_fp], vec![clever_body]));

    // main() { clever(plus); clever(minus); }  -- on lines 20 and 21.
    let main = builder.alloc_function_id();
    let main_block = builder.alloc_block_id();
    let main_body = BasicBlock::new(
        main_block,
        vec![
            Instruction::Call {
                result: None,
                callee: clever_value,
                args: vec![plus_value],
                debug_location: Some(DebugLocation::new(20)),
            },
            Instruction::Call {
                result: None,
                callee: clever_value,
                args: vec![minus_value],
                debug_location: Some(DebugLocation::new(21)),
            },
            Instruction::Return { value: None },
        ],
        vec![],
    );
    builder.finish_function(Function::new(main, "main", vec![], vec![main_body]));

    let report = driver::analyze(&builder.build());
    let rendered = report.to_string();
    assert_eq!(rendered, "12 : minus, plus\n20 : clever\n21 : clever\n");
}

#[test]
fn scenario_4_struct_of_function_pointers_with_aliasing() {
    let mut builder = ModuleBuilder::new();
    let plus = declare_binary_fn(&mut builder, "plus");
    let minus = declare_binary_fn(&mut builder, "minus");
    let plus_value = builder.alloc_value(ValueKind::FunctionSymbol(plus));
    let minus_value = builder.alloc_value(ValueKind::FunctionSymbol(minus));

    // alias(x, y) { x->fp = y->fp; }
    let alias_fn = builder.alloc_function_id();
    let x_param = builder.alloc_value(ValueKind::Parameter { function: alias_fn, index: 0 });
    let y_param = builder.alloc_value(ValueKind::Parameter { function: alias_fn, index: 1 });
    let alias_value = builder.alloc_value(ValueKind::FunctionSymbol(alias_fn));
    let alias_block = builder.alloc_block_id();
    let x_fp = builder.alloc_value(ValueKind::Instruction { function: alias_fn, block: alias_block });
    let y_fp = builder.alloc_value(ValueKind::Instruction { function: alias_fn, block: alias_block });
    let loaded = builder.alloc_value(ValueKind::Instruction { function: alias_fn, block: alias_block });
    let alias_body = BasicBlock::new(
        alias_block,
        vec![
            Instruction::GetElementPtr { result: x_fp, base: x_param, indices: vec![] },
            Instruction::GetElementPtr { result: y_fp, base: y_param, indices: vec![] },
            Instruction::Load { result: loaded, pointer: y_fp },
            Instruction::Store { value: loaded, pointer: x_fp },
            Instruction::Return { value: None },
        ],
        vec![],
    );
    builder.finish_function(Function::new(alias_fn, "alias", vec![x_param, y_param], vec![alias_body]));

    // main() { alloca a, a.fp = plus; alloca b, b.fp = minus; alias(&a, &b); a.fp(); }
    let main = builder.alloc_function_id();
    let main_block = builder.alloc_block_id();
    let a = builder.alloc_value(ValueKind::Instruction { function: main, block: main_block });
    let b = builder.alloc_value(ValueKind::Instruction { function: main, block: main_block });
    let a_fp = builder.alloc_value(ValueKind::Instruction { function: main, block: main_block });
    let b_fp = builder.alloc_value(ValueKind::Instruction { function: main, block: main_block });
    let call_through_a_fp = builder.alloc_value(ValueKind::Instruction { function: main, block: main_block });
    let main_body = BasicBlock::new(
        main_block,
        vec![
            Instruction::Alloca { result: a },
            Instruction::Alloca { result: b },
            Instruction::GetElementPtr { result: a_fp, base: a, indices: vec![] },
            Instruction::Store { value: plus_value, pointer: a_fp },
            Instruction::GetElementPtr { result: b_fp, base: b, indices: vec![] },
            Instruction::Store { value: minus_value, pointer: b_fp },
            Instruction::Call {
                result: None,
                callee: alias_value,
                args: vec![a, b],
                debug_location: Some(DebugLocation::new(25)),
            },
            Instruction::Load { result: call_through_a_fp, pointer: a_fp },
            Instruction::Call {
                result: None,
                callee: call_through_a_fp,
                args: vec![],
                debug_location: Some(DebugLocation::new(30)),
            },
            Instruction::Return { value: None },
        ],
        vec![],
    );
    builder.finish_function(Function::new(main, "main", vec![], vec![main_body]));

    let report = driver::analyze(&builder.build());
    let line_30 = report.lines().find(|(line, _)| *line == 30).map(|(_, names)| {
        names.iter().cloned().collect::<Vec<_>>()
    });
    assert_eq!(line_30, Some(vec!["minus".to_owned()]));
}

#[test]
fn scenario_5_return_of_a_function_pointer() {
    let mut builder = ModuleBuilder::new();
    let plus = declare_binary_fn(&mut builder, "plus");
    let minus = declare_binary_fn(&mut builder, "minus");
    let plus_value = builder.alloc_value(ValueKind::FunctionSymbol(plus));
    let minus_value = builder.alloc_value(ValueKind::FunctionSymbol(minus));

    // fptr pick(int c) { return c ? plus : minus; }
    let pick = builder.alloc_function_id();
    let c_param = builder.alloc_value(ValueKind::Parameter { function: pick, index: 0 });
    let pick_value = builder.alloc_value(ValueKind::FunctionSymbol(pick));
    let pick_entry = builder.alloc_block_id();
    let pick_a = builder.alloc_block_id();
    let pick_b = builder.alloc_block_id();
    let pick_join = builder.alloc_block_id();
    let picked = builder.alloc_value(ValueKind::Instruction { function: pick, block: pick_join });

    let pick_entry_block = BasicBlock::new(pick_entry, vec![], vec![pick_a, pick_b]);
    let pick_a_block = BasicBlock::new(pick_a, vec![], vec![pick_join]);
    let pick_b_block = BasicBlock::new(pick_b, vec![], vec![pick_join]);
    let pick_join_block = BasicBlock::new(
        pick_join,
        vec![
            Instruction::Phi {
                result: picked,
                incoming: vec![(pick_a, plus_value), (pick_b, minus_value)],
            },
            Instruction::Return { value: Some(picked) },
        ],
        vec![],
    );
    builder.finish_function(Function::new(
        pick,
        "pick",
        vec![c_param],
        vec![pick_entry_block, pick_a_block, pick_b_block, pick_join_block],
    ));

    // main(x) { pick(x)(1, 2); }  -- both the call to `pick` and the
    // indirect call through its result land on line 41.
    let main = builder.alloc_function_id();
    let x_param = builder.alloc_value(ValueKind::Parameter { function: main, index: 0 });
    let main_block = builder.alloc_block_id();
    let fptr = builder.alloc_value(ValueKind::Instruction { function: main, block: main_block });
    let c1 = builder.alloc_value(ValueKind::Constant);
    let c2 = builder.alloc_value(ValueKind::Constant);
    let main_body = BasicBlock::new(
        main_block,
        vec![
            Instruction::Call {
                result: Some(fptr),
                callee: pick_value,
                args: vec![x_param],
                debug_location: Some(DebugLocation::new(41)),
            },
            Instruction::Call {
                result: None,
                callee: fptr,
                args: vec![c1, c2],
                debug_location: Some(DebugLocation::new(41)),
            },
            Instruction::Return { value: None },
        ],
        vec![],
    );
    builder.finish_function(Function::new(main, "main", vec![x_param], vec![main_body]));

    let report = driver::analyze(&builder.build());
    assert_eq!(report.to_string(), "41 : minus, pick, plus\n");
}

#[test]
fn scenario_6_recursion_through_a_pointer_terminates() {
    let mut builder = ModuleBuilder::new();

    // g() { static fptr self = g; self(); }  -- a cell that stores g's
    // own symbol, then calls through it. Must terminate and must report
    // exactly `{g}`, never recursing into itself a second time.
    let g = builder.alloc_function_id();
    let g_value = builder.alloc_value(ValueKind::FunctionSymbol(g));
    let block = builder.alloc_block_id();
    let cell = builder.alloc_value(ValueKind::Instruction { function: g, block });
    let loaded = builder.alloc_value(ValueKind::Instruction { function: g, block });
    let body = BasicBlock::new(
        block,
        vec![
            Instruction::Alloca { result: cell },
            Instruction::Store { value: g_value, pointer: cell },
            Instruction::Load { result: loaded, pointer: cell },
            Instruction::Call {
                result: None,
                callee: loaded,
                args: vec![],
                debug_location: Some(DebugLocation::new(50)),
            },
            Instruction::Return { value: None },
        ],
        vec![],
    );
    builder.finish_function(Function::new(g, "g", vec![], vec![body]));

    let report = driver::analyze(&builder.build());
    assert_eq!(report.to_string(), "50 : g\n");
}

#[test]
fn analysis_is_deterministic_across_reordered_independent_functions() {
    let build = |swap_order: bool| {
        let mut builder = ModuleBuilder::new();
        let make_foo_calling_plus = |builder: &mut ModuleBuilder| {
            let plus = declare_binary_fn(builder, "plus");
            let plus_value = builder.alloc_value(ValueKind::FunctionSymbol(plus));
            let foo = builder.alloc_function_id();
            let c1 = builder.alloc_value(ValueKind::Constant);
            let c2 = builder.alloc_value(ValueKind::Constant);
            let block = builder.alloc_block_id();
            let result = builder.alloc_value(ValueKind::Instruction { function: foo, block });
            let body = BasicBlock::new(
                block,
                vec![
                    Instruction::Call {
                        result: Some(result),
                        callee: plus_value,
                        args: vec![c1, c2],
                        debug_location: Some(DebugLocation::new(10)),
                    },
                    Instruction::Return { value: None },
                ],
                vec![],
            );
            builder.finish_function(Function::new(foo, "foo", vec![], vec![body]));
        };
        let make_bar_calling_minus = |builder: &mut ModuleBuilder| {
            let minus = declare_binary_fn(builder, "minus");
            let minus_value = builder.alloc_value(ValueKind::FunctionSymbol(minus));
            let bar = builder.alloc_function_id();
            let c1 = builder.alloc_value(ValueKind::Constant);
            let c2 = builder.alloc_value(ValueKind::Constant);
            let block = builder.alloc_block_id();
            let result = builder.alloc_value(ValueKind::Instruction { function: bar, block });
            let body = BasicBlock::new(
                block,
                vec![
                    Instruction::Call {
                        result: Some(result),
                        callee: minus_value,
                        args: vec![c1, c2],
                        debug_location: Some(DebugLocation::new(14)),
                    },
                    Instruction::Return { value: None },
                ],
                vec![],
            );
            builder.finish_function(Function::new(bar, "bar", vec![], vec![body]));
        };

        if swap_order {
            make_bar_calling_minus(&mut builder);
            make_foo_calling_plus(&mut builder);
        } else {
            make_foo_calling_plus(&mut builder);
            make_bar_calling_minus(&mut builder);
        }
        builder.build()
    };

    let first = driver::analyze(&build(false)).to_string();
    let second = driver::analyze(&build(true)).to_string();
    assert_eq!(first, second);
    assert_eq!(first, "10 : plus\n14 : minus\n");
}
