//! End-to-end tests for control-flow lowering, driven through the public API.
//!
//! The parser lives upstream of this crate, so inputs are built directly as ASTs.

use silica::ast::{self, Access, Block, Expr, FuncTask, FuncTaskKind, Item, JoinKind, Module,
                  Netlist, Process, ProcessKind, Stmt, StmtKind, StmtWhile, UnrollHint, VarRef, Visit, Visitable};
use silica::context::CompilerContext;
use silica::pos::{Sp, Span};
use silica::resolve::DefId;
use silica::value::{DataType, Lifetime};
use silica::{sp, sp_pat};

fn ident(name: &str) -> Sp<silica::Ident> {
    sp!(name.parse().expect("test ident"))
}

fn stmt(kind: StmtKind) -> Sp<Stmt> {
    sp!(Stmt { node_id: None, kind })
}

fn lit(value: i32) -> Sp<Expr> {
    sp!(Expr::LitInt { value })
}

fn read(def: DefId) -> Sp<Expr> {
    sp!(Expr::Var(sp!(VarRef { def, access: Access::Read })))
}

fn assign(def: DefId, rhs: Sp<Expr>) -> Sp<Stmt> {
    stmt(StmtKind::Assign { lhs: sp!(VarRef { def, access: Access::Write }), rhs })
}

fn begin(name: Option<&str>, stmts: Vec<Sp<Stmt>>) -> Sp<Stmt> {
    stmt(StmtKind::Begin { name: name.map(ident), block: Block(stmts) })
}

fn fork(name: Option<&str>, stmts: Vec<Sp<Stmt>>) -> Sp<Stmt> {
    stmt(StmtKind::Fork { name: name.map(ident), join: JoinKind::Join, block: Block(stmts) })
}

fn if_then(cond: Sp<Expr>, then_stmts: Vec<Sp<Stmt>>) -> Sp<Stmt> {
    stmt(StmtKind::If { cond, then_block: Block(then_stmts), else_block: None })
}

fn plain_while(cond: Sp<Expr>, body: Vec<Sp<Stmt>>) -> Sp<Stmt> {
    stmt(StmtKind::While(StmtWhile {
        preconds: Block::empty(),
        cond,
        body: Block(body),
        incs: Block::empty(),
        unroll: UnrollHint::Default,
        unused_warn_off: false,
    }))
}

fn function(name: &str, fvar: DefId, body: Vec<Sp<Stmt>>) -> Sp<Item> {
    sp!(Item::FuncTask(FuncTask {
        node_id: None,
        kind: FuncTaskKind::Function { fvar, is_constructor: false },
        name: ident(name),
        body: Block(body),
    }))
}

fn task(name: &str, body: Vec<Sp<Stmt>>) -> Sp<Item> {
    sp!(Item::FuncTask(FuncTask {
        node_id: None,
        kind: FuncTaskKind::Task,
        name: ident(name),
        body: Block(body),
    }))
}

fn initial_process(stmts: Vec<Sp<Stmt>>) -> Sp<Item> {
    sp!(Item::Process(Process { kind: ProcessKind::Initial, body: Block(stmts) }))
}

fn netlist_with_items(items: Vec<Sp<Item>>) -> Netlist {
    Netlist {
        modules: vec![sp!(Module {
            name: ident("top"),
            dead: false,
            has_param_list: false,
            has_gparam: false,
            items,
        })],
    }
}

/// Lower a single-module netlist through the public driver, expecting success.
fn lower(ctx: &mut CompilerContext, items: Vec<Sp<Item>>) -> Netlist {
    let mut netlist = netlist_with_items(items);
    silica::passes::resolution::fill_missing_node_ids(&mut netlist, &ctx.unused_node_ids).unwrap();
    silica::passes::lower_jumps(&mut netlist, ctx).unwrap();
    netlist
}

/// Lower a netlist whose input contains illegal control flow.  Returns the mutated
/// netlist together with the captured diagnostic text.
fn lower_expecting_errors(ctx: &mut CompilerContext, items: Vec<Sp<Item>>) -> (Netlist, String) {
    let mut netlist = netlist_with_items(items);
    silica::passes::resolution::fill_missing_node_ids(&mut netlist, &ctx.unused_node_ids).unwrap();
    assert!(silica::passes::link_jump::run(&mut netlist, ctx).is_err(), "expected lowering errors");
    // erroneous statements are deleted, so the output must still be well-formed
    silica::passes::integrity::run(&netlist, ctx).unwrap();
    let captured = ctx.get_captured_diagnostics().unwrap();
    (netlist, captured)
}

fn count_matching(netlist: &Netlist, predicate: fn(&StmtKind) -> bool) -> usize {
    struct CountVisitor {
        predicate: fn(&StmtKind) -> bool,
        count: usize,
    }
    impl Visit for CountVisitor {
        fn visit_stmt(&mut self, stmt: &Sp<Stmt>) {
            if (self.predicate)(&stmt.value.kind) {
                self.count += 1;
            }
            ast::walk_stmt(self, stmt);
        }
    }
    let mut visitor = CountVisitor { predicate, count: 0 };
    netlist.visit_with(&mut visitor);
    visitor.count
}

fn no_structured_control_left(netlist: &Netlist) -> bool {
    count_matching(netlist, |kind| matches!(kind,
        | StmtKind::Return { .. }
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Disable { .. }
        | StmtKind::Repeat { .. }
        | StmtKind::DoWhile { .. }
        | StmtKind::Pragma(ast::PragmaKind::UnrollFull)
        | StmtKind::Pragma(ast::PragmaKind::UnrollDisable)
    )) == 0
}

// =============================================================================
// diagnostics

#[test]
fn return_under_fork_is_an_error() {
    let mut ctx = CompilerContext::new_captured();
    let fvar = ctx.define_func_return(ident("f"), DataType::Signed32);

    let (netlist, captured) = lower_expecting_errors(&mut ctx, vec![function("f", fvar, vec![
        fork(None, vec![stmt(StmtKind::Return { value: Some(lit(1)) })]),
    ])]);

    assert!(captured.contains("Return isn't legal under fork (IEEE 1800-2023 9.2.3)"), "{}", captured);
    // the return is deleted rather than lowered
    assert!(no_structured_control_left(&netlist));
    assert_eq!(count_matching(&netlist, |kind| matches!(kind, StmtKind::JumpGo(_))), 0);
}

#[test]
fn return_under_fork_through_nested_begin() {
    let mut ctx = CompilerContext::new_captured();
    let fvar = ctx.define_func_return(ident("f"), DataType::Signed32);

    // the fork flag must stick across nested sequential blocks
    let (_, captured) = lower_expecting_errors(&mut ctx, vec![function("f", fvar, vec![
        fork(None, vec![begin(None, vec![stmt(StmtKind::Return { value: Some(lit(1)) })])]),
    ])]);

    assert!(captured.contains("Return isn't legal under fork"), "{}", captured);
}

#[test]
fn return_outside_task_or_function_is_an_error() {
    let mut ctx = CompilerContext::new_captured();
    let (netlist, captured) = lower_expecting_errors(&mut ctx, vec![initial_process(vec![
        stmt(StmtKind::Return { value: None }),
    ])]);

    assert!(captured.contains("Return isn't underneath a task or function"), "{}", captured);
    assert!(no_structured_control_left(&netlist));
}

#[test]
fn function_return_needs_a_value() {
    let mut ctx = CompilerContext::new_captured();
    let fvar = ctx.define_func_return(ident("f"), DataType::Signed32);

    let (_, captured) = lower_expecting_errors(&mut ctx, vec![function("f", fvar, vec![
        stmt(StmtKind::Return { value: None }),
    ])]);

    assert!(captured.contains("Return underneath a function should have return value"), "{}", captured);
}

#[test]
fn constructor_may_return_bare() {
    let mut ctx = CompilerContext::new_captured();
    let fvar = ctx.define_func_return(ident("new"), DataType::Signed32);

    let netlist = lower(&mut ctx, vec![sp!(Item::FuncTask(FuncTask {
        node_id: None,
        kind: FuncTaskKind::Function { fvar, is_constructor: true },
        name: ident("new"),
        body: Block(vec![stmt(StmtKind::Return { value: None })]),
    }))]);

    assert_eq!(count_matching(&netlist, |kind| matches!(kind, StmtKind::JumpGo(_))), 1);
    // no assignment is synthesized for a bare constructor return
    assert_eq!(count_matching(&netlist, |kind| matches!(kind, StmtKind::Assign { .. })), 0);
}

#[test]
fn task_return_must_not_have_a_value() {
    let mut ctx = CompilerContext::new_captured();
    let (_, captured) = lower_expecting_errors(&mut ctx, vec![task("t", vec![
        stmt(StmtKind::Return { value: Some(lit(1)) }),
    ])]);

    assert!(captured.contains("Return underneath a task shouldn't have return value"), "{}", captured);
}

#[test]
fn break_outside_loop_is_an_error() {
    let mut ctx = CompilerContext::new_captured();
    let (netlist, captured) = lower_expecting_errors(&mut ctx, vec![initial_process(vec![
        stmt(StmtKind::Break),
    ])]);

    assert!(captured.contains("break isn't underneath a loop"), "{}", captured);
    assert!(no_structured_control_left(&netlist));
}

#[test]
fn continue_outside_loop_is_an_error() {
    let mut ctx = CompilerContext::new_captured();
    let (_, captured) = lower_expecting_errors(&mut ctx, vec![initial_process(vec![
        stmt(StmtKind::Continue),
    ])]);

    assert!(captured.contains("continue isn't underneath a loop"), "{}", captured);
}

#[test]
fn diagnostics_point_at_the_offending_source() {
    let mut ctx = CompilerContext::new_captured();
    let source = "initial break;";
    let file = ctx.diagnostics.files().add("<input>", source);

    let break_span = Span::new(file, 8, 13);
    let mut netlist = netlist_with_items(vec![initial_process(vec![
        sp!(break_span => Stmt { node_id: None, kind: StmtKind::Break }),
    ])]);
    silica::passes::resolution::fill_missing_node_ids(&mut netlist, &ctx.unused_node_ids).unwrap();
    assert!(silica::passes::link_jump::run(&mut netlist, &mut ctx).is_err());

    // the rendered snippet names the file and shows the line the break came from
    let captured = ctx.get_captured_diagnostics().unwrap();
    assert!(captured.contains("break isn't underneath a loop"), "{}", captured);
    assert!(captured.contains("<input>"), "{}", captured);
    assert!(captured.contains("initial break;"), "{}", captured);
}

#[test]
fn all_errors_surface_in_one_run() {
    let mut ctx = CompilerContext::new_captured();
    let (_, captured) = lower_expecting_errors(&mut ctx, vec![initial_process(vec![
        stmt(StmtKind::Break),
        stmt(StmtKind::Continue),
        stmt(StmtKind::Return { value: None }),
    ])]);

    assert!(captured.contains("break isn't underneath a loop"), "{}", captured);
    assert!(captured.contains("continue isn't underneath a loop"), "{}", captured);
    assert!(captured.contains("Return isn't underneath a task or function"), "{}", captured);
}

// =============================================================================
// disable

#[test]
fn disable_named_block() {
    let mut ctx = CompilerContext::new_captured();
    let d = ctx.define_local(ident("d"), DataType::Signed32, Lifetime::Automatic);
    let s = ctx.define_local(ident("s"), DataType::Signed32, Lifetime::Automatic);

    let netlist = lower(&mut ctx, vec![initial_process(vec![
        begin(Some("B"), vec![
            if_then(read(d), vec![stmt(StmtKind::Disable { target: ident("B") })]),
            assign(s, lit(1)),
        ]),
    ])]);

    // begin : B { JumpBlock { if (d) goto L; s = 1; L: } }, name preserved
    let body = match &netlist.modules[0].value.items[0].value {
        Item::Process(process) => &process.body,
        _ => unreachable!(),
    };
    let (name, block) = match &body.0[0].value.kind {
        StmtKind::Begin { name, block } => (name, block),
        kind => panic!("expected begin, got {}", kind.descr()),
    };
    assert_eq!(name.as_ref().unwrap(), "B");
    let jump_block = match &block.0[0].value.kind {
        StmtKind::JumpBlock(jump_block) => jump_block,
        kind => panic!("expected jump block, got {}", kind.descr()),
    };
    assert!(matches!(jump_block.block.0.last().unwrap().value.kind,
        StmtKind::JumpLabel(label) if label == jump_block.label));
    assert!(no_structured_control_left(&netlist));
}

#[test]
fn disable_resolves_to_innermost_matching_block() {
    let mut ctx = CompilerContext::new_captured();

    let netlist = lower(&mut ctx, vec![initial_process(vec![
        begin(Some("B"), vec![
            begin(Some("B"), vec![stmt(StmtKind::Disable { target: ident("B") })]),
        ]),
    ])]);

    // only the inner begin gets wrapped
    assert_eq!(count_matching(&netlist, |kind| matches!(kind, StmtKind::JumpBlock(_))), 1);
    let outer = match &netlist.modules[0].value.items[0].value {
        Item::Process(process) => &process.body.0[0],
        _ => unreachable!(),
    };
    let outer_block = match &outer.value.kind {
        StmtKind::Begin { block, .. } => block,
        _ => unreachable!(),
    };
    assert!(matches!(outer_block.0[0].value.kind, StmtKind::Begin { .. }));
}

#[test]
fn disable_of_outer_block_from_nested_position() {
    let mut ctx = CompilerContext::new_captured();
    let s = ctx.define_local(ident("s"), DataType::Signed32, Lifetime::Automatic);

    let netlist = lower(&mut ctx, vec![initial_process(vec![
        begin(Some("outer"), vec![
            begin(Some("inner"), vec![stmt(StmtKind::Disable { target: ident("outer") })]),
            assign(s, lit(1)),
        ]),
    ])]);

    // the outer begin is the anchor; the goto sits inside the wrapped region
    let body = match &netlist.modules[0].value.items[0].value {
        Item::Process(process) => &process.body,
        _ => unreachable!(),
    };
    let outer_block = match &body.0[0].value.kind {
        StmtKind::Begin { block, .. } => block,
        _ => unreachable!(),
    };
    let jump_block = match &outer_block.0[0].value.kind {
        StmtKind::JumpBlock(jump_block) => jump_block,
        kind => panic!("expected jump block, got {}", kind.descr()),
    };
    assert!(matches!(jump_block.block.0[0].value.kind, StmtKind::Begin { .. }));
}

#[test]
fn disable_without_matching_begin_warns() {
    let mut ctx = CompilerContext::new_captured();
    let netlist = lower(&mut ctx, vec![initial_process(vec![
        stmt(StmtKind::Disable { target: ident("missing") }),
    ])]);

    let captured = ctx.get_captured_diagnostics().unwrap();
    assert!(captured.contains("disable isn't underneath a begin with name: 'missing'"), "{}", captured);
    assert!(captured.contains("E_UNSUPPORTED"), "{}", captured);
    // the disable is deleted either way
    assert!(no_structured_control_left(&netlist));
}

#[test]
fn disable_of_fork_by_name_warns() {
    let mut ctx = CompilerContext::new_captured();
    let netlist = lower(&mut ctx, vec![initial_process(vec![
        fork(Some("F"), vec![stmt(StmtKind::Disable { target: ident("F") })]),
    ])]);

    let captured = ctx.get_captured_diagnostics().unwrap();
    assert!(captured.contains("Unsupported: disabling fork by name"), "{}", captured);
    assert!(no_structured_control_left(&netlist));
}

#[test]
fn disable_of_block_containing_fork_warns() {
    let mut ctx = CompilerContext::new_captured();
    let netlist = lower(&mut ctx, vec![initial_process(vec![
        begin(Some("B"), vec![
            fork(None, vec![]),
            stmt(StmtKind::Disable { target: ident("B") }),
        ]),
    ])]);

    let captured = ctx.get_captured_diagnostics().unwrap();
    assert!(captured.contains("Unsupported: disabling block that contains a fork"), "{}", captured);
    assert!(no_structured_control_left(&netlist));
    assert_eq!(count_matching(&netlist, |kind| matches!(kind, StmtKind::JumpGo(_))), 0);
}

#[test]
fn fork_marks_all_enclosing_blocks() {
    let mut ctx = CompilerContext::new_captured();
    // the fork is buried two begins down; disabling the outermost must still be refused
    let netlist = lower(&mut ctx, vec![initial_process(vec![
        begin(Some("outer"), vec![
            begin(None, vec![
                begin(None, vec![fork(None, vec![])]),
            ]),
            stmt(StmtKind::Disable { target: ident("outer") }),
        ]),
    ])]);

    let captured = ctx.get_captured_diagnostics().unwrap();
    assert!(captured.contains("Unsupported: disabling block that contains a fork"), "{}", captured);
    assert!(no_structured_control_left(&netlist));
}

// =============================================================================
// module-level behavior

#[test]
fn dead_modules_are_skipped() {
    let mut ctx = CompilerContext::new_captured();
    let mut netlist = Netlist {
        modules: vec![sp!(Module {
            name: ident("unused"),
            dead: true,
            has_param_list: false,
            has_gparam: false,
            items: vec![initial_process(vec![stmt(StmtKind::Break)])],
        })],
    };
    silica::passes::resolution::fill_missing_node_ids(&mut netlist, &ctx.unused_node_ids).unwrap();
    silica::passes::link_jump::run(&mut netlist, &mut ctx).unwrap();

    // the body is untouched and no diagnostic was produced
    assert_eq!(count_matching(&netlist, |kind| matches!(kind, StmtKind::Break)), 1);
    assert_eq!(ctx.get_captured_diagnostics().unwrap(), "");
}

#[test]
fn parameterized_module_suppresses_empty_loop_warning() {
    let mut ctx = CompilerContext::new_captured();
    let mut netlist = Netlist {
        modules: vec![sp!(Module {
            name: ident("parameterized"),
            dead: false,
            has_param_list: true,
            has_gparam: false,
            items: vec![initial_process(vec![plain_while(lit(0), vec![])])],
        })],
    };
    silica::passes::resolution::fill_missing_node_ids(&mut netlist, &ctx.unused_node_ids).unwrap();
    silica::passes::lower_jumps(&mut netlist, &mut ctx).unwrap();

    let body = match &netlist.modules[0].value.items[0].value {
        Item::Process(process) => &process.body,
        _ => unreachable!(),
    };
    match &body.0[0].value.kind {
        StmtKind::While(lowered) => assert!(lowered.unused_warn_off),
        kind => panic!("expected while, got {}", kind.descr()),
    }
}

// =============================================================================
// the whole thing at once

#[test]
fn kitchen_sink_lowering_holds_all_invariants() {
    let mut ctx = CompilerContext::new_captured();
    let fvar = ctx.define_func_return(ident("f"), DataType::Signed32);
    let c = ctx.define_local(ident("c"), DataType::Signed32, Lifetime::Automatic);
    let d = ctx.define_local(ident("d"), DataType::Signed32, Lifetime::Automatic);
    let arr = ctx.define_local(ident("arr"), DataType::Logic { width: 4 }, Lifetime::Static);

    let netlist = lower(&mut ctx, vec![
        function("f", fvar, vec![
            plain_while(read(c), vec![
                stmt(StmtKind::Foreach {
                    array: sp!(VarRef { def: arr, access: Access::Read }),
                    body: Block(vec![
                        if_then(read(d), vec![stmt(StmtKind::Break)]),
                        if_then(read(c), vec![stmt(StmtKind::Continue)]),
                    ]),
                }),
                if_then(read(d), vec![stmt(StmtKind::Return { value: Some(lit(5)) })]),
            ]),
            stmt(StmtKind::Return { value: Some(lit(7)) }),
        ]),
        initial_process(vec![
            stmt(StmtKind::Pragma(ast::PragmaKind::UnrollFull)),
            stmt(StmtKind::Repeat {
                count: lit(3),
                body: Block(vec![
                    stmt(StmtKind::DoWhile {
                        cond: read(c),
                        body: Block(vec![
                            begin(Some("blk"), vec![if_then(read(d), vec![stmt(StmtKind::Break)])]),
                        ]),
                    }),
                ]),
            }),
            begin(Some("B"), vec![
                if_then(read(d), vec![stmt(StmtKind::Disable { target: ident("B") })]),
                assign(c, lit(0)),
            ]),
        ]),
    ]);

    // `lower` already ran the integrity check; re-verify the headline properties here
    assert!(no_structured_control_left(&netlist));

    // every jump block ends at its own label, and labels are unique
    struct LabelOwners(Vec<silica::resolve::LabelId>);
    impl Visit for LabelOwners {
        fn visit_stmt(&mut self, stmt: &Sp<Stmt>) {
            if let StmtKind::JumpBlock(jump_block) = &stmt.value.kind {
                self.0.push(jump_block.label);
            }
            ast::walk_stmt(self, stmt);
        }
    }
    let mut owners = LabelOwners(vec![]);
    netlist.visit_with(&mut owners);
    let labels = owners.0;
    let label_count = labels.len();
    let unique: std::collections::HashSet<_> = labels.into_iter().collect();
    assert_eq!(unique.len(), label_count);

    // do-while body duplication renamed both copies apart
    struct BeginNames(Vec<String>);
    impl Visit for BeginNames {
        fn visit_stmt(&mut self, stmt: &Sp<Stmt>) {
            if let StmtKind::Begin { name: Some(name), .. } = &stmt.value.kind {
                self.0.push(name.value.to_string());
            }
            ast::walk_stmt(self, stmt);
        }
    }
    let mut names = BeginNames(vec![]);
    netlist.visit_with(&mut names);
    assert!(names.0.contains(&"__Vdo_while1_blk".to_string()), "{:?}", names.0);
    assert!(names.0.contains(&"__Vdo_while2_blk".to_string()), "{:?}", names.0);

    // no diagnostics for a legal program
    assert_eq!(ctx.get_captured_diagnostics().unwrap(), "");
}

#[test]
fn lowering_twice_changes_nothing() {
    let mut ctx = CompilerContext::new_captured();
    let fvar = ctx.define_func_return(ident("f"), DataType::Signed32);
    let c = ctx.define_local(ident("c"), DataType::Signed32, Lifetime::Automatic);

    let netlist = lower(&mut ctx, vec![
        function("f", fvar, vec![
            plain_while(read(c), vec![stmt(StmtKind::Break)]),
            stmt(StmtKind::Return { value: Some(lit(7)) }),
        ]),
    ]);

    let mut again = netlist.clone();
    silica::passes::lower_jumps(&mut again, &mut ctx).unwrap();
    assert_eq!(again, netlist);
}

// =============================================================================

#[test]
fn sp_pat_matches_lowered_shapes() {
    // keep the pattern macro exercised from outside the crate, too
    let expr = lit(3);
    let sp_pat!(value) = &expr;
    assert_eq!(*value, Expr::LitInt { value: 3 });
}
