//! See [`run`].

use std::collections::HashMap;

use crate::ast::{self, Access, BinopKind, Expr, StmtKind, UnrollHint};
use crate::context::CompilerContext;
use crate::error::{ErrorReported, ErrorStore};
use crate::ident::Ident;
use crate::pos::{Sp, Span};
use crate::resolve::{DefId, LabelId, NodeId};
use crate::value::DataType;

/// Control-flow lowering.
///
/// This replaces all non-local control transfers with a uniform forward-jump representation,
/// so that later passes only ever see `JumpBlock`/`JumpLabel`/`JumpGo`:
///
/// * `return` becomes a write to the function's result variable (when a value is present)
///   followed by a jump past the last statement of the function body.
/// * `break` becomes a jump past the enclosing loop; `continue` becomes a jump to the end
///   of the loop body (a `for` loop's increments still run).
/// * `disable name` becomes a jump past the named enclosing `begin`.
/// * `repeat (n) body` becomes a counted `while` over a fresh `__Vrepeat<N>` counter.
/// * `do body while (cond)` becomes one inlined copy of the body followed by
///   `while (cond) body`, with the named begins of each copy renamed apart.
///
/// Unroll pragmas are consumed and recorded on the loop they precede.
///
/// Statements whose control flow is illegal (`return` under a fork, `break` outside a loop,
/// ...) are reported and deleted; lowering continues so that one run surfaces as many
/// diagnostics as possible.  The pass is idempotent on its own output.
pub fn run(netlist: &mut ast::Netlist, ctx: &mut CompilerContext) -> Result<(), ErrorReported> {
    let mut lowerer = Lowerer {
        ctx,
        module: None,
        ftask: None,
        current_loop: None,
        in_loop_incs: false,
        in_fork: false,
        mod_repeat_num: 0,
        unroll: UnrollHint::Default,
        block_stack: vec![],
        scratch: HashMap::new(),
        errors: ErrorStore::new(),
    };
    lowerer.lower_netlist(netlist);
    lowerer.errors.into_result(())
}

struct Lowerer<'a> {
    ctx: &'a mut CompilerContext,
    /// Flags of the module being lowered.
    module: Option<ModuleCtx>,
    /// The function or task whose body is being lowered.  Anchor for `return`.
    ftask: Option<FtaskCtx>,
    /// Anchor for `break`/`continue`: the innermost enclosing loop.
    current_loop: Option<NodeId>,
    /// True while lowering a while loop's increment statements.
    in_loop_incs: bool,
    /// True once any enclosing block is a fork; remains true for all descendants.
    in_fork: bool,
    /// Per-module counter for naming `__Vrepeat<N>` variables.
    mod_repeat_num: u32,
    /// Latched unroll pragma, consumed by the next loop.
    unroll: UnrollHint,
    /// All begin/fork blocks above the current statement, for `disable` resolution.
    block_stack: Vec<BlockCtx>,
    /// Side table standing in for scratch state on the nodes themselves; dropped with
    /// the lowerer at the end of the pass.
    scratch: HashMap<NodeId, Scratch>,
    errors: ErrorStore<ErrorReported>,
}

#[derive(Copy, Clone)]
struct ModuleCtx {
    parameterized: bool,
}

#[derive(Copy, Clone)]
struct FtaskCtx {
    node_id: NodeId,
    /// The result variable; `Some` exactly for functions.
    fvar: Option<DefId>,
    is_constructor: bool,
}

struct BlockCtx {
    node_id: NodeId,
    name: Option<Ident>,
    is_fork: bool,
}

/// Per-anchor memoized labels, plus fork tracking for blocks.
#[derive(Default)]
struct Scratch {
    /// Label at the end of a loop body ("continue here").
    label_end_of_iter: Option<LabelId>,
    /// Label past the whole construct ("exit here").
    label_exit: Option<LabelId>,
    contains_fork: bool,
}

impl Lowerer<'_> {
    fn lower_netlist(&mut self, netlist: &mut ast::Netlist) {
        for module in &mut netlist.modules {
            self.lower_module(module);
        }
    }

    fn lower_module(&mut self, module: &mut Sp<ast::Module>) {
        if module.dead {
            return;
        }
        let saved_module = self.module.replace(ModuleCtx { parameterized: module.parameterized() });
        let saved_repeat_num = std::mem::replace(&mut self.mod_repeat_num, 0);

        for item in &mut module.value.items {
            self.lower_item(item);
        }

        self.module = saved_module;
        self.mod_repeat_num = saved_repeat_num;
    }

    fn lower_item(&mut self, item: &mut Sp<ast::Item>) {
        match &mut item.value {
            ast::Item::FuncTask(ftask) => self.lower_ftask(ftask),
            ast::Item::Process(process) => self.lower_block(&mut process.body),
        }
    }

    fn lower_ftask(&mut self, ftask: &mut ast::FuncTask) {
        let node_id = self.ensure_node_id(ftask.node_id);
        ftask.node_id = Some(node_id);

        let (fvar, is_constructor) = match ftask.kind {
            ast::FuncTaskKind::Function { fvar, is_constructor } => (Some(fvar), is_constructor),
            ast::FuncTaskKind::Task => (None, false),
        };
        let saved_ftask = self.ftask.replace(FtaskCtx { node_id, fvar, is_constructor });

        self.lower_block(&mut ftask.body);

        self.ftask = saved_ftask;

        // If any return was lowered, its landing point goes past the last statement.
        self.materialize_exit_label(node_id, &mut ftask.body);
    }

    fn lower_block(&mut self, block: &mut ast::Block) {
        let stmts = std::mem::take(&mut block.0);
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            self.lower_stmt(stmt, &mut out);
        }
        block.0 = out;
    }

    fn lower_stmt(&mut self, stmt: Sp<ast::Stmt>, out: &mut Vec<Sp<ast::Stmt>>) {
        let Sp { span, value: ast::Stmt { node_id, kind } } = stmt;
        match kind {
            StmtKind::Decl(_)
            | StmtKind::JumpLabel(_)
            | StmtKind::JumpGo(_)
            => out.push(sp!(span => ast::Stmt { node_id, kind })),

            StmtKind::Assign { lhs, rhs } => {
                self.mark_loop_idx_ref(&lhs);
                self.mark_loop_idx_refs(&rhs);
                out.push(sp!(span => ast::Stmt { node_id, kind: StmtKind::Assign { lhs, rhs } }));
            },

            StmtKind::Expr(expr) => {
                self.mark_loop_idx_refs(&expr);
                out.push(sp!(span => ast::Stmt { node_id, kind: StmtKind::Expr(expr) }));
            },

            StmtKind::If { cond, mut then_block, mut else_block } => {
                self.mark_loop_idx_refs(&cond);
                self.lower_block(&mut then_block);
                if let Some(else_block) = &mut else_block {
                    self.lower_block(else_block);
                }
                out.push(sp!(span => ast::Stmt {
                    node_id,
                    kind: StmtKind::If { cond, then_block, else_block },
                }));
            },

            StmtKind::Begin { name, mut block } => {
                let id = self.ensure_node_id(node_id);
                self.block_stack.push(BlockCtx {
                    node_id: id,
                    name: name.as_ref().map(|name| name.value.clone()),
                    is_fork: false,
                });
                if self.in_fork {
                    self.scratch_mut(id).contains_fork = true;
                }
                let saved_unroll = self.unroll;
                self.lower_block(&mut block);
                self.unroll = saved_unroll;
                self.block_stack.pop();

                // A disable targeting this begin lands past its last statement.
                self.materialize_exit_label(id, &mut block);
                out.push(sp!(span => ast::Stmt {
                    node_id: Some(id),
                    kind: StmtKind::Begin { name, block },
                }));
            },

            StmtKind::Fork { name, join, mut block } => {
                let id = self.ensure_node_id(node_id);
                self.block_stack.push(BlockCtx {
                    node_id: id,
                    name: name.as_ref().map(|name| name.value.clone()),
                    is_fork: true,
                });
                // Mark all enclosing blocks as containing a fork.  Stopping at the first
                // block already marked keeps the whole traversal O(n).
                for index in (0..self.block_stack.len()).rev() {
                    let block_id = self.block_stack[index].node_id;
                    let scratch = self.scratch_mut(block_id);
                    if scratch.contains_fork {
                        break;
                    }
                    scratch.contains_fork = true;
                }
                let saved_in_fork = std::mem::replace(&mut self.in_fork, true);
                let saved_unroll = self.unroll;
                self.lower_block(&mut block);
                self.unroll = saved_unroll;
                self.in_fork = saved_in_fork;
                self.block_stack.pop();

                out.push(sp!(span => ast::Stmt {
                    node_id: Some(id),
                    kind: StmtKind::Fork { name, join, block },
                }));
            },

            StmtKind::While(mut lowered) => {
                let id = self.ensure_node_id(node_id);
                if !self.unroll.is_default() {
                    lowered.unroll = self.unroll;
                }
                if let Some(module) = self.module {
                    // Loop bounds involving parameters often collapse to zero iterations in
                    // some parameterizations; the empty-loop warning would be noise there.
                    if module.parameterized {
                        lowered.unused_warn_off = true;
                    }
                }
                self.unroll = UnrollHint::Default;

                let saved_loop = self.current_loop.replace(id);
                let saved_incs = std::mem::replace(&mut self.in_loop_incs, false);
                self.lower_block(&mut lowered.preconds);
                self.lower_block(&mut lowered.body);
                self.in_loop_incs = true;
                self.lower_block(&mut lowered.incs);
                self.in_loop_incs = saved_incs;
                self.current_loop = saved_loop;

                // continue lands at the end of the body; the increments still run
                self.materialize_end_of_iter_label(id, &mut lowered.body);
                // break lands past the whole loop
                let stmt = sp!(span => ast::Stmt { node_id: Some(id), kind: StmtKind::While(lowered) });
                self.push_with_exit_label(id, stmt, out);
            },

            StmtKind::Foreach { array, mut body } => {
                let id = self.ensure_node_id(node_id);
                let saved_loop = self.current_loop.replace(id);
                self.lower_block(&mut body);
                self.current_loop = saved_loop;

                self.materialize_end_of_iter_label(id, &mut body);
                let stmt = sp!(span => ast::Stmt { node_id: Some(id), kind: StmtKind::Foreach { array, body } });
                self.push_with_exit_label(id, stmt, out);
            },

            StmtKind::DoWhile { cond, mut body } => {
                let id = self.ensure_node_id(node_id);
                let saved_loop = self.current_loop.replace(id);
                self.mark_loop_idx_refs(&cond);
                self.lower_block(&mut body);
                self.current_loop = saved_loop;

                // Wrap the continue target into the body before it gets duplicated, so that
                // each copy carries its own landing point.
                self.materialize_end_of_iter_label(id, &mut body);

                let mut copied = body.clone();
                self.remap_cloned_block(&mut copied);
                add_prefix_to_begins("__Vdo_while1_", &mut copied);
                add_prefix_to_begins("__Vdo_while2_", &mut body);

                let mut lowered = ast::StmtWhile {
                    preconds: ast::Block::empty(),
                    cond,
                    body,
                    incs: ast::Block::empty(),
                    unroll: UnrollHint::Default,
                    // the body always executes once, so the empty-loop warning would be wrong
                    unused_warn_off: true,
                };
                if !self.unroll.is_default() {
                    lowered.unroll = self.unroll;
                }
                self.unroll = UnrollHint::Default;

                let while_stmt = self.make_stmt(span, StmtKind::While(lowered));
                match self.exit_label(id) {
                    None => {
                        out.extend(copied.0);
                        out.push(while_stmt);
                    },
                    Some(label) => {
                        // a break in either copy of the body lands past the while
                        let mut inner = copied.0;
                        inner.push(while_stmt);
                        let label_stmt = self.make_stmt(span.end_span(), StmtKind::JumpLabel(label));
                        inner.push(label_stmt);
                        let wrapped = StmtKind::JumpBlock(ast::StmtJumpBlock { label, block: ast::Block(inner) });
                        let wrapped = self.make_stmt(span, wrapped);
                        out.push(wrapped);
                    },
                }
            },

            StmtKind::Repeat { count, body } => {
                // Rewritten up front, without recursing first; the replacement is then lowered
                // like any other statement, which binds break/continue in the body to the
                // synthesized while.
                let name: Ident = format!("__Vrepeat{}", self.mod_repeat_num).parse()
                    .expect("generated counter name is a valid ident");
                self.mod_repeat_num += 1;
                let def = self.ctx.define_block_temp(sp!(span => name), DataType::Signed32);
                self.ctx.defs.set_used_loop_idx(def);

                let var = |access| sp!(span => ast::VarRef { def, access });
                let decl = self.make_stmt(span, StmtKind::Decl(def));
                let init = self.make_stmt(span, StmtKind::Assign { lhs: var(Access::Write), rhs: count });
                let dec_rhs = sp!(span => Expr::Binop(
                    Box::new(var(Access::Read).into()),
                    sp!(span => BinopKind::Sub),
                    Box::new(sp!(span => Expr::from(1))),
                ));
                let dec = self.make_stmt(span, StmtKind::Assign { lhs: var(Access::Write), rhs: dec_rhs });
                // a negative count compares as already exhausted, giving zero iterations
                let cond = sp!(span => Expr::Binop(
                    Box::new(var(Access::Read).into()),
                    sp!(span => BinopKind::Gt),
                    Box::new(sp!(span => Expr::from(0))),
                ));

                let mut lowered = ast::StmtWhile {
                    preconds: ast::Block::empty(),
                    cond,
                    body,
                    incs: ast::Block(vec![dec]),
                    unroll: UnrollHint::Default,
                    unused_warn_off: false,
                };
                if !self.unroll.is_default() {
                    lowered.unroll = self.unroll;
                }
                self.unroll = UnrollHint::Default;

                let while_stmt = self.make_stmt(span, StmtKind::While(lowered));
                let begin = self.make_stmt(span, StmtKind::Begin {
                    name: None,
                    block: ast::Block(vec![decl, init, while_stmt]),
                });
                self.lower_stmt(begin, out);
            },

            StmtKind::Return { value } => {
                if let Some(value) = &value {
                    self.mark_loop_idx_refs(value);
                }
                if self.in_fork {
                    self.errors.append(self.ctx.diagnostics.emit(error!(
                        message("Return isn't legal under fork (IEEE 1800-2023 9.2.3)"),
                        primary(span, "return under fork"),
                    )));
                    return;
                }
                let ftask = match self.ftask {
                    Some(ftask) => ftask,
                    None => {
                        self.errors.append(self.ctx.diagnostics.emit(error!(
                            message("Return isn't underneath a task or function"),
                            primary(span, "stray return"),
                        )));
                        return;
                    },
                };
                match ftask.fvar {
                    Some(fvar) => {
                        if value.is_none() && !ftask.is_constructor {
                            self.errors.append(self.ctx.diagnostics.emit(error!(
                                message("Return underneath a function should have return value"),
                                primary(span, "missing return value"),
                            )));
                            return;
                        }
                        if let Some(value) = value {
                            // set the result variable, then jump to the end of the body
                            let lhs = sp!(value.span => ast::VarRef { def: fvar, access: Access::Write });
                            let assign = self.make_stmt(span, StmtKind::Assign { lhs, rhs: value });
                            out.push(assign);
                        }
                        let label = self.request_label(ftask.node_id, false);
                        let go = self.make_stmt(span, StmtKind::JumpGo(label));
                        out.push(go);
                    },
                    None => {
                        if value.is_some() {
                            self.errors.append(self.ctx.diagnostics.emit(error!(
                                message("Return underneath a task shouldn't have return value"),
                                primary(span, "unexpected return value"),
                            )));
                            return;
                        }
                        let label = self.request_label(ftask.node_id, false);
                        let go = self.make_stmt(span, StmtKind::JumpGo(label));
                        out.push(go);
                    },
                }
            },

            StmtKind::Break => {
                match self.current_loop {
                    None => {
                        self.errors.append(self.ctx.diagnostics.emit(error!(
                            message("break isn't underneath a loop"),
                            primary(span, "break outside of any loop"),
                        )));
                    },
                    Some(loop_id) => {
                        let label = self.request_label(loop_id, false);
                        let go = self.make_stmt(span, StmtKind::JumpGo(label));
                        out.push(go);
                    },
                }
            },

            StmtKind::Continue => {
                match self.current_loop {
                    None => {
                        self.errors.append(self.ctx.diagnostics.emit(error!(
                            message("continue isn't underneath a loop"),
                            primary(span, "continue outside of any loop"),
                        )));
                    },
                    Some(loop_id) => {
                        let label = self.request_label(loop_id, true);
                        let go = self.make_stmt(span, StmtKind::JumpGo(label));
                        out.push(go);
                    },
                }
            },

            StmtKind::Disable { target } => {
                let found = self.block_stack.iter().rev()
                    .find(|entry| entry.name.as_ref() == Some(&target.value))
                    .map(|entry| (entry.node_id, entry.is_fork));
                match found {
                    None => {
                        self.ctx.diagnostics.emit(warning!(
                            code="E_UNSUPPORTED",
                            message("disable isn't underneath a begin with name: '{}'", target),
                            primary(target, "no enclosing begin with this name"),
                        )).ignore();
                    },
                    Some((_, true)) => {
                        self.ctx.diagnostics.emit(warning!(
                            code="E_UNSUPPORTED",
                            message("Unsupported: disabling fork by name"),
                            primary(target, "names a fork"),
                        )).ignore();
                    },
                    Some((block_id, false)) => {
                        if self.contains_fork(block_id) {
                            self.ctx.diagnostics.emit(warning!(
                                code="E_UNSUPPORTED",
                                message("Unsupported: disabling block that contains a fork"),
                                primary(target, "this block contains a fork"),
                            )).ignore();
                        } else {
                            let label = self.request_label(block_id, false);
                            let go = self.make_stmt(span, StmtKind::JumpGo(label));
                            out.push(go);
                        }
                    },
                }
            },

            StmtKind::Pragma(kind) => match kind {
                ast::PragmaKind::UnrollFull => {
                    self.unroll = UnrollHint::Full;
                },
                ast::PragmaKind::UnrollDisable => {
                    self.unroll = UnrollHint::Disable;
                },
                other => out.push(sp!(span => ast::Stmt { node_id, kind: StmtKind::Pragma(other) })),
            },

            StmtKind::JumpBlock(mut jump_block) => {
                self.lower_block(&mut jump_block.block);
                out.push(sp!(span => ast::Stmt { node_id, kind: StmtKind::JumpBlock(jump_block) }));
            },
        }
    }

    // ------------
    // label bookkeeping

    fn ensure_node_id(&mut self, node_id: Option<NodeId>) -> NodeId {
        node_id.unwrap_or_else(|| self.ctx.unused_node_ids.next())
    }

    fn make_stmt(&mut self, span: Span, kind: StmtKind) -> Sp<ast::Stmt> {
        sp!(span => ast::Stmt {
            node_id: Some(self.ctx.unused_node_ids.next()),
            kind,
        })
    }

    fn scratch_mut(&mut self, node_id: NodeId) -> &mut Scratch {
        self.scratch.entry(node_id).or_default()
    }

    fn contains_fork(&self, node_id: NodeId) -> bool {
        self.scratch.get(&node_id).map_or(false, |scratch| scratch.contains_fork)
    }

    /// Get the label that jumps past `anchor` (`end_of_iter = false`) or to the end of its
    /// body (`end_of_iter = true`), allocating it on first use.  The label is attached to
    /// the tree when the anchor's own lowering finishes.
    fn request_label(&mut self, anchor: NodeId, end_of_iter: bool) -> LabelId {
        let existing = self.scratch.get(&anchor).and_then(|scratch| match end_of_iter {
            true => scratch.label_end_of_iter,
            false => scratch.label_exit,
        });
        if let Some(label) = existing {
            return label;
        }
        let label = self.ctx.unused_label_ids.next();
        let scratch = self.scratch.entry(anchor).or_default();
        match end_of_iter {
            true => scratch.label_end_of_iter = Some(label),
            false => scratch.label_exit = Some(label),
        }
        label
    }

    fn exit_label(&self, anchor: NodeId) -> Option<LabelId> {
        self.scratch.get(&anchor).and_then(|scratch| scratch.label_exit)
    }

    fn end_of_iter_label(&self, anchor: NodeId) -> Option<LabelId> {
        self.scratch.get(&anchor).and_then(|scratch| scratch.label_end_of_iter)
    }

    fn materialize_exit_label(&mut self, anchor: NodeId, block: &mut ast::Block) {
        if let Some(label) = self.exit_label(anchor) {
            self.wrap_stmt_list(block, label);
        }
    }

    fn materialize_end_of_iter_label(&mut self, anchor: NodeId, body: &mut ast::Block) {
        if let Some(label) = self.end_of_iter_label(anchor) {
            self.wrap_stmt_list(body, label);
        }
    }

    /// Wrap the tail of a statement list in a jump block ending at `label`.
    ///
    /// Leading declarations are skipped so that they stay visible in the original scope.
    fn wrap_stmt_list(&mut self, block: &mut ast::Block, label: LabelId) {
        let first = block.0.iter()
            .position(|stmt| !matches!(stmt.value.kind, StmtKind::Decl(_)))
            .expect("(bug!) jump target requested for a statement list with nothing to wrap");
        let mut inner = block.0.split_off(first);
        // the wrapper covers everything it swallowed; the label lands just past that
        let span = inner[0].span.merge(inner.last().expect("nonempty by construction").span);
        let label_stmt = self.make_stmt(span.end_span(), StmtKind::JumpLabel(label));
        inner.push(label_stmt);
        let wrapped = StmtKind::JumpBlock(ast::StmtJumpBlock { label, block: ast::Block(inner) });
        let wrapped = self.make_stmt(span, wrapped);
        block.0.push(wrapped);
    }

    /// Push `stmt`, wrapping it alone in a jump block if an exit label was requested for it.
    fn push_with_exit_label(&mut self, anchor: NodeId, stmt: Sp<ast::Stmt>, out: &mut Vec<Sp<ast::Stmt>>) {
        match self.exit_label(anchor) {
            None => out.push(stmt),
            Some(label) => {
                let span = stmt.span;
                let label_stmt = self.make_stmt(span.end_span(), StmtKind::JumpLabel(label));
                let wrapped = StmtKind::JumpBlock(ast::StmtJumpBlock {
                    label,
                    block: ast::Block(vec![stmt, label_stmt]),
                });
                let wrapped = self.make_stmt(span, wrapped);
                out.push(wrapped);
            },
        }
    }

    // ------------
    // odds and ends

    /// Mark variables referenced in loop increments, so that later optimization passes
    /// don't eliminate the counter writes.
    fn mark_loop_idx_refs(&mut self, expr: &Sp<Expr>) {
        if !self.in_loop_incs {
            return;
        }
        struct MarkVisitor<'a> {
            defs: &'a mut crate::context::Defs,
        }
        impl ast::Visit for MarkVisitor<'_> {
            fn visit_var_ref(&mut self, var: &Sp<ast::VarRef>) {
                self.defs.set_used_loop_idx(var.def);
            }
        }
        use crate::ast::Visitable;
        expr.visit_with(&mut MarkVisitor { defs: &mut self.ctx.defs });
    }

    fn mark_loop_idx_ref(&mut self, var: &Sp<ast::VarRef>) {
        if self.in_loop_incs {
            self.ctx.defs.set_used_loop_idx(var.def);
        }
    }

    /// Fix up a freshly cloned statement list so it can live next to the original:
    /// fresh node ids everywhere, fresh labels for jump blocks defined inside (jumps to
    /// enclosing labels are kept), and fresh definitions for declarations inside (references
    /// to outer variables are kept).
    fn remap_cloned_block(&mut self, block: &mut ast::Block) {
        struct RemapVisitor<'a> {
            ctx: &'a mut CompilerContext,
            labels: HashMap<LabelId, LabelId>,
            defs: HashMap<DefId, DefId>,
        }
        impl ast::VisitMut for RemapVisitor<'_> {
            fn visit_node_id(&mut self, node_id: &mut Option<NodeId>) {
                *node_id = Some(self.ctx.unused_node_ids.next());
            }
            fn visit_stmt(&mut self, stmt: &mut Sp<ast::Stmt>) {
                match &mut stmt.value.kind {
                    StmtKind::Decl(def) => {
                        let new_def = self.ctx.clone_var_for_duplicate(*def);
                        self.defs.insert(*def, new_def);
                        *def = new_def;
                    },
                    StmtKind::JumpBlock(jump_block) => {
                        let new_label = self.ctx.unused_label_ids.next();
                        self.labels.insert(jump_block.label, new_label);
                        jump_block.label = new_label;
                    },
                    StmtKind::JumpLabel(label) | StmtKind::JumpGo(label) => {
                        if let Some(&new_label) = self.labels.get(label) {
                            *label = new_label;
                        }
                    },
                    _ => {},
                }
                ast::walk_stmt_mut(self, stmt);
            }
            fn visit_var_ref(&mut self, var: &mut Sp<ast::VarRef>) {
                if let Some(&new_def) = self.defs.get(&var.value.def) {
                    var.value.def = new_def;
                }
            }
        }
        use crate::ast::Visitable;
        let mut visitor = RemapVisitor {
            ctx: &mut *self.ctx,
            labels: HashMap::new(),
            defs: HashMap::new(),
        };
        block.visit_mut_with(&mut visitor);
    }
}

/// Rename every named begin in a subtree by prepending `prefix`.
///
/// Used on the two copies of a do-while body so their block names don't collide downstream.
fn add_prefix_to_begins(prefix: &str, block: &mut ast::Block) {
    struct PrefixVisitor<'a> {
        prefix: &'a str,
    }
    impl ast::VisitMut for PrefixVisitor<'_> {
        fn visit_stmt(&mut self, stmt: &mut Sp<ast::Stmt>) {
            if let StmtKind::Begin { name: Some(name), .. } = &mut stmt.value.kind {
                name.value = format!("{}{}", self.prefix, name.value).parse()
                    .expect("prefixed block name is a valid ident");
            }
            ast::walk_stmt_mut(self, stmt);
        }
    }
    use crate::ast::Visitable;
    block.visit_mut_with(&mut PrefixVisitor { prefix });
}

// =============================================================================
