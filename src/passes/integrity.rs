//! See [`run`].

use std::collections::HashSet;

use crate::ast::{self, StmtKind, Visit};
use crate::context::CompilerContext;
use crate::diagnostic::DiagnosticEmitter;
use crate::error::{ErrorReported, ErrorStore};
use crate::pos::Sp;
use crate::resolve::LabelId;

/// Consistency check over lowered control flow.
///
/// Verifies the contract that [`crate::passes::link_jump`] establishes and that later passes
/// rely on:
///
/// * no structured control-flow statement survives (`return`, `break`, `continue`,
///   `disable`, `repeat`, `do while`), nor any unroll pragma;
/// * every jump label is owned by exactly one jump block and is its final statement;
/// * every jump transfers to the label of an *enclosing* jump block, which is what makes
///   all jumps forward jumps.
///
/// Violations are compiler bugs, not user errors; they are reported as such.
pub fn run<V: ast::Visitable>(ast: &V, ctx: &CompilerContext) -> Result<(), ErrorReported> {
    let mut visitor = Visitor {
        diagnostics: &ctx.diagnostics,
        errors: ErrorStore::new(),
        enclosing_labels: vec![],
        seen_labels: HashSet::new(),
    };
    ast.visit_with(&mut visitor);
    visitor.errors.into_result(())
}

struct Visitor<'a> {
    diagnostics: &'a DiagnosticEmitter,
    errors: ErrorStore<ErrorReported>,
    /// Labels of the jump blocks enclosing the current statement, innermost last.
    enclosing_labels: Vec<LabelId>,
    /// Labels already claimed by some jump block.
    seen_labels: HashSet<LabelId>,
}

impl Visit for Visitor<'_> {
    fn visit_stmt(&mut self, stmt: &Sp<ast::Stmt>) {
        match &stmt.value.kind {
            | StmtKind::Return { .. }
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Disable { .. }
            | StmtKind::Repeat { .. }
            | StmtKind::DoWhile { .. }
            => {
                self.errors.append(self.diagnostics.emit(bug!(
                    message("{} survived control-flow lowering", stmt.value.kind.descr()),
                    primary(stmt, "not lowered"),
                )));
            },

            StmtKind::Pragma(ast::PragmaKind::UnrollFull)
            | StmtKind::Pragma(ast::PragmaKind::UnrollDisable)
            => {
                self.errors.append(self.diagnostics.emit(bug!(
                    message("unroll pragma survived control-flow lowering"),
                    primary(stmt, "not consumed"),
                )));
            },

            StmtKind::JumpBlock(jump_block) => {
                if !self.seen_labels.insert(jump_block.label) {
                    self.errors.append(self.diagnostics.emit(bug!(
                        message("jump label {} owned by more than one jump block", jump_block.label),
                        primary(stmt, "duplicate owner"),
                    )));
                }
                match jump_block.block.0.last() {
                    Some(last) if matches!(last.value.kind, StmtKind::JumpLabel(label) if label == jump_block.label) => {},
                    _ => {
                        self.errors.append(self.diagnostics.emit(bug!(
                            message("jump block does not end at its own label"),
                            primary(stmt, "malformed jump block"),
                        )));
                        return;
                    },
                }
                self.enclosing_labels.push(jump_block.label);
                // the final statement is the label we just validated
                let len = jump_block.block.0.len();
                for inner in &jump_block.block.0[..len - 1] {
                    self.visit_stmt(inner);
                }
                self.enclosing_labels.pop();
            },

            // only reachable for labels that are not the final statement of their block
            StmtKind::JumpLabel(_) => {
                self.errors.append(self.diagnostics.emit(bug!(
                    message("jump label outside the tail position of a jump block"),
                    primary(stmt, "stray label"),
                )));
            },

            StmtKind::JumpGo(label) => {
                if !self.enclosing_labels.contains(label) {
                    self.errors.append(self.diagnostics.emit(bug!(
                        message("jump to label {} which does not enclose it", label),
                        primary(stmt, "not a forward jump"),
                    )));
                }
            },

            _ => ast::walk_stmt(self, stmt),
        }
    }
}
