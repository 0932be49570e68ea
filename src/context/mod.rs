//! Structs that carry important global compiler state.

use crate::diagnostic::DiagnosticEmitter;
use crate::resolve::{DefId, LabelId, NodeId, UnusedIds};

pub use defs::Defs;
pub mod defs;

/// Context object for the majority of compilation.
///
/// This is a context object that holds a significant portion of the mutable state that is shared
/// between compiler passes (in particular passes that traverse the AST).
///
/// It provides methods for creating definitions and returning [`DefId`]s, and it owns the
/// allocators for the various kinds of ids that passes hand out to freshly created nodes.
#[derive(Debug)]
pub struct CompilerContext {
    pub diagnostics: DiagnosticEmitter,

    /// Stores information about [`DefId`]s.
    pub defs: Defs,
    /// For assigning ids to freshly created statements.
    pub unused_node_ids: UnusedIds<NodeId>,
    /// For assigning ids to freshly created definitions.
    pub unused_def_ids: UnusedIds<DefId>,
    /// For assigning ids to freshly created jump labels.
    pub unused_label_ids: UnusedIds<LabelId>,
}

impl CompilerContext {
    fn from_diagnostics(diagnostics: DiagnosticEmitter) -> Self {
        CompilerContext {
            diagnostics,
            defs: Default::default(),
            unused_node_ids: Default::default(),
            unused_def_ids: Default::default(),
            unused_label_ids: Default::default(),
        }
    }

    /// Create a [`CompilerContext`] that writes diagnostics to the standard error stream.
    pub fn new_stderr() -> Self {
        Self::from_diagnostics(DiagnosticEmitter::new_stderr())
    }

    /// Create a [`CompilerContext`] that captures diagnostic output which can be recovered
    /// by calling [`Self::get_captured_diagnostics`].
    pub fn new_captured() -> Self {
        Self::from_diagnostics(DiagnosticEmitter::new_captured())
    }

    /// Obtain captured diagnostics, provided that this [`CompilerContext`] was constructed
    /// using [`Self::new_captured`]. (otherwise, returns `None`)
    pub fn get_captured_diagnostics(&self) -> Option<String> {
        self.diagnostics.get_captured_diagnostics()
    }
}
