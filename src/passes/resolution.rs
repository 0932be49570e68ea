//! Passes for filling in resolution-related metadata on the AST.

use crate::ast::{self, VisitMut};
use crate::error::ErrorReported;
use crate::resolve::{NodeId, UnusedIds};

/// Assign fresh [`NodeId`]s to all nodes that don't have one yet.
///
/// Lowering passes key side tables by node id, so this must run on any AST that was built
/// outside the parser (or that had ids stripped) before those passes see it.
pub fn fill_missing_node_ids<V: ast::Visitable>(
    ast: &mut V,
    unused_node_ids: &UnusedIds<NodeId>,
) -> Result<(), ErrorReported> {
    let mut visitor = FillMissingNodeIdsVisitor { unused_node_ids };
    ast.visit_mut_with(&mut visitor);
    Ok(())
}

struct FillMissingNodeIdsVisitor<'a> {
    unused_node_ids: &'a UnusedIds<NodeId>,
}

impl VisitMut for FillMissingNodeIdsVisitor<'_> {
    fn visit_node_id(&mut self, node_id: &mut Option<NodeId>) {
        if node_id.is_none() {
            *node_id = Some(self.unused_node_ids.next());
        }
    }
}
