use crate::ast;
use crate::context::CompilerContext;
use crate::error::ErrorReported;

pub mod integrity;
pub mod link_jump;
pub mod resolution;

/// Run control-flow lowering over a whole design, then double-check the result.
///
/// This is the entry point callers should normally use; [`link_jump::run`] is exposed
/// separately for tools that want to inspect the tree between the pass and the check.
pub fn lower_jumps(netlist: &mut ast::Netlist, ctx: &mut CompilerContext) -> Result<(), ErrorReported> {
    link_jump::run(netlist, ctx)?;

    if std::env::var("_SILICA_DEBUG__DUMP_LOWERED").ok().as_deref() == Some("1") {
        eprintln!("{:#?}", netlist);
    }

    integrity::run(netlist, ctx)
}
