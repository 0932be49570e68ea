use indexmap::IndexMap;

use crate::context::CompilerContext;
use crate::ident::Ident;
use crate::pos::{Sp, Span};
use crate::resolve::DefId;
use crate::value::{DataType, Lifetime};

/// Retains information about all variable definitions in the program.
///
/// This object is responsible for storing information that is immediately available at the
/// definition site of a variable, such as: its name, type information, lifetime, and the
/// flags that later passes read off of it.
///
/// **Note:** The methods for creating new definitions are on [`CompilerContext`], which owns
/// the [`DefId`] allocator.
#[derive(Debug, Clone, Default)]
pub struct Defs {
    vars: IndexMap<DefId, VarData>,
}

#[derive(Debug, Clone)]
pub struct VarData {
    pub ident: Sp<Ident>,
    pub ty: DataType,
    pub lifetime: Lifetime,
    pub kind: VarKind,
    /// Marks an induction variable whose writes must survive later optimization passes.
    pub used_loop_idx: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VarKind {
    /// A variable declared in user code.
    Local,
    /// A compiler-generated temporary scoped to a block.
    BlockTemp,
    /// The result variable of a function.
    FuncReturn,
}

impl Defs {
    pub fn new() -> Self { Default::default() }

    #[track_caller]
    fn var_data(&self, def_id: DefId) -> &VarData {
        self.vars.get(&def_id).unwrap_or_else(|| panic!("no such variable: {:?}", def_id))
    }

    /// Get the name of a variable.
    #[track_caller]
    pub fn var_name(&self, def_id: DefId) -> &Sp<Ident> {
        &self.var_data(def_id).ident
    }

    #[track_caller]
    pub fn var_ty(&self, def_id: DefId) -> DataType {
        self.var_data(def_id).ty
    }

    #[track_caller]
    pub fn var_lifetime(&self, def_id: DefId) -> Lifetime {
        self.var_data(def_id).lifetime
    }

    #[track_caller]
    pub fn var_kind(&self, def_id: DefId) -> VarKind {
        self.var_data(def_id).kind
    }

    #[track_caller]
    pub fn var_decl_span(&self, def_id: DefId) -> Option<Span> {
        let span = self.var_data(def_id).ident.span;
        (span.file_id.is_some()).then(|| span)
    }

    #[track_caller]
    pub fn used_loop_idx(&self, def_id: DefId) -> bool {
        self.var_data(def_id).used_loop_idx
    }

    #[track_caller]
    pub fn set_used_loop_idx(&mut self, def_id: DefId) {
        self.vars.get_mut(&def_id)
            .unwrap_or_else(|| panic!("no such variable: {:?}", def_id))
            .used_loop_idx = true;
    }
}

/// # Definitions
impl CompilerContext {
    fn define_var(&mut self, data: VarData) -> DefId {
        let def_id = self.unused_def_ids.next();
        self.defs.vars.insert(def_id, data);
        def_id
    }

    /// Declare a local variable, binding its name to a brand new [`DefId`].
    pub fn define_local(&mut self, ident: Sp<Ident>, ty: DataType, lifetime: Lifetime) -> DefId {
        self.define_var(VarData { ident, ty, lifetime, kind: VarKind::Local, used_loop_idx: false })
    }

    /// Declare a compiler-generated block temporary.  These are always automatic.
    pub fn define_block_temp(&mut self, ident: Sp<Ident>, ty: DataType) -> DefId {
        self.define_var(VarData {
            ident, ty,
            lifetime: Lifetime::Automatic,
            kind: VarKind::BlockTemp,
            used_loop_idx: false,
        })
    }

    /// Declare the result variable of a function.
    pub fn define_func_return(&mut self, ident: Sp<Ident>, ty: DataType) -> DefId {
        self.define_var(VarData {
            ident, ty,
            lifetime: Lifetime::Automatic,
            kind: VarKind::FuncReturn,
            used_loop_idx: false,
        })
    }

    /// Create a new definition identical to an existing one, for use when a subtree containing
    /// the original declaration is duplicated.  The two declarations keep the same name; the
    /// blocks that contain them are expected to be renamed apart by the duplicating pass.
    pub fn clone_var_for_duplicate(&mut self, def_id: DefId) -> DefId {
        let data = self.defs.var_data(def_id).clone();
        self.define_var(data)
    }
}
