use crate::resolve::{DefId, LabelId, NodeId};
use crate::ident::Ident;
use crate::pos::Sp;

// =============================================================================

/// Root container of the design: all modules, post-elaboration.
#[derive(Debug, Clone, PartialEq)]
pub struct Netlist {
    pub modules: Vec<Sp<Module>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: Sp<Ident>,
    /// Set on modules that elaboration determined are never instantiated.
    /// Passes skip dead modules entirely.
    pub dead: bool,
    pub has_param_list: bool,
    pub has_gparam: bool,
    pub items: Vec<Sp<Item>>,
}

impl Module {
    pub fn parameterized(&self) -> bool { self.has_param_list || self.has_gparam }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    FuncTask(FuncTask),
    Process(Process),
}

impl Item {
    pub fn descr(&self) -> &'static str { match self {
        Item::FuncTask(FuncTask { kind: FuncTaskKind::Function { .. }, .. }) => "function",
        Item::FuncTask(FuncTask { kind: FuncTaskKind::Task, .. }) => "task",
        Item::Process(Process { kind: ProcessKind::Initial, .. }) => "initial process",
        Item::Process(Process { kind: ProcessKind::Always, .. }) => "always process",
        Item::Process(Process { kind: ProcessKind::Final, .. }) => "final process",
    }}
}

/// A function or task definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncTask {
    pub node_id: Option<NodeId>,
    pub kind: FuncTaskKind,
    pub name: Sp<Ident>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FuncTaskKind {
    Function {
        /// The result variable.  `return expr` is lowered into a write to this variable
        /// followed by a jump past the last statement of the body.
        fvar: DefId,
        /// Class constructors (`function new`) may use a bare `return`.
        is_constructor: bool,
    },
    Task,
}

impl FuncTaskKind {
    pub fn is_function(&self) -> bool { matches!(self, FuncTaskKind::Function { .. }) }
}

/// A procedural block at module level.
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    pub kind: ProcessKind,
    pub body: Block,
}

string_enum! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum ProcessKind {
        #[strum(serialize = "initial")] Initial,
        #[strum(serialize = "always")] Always,
        #[strum(serialize = "final")] Final,
    }
}

// =============================================================================

/// A series of statements, the contents of any statement-holding construct.
///
/// Unlike blocks in the surface syntax, a `Block` carries no name or scope by itself;
/// see [`StmtKind::Begin`] for named sequential blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Block(pub Vec<Sp<Stmt>>);

impl Block {
    pub fn empty() -> Self { Block(vec![]) }

    pub fn first_stmt(&self) -> Option<&Sp<Stmt>> { self.0.first() }
    pub fn last_stmt(&self) -> Option<&Sp<Stmt>> { self.0.last() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub node_id: Option<NodeId>,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// A variable declaration.  Declarations always precede the other statements
    /// of the list that contains them.
    Decl(DefId),

    /// A blocking assignment. `lhs = rhs;`
    Assign {
        lhs: Sp<VarRef>,
        rhs: Sp<Expr>,
    },

    /// An expression evaluated for its side effects (e.g. a task call).
    Expr(Sp<Expr>),

    /// A sequential block.  `begin ... end`, optionally `begin : name`.
    Begin {
        name: Option<Sp<Ident>>,
        block: Block,
    },

    /// A parallel block.  `fork ... join` and friends.
    Fork {
        name: Option<Sp<Ident>>,
        join: JoinKind,
        block: Block,
    },

    /// `if (cond) ... else ...`
    If {
        cond: Sp<Expr>,
        then_block: Block,
        else_block: Option<Block>,
    },

    /// `while (cond) ...`, including the normalized form of `for` loops
    /// (whose increments live in [`StmtWhile::incs`]).
    While(StmtWhile),

    /// `do ... while (cond);`  Executes the body at least once.
    DoWhile {
        cond: Sp<Expr>,
        body: Block,
    },

    /// `repeat (count) ...`
    Repeat {
        count: Sp<Expr>,
        body: Block,
    },

    /// `foreach (array[...]) ...`
    Foreach {
        array: Sp<VarRef>,
        body: Block,
    },

    /// `return;` or `return expr;`
    Return {
        value: Option<Sp<Expr>>,
    },

    /// `break;`
    Break,

    /// `continue;`
    Continue,

    /// `disable name;` transfers control out of the named block.
    Disable {
        target: Sp<Ident>,
    },

    /// A compiler directive attached to the statement sequence.
    Pragma(PragmaKind),

    /// Lowered control flow: a container whose label is jumped to by [`StmtKind::JumpGo`].
    JumpBlock(StmtJumpBlock),

    /// Lowered control flow: the landing point of jumps, always the final statement
    /// of the [`StmtKind::JumpBlock`] owning it.
    JumpLabel(LabelId),

    /// Lowered control flow: transfer forward to a label of an enclosing jump block.
    JumpGo(LabelId),
}

impl StmtKind {
    pub fn descr(&self) -> &'static str { match self {
        StmtKind::Decl { .. } => "declaration",
        StmtKind::Assign { .. } => "assignment",
        StmtKind::Expr { .. } => "expression statement",
        StmtKind::Begin { .. } => "begin block",
        StmtKind::Fork { .. } => "fork block",
        StmtKind::If { .. } => "if statement",
        StmtKind::While { .. } => "while loop",
        StmtKind::DoWhile { .. } => "do-while loop",
        StmtKind::Repeat { .. } => "repeat loop",
        StmtKind::Foreach { .. } => "foreach loop",
        StmtKind::Return { .. } => "return statement",
        StmtKind::Break => "break statement",
        StmtKind::Continue => "continue statement",
        StmtKind::Disable { .. } => "disable statement",
        StmtKind::Pragma { .. } => "pragma",
        StmtKind::JumpBlock { .. } => "jump block",
        StmtKind::JumpLabel { .. } => "jump label",
        StmtKind::JumpGo { .. } => "jump",
    }}
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtWhile {
    /// Statements evaluated before the condition on every iteration.
    pub preconds: Block,
    pub cond: Sp<Expr>,
    pub body: Block,
    /// Statements evaluated after the body on every iteration (`for` loop increments).
    /// A `continue` in the body still executes these.
    pub incs: Block,
    /// Unrolling preference recorded from a preceding pragma.
    pub unroll: UnrollHint,
    /// Suppresses the warning later passes emit for loops whose body never runs.
    pub unused_warn_off: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtJumpBlock {
    pub label: LabelId,
    pub block: Block,
}

/// Tri-state unrolling preference. `repeat`/`while` loops pick this up from
/// `unroll_full`/`unroll_disable` pragmas preceding them in the statement sequence.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnrollHint {
    Default,
    Full,
    Disable,
}

impl UnrollHint {
    pub fn is_default(&self) -> bool { matches!(self, UnrollHint::Default) }
}

impl Default for UnrollHint {
    fn default() -> Self { UnrollHint::Default }
}

string_enum! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum JoinKind {
        #[strum(serialize = "join")] Join,
        #[strum(serialize = "join_any")] JoinAny,
        #[strum(serialize = "join_none")] JoinNone,
    }
}

string_enum! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum PragmaKind {
        #[strum(serialize = "unroll_full")] UnrollFull,
        #[strum(serialize = "unroll_disable")] UnrollDisable,
        #[strum(serialize = "coverage_block_off")] CoverageBlockOff,
    }
}

// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binop(Box<Sp<Expr>>, Sp<BinopKind>, Box<Sp<Expr>>),
    Unop(Sp<UnopKind>, Box<Sp<Expr>>),
    LitInt {
        value: i32,
    },
    Var(Sp<VarRef>),
}

impl Expr {
    pub fn descr(&self) -> &'static str { match self {
        Expr::Binop { .. } => "binary operator",
        Expr::Unop { .. } => "unary operator",
        Expr::LitInt { .. } => "literal integer",
        Expr::Var { .. } => "var expression",
    }}
}

impl From<i32> for Expr {
    fn from(value: i32) -> Expr { Expr::LitInt { value } }
}

impl From<Sp<i32>> for Sp<Expr> {
    fn from(num: Sp<i32>) -> Sp<Expr> { sp!(num.span => Expr::from(num.value)) }
}

impl From<Sp<VarRef>> for Sp<Expr> {
    fn from(var: Sp<VarRef>) -> Sp<Expr> { sp!(var.span => Expr::Var(var)) }
}

/// A resolved reference to a variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VarRef {
    pub def: DefId,
    pub access: Access,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

string_enum! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum BinopKind {
        #[strum(serialize = "+")] Add,
        #[strum(serialize = "-")] Sub,
        #[strum(serialize = "*")] Mul,
        #[strum(serialize = "/")] Div,
        #[strum(serialize = "%")] Rem,
        #[strum(serialize = "==")] Eq,
        #[strum(serialize = "!=")] Ne,
        #[strum(serialize = "<")] Lt,
        #[strum(serialize = "<=")] Le,
        #[strum(serialize = ">")] Gt,
        #[strum(serialize = ">=")] Ge,
        #[strum(serialize = "|")] BitOr,
        #[strum(serialize = "^")] BitXor,
        #[strum(serialize = "&")] BitAnd,
        #[strum(serialize = "||")] LogicOr,
        #[strum(serialize = "&&")] LogicAnd,
    }
}

string_enum! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum UnopKind {
        #[strum(serialize = "!")] Not,
        #[strum(serialize = "~")] BitNot,
        #[strum(serialize = "-")] Neg,
    }
}

// =============================================================================

/// Trait for using [`Visit`] and [`VisitMut`] in a generic context.
///
/// The methods on this trait very simply just statically dispatch to the appropriate method
/// on those other traits.  E.g. if the node is a [`Netlist`] then [`Visitable::visit_with`]
/// will call the [`Visit::visit_netlist`] method, and etc.
///
/// The public API for most passes in [`crate::passes`] is a function with a bound on this trait,
/// because this is a lot nicer than directly exposing the visitors.  In particular, it saves the
/// caller from needing to import traits, or from having to worry about whether the visitor has a
/// method that they need to call in order to find out if an error occurred.
pub trait Visitable {
    /// Calls the method of [`Visit`] appropriate to this type, e.g. [`Visit::visit_expr`]
    /// if `Self` is an `Expr`.
    fn visit_with<V: Visit>(&self, f: &mut V);

    /// Calls the method of [`VisitMut`] appropriate to this type, e.g. [`VisitMut::visit_expr`]
    /// if `Self` is an `Expr`.
    fn visit_mut_with<V: VisitMut>(&mut self, f: &mut V);
}

macro_rules! generate_visitor_stuff {
    ($Visit:ident $(,$mut:tt)?) => {
        /// Recursive AST traversal trait.
        pub trait $Visit {
            fn visit_netlist(&mut self, e: & $($mut)? Netlist) { walk_netlist(self, e) }
            fn visit_module(&mut self, e: & $($mut)? Sp<Module>) { walk_module(self, e) }
            fn visit_item(&mut self, e: & $($mut)? Sp<Item>) { walk_item(self, e) }
            fn visit_block(&mut self, e: & $($mut)? Block) { walk_block(self, e) }
            fn visit_stmt(&mut self, e: & $($mut)? Sp<Stmt>) { walk_stmt(self, e) }
            fn visit_expr(&mut self, e: & $($mut)? Sp<Expr>) { walk_expr(self, e) }
            fn visit_var_ref(&mut self, _: & $($mut)? Sp<VarRef>) { }
            fn visit_node_id(&mut self, _: & $($mut)? Option<NodeId>) { }
        }

        pub fn walk_netlist<V>(v: &mut V, x: & $($mut)? Netlist)
        where V: ?Sized + $Visit,
        {
            for module in & $($mut)? x.modules {
                v.visit_module(module)
            }
        }

        pub fn walk_module<V>(v: &mut V, x: & $($mut)? Sp<Module>)
        where V: ?Sized + $Visit,
        {
            for item in & $($mut)? x.value.items {
                v.visit_item(item)
            }
        }

        pub fn walk_item<V>(v: &mut V, x: & $($mut)? Sp<Item>)
        where V: ?Sized + $Visit,
        {
            match & $($mut)? x.value {
                Item::FuncTask(FuncTask { node_id, kind: _, name: _, body }) => {
                    v.visit_node_id(node_id);
                    v.visit_block(body);
                },
                Item::Process(Process { kind: _, body }) => {
                    v.visit_block(body);
                },
            }
        }

        pub fn walk_block<V>(v: &mut V, x: & $($mut)? Block)
        where V: ?Sized + $Visit,
        {
            for stmt in & $($mut)? x.0 {
                v.visit_stmt(stmt);
            }
        }

        pub fn walk_stmt<V>(v: &mut V, x: & $($mut)? Sp<Stmt>)
        where V: ?Sized + $Visit,
        {
            v.visit_node_id(& $($mut)? x.value.node_id);

            match & $($mut)? x.value.kind {
                StmtKind::Decl(_) => {},
                StmtKind::Assign { lhs, rhs } => {
                    v.visit_var_ref(lhs);
                    v.visit_expr(rhs);
                },
                StmtKind::Expr(e) => v.visit_expr(e),
                StmtKind::Begin { name: _, block } => v.visit_block(block),
                StmtKind::Fork { name: _, join: _, block } => v.visit_block(block),
                StmtKind::If { cond, then_block, else_block } => {
                    v.visit_expr(cond);
                    v.visit_block(then_block);
                    if let Some(else_block) = else_block {
                        v.visit_block(else_block);
                    }
                },
                StmtKind::While(StmtWhile { preconds, cond, body, incs, unroll: _, unused_warn_off: _ }) => {
                    v.visit_block(preconds);
                    v.visit_expr(cond);
                    v.visit_block(body);
                    v.visit_block(incs);
                },
                StmtKind::DoWhile { cond, body } => {
                    v.visit_expr(cond);
                    v.visit_block(body);
                },
                StmtKind::Repeat { count, body } => {
                    v.visit_expr(count);
                    v.visit_block(body);
                },
                StmtKind::Foreach { array, body } => {
                    v.visit_var_ref(array);
                    v.visit_block(body);
                },
                StmtKind::Return { value } => {
                    if let Some(value) = value {
                        v.visit_expr(value);
                    }
                },
                StmtKind::Break => {},
                StmtKind::Continue => {},
                StmtKind::Disable { target: _ } => {},
                StmtKind::Pragma(_) => {},
                StmtKind::JumpBlock(StmtJumpBlock { label: _, block }) => v.visit_block(block),
                StmtKind::JumpLabel(_) => {},
                StmtKind::JumpGo(_) => {},
            }
        }

        pub fn walk_expr<V>(v: &mut V, e: & $($mut)? Sp<Expr>)
        where V: ?Sized + $Visit,
        {
            match & $($mut)? e.value {
                Expr::Binop(a, _op, b) => {
                    v.visit_expr(a);
                    v.visit_expr(b);
                },
                Expr::Unop(_op, x) => v.visit_expr(x),
                Expr::LitInt { value: _ } => {},
                Expr::Var(var) => v.visit_var_ref(var),
            }
        }
    };
}

macro_rules! impl_visitable {
    ($Node:ty, $visit_node:ident) => {
        impl Visitable for $Node {
            fn visit_with<V: Visit>(&self, v: &mut V) { <V as Visit>::$visit_node(v, self) }
            fn visit_mut_with<V: VisitMut>(&mut self, v: &mut V) { <V as VisitMut>::$visit_node(v, self) }
        }
    }
}

impl_visitable!(Netlist, visit_netlist);
impl_visitable!(Sp<Module>, visit_module);
impl_visitable!(Sp<Item>, visit_item);
impl_visitable!(Block, visit_block);
impl_visitable!(Sp<Stmt>, visit_stmt);
impl_visitable!(Sp<Expr>, visit_expr);

impl Visitable for [Sp<Stmt>] {
    fn visit_with<V: Visit>(&self, v: &mut V) {
        self.iter().for_each(|stmt| <V as Visit>::visit_stmt(v, stmt))
    }
    fn visit_mut_with<V: VisitMut>(&mut self, v: &mut V) {
        self.iter_mut().for_each(|stmt| <V as VisitMut>::visit_stmt(v, stmt))
    }
}

mod mut_ {
    use super::*;
    generate_visitor_stuff!(VisitMut, mut);
}
pub use self::mut_::{
    VisitMut,
    walk_netlist as walk_netlist_mut,
    walk_module as walk_module_mut,
    walk_item as walk_item_mut,
    walk_block as walk_block_mut,
    walk_stmt as walk_stmt_mut,
    walk_expr as walk_expr_mut,
};
mod ref_ {
    use super::*;
    generate_visitor_stuff!(Visit);
}
pub use self::ref_::{
    Visit, walk_netlist, walk_module, walk_item, walk_block, walk_stmt, walk_expr,
};
