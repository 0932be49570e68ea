//! `silica`: compiler front-end passes for translating Verilog into a simulation model.
//!
//! This crate currently covers the mid-end stage that runs after name binding: structured,
//! non-local control flow (`return`, `break`, `continue`, `disable`, `repeat`, `do while`)
//! is normalized into a uniform forward-jump representation that the later scheduling and
//! code generation stages consume.  See [`passes::lower_jumps`] for the entry point and
//! [`passes::link_jump`] for the details.

#[macro_use]
mod util_macros;

pub use pos::{Files, Sp, Span};
#[macro_use]
pub mod pos;

pub use diagnostic::{Diagnostic, DiagnosticEmitter};
pub mod diagnostic;

pub use error::{CompileError, ErrorReported};
pub mod error;

pub use ident::{Ident, ParseIdentError};
pub mod ident;

pub mod resolve;

pub mod value;

pub use context::CompilerContext;
pub mod context;

pub mod ast;

pub mod passes;
