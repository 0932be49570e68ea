//! Source code locations.

pub type FileId = Option<std::num::NonZeroU32>;
pub use codespan::ByteIndex as BytePos;

pub use span::{Sp, Span, HasSpan};
#[macro_use] mod span;

pub use source_map::Files;
mod source_map;
