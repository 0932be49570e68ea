use core::fmt;

use crate::pos::{BytePos, FileId};

/// Helper to wrap a value in [`Sp`]. It is recommended to use this in place of the type constructor.
///
/// * `sp!(span => value)` uses the given span.
/// * `sp!(value)` uses [`Span::NULL`], for nodes synthesized during lowering that have no
///   source text of their own.
///
/// ```
/// use silica::{sp, Sp, Span, ast::Expr};
///
/// let count: Sp<Expr> = sp!(Span::new(None, 3, 8) => Expr::LitInt { value: 2 });
/// assert_eq!(count.span, Span::new(None, 3, 8));
///
/// let one: Sp<Expr> = sp!(Expr::LitInt { value: 1 });
/// assert_eq!(one.span, Span::NULL);
/// ```
#[macro_export]
macro_rules! sp {
    ($span:expr => $expr:expr) => { $crate::Sp { span: $span, value: $expr } };
    ($expr:expr) => { $crate::Sp { span: $crate::pos::Span::NULL, value: $expr } };
}

/// Pattern for matching against [`Sp`].
///
/// * `sp_pat!(pat)` matches the value and ignores the span.
/// * `sp_pat!(span_pat => pat)` matches both.
#[macro_export]
macro_rules! sp_pat {
    ($span:pat => $pat:pat) => { $crate::Sp { span: $span, value: $pat } };
    ($pat:pat) => { $crate::Sp { value: $pat, span: _ } };
}

/// A region of HDL source text.
///
/// Every statement carries one of these so that diagnostics keep pointing at the construct
/// the user actually wrote, even after lowering has rewritten it out of existence.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: BytePos,
    pub end: BytePos,
    pub file_id: FileId,
}

impl Span {
    /// The span of code that was synthesized by the compiler rather than written by the user.
    ///
    /// Because it names no file, diagnostic labels against it cannot show a snippet;
    /// [`crate::diagnostic::Diagnostic`] demotes such labels to notes.
    pub const NULL: Span = Span { start: BytePos(0), end: BytePos(0), file_id: None };

    /// Create a new span from a starting and ending position.
    pub fn new(file_id: FileId, start: impl Into<BytePos>, end: impl Into<BytePos>) -> Span {
        let start = start.into();
        let end = end.into();
        assert!(end >= start);

        Span { file_id, start, end }
    }

    /// Combine two spans into the smallest region covering both.
    ///
    /// Lowering splices statements originating from different places into a single list, and
    /// the wrapper node it creates takes the combined extent.  Spans that cannot combine
    /// (different files, or a synthesized span mixed with a real one) fall back to whichever
    /// operand names a file, the first on a tie.
    pub fn merge(self, other: Span) -> Span {
        use std::cmp::{max, min};

        if self.file_id != other.file_id {
            return if self.file_id.is_some() { self } else { other };
        }
        Span {
            file_id: self.file_id,
            start: min(self.start, other.start),
            end: max(self.end, other.end),
        }
    }

    /// The zero-length span just past this one.  Jump labels land here: after everything
    /// the wrapped statements cover.
    pub fn end_span(self) -> Span {
        Span { file_id: self.file_id, start: self.end, end: self.end }
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> std::ops::Range<usize> {
        span.start.into()..span.end.into()
    }
}

// =============================================================================

/// An AST node together with the source region it came from.
///
/// This type generally tries to behave like `T`: it implements `Deref`, and the span takes
/// no part in comparisons, so whole lowered trees compare structurally in tests regardless
/// of where their pieces came from.
///
/// Use the [`sp!`][`sp`] macro to construct it.
pub struct Sp<T: ?Sized> {
    pub span: Span,
    pub value: T,
}

impl<T: Clone> Clone for Sp<T> {
    fn clone(&self) -> Self {
        Sp { span: self.span, value: self.value.clone() }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Sp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // delegate for the main body so it is affected by {:#?}
        fmt::Debug::fmt(&self.value, f)?;
        // synthesized nodes would otherwise clutter dumps with `@ 0..0` noise
        if self.span != Span::NULL {
            write!(f, " @ {}..{}", self.span.start.0, self.span.end.0)?;
        }
        Ok(())
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Sp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: ?Sized> std::ops::Deref for Sp<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: ?Sized> std::ops::DerefMut for Sp<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Sp<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", &self.value)
    }
}

// =============================================================================

/// Used by error macros to allow either an [`Sp`] or a [`Span`] to serve as a location.
pub trait HasSpan {
    fn span(&self) -> Span;
}

impl<T: ?Sized> HasSpan for Sp<T> {
    fn span(&self) -> Span { self.span }
}

impl HasSpan for Span {
    fn span(&self) -> Span { *self }
}

impl<T: ?Sized + HasSpan> HasSpan for &T {
    fn span(&self) -> Span { (**self).span() }
}

// =============================================================================
