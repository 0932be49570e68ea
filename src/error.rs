use crate::diagnostic::{Diagnostic, IntoDiagnostics};

/// An error type that is intended to be pretty-printed through [`codespan_reporting`].
///
/// A [`CompileError`] may contain multiple errors.  It may even contain no errors!  This can
/// happen if errors were already emitted.  Even a [`CompileError`] with no errors should be
/// treated as a "failure".  (if you want to create an accumulator of errors where having no
/// errors is considered to be a success, see [`ErrorStore`]).
///
/// **Do not use this type to hold non-fatal diagnostics.**
/// Use [`Vec<Diagnostic>`][`Diagnostic`] instead.
#[derive(thiserror::Error, Debug, Clone)]
#[must_use = "A CompileError must be emitted or it will not be seen!"]
#[error("a diagnostic wasn't formatted. This is a bug! The diagnostic was: {:?}", .diagnostics)]
pub struct CompileError {
    diagnostics: Vec<Diagnostic>,
}

/// A dummy error type with no payload.
///
/// This type is returned by [`DiagnosticEmitter::emit`] for potential use as an error type.
/// More generally, this could be used by any function that "emits" its errors through some form of side effect.
///
/// This type very deliberately does not implement [`std::error::Error`] or [`std::fmt::Display`].
///
/// [`DiagnosticEmitter::emit`]: crate::diagnostic::DiagnosticEmitter::emit
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[must_use = "When reporting an error, you usually also want to return Err.  Call `.ignore()` to explicitly ignore."]
pub struct ErrorReported;

impl ErrorReported {
    /// Explicitly drop this [`ErrorReported`] value.
    ///
    /// This is like `let _ = ...` or `drop(...)`, but as a named method that helps clarify intent (and that would
    /// stop compiling by design if a refactoring changed the error to a different type that actually contained
    /// a payload).
    pub fn ignore(self) {}
}

impl CompileError {
    /// Create an empty [`CompileError`].  Even an empty [`CompileError`] is still an error!
    pub fn new() -> CompileError {
        CompileError { diagnostics: vec![] }
    }

    pub fn append(&mut self, mut other: CompileError) {
        self.diagnostics.append(&mut other.diagnostics);
    }

    /// Zips two CompileError results, combining the errors if they both fail.
    pub fn join<A, B>(a: Result<A, CompileError>, b: Result<B, CompileError>) -> Result<(A, B), CompileError> {
        match (a, b) {
            (Ok(a), Ok(b)) => Ok((a, b)),
            (Err(e), Ok(_)) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Err(mut a), Err(b)) => {
                a.append(b);
                Err(a)
            },
        }
    }
}

impl Default for CompileError {
    fn default() -> Self { CompileError::new() }
}

/// Error type used by parts of the codebase that don't have access to spans.
///
/// These parts of the codebase use `anyhow` to produce a single, fatal error message that may
/// include a chain of context.  This is always ultimately converted into a [`CompileError`]
/// shortly before being displayed to the user.
pub type SimpleError = anyhow::Error;

// -------------------------

/// An accumulator for errors that provides a straightforward way of converting to
/// a `Result<T, CompileError>` based on whether any errors have occurred.
#[derive(Debug, Clone)]
pub struct ErrorStore<E = CompileError> {
    errors: Option<E>,
}

pub trait ErrorMerge {
    fn err_merge_append(&mut self, new_error: Self);
}

impl ErrorMerge for CompileError { fn err_merge_append(&mut self, new: CompileError) { self.append(new) } }
impl ErrorMerge for ErrorReported { fn err_merge_append(&mut self, _: ErrorReported) {} }

impl<E: ErrorMerge> ErrorStore<E> {
    /// Create an [`ErrorStore`] in the default, 'success' state.
    pub fn new() -> Self { ErrorStore { errors: None } }

    /// Force this [`ErrorStore`] into the error state and add data from a new error.
    pub fn append(&mut self, new_error: E) {
        self.errors = match self.errors.take() {
            Some(mut errors) => {
                errors.err_merge_append(new_error);
                Some(errors)
            },
            None => Some(new_error),
        };
    }

    /// Become an `Ok` if empty, and an `Err` otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, E> {
        match self.errors {
            None => Ok(value),
            Some(error) => Err(error),
        }
    }
    pub fn into_result_with<T>(self, value: impl FnOnce() -> T) -> Result<T, E> {
        match self.errors {
            None => Ok(value()),
            Some(error) => Err(error),
        }
    }
}

impl<E: ErrorMerge> Default for ErrorStore<E> {
    fn default() -> Self { ErrorStore::new() }
}

// -------------------------

// needed by DiagnosticEmitter::emit
impl IntoDiagnostics for CompileError {
    fn into_diagnostics(self) -> Vec<Diagnostic> { self.diagnostics }
}

// -------------------------

impl From<Diagnostic> for CompileError {
    fn from(d: Diagnostic) -> Self { CompileError { diagnostics: vec![d] } }
}

impl From<Vec<Diagnostic>> for CompileError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self { CompileError { diagnostics } }
}

impl From<ErrorReported> for CompileError {
    fn from(_: ErrorReported) -> Self { CompileError { diagnostics: vec![] } }
}

impl From<anyhow::Error> for CompileError {
    fn from(e: anyhow::Error) -> CompileError {
        error!(message("{:#}", e)).into()
    }
}

// -------------------------

/// Trait for running an iterator and continuing after an `Err` to collect more errors.
pub trait GatherErrorIteratorExt {
    type OkItem;
    type Err;

    /// Collect an iterator, continuing after failure in order to gather more errors.
    ///
    /// If at least one of the items is `Err(_)`, it returns an `Err(_)` that concatenates all
    /// of the errors in the stream.  Otherwise, it returns `Ok(_)`.
    fn collect_with_recovery<B: std::iter::FromIterator<Self::OkItem>>(self) -> Result<B, Self::Err>;
}

impl<Ts, T, E> GatherErrorIteratorExt for Ts
where
    Ts: Iterator<Item=Result<T, E>>,
    E: ErrorMerge,
{
    type OkItem = T;
    type Err = E;

    fn collect_with_recovery<B: std::iter::FromIterator<T>>(self) -> Result<B, E> {
        let mut errors = ErrorStore::new();
        let out = self.filter_map(|r| match r {
            Ok(x) => Some(x),
            Err(e) => {
                errors.append(e);
                None
            },
        }).collect();

        errors.into_result(out)
    }
}

#[test]
fn test_collect_with_recovery() {
    // straightforward usage
    let result = (0..10).map(|x| match x % 2 {
        0 => Ok(x),
        1 => Err(error!(message("odd number: {}", x)).into()),
        _ => unreachable!(),
    }).collect_with_recovery::<Vec<_>>();
    let err: CompileError = result.unwrap_err();
    assert_eq!(err.diagnostics.len(), 5);

    // collecting into () for side-effects
    let mut vec = vec![];
    let result = (0..10).map(|x| match x % 2 {
        0 => {
            vec.push(x);
            Ok(())
        },
        1 => Err(error!(message("odd number: {}", x)).into()),
        _ => unreachable!(),
    }).collect_with_recovery::<()>();
    assert_eq!(vec, vec![0, 2, 4, 6, 8]);
    let err: CompileError = result.unwrap_err();
    assert_eq!(err.diagnostics.len(), 5);
}
