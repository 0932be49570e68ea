
use std::fmt;
use std::cell::RefCell;
use std::any::Any;

use codespan_reporting as cs;
use cs::term::termcolor as tc;

use crate::error::ErrorReported;
use crate::pos::{Files, FileId, HasSpan};

type CsDiagnostic = cs::diagnostic::Diagnostic<FileId>;
type CsLabel = cs::diagnostic::Label<FileId>;

/// Builder pattern for a single diagnostic message (warning or error).
#[derive(Debug, Clone)]
#[must_use = "A Diagnostic must be emitted or it will not be seen!"]
pub struct Diagnostic {
    imp: CsDiagnostic,
}

impl Diagnostic {
    pub fn error() -> Self { Diagnostic { imp: CsDiagnostic::error() } }
    pub fn warning() -> Self { Diagnostic { imp: CsDiagnostic::warning() } }
    pub fn bug() -> Self { Diagnostic { imp: CsDiagnostic::bug() } }

    pub fn code(&mut self, code: String) -> &mut Self {
        self.imp.code = Some(code);
        self
    }

    pub fn message(&mut self, message: String) -> &mut Self {
        self.imp.message = message;
        self
    }

    /// Add a label of type 'primary'.
    pub fn primary(&mut self, span: impl HasSpan, message: String) -> &mut Self {
        let span = span.span();
        match span.file_id {
            Some(_) => self.imp.labels.push(CsLabel::primary(span.file_id, span).with_message(message)),
            // a label on generated code has no source to render; keep its text as a note
            None => self.imp.notes.push(message),
        }
        self
    }

    /// Add a label of type 'secondary'.
    pub fn secondary(&mut self, span: impl HasSpan, message: String) -> &mut Self {
        let span = span.span();
        match span.file_id {
            Some(_) => self.imp.labels.push(CsLabel::secondary(span.file_id, span).with_message(message)),
            None => self.imp.notes.push(message),
        }
        self
    }

    pub fn note(&mut self, message: String) -> &mut Self {
        self.imp.notes.push(message);
        self
    }
}

/// Trait for things that can be fed to [`DiagnosticEmitter::emit`].
pub trait IntoDiagnostics {
    fn into_diagnostics(self) -> Vec<Diagnostic>;
}

impl IntoDiagnostics for Diagnostic {
    fn into_diagnostics(self) -> Vec<Diagnostic> { vec![self] }
}

impl IntoDiagnostics for Vec<Diagnostic> {
    fn into_diagnostics(self) -> Vec<Diagnostic> { self }
}

// =============================================================================

/// Type responsible for emitting diagnostics and storing the metadata necessary to render them.
pub struct DiagnosticEmitter {
    files: Files,
    config: cs::term::Config,
    writer: Box<RefCell<dyn WriteError>>,
}

impl fmt::Debug for DiagnosticEmitter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DiagnosticEmitter")
            .field("files", &self.files)
            .field("config", &self.config)
            .field("writer", &(..))
            .finish()
    }
}

impl DiagnosticEmitter {
    fn from_writer<W: WriteError>(writer: W) -> Self {
        DiagnosticEmitter {
            files: Files::new(),
            config: default_term_config(),
            writer: Box::new(RefCell::new(writer)),
        }
    }

    /// Create a [`DiagnosticEmitter`] that writes diagnostics to the standard error stream.
    pub fn new_stderr() -> Self {
        Self::from_writer(tc::StandardStream::stderr(tc::ColorChoice::Auto))
    }

    /// Create a [`DiagnosticEmitter`] that captures diagnostic output which can be recovered
    /// by calling [`Self::get_captured_diagnostics`].
    pub fn new_captured() -> Self {
        let writer: CapturedWriter = tc::NoColor::new(vec![]);
        Self::from_writer(writer)
    }

    /// The source map used to render spans.  Sources must be registered here for labels
    /// against them to be displayable.
    pub fn files(&self) -> &Files { &self.files }

    pub fn emit(&self, errors: impl IntoDiagnostics) -> ErrorReported {
        // NOTE: we don't take an iterator because the iterator could call `.emit()` and lead to a runtime borrow conflict.
        for diag in errors.into_diagnostics() {
            let mut writer = self.writer.borrow_mut();
            cs::term::emit(writer.as_write_color(), &self.config, &self.files, &diag.imp)
                .unwrap_or_else(|fmt_err| {
                    panic!("Internal compiler error while formatting error:\n{:#?}\ncould not format error because: {}", diag.imp, fmt_err)
                });
        }
        ErrorReported
    }

    /// Obtain captured diagnostics, provided that this emitter was constructed using
    /// [`Self::new_captured`]. (otherwise, returns `None`)
    pub fn get_captured_diagnostics(&self) -> Option<String> {
        let writer = self.writer.borrow();
        let writer = writer.as_any().downcast_ref::<CapturedWriter>()?;

        Some(String::from_utf8_lossy(writer.get_ref()).into_owned())
    }
}

pub trait WriteError: tc::WriteColor + Any {
    fn as_any(&self) -> &dyn Any;
    fn as_write_color(&mut self) -> &mut dyn tc::WriteColor;
}

impl<T: tc::WriteColor + Any> WriteError for T {
    fn as_any(&self) -> &dyn Any { self }
    fn as_write_color(&mut self) -> &mut dyn tc::WriteColor { self }
}

fn default_term_config() -> cs::term::Config {
    let mut config = cs::term::Config::default();
    // Make output closer to rustc. Fewer colors overall, looks better.
    config.styles.primary_label_error.set_intense(true);
    config.styles.secondary_label.set_intense(true);
    config.styles.line_number.set_intense(true);
    config.styles.source_border.set_intense(true);
    config
}

type CapturedWriter = tc::NoColor<Vec<u8>>;
