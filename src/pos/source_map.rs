use std::num::NonZeroU32;
use std::cell::RefCell;
use std::rc::Rc;

use codespan_reporting::{files as cs_files};

use crate::pos::FileId;

/// An implementation of [`codespan_reporting::files::Files`] for `silica`.
///
/// This is the type responsible for keeping track of source text so that snippets can be displayed
/// in diagnostic error messages.
#[derive(Debug, Clone)]
pub struct Files {
    inner: RefCell<FilesImpl>,
}

#[derive(Debug, Clone)]
struct FilesImpl {
    files: cs_files::SimpleFiles<String, Rc<str>>,
}

impl Files {
    pub fn new() -> Self { Files { inner: RefCell::new(FilesImpl {
        files: cs_files::SimpleFiles::new(),
    }) } }

    /// Add a piece of source text to the database, and give it a name (usually a filepath)
    /// which will appear in error messages.
    ///
    /// The name does not need to be a valid path or even unique; for instance, it is common to use
    /// the name `"<input>"` for source text not associated with any file.
    pub fn add(&self, name: &str, source: &str) -> FileId {
        let rc_source: Rc<str> = source.into();

        let mut inner = self.inner.borrow_mut();
        Self::shift_file_id(inner.files.add(name.to_owned(), rc_source))
    }

    fn unshift_file_id(file_id: FileId) -> Result<usize, cs_files::Error> {
        // produce Error on file_id = None; such spans aren't fit for diagnostics
        let file_id: u32 = file_id.ok_or(cs_files::Error::FileMissing)?.into();
        Ok(file_id as usize - 1)
    }

    fn shift_file_id(file_id: usize) -> FileId {
        NonZeroU32::new(file_id as u32 + 1)
    }
}

impl Default for Files {
    fn default() -> Self { Files::new() }
}

impl<'a> cs_files::Files<'a> for Files {
    type FileId = FileId;
    type Name = String;
    type Source = Rc<str>;

    // Just delegate everything
    fn name(&self, file_id: FileId) -> Result<String, cs_files::Error> {
        self.inner.borrow().files.name(Self::unshift_file_id(file_id)?)
    }

    fn source(&self, file_id: FileId) -> Result<Rc<str>, cs_files::Error> {
        Ok(self.inner.borrow().files.get(Self::unshift_file_id(file_id)?)?.source().clone())
    }

    fn line_index(&self, file_id: FileId, byte_index: usize) -> Result<usize, cs_files::Error> {
        self.inner.borrow().files.line_index(Self::unshift_file_id(file_id)?, byte_index)
    }
    fn line_range(&self, file_id: FileId, line_index: usize) -> Result<std::ops::Range<usize>, cs_files::Error> {
        self.inner.borrow().files.line_range(Self::unshift_file_id(file_id)?, line_index)
    }
}
