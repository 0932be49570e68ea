use thiserror::Error;
use lazy_static::lazy_static;
use regex::Regex;

use crate::pos::Sp;

/// An identifier.
///
/// Identifiers follow the shape of simple (non-escaped) Verilog identifiers: an ASCII letter
/// or underscore followed by letters, digits, underscores and `$`.
///
/// There are no other restrictions.  Notably, identifiers constructed for internal use are
/// permitted to clash with keywords; compiler-generated names use a `__V` prefix to stay out
/// of the way of user code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ident {
    ident: String,
}

#[derive(Debug, Error)]
pub enum ParseIdentError {
    #[error("identifier is empty")]
    Empty,
    #[error("invalid identifier {0:?}")]
    InvalidIdent(String),
}

impl std::str::FromStr for Ident {
    type Err = ParseIdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            // '$' is legal in an identifier, but not as the first character
            static ref VALID_IDENT_RE: Regex = Regex::new("^[A-Za-z_][A-Za-z0-9_$]*$").unwrap();
        }
        if s.is_empty() {
            return Err(ParseIdentError::Empty);
        }
        if !VALID_IDENT_RE.is_match(s) {
            return Err(ParseIdentError::InvalidIdent(s.to_string()));
        }
        Ok(Ident { ident: s.to_string() })
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, s: &str) -> bool { self.ident == s }
}

impl PartialEq<str> for Sp<Ident> {
    fn eq(&self, s: &str) -> bool { self.ident == s }
}

impl PartialEq<Ident> for str {
    fn eq(&self, s: &Ident) -> bool { s == self }
}

impl PartialEq<Sp<Ident>> for str {
    fn eq(&self, s: &Sp<Ident>) -> bool { s == self }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str { &self.ident }
}

impl std::borrow::Borrow<str> for Ident {
    fn borrow(&self) -> &str { &self.ident }
}

impl std::borrow::Borrow<str> for Sp<Ident> {
    fn borrow(&self) -> &str { &self.ident }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", &self.ident[..])
    }
}
