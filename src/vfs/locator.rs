//! Resource locator model.
//!
//! # Invariants
//! - A locator is immutable once constructed; rewriting produces a new value.
//! - `try_parse` is side-effect free, so repeated failed attempts are safe to
//!   retry-and-abort (the unwrap loop in enclosing-archive resolution relies
//!   on this).
//!
//! # Design Notes
//! - The scheme is validated syntactically only; there is no protocol
//!   registry. Opening a stream is where unsupported schemes surface.
//! - Archive-entry locators use the `jar:<container>!/<entry>` form; opening
//!   one streams the enclosing container up to the named entry.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};

use crate::vfs::zipstream::ZipStream;

/// Separator between the container locator and the entry name in an
/// archive-entry locator.
pub const ENTRY_SEPARATOR: &str = "!/";

/// An opaque, string-serializable reference to a resource.
///
/// A locator carries a scheme and a path component and supports exactly two
/// operations: opening a byte stream positioned at its start, and producing
/// its canonical string form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locator {
    raw: String,
    scheme_len: usize,
}

impl Locator {
    /// Parse a locator from its canonical `scheme:path` form.
    pub fn parse(s: &str) -> Result<Self, LocatorError> {
        let colon = match s.find(':') {
            Some(i) => i,
            None => return Err(LocatorError::MissingScheme),
        };
        let scheme = &s[..colon];
        if !is_valid_scheme(scheme) {
            return Err(LocatorError::InvalidScheme);
        }
        Ok(Self {
            raw: s.to_string(),
            scheme_len: colon,
        })
    }

    /// Parse, discarding the failure reason.
    ///
    /// This is the reinterpretation primitive used by the nested-locator
    /// unwrap loop: a parse failure is the loop's termination signal, never
    /// an error.
    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    /// The scheme component, without the trailing colon.
    pub fn scheme(&self) -> &str {
        &self.raw[..self.scheme_len]
    }

    /// The path component: everything after the first colon.
    pub fn path(&self) -> &str {
        &self.raw[self.scheme_len + 1..]
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Produce a child locator by appending `child` to this locator's
    /// canonical form, inserting a separator unless one is already present.
    pub fn join(&self, child: &str) -> Result<Self, LocatorError> {
        let mut s = String::with_capacity(self.raw.len() + 1 + child.len());
        s.push_str(&self.raw);
        if !s.ends_with('/') {
            s.push('/');
        }
        s.push_str(child);
        Self::parse(&s)
    }

    /// Open a byte stream positioned at the start of the resource.
    ///
    /// `file` locators open the filesystem path directly. Archive-entry
    /// locators (`jar:`) stream the enclosing container sequentially until
    /// the named entry is found and yield its decompressed bytes. Any other
    /// scheme fails with `ErrorKind::Unsupported`.
    pub fn open(&self) -> io::Result<Box<dyn Read>> {
        match self.scheme() {
            "file" => Ok(Box::new(File::open(self.path())?)),
            "jar" => self.open_archive_entry(),
            other => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported locator scheme: {other}"),
            )),
        }
    }

    fn open_archive_entry(&self) -> io::Result<Box<dyn Read>> {
        let (container, entry) = match self.path().split_once(ENTRY_SEPARATOR) {
            Some(parts) => parts,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("archive-entry locator missing `!/`: {}", self.raw),
                ))
            }
        };
        let container = Locator::parse(container)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let stream = container.open()?;
        let mut zip = ZipStream::new(stream);
        let want = entry.trim_start_matches('/');
        while let Some(found) = zip.next_entry()? {
            if found.name.trim_start_matches('/') == want {
                let bytes = zip.read_entry_bytes()?;
                return Ok(Box::new(Cursor::new(bytes)));
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such archive entry: {entry}"),
        ))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Scheme syntax per RFC 3986: one ASCII letter, then letters, digits,
/// `+`, `-`, or `.`.
fn is_valid_scheme(scheme: &str) -> bool {
    let mut bytes = scheme.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
}

/// Parse failure for a locator string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocatorError {
    /// No colon separator present.
    MissingScheme,
    /// The text before the first colon is not a valid scheme.
    InvalidScheme,
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorError::MissingScheme => write!(f, "locator has no scheme separator"),
            LocatorError::InvalidScheme => write!(f, "locator scheme is not valid"),
        }
    }
}

impl std::error::Error for LocatorError {}
