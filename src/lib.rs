//! Resource listing across directories, ZIP archives, and opaque locators.
//!
//! ## Scope
//! This crate answers one question: given a resource locator (scheme + path)
//! and a logical path prefix, what is the full recursive set of resource
//! names under that prefix? The underlying storage may be a plain directory,
//! a ZIP-format archive, or a hosting-runtime stream with no native
//! directory-listing capability at all.
//!
//! ## Key invariants
//! - Every stream handle is scoped to the smallest enclosing operation and is
//!   released on every exit path before control returns.
//! - Every returned name is under the caller-supplied prefix; the walker
//!   never escapes the requested subtree.
//! - Nothing is cached: every call re-resolves from the locator.
//!
//! ## Listing flow (single call)
//! 1) Resolve the archive container enclosing the locator, if any, and list
//!    its entry table under the prefix.
//! 2) Otherwise sniff the locator itself for the ZIP signature and collect
//!    raw entry names as children.
//! 3) Otherwise attempt speculative line recovery: treat each text line of
//!    the stream as a candidate child and verify it through the resource
//!    probe, all-or-nothing.
//! 4) Fall back to native directory listing for `file` locators.
//! 5) Recurse into each discovered child.
//!
//! ## Notable entry points
//! - [`Walker`] / [`Walker::list`]: the listing engine.
//! - [`Locator`]: scheme + path reference with stream opening.
//! - [`ResourceProbe`] / [`RootsProbe`]: logical-path existence resolution.
//! - [`find_enclosing_archive`]: locator-rewriting archive discovery.

pub mod vfs;

pub use vfs::config::{WalkConfig, WalkConfigError};
pub use vfs::enclosing::{find_enclosing_archive, ARCHIVE_SUFFIX};
pub use vfs::entries::list_entries;
pub use vfs::locator::{Locator, LocatorError};
pub use vfs::probe::{package_to_path, ResourceProbe, RootsProbe};
pub use vfs::sniff::{is_archive, is_archive_stream, is_archive_with_buf, ZIP_MAGIC};
pub use vfs::walker::{join_logical, Walker};
pub use vfs::zipstream::{ZipEntry, ZipStream};
