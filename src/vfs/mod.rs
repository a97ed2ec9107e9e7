//! Locator-driven resource resolution and listing.
//!
//! # Scope
//! This module defines the public contract for resource listing:
//! configuration, the locator model, archive signature sniffing, sequential
//! ZIP entry iteration, enclosing-archive resolution, existence probing, and
//! the recursive walker that composes them.
//!
//! # Design Notes
//! - All I/O is synchronous and blocking; concurrency safety comes from the
//!   complete absence of shared mutable state, not from locking.
//! - Streams are opened per operation and dropped before returning.

pub mod config;
pub mod enclosing;
pub mod entries;
pub mod locator;
pub mod probe;
pub mod sniff;
pub mod walker;
pub mod zipstream;

pub use config::{WalkConfig, WalkConfigError};
pub use enclosing::{find_enclosing_archive, ARCHIVE_SUFFIX};
pub use entries::list_entries;
pub use locator::{Locator, LocatorError};
pub use probe::{package_to_path, ResourceProbe, RootsProbe};
pub use sniff::{is_archive, is_archive_stream, is_archive_with_buf, ZIP_MAGIC};
pub use walker::{join_logical, Walker};
pub use zipstream::{ZipEntry, ZipStream};
