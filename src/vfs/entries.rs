//! Prefix-filtered listing of an archive's entry table.
//!
//! # Invariants
//! - The entry table is iterated to exhaustion; there is no early exit.
//! - Entry names match the prefix with or without one leading separator.
//! - Directory-marker entries are never returned; their children are still
//!   matched by the name-prefix test against file entries.

use std::io::{self, Read};

use tracing::trace;

use crate::vfs::zipstream::ZipStream;

/// List the entry names under `path`, in the physical order of the archive's
/// entry table. No sorting is performed; duplicates pass through.
///
/// `path` is matched with a leading and trailing separator inserted when
/// absent, so a prefix of `"foo"` matches as `"/foo/"`. Returned names have
/// the single leading separator trimmed.
pub fn list_entries<R: Read>(zip: &mut ZipStream<R>, path: &str) -> io::Result<Vec<String>> {
    let mut prefix = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        prefix.push('/');
    }
    prefix.push_str(path);
    if !prefix.ends_with('/') {
        prefix.push('/');
    }

    let mut resources = Vec::new();
    while let Some(entry) = zip.next_entry()? {
        if entry.is_dir {
            continue;
        }
        let name = if entry.name.starts_with('/') {
            entry.name
        } else {
            format!("/{}", entry.name)
        };
        if name.starts_with(&prefix) {
            trace!(name = %name, "found resource");
            resources.push(name[1..].to_string());
        }
    }
    Ok(resources)
}
