//! Enclosing-archive resolution.
//!
//! # Algorithm
//! - Phase 1: repeatedly reinterpret the locator's path component as a
//!   locator of its own. Hosting runtimes nest locators, where the "file"
//!   segment is itself a fully-formed locator pointing deeper; the loop keeps
//!   the last successful parse and is bounded by
//!   `WalkConfig::max_nested_unwrap`.
//! - Phase 2: truncate the canonical string immediately after the last
//!   occurrence of the archive filename suffix and validate the candidate by
//!   signature sniffing. On failure, fall back to interpreting the
//!   candidate's path as a literal filesystem path, percent-encoding it when
//!   the literal name does not exist (some runtimes URL-encode file names).
//!
//! # Invariants
//! - Truncation is idempotent: re-running phase 2 on its own output yields
//!   the same string.
//! - Parse failures while constructing candidates mean "not found" for that
//!   candidate; they never propagate.

use std::path::Path;

use memchr::memmem;
use tracing::{debug, trace};

use crate::vfs::config::WalkConfig;
use crate::vfs::locator::Locator;
use crate::vfs::sniff;

/// Archive filename suffix isolated in phase 2. Truncation occurs
/// immediately after its last character.
pub const ARCHIVE_SUFFIX: &str = ".jar";

/// Resolve the locator of the archive container enclosing `locator`, if any.
///
/// Returns `None` when the locator does not sit inside an archive or the
/// candidate container cannot be validated.
pub fn find_enclosing_archive(locator: &Locator, config: &WalkConfig) -> Option<Locator> {
    debug!(locator = %locator, "finding enclosing archive");

    // Phase 1: nested-locator unwrapping.
    let mut current = locator.clone();
    for _ in 0..config.max_nested_unwrap {
        match Locator::try_parse(current.path()) {
            Some(inner) => {
                trace!(inner = %inner, "inner locator");
                current = inner;
            }
            None => break,
        }
    }

    // Phase 2: archive-suffix isolation.
    let raw = current.as_str();
    let index = memmem::rfind(raw.as_bytes(), ARCHIVE_SUFFIX.as_bytes())?;
    let truncated = &raw[..index + ARCHIVE_SUFFIX.len()];
    debug!(candidate = truncated, "extracted archive locator");

    let candidate = Locator::try_parse(truncated)?;
    if sniff::is_archive(&candidate) {
        return Some(candidate);
    }

    // The candidate's path may name a real file directly, possibly with a
    // percent-encoded name on disk.
    let mut fs_path = candidate.path().to_string();
    if !Path::new(&fs_path).exists() {
        fs_path = percent_encode_path(&fs_path);
    }
    if Path::new(&fs_path).exists() {
        trace!(path = %fs_path, "trying literal file");
        let file_locator = Locator::try_parse(&format!("file:{fs_path}"))?;
        if sniff::is_archive(&file_locator) {
            return Some(file_locator);
        }
    }

    debug!(candidate = truncated, "not an archive");
    None
}

/// Percent-encode every byte outside the unreserved set, keeping `/`.
fn percent_encode_path(path: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(path.len());
    for &b in path.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~' | b'/') {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0f) as usize] as char);
        }
    }
    out
}
