//! Logical-path existence resolution.
//!
//! # Scope
//! The speculative line-recovery fallback needs an answer to "does at least
//! one resource exist at logical path P?". That capability belongs to the
//! hosting environment, so it is a trait here; `RootsProbe` is the bundled
//! implementation resolving against a fixed set of root locators,
//! classpath-style.
//!
//! # Design Notes
//! - Probing is best-effort: unreadable or unsupported roots contribute no
//!   matches rather than failing the probe.

use std::path::Path;

use crate::vfs::locator::Locator;
use crate::vfs::sniff;
use crate::vfs::zipstream::ZipStream;

/// Resolution of a logical path to the locators currently serving it.
///
/// An empty result means no resource exists at that path.
pub trait ResourceProbe {
    fn resolve(&self, path: &str) -> Vec<Locator>;
}

/// Resolves logical paths against a set of root locators.
///
/// Directory roots match by filesystem existence; archive roots match when
/// any entry name equals the path or sits under it.
pub struct RootsProbe {
    roots: Vec<Locator>,
}

impl RootsProbe {
    pub fn new(roots: Vec<Locator>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Locator] {
        &self.roots
    }

    fn resolve_in_root(&self, root: &Locator, path: &str) -> Option<Locator> {
        let path = path.trim_start_matches('/');
        if sniff::is_archive(root) {
            if archive_has_entry(root, path) {
                let raw = format!("jar:{}!/{}", root.as_str(), path);
                return Locator::try_parse(&raw);
            }
            return None;
        }
        if root.scheme() == "file" {
            let full = Path::new(root.path()).join(path);
            if full.exists() {
                return root.join(path).ok();
            }
        }
        None
    }
}

impl ResourceProbe for RootsProbe {
    fn resolve(&self, path: &str) -> Vec<Locator> {
        let mut matches = Vec::new();
        for root in &self.roots {
            if let Some(found) = self.resolve_in_root(root, path) {
                matches.push(found);
            }
        }
        matches
    }
}

/// Does the archive at `root` contain `path`, either as an entry name or as
/// an ancestor of one? Read failures mean "no".
fn archive_has_entry(root: &Locator, path: &str) -> bool {
    let stream = match root.open() {
        Ok(s) => s,
        Err(_) => return false,
    };
    let mut zip = ZipStream::new(stream);
    loop {
        match zip.next_entry() {
            Ok(Some(entry)) => {
                let name = entry.name.trim_start_matches('/').trim_end_matches('/');
                if name == path || name.strip_prefix(path).is_some_and(|r| r.starts_with('/')) {
                    return true;
                }
            }
            Ok(None) => return false,
            Err(_) => return false,
        }
    }
}

/// Convert a dotted package name to a logical path.
pub fn package_to_path(package: &str) -> String {
    package.replace('.', "/")
}
