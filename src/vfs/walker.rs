//! Recursive resource walker.
//!
//! # Scope
//! The sole public listing entry point: compose enclosing-archive
//! resolution, signature sniffing, entry listing, speculative line recovery,
//! and native directory fallback into one bounded best-effort algorithm.
//!
//! # Invariants
//! - Every returned path is prefixed by the caller-supplied logical path.
//! - Stream handles never outlive the operation that opened them.
//! - Recovery is all-or-nothing per stream: one unresolvable line discards
//!   the whole accumulated child list.
//!
//! # Design Notes
//! - A deeper recursive failure propagates immediately; no partial
//!   aggregation of sibling results is attempted.

use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, trace};

use crate::vfs::config::{WalkConfig, WalkConfigError};
use crate::vfs::enclosing::find_enclosing_archive;
use crate::vfs::entries::list_entries;
use crate::vfs::locator::Locator;
use crate::vfs::probe::ResourceProbe;
use crate::vfs::sniff;
use crate::vfs::zipstream::ZipStream;

/// Join a child name onto a logical path; an empty parent yields the bare
/// child name.
pub fn join_logical(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

/// The hierarchical resource walker.
///
/// Stateless between calls: each `list` invocation re-resolves everything
/// from the locator, and concurrent calls share nothing mutable.
pub struct Walker<P> {
    config: WalkConfig,
    probe: P,
}

impl<P: ResourceProbe> Walker<P> {
    pub fn new(config: WalkConfig, probe: P) -> Result<Self, WalkConfigError> {
        config.validate()?;
        Ok(Self { config, probe })
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Produce every descendant resource name under `path`, resolving
    /// through `locator`.
    pub fn list(&self, locator: &Locator, path: &str) -> io::Result<Vec<String>> {
        // An entry inside an archive: the container's entry table is already
        // exhaustive for the subtree, so no recursion is needed.
        if let Some(archive) = find_enclosing_archive(locator, &self.config) {
            debug!(locator = %locator, archive = %archive, "listing via enclosing archive");
            let stream = archive.open()?;
            let mut zip = ZipStream::new(stream);
            return list_entries(&mut zip, path);
        }

        let children = self.immediate_children(locator, path)?;
        let mut resources = Vec::with_capacity(children.len());
        for child in children {
            let child_path = join_logical(path, &child);
            let child_locator = locator
                .join(&child)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            resources.push(child_path.clone());
            resources.extend(self.list(&child_locator, &child_path)?);
        }
        Ok(resources)
    }

    /// Determine the immediate children of `locator`, trying in order: raw
    /// archive-entry iteration, speculative line recovery, and native
    /// directory listing.
    fn immediate_children(&self, locator: &Locator, path: &str) -> io::Result<Vec<String>> {
        match locator.open() {
            Ok(stream) => {
                if sniff::is_archive(locator) {
                    // Some hosting runtimes serve an archive stream even when
                    // the locator itself does not name a container; every
                    // entry name is a candidate child.
                    debug!(locator = %locator, "listing raw archive entries");
                    let mut zip = ZipStream::new(stream);
                    let mut children = Vec::new();
                    while let Some(entry) = zip.next_entry()? {
                        trace!(entry = %entry.name, "archive entry");
                        children.push(entry.name);
                    }
                    return Ok(children);
                }
                let children = self.recover_from_lines(stream, path)?;
                if children.is_empty() {
                    if let Some(listed) = self.native_directory_listing(locator)? {
                        return Ok(listed);
                    }
                }
                Ok(children)
            }
            // Some environments refuse to open streams on directories even
            // though the directory exists and is listable directly.
            Err(e) if locator.scheme() == "file" && is_directory_open_failure(&e) => {
                Ok(self.native_directory_listing(locator)?.unwrap_or_default())
            }
            Err(e) => Err(e),
        }
    }

    /// Speculative line recovery: treat each text line of the stream as a
    /// candidate child name and verify it through the probe.
    ///
    /// All-or-nothing: if any line fails to resolve, the stream was ordinary
    /// content rather than a child listing, and the whole list is discarded.
    fn recover_from_lines(&self, stream: Box<dyn Read>, path: &str) -> io::Result<Vec<String>> {
        let reader = BufReader::new(stream);
        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                // Binary content or a directory stream is not a child
                // listing; abandon recovery rather than failing the call.
                Err(e) if is_recovery_abort(&e) => {
                    lines.clear();
                    break;
                }
                Err(e) => return Err(e),
            };
            trace!(line = %line, "reader entry");
            let candidate = join_logical(path, &line);
            lines.push(line);
            if self.probe.resolve(&candidate).is_empty() {
                lines.clear();
                break;
            }
        }
        Ok(lines)
    }

    /// Immediate child names of a `file` locator's directory, or `None` when
    /// the locator is not a listable directory.
    fn native_directory_listing(&self, locator: &Locator) -> io::Result<Option<Vec<String>>> {
        if locator.scheme() != "file" {
            return Ok(None);
        }
        let dir = Path::new(locator.path());
        if !dir.is_dir() {
            return Ok(None);
        }
        debug!(dir = %dir.display(), "listing directory");
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        if self.config.sort_directory_entries {
            names.sort();
        }
        Ok(Some(names))
    }
}

fn is_directory_open_failure(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::IsADirectory
    )
}

fn is_recovery_abort(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::InvalidData | io::ErrorKind::IsADirectory
    )
}
