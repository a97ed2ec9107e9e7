//! End-to-end listing scenarios.
//!
//! # Scope
//! These tests exercise the full walker against on-disk fixtures: plain
//! directory trees, ZIP archives reached directly and through entry
//! locators, and text streams driving speculative line recovery.
//!
//! # Assumptions
//! - Native directory listings are sorted (the default configuration).
//! - Fixtures are authored with the `zip` crate; the walker only ever reads.

use std::io::Write;
use std::path::Path;

use tempfile::TempDir;
use vfslist::{Locator, ResourceProbe, RootsProbe, WalkConfig, Walker};

/// Probe that never resolves anything.
struct NoProbe;

impl ResourceProbe for NoProbe {
    fn resolve(&self, _path: &str) -> Vec<Locator> {
        Vec::new()
    }
}

fn file_locator(path: &Path) -> Locator {
    Locator::parse(&format!("file:{}", path.display())).unwrap()
}

fn write_scenario_jar(path: &Path) {
    let f = std::fs::File::create(path).unwrap();
    let mut zw = zip::ZipWriter::new(f);
    let opts = zip::write::FileOptions::default();
    zw.start_file("pkg/X.class", opts).unwrap();
    zw.write_all(b"class-bytes").unwrap();
    zw.add_directory("pkg/sub", opts).unwrap();
    zw.start_file("pkg/sub/Y.class", opts).unwrap();
    zw.write_all(b"more-bytes").unwrap();
    zw.finish().unwrap();
}

#[test]
fn directory_tree_lists_recursively() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"alpha\n").unwrap();
    std::fs::write(dir.path().join("b.txt"), b"beta\n").unwrap();
    std::fs::create_dir(dir.path().join("c")).unwrap();
    std::fs::write(dir.path().join("c/d.txt"), b"delta\n").unwrap();

    let walker = Walker::new(WalkConfig::default(), NoProbe).unwrap();
    let got = walker.list(&file_locator(dir.path()), "").unwrap();
    assert_eq!(got, ["a.txt", "b.txt", "c", "c/d.txt"]);
}

#[test]
fn directory_tree_lists_under_logical_prefix() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("one.txt"), b"1").unwrap();

    let walker = Walker::new(WalkConfig::default(), NoProbe).unwrap();
    let got = walker.list(&file_locator(dir.path()), "com/example").unwrap();
    assert_eq!(got, ["com/example/one.txt"]);
}

#[test]
fn archive_listing_filters_prefix_and_directory_markers() {
    let dir = TempDir::new().unwrap();
    let jar = dir.path().join("app.jar");
    write_scenario_jar(&jar);

    let walker = Walker::new(WalkConfig::default(), NoProbe).unwrap();
    let got = walker.list(&file_locator(&jar), "pkg").unwrap();
    assert_eq!(got, ["pkg/X.class", "pkg/sub/Y.class"]);
}

#[test]
fn archive_entry_locator_lists_the_container() {
    let dir = TempDir::new().unwrap();
    let jar = dir.path().join("app.jar");
    write_scenario_jar(&jar);

    let loc = Locator::parse(&format!("jar:file:{}!/pkg/X.class", jar.display())).unwrap();
    let walker = Walker::new(WalkConfig::default(), NoProbe).unwrap();
    let got = walker.list(&loc, "pkg").unwrap();
    assert_eq!(got, ["pkg/X.class", "pkg/sub/Y.class"]);
}

#[test]
fn archive_without_known_suffix_yields_raw_entry_names() {
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("bundle.zip");
    write_scenario_jar(&zip_path);

    // No `.jar` suffix, so enclosing-archive resolution fails and the
    // signature-sniff branch iterates the table unfiltered, directory
    // markers included.
    let walker = Walker::new(WalkConfig::default(), NoProbe).unwrap();
    let got = walker.list(&file_locator(&zip_path), "").unwrap();
    assert_eq!(got, ["pkg/X.class", "pkg/sub/", "pkg/sub/Y.class"]);
}

#[test]
fn ordinary_text_stream_yields_empty_not_an_error() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "just some prose\nnot a listing\n").unwrap();

    let probe = RootsProbe::new(vec![file_locator(dir.path())]);
    let walker = Walker::new(WalkConfig::default(), probe).unwrap();
    let got = walker.list(&file_locator(&notes), "").unwrap();
    assert!(got.is_empty());
}

#[test]
fn line_listing_stream_recovers_children_via_probe() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("pkg")).unwrap();
    std::fs::write(dir.path().join("pkg/a.txt"), b"A").unwrap();
    std::fs::write(dir.path().join("pkg/b.txt"), b"B").unwrap();

    // A container-style stream listing child names one per line.
    let listing = dir.path().join("stream");
    std::fs::write(&listing, "a.txt\nb.txt\n").unwrap();

    let probe = RootsProbe::new(vec![file_locator(dir.path())]);
    let walker = Walker::new(WalkConfig::default(), probe).unwrap();
    let got = walker.list(&file_locator(&listing), "pkg").unwrap();
    assert_eq!(got, ["pkg/a.txt", "pkg/b.txt"]);
}

#[test]
fn recovery_failure_discards_every_line() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("pkg")).unwrap();
    std::fs::write(dir.path().join("pkg/a.txt"), b"A").unwrap();

    // "a.txt" resolves, "ghost.txt" does not: the whole list is discarded.
    let listing = dir.path().join("stream");
    std::fs::write(&listing, "a.txt\nghost.txt\n").unwrap();

    let probe = RootsProbe::new(vec![file_locator(dir.path())]);
    let walker = Walker::new(WalkConfig::default(), probe).unwrap();
    let got = walker.list(&file_locator(&listing), "pkg").unwrap();
    assert!(got.is_empty());
}

#[test]
fn nested_archive_in_directory_is_not_descended() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("readme.txt"), b"hello\n").unwrap();
    write_scenario_jar(&dir.path().join("lib.jar"));

    // The jar child resolves to itself as an enclosing archive; its entries
    // do not carry the `lib.jar` logical prefix, so none are listed under it.
    let walker = Walker::new(WalkConfig::default(), NoProbe).unwrap();
    let got = walker.list(&file_locator(dir.path()), "").unwrap();
    assert_eq!(got, ["lib.jar", "readme.txt"]);
}
