//! Resource Listing CLI
//!
//! Lists every resource name reachable under a locator and logical path,
//! whether the storage is a plain directory, a ZIP-format archive, or an
//! archive-entry locator.
//!
//! # Output Format
//!
//! One resource name per line on stdout, in discovery order. Diagnostic
//! events go to stderr via `RUST_LOG` (for example `RUST_LOG=vfslist=trace`).
//!
//! # Exit Codes
//!
//! - `0`: Success (including an empty listing)
//! - `1`: I/O failure while listing
//! - `2`: Invalid arguments or configuration error

use std::env;
use std::io::{self, Write};
use std::process;

use tracing_subscriber::EnvFilter;

use vfslist::{Locator, RootsProbe, WalkConfig, Walker};

fn print_usage(exe: &std::ffi::OsStr) {
    eprintln!(
        "usage: {} [OPTIONS] <locator> [path]

ARGS:
    <locator>               Root resource locator, e.g. file:/opt/app/lib or
                            jar:file:/opt/app/lib/app.jar!/pkg
    [path]                  Logical path prefix (default: \"\")

OPTIONS:
    --root=<locator>        Extra probe root for line-recovery resolution
                            (repeatable; the positional locator is always a root)
    --max-unwrap=<N>        Nested-locator unwrap depth guard (default: 16)
    --no-sort               Do not sort native directory listings
    --help, -h              Show this help message",
        exe.to_string_lossy()
    );
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut args = env::args_os();
    let exe = args.next().unwrap_or_else(|| "vfslist".into());
    let mut locator_arg: Option<String> = None;
    let mut path_arg: Option<String> = None;
    let mut extra_roots: Vec<String> = Vec::new();
    let mut config = WalkConfig::default();

    for arg in args {
        let Some(flag) = arg.to_str() else {
            eprintln!("arguments must be valid UTF-8");
            process::exit(2);
        };
        if let Some(value) = flag.strip_prefix("--root=") {
            extra_roots.push(value.to_string());
        } else if let Some(value) = flag.strip_prefix("--max-unwrap=") {
            let n: usize = value.parse().unwrap_or_else(|_| {
                eprintln!("invalid --max-unwrap value: {}", value);
                process::exit(2);
            });
            config.max_nested_unwrap = n;
        } else if flag == "--no-sort" {
            config.sort_directory_entries = false;
        } else if flag == "--help" || flag == "-h" {
            print_usage(&exe);
            return Ok(());
        } else if flag.starts_with("--") {
            eprintln!("unknown flag: {}", flag);
            print_usage(&exe);
            process::exit(2);
        } else if locator_arg.is_none() {
            locator_arg = Some(flag.to_string());
        } else if path_arg.is_none() {
            path_arg = Some(flag.to_string());
        } else {
            eprintln!("unexpected argument: {}", flag);
            print_usage(&exe);
            process::exit(2);
        }
    }

    let Some(locator_arg) = locator_arg else {
        print_usage(&exe);
        process::exit(2);
    };
    let locator = Locator::parse(&locator_arg).unwrap_or_else(|e| {
        eprintln!("invalid locator {}: {}", locator_arg, e);
        process::exit(2);
    });
    let path = path_arg.unwrap_or_default();

    let mut roots = vec![locator.clone()];
    for raw in &extra_roots {
        match Locator::parse(raw) {
            Ok(root) => roots.push(root),
            Err(e) => {
                eprintln!("invalid --root locator {}: {}", raw, e);
                process::exit(2);
            }
        }
    }

    let walker = Walker::new(config, RootsProbe::new(roots)).unwrap_or_else(|e| {
        eprintln!("invalid configuration: {}", e);
        process::exit(2);
    });

    let resources = walker.list(&locator, &path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for name in &resources {
        writeln!(out, "{}", name)?;
    }
    out.flush()
}
