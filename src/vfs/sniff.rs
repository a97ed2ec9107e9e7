//! Archive signature sniffing.
//!
//! # Invariants
//! - Exactly `ZIP_MAGIC.len()` bytes are read and compared byte-for-byte.
//! - Any failure to open or read is "not an archive", never an error.
//! - The sniffed stream is dropped before returning on every path.

use std::io::Read;

use tracing::trace;

use crate::vfs::locator::Locator;

/// ZIP local-file-header magic: ASCII "PK" + 0x03 0x04.
///
/// This is a fixed wire-format constant, not configurable.
pub const ZIP_MAGIC: [u8; 4] = [b'P', b'K', 3, 4];

/// Does the locator's stream begin with the ZIP local-file-header magic?
pub fn is_archive(locator: &Locator) -> bool {
    let mut buf = [0u8; ZIP_MAGIC.len()];
    is_archive_with_buf(locator, &mut buf)
}

/// Sniff with a caller-owned buffer.
///
/// The buffer may be reused across invocations purely as an allocation
/// optimization; it carries no semantic state.
pub fn is_archive_with_buf(locator: &Locator, buf: &mut [u8; 4]) -> bool {
    let stream = match locator.open() {
        Ok(s) => s,
        Err(_) => return false,
    };
    let found = sniff_stream(stream, buf);
    if found {
        trace!(locator = %locator, "found archive signature");
    }
    found
}

/// Sniff an already-opened stream. The stream is consumed and dropped before
/// returning, success or failure.
pub fn is_archive_stream<R: Read>(stream: R) -> bool {
    let mut buf = [0u8; ZIP_MAGIC.len()];
    sniff_stream(stream, &mut buf)
}

fn sniff_stream<R: Read>(mut stream: R, buf: &mut [u8; 4]) -> bool {
    match stream.read_exact(buf) {
        Ok(()) => *buf == ZIP_MAGIC,
        // Short read or I/O failure both mean "not an archive".
        Err(_) => false,
    }
}
