//! Sequential ZIP entry cursor over a non-seekable stream.
//!
//! # Invariants
//! - Parsing is sequential; no seeks are performed, so the cursor works on
//!   any `Read` source (files, archive-served streams, in-memory buffers).
//! - Size and length fields are untrusted; short reads and stray signatures
//!   are treated as malformed.
//! - Entries cannot be revisited without reopening the stream.
//!
//! # Algorithm
//! - Read local-file-header records in stream order.
//! - A central-directory or end-of-central-directory signature (or clean EOF
//!   at a record boundary) is the end-of-table sentinel.
//! - Payloads are skipped by `compressed_size` when sizes are present in the
//!   header; data-descriptor entries (flag bit 3) are consumed by inflating
//!   the raw deflate stream to its end with exact input accounting, then the
//!   descriptor record itself is consumed (with or without its optional
//!   `PK\x07\x08` signature).
//!
//! # Not Supported
//! - Zip64 data descriptors and encrypted payload reads.
//! - Compression methods other than stored (0) and deflate (8) for payload
//!   reads; listing is method-agnostic.

use std::io::{self, Cursor, Read};

use flate2::read::DeflateDecoder;
use flate2::{Decompress, FlushDecompress, Status};

const SIG_LFH: u32 = 0x0403_4b50;
const SIG_CDFH: u32 = 0x0201_4b50;
const SIG_EOCD: u32 = 0x0605_4b50;
const SIG_DD: u32 = 0x0807_4b50;

/// Local file header fixed length, including the signature.
const LFH_LEN: usize = 30;

const FLAG_ENCRYPTED: u16 = 0x0001;
const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATE: u16 = 8;

const LOOKAHEAD_LEN: usize = 8192;

/// A single archive entry: full in-archive name plus a directory flag.
///
/// Names are yielded in the physical order of the archive's entry table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZipEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Payload state for the most recently yielded entry.
enum Pending {
    None,
    Sized {
        remaining: u64,
        method: u16,
        encrypted: bool,
    },
    /// Deflate stream of unknown length followed by a data descriptor.
    Descriptor,
}

/// Streaming cursor over a ZIP entry table.
///
/// # Invariants
/// - `next_entry` advances monotonically; the previous entry's payload is
///   consumed before the next header is read.
/// - After the end sentinel is observed, `next_entry` keeps returning `None`.
pub struct ZipStream<R> {
    inner: R,
    lookahead: Vec<u8>,
    la_pos: usize,
    la_filled: usize,
    pending: Pending,
    done: bool,
}

impl<R: Read> ZipStream<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookahead: vec![0u8; LOOKAHEAD_LEN],
            la_pos: 0,
            la_filled: 0,
            pending: Pending::None,
            done: false,
        }
    }

    /// Yield the next entry in stream order, or `None` at the end sentinel.
    ///
    /// An unexpected record signature or a truncated record is an
    /// `InvalidData`/`UnexpectedEof` error; both are fatal for the stream.
    pub fn next_entry(&mut self) -> io::Result<Option<ZipEntry>> {
        if self.done {
            return Ok(None);
        }
        self.skip_pending()?;

        let mut sig = [0u8; 4];
        if !self.read_exact_or_eof(&mut sig)? {
            self.done = true;
            return Ok(None);
        }
        match u32::from_le_bytes(sig) {
            SIG_LFH => {}
            SIG_CDFH | SIG_EOCD => {
                self.done = true;
                return Ok(None);
            }
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("zip: unexpected record signature {other:#010x}"),
                ))
            }
        }

        // Fixed LFH fields after the signature:
        // version(2) flags(2) method(2) modtime(2) moddate(2) crc32(4)
        // csize(4) usize(4) name_len(2) extra_len(2)
        let mut hdr = [0u8; LFH_LEN - 4];
        self.read_exact_buffered(&mut hdr)?;

        let flags = le_u16(&hdr[2..4]);
        let method = le_u16(&hdr[4..6]);
        let compressed_size = le_u32(&hdr[14..18]) as u64;
        let name_len = le_u16(&hdr[22..24]) as usize;
        let extra_len = le_u16(&hdr[24..26]) as usize;

        let mut name = vec![0u8; name_len];
        self.read_exact_buffered(&mut name)?;
        if extra_len > 0 {
            self.skip_exact(extra_len as u64)?;
        }

        let encrypted = (flags & FLAG_ENCRYPTED) != 0;
        self.pending = if (flags & FLAG_DATA_DESCRIPTOR) != 0 {
            // Sizes live in the trailing descriptor; only a plain deflate
            // stream is self-terminating, so anything else cannot be resynced.
            if method != METHOD_DEFLATE || encrypted {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "zip: data-descriptor entry is not plain deflate",
                ));
            }
            Pending::Descriptor
        } else {
            Pending::Sized {
                remaining: compressed_size,
                method,
                encrypted,
            }
        };

        let name = String::from_utf8_lossy(&name).into_owned();
        let is_dir = name.ends_with('/');
        Ok(Some(ZipEntry { name, is_dir }))
    }

    /// Read the decompressed payload of the entry most recently yielded by
    /// `next_entry`. Calling it twice (or before any entry) yields empty.
    pub fn read_entry_bytes(&mut self) -> io::Result<Vec<u8>> {
        match std::mem::replace(&mut self.pending, Pending::None) {
            Pending::None => Ok(Vec::new()),
            Pending::Sized {
                encrypted: true, ..
            } => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "zip: encrypted entry payload",
            )),
            Pending::Sized {
                remaining,
                method: METHOD_STORED,
                ..
            } => {
                let mut data = vec![0u8; remaining as usize];
                self.read_exact_buffered(&mut data)?;
                Ok(data)
            }
            Pending::Sized {
                remaining,
                method: METHOD_DEFLATE,
                ..
            } => {
                let mut comp = vec![0u8; remaining as usize];
                self.read_exact_buffered(&mut comp)?;
                let mut out = Vec::new();
                DeflateDecoder::new(Cursor::new(comp)).read_to_end(&mut out)?;
                Ok(out)
            }
            Pending::Sized { .. } => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "zip: unsupported compression method",
            )),
            Pending::Descriptor => {
                let mut out = Vec::new();
                self.consume_descriptor_payload(Some(&mut out))?;
                Ok(out)
            }
        }
    }

    fn skip_pending(&mut self) -> io::Result<()> {
        match std::mem::replace(&mut self.pending, Pending::None) {
            Pending::None => Ok(()),
            Pending::Sized { remaining, .. } => self.skip_exact(remaining),
            Pending::Descriptor => self.consume_descriptor_payload(None),
        }
    }

    /// Inflate the raw deflate stream to its end, tracking exactly how many
    /// input bytes it consumed, then consume the trailing data descriptor.
    ///
    /// Unconsumed lookahead bytes stay available for the next record.
    fn consume_descriptor_payload(&mut self, mut sink: Option<&mut Vec<u8>>) -> io::Result<()> {
        let mut inflate = Decompress::new(false);
        let mut out = [0u8; 8192];
        loop {
            if self.la_pos == self.la_filled {
                self.refill()?;
                if self.la_filled == 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "zip: truncated deflate stream",
                    ));
                }
            }
            let before_in = inflate.total_in();
            let before_out = inflate.total_out();
            let status = inflate
                .decompress(
                    &self.lookahead[self.la_pos..self.la_filled],
                    &mut out,
                    FlushDecompress::None,
                )
                .map_err(|e| {
                    io::Error::new(io::ErrorKind::InvalidData, format!("zip: bad deflate: {e}"))
                })?;
            let consumed = (inflate.total_in() - before_in) as usize;
            let produced = (inflate.total_out() - before_out) as usize;
            self.la_pos += consumed;
            if let Some(sink) = sink.as_deref_mut() {
                sink.extend_from_slice(&out[..produced]);
            }
            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    if consumed == 0 && produced == 0 && self.la_pos < self.la_filled {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "zip: deflate stream stalled",
                        ));
                    }
                }
            }
        }

        // Descriptor: optional signature, then crc32 + csize + usize.
        let mut first = [0u8; 4];
        self.read_exact_buffered(&mut first)?;
        if u32::from_le_bytes(first) == SIG_DD {
            self.skip_exact(12)
        } else {
            self.skip_exact(8)
        }
    }

    fn refill(&mut self) -> io::Result<()> {
        debug_assert_eq!(self.la_pos, self.la_filled);
        self.la_pos = 0;
        self.la_filled = 0;
        loop {
            match self.inner.read(&mut self.lookahead) {
                Ok(n) => {
                    self.la_filled = n;
                    return Ok(());
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn read_buffered(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if self.la_pos < self.la_filled {
            let n = (self.la_filled - self.la_pos).min(dst.len());
            dst[..n].copy_from_slice(&self.lookahead[self.la_pos..self.la_pos + n]);
            self.la_pos += n;
            return Ok(n);
        }
        if dst.len() >= self.lookahead.len() {
            loop {
                match self.inner.read(dst) {
                    Ok(n) => return Ok(n),
                    Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            }
        }
        self.refill()?;
        if self.la_filled == 0 {
            return Ok(0);
        }
        let n = self.la_filled.min(dst.len());
        dst[..n].copy_from_slice(&self.lookahead[..n]);
        self.la_pos = n;
        Ok(n)
    }

    fn read_exact_buffered(&mut self, dst: &mut [u8]) -> io::Result<()> {
        let mut off = 0;
        while off < dst.len() {
            let n = self.read_buffered(&mut dst[off..])?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "zip: truncated record",
                ));
            }
            off += n;
        }
        Ok(())
    }

    /// Like `read_exact_buffered`, but a clean EOF before the first byte is
    /// reported as `Ok(false)` (the end-of-table condition for archives that
    /// stop without a central directory).
    fn read_exact_or_eof(&mut self, dst: &mut [u8]) -> io::Result<bool> {
        let mut off = 0;
        while off < dst.len() {
            let n = self.read_buffered(&mut dst[off..])?;
            if n == 0 {
                if off == 0 {
                    return Ok(false);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "zip: truncated record",
                ));
            }
            off += n;
        }
        Ok(true)
    }

    fn skip_exact(&mut self, mut n: u64) -> io::Result<()> {
        let mut scratch = [0u8; 4096];
        while n > 0 {
            let step = n.min(scratch.len() as u64) as usize;
            let got = self.read_buffered(&mut scratch[..step])?;
            if got == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "zip: truncated payload",
                ));
            }
            n -= got as u64;
        }
        Ok(())
    }
}

#[inline(always)]
fn le_u16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

#[inline(always)]
fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    /// Append a stored (method 0) local-file-header entry.
    fn push_stored_entry(buf: &mut Vec<u8>, name: &str, data: &[u8]) {
        buf.extend_from_slice(&SIG_LFH.to_le_bytes());
        buf.extend_from_slice(&20u16.to_le_bytes()); // version
        buf.extend_from_slice(&0u16.to_le_bytes()); // flags
        buf.extend_from_slice(&METHOD_STORED.to_le_bytes());
        buf.extend_from_slice(&[0u8; 4]); // modtime + moddate
        buf.extend_from_slice(&0u32.to_le_bytes()); // crc32 (unchecked)
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes()); // extra_len
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(data);
    }

    /// Append a deflate entry with a trailing data descriptor (flag bit 3).
    fn push_descriptor_entry(buf: &mut Vec<u8>, name: &str, data: &[u8], with_sig: bool) {
        let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        let comp = enc.finish().unwrap();

        buf.extend_from_slice(&SIG_LFH.to_le_bytes());
        buf.extend_from_slice(&20u16.to_le_bytes());
        buf.extend_from_slice(&FLAG_DATA_DESCRIPTOR.to_le_bytes());
        buf.extend_from_slice(&METHOD_DEFLATE.to_le_bytes());
        buf.extend_from_slice(&[0u8; 4]);
        buf.extend_from_slice(&0u32.to_le_bytes()); // crc32 unknown up front
        buf.extend_from_slice(&0u32.to_le_bytes()); // csize unknown
        buf.extend_from_slice(&0u32.to_le_bytes()); // usize unknown
        buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(&comp);
        if with_sig {
            buf.extend_from_slice(&SIG_DD.to_le_bytes());
        }
        buf.extend_from_slice(&0u32.to_le_bytes()); // crc32
        buf.extend_from_slice(&(comp.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
    }

    fn push_eocd(buf: &mut Vec<u8>) {
        buf.extend_from_slice(&SIG_EOCD.to_le_bytes());
        buf.extend_from_slice(&[0u8; 18]);
    }

    fn names(bytes: Vec<u8>) -> Vec<String> {
        let mut zs = ZipStream::new(Cursor::new(bytes));
        let mut out = Vec::new();
        while let Some(e) = zs.next_entry().unwrap() {
            out.push(e.name);
        }
        out
    }

    #[test]
    fn iterates_entries_in_stream_order() {
        let mut buf = Vec::new();
        push_stored_entry(&mut buf, "pkg/X.class", b"xxxx");
        push_stored_entry(&mut buf, "pkg/sub/", b"");
        push_stored_entry(&mut buf, "pkg/sub/Y.class", b"yy");
        push_eocd(&mut buf);
        assert_eq!(names(buf), ["pkg/X.class", "pkg/sub/", "pkg/sub/Y.class"]);
    }

    #[test]
    fn directory_flag_follows_trailing_slash() {
        let mut buf = Vec::new();
        push_stored_entry(&mut buf, "d/", b"");
        push_stored_entry(&mut buf, "d/f", b"1");
        push_eocd(&mut buf);
        let mut zs = ZipStream::new(Cursor::new(buf));
        assert!(zs.next_entry().unwrap().unwrap().is_dir);
        assert!(!zs.next_entry().unwrap().unwrap().is_dir);
    }

    #[test]
    fn clean_eof_without_central_directory_ends_table() {
        let mut buf = Vec::new();
        push_stored_entry(&mut buf, "a", b"1");
        assert_eq!(names(buf), ["a"]);
    }

    #[test]
    fn empty_stream_yields_no_entries() {
        assert!(names(Vec::new()).is_empty());
    }

    #[test]
    fn stray_signature_is_invalid_data() {
        let mut buf = Vec::new();
        push_stored_entry(&mut buf, "a", b"1");
        buf.extend_from_slice(b"GARBAGE!");
        let mut zs = ZipStream::new(Cursor::new(buf));
        zs.next_entry().unwrap();
        let err = zs.next_entry().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_payload_is_unexpected_eof() {
        let mut buf = Vec::new();
        push_stored_entry(&mut buf, "a", b"0123456789");
        buf.truncate(buf.len() - 4);
        let mut zs = ZipStream::new(Cursor::new(buf));
        zs.next_entry().unwrap();
        let err = zs.next_entry().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn read_entry_bytes_returns_stored_payload() {
        let mut buf = Vec::new();
        push_stored_entry(&mut buf, "a.txt", b"stored bytes");
        push_eocd(&mut buf);
        let mut zs = ZipStream::new(Cursor::new(buf));
        zs.next_entry().unwrap();
        assert_eq!(zs.read_entry_bytes().unwrap(), b"stored bytes");
        // Second read yields empty, and the cursor still finds the sentinel.
        assert!(zs.read_entry_bytes().unwrap().is_empty());
        assert!(zs.next_entry().unwrap().is_none());
    }

    #[test]
    fn descriptor_entries_resync_with_and_without_signature() {
        for with_sig in [true, false] {
            let mut buf = Vec::new();
            push_descriptor_entry(&mut buf, "first.bin", b"descriptor payload", with_sig);
            push_stored_entry(&mut buf, "second.txt", b"after");
            push_eocd(&mut buf);
            assert_eq!(names(buf), ["first.bin", "second.txt"]);
        }
    }

    #[test]
    fn descriptor_entry_payload_roundtrips() {
        let payload = b"some text that deflate will happily shrink shrink shrink";
        let mut buf = Vec::new();
        push_descriptor_entry(&mut buf, "x", payload, true);
        push_eocd(&mut buf);
        let mut zs = ZipStream::new(Cursor::new(buf));
        zs.next_entry().unwrap();
        assert_eq!(zs.read_entry_bytes().unwrap(), payload);
        assert!(zs.next_entry().unwrap().is_none());
    }

    #[test]
    fn zip_crate_archives_are_readable() {
        let cursor = Cursor::new(Vec::new());
        let mut zw = zip::ZipWriter::new(cursor);
        let opts = zip::write::FileOptions::default();
        zw.start_file("a/b.txt", opts).unwrap();
        zw.write_all(b"hello").unwrap();
        zw.add_directory("a/c", opts).unwrap();
        zw.start_file("a/c/d.txt", opts).unwrap();
        zw.write_all(b"world").unwrap();
        let bytes = zw.finish().unwrap().into_inner();

        let mut zs = ZipStream::new(Cursor::new(bytes));
        let first = zs.next_entry().unwrap().unwrap();
        assert_eq!(first.name, "a/b.txt");
        assert_eq!(zs.read_entry_bytes().unwrap(), b"hello");
        let dir = zs.next_entry().unwrap().unwrap();
        assert!(dir.is_dir);
        let last = zs.next_entry().unwrap().unwrap();
        assert_eq!(last.name, "a/c/d.txt");
        assert!(zs.next_entry().unwrap().is_none());
    }
}
