//! Adapters for `std::io`, `std::fmt` and the `bytes` crate
//!
//! Everything here goes through the public reservation and commit
//! primitives of [`Sds`]; none of it touches the header directly.

use super::core::Sds;
use super::header::MAX_SIZE;
use crate::error::Result;
use bytes::buf::UninitSlice;
use bytes::{BufMut, Bytes};
use std::fmt;
use std::io::{self, Read, Write};

/// Spare space requested by `chunk_mut` when a buffer is full.
const MIN_CHUNK: usize = 64;

impl Sds {
    /// Read at most `n` bytes from `reader` straight into spare space.
    ///
    /// Returns the count read; `0` means end of input. Interrupted reads
    /// are retried. On a read error nothing is committed, even if the
    /// reader wrote partial data.
    pub fn read_from<R: Read + ?Sized>(&mut self, reader: &mut R, n: usize) -> Result<usize> {
        let mut spare = self.reserve_spare(n)?;
        let read = loop {
            match reader.read(&mut spare) {
                Ok(read) => break read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        };
        spare.commit(read)
    }

    /// Valid bytes as a `Vec`; terminator and spare bytes are cut off.
    pub fn into_vec(mut self) -> Vec<u8> {
        let len = self.len();
        self.buf.truncate(len);
        self.buf
    }
}

impl Write for Sds {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.cat_len(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for Sds {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.cat(s).map_err(|_| fmt::Error)
    }
}

// SAFETY: `chunk_mut` only exposes initialized spare bytes, and
// `advance_mut` refuses to commit past them.
unsafe impl BufMut for Sds {
    fn remaining_mut(&self) -> usize {
        MAX_SIZE - 1 - self.len()
    }

    /// # Panics
    ///
    /// Panics if growing a full buffer fails.
    fn chunk_mut(&mut self) -> &mut UninitSlice {
        if self.avail() == 0 {
            if let Err(e) = self.make_room_for(MIN_CHUNK) {
                panic!("sds chunk_mut: {e}");
            }
        }
        UninitSlice::new(self.spare_mut())
    }

    /// # Panics
    ///
    /// Panics if `cnt` exceeds the spare space.
    unsafe fn advance_mut(&mut self, cnt: usize) {
        if let Err(e) = self.advance(cnt) {
            panic!("sds advance_mut: {e}");
        }
    }

    fn put_slice(&mut self, src: &[u8]) {
        if let Err(e) = self.cat_len(src) {
            panic!("sds put_slice: {e}");
        }
    }
}

impl From<Sds> for Bytes {
    fn from(s: Sds) -> Bytes {
        Bytes::from(s.into_vec())
    }
}

impl From<Sds> for Vec<u8> {
    fn from(s: Sds) -> Vec<u8> {
        s.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_io_write() {
        let mut s = Sds::empty();
        s.write_all(b"hello ").unwrap();
        s.write_all(b"world").unwrap();
        assert_eq!(s, "hello world");
    }

    #[test]
    fn test_fmt_write() {
        let mut s = Sds::new(b"n=").unwrap();
        fmt::write(&mut s, format_args!("{}:{:04}", "id", 42)).unwrap();
        assert_eq!(s, "n=id:0042");
    }

    #[test]
    fn test_read_from() {
        let mut input = Cursor::new(b"*1\r\n$4\r\nPING\r\n".to_vec());
        let mut s = Sds::empty();
        let read = s.read_from(&mut input, 1024).unwrap();
        assert_eq!(read, 14);
        assert_eq!(s, "*1\r\n$4\r\nPING\r\n");
        assert!(s.avail() >= 1024 - 14);

        assert_eq!(s.read_from(&mut input, 1024).unwrap(), 0);
        assert_eq!(s.len(), 14);
    }

    #[test]
    fn test_read_from_bounded() {
        let mut input = Cursor::new(b"abcdef".to_vec());
        let mut s = Sds::empty();
        assert_eq!(s.read_from(&mut input, 4).unwrap(), 4);
        assert_eq!(s, "abcd");
        assert_eq!(s.read_from(&mut input, 4).unwrap(), 2);
        assert_eq!(s, "abcdef");
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            buf[..3].copy_from_slice(b"XYZ");
            Err(io::Error::from(io::ErrorKind::ConnectionReset))
        }
    }

    #[test]
    fn test_read_from_error_commits_nothing() {
        let mut s = Sds::new(b"ab").unwrap();
        let err = s.read_from(&mut FailingReader, 8).unwrap_err();
        assert!(matches!(err, crate::Error::System(_)));
        assert_eq!(s, "ab");
        assert_eq!(s.as_bytes_with_nul(), b"ab\0");
    }

    #[test]
    fn test_buf_mut() {
        let mut s = Sds::empty();
        s.put_u8(b'+');
        s.put_slice(b"OK");
        s.put_u16(0x0d0a);
        assert_eq!(s, "+OK\r\n");
        assert_eq!(s.as_bytes_with_nul(), b"+OK\r\n\0");
    }

    #[test]
    fn test_buf_mut_chunk_grows_full_buffer() {
        let mut s = Sds::new(b"x").unwrap();
        assert_eq!(s.avail(), 0);
        let chunk = s.chunk_mut();
        assert!(chunk.len() >= MIN_CHUNK);
    }

    #[test]
    fn test_into_bytes() {
        let mut s = Sds::new(b"payload").unwrap();
        s.make_room_for(100).unwrap();
        let bytes: Bytes = s.into();
        assert_eq!(&bytes[..], b"payload");
    }
}
