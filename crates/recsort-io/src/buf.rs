//! Bounded buffered byte-line reading for line-oriented scratch files.
//!
//! The sort pipeline's intermediate files hold arbitrary bytes terminated by
//! `\n`; they are not guaranteed to be UTF-8, so lines are read as bytes.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// A thin wrapper over `BufReader` with a fixed capacity to bound in-flight bytes.
pub struct BoundedBufReader<R: Read> {
    inner: BufReader<R>,
    lines_read: u64,
}

impl<R: Read> BoundedBufReader<R> {
    /// Create a new bounded reader with a maximum internal buffer size.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            inner: BufReader::with_capacity(capacity, reader),
            lines_read: 0,
        }
    }

    /// Number of lines returned by `next_line` so far.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Read the next line into `buf` (cleared first), without its trailing `\n`.
    /// Returns `Ok(false)` at end of input. A final line without a terminator
    /// is still returned.
    pub fn next_line(&mut self, buf: &mut Vec<u8>) -> io::Result<bool> {
        buf.clear();
        let n = self.inner.read_until(b'\n', buf)?;
        if n == 0 {
            return Ok(false);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        self.lines_read += 1;
        Ok(true)
    }
}

impl<R: Read> Read for BoundedBufReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> BufRead for BoundedBufReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }
    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

/// Convenience helper to create a bounded reader from a file path.
pub fn bounded_from_path<P: AsRef<Path>>(
    path: P,
    cap: usize,
) -> io::Result<BoundedBufReader<File>> {
    let file = File::open(path)?;
    Ok(BoundedBufReader::with_capacity(cap, file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_line_strips_terminator_and_keeps_binary() {
        let data: &[u8] = b"a * \x01\x02\xff\nb\n\nlast";
        let mut r = BoundedBufReader::with_capacity(4, data);
        let mut line = Vec::new();

        assert!(r.next_line(&mut line).unwrap());
        assert_eq!(line, b"a * \x01\x02\xff");
        assert!(r.next_line(&mut line).unwrap());
        assert_eq!(line, b"b");
        assert!(r.next_line(&mut line).unwrap());
        assert!(line.is_empty());
        assert!(r.next_line(&mut line).unwrap());
        assert_eq!(line, b"last");
        assert!(!r.next_line(&mut line).unwrap());
        assert_eq!(r.lines_read(), 4);
    }
}
