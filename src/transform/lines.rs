// src/transform/lines.rs

//! Line tracking for the input stream
//!
//! Wraps a `BufRead` and counts the newlines the XML reader has consumed,
//! so diagnostics can name a line without buffering the whole template.

use std::io::{self, BufRead, Read};

pub struct LineCounter<R> {
    inner: R,
    newlines: u64,
}

impl<R: BufRead> LineCounter<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, newlines: 0 }
    }

    /// 1-based line of the next unconsumed byte
    pub fn line(&self) -> u64 {
        self.newlines + 1
    }
}

fn count_newlines(bytes: &[u8]) -> u64 {
    bytes.iter().filter(|&&b| b == b'\n').count() as u64
}

impl<R: BufRead> Read for LineCounter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.newlines += count_newlines(&buf[..n]);
        Ok(n)
    }
}

impl<R: BufRead> BufRead for LineCounter<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        if amt > 0 {
            // The bytes being consumed are still at the front of the buffer.
            if let Ok(buf) = self.inner.fill_buf() {
                let n = amt.min(buf.len());
                self.newlines += count_newlines(&buf[..n]);
            }
        }
        self.inner.consume(amt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_counts_consumed_lines() {
        let mut counter = LineCounter::new(Cursor::new(b"one\ntwo\nthree".to_vec()));
        assert_eq!(counter.line(), 1);

        let mut first = String::new();
        counter.read_line(&mut first).unwrap();
        assert_eq!(first, "one\n");
        assert_eq!(counter.line(), 2);

        let mut rest = String::new();
        counter.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "two\nthree");
        assert_eq!(counter.line(), 3);
    }

    #[test]
    fn test_unconsumed_bytes_are_not_counted() {
        let mut counter = LineCounter::new(Cursor::new(b"\n\n\n".to_vec()));
        assert_eq!(counter.fill_buf().unwrap().len(), 3);
        assert_eq!(counter.line(), 1);
        counter.consume(2);
        assert_eq!(counter.line(), 3);
    }
}
