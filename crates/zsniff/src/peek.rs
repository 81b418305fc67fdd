//! Lookahead over the start of a stream.
//!
//! Thin wrapper around standard library I/O primitives ([`Cursor`], [`Chain`])
//! for the peek-detect-stream pattern: buffer the header, decide what the
//! stream is, then replay the header ahead of everything else.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{Chain, Cursor, ErrorKind as IoErrorKind, Read};

/// How far a [`Lookahead::fill`] got.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fill {
    /// The buffer holds at least the requested number of bytes.
    Full,
    /// The stream ended first; the buffer holds everything there was.
    Short,
    /// The stream could not make progress right now (`WouldBlock`). This is
    /// not the end of the stream, so more bytes may follow later.
    Stalled,
}

/// Owns a reader and the bytes peeked from the start of it.
pub(crate) struct Lookahead<R> {
    inner: R,
    buffer: Vec<u8>,
}

impl<R: Read> Lookahead<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, buffer: Vec::new() }
    }

    /// Read until `limit` bytes are buffered, the stream ends, or the stream
    /// stalls. Bytes already buffered are kept, so calls do not accumulate.
    ///
    /// Interrupted reads are retried. Any other read error is raised as
    /// [`ErrorKind::Io`].
    pub fn fill(&mut self, limit: usize) -> Result<Fill> {
        while self.buffer.len() < limit {
            let start = self.buffer.len();
            self.buffer.resize(limit, 0);
            let read = self.inner.read(&mut self.buffer[start..]);
            self.buffer.truncate(start + read.as_ref().map_or(0, |n| *n));
            match read {
                Ok(0) => return Ok(Fill::Short),
                Ok(_) => {},
                Err(e) => match e.kind() {
                    IoErrorKind::Interrupted => {},
                    IoErrorKind::UnexpectedEof => return Ok(Fill::Short),
                    IoErrorKind::WouldBlock => return Ok(Fill::Stalled),
                    _ => return Err(e).or_raise(|| ErrorKind::Io),
                },
            }
        }
        Ok(Fill::Full)
    }

    /// Access data read into internal buffer so far.
    pub fn head(&self) -> &[u8] {
        &self.buffer
    }

    /// Convert into a [`Read`]er that replays the buffered head, then
    /// streams the rest of the inner reader.
    pub fn into_reader(self) -> Chain<Cursor<Vec<u8>>, R> {
        Cursor::new(self.buffer).chain(self.inner)
    }

    /// Give up on the inner reader and keep only what was buffered.
    pub fn into_head(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.buffer)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::{Error as IoError, Result as IoResult};

    /// Hands out at most one byte per read.
    pub struct Trickle<R>(pub R);
    impl<R: Read> Read for Trickle<R> {
        fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    /// Fails the first read with `kind`, then behaves like the inner reader.
    pub struct FailOnce<R> {
        pub kind: Option<IoErrorKind>,
        pub inner: R,
    }
    impl<R> FailOnce<R> {
        pub fn new(kind: IoErrorKind, inner: R) -> Self {
            Self { kind: Some(kind), inner }
        }
    }
    impl<R: Read> Read for FailOnce<R> {
        fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
            match self.kind.take() {
                Some(kind) => Err(IoError::new(kind, "injected failure")),
                None => self.inner.read(buf),
            }
        }
    }

    fn test_data() -> Vec<u8> {
        b"Hello, world! This is test data for the lookahead.".to_vec()
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(13)]
    fn test_fill(#[case] limit: usize) {
        let original = test_data();
        let mut lookahead = Lookahead::new(Cursor::new(&original));
        assert_eq!(lookahead.fill(limit).unwrap(), Fill::Full);
        assert_eq!(lookahead.head(), &original[..limit]);
    }

    #[test]
    fn test_fill_trickle() {
        let original = test_data();
        let mut lookahead = Lookahead::new(Trickle(Cursor::new(&original)));
        assert_eq!(lookahead.fill(6).unwrap(), Fill::Full);
        assert_eq!(lookahead.head(), b"Hello,");
    }

    #[test]
    fn test_multiple_fill_calls() {
        let original = test_data();
        let mut lookahead = Lookahead::new(Cursor::new(&original));
        assert_eq!(lookahead.fill(5).unwrap(), Fill::Full);
        assert_eq!(lookahead.fill(13).unwrap(), Fill::Full);
        assert_eq!(lookahead.fill(2).unwrap(), Fill::Full);
        assert_eq!(lookahead.head(), b"Hello, world!");
    }

    #[test]
    fn test_fill_larger_than_data() {
        let mut lookahead = Lookahead::new(Cursor::new(b"tiny"));
        assert_eq!(lookahead.fill(1000).unwrap(), Fill::Short);
        assert_eq!(lookahead.head(), b"tiny");
        let mut output = Vec::new();
        lookahead.into_head().read_to_end(&mut output).unwrap();
        assert_eq!(output, b"tiny");
    }

    #[test]
    fn test_fill_empty_input() {
        let mut lookahead = Lookahead::new(Cursor::new(b""));
        assert_eq!(lookahead.fill(6).unwrap(), Fill::Short);
        assert!(lookahead.head().is_empty());
    }

    #[rstest]
    #[case(IoErrorKind::Interrupted, Fill::Full)]
    #[case(IoErrorKind::WouldBlock, Fill::Stalled)]
    #[case(IoErrorKind::UnexpectedEof, Fill::Short)]
    fn test_fill_soft_errors(#[case] kind: IoErrorKind, #[case] expected: Fill) {
        let original = test_data();
        let mut lookahead = Lookahead::new(FailOnce::new(kind, Cursor::new(&original)));
        assert_eq!(lookahead.fill(6).unwrap(), expected);
    }

    #[test]
    fn test_fill_hard_error() {
        let mut lookahead = Lookahead::new(FailOnce::new(IoErrorKind::ConnectionReset, Cursor::new(test_data())));
        let err = lookahead.fill(6).unwrap_err();
        assert_eq!(*err, ErrorKind::Io);
    }

    #[test]
    fn test_fill_then_into_reader() {
        let original = test_data();
        let mut lookahead = Lookahead::new(Trickle(Cursor::new(&original)));
        lookahead.fill(5).unwrap();
        let mut output = Vec::new();
        lookahead.into_reader().read_to_end(&mut output).unwrap();
        assert_eq!(output, original);
    }

    #[test]
    fn test_stalled_then_into_reader() {
        let original = test_data();
        let mut lookahead = Lookahead::new(FailOnce::new(IoErrorKind::WouldBlock, Cursor::new(&original)));
        assert_eq!(lookahead.fill(6).unwrap(), Fill::Stalled);
        let mut output = Vec::new();
        lookahead.into_reader().read_to_end(&mut output).unwrap();
        assert_eq!(output, original);
    }
}
