use crate::error::{ErrorKind, Result};
use crate::peek::Fill;
use exn::ResultExt;
use futures::io::{AsyncRead, AsyncReadExt};
use futures::io::{Chain as AsyncChain, Cursor as AsyncCursor};
use std::io::ErrorKind as IoErrorKind;

pub(crate) struct AsyncLookahead<R> {
    inner: R,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin> AsyncLookahead<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, buffer: Vec::new() }
    }

    pub async fn fill(&mut self, limit: usize) -> Result<Fill> {
        while self.buffer.len() < limit {
            let start = self.buffer.len();
            self.buffer.resize(limit, 0);
            let read = self.inner.read(&mut self.buffer[start..]).await;
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

    pub fn head(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_reader(self) -> AsyncChain<AsyncCursor<Vec<u8>>, R> {
        AsyncCursor::new(self.buffer).chain(self.inner)
    }

    pub fn into_head(self) -> AsyncCursor<Vec<u8>> {
        AsyncCursor::new(self.buffer)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::io::Cursor;
    use std::io::Error as IoError;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Hands out at most one byte per read.
    pub struct Trickle<R>(pub R);

    impl<R: AsyncRead + Unpin> AsyncRead for Trickle<R> {
        fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<std::io::Result<usize>> {
            let len = buf.len().min(1);
            Pin::new(&mut self.0).poll_read(cx, &mut buf[..len])
        }
    }

    /// Fails the first read with the given error kind, then reads normally.
    pub struct FailOnce<R> {
        kind: Option<IoErrorKind>,
        inner: R,
    }

    impl<R> FailOnce<R> {
        pub fn new(kind: IoErrorKind, inner: R) -> Self {
            Self { kind: Some(kind), inner }
        }
    }

    impl<R: AsyncRead + Unpin> AsyncRead for FailOnce<R> {
        fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<std::io::Result<usize>> {
            match self.kind.take() {
                Some(kind) => Poll::Ready(Err(IoError::new(kind, "injected failure"))),
                None => Pin::new(&mut self.inner).poll_read(cx, buf),
            }
        }
    }

    #[tokio::test]
    async fn test_fill_then_into_reader() {
        let original = b"Hello, world! This is test data for the async lookahead.".to_vec();
        let mut lookahead = AsyncLookahead::new(Cursor::new(original.clone()));
        assert_eq!(lookahead.fill(13).await.unwrap(), Fill::Full);
        assert_eq!(lookahead.head(), b"Hello, world!");
        let mut output = Vec::new();
        lookahead.into_reader().read_to_end(&mut output).await.unwrap();
        assert_eq!(output, original);
    }

    #[tokio::test]
    async fn test_fill_larger_than_data() {
        let mut lookahead = AsyncLookahead::new(Cursor::new(b"tiny".to_vec()));
        assert_eq!(lookahead.fill(1000).await.unwrap(), Fill::Short);
        let mut output = Vec::new();
        lookahead.into_head().read_to_end(&mut output).await.unwrap();
        assert_eq!(output, b"tiny");
    }

    #[tokio::test]
    async fn test_fill_retries_interrupted() {
        let mut lookahead = AsyncLookahead::new(FailOnce::new(IoErrorKind::Interrupted, Cursor::new(b"abcdef".to_vec())));
        assert_eq!(lookahead.fill(4).await.unwrap(), Fill::Full);
        assert_eq!(lookahead.head(), b"abcd");
    }

    #[tokio::test]
    async fn test_fill_trickle() {
        let mut lookahead = AsyncLookahead::new(Trickle(Cursor::new(b"abcdef".to_vec())));
        assert_eq!(lookahead.fill(6).await.unwrap(), Fill::Full);
        assert_eq!(lookahead.head(), b"abcdef");
    }
}
