//! Async Detection & Dispatch (feature-gated behind `async`)

use crate::Compression;
use crate::detect::Detectors;
use crate::error::{Error, ErrorKind, Result};
use crate::futures::peek::AsyncLookahead;
use crate::peek::Fill;
use exn::ResultExt;
use futures::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader as AsyncBufReader};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::io::{ErrorKind as IoErrorKind, Result as IoResult};
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::instrument;

/// An [`AsyncRead`]er that transparently decompresses whatever it was opened
/// over. Async counterpart of [`Reader`](crate::Reader).
pub struct AsyncReader<'a> {
    inner: Box<dyn AsyncRead + Unpin + 'a>,
    compression: Compression,
    truncated: Option<Error>,
}

impl<'a> AsyncReader<'a> {
    fn new(inner: Box<dyn AsyncRead + Unpin + 'a>, compression: Compression) -> Self {
        Self { inner, compression, truncated: None }
    }

    /// The format detected when this reader was opened.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// See [`Reader::truncated`](crate::Reader::truncated).
    pub fn truncated(&self) -> Option<&Error> {
        self.truncated.as_ref()
    }

    pub fn take_truncated(&mut self) -> Option<Error> {
        self.truncated.take()
    }

    /// Fail if the stream ended before a whole header could be peeked.
    pub fn check(mut self) -> Result<Self> {
        match self.truncated.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    pub fn into_inner(self) -> Box<dyn AsyncRead + Unpin + 'a> {
        self.inner
    }
}

impl AsyncRead for AsyncReader<'_> {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<IoResult<usize>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl Debug for AsyncReader<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AsyncReader")
            .field("compression", &self.compression)
            .field("truncated", &self.truncated)
            .finish_non_exhaustive()
    }
}

impl Detectors {
    /// Async counterpart of [`Detectors::open`].
    pub async fn async_open<'a, R: AsyncRead + Unpin + 'a>(&self, reader: R) -> Result<AsyncReader<'a>> {
        self.async_open_detect(reader).await.map(|(reader, _)| reader)
    }

    /// Async counterpart of [`Detectors::open_detect`].
    #[instrument(level = "debug", skip_all, fields(compression, peeked))]
    pub async fn async_open_detect<'a, R: AsyncRead + Unpin + 'a>(
        &self,
        reader: R,
    ) -> Result<(AsyncReader<'a>, Compression)> {
        let wanted = self.max_len();
        let mut lookahead = AsyncLookahead::new(reader);
        let fill = lookahead.fill(wanted).await?;
        let got = lookahead.head().len();
        tracing::Span::current().record("peeked", got);

        let compression = match fill {
            Fill::Full => self.detect(lookahead.head()),
            Fill::Stalled => {
                tracing::debug!(got, wanted, "Stream stalled before a whole header arrived; passing through");
                return Ok(passthrough(Box::new(lookahead.into_reader())));
            },
            Fill::Short => {
                tracing::debug!(got, wanted, "Stream ended before a whole header arrived; passing through");
                let (mut reader, compression) = passthrough(Box::new(lookahead.into_head()));
                reader.truncated = Some(Error::new(ErrorKind::UnexpectedEof { wanted, got }));
                return Ok((reader, compression));
            },
        };
        tracing::Span::current().record("compression", compression.as_str());
        if !compression.is_compressed() {
            tracing::debug!("No known compression header; passing through");
        }

        let decoder = compression.async_wrap_reader(lookahead.into_reader());
        let inner: Box<dyn AsyncRead + Unpin + 'a> = if compression.is_compressed() {
            let mut decoder = AsyncBufReader::new(decoder);
            prime(&mut decoder).await.or_raise(|| ErrorKind::Decoder(compression))?;
            Box::new(decoder)
        } else {
            decoder
        };
        Ok((AsyncReader::new(inner, compression), compression))
    }
}

/// Async counterpart of the sync priming read: decode the first chunk so a
/// rejected header fails at open, keeping the decoded bytes buffered.
async fn prime<R: AsyncBufRead + Unpin>(reader: &mut R) -> IoResult<()> {
    loop {
        match reader.fill_buf().await {
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == IoErrorKind::Interrupted => {},
            Err(e) if e.kind() == IoErrorKind::WouldBlock => return Ok(()),
            Err(e) => return Err(e),
        }
    }
}

fn passthrough(inner: Box<dyn AsyncRead + Unpin + '_>) -> (AsyncReader<'_>, Compression) {
    tracing::Span::current().record("compression", Compression::None.as_str());
    (AsyncReader::new(inner, Compression::None), Compression::None)
}

/// Async counterpart of [`open`](crate::open), using the global
/// [`Detectors`] table.
pub async fn open_async<'a, R: AsyncRead + Unpin + 'a>(reader: R) -> Result<AsyncReader<'a>> {
    Detectors::global().async_open(reader).await
}

/// Async counterpart of [`open_detect`](crate::open_detect), using the global
/// [`Detectors`] table.
pub async fn open_detect_async<'a, R: AsyncRead + Unpin + 'a>(reader: R) -> Result<(AsyncReader<'a>, Compression)> {
    Detectors::global().async_open_detect(reader).await
}
