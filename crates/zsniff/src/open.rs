//! Detection & Dispatch
//!
//! Peek at the start of a stream, run the [`Detectors`] table over it, and
//! hand the stream (peeked bytes included) to the matching decoder.

use crate::Compression;
use crate::detect::Detectors;
use crate::error::{Error, ErrorKind, Result};
use crate::peek::{Fill, Lookahead};
use exn::ResultExt;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::io::{BufRead, BufReader, ErrorKind as IoErrorKind, Read};
use tracing::instrument;

/// A [`Read`]er that transparently decompresses whatever it was opened over.
///
/// Dropping it releases the decoder and the stream it was given.
pub struct Reader<'a> {
    inner: Box<dyn Read + 'a>,
    compression: Compression,
    truncated: Option<Error>,
}

impl<'a> Reader<'a> {
    fn new(inner: Box<dyn Read + 'a>, compression: Compression) -> Self {
        Self { inner, compression, truncated: None }
    }

    /// The format detected when this reader was opened.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// The error raised if the stream ended before a whole header could be
    /// peeked ([`ErrorKind::UnexpectedEof`]).
    ///
    /// The reader is still valid when this is set: it yields every byte the
    /// stream had, uncompressed. Callers decide whether that is acceptable.
    pub fn truncated(&self) -> Option<&Error> {
        self.truncated.as_ref()
    }

    /// Take the deferred short-header error, leaving the reader usable.
    pub fn take_truncated(&mut self) -> Option<Error> {
        self.truncated.take()
    }

    /// Fail if the stream ended before a whole header could be peeked.
    ///
    /// For callers that treat short input as an error rather than as data.
    pub fn check(mut self) -> Result<Self> {
        match self.truncated.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Unwrap the decoder (or pass-through reader).
    pub fn into_inner(self) -> Box<dyn Read + 'a> {
        self.inner
    }
}

impl Read for Reader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Debug for Reader<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Reader")
            .field("compression", &self.compression)
            .field("truncated", &self.truncated)
            .finish_non_exhaustive()
    }
}

impl Detectors {
    /// Open a reader that transparently decompresses `reader`, using this
    /// table for detection. See [`open`].
    pub fn open<'a, R: Read + 'a>(&self, reader: R) -> Result<Reader<'a>> {
        self.open_detect(reader).map(|(reader, _)| reader)
    }

    /// Same as [`open`](Self::open), but also reports the detected format.
    /// See [`open_detect`].
    #[instrument(level = "debug", skip_all, fields(compression, peeked))]
    pub fn open_detect<'a, R: Read + 'a>(&self, reader: R) -> Result<(Reader<'a>, Compression)> {
        let wanted = self.max_len();
        let mut lookahead = Lookahead::new(reader);
        let fill = lookahead.fill(wanted)?;
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

        let decoder = compression.wrap_reader(lookahead.into_reader())?;
        let inner: Box<dyn Read + 'a> = if compression.is_compressed() {
            let mut decoder = BufReader::new(decoder);
            prime(&mut decoder).or_raise(|| ErrorKind::Decoder(compression))?;
            Box::new(decoder)
        } else {
            decoder
        };
        Ok((Reader::new(inner, compression), compression))
    }
}

/// Decode the first chunk up front, so that a header the decoder rejects
/// fails here rather than on the caller's first read. The decoded bytes stay
/// buffered in `reader`.
fn prime<R: BufRead>(reader: &mut R) -> std::io::Result<()> {
    loop {
        match reader.fill_buf() {
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == IoErrorKind::Interrupted => {},
            // Nothing decoded yet, and nothing lost: the caller reads again later.
            Err(e) if e.kind() == IoErrorKind::WouldBlock => return Ok(()),
            Err(e) => return Err(e),
        }
    }
}

fn passthrough(inner: Box<dyn Read + '_>) -> (Reader<'_>, Compression) {
    tracing::Span::current().record("compression", Compression::None.as_str());
    (Reader::new(inner, Compression::None), Compression::None)
}

/// Open a reader that transparently decompresses gzip, zstd, bzip2 or zlib
/// data, using the global [`Detectors`] table.
///
/// If the data does not start with one of these headers, the returned reader
/// yields it unchanged.
///
/// The stream is only read far enough to peek at its header, and the peeked
/// bytes are replayed into the returned reader. Pass `&mut reader` to keep
/// ownership of the original stream.
///
/// # Errors
///
/// Fails with [`ErrorKind::Io`] if reading the header fails, and with
/// [`ErrorKind::Decoder`] if the detected format's decoder cannot be set up
/// or rejects the start of the stream.
/// A stream that ends before a whole header arrives is *not* a failure: the
/// returned reader yields whatever bytes there were and carries the
/// [`ErrorKind::UnexpectedEof`] in [`Reader::truncated`].
///
/// # Examples
///
/// ```
/// use std::io::{Read, Write};
///
/// let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
/// encoder.write_all(b"Hello, world!").unwrap();
/// let compressed = encoder.finish().unwrap();
///
/// let mut reader = zsniff::open(compressed.as_slice()).unwrap();
/// let mut decompressed = Vec::new();
/// reader.read_to_end(&mut decompressed).unwrap();
/// assert_eq!(decompressed, b"Hello, world!");
/// ```
pub fn open<'a, R: Read + 'a>(reader: R) -> Result<Reader<'a>> {
    Detectors::global().open(reader)
}

/// Same as [`open`], but also reports the detected format.
///
/// # Examples
///
/// ```
/// use std::io::Read;
/// use zsniff::{Compression, open_detect};
///
/// let (mut reader, compression) = open_detect(&b"BZh"[..]).unwrap();
/// assert_eq!(compression, Compression::None);
/// assert!(reader.truncated().is_some());
///
/// let mut output = Vec::new();
/// reader.read_to_end(&mut output).unwrap();
/// assert_eq!(output, b"BZh");
/// ```
pub fn open_detect<'a, R: Read + 'a>(reader: R) -> Result<(Reader<'a>, Compression)> {
    Detectors::global().open_detect(reader)
}
