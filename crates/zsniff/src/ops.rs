//! Decoder Dispatch

use crate::Compression;
use crate::error::{ErrorKind, Result};
use crate::open::open_detect;
use bzip2::read::MultiBzDecoder;
use exn::ResultExt;
use flate2::read::{MultiGzDecoder, ZlibDecoder};
use std::io::Read;
use tracing::instrument;
use zstd::stream::read::Decoder as ZstdDecoder;

impl Compression {
    /// Wrap a reader with the appropriate decompression layer.
    ///
    /// Returns a boxed reader that decompresses data as it is read. For
    /// [`Compression::None`] the reader is passed through untouched.
    ///
    /// Gzip and Bzip2 keep decoding across concatenated members, and Zstd
    /// across concatenated frames. Only Zstd allocates its decoder up front;
    /// the other formats validate the stream lazily, so a corrupt header shows
    /// up as an [`std::io::Error`] from the first read instead of here.
    /// [`open`](crate::open) does that first read itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::{Cursor, Read, Write};
    /// use zsniff::Compression;
    ///
    /// let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    /// encoder.write_all(b"Hello, world!").unwrap();
    /// let compressed = encoder.finish().unwrap();
    ///
    /// let mut reader = Compression::Gzip.wrap_reader(Cursor::new(compressed)).unwrap();
    /// let mut decompressed = Vec::new();
    /// reader.read_to_end(&mut decompressed).unwrap();
    /// assert_eq!(decompressed, b"Hello, world!");
    /// ```
    pub fn wrap_reader<'a, R: Read + 'a>(&self, reader: R) -> Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => Box::new(reader),
            Compression::Bzip2 => Box::new(MultiBzDecoder::new(reader)),
            Compression::Gzip => Box::new(MultiGzDecoder::new(reader)),
            Compression::Zlib => Box::new(ZlibDecoder::new(reader)),
            Compression::Zstd => Box::new(ZstdDecoder::new(reader).or_raise(|| ErrorKind::Decoder(*self))?),
        })
    }
}

/// Detect the format of a byte slice and decompress all of it in memory.
///
/// Input too short to hold any known header is returned as-is, the same way
/// as input whose header matched nothing. A decoder that rejects the start of
/// the input fails with [`ErrorKind::Decoder`]; corruption further in fails
/// with [`ErrorKind::InvalidData`].
///
/// # Examples
///
/// ```
/// use zsniff::{Compression, decompress};
///
/// let (output, compression) = decompress(b"not compressed").unwrap();
/// assert_eq!(output, b"not compressed");
/// assert_eq!(compression, Compression::None);
/// ```
#[instrument(skip(input), fields(input_size = input.len(), compression, output_size))]
pub fn decompress(input: &[u8]) -> Result<(Vec<u8>, Compression)> {
    let (mut reader, compression) = open_detect(input)?;
    tracing::Span::current().record("compression", compression.as_str());
    let mut output = Vec::new();
    let size = match reader.read_to_end(&mut output) {
        Ok(size) => size,
        Err(e) => {
            let kind = ErrorKind::from_read(&e);
            return Err(e).or_raise(|| kind);
        },
    };
    tracing::Span::current().record("output_size", size);
    Ok((output, compression))
}
