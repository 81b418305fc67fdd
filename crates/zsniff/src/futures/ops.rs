//! Async Decoder Dispatch (feature-gated behind `async`)

use crate::Compression;
use async_compression::futures::bufread::{BzDecoder, GzipDecoder, ZlibDecoder, ZstdDecoder};
use futures::io::{AsyncRead, BufReader as AsyncBufReader};

impl Compression {
    /// Wrap an async reader with the appropriate decompression layer.
    /// Automatically wraps with a buffered reader internally.
    ///
    /// Async counterpart of [`Compression::wrap_reader`]. Cannot fail like
    /// its sync counterpart because the underlying crate defers every error
    /// until the first read attempt.
    pub fn async_wrap_reader<'a, R: AsyncRead + Unpin + 'a>(&self, reader: R) -> Box<dyn AsyncRead + Unpin + 'a> {
        // `async-compression` requires AsyncBufRead. Wrap the incoming
        // AsyncRead in a buffered version, so the callee doesn't need to.
        let reader = AsyncBufReader::new(reader);
        match self {
            Compression::None => Box::new(reader),
            Compression::Bzip2 => {
                let mut decoder = BzDecoder::new(reader);
                decoder.multiple_members(true);
                Box::new(decoder)
            },
            Compression::Gzip => {
                let mut decoder = GzipDecoder::new(reader);
                decoder.multiple_members(true);
                Box::new(decoder)
            },
            Compression::Zlib => Box::new(ZlibDecoder::new(reader)),
            Compression::Zstd => {
                let mut decoder = ZstdDecoder::new(reader);
                decoder.multiple_members(true);
                Box::new(decoder)
            },
        }
    }
}
