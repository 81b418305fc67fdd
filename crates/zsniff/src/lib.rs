//! Transparent decompression with automatic format detection.
//!
//! Hand this crate any byte stream and it peeks at the first few bytes,
//! matches them against the magic headers of the formats it knows, and
//! returns a reader that decompresses on the fly:
//!
//! - **Detection** over a byte slice ([`detect`], [`Detectors::detect`]) using
//!   an ordered table of bitmask-and-predicate [`Detector`]s
//! - **Streaming** via [`open`] / [`open_detect`], which wrap a [`Read`](std::io::Read)er
//!   in the matching decoder, or pass the bytes through untouched when no
//!   header matches
//! - **In-memory** decompression of a whole buffer ([`decompress`])
//!
//! Gzip, Zstd, Bzip2 and Zlib are recognised. Async counterparts require the
//! `async` feature and use [`futures`](::futures::io) traits (not Tokio).
//!
//! Detection happens exactly once, at the start of the stream. Bytes that
//! were peeked are never lost: they are replayed into the decoder, or into
//! the pass-through reader.

mod construct;
pub mod detect;
pub mod error;
#[cfg(feature = "async")]
mod futures;
mod open;
mod ops;
mod peek;
mod util;

pub use crate::detect::{Detector, Detectors, Signature, detect};
#[cfg(feature = "async")]
pub use crate::futures::open::{AsyncReader, open_async, open_detect_async};
pub use crate::open::{Reader, open, open_detect};
pub use crate::ops::decompress;

/// A recognised compression format.
///
/// Defaults to [`None`](Self::None), which is also what detection reports when
/// no known header matched. An unsupported-but-real compressed format cannot
/// be told apart from uncompressed data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// No known header (uncompressed, or an unrecognised format)
    #[default]
    None,
    /// Bzip2 compression (.bz2)
    Bzip2,
    /// Gzip compression (.gz)
    Gzip,
    /// Zlib (deflate with a zlib wrapper, .zz)
    Zlib,
    /// Zstd compression (.zst)
    Zstd,
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Compressors used only to produce test input; this crate never writes
    //! compressed data itself.

    use crate::Compression;
    use std::io::Write;

    pub fn compress(format: Compression, input: &[u8]) -> Vec<u8> {
        match format {
            Compression::None => input.to_vec(),
            Compression::Bzip2 => {
                let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
                encoder.write_all(input).unwrap();
                encoder.finish().unwrap()
            },
            Compression::Gzip => {
                let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(input).unwrap();
                encoder.finish().unwrap()
            },
            Compression::Zlib => {
                let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(input).unwrap();
                encoder.finish().unwrap()
            },
            Compression::Zstd => zstd::stream::encode_all(input, 3).unwrap(),
        }
    }

    pub fn plaintext() -> Vec<u8> {
        b"Hello, world! This is test data for transparent decompression. \
          It needs to be long enough to span more than one header peek."
            .to_vec()
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;

    #[test]
    fn compression_default() {
        assert_eq!(Compression::default(), Compression::None);
    }
}
