//! Header Matcher Table
//!
//! An ordered list of [`Detector`]s, each pairing a bytemask with a predicate
//! over the masked header bytes. Detection is a pure function of a byte
//! slice: the first detector whose predicate holds wins, and
//! [`Compression::None`] is reported when none do.

use crate::Compression;
use std::sync::LazyLock;

const GZIP_MAGIC: [u8; 3] = [0x1F, 0x8B, 0x08];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
const BZIP2_MAGIC: [u8; 3] = [b'B', b'Z', b'h'];

/// Adler-32 of an empty byte sequence. A zlib stream that does not depend
/// on a preset dictionary carries this value as its dictionary checksum.
const EMPTY_ADLER32: u32 = 1;

static GLOBAL: LazyLock<Detectors> = LazyLock::new(Detectors::standard);

/// Reports whether a header belongs to a certain compression format.
pub trait Detector: Send + Sync {
    /// The format reported when [`matches`](Self::matches) holds.
    fn compression(&self) -> Compression;

    /// Bytemask applied pairwise to the header before it is checked. Its
    /// length is the number of header bytes this detector needs.
    fn mask(&self) -> &[u8];

    /// Reports if the masked header belongs to this format.
    ///
    /// The passed slice is exactly [`mask_len`](Self::mask_len) bytes long
    /// and has already been ANDed pairwise with the mask.
    fn matches(&self, header: &[u8]) -> bool;

    fn mask_len(&self) -> usize {
        self.mask().len()
    }
}

/// A [`Detector`] for formats that start with a constant byte string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    compression: Compression,
    magic: &'static [u8],
    mask: Box<[u8]>,
}

impl Signature {
    pub fn new(compression: Compression, magic: &'static [u8]) -> Self {
        Self {
            compression,
            magic,
            mask: vec![0xFF; magic.len()].into_boxed_slice(),
        }
    }
}

impl Detector for Signature {
    fn compression(&self) -> Compression {
        self.compression
    }

    fn mask(&self) -> &[u8] {
        &self.mask
    }

    fn matches(&self, header: &[u8]) -> bool {
        header == self.magic
    }
}

/// The bzip2 magic is technically only `BZ`. The third byte `h` rules out the
/// bzip1-compat format, and the fourth is the block size level, which has to
/// be a digit between `1` and `9`.
#[derive(Clone, Copy, Debug, Default)]
struct Bzip2Header;

impl Detector for Bzip2Header {
    fn compression(&self) -> Compression {
        Compression::Bzip2
    }

    fn mask(&self) -> &[u8] {
        &[0xFF; 4]
    }

    fn matches(&self, header: &[u8]) -> bool {
        let level = header[BZIP2_MAGIC.len()];
        header.starts_with(&BZIP2_MAGIC) && (b'1'..=b'9').contains(&level)
    }
}

/// The zlib header is bit-packed, so it needs more than a byte comparison.
#[derive(Clone, Copy, Debug, Default)]
struct ZlibHeader;

impl ZlibHeader {
    const DEFLATE: u8 = 8;
    const MAX_WINDOW: u8 = 7;
    const PRESET_DICTIONARY: u8 = 0x20;
}

impl Detector for ZlibHeader {
    fn compression(&self) -> Compression {
        Compression::Zlib
    }

    fn mask(&self) -> &[u8] {
        &[0xFF; 6]
    }

    fn matches(&self, header: &[u8]) -> bool {
        let check = u16::from_be_bytes([header[0], header[1]]);
        if header[0] & 0x0F != Self::DEFLATE || header[0] >> 4 > Self::MAX_WINDOW || check % 31 != 0 {
            return false;
        }
        // A dictionary checksum other than the empty one cannot be verified
        // without the dictionary itself.
        if header[1] & Self::PRESET_DICTIONARY != 0 {
            let dictionary = u32::from_be_bytes([header[2], header[3], header[4], header[5]]);
            return dictionary == EMPTY_ADLER32;
        }
        true
    }
}

/// An ordered, immutable table of [`Detector`]s.
///
/// The number of header bytes needed to run every detector is computed once
/// on construction. Build a table once and share it by reference; most
/// callers want the [`global`](Self::global) one.
pub struct Detectors {
    detectors: Vec<Box<dyn Detector>>,
    max_len: usize,
}

impl Detectors {
    /// Build a table that runs `detectors` in the given order.
    ///
    /// # Panics
    ///
    /// If a detector has an empty mask or reports [`Compression::None`].
    /// Both are programmer errors rather than runtime conditions.
    pub fn new(detectors: Vec<Box<dyn Detector>>) -> Self {
        for detector in &detectors {
            assert!(
                detector.mask_len() > 0,
                "programmer error: detector for {} has an empty mask",
                detector.compression()
            );
            assert!(
                detector.compression().is_compressed(),
                "programmer error: detector reports {} as a match",
                Compression::None
            );
        }
        let max_len = detectors.iter().map(|d| d.mask_len()).max().unwrap_or_default();
        Self { detectors, max_len }
    }

    /// The supported formats, in priority order: Gzip, Zstd, Bzip2, Zlib.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(Signature::new(Compression::Gzip, &GZIP_MAGIC)),
            Box::new(Signature::new(Compression::Zstd, &ZSTD_MAGIC)),
            Box::new(Bzip2Header),
            Box::new(ZlibHeader),
        ])
    }

    /// The process-wide [`standard`](Self::standard) table, built on first use.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Number of bytes needed to run every detector in this table.
    #[inline]
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Report the compression format indicated by the header at the start of
    /// `bytes`.
    ///
    /// Detectors needing more bytes than are available are skipped, so short
    /// input never fails; it just matches fewer formats. [`Compression::None`]
    /// is returned if every detector reports false, but it's possible that
    /// the data uses a format this table doesn't know about.
    #[must_use]
    pub fn detect(&self, bytes: &[u8]) -> Compression {
        let mut header = Vec::with_capacity(self.max_len);
        for detector in &self.detectors {
            let mask = detector.mask();
            if bytes.len() < mask.len() {
                continue;
            }
            header.clear();
            header.extend(bytes.iter().zip(mask).map(|(byte, mask)| byte & mask));
            if detector.matches(&header) {
                return detector.compression();
            }
        }
        Compression::None
    }
}

impl Default for Detectors {
    fn default() -> Self {
        Self::standard()
    }
}

/// Detect the compression format from a header using the global
/// [`Detectors`] table.
///
/// # Examples
///
/// ```
/// use zsniff::{Compression, detect};
///
/// assert_eq!(detect(&[0x1F, 0x8B, 0x08, 0x00]), Compression::Gzip);
/// assert_eq!(detect(b"BZh9"), Compression::Bzip2);
/// assert_eq!(detect(b"plain text"), Compression::None);
/// ```
#[must_use]
pub fn detect(bytes: &[u8]) -> Compression {
    Detectors::global().detect(bytes)
}
