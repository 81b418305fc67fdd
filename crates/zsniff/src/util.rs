//! Names and extensions.
//!
//! Every kind has a list of accepted names; the first is the canonical one
//! used for display and log fields, the rest are accepted when parsing.

use crate::Compression;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl Compression {
    /// Every kind, the pass-through `None` first.
    pub const ALL: [Compression; 5] =
        [Compression::None, Compression::Gzip, Compression::Zstd, Compression::Bzip2, Compression::Zlib];

    /// Names this kind answers to, canonical name first. Matched
    /// case-insensitively by [`FromStr`](std::str::FromStr).
    #[must_use]
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Compression::None => &["none"],
            Compression::Gzip => &["gzip", "gz"],
            Compression::Zstd => &["zstd", "zst"],
            Compression::Bzip2 => &["bzip2", "bz2"],
            Compression::Zlib => &["zlib", "zz"],
        }
    }

    /// Canonical name, used in log fields.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Conventional file suffix, dot included (empty for `None`).
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Compression::None => "",
            Compression::Gzip => ".gz",
            Compression::Zstd => ".zst",
            Compression::Bzip2 => ".bz2",
            Compression::Zlib => ".zz",
        }
    }

    /// `true` if a decoder sits between the caller and the bytes.
    #[inline]
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Compression::None)
    }
}
