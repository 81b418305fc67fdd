use crate::Compression;
use crate::detect::Detectors;
use crate::error::{Error, ErrorKind};
use exn::OptionExt;
use std::str::FromStr;

/// Parse any of a kind's [`aliases`](Compression::aliases), ignoring case.
impl FromStr for Compression {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Compression::ALL
            .into_iter()
            .find(|kind| kind.aliases().contains(&name.as_str()))
            .ok_or_raise(|| ErrorKind::UnsupportedFormat(s.to_string()))
    }
}

/// Detect the compression format from a header using the global
/// [`Detectors`] table.
impl From<&[u8]> for Compression {
    fn from(value: &[u8]) -> Self {
        Detectors::global().detect(value)
    }
}
