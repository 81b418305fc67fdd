//! Async detection and decompression.
//!
//! Provides async counterparts to the sync APIs in the parent module, using
//! [`futures::io`] traits (`AsyncRead`/`AsyncBufRead`) rather than
//! Tokio-specific types for runtime portability.
//!
//! Requires the `async` feature.

pub(crate) mod open;
pub(crate) mod ops;
pub(crate) mod peek;
