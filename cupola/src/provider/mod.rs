//! Fetch and decode collaborators for image acquisition.
//!
//! The acquisition worker only sees the [`Fetcher`] and [`Decoder`] traits,
//! which keeps the HTTP stack and the image codecs swappable (and mockable
//! in tests).
//!
//! ```ignore
//! use std::time::Duration;
//! use cupola::provider::{Fetcher, ImageCrateDecoder, Decoder, ReqwestFetcher};
//!
//! let fetcher = ReqwestFetcher::new("Mozilla/5.0")?;
//! let bytes = fetcher.fetch(&"https://example.com/earth.jpg".into(), Duration::from_secs(30))?;
//! let decoded = ImageCrateDecoder.decode(&bytes)?;
//! ```

mod decode;
mod http;
mod types;

pub use decode::{DecodedImage, Decoder, ImageCrateDecoder};
pub use http::{Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use types::{AcquireError, DecodeError, FetchError};

#[cfg(test)]
pub use decode::tests::test_png;
#[cfg(test)]
pub use http::tests::MockFetcher;
