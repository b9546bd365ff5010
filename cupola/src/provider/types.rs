//! Error types for fetch-and-decode.

use thiserror::Error;

/// Network failure while fetching a locator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request exceeded its timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection could not be established or was dropped.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The response body could not be read.
    #[error("Failed to read response: {0}")]
    Body(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

/// Failure turning fetched bytes into a bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The byte stream is not a recognised image format.
    #[error("Unrecognised image format")]
    UnsupportedFormat,

    /// The format was recognised but the data is corrupt.
    #[error("Malformed image data: {0}")]
    Malformed(String),
}

/// Any fetch-and-decode failure.
///
/// Both variants are treated the same by the retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquireError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_error_is_transparent() {
        let err: AcquireError = FetchError::HttpStatus {
            status: 404,
            url: "http://example.com/a.png".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "HTTP 404 from http://example.com/a.png");

        let err: AcquireError = DecodeError::UnsupportedFormat.into();
        assert!(matches!(err, AcquireError::Decode(_)));
    }
}
