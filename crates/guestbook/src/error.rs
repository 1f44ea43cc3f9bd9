//! Guestbook error taxonomy.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`crate::WishStore`].
///
/// Raw I/O and JSON errors never leave the store uncategorized: they are
/// wrapped into one of these variants together with the path involved.
#[derive(Debug, Error)]
pub enum Error {
    /// Client-supplied data failed required-field validation.
    /// Lists every missing field by its wire name (`name`, `message`).
    #[error("missing required field(s): {}", .missing.join(", "))]
    InvalidInput { missing: Vec<&'static str> },

    /// The guestbook document could not be read or written.
    #[error("guestbook storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The guestbook document exists but is not a valid message list.
    #[error("guestbook storage at {} is malformed: {source}", .path.display())]
    MalformedStorage {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Every id above the largest stored one is taken.
    #[error("no message id left above the largest stored id")]
    IdsExhausted,

    /// The in-memory message list could not be encoded.
    #[error("failed to encode guestbook: {0}")]
    Encode(#[source] serde_json::Error),
}

impl Error {
    /// True for failures of the backing storage rather than of the request.
    ///
    /// Encoding failures count as storage failures: the write could not
    /// complete, and the caller may retry.
    pub fn is_storage(&self) -> bool {
        !matches!(self, Error::InvalidInput { .. })
    }

    /// Missing field names for `InvalidInput`, empty otherwise.
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            Error::InvalidInput { missing } => missing,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
