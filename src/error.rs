//! Error types for archive scanning, member decoding and text rewriting.
//!
//! Absence is never an error here: a missing header or an unmatched member
//! name comes back as `None`, and a checksum mismatch is reported through
//! [`ChecksumStatus`](crate::zip::ChecksumStatus). Everything in [`Error`]
//! aborts the current operation.

use thiserror::Error;

/// The error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the underlying file or stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A transport error while talking to a remote server.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote server answered, but not in a way we can use.
    #[error("{0}")]
    Remote(String),

    /// The member uses a compression method other than stored or deflate.
    #[error("Unsupported compression method {method} for '{name}'")]
    UnsupportedCompression { name: String, method: u16 },

    /// The deflate stream of a member is corrupt or truncated.
    #[error("Failed to inflate '{name}': {source}")]
    Inflate {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A member was requested at an offset where no local file header starts.
    #[error("No local file header at offset {0}")]
    MissingHeader(u64),

    /// A substitution pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A convenience `Result` alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
