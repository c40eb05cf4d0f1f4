//! ZIP member location and decoding.
//!
//! This module finds one named member of a ZIP archive and decodes it,
//! working only from the local file headers at the front of each member.
//!
//! ## Architecture
//!
//! The module is organized into four components:
//!
//! - [`structures`]: Local file header and data descriptor layouts
//! - [`scanner`]: Header-by-header walk with name lookup
//! - [`decoder`]: Stored/deflate payload decoding with CRC-32 verification
//! - [`archive`]: High-level API over any [`ReadAt`](crate::io::ReadAt) source
//!
//! ## ZIP Format Overview
//!
//! Each member of a ZIP file is laid out as:
//! 1. A 30-byte local file header (`PK\x03\x04`)
//! 2. The file name and extra field
//! 3. The payload, stored or deflate-compressed
//! 4. If bit 3 of the flags is set, a 16-byte data descriptor
//!    (`PK\x07\x08`) with the CRC and sizes the header could not carry
//!
//! The central directory at the end of the archive is never consulted; the
//! walk stops at the first record that is not a local file header.
//!
//! ## Limitations
//!
//! - No ZIP64 support
//! - No encryption support
//! - STORED and DEFLATE only

mod archive;
mod decoder;
mod scanner;
mod structures;

#[cfg(test)]
pub(crate) mod testing;

pub use archive::{Archive, decode_member_at, locate_member};
pub use decoder::{ChecksumStatus, DecodedMember, MemberDecoder};
pub use scanner::{ArchiveScanner, MatchFlags};
pub use structures::*;
