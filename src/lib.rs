//! # odtext
//!
//! Plain-text rendering of OpenDocument text files, local or over HTTP.
//!
//! An OpenDocument file is a ZIP archive. This library finds one member
//! (normally `content.xml`) by walking the local file headers, decodes it
//! and rewrites its XML into wrapped plain text with an ordered battery of
//! regular-expression substitutions. Remote files are read with HTTP Range
//! requests, so only the headers and the member itself are downloaded.
//!
//! ## Features
//!
//! - Locate archive members by exact or partial, case-sensitive or
//!   case-insensitive name
//! - Decode STORED and DEFLATE members with CRC-32 verification, including
//!   members whose sizes live in a trailing data descriptor
//! - In-place pattern rewriting of a [`GrowableBuffer`]
//! - Line wrapping and conversion to the locale's character set
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use odtext::text::{self, FormatOptions};
//! use odtext::zip::{Archive, MatchFlags};
//!
//! fn main() -> anyhow::Result<()> {
//!     let archive = Archive::open_path(Path::new("report.odt"))?;
//!
//!     let member = archive
//!         .extract("content.xml", MatchFlags::EXACT | MatchFlags::CASE_SENSITIVE)?
//!         .ok_or_else(|| anyhow::anyhow!("not an OpenDocument Text"))?;
//!
//!     let out = text::render(member.data, &FormatOptions::default())?;
//!     print!("{}", String::from_utf8_lossy(&out));
//!
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod cli;
pub mod error;
pub mod io;
pub mod logging;
pub mod rewrite;
pub mod text;
pub mod utf8;
pub mod zip;

pub use buffer::GrowableBuffer;
pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{HttpRangeReader, LocalFileReader, ReadAt};
pub use zip::{Archive, ChecksumStatus, DecodedMember, MatchFlags, decode_member_at, locate_member};
