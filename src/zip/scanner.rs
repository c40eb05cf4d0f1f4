//! Sequential scanner over ZIP local file headers.
//!
//! This module walks an archive from the front, header by header, reading
//! from any source that implements the [`ReadAt`] trait.
//!
//! ## Scanning Strategy
//!
//! Each local file header is followed by the member's name, extra field and
//! payload, so the next header starts at
//! `offset + 30 + name + extra + compressed size (+ 16)`:
//! 1. Read the fixed 30-byte header and the file name in one step
//! 2. If the "streamed" flag is set, search forward for the data descriptor
//!    that carries the real CRC and sizes
//! 3. Skip the payload to reach the next header
//!
//! A signature mismatch or a source that ends early simply ends the walk.
//! Callers therefore cannot tell "no such member" apart from "archive
//! truncated during the scan"; both come back as `None`.

use std::ops::BitOr;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::io::ReadAt;

use super::structures::{DataDescriptor, LocalFileHeader};

/// How many bytes are examined per read while searching for a data
/// descriptor.
const SEARCH_CHUNK: usize = 4096;

/// Name matching policy for [`ArchiveScanner::locate_by_name`].
///
/// Two independent bits: bit 0 selects an exact match (otherwise the stored
/// name only has to contain the query), bit 1 selects a case-sensitive
/// comparison (otherwise ASCII case is ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchFlags(u8);

impl MatchFlags {
    /// Substring match ignoring case.
    pub const PARTIAL: Self = Self(0);
    pub const EXACT: Self = Self(1);
    pub const CASE_SENSITIVE: Self = Self(2);

    /// Build flags from their numeric form; unknown bits are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b11)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_exact(self) -> bool {
        self.0 & Self::EXACT.0 != 0
    }

    pub const fn is_case_sensitive(self) -> bool {
        self.0 & Self::CASE_SENSITIVE.0 != 0
    }

    /// Whether a stored `name` satisfies `query` under this policy.
    pub fn matches(self, name: &[u8], query: &[u8]) -> bool {
        match (self.is_exact(), self.is_case_sensitive()) {
            (true, true) => name == query,
            (true, false) => name.eq_ignore_ascii_case(query),
            (false, case_sensitive) => {
                if query.is_empty() {
                    return true;
                }
                name.windows(query.len()).any(|window| {
                    if case_sensitive {
                        window == query
                    } else {
                        window.eq_ignore_ascii_case(query)
                    }
                })
            }
        }
    }
}

impl BitOr for MatchFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Walks local file headers from a byte offset.
///
/// The scanner is also an iterator over consecutive headers starting at its
/// cursor.
///
/// ## Example
///
/// ```ignore
/// let mut scanner = ArchiveScanner::new(&reader);
/// if let Some(header) = scanner.locate_by_name(b"content.xml", MatchFlags::EXACT, None)? {
///     let member = MemberDecoder::new(&reader).decode(&header)?;
/// }
/// ```
pub struct ArchiveScanner<'a, R: ReadAt + ?Sized> {
    /// The underlying data source
    reader: &'a R,
    /// Offset of the next header to examine
    cursor: u64,
    /// Set once iteration hit an I/O error
    failed: bool,
}

impl<'a, R: ReadAt + ?Sized> ArchiveScanner<'a, R> {
    /// Create a scanner positioned at the start of the archive.
    pub fn new(reader: &'a R) -> Self {
        Self::starting_at(reader, 0)
    }

    /// Create a scanner positioned at `offset`.
    pub fn starting_at(reader: &'a R, offset: u64) -> Self {
        Self {
            reader,
            cursor: offset,
            failed: false,
        }
    }

    /// Read and decode the local file header at `offset`.
    ///
    /// Streamed metadata is resolved before the header is returned, so the
    /// CRC and sizes are always the real ones.
    ///
    /// # Returns
    ///
    /// `None` if there is no header at `offset`: the signature does not
    /// match, the source ends inside the header, or a streamed member has no
    /// data descriptor after it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the source itself fails.
    pub fn read_header(&self, offset: u64) -> Result<Option<LocalFileHeader>> {
        let mut fixed = [0u8; LocalFileHeader::SIZE];
        if !self.read_fully(offset, &mut fixed)? {
            return Ok(None);
        }

        let Some(mut header) = LocalFileHeader::from_bytes(offset, &fixed) else {
            trace!("no local file header at {offset}");
            return Ok(None);
        };

        let mut name = vec![0u8; header.file_name_length as usize];
        if !self.read_fully(offset + LocalFileHeader::SIZE as u64, &mut name)? {
            return Ok(None);
        }
        header.file_name = name;

        if header.is_streamed() {
            match self.resolve_streamed_metadata(&header)? {
                Some(descriptor) => header.apply_descriptor(&descriptor),
                None => {
                    debug!(
                        "'{}' at {offset}: data descriptor not found",
                        header.name()
                    );
                    return Ok(None);
                }
            }
        }

        Ok(Some(header))
    }

    /// Read the header at the cursor and move the cursor past its member.
    pub fn next_header(&mut self) -> Result<Option<LocalFileHeader>> {
        let header = self.read_header(self.cursor)?;
        if let Some(header) = &header {
            self.cursor = header.next_header_offset();
        }
        Ok(header)
    }

    /// Find the first member whose stored name satisfies `query` under
    /// `flags`.
    ///
    /// # Arguments
    ///
    /// * `query` - The name, or name fragment, to look for
    /// * `flags` - Exact/substring and case policy
    /// * `resume_offset` - Offset of a previously returned header; the walk
    ///   starts there and skips that header. `None` starts at the beginning.
    ///
    /// # Returns
    ///
    /// The matching header, or `None` when the walk ends without a match.
    pub fn locate_by_name(
        &mut self,
        query: &[u8],
        flags: MatchFlags,
        resume_offset: Option<u64>,
    ) -> Result<Option<LocalFileHeader>> {
        self.cursor = resume_offset.unwrap_or(0);
        self.failed = false;

        while let Some(header) = self.next_header()? {
            if resume_offset.is_some_and(|skip| header.offset <= skip) {
                continue;
            }
            if flags.matches(&header.file_name, query) {
                debug!("found '{}' at {}", header.name(), header.offset);
                return Ok(Some(header));
            }
        }

        Ok(None)
    }

    /// Search forward from the payload for the data descriptor signature,
    /// one byte at a time.
    fn resolve_streamed_metadata(&self, header: &LocalFileHeader) -> Result<Option<DataDescriptor>> {
        let size = self.reader.size();
        let signature_len = DataDescriptor::SIGNATURE.len();
        let mut window = vec![0u8; SEARCH_CHUNK];
        let mut pos = header.data_offset();

        while pos + DataDescriptor::SIZE as u64 <= size {
            let want = ((size - pos) as usize).min(SEARCH_CHUNK);
            let n = self.reader.read_at(pos, &mut window[..want])?;
            if n < signature_len {
                break;
            }

            if let Some(i) = window[..n]
                .windows(signature_len)
                .position(|w| w == DataDescriptor::SIGNATURE)
            {
                let mut record = [0u8; DataDescriptor::SIZE];
                if !self.read_fully(pos + i as u64, &mut record)? {
                    return Ok(None);
                }
                return Ok(DataDescriptor::from_bytes(&record));
            }

            // Keep the last few bytes so a signature split across reads is seen
            pos += (n - (signature_len - 1)) as u64;
        }

        Ok(None)
    }

    /// Fill `buf` from `offset`; `false` if the source ends first.
    fn read_fully(&self, offset: u64, buf: &mut [u8]) -> Result<bool> {
        match self.reader.read_exact_at(offset, buf) {
            Ok(()) => Ok(true),
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<R: ReadAt + ?Sized> Iterator for ArchiveScanner<'_, R> {
    type Item = Result<LocalFileHeader>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_header() {
            Ok(header) => header.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
