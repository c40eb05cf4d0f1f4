use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::io::{LocalFileReader, ReadAt};

use super::decoder::{DecodedMember, MemberDecoder};
use super::scanner::{ArchiveScanner, MatchFlags};
use super::structures::LocalFileHeader;

/// A ZIP archive read through its local file headers
pub struct Archive<R: ReadAt> {
    reader: Arc<R>,
}

impl Archive<LocalFileReader> {
    /// Open an archive on the local filesystem
    pub fn open_path(path: &Path) -> Result<Self> {
        Ok(Self::new(Arc::new(LocalFileReader::new(path)?)))
    }
}

impl<R: ReadAt> Archive<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// A scanner positioned at the first header
    pub fn scanner(&self) -> ArchiveScanner<'_, R> {
        ArchiveScanner::new(&*self.reader)
    }

    /// List every member reachable by walking the local headers
    pub fn headers(&self) -> Result<Vec<LocalFileHeader>> {
        self.scanner().collect()
    }

    /// Find the first member whose name satisfies `name` under `flags`,
    /// starting after `resume_offset` if given
    pub fn locate(
        &self,
        name: &str,
        flags: MatchFlags,
        resume_offset: Option<u64>,
    ) -> Result<Option<LocalFileHeader>> {
        self.scanner()
            .locate_by_name(name.as_bytes(), flags, resume_offset)
    }

    /// Decode the member described by `header`
    pub fn decode(&self, header: &LocalFileHeader) -> Result<DecodedMember> {
        MemberDecoder::new(&*self.reader).decode(header)
    }

    /// Decode the member whose local header starts at `offset`
    pub fn decode_at(&self, offset: u64) -> Result<DecodedMember> {
        let header = self
            .scanner()
            .read_header(offset)?
            .ok_or(Error::MissingHeader(offset))?;
        self.decode(&header)
    }

    /// Locate a member by name and decode it
    pub fn extract(&self, name: &str, flags: MatchFlags) -> Result<Option<DecodedMember>> {
        match self.locate(name, flags, None)? {
            Some(header) => self.decode(&header).map(Some),
            None => Ok(None),
        }
    }
}

/// Find the offset of the first member of the archive at `path` whose name
/// satisfies `name` under `flags`.
///
/// The archive is opened and closed within the call.
pub fn locate_member(path: impl AsRef<Path>, name: &str, flags: MatchFlags) -> Result<Option<u64>> {
    let archive = Archive::open_path(path.as_ref())?;
    Ok(archive.locate(name, flags, None)?.map(|header| header.offset))
}

/// Decode the member whose local header starts at `offset` in the archive at
/// `path`.
///
/// The archive is opened and closed within the call.
pub fn decode_member_at(path: impl AsRef<Path>, offset: u64) -> Result<DecodedMember> {
    Archive::open_path(path.as_ref())?.decode_at(offset)
}
