//! Decoding of a single located member into a [`GrowableBuffer`].

use std::io;

use flate2::read::DeflateDecoder;
use log::{debug, warn};

use crate::buffer::GrowableBuffer;
use crate::error::{Error, Result};
use crate::io::{ReadAt, Section};

use super::structures::{CompressionMethod, LocalFileHeader};

/// Stored payloads are copied in chunks of this size.
const COPY_CHUNK: usize = 16 * 1024;

/// Upper bound for trusting a header's size as an allocation hint.
const MAX_PREALLOC: usize = 64 * 1024 * 1024;

/// Outcome of comparing the decoded bytes against the header's CRC-32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumStatus {
    Verified,
    /// The header carries a zero CRC, so there is nothing to compare with.
    Unverifiable,
    Mismatch { expected: u32, actual: u32 },
}

impl ChecksumStatus {
    pub fn compare(expected: u32, actual: u32) -> Self {
        if expected == 0 {
            ChecksumStatus::Unverifiable
        } else if expected == actual {
            ChecksumStatus::Verified
        } else {
            ChecksumStatus::Mismatch { expected, actual }
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, ChecksumStatus::Mismatch { .. })
    }
}

/// A decoded member together with its integrity status.
#[derive(Debug)]
pub struct DecodedMember {
    pub header: LocalFileHeader,
    pub data: GrowableBuffer,
    pub checksum: ChecksumStatus,
}

impl DecodedMember {
    /// Where sequential scanning continues: just past the payload and any
    /// data descriptor.
    pub fn next_offset(&self) -> u64 {
        self.header.next_header_offset()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data.into_raw()
    }
}

/// Decodes member payloads from a random access source.
pub struct MemberDecoder<'a, R: ReadAt + ?Sized> {
    reader: &'a R,
}

impl<'a, R: ReadAt + ?Sized> MemberDecoder<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Decode the payload described by `header`.
    ///
    /// A checksum mismatch is not an error; it is reported in
    /// [`DecodedMember::checksum`].
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedCompression`] for methods other than stored and
    ///   deflate
    /// - [`Error::Inflate`] if the deflate stream is corrupt
    /// - [`Error::Io`] if a stored payload is cut short
    pub fn decode(&self, header: &LocalFileHeader) -> Result<DecodedMember> {
        let (data, actual) = match header.compression_method {
            CompressionMethod::Stored => self.copy_stored(header)?,
            CompressionMethod::Deflate => self.inflate(header)?,
            CompressionMethod::Unknown(method) => {
                return Err(Error::UnsupportedCompression {
                    name: header.name(),
                    method,
                });
            }
        };

        let checksum = ChecksumStatus::compare(header.crc32, actual);
        if let ChecksumStatus::Mismatch { expected, actual } = checksum {
            warn!(
                "'{}': checksum mismatch (expected {expected:#010x}, got {actual:#010x})",
                header.name()
            );
        }
        debug!("decoded '{}': {} bytes", header.name(), data.len());

        Ok(DecodedMember {
            header: header.clone(),
            data,
            checksum,
        })
    }

    fn copy_stored(&self, header: &LocalFileHeader) -> Result<(GrowableBuffer, u32)> {
        let total = header.uncompressed_size as u64;
        let start = header.data_offset();
        let mut out = GrowableBuffer::with_capacity((total as usize).min(MAX_PREALLOC));
        let mut hasher = crc32fast::Hasher::new();
        let mut chunk = vec![0u8; COPY_CHUNK];
        let mut copied = 0u64;

        while copied < total {
            let n = ((total - copied) as usize).min(COPY_CHUNK);
            self.reader.read_exact_at(start + copied, &mut chunk[..n])?;
            out.append(&chunk[..n]);
            hasher.update(&chunk[..n]);
            copied += n as u64;
        }

        Ok((out, hasher.finalize()))
    }

    fn inflate(&self, header: &LocalFileHeader) -> Result<(GrowableBuffer, u32)> {
        let section = Section::new(
            self.reader,
            header.data_offset(),
            header.compressed_size as u64,
        );
        let mut decoder = DeflateDecoder::new(section);
        let mut out =
            GrowableBuffer::with_capacity((header.uncompressed_size as usize).min(MAX_PREALLOC));

        io::copy(&mut decoder, &mut out).map_err(|source| Error::Inflate {
            name: header.name(),
            source,
        })?;

        let crc = crc32fast::hash(out.as_bytes());
        Ok((out, crc))
    }
}
