//! Builds small archives out of local file headers for tests.

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

use super::structures::{DataDescriptor, FLAG_STREAMED, LocalFileHeader};

pub(crate) fn deflate(contents: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(contents).unwrap();
    encoder.finish().unwrap()
}

pub(crate) struct ZipBuilder {
    data: Vec<u8>,
}

impl ZipBuilder {
    pub(crate) fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Offset the next member's header will be written at.
    pub(crate) fn offset(&self) -> u64 {
        self.data.len() as u64
    }

    pub(crate) fn stored(self, name: &str, contents: &[u8]) -> Self {
        let crc = crc32fast::hash(contents);
        self.entry(name, 0, 0, crc, contents, contents.len() as u32)
    }

    pub(crate) fn deflated(self, name: &str, contents: &[u8]) -> Self {
        let crc = crc32fast::hash(contents);
        let payload = deflate(contents);
        self.entry(name, 8, 0, crc, &payload, contents.len() as u32)
    }

    /// A deflated member whose CRC and sizes only appear in a trailing data
    /// descriptor.
    pub(crate) fn streamed(mut self, name: &str, contents: &[u8]) -> Self {
        let payload = deflate(contents);
        self.header(name, 8, FLAG_STREAMED, 0, 0, 0);
        self.data.extend_from_slice(&payload);
        self.data.extend_from_slice(DataDescriptor::SIGNATURE);
        self.data
            .extend_from_slice(&crc32fast::hash(contents).to_le_bytes());
        self.data
            .extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.data
            .extend_from_slice(&(contents.len() as u32).to_le_bytes());
        self
    }

    pub(crate) fn entry(
        mut self,
        name: &str,
        method: u16,
        flags: u16,
        crc: u32,
        payload: &[u8],
        uncompressed_size: u32,
    ) -> Self {
        self.header(
            name,
            method,
            flags,
            crc,
            payload.len() as u32,
            uncompressed_size,
        );
        self.data.extend_from_slice(payload);
        self
    }

    /// Close the local headers with the start of a central directory, which
    /// the scanner sees as a signature mismatch.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        self.data.extend_from_slice(b"PK\x01\x02");
        self.data.extend_from_slice(&[0u8; 42]);
        self.data
    }

    fn header(
        &mut self,
        name: &str,
        method: u16,
        flags: u16,
        crc: u32,
        compressed_size: u32,
        uncompressed_size: u32,
    ) {
        let extra = [0x55, 0x54, 0x01, 0x00, 0x00];
        self.data.extend_from_slice(LocalFileHeader::SIGNATURE);
        self.data.extend_from_slice(&20u16.to_le_bytes());
        self.data.extend_from_slice(&flags.to_le_bytes());
        self.data.extend_from_slice(&method.to_le_bytes());
        self.data.extend_from_slice(&0u16.to_le_bytes());
        self.data.extend_from_slice(&0x5A8Fu16.to_le_bytes());
        self.data.extend_from_slice(&crc.to_le_bytes());
        self.data.extend_from_slice(&compressed_size.to_le_bytes());
        self.data.extend_from_slice(&uncompressed_size.to_le_bytes());
        self.data
            .extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.data
            .extend_from_slice(&(extra.len() as u16).to_le_bytes());
        self.data.extend_from_slice(name.as_bytes());
        self.data.extend_from_slice(&extra);
    }
}
