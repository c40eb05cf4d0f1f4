#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::DeflateEncoder;
use tempfile::TempDir;

pub mod server;

/// A ZIP archive assembled from local file headers only.
#[derive(Default)]
pub struct Archive {
    data: Vec<u8>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(self, name: &str, contents: &[u8]) -> Self {
        self.member(name, 0, crc32fast::hash(contents), contents, contents.len())
    }

    pub fn deflated(self, name: &str, contents: &[u8]) -> Self {
        let payload = deflate(contents);
        self.member(name, 8, crc32fast::hash(contents), &payload, contents.len())
    }

    /// A deflated member written with bit 3 set: zero CRC and sizes in the
    /// header, the real values in a data descriptor after the payload.
    pub fn streamed(self, name: &str, contents: &[u8]) -> Self {
        let payload = deflate(contents);
        let mut this = self.header(name, 8, 1 << 3, 0, 0, 0);
        this.data.extend_from_slice(&payload);
        this.data.extend_from_slice(b"PK\x07\x08");
        this.data.extend_from_slice(&crc32fast::hash(contents).to_le_bytes());
        this.data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        this.data.extend_from_slice(&(contents.len() as u32).to_le_bytes());
        this
    }

    /// A stored member whose header carries `crc` instead of the real value.
    pub fn stored_with_crc(self, name: &str, contents: &[u8], crc: u32) -> Self {
        self.member(name, 0, crc, contents, contents.len())
    }

    fn member(self, name: &str, method: u16, crc: u32, payload: &[u8], size: usize) -> Self {
        let mut this = self.header(name, method, 0, crc, payload.len(), size);
        this.data.extend_from_slice(payload);
        this
    }

    fn header(
        mut self,
        name: &str,
        method: u16,
        flags: u16,
        crc: u32,
        compressed: usize,
        size: usize,
    ) -> Self {
        self.data.extend_from_slice(b"PK\x03\x04");
        self.data.extend_from_slice(&20u16.to_le_bytes()); // version
        self.data.extend_from_slice(&flags.to_le_bytes());
        self.data.extend_from_slice(&method.to_le_bytes());
        self.data.extend_from_slice(&0x6C2Eu16.to_le_bytes()); // time
        self.data.extend_from_slice(&0x5A8Fu16.to_le_bytes()); // date
        self.data.extend_from_slice(&crc.to_le_bytes());
        self.data.extend_from_slice(&(compressed as u32).to_le_bytes());
        self.data.extend_from_slice(&(size as u32).to_le_bytes());
        self.data.extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.data.extend_from_slice(&0u16.to_le_bytes());
        self.data.extend_from_slice(name.as_bytes());
        self
    }

    pub fn bytes(mut self) -> Vec<u8> {
        self.data.extend_from_slice(b"PK\x05\x06");
        self.data.extend_from_slice(&[0u8; 18]);
        self.data
    }

    /// Write the archive into a fresh temporary directory.
    pub fn write(self, name: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, self.bytes()).unwrap();
        (dir, path)
    }
}

pub fn deflate(contents: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(contents).unwrap();
    encoder.finish().unwrap()
}

pub const MIMETYPE: &[u8] = b"application/vnd.oasis.opendocument.text";

/// A minimal OpenDocument text with `body` as the contents of
/// `<office:text>`.
pub fn odt(body: &str) -> Archive {
    let content = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<office:document-content office:version="1.2">"#,
            r#"<office:body><office:text>{}</office:text></office:body>"#,
            r#"</office:document-content>"#,
        ),
        body
    );
    Archive::new()
        .stored("mimetype", MIMETYPE)
        .deflated("meta.xml", b"<office:document-meta/>")
        .deflated("content.xml", content.as_bytes())
}
