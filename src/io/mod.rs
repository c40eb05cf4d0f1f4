mod http;
mod local;

pub use http::{BLOCK_SIZE, HttpRangeReader};
pub use local::LocalFileReader;

use std::io;

use crate::error::{Error, Result};

/// Trait for random access reading from a data source
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer.
    ///
    /// Returns the number of bytes read, which is short only at the end of
    /// the source.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Fill `buf` completely from `offset`, failing with
    /// [`io::ErrorKind::UnexpectedEof`] if the source ends first.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_at(offset + filled as u64, &mut buf[filled..])?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("source ended at offset {}", offset + filled as u64),
                )
                .into());
            }
            filled += n;
        }
        Ok(())
    }
}

impl<R: ReadAt + ?Sized> ReadAt for std::sync::Arc<R> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        (**self).read_at(offset, buf)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

impl ReadAt for [u8] {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(self.len());
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl ReadAt for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.as_slice().read_at(offset, buf)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}

/// A byte range of a [`ReadAt`] source exposed as a sequential [`io::Read`].
///
/// Lets stream decoders such as `flate2` consume a member payload without
/// reading past its end.
pub struct Section<'a, R: ReadAt + ?Sized> {
    reader: &'a R,
    pos: u64,
    end: u64,
}

impl<'a, R: ReadAt + ?Sized> Section<'a, R> {
    pub fn new(reader: &'a R, offset: u64, len: u64) -> Self {
        Self {
            reader,
            pos: offset,
            end: offset.saturating_add(len),
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> u64 {
        self.end - self.pos
    }
}

impl<R: ReadAt + ?Sized> io::Read for Section<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want = (buf.len() as u64).min(self.remaining()) as usize;
        if want == 0 {
            return Ok(0);
        }

        let n = self
            .reader
            .read_at(self.pos, &mut buf[..want])
            .map_err(|e| match e {
                Error::Io(e) => e,
                other => io::Error::other(other),
            })?;
        self.pos += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn slices_read_at_offsets() {
        let data = b"0123456789".to_vec();
        let mut buf = [0u8; 4];

        assert_eq!(data.read_at(3, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"3456");

        assert_eq!(data.read_at(8, &mut buf).unwrap(), 2);
        assert_eq!(data.read_at(42, &mut buf).unwrap(), 0);
    }

    #[test]
    fn read_exact_at_reports_short_sources() {
        let data = b"0123".to_vec();
        let mut buf = [0u8; 8];

        match data.read_exact_at(0, &mut buf) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected EOF, got {other:?}"),
        }
    }

    #[test]
    fn section_is_bounded() {
        let data = b"headerPAYLOADtrailer".to_vec();
        let mut section = Section::new(&data, 6, 7);
        let mut out = String::new();

        section.read_to_string(&mut out).unwrap();
        assert_eq!(out, "PAYLOAD");
        assert_eq!(section.remaining(), 0);
    }
}
