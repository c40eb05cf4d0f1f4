use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// General purpose flag: CRC and sizes follow the payload in a data descriptor
pub const FLAG_STREAMED: u16 = 1 << 3;

/// Local File Header (LFH) - 30 bytes plus file name and extra field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    /// Offset of the header's signature in the archive
    pub offset: u64,
    pub version: u16,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
    /// 16 once a trailing data descriptor has been resolved, 0 otherwise
    pub descriptor_length: u8,
    /// Raw file name bytes as stored in the archive
    pub file_name: Vec<u8>,
}

impl LocalFileHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x03\x04";
    pub const SIZE: usize = 30;

    /// Parse the fixed part of a header read at `offset`.
    ///
    /// Returns `None` when the signature does not match, which marks the end
    /// of the local headers rather than an error. The file name is left
    /// empty for the caller to fill in.
    pub fn from_bytes(offset: u64, data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return None;
        }

        let mut cursor = Cursor::new(&data[4..Self::SIZE]);

        let version = cursor.read_u16::<LittleEndian>().ok()?;
        let flags = cursor.read_u16::<LittleEndian>().ok()?;
        let compression_method = CompressionMethod::from_u16(cursor.read_u16::<LittleEndian>().ok()?);
        let last_mod_time = cursor.read_u16::<LittleEndian>().ok()?;
        let last_mod_date = cursor.read_u16::<LittleEndian>().ok()?;
        let crc32 = cursor.read_u32::<LittleEndian>().ok()?;
        let compressed_size = cursor.read_u32::<LittleEndian>().ok()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>().ok()?;
        let file_name_length = cursor.read_u16::<LittleEndian>().ok()?;
        let extra_field_length = cursor.read_u16::<LittleEndian>().ok()?;

        Some(Self {
            offset,
            version,
            flags,
            compression_method,
            last_mod_time,
            last_mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            file_name_length,
            extra_field_length,
            descriptor_length: 0,
            file_name: Vec::new(),
        })
    }

    /// Whether CRC and sizes trail the payload instead of preceding it
    pub fn is_streamed(&self) -> bool {
        self.flags & FLAG_STREAMED != 0
    }

    /// File name with invalid UTF-8 replaced
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.file_name).into_owned()
    }

    /// Directory entries end with '/'
    pub fn is_directory(&self) -> bool {
        self.file_name.last() == Some(&b'/')
    }

    /// Offset of the first payload byte
    pub fn data_offset(&self) -> u64 {
        self.offset
            + Self::SIZE as u64
            + self.file_name_length as u64
            + self.extra_field_length as u64
    }

    /// Offset just past the payload and any data descriptor, where the next
    /// header starts
    pub fn next_header_offset(&self) -> u64 {
        self.data_offset() + self.compressed_size as u64 + self.descriptor_length as u64
    }

    /// Apply the values from a resolved data descriptor
    pub fn apply_descriptor(&mut self, descriptor: &DataDescriptor) {
        self.crc32 = descriptor.crc32;
        self.compressed_size = descriptor.compressed_size;
        self.uncompressed_size = descriptor.uncompressed_size;
        self.descriptor_length = DataDescriptor::SIZE as u8;
    }

    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}

/// Data descriptor trailing a streamed member - 16 bytes with signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
}

impl DataDescriptor {
    pub const SIGNATURE: &'static [u8] = b"PK\x07\x08";
    pub const SIZE: usize = 16;

    /// Parse a descriptor starting at its signature
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return None;
        }

        let mut cursor = Cursor::new(&data[4..Self::SIZE]);

        Some(Self {
            crc32: cursor.read_u32::<LittleEndian>().ok()?,
            compressed_size: cursor.read_u32::<LittleEndian>().ok()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>().ok()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(flags: u16, method: u16, name: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(LocalFileHeader::SIGNATURE);
        data.extend_from_slice(&20u16.to_le_bytes());
        data.extend_from_slice(&flags.to_le_bytes());
        data.extend_from_slice(&method.to_le_bytes());
        data.extend_from_slice(&0x6C2Eu16.to_le_bytes());
        data.extend_from_slice(&0x5A8Fu16.to_le_bytes());
        data.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        data.extend_from_slice(&11u32.to_le_bytes());
        data.extend_from_slice(&13u32.to_le_bytes());
        data.extend_from_slice(&(name.len() as u16).to_le_bytes());
        data.extend_from_slice(&4u16.to_le_bytes());
        data.extend_from_slice(name);
        data
    }

    #[test]
    fn parses_fixed_fields() {
        let data = header_bytes(0, 8, b"content.xml");
        let header = LocalFileHeader::from_bytes(100, &data).unwrap();

        assert_eq!(header.offset, 100);
        assert_eq!(header.version, 20);
        assert_eq!(header.compression_method, CompressionMethod::Deflate);
        assert_eq!(header.crc32, 0xDEADBEEF);
        assert_eq!(header.compressed_size, 11);
        assert_eq!(header.uncompressed_size, 13);
        assert_eq!(header.file_name_length, 11);
        assert_eq!(header.extra_field_length, 4);
        assert!(!header.is_streamed());

        assert_eq!(header.data_offset(), 100 + 30 + 11 + 4);
        assert_eq!(header.next_header_offset(), 100 + 30 + 11 + 4 + 11);
    }

    #[test]
    fn signature_mismatch_is_absence() {
        let mut data = header_bytes(0, 0, b"a");
        data[3] = 0x05;
        assert!(LocalFileHeader::from_bytes(0, &data).is_none());
        assert!(LocalFileHeader::from_bytes(0, &data[..12]).is_none());
    }

    #[test]
    fn descriptor_extends_next_offset() {
        let data = header_bytes(FLAG_STREAMED, 8, b"x");
        let mut header = LocalFileHeader::from_bytes(0, &data).unwrap();
        assert!(header.is_streamed());

        let mut raw = DataDescriptor::SIGNATURE.to_vec();
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.extend_from_slice(&2u32.to_le_bytes());
        raw.extend_from_slice(&3u32.to_le_bytes());
        let descriptor = DataDescriptor::from_bytes(&raw).unwrap();

        header.apply_descriptor(&descriptor);
        assert_eq!(header.crc32, 1);
        assert_eq!(header.compressed_size, 2);
        assert_eq!(header.uncompressed_size, 3);
        assert_eq!(header.next_header_offset(), 30 + 1 + 4 + 2 + 16);
    }

    #[test]
    fn dos_timestamps() {
        let data = header_bytes(0, 0, b"a");
        let header = LocalFileHeader::from_bytes(0, &data).unwrap();

        // 0x5A8F: 2025-04-15, 0x6C2E: 13:33:28
        assert_eq!(header.mod_date(), (2025, 4, 15));
        assert_eq!(header.mod_time(), (13, 33, 28));
    }

    #[test]
    fn unknown_methods_round_trip() {
        assert_eq!(CompressionMethod::from_u16(12), CompressionMethod::Unknown(12));
        assert_eq!(CompressionMethod::Unknown(12).as_u16(), 12);
        assert_eq!(CompressionMethod::from_u16(0).as_u16(), 0);
    }
}
