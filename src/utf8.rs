//! Character counting over UTF-8 byte sequences.
//!
//! Counting works on raw bytes so that it never fails: a stray continuation
//! byte simply counts as one character.

/// Number of continuation bytes that follow a lead byte, indexed by
/// `lead - 0x80`. Covers the historic five- and six-byte forms as well.
pub static UTF8_TRAILING: [u8; 128] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 0x80-0x8f
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 0x90-0x9f
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 0xa0-0xaf
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 0xb0-0xbf
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 0xc0-0xcf
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 0xd0-0xdf
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, // 0xe0-0xef
    3, 3, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 0, 0, // 0xf0-0xff
];

/// Length in bytes of the sequence introduced by `lead`.
#[inline]
pub fn char_len(lead: u8) -> usize {
    if lead < 0x80 {
        1
    } else {
        1 + UTF8_TRAILING[(lead - 0x80) as usize] as usize
    }
}

/// Number of displayed characters in `bytes`, counting each multi-byte
/// sequence once.
pub fn char_count(bytes: &[u8]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        i += char_len(bytes[i]);
        count += 1;
    }
    count
}
