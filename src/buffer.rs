//! A growable, spliceable byte buffer.
//!
//! [`GrowableBuffer`] is the storage every stage of the pipeline works on:
//! the member decoder streams into it, the rewriter splices it in place and
//! the wrapper reads it back out. Capacity grows in fixed steps and always
//! keeps one spare byte past the logical length.

use std::fmt;
use std::io;

/// Initial capacity of a new buffer.
const START_CAPACITY: usize = 128;

/// Capacity is always grown in multiples of this many bytes.
const GROW_STEP: usize = 128;

/// An owned byte sequence that grows automatically and supports in-place
/// range replacement.
///
/// The length is carried explicitly; embedded NUL bytes are ordinary data.
/// Any slice obtained from [`as_bytes`](Self::as_bytes) is invalidated by the
/// next mutating call, which the borrow checker enforces.
///
/// ## Example
///
/// ```
/// use odtext::GrowableBuffer;
///
/// let mut buf = GrowableBuffer::from("When shall we three meet again?");
/// assert_eq!(buf.splice(5, 10, b"can"), -2);
/// assert_eq!(buf.as_bytes(), b"When can we three meet again?");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct GrowableBuffer {
    data: Vec<u8>,
}

impl GrowableBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        let buf = Self {
            data: Vec::with_capacity(START_CAPACITY),
        };
        buf.check();
        buf
    }

    /// Create an empty buffer able to hold `len` bytes without growing.
    pub fn with_capacity(len: usize) -> Self {
        let mut buf = Self::new();
        buf.grow_to(len);
        buf
    }

    /// Take ownership of an existing byte vector without copying its contents.
    ///
    /// Only the spare terminator slot is reserved if the vector has no room
    /// left for it.
    pub fn from_raw(mut data: Vec<u8>) -> Self {
        if data.capacity() < data.len() + 1 {
            data.reserve_exact(1);
        }
        let buf = Self { data };
        buf.check();
        buf
    }

    /// Hand back the backing bytes, compacted to exactly `len + 1` bytes of
    /// capacity.
    pub fn into_raw(mut self) -> Vec<u8> {
        self.shrink();
        self.data
    }

    /// Release unused capacity, keeping exactly `len + 1` bytes.
    pub fn shrink(&mut self) {
        self.data.shrink_to(self.data.len() + 1);
        self.check();
    }

    /// Append `bytes` and return the new length.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        if bytes.is_empty() {
            return self.data.len();
        }

        self.grow_to(self.data.len() + bytes.len());
        self.data.extend_from_slice(bytes);

        self.check();
        self.data.len()
    }

    /// Replace the bytes in `start..end` with `replacement`.
    ///
    /// If `start` is greater than `end` the two are swapped. Returns the
    /// change in length: negative when the buffer shrank, zero when the
    /// length is unchanged and positive when it grew.
    ///
    /// # Panics
    ///
    /// Panics if the range reaches past the end of the buffer.
    pub fn splice(&mut self, start: usize, end: usize, replacement: &[u8]) -> isize {
        let (start, end) = if start > end { (end, start) } else { (start, end) };
        let len = self.data.len();
        assert!(
            end <= len,
            "splice range {start}..{end} out of bounds for buffer of length {len}"
        );

        let removed = end - start;
        let inserted = replacement.len();

        if inserted < removed {
            self.data[start..start + inserted].copy_from_slice(replacement);
            self.data.copy_within(end..len, start + inserted);
            self.data.truncate(len - (removed - inserted));
        } else if inserted == removed {
            self.data[start..end].copy_from_slice(replacement);
        } else {
            let grow = inserted - removed;
            self.grow_to(len + grow);
            self.data.resize(len + grow, 0);
            self.data.copy_within(end..len, end + grow);
            self.data[start..start + inserted].copy_from_slice(replacement);
        }

        self.check();
        inserted as isize - removed as isize
    }

    /// The contained bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Allocated capacity in bytes; always at least `len() + 1`.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Ensure room for `len` bytes plus the terminator slot, growing in
    /// whole steps.
    fn grow_to(&mut self, len: usize) {
        let needed = len + 1;
        if needed <= self.data.capacity() {
            return;
        }
        let mut capacity = self.data.capacity().max(START_CAPACITY);
        while capacity < needed {
            capacity += GROW_STEP;
        }
        self.data.reserve_exact(capacity - self.data.len());
    }

    #[inline]
    fn check(&self) {
        debug_assert!(
            self.data.capacity() > self.data.len(),
            "buffer capacity {} leaves no room past length {}",
            self.data.capacity(),
            self.data.len()
        );
    }
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GrowableBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("data", &String::from_utf8_lossy(&self.data))
            .field("len", &self.data.len())
            .field("capacity", &self.data.capacity())
            .finish()
    }
}

impl AsRef<[u8]> for GrowableBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for GrowableBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_raw(data)
    }
}

impl From<&str> for GrowableBuffer {
    fn from(text: &str) -> Self {
        let mut buf = Self::new();
        buf.append(text.as_bytes());
        buf
    }
}

impl io::Write for GrowableBuffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.append(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
