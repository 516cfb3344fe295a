use std::io::{self, Read};

use memchr::memmem;
use thiserror::Error;

/// Initial allocation for a buffer that grows while streaming.
pub const FIRST_BUFFER_CAPACITY: usize = 65_536;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("out of memory growing buffer to {requested} bytes")]
    OutOfMemory { requested: usize },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Finds `marker` in `haystack[from..]`, returning its absolute offset.
pub fn find_marker(haystack: &[u8], marker: &[u8], from: usize) -> Option<usize> {
    let tail = haystack.get(from..)?;
    memmem::find(tail, marker).map(|pos| from + pos)
}

/// The active `[start, end)` range of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    pub fn whole(buffer: &[u8]) -> Self {
        Self {
            start: 0,
            end: buffer.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Moves the start just past the first `marker` in the buffer.
    /// Returns false, leaving the span unchanged, when there is no match.
    pub fn select_after(&mut self, buffer: &[u8], marker: &[u8]) -> bool {
        match find_marker(buffer, marker, 0) {
            Some(pos) => {
                self.start = (pos + marker.len()).min(self.end);
                true
            }
            None => false,
        }
    }

    /// Moves the end to the first `marker` at or after the start.
    /// Returns false, leaving the span unchanged, when there is no match.
    pub fn select_before(&mut self, buffer: &[u8], marker: &[u8]) -> bool {
        match find_marker(buffer, marker, self.start) {
            Some(pos) => {
                self.end = pos.min(self.end);
                true
            }
            None => false,
        }
    }

    /// Skips ahead to a saved offset. Never moves the start backward.
    pub fn apply_resume(&mut self, offset: usize) {
        if offset > self.start {
            self.start = offset.min(self.end);
        }
    }

    pub fn slice<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.start..self.end]
    }
}

/// Owned input bytes. Growth doubles capacity and reports allocation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuffer {
    bytes: Vec<u8>,
}

impl SourceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    pub fn whole_span(&self) -> ByteSpan {
        ByteSpan::whole(&self.bytes)
    }

    pub fn extend_from_slice(&mut self, chunk: &[u8]) -> Result<(), BufferError> {
        let needed = self
            .bytes
            .len()
            .checked_add(chunk.len())
            .ok_or(BufferError::OutOfMemory { requested: usize::MAX })?;
        self.grow_to(needed)?;
        self.bytes.extend_from_slice(chunk);
        Ok(())
    }

    /// Appends everything `reader` yields. Returns the number of bytes read.
    pub fn read_from<R: Read>(&mut self, mut reader: R) -> Result<usize, BufferError> {
        let mut chunk = [0u8; 8192];
        let mut total = 0;
        loop {
            let n = match reader.read(&mut chunk) {
                Ok(0) => return Ok(total),
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            self.extend_from_slice(&chunk[..n])?;
            total += n;
        }
    }

    fn grow_to(&mut self, needed: usize) -> Result<(), BufferError> {
        let capacity = self.bytes.capacity();
        if needed <= capacity {
            return Ok(());
        }
        let mut target = if capacity == 0 {
            FIRST_BUFFER_CAPACITY
        } else {
            capacity
        };
        while target < needed {
            target = target
                .checked_mul(2)
                .ok_or(BufferError::OutOfMemory { requested: needed })?;
        }
        self.bytes
            .try_reserve_exact(target - self.bytes.len())
            .map_err(|_| BufferError::OutOfMemory { requested: target })
    }
}
