//! Bounded response buffer
//!
//! Holds the raw bytes of a terminal reply. One slot of the configured
//! capacity is always reserved for the end marker, so at most
//! `capacity - 1` bytes are ever stored.

use thiserror::Error;

/// Default buffer capacity, end marker slot included
pub const DEFAULT_CAPACITY: usize = 16;

/// Returned when an append would use the reserved end-marker slot
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("response buffer full ({limit} bytes)")]
pub struct BufferFull {
    pub limit: usize,
}

/// Fixed-capacity, append-only byte container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl ResponseBuffer {
    /// Create an empty buffer.
    ///
    /// A capacity of zero is treated as one: the buffer then accepts no bytes
    /// at all, only the end marker.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            bytes: Vec::with_capacity(capacity - 1),
            capacity,
        }
    }

    /// Total capacity, end marker slot included
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum number of bytes the buffer will store
    pub fn limit(&self) -> usize {
        self.capacity - 1
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.bytes.len() >= self.limit()
    }

    /// Append one byte, refusing to touch the reserved slot
    pub fn push(&mut self, byte: u8) -> Result<(), BufferFull> {
        if self.is_full() {
            return Err(BufferFull { limit: self.limit() });
        }
        self.bytes.push(byte);
        Ok(())
    }

    /// Most recently appended byte
    pub fn last(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Close the buffer. The returned length is the end marker position.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for ResponseBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
