//! Version stamps for correlating analysis results with buffer state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the text-buffer resource owned by one buffer record.
///
/// Handles are handed out by the cache from a monotonically increasing
/// counter and are never reused, so a replaced record always gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferHandle(u64);

impl BufferHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf#{}", self.0)
    }
}

/// Opaque stamp identifying the content of one buffer at one point in time.
///
/// The sequence number restarts at [`VersionStamp::INITIAL`] for every new
/// buffer resource. Equality covers both the resource and the sequence
/// number, so a stamp taken from a disposed buffer never matches the stamp
/// of the record that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionStamp {
    buffer: BufferHandle,
    seq: u64,
}

impl VersionStamp {
    /// Sequence number of a freshly created buffer.
    pub const INITIAL: u64 = 1;

    /// Returns the initial stamp for a buffer resource.
    pub fn initial(buffer: BufferHandle) -> Self {
        Self {
            buffer,
            seq: Self::INITIAL,
        }
    }

    /// Returns the stamp following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self {
            buffer: self.buffer,
            seq: self.seq + 1,
        }
    }

    pub fn buffer(self) -> BufferHandle {
        self.buffer
    }

    pub fn seq(self) -> u64 {
        self.seq
    }

    pub fn is_initial(self) -> bool {
        self.seq == Self::INITIAL
    }

    /// Returns true if `self` is a later state of the same buffer than `other`.
    pub fn supersedes(self, other: VersionStamp) -> bool {
        self.buffer == other.buffer && self.seq > other.seq
    }
}

impl fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.buffer, self.seq)
    }
}
