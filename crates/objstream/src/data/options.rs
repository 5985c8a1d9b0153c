use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Default number of bytes yielded per chunk by sequential iteration (8 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Default number of times a single read session may reopen its stream.
pub const DEFAULT_MAX_RESUME: u32 = 5;

/// Configuration for resumable object reads.
///
/// Every field has a default, so a partial config section deserializes fine:
///
/// ```
/// use objstream::ReadOptions;
/// use std::time::Duration;
///
/// let options = ReadOptions::default()
///     .chunk_size(64 * 1024)
///     .max_resume(3)
///     .resume_backoff(Duration::from_millis(50));
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Bytes per item yielded by sequential and positional iteration.
    ///
    /// Default: [`DEFAULT_CHUNK_SIZE`]
    pub chunk_size: usize,

    /// Maximum number of stream reopens per read session.
    ///
    /// - Counted over the whole lifetime of a buffer, never reset
    /// - Only interruptions consume the budget; other errors fail at once
    /// - `0` makes the first interruption terminal
    ///
    /// Default: [`DEFAULT_MAX_RESUME`]
    pub max_resume: u32,

    /// Base delay before reopening an interrupted stream.
    ///
    /// The delay before resume N (1-based) is `resume_backoff * 2^(N-1)`.
    ///
    /// Default: zero (reopen immediately)
    #[serde(with = "millis")]
    pub resume_backoff: Duration,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            chunk_size:     DEFAULT_CHUNK_SIZE,
            max_resume:     DEFAULT_MAX_RESUME,
            resume_backoff: Duration::ZERO,
        }
    }
}

impl ReadOptions {
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn max_resume(mut self, max_resume: u32) -> Self {
        self.max_resume = max_resume;
        self
    }

    #[must_use]
    pub fn resume_backoff(mut self, backoff: Duration) -> Self {
        self.resume_backoff = backoff;
        self
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.chunk_size == 0 {
            return Err(OptionsError::ZeroChunkSize);
        }
        Ok(())
    }
}

/// Serializes a `Duration` as whole milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
