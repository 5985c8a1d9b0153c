//! Error types for objstream.

use thiserror::Error;

/// Terminal failure of a resumable read.
///
/// `E` is the error type of the [`ContentSource`](crate::ContentSource) the
/// read was issued against. Retryable interruptions never show up here unless
/// the resume budget ran out, in which case the last interruption is kept as
/// the error's `source()`.
#[derive(Debug, Error)]
pub enum Error<E> {
    #[error("maximum resumes exceeded ({max_resume}): {source}")]
    MaxResumeExceeded {
        max_resume: u32,
        #[source]
        source: E,
    },

    #[error("object stream failed: {0}")]
    Source(#[source] E),

    /// The read session already failed; its buffer never reopens.
    #[error("read session already failed")]
    Terminated,
}

impl<E> Error<E> {
    /// The underlying source error. `None` for [`Error::Terminated`], which
    /// only repeats that an earlier call already reported one.
    pub fn cause(&self) -> Option<&E> {
        match self {
            Error::MaxResumeExceeded { source, .. } => Some(source),
            Error::Source(source) => Some(source),
            Error::Terminated => None,
        }
    }

    pub fn into_cause(self) -> Option<E> {
        match self {
            Error::MaxResumeExceeded { source, .. } => Some(source),
            Error::Source(source) => Some(source),
            Error::Terminated => None,
        }
    }

    pub fn is_max_resume_exceeded(&self) -> bool {
        matches!(self, Error::MaxResumeExceeded { .. })
    }
}

/// Rejected [`ReadOptions`](crate::ReadOptions).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,
}

pub type Result<T, E> = std::result::Result<T, Error<E>>;
