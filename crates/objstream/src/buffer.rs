//! Resumable buffer over a chunked content source.
//!
//! [`ResumableBuffer`] splits reading into two steps:
//!
//! - [`fill`](ResumableBuffer::fill) pulls chunks from the source, may wait
//!   on the network, and transparently reopens the stream after an
//!   interruption
//! - [`read`](ResumableBuffer::read) hands out buffered bytes and never
//!   touches the network
//!
//! Callers decide when I/O happens and how much is kept in memory.

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tracing::{debug, error, warn};

use crate::core::{ResumeState, resume_delay};
use crate::error::{Error, Result};
use crate::net::{ChunkStream, ContentSource, SourceError};

/// Byte accumulator that survives stream interruptions.
///
/// Bytes reach [`read`](Self::read) in object order, each exactly once, no
/// matter how many times the underlying stream was reopened. Reopens are
/// bounded by `max_resume` over the lifetime of the buffer.
///
/// One buffer serves one read session and is driven by a single owner. Any
/// error returned from [`fill`](Self::fill) is terminal for the buffer: later
/// fills fail with [`Error::Terminated`] without contacting the source.
pub struct ResumableBuffer<S: ContentSource> {
    source:    S,
    stream:    Option<ChunkStream<S::Error>>,
    pending:   BytesMut,
    state:     ResumeState,
    backoff:   std::time::Duration,
    exhausted: bool,
    failed:    bool,
}

impl<S: ContentSource> ResumableBuffer<S> {
    /// Buffer reading `source` from the start of the object.
    pub fn new(source: S, max_resume: u32) -> Self {
        Self::with_offset(source, 0, max_resume)
    }

    /// Buffer reading `source` from byte `offset` on.
    ///
    /// No request is made until the first [`fill`](Self::fill).
    pub fn with_offset(source: S, offset: u64, max_resume: u32) -> Self {
        Self {
            source,
            stream: None,
            pending: BytesMut::new(),
            state: ResumeState::new(offset, max_resume),
            backoff: std::time::Duration::ZERO,
            exhausted: false,
            failed: false,
        }
    }

    /// Wait `base * 2^(n-1)` before the n-th reopen.
    #[must_use]
    pub fn resume_backoff(mut self, base: std::time::Duration) -> Self {
        self.backoff = base;
        self
    }

    /// Pull chunks until at least `target` bytes are buffered or the object
    /// ends. `usize::MAX` reads to the end.
    ///
    /// Fewer than `target` buffered bytes after a successful return means the
    /// object has no more data.
    ///
    /// # Errors
    ///
    /// - [`Error::MaxResumeExceeded`] when an interruption happens with the
    ///   resume budget already spent
    /// - [`Error::Source`] for any error the source does not classify as an
    ///   interruption, on its first occurrence
    /// - [`Error::Terminated`] on every call after one of the above; the
    ///   source is not contacted again
    pub async fn fill(&mut self, target: usize) -> Result<(), S::Error> {
        if self.failed {
            return Err(Error::Terminated);
        }
        let filled = self.pull(target).await;
        if filled.is_err() {
            self.failed = true;
        }
        filled
    }

    async fn pull(&mut self, target: usize) -> Result<(), S::Error> {
        while !self.exhausted && self.pending.len() < target {
            let Some(stream) = self.stream.as_mut() else {
                self.open().await?;
                continue;
            };

            match stream.next().await {
                Some(Ok(chunk)) => {
                    self.state.advance(chunk.len());
                    self.pending.extend_from_slice(&chunk);
                }
                Some(Err(err)) => {
                    self.stream = None;
                    self.resume(err).await?;
                }
                None => {
                    debug!(position = self.state.position(), "object stream finished");
                    self.stream = None;
                    self.exhausted = true;
                }
            }
        }
        Ok(())
    }

    /// Pull every remaining chunk of the object.
    pub async fn fill_to_end(&mut self) -> Result<(), S::Error> {
        self.fill(usize::MAX).await
    }

    /// Take up to `size` bytes off the front of the buffer.
    ///
    /// Returns everything buffered when `size` is at least [`len`](Self::len)
    /// (including `usize::MAX`). Never fills.
    pub fn read(&mut self, size: usize) -> Bytes {
        let size = size.min(self.pending.len());
        self.pending.split_to(size).freeze()
    }

    /// Take everything currently buffered.
    pub fn read_all(&mut self) -> Bytes {
        self.read(usize::MAX)
    }

    /// Buffered bytes not yet read.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Object offset the next stream would be opened at.
    pub fn position(&self) -> u64 {
        self.state.position()
    }

    pub fn resume_count(&self) -> u32 {
        self.state.resume_count()
    }

    pub fn max_resume(&self) -> u32 {
        self.state.max_resume()
    }

    /// `true` once the source signalled end-of-data.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// `true` once [`fill`](Self::fill) returned an error.
    ///
    /// Bytes buffered before the failure can still be [`read`](Self::read).
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    async fn open(&mut self) -> Result<(), S::Error> {
        let position = self.state.position();
        debug!(position, "opening object stream");
        match self.source.open(position).await {
            Ok(stream) => {
                self.stream = Some(stream);
                Ok(())
            }
            Err(err) => self.resume(err).await,
        }
    }

    /// Decide whether an error may be resumed and wait out the backoff.
    ///
    /// The next loop iteration in `fill` reopens at the current position.
    async fn resume(&mut self, err: S::Error) -> Result<(), S::Error> {
        if !err.is_interrupted() {
            return Err(Error::Source(err));
        }

        let reason = err.to_string();
        if let Err(fatal) = self.state.on_failure(err) {
            error!(
                error = %reason,
                max_resume = self.state.max_resume(),
                position = self.state.position(),
                "object stream interrupted, resume budget exhausted"
            );
            return Err(fatal);
        }

        warn!(
            error = %reason,
            position = self.state.position(),
            "object stream interrupted, resuming {}/{}",
            self.state.resume_count(),
            self.state.max_resume()
        );

        let delay = resume_delay(self.state.resume_count(), self.backoff);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

impl<S: ContentSource> std::fmt::Debug for ResumableBuffer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumableBuffer")
            .field("pending", &self.pending.len())
            .field("state", &self.state)
            .field("streaming", &self.stream.is_some())
            .field("exhausted", &self.exhausted)
            .field("failed", &self.failed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{MockError, MockSource};

    fn object(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    async fn drain(buffer: &mut ResumableBuffer<MockSource>, step: usize) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            buffer.fill(step).await.unwrap();
            let chunk = buffer.read(step);
            if chunk.is_empty() {
                return out;
            }
            out.extend_from_slice(&chunk);
        }
    }

    #[tokio::test]
    async fn test_fill_stops_at_target() {
        let source = MockSource::new(object(20), 3);
        let mut buffer = ResumableBuffer::new(source, 0);

        buffer.fill(8).await.unwrap();
        // transport chunks of 3 overshoot to 9
        assert_eq!(buffer.len(), 9);
        assert_eq!(buffer.position(), 9);
        assert!(!buffer.is_exhausted());
    }

    #[tokio::test]
    async fn test_fill_short_at_end_of_object() {
        let source = MockSource::new(object(5), 2);
        let mut buffer = ResumableBuffer::new(source, 0);

        buffer.fill(8).await.unwrap();
        assert_eq!(buffer.len(), 5);
        assert!(buffer.is_exhausted());

        // exhausted buffers don't reopen
        buffer.fill(8).await.unwrap();
        assert_eq!(buffer.len(), 5);
    }

    #[tokio::test]
    async fn test_fill_to_end_then_read_all() {
        let data = object(100);
        let source = MockSource::new(data.clone(), 7);
        let mut buffer = ResumableBuffer::new(source.clone(), 2);

        buffer.fill_to_end().await.unwrap();
        assert_eq!(buffer.read_all(), Bytes::from(data));
        assert!(buffer.is_empty());
        assert_eq!(source.opens(), vec![0]);
    }

    #[tokio::test]
    async fn test_read_is_bounded_and_never_fills() {
        let source = MockSource::new(object(20), 4);
        let mut buffer = ResumableBuffer::new(source.clone(), 0);

        assert!(buffer.read(10).is_empty());
        assert!(source.opens().is_empty());

        buffer.fill(10).await.unwrap();
        let buffered = buffer.len();
        assert_eq!(buffer.read(3).len(), 3);
        assert_eq!(buffer.len(), buffered - 3);
        assert_eq!(buffer.read(usize::MAX).len(), buffered - 3);
        assert!(buffer.read(5).is_empty());
        assert_eq!(source.opens(), vec![0]);
    }

    #[tokio::test]
    async fn test_resume_mid_chunk_reopens_at_position() {
        // second reader chunk of 8 is cut after 5 bytes: resume at 13
        let data = object(20);
        let source = MockSource::new(data.clone(), 1).fail_at(13, MockError::interrupted("reset"));
        let mut buffer = ResumableBuffer::new(source.clone(), 1);

        buffer.fill(8).await.unwrap();
        assert_eq!(&buffer.read(8)[..], &data[..8]);

        buffer.fill(8).await.unwrap();
        assert_eq!(source.opens(), vec![0, 13]);
        assert_eq!(buffer.resume_count(), 1);
        assert_eq!(&buffer.read(8)[..], &data[8..16]);

        buffer.fill(8).await.unwrap();
        assert_eq!(&buffer.read(8)[..], &data[16..]);
    }

    #[tokio::test]
    async fn test_many_interruptions_within_budget() {
        let data = object(1000);
        let source = MockSource::new(data.clone(), 33)
            .fail_at(1, MockError::interrupted("a"))
            .fail_at(250, MockError::interrupted("b"))
            .fail_at(251, MockError::interrupted("c"))
            .fail_at(999, MockError::interrupted("d"));
        let mut buffer = ResumableBuffer::new(source.clone(), 4);

        assert_eq!(drain(&mut buffer, 64).await, data);
        assert_eq!(buffer.resume_count(), 4);
        assert_eq!(source.opens(), vec![0, 1, 250, 251, 999]);
    }

    #[tokio::test]
    async fn test_budget_exhausted_after_max_resume_plus_one() {
        let source = MockSource::new(object(30), 4)
            .fail_at(5, MockError::interrupted("first"))
            .fail_at(10, MockError::interrupted("second"))
            .fail_at(15, MockError::interrupted("third"));
        let mut buffer = ResumableBuffer::new(source.clone(), 2);

        let err = buffer.fill_to_end().await.unwrap_err();
        match err {
            Error::MaxResumeExceeded { max_resume, source: cause } => {
                assert_eq!(max_resume, 2);
                assert_eq!(cause.message, "third");
            }
            other => panic!("expected MaxResumeExceeded, got {other:?}"),
        }
        // no reopen after the budget ran out
        assert_eq!(source.opens(), vec![0, 5, 10]);
        assert_eq!(buffer.len(), 15);
    }

    #[tokio::test]
    async fn test_fill_after_budget_exhausted_does_not_reopen() {
        let source = MockSource::new(object(16), 4).fail_at(8, MockError::interrupted("cut"));
        let mut buffer = ResumableBuffer::new(source.clone(), 0);

        assert!(buffer.fill_to_end().await.unwrap_err().is_max_resume_exceeded());
        assert!(buffer.is_failed());

        let err = buffer.fill_to_end().await.unwrap_err();
        assert!(matches!(err, Error::Terminated), "{err:?}");
        assert_eq!(source.opens(), vec![0]);
        assert_eq!(buffer.resume_count(), 0);

        // bytes pulled before the failure are still readable
        assert_eq!(&buffer.read_all()[..], &object(16)[..8]);
        assert!(matches!(buffer.fill(1).await, Err(Error::Terminated)));
        assert_eq!(source.opens(), vec![0]);
    }

    #[tokio::test]
    async fn test_fill_after_fatal_error_does_not_reopen() {
        let source = MockSource::new(object(16), 4).fail_at(8, MockError::fatal("access denied"));
        let mut buffer = ResumableBuffer::new(source.clone(), 3);

        assert!(matches!(buffer.fill_to_end().await, Err(Error::Source(_))));

        let err = buffer.fill_to_end().await.unwrap_err();
        assert!(matches!(err, Error::Terminated), "{err:?}");
        assert_eq!(source.opens(), vec![0]);
        assert_eq!(buffer.len(), 8);
        assert!(!buffer.is_exhausted());
    }

    #[tokio::test]
    async fn test_open_failure_is_terminal() {
        let source = MockSource::new(object(12), 5)
            .fail_open(MockError::fatal("not found"))
            .fail_open(MockError::fatal("not found"));
        let mut buffer = ResumableBuffer::new(source.clone(), 3);

        assert!(buffer.fill(1).await.is_err());
        assert!(matches!(buffer.fill(1).await, Err(Error::Terminated)));
        assert_eq!(source.opens(), vec![0]);
    }

    #[tokio::test]
    async fn test_zero_budget_first_interruption_is_terminal() {
        let source = MockSource::new(object(16), 4).fail_at(8, MockError::interrupted("cut"));
        let mut buffer = ResumableBuffer::new(source.clone(), 0);

        buffer.fill(4).await.unwrap();
        let err = buffer.fill(16).await.unwrap_err();
        assert!(err.is_max_resume_exceeded());
        assert_eq!(source.opens(), vec![0]);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let source = MockSource::new(object(16), 4).fail_at(8, MockError::fatal("access denied"));
        let mut buffer = ResumableBuffer::new(source.clone(), 5);

        let err = buffer.fill_to_end().await.unwrap_err();
        assert!(matches!(err, Error::Source(ref e) if e.message == "access denied"));
        assert_eq!(buffer.resume_count(), 0);
        assert_eq!(source.opens(), vec![0]);
    }

    #[tokio::test]
    async fn test_open_interruption_consumes_budget() {
        let data = object(12);
        let source = MockSource::new(data.clone(), 5)
            .fail_open(MockError::interrupted("connect timeout"))
            .fail_open(MockError::interrupted("connect timeout"));
        let mut buffer = ResumableBuffer::new(source.clone(), 2);

        buffer.fill_to_end().await.unwrap();
        assert_eq!(buffer.read_all(), Bytes::from(data));
        assert_eq!(buffer.resume_count(), 2);
        assert_eq!(source.opens(), vec![0, 0, 0]);
    }

    #[tokio::test]
    async fn test_open_fatal_propagates() {
        let source = MockSource::new(object(12), 5).fail_open(MockError::fatal("not found"));
        let mut buffer = ResumableBuffer::new(source, 3);

        let err = buffer.fill(1).await.unwrap_err();
        assert_eq!(err.cause().unwrap().message, "not found");
        assert!(!err.is_max_resume_exceeded());
    }

    #[tokio::test]
    async fn test_with_offset_starts_mid_object() {
        let data = object(20);
        let source = MockSource::new(data.clone(), 8);
        let mut buffer = ResumableBuffer::with_offset(source.clone(), 8, 0);

        assert_eq!(drain(&mut buffer, 8).await, &data[8..]);
        assert_eq!(buffer.position(), 20);
        assert_eq!(source.opens(), vec![8]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_between_resumes() {
        let source = MockSource::new(object(9), 3)
            .fail_at(3, MockError::interrupted("a"))
            .fail_at(6, MockError::interrupted("b"));
        let mut buffer = ResumableBuffer::new(source, 2).resume_backoff(std::time::Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        buffer.fill_to_end().await.unwrap();
        // 1s before the first reopen, 2s before the second
        let elapsed = started.elapsed();
        assert!(elapsed >= std::time::Duration::from_secs(3), "{elapsed:?}");
        assert!(elapsed < std::time::Duration::from_secs(4), "{elapsed:?}");
        assert_eq!(buffer.len(), 9);
    }
}
