//! In-memory content source with scripted failures, for tests and benches.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use futures_util::stream;

use crate::data::ObjectAttributes;
use crate::net::source::{ChunkStream, ContentSource, SourceError};

/// Error returned by [`MockSource`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MockError {
    pub message:     String,
    pub interrupted: bool,
}

impl MockError {
    /// A retryable mid-stream failure.
    pub fn interrupted(message: impl Into<String>) -> Self {
        Self { message: message.into(), interrupted: true }
    }

    /// A failure that must not be retried.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self { message: message.into(), interrupted: false }
    }
}

impl SourceError for MockError {
    fn is_interrupted(&self) -> bool {
        self.interrupted
    }
}

#[derive(Debug, Default)]
struct Script {
    /// `(offset, error)`: the next stream covering `offset` stops there.
    stream_faults: Vec<(u64, MockError)>,
    open_faults:   VecDeque<MockError>,
    head_fault:    Option<MockError>,
    opens:         Vec<u64>,
}

/// Serves a fixed byte buffer in chunks of `transport_chunk` bytes.
///
/// Every scripted fault fires once. Stream faults are keyed by absolute
/// object offset: the first stream opened at or before that offset yields
/// the bytes up to it and then the error.
#[derive(Debug, Clone)]
pub struct MockSource {
    data:            Bytes,
    transport_chunk: usize,
    script:          Arc<Mutex<Script>>,
}

impl MockSource {
    pub fn new(data: impl Into<Bytes>, transport_chunk: usize) -> Self {
        Self {
            data:            data.into(),
            transport_chunk: transport_chunk.max(1),
            script:          Arc::default(),
        }
    }

    /// Cut the stream once when it reaches `offset`.
    #[must_use]
    pub fn fail_at(self, offset: u64, error: MockError) -> Self {
        {
            let mut script = self.script();
            script.stream_faults.push((offset, error));
            script.stream_faults.sort_by_key(|(at, _)| *at);
        }
        self
    }

    /// Make the next `open` call fail. Repeat to fail several opens in a row.
    #[must_use]
    pub fn fail_open(self, error: MockError) -> Self {
        self.script().open_faults.push_back(error);
        self
    }

    #[must_use]
    pub fn fail_head(self, error: MockError) -> Self {
        self.script().head_fault = Some(error);
        self
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Offsets of every `open` call so far, in call order.
    pub fn opens(&self) -> Vec<u64> {
        self.script().opens.clone()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn chunks(&self, from: usize, to: usize) -> impl Iterator<Item = Bytes> + '_ {
        (from..to)
            .step_by(self.transport_chunk)
            .map(move |start| self.data.slice(start..to.min(start + self.transport_chunk)))
    }
}

impl ContentSource for MockSource {
    type Error = MockError;

    async fn open(&self, offset: u64) -> Result<ChunkStream<MockError>, MockError> {
        let fault = {
            let mut script = self.script();
            script.opens.push(offset);
            if let Some(error) = script.open_faults.pop_front() {
                return Err(error);
            }
            let len = self.data.len() as u64;
            script
                .stream_faults
                .iter()
                .position(|(at, _)| *at >= offset && *at < len)
                .map(|idx| script.stream_faults.remove(idx))
        };

        let len = self.data.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(len);
        let items: Vec<Result<Bytes, MockError>> = match fault {
            Some((at, error)) => {
                let stop = usize::try_from(at).unwrap_or(len).min(len);
                self.chunks(start, stop).map(Ok).chain(std::iter::once(Err(error))).collect()
            }
            None => self.chunks(start, len).map(Ok).collect(),
        };
        Ok(Box::pin(stream::iter(items)))
    }

    async fn head(&self) -> Result<ObjectAttributes, MockError> {
        if let Some(error) = self.script().head_fault.take() {
            return Err(error);
        }
        Ok(ObjectAttributes::new(self.data.len() as u64))
    }
}
