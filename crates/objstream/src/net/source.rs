use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::Stream;

use crate::data::ObjectAttributes;

/// A boxed, sendable stream.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// The chunk sequence of one open request. `None` is the end-of-data signal.
pub type ChunkStream<E> = BoxStream<'static, Result<Bytes, E>>;

/// Error produced by a [`ContentSource`] or one of its chunk streams.
pub trait SourceError: std::error::Error + Send + Sync + 'static {
    /// `true` if the failure cut an otherwise healthy stream short and
    /// reopening at the current offset may succeed.
    ///
    /// Everything else (missing object, denied access, bad response) is
    /// reported to the caller without any retry.
    fn is_interrupted(&self) -> bool;
}

/// Factory for chunk streams over one remote object.
///
/// # Contract
///
/// - `open(offset)` yields the object's bytes starting exactly at `offset`
/// - chunks are yielded in object order and the stream ends with `None`
/// - the source is stateless: a stream cut at `k` followed by `open(k)`
///   reproduces the uninterrupted byte sequence
///
/// The source never rewinds a stream; resuming always means opening a new one.
pub trait ContentSource: Send + Sync {
    type Error: SourceError;

    /// Open a chunk stream starting at `offset`.
    ///
    /// Opening may fail with the same error classes as pulling, and is treated
    /// the same way by readers: interruptions count against the resume budget.
    fn open(
        &self,
        offset: u64,
    ) -> impl Future<Output = Result<ChunkStream<Self::Error>, Self::Error>> + Send;

    /// Fetch object metadata without reading content.
    fn head(&self) -> impl Future<Output = Result<ObjectAttributes, Self::Error>> + Send;
}

impl<S: ContentSource> ContentSource for Arc<S> {
    type Error = S::Error;

    fn open(
        &self,
        offset: u64,
    ) -> impl Future<Output = Result<ChunkStream<Self::Error>, Self::Error>> + Send {
        (**self).open(offset)
    }

    fn head(&self) -> impl Future<Output = Result<ObjectAttributes, Self::Error>> + Send {
        (**self).head()
    }
}
