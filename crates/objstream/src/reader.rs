//! Chunked reads of a whole object on top of [`ResumableBuffer`].

mod object_file;

pub use object_file::ObjectFile;

use bytes::Bytes;
use futures_util::{Stream, stream};

use crate::buffer::ResumableBuffer;
use crate::data::{ObjectAttributes, ReadOptions};
use crate::error::{Error, OptionsError, Result};
use crate::net::{ChunkStream, ContentSource};

/// Reads one remote object: metadata, whole content, or chunk by chunk.
///
/// Each read operation starts its own [`ResumableBuffer`], so every read
/// session gets a fresh resume budget and independent streams.
///
/// # Examples
///
/// ```
/// use futures_util::TryStreamExt;
/// use objstream::{MockSource, ObjectReader, ReadOptions};
///
/// # tokio_test_block_on(async {
/// let source = MockSource::new(vec![7u8; 20], 4);
/// let reader = ObjectReader::new(source, ReadOptions::default().chunk_size(8)).unwrap();
///
/// let chunks: Vec<_> = reader.chunks().try_collect().await.unwrap();
/// assert_eq!(chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), [8, 8, 4]);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ObjectReader<S> {
    source:  S,
    options: ReadOptions,
}

impl<S: ContentSource + Clone> ObjectReader<S> {
    pub fn new(source: S, options: ReadOptions) -> std::result::Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self { source, options })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Probe object metadata. Reads no content.
    pub async fn head(&self) -> Result<ObjectAttributes, S::Error> {
        self.source.head().await.map_err(Error::Source)
    }

    /// Fresh buffer positioned at the start of the object.
    pub fn buffer(&self) -> ResumableBuffer<S> {
        self.buffer_at(0)
    }

    /// Fresh buffer positioned at `offset`.
    pub fn buffer_at(&self, offset: u64) -> ResumableBuffer<S> {
        ResumableBuffer::with_offset(self.source.clone(), offset, self.options.max_resume)
            .resume_backoff(self.options.resume_backoff)
    }

    /// Read the whole object into memory.
    pub async fn read_all(&self) -> Result<Bytes, S::Error> {
        let mut buffer = self.buffer();
        buffer.fill_to_end().await?;
        Ok(buffer.read_all())
    }

    /// The object as `chunk_size` pieces; only the last one may be shorter.
    ///
    /// The stream is finite and single-use. Interruptions are resumed
    /// underneath; the first error yielded ends the stream.
    pub fn chunks(&self) -> impl Stream<Item = Result<Bytes, S::Error>> + Send + use<S> {
        self.chunks_from(0)
    }

    /// Like [`chunks`](Self::chunks), starting at byte `offset`.
    ///
    /// Yields `ceil((size - offset) / chunk_size)` chunks, none if `offset`
    /// is at or past the end.
    pub fn chunks_from(&self, offset: u64) -> impl Stream<Item = Result<Bytes, S::Error>> + Send + use<S> {
        let chunk_size = self.options.chunk_size;
        stream::try_unfold(self.buffer_at(offset), move |mut buffer| async move {
            buffer.fill(chunk_size).await?;
            let chunk = buffer.read(chunk_size);
            Ok::<_, Error<S::Error>>((!chunk.is_empty()).then_some((chunk, buffer)))
        })
    }

    /// The unbuffered response stream from offset 0, without any resume.
    pub async fn raw(&self) -> Result<ChunkStream<S::Error>, S::Error> {
        self.source.open(0).await.map_err(Error::Source)
    }

    /// File-like sequential reader over the object.
    pub fn object_file(&self) -> ObjectFile<S> {
        ObjectFile::new(self.buffer())
    }
}
