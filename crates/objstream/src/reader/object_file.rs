use bytes::Bytes;

use crate::buffer::ResumableBuffer;
use crate::error::Result;
use crate::net::ContentSource;

/// Sequential, file-like access to an object.
///
/// Each [`read`](Self::read) fills just enough to answer it, so memory stays
/// bounded by the largest read size plus one transport chunk.
#[derive(Debug)]
pub struct ObjectFile<S: ContentSource> {
    buffer:   ResumableBuffer<S>,
    position: u64,
}

impl<S: ContentSource> ObjectFile<S> {
    pub fn new(buffer: ResumableBuffer<S>) -> Self {
        // bytes already buffered haven't been handed out yet
        let position = buffer.position() - buffer.len() as u64;
        Self { buffer, position }
    }

    /// Read up to `size` bytes. An empty result means end of object.
    ///
    /// `usize::MAX` reads everything that is left. Once a read has failed,
    /// every later read fails too.
    pub async fn read(&mut self, size: usize) -> Result<Bytes, S::Error> {
        if size == 0 {
            return Ok(Bytes::new());
        }
        self.buffer.fill(size).await?;
        let data = self.buffer.read(size);
        self.position += data.len() as u64;
        Ok(data)
    }

    pub async fn read_to_end(&mut self) -> Result<Bytes, S::Error> {
        self.read(usize::MAX).await
    }

    /// Object offset of the next byte [`read`](Self::read) returns.
    pub fn tell(&self) -> u64 {
        self.position
    }

    /// Stream reopens spent so far.
    pub fn resume_count(&self) -> u32 {
        self.buffer.resume_count()
    }

    pub fn into_buffer(self) -> ResumableBuffer<S> {
        self.buffer
    }
}
