//! Resumable chunked reads of large remote objects.
//!
//! # Architecture
//!
//! - [`data`] - Read configuration and object metadata
//! - [`core`] - Pure resume bookkeeping, backoff and range handling
//! - [`net`] - The [`ContentSource`] contract and its implementations
//! - [`ResumableBuffer`] - `fill`/`read` over a source that may drop mid-stream
//! - [`ObjectReader`] - Whole-object, chunked and positional reads
//!
//! # Key Features
//!
//! - **Exactly-once bytes**: an interrupted stream is reopened at the first
//!   byte not yet pulled, so nothing is repeated or skipped
//! - **Bounded retries**: reopens are capped per read session
//! - **Explicit I/O**: `fill` talks to the network, `read` never does
//!
//! # Example
//!
//! ```no_run
//! use futures_util::TryStreamExt;
//! use objstream::{HttpSource, ObjectReader, ReadOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpSource::new("http://localhost:8080/v1/objects/bucket/large.bin")?;
//! let reader = ObjectReader::new(source, ReadOptions::default().max_resume(3))?;
//!
//! let attrs = reader.head().await?;
//! let mut chunks = Box::pin(reader.chunks());
//! let mut total = 0;
//! while let Some(chunk) = chunks.try_next().await? {
//!     total += chunk.len() as u64;
//! }
//! assert_eq!(total, attrs.size);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod net;

mod buffer;
mod error;
mod reader;

pub use buffer::ResumableBuffer;
pub use data::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_RESUME, ObjectAttributes, ReadOptions};
pub use error::{Error, OptionsError, Result};
pub use net::{BoxStream, ChunkStream, ContentSource, MockError, MockSource, SourceError};
pub use reader::{ObjectFile, ObjectReader};

#[cfg(feature = "reqwest")]
pub use net::{HttpSource, HttpSourceError};
