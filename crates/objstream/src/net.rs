//! Content sources: where chunks come from.

#[cfg(feature = "reqwest")]
pub mod http;
pub mod mock;
pub mod source;

#[cfg(feature = "reqwest")]
pub use http::{HttpSource, HttpSourceError};
pub use mock::{MockError, MockSource};
pub use source::{BoxStream, ChunkStream, ContentSource, SourceError};
