//! Data layer: read configuration and object metadata.
//!
//! Plain values passed into readers and returned from metadata probes. Nothing
//! in here performs I/O.

mod attributes;
mod options;

pub use attributes::ObjectAttributes;
pub use options::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_RESUME, ReadOptions};
