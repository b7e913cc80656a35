//! Document sink implementations.
//!
//! - `PostgrestSink` - updates the opportunity row in the record store
//! - `FileSink` - writes a local markdown file
//!
//! Tests use `MemorySink` from [`crate::testing`].

mod file;
mod postgrest;

pub use file::{FileSink, DEFAULT_OUTPUT_FILE};
pub use postgrest::{PostgrestSink, DEFAULT_COLUMN, DEFAULT_TABLE};

pub use crate::traits::sink::{DocumentSink, StoredRecord};
