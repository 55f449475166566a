//! Incremental line splitting for arbitrarily large inputs
//!
//! Input is read one fixed-size chunk at a time, decoded, and split on a
//! literal or pattern separator. Only the current chunk and the decoded text
//! of the line being assembled are kept in memory, so files of any size can
//! be traversed.
//!
//! # Architecture
//!
//! - [`buffer`]: chunk filling, decoded accumulator and separator locus cache,
//!   free of any I/O
//! - [`reader`] / [`async_reader`]: line sources that block or suspend on
//!   every chunk read
//! - [`driver`]: "for each line" traversals with early termination and
//!   completion signaling
//!
//! # Example
//!
//! ```rust
//! use linewise_core::{LineReader, MemorySource, ReaderConfig};
//!
//! let config = ReaderConfig::builder()
//!     .separator("\n")
//!     .buffer_size(2)
//!     .build()?;
//! let reader = LineReader::from_source(MemorySource::from("a\nb\nc"), &config)?;
//! let lines = reader.collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(lines, vec!["a", "b", "c"]);
//! # Ok::<(), linewise_core::LineError>(())
//! ```

#![warn(missing_docs)]

pub mod async_reader;
pub mod buffer;
pub mod config;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod reader;
pub mod separator;
pub mod source;

pub use async_reader::{AsyncLineReader, ReaderState};
pub use config::{ReaderConfig, ReaderConfigBuilder};
pub use decoder::{EncodingDecoder, TextDecoder};
pub use driver::{
    each_line, each_line_from_reader, each_line_sync, each_line_sync_from_reader,
    each_line_with_continuation, each_line_with_continuation_from_reader, Continuation, EachLine,
    Flow, Traversal,
};
pub use error::{LineError, Result};
pub use reader::LineReader;
pub use separator::{Locus, Separator};
pub use source::{AsyncByteSource, ByteSource, FileSource, MemorySource, TokioFileSource};

use std::path::Path;

/// Open the file at `path` as a cooperative line source
pub async fn open(
    path: impl AsRef<Path>,
    config: &ReaderConfig,
) -> Result<AsyncLineReader<TokioFileSource>> {
    AsyncLineReader::open(path, config).await
}

/// Open the file at `path` as a blocking line source
pub fn open_sync(path: impl AsRef<Path>, config: &ReaderConfig) -> Result<LineReader<FileSource>> {
    LineReader::open(path, config)
}
