//! Blocking line source

use crate::buffer::LineBuffer;
use crate::config::ReaderConfig;
use crate::error::{LineError, Result};
use crate::separator::Separator;
use crate::source::{ByteSource, FileSource};
use std::path::Path;

/// Splits a [`ByteSource`] into lines, blocking the calling thread on every
/// chunk read.
///
/// Without a configured separator, lines are split on `\r\n`, `\r` or `\n`.
/// The source is closed as soon as end of input is read, on
/// [`close`](Self::close), or when the reader is dropped.
///
/// ```no_run
/// use linewise_core::{LineReader, ReaderConfig};
///
/// let mut reader = LineReader::open("access.log", &ReaderConfig::default())?;
/// while reader.has_next_line() {
///     let line = reader.next_line()?;
///     println!("{line}");
/// }
/// # Ok::<(), linewise_core::LineError>(())
/// ```
#[derive(Debug)]
pub struct LineReader<S: ByteSource = FileSource> {
    source: S,
    buffer: LineBuffer,
    closed: bool,
    /// Failure of a look-ahead fill, reported by the next `next_line`
    deferred: Option<LineError>,
}

impl LineReader<FileSource> {
    /// Open the file at `path` and read up to the first separator
    pub fn open(path: impl AsRef<Path>, config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        let source = FileSource::open(path)?;
        Self::from_source(source, config)
    }
}

impl<S: ByteSource> LineReader<S> {
    /// Wrap an open source and read up to the first separator
    pub fn from_source(source: S, config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        let buffer = LineBuffer::new(
            config.separator_or(Separator::universal_newline),
            config.encoding,
            config.buffer_size,
        );
        let mut reader = Self {
            source,
            buffer,
            closed: false,
            deferred: None,
        };
        reader.fill_to_separator()?;
        Ok(reader)
    }

    /// True while at least one more line can be read
    pub fn has_next_line(&self) -> bool {
        self.deferred.is_some() || self.buffer.has_next_line()
    }

    /// Read the next line, without its separator.
    ///
    /// Fails with [`LineError::Exhausted`] once every line was delivered.
    pub fn next_line(&mut self) -> Result<String> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }
        if !self.has_next_line() {
            return Err(LineError::Exhausted);
        }
        self.fill_to_separator()?;
        let line = self.buffer.take_line().ok_or(LineError::Exhausted)?;
        log::trace!("line of {} bytes", line.len());
        self.look_ahead();
        Ok(line)
    }

    /// Close the source. Later calls do nothing.
    pub fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.source.close().map_err(LineError::Close)?;
        }
        Ok(())
    }

    /// True once the source was closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Byte offset of the next chunk read
    pub fn position(&self) -> u64 {
        self.buffer.position()
    }

    /// Separator lines are split on
    pub fn separator(&self) -> &Separator {
        self.buffer.separator()
    }

    /// Fill once when everything read so far was delivered, so that
    /// `has_next_line` is exact for the line just taken
    fn look_ahead(&mut self) {
        if self.buffer.needs_lookahead() {
            if let Err(e) = self.fill() {
                self.deferred = Some(e);
            }
        }
    }

    fn fill_to_separator(&mut self) -> Result<()> {
        while !self.buffer.line_ready() {
            self.fill()?;
        }
        Ok(())
    }

    fn fill(&mut self) -> Result<()> {
        if self.closed {
            return Err(LineError::SourceClosed);
        }
        let position = self.buffer.position();
        let bytes_read = self
            .source
            .read_at(self.buffer.chunk_mut(), position)
            .map_err(|source| LineError::Read { position, source })?;

        if self.buffer.commit(bytes_read) {
            log::debug!("end of input after {} bytes", self.buffer.position());
            self.close()?;
        }
        Ok(())
    }
}

impl<S: ByteSource> Iterator for LineReader<S> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next_line() {
            Some(self.next_line())
        } else {
            None
        }
    }
}

impl<S: ByteSource> Drop for LineReader<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("closing line source on drop failed: {e}");
        }
    }
}
