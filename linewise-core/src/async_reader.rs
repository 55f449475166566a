//! Cooperative line source
//!
//! Every chunk read is an `.await` point. Operations take `&mut self`, so
//! two fills on the same reader can never overlap.

use crate::buffer::LineBuffer;
use crate::config::ReaderConfig;
use crate::error::{LineError, Result};
use crate::separator::Separator;
use crate::source::{AsyncByteSource, TokioFileSource};
use std::path::Path;

/// Observable state of an [`AsyncLineReader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// More input is needed before the next line is known; the next
    /// [`next_line`](AsyncLineReader::next_line) reads before it delivers
    Idle,
    /// The next line can be delivered without reading
    HasLine,
    /// No line remains, or the reader was closed
    Closed,
}

/// Splits an [`AsyncByteSource`] into lines, suspending on every chunk read.
///
/// Without a configured separator, lines are split on `"\n"`.
#[derive(Debug)]
pub struct AsyncLineReader<S: AsyncByteSource = TokioFileSource> {
    source: S,
    buffer: LineBuffer,
    closed: bool,
    /// Failure of a look-ahead fill, reported by the next `next_line`
    deferred: Option<LineError>,
}

impl AsyncLineReader<TokioFileSource> {
    /// Open the file at `path` and read up to the first separator
    pub async fn open(path: impl AsRef<Path>, config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        let source = TokioFileSource::open(path).await?;
        Self::from_source(source, config).await
    }
}

impl<S: AsyncByteSource> AsyncLineReader<S> {
    /// Wrap an open source and read up to the first separator.
    ///
    /// The reader is only handed out once this initial fill completed.
    pub async fn from_source(source: S, config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        let buffer = LineBuffer::new(
            config.separator_or(Separator::newline),
            config.encoding,
            config.buffer_size,
        );
        let mut reader = Self {
            source,
            buffer,
            closed: false,
            deferred: None,
        };
        reader.fill_to_separator().await?;
        Ok(reader)
    }

    /// True while at least one more line can be read
    pub fn has_next_line(&self) -> bool {
        self.deferred.is_some() || self.buffer.has_next_line()
    }

    /// Read the next line, without its separator.
    ///
    /// A cached separator is served without reading; otherwise chunks are
    /// read until one is found or the input ends. Fails with
    /// [`LineError::Exhausted`] once every line was delivered.
    pub async fn next_line(&mut self) -> Result<String> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }
        if !self.has_next_line() {
            return Err(LineError::Exhausted);
        }
        self.fill_to_separator().await?;
        let line = self.buffer.take_line().ok_or(LineError::Exhausted)?;
        log::trace!("line of {} bytes", line.len());
        self.look_ahead().await;
        Ok(line)
    }

    /// Close the source. Later calls do nothing.
    pub async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.source.close().await.map_err(LineError::Close)?;
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

    /// Current state.
    ///
    /// A chunk read only happens inside `next_line` or construction, which
    /// hold `&mut self`, so it is never observable from here.
    pub fn state(&self) -> ReaderState {
        if !self.has_next_line() {
            ReaderState::Closed
        } else if self.deferred.is_none() && self.buffer.has_cached_line() {
            ReaderState::HasLine
        } else if self.closed {
            ReaderState::Closed
        } else {
            ReaderState::Idle
        }
    }

    /// Fill once when everything read so far was delivered, then locate the
    /// next separator so that `state` can report it
    async fn look_ahead(&mut self) {
        if self.buffer.needs_lookahead() {
            if let Err(e) = self.fill().await {
                self.deferred = Some(e);
                return;
            }
        }
        self.buffer.locate();
    }

    async fn fill_to_separator(&mut self) -> Result<()> {
        while !self.buffer.line_ready() {
            self.fill().await?;
        }
        Ok(())
    }

    async fn fill(&mut self) -> Result<()> {
        if self.closed {
            return Err(LineError::SourceClosed);
        }
        let position = self.buffer.position();
        let bytes_read = self
            .source
            .read_at(self.buffer.chunk_mut(), position)
            .await
            .map_err(|source| LineError::Read { position, source })?;

        if self.buffer.commit(bytes_read) {
            log::debug!("end of input after {} bytes", self.buffer.position());
            self.close().await?;
        }
        Ok(())
    }
}

impl<S: AsyncByteSource> Drop for AsyncLineReader<S> {
    fn drop(&mut self) {
        if !self.closed {
            log::debug!("async line source dropped before close; the source releases itself");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    async fn reader(content: &str, buffer_size: usize) -> AsyncLineReader<MemorySource> {
        let config = ReaderConfig::builder()
            .buffer_size(buffer_size)
            .build()
            .unwrap();
        AsyncLineReader::from_source(MemorySource::from(content), &config)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_lines_in_order() {
        let mut reader = reader("a\nb\nc", 2).await;
        let mut lines = Vec::new();
        while reader.has_next_line() {
            lines.push(reader.next_line().await.unwrap());
        }
        assert_eq!(lines, vec!["a", "b", "c"]);
        assert!(reader.is_closed());
    }

    #[tokio::test]
    async fn test_default_separator_is_newline_only() {
        let mut reader = reader("x\r\ny", 1024).await;
        assert_eq!(reader.next_line().await.unwrap(), "x\r");
        assert_eq!(reader.next_line().await.unwrap(), "y");
    }

    #[tokio::test]
    async fn test_exhausted() {
        let mut reader = reader("", 4).await;
        assert!(!reader.has_next_line());
        assert!(reader.next_line().await.unwrap_err().is_exhausted());
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let mut reader = reader("ab\ncdef\ng", 4).await;
        assert_eq!(reader.state(), ReaderState::HasLine);
        assert_eq!(reader.next_line().await.unwrap(), "ab");
        // "c" is pending without a separator
        assert_eq!(reader.state(), ReaderState::Idle);
        assert_eq!(reader.next_line().await.unwrap(), "cdef");
        assert_eq!(reader.state(), ReaderState::HasLine);
        assert_eq!(reader.next_line().await.unwrap(), "g");
        assert_eq!(reader.state(), ReaderState::Closed);
    }

    /// Memory source that suspends once before every read
    struct YieldingSource(MemorySource);

    impl AsyncByteSource for YieldingSource {
        async fn read_at(&mut self, buf: &mut [u8], position: u64) -> std::io::Result<usize> {
            tokio::task::yield_now().await;
            AsyncByteSource::read_at(&mut self.0, buf, position).await
        }

        async fn close(&mut self) -> std::io::Result<()> {
            AsyncByteSource::close(&mut self.0).await
        }
    }

    #[tokio::test]
    async fn test_state_after_cancelled_read() {
        let config = ReaderConfig::builder().buffer_size(4).build().unwrap();
        let source = YieldingSource(MemorySource::from("ab\ncdef\ng"));
        let mut reader = AsyncLineReader::from_source(source, &config).await.unwrap();
        assert_eq!(reader.next_line().await.unwrap(), "ab");
        assert_eq!(reader.state(), ReaderState::Idle);

        // the read for "def\n" is suspended when the other branch wins
        tokio::select! {
            biased;
            _ = reader.next_line() => panic!("read should still be suspended"),
            _ = std::future::ready(()) => {}
        }
        assert_eq!(reader.state(), ReaderState::Idle);
        assert_eq!(reader.next_line().await.unwrap(), "cdef");
        assert_eq!(reader.next_line().await.unwrap(), "g");
        assert_eq!(reader.state(), ReaderState::Closed);
    }

    #[tokio::test]
    async fn test_trailing_separator_is_last_line_at_any_alignment() {
        for buffer_size in [1, 2, 3, 4, 1024] {
            let mut reader = reader("x\ny\n", buffer_size).await;
            assert_eq!(reader.next_line().await.unwrap(), "x");
            assert!(reader.has_next_line());
            assert_eq!(reader.next_line().await.unwrap(), "y");
            assert!(!reader.has_next_line(), "buffer size {buffer_size}");
            assert!(reader.is_closed());
        }
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut reader = reader("a\nb\nc\nd", 2).await;
        reader.close().await.unwrap();
        reader.close().await.unwrap();
        assert!(reader.is_closed());
        assert_eq!(reader.state(), ReaderState::HasLine);
        assert_eq!(reader.next_line().await.unwrap(), "a");
        assert_eq!(reader.state(), ReaderState::Closed);
        assert!(matches!(
            reader.next_line().await,
            Err(LineError::SourceClosed)
        ));
    }
}
