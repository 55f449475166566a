//! Byte sources a line source can read from
//!
//! Reads are positional: every call names the byte offset it starts at.
//! A read returns fewer bytes than requested only at end of input, which is
//! how line sources detect it.

use crate::error::{LineError, Result};
use std::fs::File;
use std::future::Future;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Blocking, position-addressable, read-only byte source
pub trait ByteSource {
    /// Read into `buf` starting at `position`.
    ///
    /// Fills `buf` completely unless the input ends first.
    fn read_at(&mut self, buf: &mut [u8], position: u64) -> io::Result<usize>;

    /// Release the source. Called at most once by line sources.
    fn close(&mut self) -> io::Result<()>;
}

/// Non-blocking counterpart of [`ByteSource`]
pub trait AsyncByteSource: Send {
    /// Read into `buf` starting at `position`, with the same fill contract
    /// as [`ByteSource::read_at`]
    fn read_at(
        &mut self,
        buf: &mut [u8],
        position: u64,
    ) -> impl Future<Output = io::Result<usize>> + Send;

    /// Release the source
    fn close(&mut self) -> impl Future<Output = io::Result<()>> + Send;
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "byte source is closed")
}

/// File opened for blocking reads
#[derive(Debug)]
pub struct FileSource {
    file: Option<File>,
    path: PathBuf,
}

impl FileSource {
    /// Open `path` read-only
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LineError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("opened {}", path.display());
        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
        })
    }

    /// Path the source was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn read_at(&mut self, buf: &mut [u8], position: u64) -> io::Result<usize> {
        let file = self.file.as_mut().ok_or_else(closed_error)?;
        file.seek(SeekFrom::Start(position))?;

        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn close(&mut self) -> io::Result<()> {
        if self.file.take().is_some() {
            log::debug!("closed {}", self.path.display());
        }
        Ok(())
    }
}

/// File opened for non-blocking reads on the tokio runtime
#[derive(Debug)]
pub struct TokioFileSource {
    file: Option<tokio::fs::File>,
    path: PathBuf,
}

impl TokioFileSource {
    /// Open `path` read-only
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| LineError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!("opened {}", path.display());
        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
        })
    }

    /// Path the source was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsyncByteSource for TokioFileSource {
    async fn read_at(&mut self, buf: &mut [u8], position: u64) -> io::Result<usize> {
        let file = self.file.as_mut().ok_or_else(closed_error)?;
        file.seek(SeekFrom::Start(position)).await?;

        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]).await {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    async fn close(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.take() {
            // wait for any in-flight operation before the handle is released
            let std_file = file.into_std().await;
            drop(std_file);
            log::debug!("closed {}", self.path.display());
        }
        Ok(())
    }
}

/// In-memory bytes exposed as a byte source
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
    closed: bool,
}

impl MemorySource {
    /// Wrap `data`
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            closed: false,
        }
    }

    /// True once [`close`](ByteSource::close) was called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn copy_at(&self, buf: &mut [u8], position: u64) -> io::Result<usize> {
        if self.closed {
            return Err(closed_error());
        }
        let start = usize::try_from(position)
            .unwrap_or(usize::MAX)
            .min(self.data.len());
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }
}

impl From<&str> for MemorySource {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl From<String> for MemorySource {
    fn from(text: String) -> Self {
        Self::new(text.into_bytes())
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl ByteSource for MemorySource {
    fn read_at(&mut self, buf: &mut [u8], position: u64) -> io::Result<usize> {
        self.copy_at(buf, position)
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

impl AsyncByteSource for MemorySource {
    async fn read_at(&mut self, buf: &mut [u8], position: u64) -> io::Result<usize> {
        self.copy_at(buf, position)
    }

    async fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_memory_source_short_read_at_end() {
        let mut source = MemorySource::from("abcde");
        let mut buf = [0u8; 4];
        assert_eq!(ByteSource::read_at(&mut source, &mut buf, 0).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(ByteSource::read_at(&mut source, &mut buf, 4).unwrap(), 1);
        assert_eq!(ByteSource::read_at(&mut source, &mut buf, 9).unwrap(), 0);
    }

    #[test]
    fn test_memory_source_read_after_close() {
        let mut source = MemorySource::from("abc");
        ByteSource::close(&mut source).unwrap();
        let mut buf = [0u8; 2];
        let err = ByteSource::read_at(&mut source, &mut buf, 0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_file_source_positional_reads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.txt");
        fs::write(&path, "0123456789").unwrap();

        let mut source = FileSource::open(&path).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(source.read_at(&mut buf, 6).unwrap(), 4);
        assert_eq!(&buf, b"6789");
        assert_eq!(source.read_at(&mut buf, 2).unwrap(), 4);
        assert_eq!(&buf, b"2345");
        assert_eq!(source.read_at(&mut buf, 8).unwrap(), 2);
        source.close().unwrap();
        assert!(source.read_at(&mut buf, 0).is_err());
    }

    #[test]
    fn test_file_source_missing_file() {
        let err = FileSource::open("/nonexistent/linewise.txt").unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_tokio_file_source_reads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.txt");
        fs::write(&path, "hello world").unwrap();

        let mut source = TokioFileSource::open(&path).await.unwrap();
        let mut buf = [0u8; 5];
        assert_eq!(source.read_at(&mut buf, 6).await.unwrap(), 5);
        assert_eq!(&buf, b"world");
        source.close().await.unwrap();
        assert!(source.read_at(&mut buf, 0).await.is_err());
    }
}
