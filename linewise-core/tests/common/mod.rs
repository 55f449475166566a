//! Byte sources instrumented for tests

#![allow(dead_code)]

use linewise_core::{AsyncByteSource, ByteSource, MemorySource};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Memory source that counts how often it was closed
#[derive(Debug, Clone)]
pub struct CountingSource {
    inner: MemorySource,
    closes: Arc<AtomicUsize>,
}

impl CountingSource {
    pub fn new(content: &str) -> (Self, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let source = Self {
            inner: MemorySource::from(content),
            closes: Arc::clone(&closes),
        };
        (source, closes)
    }
}

impl ByteSource for CountingSource {
    fn read_at(&mut self, buf: &mut [u8], position: u64) -> io::Result<usize> {
        ByteSource::read_at(&mut self.inner, buf, position)
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        ByteSource::close(&mut self.inner)
    }
}

impl AsyncByteSource for CountingSource {
    async fn read_at(&mut self, buf: &mut [u8], position: u64) -> io::Result<usize> {
        AsyncByteSource::read_at(&mut self.inner, buf, position).await
    }

    async fn close(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        AsyncByteSource::close(&mut self.inner).await
    }
}

/// Source that fails every read at or beyond `fail_at`
#[derive(Debug)]
pub struct FailingSource {
    inner: CountingSource,
    fail_at: u64,
}

impl FailingSource {
    pub fn new(content: &str, fail_at: u64) -> (Self, Arc<AtomicUsize>) {
        let (inner, closes) = CountingSource::new(content);
        (Self { inner, fail_at }, closes)
    }

    fn check(&self, position: u64) -> io::Result<()> {
        if position >= self.fail_at {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device went away"));
        }
        Ok(())
    }
}

impl ByteSource for FailingSource {
    fn read_at(&mut self, buf: &mut [u8], position: u64) -> io::Result<usize> {
        self.check(position)?;
        ByteSource::read_at(&mut self.inner, buf, position)
    }

    fn close(&mut self) -> io::Result<()> {
        ByteSource::close(&mut self.inner)
    }
}

impl AsyncByteSource for FailingSource {
    async fn read_at(&mut self, buf: &mut [u8], position: u64) -> io::Result<usize> {
        self.check(position)?;
        AsyncByteSource::read_at(&mut self.inner, buf, position).await
    }

    async fn close(&mut self) -> io::Result<()> {
        AsyncByteSource::close(&mut self.inner).await
    }
}
