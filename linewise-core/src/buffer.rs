//! Chunk filling and line extraction, independent of how bytes are read
//!
//! [`LineBuffer`] owns the single chunk buffer, the decoder and the decoded
//! text that has not been handed out yet. The sync and async line sources
//! only differ in how they get bytes into [`LineBuffer::chunk_mut`].

use crate::decoder::{EncodingDecoder, TextDecoder};
use crate::separator::{Locus, Separator};
use encoding_rs::Encoding;

/// Decoded text read from the source but not yet delivered as a line
#[derive(Debug, Default)]
pub struct Accumulator {
    text: String,
    /// Bytes at the front of `text` that were already delivered
    start: usize,
}

impl Accumulator {
    /// Pending text
    pub fn as_str(&self) -> &str {
        &self.text[self.start..]
    }

    /// Length of the pending text in bytes
    pub fn len(&self) -> usize {
        self.text.len() - self.start
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the first `n` pending bytes. `n` must fall on a char boundary.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(self.as_str().is_char_boundary(n));
        self.start += n;
        if self.start == self.text.len() {
            self.text.clear();
            self.start = 0;
        }
    }

    /// Buffer to append newly decoded text to
    fn appendable(&mut self) -> &mut String {
        if self.start > 0 {
            self.text.drain(..self.start);
            self.start = 0;
        }
        &mut self.text
    }
}

/// Chunk buffer, decoder, accumulator and cached separator locus
pub struct LineBuffer {
    chunk: Vec<u8>,
    decoder: Box<dyn TextDecoder>,
    pending: Accumulator,
    separator: Separator,
    /// Cached scan result; `None` means not found or not scanned yet
    locus: Option<Locus>,
    /// Literal scans resume here after an unsuccessful scan
    scan_from: usize,
    position: u64,
    eof: bool,
}

impl LineBuffer {
    /// Create a buffer decoding `encoding` in chunks of `chunk_size` bytes
    pub fn new(separator: Separator, encoding: &'static Encoding, chunk_size: usize) -> Self {
        Self::with_decoder(separator, Box::new(EncodingDecoder::new(encoding)), chunk_size)
    }

    /// Create a buffer using a custom decoder
    pub fn with_decoder(
        separator: Separator,
        decoder: Box<dyn TextDecoder>,
        chunk_size: usize,
    ) -> Self {
        Self {
            chunk: vec![0; chunk_size],
            decoder,
            pending: Accumulator::default(),
            separator,
            locus: None,
            scan_from: 0,
            position: 0,
            eof: false,
        }
    }

    /// Chunk to read the next block of bytes into
    pub fn chunk_mut(&mut self) -> &mut [u8] {
        &mut self.chunk
    }

    /// Chunk capacity in bytes
    pub fn chunk_size(&self) -> usize {
        self.chunk.len()
    }

    /// Byte offset of the next read
    pub fn position(&self) -> u64 {
        self.position
    }

    /// True once a fill returned fewer bytes than the chunk capacity
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Separator this buffer splits on
    pub fn separator(&self) -> &Separator {
        &self.separator
    }

    /// Pending decoded text
    pub fn pending(&self) -> &Accumulator {
        &self.pending
    }

    /// Account for `bytes_read` bytes placed in [`chunk_mut`](Self::chunk_mut).
    ///
    /// Decodes them onto the accumulator and advances the position. Returns
    /// true when this fill reached end of input. Must not be called once
    /// end of input was reached.
    pub fn commit(&mut self, bytes_read: usize) -> bool {
        debug_assert!(!self.eof, "fill after end of input");
        let bytes_read = bytes_read.min(self.chunk.len());
        let last = bytes_read < self.chunk.len();

        self.decoder
            .feed(&self.chunk[..bytes_read], last, self.pending.appendable());
        self.position += bytes_read as u64;
        log::trace!(
            "filled {bytes_read} bytes, position {}, {} bytes pending",
            self.position,
            self.pending.len()
        );

        if last {
            self.eof = true;
            // the ambiguity rule for pattern matches no longer applies
            self.locus = None;
        }
        last
    }

    /// True while pending text remains or end of input was not reached
    pub fn has_next_line(&self) -> bool {
        !self.pending.is_empty() || !self.eof
    }

    /// True when everything read so far was delivered but end of input is
    /// still unknown.
    ///
    /// Line sources fill once more in this state right after taking a line,
    /// so that a final separator is followed by no further line whatever
    /// the chunk alignment.
    pub fn needs_lookahead(&self) -> bool {
        self.pending.is_empty() && !self.eof
    }

    /// True when the next line is known to be ready without scanning again
    pub fn has_cached_line(&self) -> bool {
        self.eof || self.locus.is_some()
    }

    /// Locate the next separator, using the cached locus when present
    pub fn locate(&mut self) -> Option<Locus> {
        if self.locus.is_none() {
            let text = self.pending.as_str();
            self.locus = self.separator.find(text, self.scan_from, self.eof);
            if self.locus.is_none() {
                self.scan_from = self.separator.resume_offset(text);
            }
        }
        self.locus
    }

    /// True when the next line can be taken without another fill
    pub fn line_ready(&mut self) -> bool {
        self.eof || self.locate().is_some()
    }

    /// Remove and return the next line, without its separator.
    ///
    /// Returns `None` when no line remains or when more input is needed
    /// first (see [`line_ready`](Self::line_ready)).
    pub fn take_line(&mut self) -> Option<String> {
        if !self.has_next_line() {
            return None;
        }

        let line = match self.locate() {
            Some(locus) => {
                let line = self.pending.as_str()[..locus.index].to_string();
                self.pending.consume(locus.end());
                line
            }
            None if self.eof => {
                let line = self.pending.as_str().to_string();
                self.pending.consume(line.len());
                line
            }
            None => return None,
        };

        self.locus = None;
        self.scan_from = 0;
        Some(line)
    }
}

impl std::fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineBuffer")
            .field("chunk_size", &self.chunk.len())
            .field("separator", &self.separator)
            .field("pending", &self.pending.len())
            .field("locus", &self.locus)
            .field("position", &self.position)
            .field("eof", &self.eof)
            .finish()
    }
}
