//! Streaming byte-to-text decoding

use encoding_rs::{CoderResult, Decoder, Encoding};

/// Incremental decoder fed one chunk at a time.
///
/// Implementations must carry incomplete multi-byte sequences over to the
/// next call; `last` marks the final chunk, after which nothing is carried.
pub trait TextDecoder: Send {
    /// Decode `bytes` and append the text to `dst`
    fn feed(&mut self, bytes: &[u8], last: bool, dst: &mut String);
}

/// [`TextDecoder`] backed by `encoding_rs`
pub struct EncodingDecoder {
    inner: Decoder,
    replacements: usize,
}

impl EncodingDecoder {
    /// Create a decoder for `encoding`.
    ///
    /// Byte order marks are passed through as text so that the delivered
    /// lines reproduce the input exactly.
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            inner: encoding.new_decoder_without_bom_handling(),
            replacements: 0,
        }
    }

    /// Encoding this decoder was created for
    pub fn encoding(&self) -> &'static Encoding {
        self.inner.encoding()
    }

    /// Number of chunks in which malformed input was replaced with U+FFFD
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl std::fmt::Debug for EncodingDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodingDecoder")
            .field("encoding", &self.inner.encoding().name())
            .field("replacements", &self.replacements)
            .finish()
    }
}

impl TextDecoder for EncodingDecoder {
    fn feed(&mut self, bytes: &[u8], last: bool, dst: &mut String) {
        let mut src = bytes;
        loop {
            let needed = self
                .inner
                .max_utf8_buffer_length(src.len())
                .unwrap_or(src.len().saturating_mul(3).saturating_add(4));
            dst.reserve(needed);

            let (result, read, replaced) = self.inner.decode_to_string(src, dst, last);
            if replaced {
                self.replacements += 1;
                log::debug!(
                    "malformed {} input replaced with U+FFFD",
                    self.inner.encoding().name()
                );
            }
            src = &src[read..];

            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }
}
