//! Stream plumbing: the rewind discipline and on-the-fly transcoding.
//!
//! Sniffing reads the same upload several times (charset, blankness,
//! dialect, schema), so every step here starts at position 0 and puts
//! the stream back at position 0 before returning, success or not.

use std::io::{self, Read, Seek};

use encoding_rs::{Decoder, DecoderResult, Encoding, UTF_8};

use crate::encoding::detect_encoding;
use crate::error::Result;

/// How many raw bytes to pull from the underlying stream per refill.
const RAW_CHUNK: usize = 8192;

fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

/// Run `body` on `stream`, then rewind the stream to the start no
/// matter how `body` exited.
pub fn with_rewind<S, T, F>(stream: &mut S, body: F) -> Result<T>
where
    S: Seek + ?Sized,
    F: FnOnce(&mut S) -> Result<T>,
{
    let outcome = body(stream);
    let rewound = stream.rewind();
    match (outcome, rewound) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(error), _) => Err(error),
        (Ok(_), Err(error)) => Err(error.into()),
    }
}

/// Total length of `stream` in bytes, leaving it rewound.
pub fn stream_length<S>(stream: &mut S) -> Result<u64>
where
    S: Seek + ?Sized,
{
    with_rewind(stream, |stream| Ok(stream.seek(io::SeekFrom::End(0))?))
}

/// Detect `stream`'s charset and wrap it for transparent UTF-8 reads.
///
/// This is the usual entry point for an upload of unknown provenance:
/// afterwards the bytes read from the wrapper are always valid UTF-8,
/// whatever the file arrived as.
pub fn decode_stream<R>(mut stream: R) -> Result<DecodedReader<R>>
where
    R: Read + Seek,
{
    let encoding = detect_encoding(&mut stream)?;
    Ok(DecodedReader::new(stream, encoding))
}

/// A reader that decodes an underlying byte stream to UTF-8 as it goes.
///
/// Malformed input surfaces as [`io::ErrorKind::InvalidData`] instead
/// of replacement characters: a cell we cannot read faithfully is an
/// error, not a `U+FFFD`. UTF-8 input takes a validate-and-copy fast
/// path; everything else runs through an `encoding_rs` decoder. A
/// leading byte-order mark is dropped either way.
pub struct DecodedReader<R> {
    inner: R,
    encoding: &'static Encoding,
    decoder: Decoder,
    passthrough: bool,
    /// Passthrough only: tail of an incomplete UTF-8 sequence, waiting
    /// for the rest of the character to arrive.
    carry: Vec<u8>,
    bom_checked: bool,
    decoded: Vec<u8>,
    pos: usize,
    inner_eof: bool,
    finished: bool,
}

impl<R: Read + Seek> DecodedReader<R> {
    /// Wrap `inner`, which must be positioned at the start.
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        DecodedReader {
            inner,
            encoding,
            decoder: encoding.new_decoder_with_bom_removal(),
            passthrough: encoding == UTF_8,
            carry: Vec::new(),
            bom_checked: false,
            decoded: Vec::new(),
            pos: 0,
            inner_eof: false,
            finished: false,
        }
    }

    /// The charset this reader decodes from.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Unwrap, handing the underlying stream back wherever it sits.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Restore the reader, and the stream under it, to the start.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.inner.rewind()?;
        self.decoder = self.encoding.new_decoder_with_bom_removal();
        self.carry.clear();
        self.bom_checked = false;
        self.decoded.clear();
        self.pos = 0;
        self.inner_eof = false;
        self.finished = false;
        Ok(())
    }

    /// Run `body` on this reader, then rewind no matter how it exited.
    pub fn with_rewind<T, F>(&mut self, body: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let outcome = body(self);
        let rewound = self.rewind();
        match (outcome, rewound) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(error), _) => Err(error),
            (Ok(_), Err(error)) => Err(error.into()),
        }
    }

    /// Read up to `cap` decoded bytes from the current position,
    /// returned as a string cut at a character boundary.
    pub(crate) fn read_prefix(&mut self, cap: usize) -> Result<String> {
        let mut buf = vec![0u8; cap];
        let mut filled = 0;
        while filled < cap {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        // The cap can land mid-character; drop the partial tail.
        let valid = match simdutf8::compat::from_utf8(&buf) {
            Ok(_) => buf.len(),
            Err(error) if error.error_len().is_none() => error.valid_up_to(),
            Err(_) => return Err(invalid_data("decoded stream is not valid UTF-8").into()),
        };
        buf.truncate(valid);
        String::from_utf8(buf).map_err(|_| invalid_data("decoded stream is not valid UTF-8").into())
    }

    fn refill(&mut self) -> io::Result<()> {
        self.decoded.clear();
        self.pos = 0;
        while self.decoded.is_empty() && !self.finished {
            let mut chunk = [0u8; RAW_CHUNK];
            let n = if self.inner_eof {
                0
            } else {
                self.inner.read(&mut chunk)?
            };
            if n == 0 {
                self.inner_eof = true;
            }
            if self.passthrough {
                self.validate_utf8(&chunk[..n])?;
            } else {
                self.transcode(&chunk[..n])?;
            }
        }
        Ok(())
    }

    /// Fast path for UTF-8 input: SIMD validation, no transcoding.
    fn validate_utf8(&mut self, chunk: &[u8]) -> io::Result<()> {
        let mut buf = std::mem::take(&mut self.carry);
        buf.extend_from_slice(chunk);

        if !self.bom_checked {
            if buf.len() >= 3 || self.inner_eof {
                if buf.starts_with(&[0xEF, 0xBB, 0xBF]) {
                    buf.drain(..3);
                }
                self.bom_checked = true;
            } else {
                // Too few bytes to rule a BOM in or out yet.
                self.carry = buf;
                return Ok(());
            }
        }

        match simdutf8::compat::from_utf8(&buf) {
            Ok(_) => self.decoded.extend_from_slice(&buf),
            Err(error) if error.error_len().is_none() => {
                let tail = buf.split_off(error.valid_up_to());
                self.decoded.extend_from_slice(&buf);
                self.carry = tail;
            }
            Err(_) => return Err(invalid_data("stream is not valid UTF-8")),
        }

        if self.inner_eof {
            if !self.carry.is_empty() {
                return Err(invalid_data("stream ends in the middle of a character"));
            }
            self.finished = true;
        }
        Ok(())
    }

    fn transcode(&mut self, chunk: &[u8]) -> io::Result<()> {
        let last = self.inner_eof;
        let needed = self
            .decoder
            .max_utf8_buffer_length_without_replacement(chunk.len())
            .unwrap_or(RAW_CHUNK * 4);
        let mut out = vec![0u8; needed.max(64)];
        let mut src = chunk;
        loop {
            let (result, read, written) =
                self.decoder
                    .decode_to_utf8_without_replacement(src, &mut out, last);
            self.decoded.extend_from_slice(&out[..written]);
            src = &src[read..];
            match result {
                DecoderResult::InputEmpty => break,
                DecoderResult::OutputFull => continue,
                DecoderResult::Malformed(_, _) => {
                    return Err(invalid_data(format!(
                        "stream is not valid {}",
                        self.encoding.name()
                    )));
                }
            }
        }
        if last {
            self.finished = true;
        }
        Ok(())
    }
}

impl<R: Read + Seek> Read for DecodedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos >= self.decoded.len() {
            self.refill()?;
        }
        let available = &self.decoded[self.pos..];
        if available.is_empty() {
            return Ok(0);
        }
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}
