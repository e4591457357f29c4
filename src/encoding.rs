//! Charset detection for uploaded byte streams, using chardetng and
//! `encoding_rs`.
//!
//! Detection is incremental: chunks are fed to a [`CharsetDetector`]
//! until it is confident, the stream ends, or [`MAX_DETECT_BYTES`]
//! have been examined. Whatever happens, the stream ends up rewound.

use std::io::{Read, Seek};

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::error::Result;
use crate::streams::with_rewind;

/// Never examine more than this many bytes when detecting a charset.
/// Plenty for a verdict, and keeps huge uploads from being read twice
/// end to end.
pub const MAX_DETECT_BYTES: usize = 1_000_000;

/// Chunk size for feeding the detector.
const DETECT_CHUNK: usize = 8192;

/// An incremental charset detection strategy.
///
/// `feed` may return an encoding early when the evidence is already
/// conclusive (a byte-order mark, typically). Otherwise feeding
/// continues until the input runs out or [`MAX_DETECT_BYTES`] have
/// been seen, and `conclude` is asked for a verdict.
pub trait CharsetDetector {
    /// Examine the next chunk. `Some` means confident: stop feeding.
    fn feed(&mut self, chunk: &[u8]) -> Option<&'static Encoding>;

    /// Best guess once feeding is over, or `None` for no opinion.
    fn conclude(&mut self) -> Option<&'static Encoding>;
}

/// The default detector: BOM sniffing for the early exit, chardetng
/// for everything else.
pub struct ChardetngDetector {
    inner: EncodingDetector,
    first_chunk: bool,
}

impl ChardetngDetector {
    pub fn new() -> Self {
        ChardetngDetector {
            inner: EncodingDetector::new(),
            first_chunk: true,
        }
    }
}

impl Default for ChardetngDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CharsetDetector for ChardetngDetector {
    fn feed(&mut self, chunk: &[u8]) -> Option<&'static Encoding> {
        if self.first_chunk {
            self.first_chunk = false;
            if let Some((encoding, _bom_length)) = Encoding::for_bom(chunk) {
                return Some(encoding);
            }
        }
        self.inner.feed(chunk, false);
        None
    }

    fn conclude(&mut self) -> Option<&'static Encoding> {
        self.inner.feed(b"", true);
        Some(self.inner.guess(None, true))
    }
}

/// Detect the charset of `stream` with the default detector.
///
/// Reads at most [`MAX_DETECT_BYTES`], rewinds on every exit path, and
/// falls back to UTF-8 (with a warning) when the detector offers no
/// opinion.
pub fn detect_encoding<R>(stream: &mut R) -> Result<&'static Encoding>
where
    R: Read + Seek,
{
    let mut detector = ChardetngDetector::new();
    detect_encoding_with(stream, &mut detector)
}

/// [`detect_encoding`] with a caller-supplied detection strategy.
pub fn detect_encoding_with<R>(
    stream: &mut R,
    detector: &mut dyn CharsetDetector,
) -> Result<&'static Encoding>
where
    R: Read + Seek,
{
    let verdict = with_rewind(stream, |stream| {
        stream.rewind()?;
        let mut chunk = [0u8; DETECT_CHUNK];
        let mut examined = 0usize;
        loop {
            let n = stream.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            if let Some(encoding) = detector.feed(&chunk[..n]) {
                return Ok(Some(encoding));
            }
            examined += n;
            if examined >= MAX_DETECT_BYTES {
                tracing::warn!(
                    examined,
                    "charset detection cap reached, deciding on what was seen"
                );
                break;
            }
        }
        Ok(detector.conclude())
    })?;

    match verdict {
        Some(encoding) => {
            tracing::debug!(charset = encoding.name(), "detected charset");
            Ok(encoding)
        }
        None => {
            tracing::warn!("unable to determine charset, assuming utf-8");
            Ok(encoding_rs::UTF_8)
        }
    }
}
