//! Dialect detection over a decoded text prefix.
//!
//! Candidates (delimiter x quote) are scored by table uniformity: the
//! dialect whose parse gives the most consistent field count across
//! sample records wins. Detection never fails the upload; when nothing
//! scores well enough the comma/double-quote fallback is returned and
//! a warning logged.

use std::fmt;
use std::io::{Read, Seek};

use foldhash::{HashMap, HashMapExt};

use crate::error::{PeekError, Result};
use crate::streams::DecodedReader;

/// Bytes of decoded text examined by [`sniff_dialect`].
pub const DIALECT_SAMPLE_BYTES: usize = 8192;

/// Bytes of decoded text examined by [`ensure_not_blank`].
pub const BLANK_CHECK_BYTES: usize = 2048;

/// Candidate delimiters, ordered by how common they are in uploads.
const CANDIDATE_DELIMITERS: &[u8] = b",;\t|";

/// Candidate quote configurations, preferred first.
const CANDIDATE_QUOTES: &[Quote] = &[Quote::Some(b'"'), Quote::Some(b'\''), Quote::None];

/// Candidates scoring below this are not believed; the fallback
/// dialect is used instead. Single-field candidates cannot reach it.
const MIN_SCORE: f64 = 0.5;

/// Quote character configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    /// Quote character in use.
    Some(u8),
    /// No quoting.
    None,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quote::Some(q) => write!(f, "{:?}", *q as char),
            Quote::None => write!(f, "none"),
        }
    }
}

/// Record terminator conventions we can parse.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTerminator {
    /// `\n` or `\r\n`; the parser treats both alike.
    LF,
    /// Bare `\r`, the old Mac convention.
    CR,
}

/// A CSV dialect: how records and fields are delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dialect {
    /// Field delimiter character.
    pub delimiter: u8,
    /// Quote character configuration.
    pub quote: Quote,
    /// Escape character, when the dialect escapes quotes with a
    /// dedicated character instead of doubling them. Never inferred;
    /// carried so declared dialects can express it.
    pub escape: Option<u8>,
    /// Record terminator convention.
    pub line_terminator: LineTerminator,
}

impl Default for Dialect {
    /// The fallback dialect: comma-delimited, double-quoted, quotes
    /// escaped by doubling.
    fn default() -> Self {
        Dialect {
            delimiter: b',',
            quote: Quote::Some(b'"'),
            escape: None,
            line_terminator: LineTerminator::LF,
        }
    }
}

impl Dialect {
    /// A `csv` reader builder configured for this dialect. Callers set
    /// header handling and strictness themselves.
    pub(crate) fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.delimiter(self.delimiter);
        match self.quote {
            Quote::None => {
                builder.quoting(false);
            }
            Quote::Some(q) => {
                builder.quote(q);
            }
        }
        builder.escape(self.escape);
        if self.line_terminator == LineTerminator::CR {
            builder.terminator(csv::Terminator::Any(b'\r'));
        }
        builder
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "delimiter {:?}, quote {}",
            self.delimiter as char, self.quote
        )
    }
}

/// Error with [`PeekError::BlankInput`] when the upload has no usable
/// content in its first [`BLANK_CHECK_BYTES`] decoded bytes.
///
/// Runs before dialect detection so an empty upload fails loudly
/// instead of yielding a nonsense schema. Rewinds on every exit path.
pub fn ensure_not_blank<R>(text: &mut DecodedReader<R>) -> Result<()>
where
    R: Read + Seek,
{
    text.with_rewind(|text| {
        let prefix = text.read_prefix(BLANK_CHECK_BYTES)?;
        if prefix.trim().is_empty() {
            return Err(PeekError::BlankInput);
        }
        Ok(())
    })
}

/// Detect the dialect of `text` from its first
/// [`DIALECT_SAMPLE_BYTES`] decoded bytes, rewinding afterwards.
pub fn sniff_dialect<R>(text: &mut DecodedReader<R>) -> Result<Dialect>
where
    R: Read + Seek,
{
    text.with_rewind(|text| {
        let sample = text.read_prefix(DIALECT_SAMPLE_BYTES)?;
        let truncated = sample.len() >= DIALECT_SAMPLE_BYTES - 4;
        let line_terminator = detect_line_terminator(sample.as_bytes());
        match detect_dialect(&sample, truncated, line_terminator) {
            Some(dialect) => {
                tracing::debug!(?dialect, "sniffed dialect");
                Ok(dialect)
            }
            None => {
                tracing::warn!("unable to sniff a dialect, assuming comma-delimited");
                Ok(Dialect {
                    line_terminator,
                    ..Dialect::default()
                })
            }
        }
    })
}

/// Quote characters counted once per sample, shared by every
/// candidate evaluation.
struct QuoteCounts {
    double: usize,
    single: usize,
}

impl QuoteCounts {
    fn new(sample: &[u8]) -> Self {
        QuoteCounts {
            double: bytecount::count(sample, b'"'),
            single: bytecount::count(sample, b'\''),
        }
    }

    /// Nudge candidates whose quote choice the bytes support. Kept
    /// gentle: apostrophes in prose are common and prove nothing.
    fn evidence(&self, quote: Quote) -> f64 {
        match quote {
            Quote::Some(b'"') if self.double >= 2 => 1.05,
            Quote::Some(b'\'') if self.single < 2 => 0.9,
            Quote::Some(b'\'') if self.double >= 2 => 0.95,
            Quote::None if self.double >= 2 => 0.9,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone)]
struct CandidateScore {
    dialect: Dialect,
    score: f64,
}

fn detect_line_terminator(sample: &[u8]) -> LineTerminator {
    // Bare-\r files have carriage returns and no newlines at all.
    if bytecount::count(sample, b'\n') == 0 && bytecount::count(sample, b'\r') > 0 {
        LineTerminator::CR
    } else {
        LineTerminator::LF
    }
}

fn detect_dialect(
    sample: &str,
    truncated: bool,
    line_terminator: LineTerminator,
) -> Option<Dialect> {
    let quotes = QuoteCounts::new(sample.as_bytes());
    let mut best: Option<CandidateScore> = None;
    for &delimiter in CANDIDATE_DELIMITERS {
        for &quote in CANDIDATE_QUOTES {
            let candidate = Dialect {
                delimiter,
                quote,
                escape: None,
                line_terminator,
            };
            let scored = score_candidate(sample, truncated, candidate, &quotes);
            // Strict comparison keeps the earlier (more common)
            // candidate on ties, so plain files come out comma and
            // double-quote.
            let better = match &best {
                None => scored.score > 0.0,
                Some(current) => scored.score > current.score,
            };
            if better {
                best = Some(scored);
            }
        }
    }
    best.filter(|best| best.score >= MIN_SCORE)
        .map(|best| best.dialect)
}

fn score_candidate(
    sample: &str,
    truncated: bool,
    dialect: Dialect,
    quotes: &QuoteCounts,
) -> CandidateScore {
    let mut counts = field_counts(sample, &dialect);
    if truncated && counts.len() > 1 {
        // The sample cap usually cuts the final record mid-row.
        counts.pop();
    }
    if counts.is_empty() {
        return CandidateScore {
            dialect,
            score: 0.0,
        };
    }
    let (modal, dominance) = modal_field_count(&counts);
    // A single-field parse usually means the delimiter never appears;
    // it must not outrank the fallback.
    let single_field_penalty = if modal >= 2 { 1.0 } else { 0.25 };
    CandidateScore {
        dialect,
        score: dominance * single_field_penalty * quotes.evidence(dialect.quote),
    }
}

/// Parse the sample leniently under `dialect` and return each record's
/// field count.
fn field_counts(sample: &str, dialect: &Dialect) -> Vec<usize> {
    let mut builder = dialect.reader_builder();
    builder.has_headers(false).flexible(true);
    let mut reader = builder.from_reader(sample.as_bytes());
    let mut counts = Vec::new();
    let mut record = csv::StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => counts.push(record.len()),
            Ok(false) => break,
            Err(_) => break,
        }
    }
    counts
}

/// The most common field count and the share of records that have it.
fn modal_field_count(counts: &[usize]) -> (usize, f64) {
    let mut frequency: HashMap<usize, usize> = HashMap::with_capacity(counts.len());
    for &count in counts {
        *frequency.entry(count).or_insert(0) += 1;
    }
    // Deterministic tie-breaking: prefer the higher field count.
    frequency
        .into_iter()
        .max_by(|(fields_a, freq_a), (fields_b, freq_b)| {
            freq_a.cmp(freq_b).then_with(|| fields_a.cmp(fields_b))
        })
        .map_or((0, 0.0), |(fields, freq)| {
            (fields, freq as f64 / counts.len() as f64)
        })
}
