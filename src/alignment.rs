//! Parsing of single BED and SAM alignment lines.
//!
//! [`parse_record`] handles one line under a known format. [`AlignmentParser`]
//! carries the assumed format from line to line and re-detects it when a line
//! does not parse under the current assumption.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::cigar::expand_cigar;
use crate::error::{ReadError, Result};
use crate::format::{detect_format, AlignmentFormat};
use crate::read::{Parsed, Read};

/// SAM FLAG bit: segment unmapped
pub const FLAG_UNMAPPED: u16 = 0x4;
/// SAM FLAG bit: SEQ is reverse complemented
pub const FLAG_REVERSE: u16 = 0x10;

/// Parse attempts allowed per line (the first try plus two re-detections)
pub const MAX_PARSE_ATTEMPTS: usize = 3;

const BED_MIN_FIELDS: usize = 6;
const SAM_MIN_FIELDS: usize = 11;

/// Strand a read aligned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
    /// BED `.`; ordered like the forward strand
    Unknown,
}

impl Strand {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            "." => Some(Strand::Unknown),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => '.',
        }
    }

    pub fn is_reverse(self) -> bool {
        self == Strand::Reverse
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Fields pulled from one alignment line.
///
/// `positions` are 0-based, ascending in genome order, and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord {
    pub(crate) chromosome: String,
    pub(crate) strand: Strand,
    pub(crate) name: String,
    pub(crate) positions: Vec<u64>,
}

impl AlignmentRecord {
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Covered positions in genome order
    pub fn positions(&self) -> &[u64] {
        &self.positions
    }
}

/// Why a line did not produce an [`AlignmentRecord`]
#[derive(Debug, Error)]
pub enum RecordError {
    /// SAM record with the unmapped bit set
    #[error("read does not map: {name}")]
    Unmapped { name: String },

    /// Line does not have the structure of the assumed format
    #[error("{0}")]
    Malformed(String),

    /// Condition that must stop the stream regardless of format
    #[error(transparent)]
    Fatal(#[from] ReadError),
}

fn malformed(reason: impl Into<String>) -> RecordError {
    RecordError::Malformed(reason.into())
}

fn require_shape(line: &str, format: AlignmentFormat) -> std::result::Result<(), RecordError> {
    if format.matches(line) {
        Ok(())
    } else {
        Err(malformed(format!(
            "line does not have the {format} column shape ({})",
            format.pattern().replace('\t', " ")
        )))
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    line.trim_end_matches(&['\r', '\n'][..]).split('\t').collect()
}

fn parse_field<T: FromStr>(value: &str, column: &str) -> std::result::Result<T, RecordError> {
    value
        .parse()
        .map_err(|_| malformed(format!("{column} is not an integer: '{value}'")))
}

fn non_empty<'a>(value: &'a str, column: &str) -> std::result::Result<&'a str, RecordError> {
    if value.is_empty() || value.contains(char::is_whitespace) {
        Err(malformed(format!("{column} is empty or contains whitespace")))
    } else {
        Ok(value)
    }
}

/// Parse a BED line: chrom, 0-based start, exclusive end, name, score, strand
pub fn parse_bed_record(line: &str) -> std::result::Result<AlignmentRecord, RecordError> {
    require_shape(line, AlignmentFormat::Bed)?;
    let fields = split_fields(line);
    if fields.len() < BED_MIN_FIELDS {
        return Err(malformed(format!(
            "BED line has {} fields, expected at least {BED_MIN_FIELDS}",
            fields.len()
        )));
    }

    let chromosome = non_empty(fields[0], "chrom")?;
    let start: u64 = parse_field(fields[1], "chromStart")?;
    let end: u64 = parse_field(fields[2], "chromEnd")?;
    let name = non_empty(fields[3], "name")?;
    let strand = Strand::from_symbol(fields[5])
        .ok_or_else(|| malformed(format!("strand must be +, - or ., got '{}'", fields[5])))?;

    if end <= start {
        return Err(malformed(format!(
            "BED interval {start}-{end} covers no bases"
        )));
    }

    Ok(AlignmentRecord {
        chromosome: chromosome.to_string(),
        strand,
        name: name.to_string(),
        positions: (start..end).collect(),
    })
}

/// Parse a SAM alignment line.
///
/// Unmapped records are reported as [`RecordError::Unmapped`]. A CIGAR string
/// with an unknown operation is [`RecordError::Fatal`].
pub fn parse_sam_record(line: &str) -> std::result::Result<AlignmentRecord, RecordError> {
    require_shape(line, AlignmentFormat::Sam)?;
    let fields = split_fields(line);
    if fields.len() < SAM_MIN_FIELDS {
        return Err(malformed(format!(
            "SAM line has {} fields, expected at least {SAM_MIN_FIELDS}",
            fields.len()
        )));
    }

    let name = non_empty(fields[0], "QNAME")?;
    let flag: u16 = parse_field(fields[1], "FLAG")?;
    let chromosome = non_empty(fields[2], "RNAME")?;
    let pos: u64 = parse_field(fields[3], "POS")?;
    let cigar = non_empty(fields[5], "CIGAR")?;
    let sequence = non_empty(fields[9], "SEQ")?;

    if flag & FLAG_UNMAPPED != 0 {
        return Err(RecordError::Unmapped {
            name: name.to_string(),
        });
    }

    if pos == 0 {
        return Err(malformed("mapped SAM record has POS 0"));
    }
    let start = pos - 1;
    let query_len = if sequence == "*" { 0 } else { sequence.len() as u64 };

    let positions = expand_cigar(start, query_len, cigar)?;
    if positions.is_empty() {
        return Err(malformed(format!(
            "CIGAR '{cigar}' covers no reference positions"
        )));
    }

    let strand = if flag & FLAG_REVERSE != 0 {
        Strand::Reverse
    } else {
        Strand::Forward
    };

    Ok(AlignmentRecord {
        chromosome: chromosome.to_string(),
        strand,
        name: name.to_string(),
        positions,
    })
}

/// Parse a line under the given format
pub fn parse_record(
    line: &str,
    format: AlignmentFormat,
) -> std::result::Result<AlignmentRecord, RecordError> {
    match format {
        AlignmentFormat::Bed => parse_bed_record(line),
        AlignmentFormat::Sam => parse_sam_record(line),
    }
}

/// Stateful line parser for one alignment stream.
///
/// The format is detected from the first line and then assumed for every
/// following line. When a line fails to parse under the assumed format the
/// format is detected again from that line and parsing is retried, up to
/// [`MAX_PARSE_ATTEMPTS`] parses per line.
#[derive(Debug, Clone, Default)]
pub struct AlignmentParser {
    format: Option<AlignmentFormat>,
    last_attempts: usize,
}

impl AlignmentParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a format already assumed instead of detecting it
    pub fn with_format(format: AlignmentFormat) -> Self {
        AlignmentParser {
            format: Some(format),
            last_attempts: 0,
        }
    }

    /// Currently assumed format, if any line has been classified yet
    pub fn format(&self) -> Option<AlignmentFormat> {
        self.format
    }

    /// Parse attempts used by the most recent call to [`parse_line`](Self::parse_line)
    pub fn last_attempts(&self) -> usize {
        self.last_attempts
    }

    /// Turn one alignment line into a read.
    ///
    /// Header and comment lines must be filtered out before calling this.
    pub fn parse_line(&mut self, line: &str) -> Result<Parsed> {
        self.last_attempts = 0;
        let mut format = match self.format {
            Some(format) => format,
            None => self.redetect(line)?,
        };

        loop {
            self.last_attempts += 1;
            match parse_record(line, format) {
                Ok(record) => return Ok(Parsed::Mapped(Read::from_record(record))),
                Err(RecordError::Unmapped { name }) => return Ok(Parsed::Unmapped { name }),
                Err(RecordError::Fatal(err)) => return Err(err),
                Err(RecordError::Malformed(reason)) => {
                    if self.last_attempts >= MAX_PARSE_ATTEMPTS {
                        return Err(ReadError::UnparseableLine {
                            line: line.to_string(),
                            attempts: self.last_attempts,
                            reason,
                        });
                    }
                    log::debug!(
                        "Line did not parse as {format} ({reason}), detecting format again"
                    );
                    format = self.redetect(line)?;
                }
            }
        }
    }

    fn redetect(&mut self, line: &str) -> Result<AlignmentFormat> {
        let detected = detect_format(line)?;
        if self.format != Some(detected) {
            log::debug!("Input format set to {detected}");
        }
        self.format = Some(detected);
        Ok(detected)
    }
}
