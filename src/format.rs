//! Structural detection of the alignment line format.
//!
//! Lines are classified by shape alone: the number of leading tab-separated
//! columns and whether each one looks like an integer, a strand symbol, or an
//! arbitrary non-whitespace token. Columns beyond the pattern are ignored.

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::is_not,
    character::complete::{char, digit1, one_of},
    combinator::{eof, opt, peek, recognize, value},
    sequence::{pair, terminated, tuple},
    IResult,
};

use crate::error::{ReadError, Result};

/// Known alignment line formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignmentFormat {
    Bed,
    Sam,
}

impl AlignmentFormat {
    /// Order in which shapes are tried; the first match wins
    pub const DETECTION_ORDER: [AlignmentFormat; 2] = [AlignmentFormat::Bed, AlignmentFormat::Sam];

    /// Human readable column shape, used in error messages
    pub fn pattern(self) -> &'static str {
        match self {
            AlignmentFormat::Bed => "string\tinteger\tinteger\tstring\tstring\tstrand",
            AlignmentFormat::Sam => {
                "string\tinteger\tstring\tinteger\tinteger\tstring\tstring\tinteger\tinteger\tstring\tstring"
            }
        }
    }

    /// True if the start of `line` has this format's column shape
    pub fn matches(self, line: &str) -> bool {
        match self {
            AlignmentFormat::Bed => bed_shape(line).is_ok(),
            AlignmentFormat::Sam => sam_shape(line).is_ok(),
        }
    }
}

impl fmt::Display for AlignmentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentFormat::Bed => write!(f, "BED"),
            AlignmentFormat::Sam => write!(f, "SAM"),
        }
    }
}

/// Classify a line, trying BED before SAM.
///
/// A BED12 line with a numeric name also has the SAM shape; it is reported as
/// BED because BED is tried first.
pub fn detect_format(line: &str) -> Result<AlignmentFormat> {
    AlignmentFormat::DETECTION_ORDER
        .iter()
        .copied()
        .find(|format| format.matches(line))
        .ok_or_else(|| ReadError::UnknownFormat {
            line: line.to_string(),
            known: AlignmentFormat::DETECTION_ORDER.to_vec(),
        })
}

// Column primitives

fn token(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\x0b\x0c")(input)
}

fn integer(input: &str) -> IResult<&str, &str> {
    digit1(input)
}

// TLEN is negative for the leftmost mate of a pair
fn signed_integer(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1))(input)
}

fn tab(input: &str) -> IResult<&str, char> {
    char('\t')(input)
}

fn column_end(input: &str) -> IResult<&str, ()> {
    value((), alt((eof, column_break)))(input)
}

fn column_break(input: &str) -> IResult<&str, &str> {
    recognize(one_of("\t\r\n"))(input)
}

fn strand(input: &str) -> IResult<&str, char> {
    terminated(one_of("+-."), peek(column_end))(input)
}

fn bed_shape(input: &str) -> IResult<&str, ()> {
    value(
        (),
        tuple((
            token, tab, integer, tab, integer, tab, token, tab, token, tab, strand,
        )),
    )(input)
}

fn sam_shape(input: &str) -> IResult<&str, ()> {
    value(
        (),
        tuple((
            tuple((token, tab, integer, tab, token, tab, integer, tab, integer, tab)),
            tuple((token, tab, token, tab, integer, tab, signed_integer, tab, token, tab, token)),
        )),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BED_LINE: &str = "chr1\t100\t110\treadA\t0\t-";
    const SAM_LINE: &str = "read1\t0\tchr1\t11\t60\t5M\t*\t0\t0\tACGTA\tIIIII";

    #[test]
    fn test_detect_bed() {
        assert_eq!(detect_format(BED_LINE).unwrap(), AlignmentFormat::Bed);
        // Extra columns are ignored
        assert_eq!(
            detect_format("chr1\t100\t110\treadA\t0\t+\textra\tcols").unwrap(),
            AlignmentFormat::Bed
        );
        assert_eq!(
            detect_format("chr1\t100\t110\treadA\t0\t.\r").unwrap(),
            AlignmentFormat::Bed
        );
    }

    #[test]
    fn test_detect_sam() {
        assert_eq!(detect_format(SAM_LINE).unwrap(), AlignmentFormat::Sam);
        let with_tags = format!("{SAM_LINE}\tNM:i:0\tMD:Z:5");
        assert_eq!(detect_format(&with_tags).unwrap(), AlignmentFormat::Sam);
    }

    #[test]
    fn test_detect_sam_negative_template_length() {
        let line = "read1\t83\tchr1\t200\t60\t5M\t=\t100\t-105\tACGTA\tIIIII";
        assert_eq!(detect_format(line).unwrap(), AlignmentFormat::Sam);
    }

    #[test]
    fn test_bed_requires_strand_symbol() {
        assert!(!AlignmentFormat::Bed.matches("chr1\t100\t110\treadA\t0\tx"));
        assert!(!AlignmentFormat::Bed.matches("chr1\t100\t110\treadA\t0\t+x"));
        assert!(!AlignmentFormat::Bed.matches("chr1\t100\t110\treadA\t0"));
        assert!(!AlignmentFormat::Bed.matches("chr1\t1e2\t110\treadA\t0\t+"));
    }

    #[test]
    fn test_sam_is_not_bed() {
        assert!(!AlignmentFormat::Bed.matches(SAM_LINE));
        assert!(!AlignmentFormat::Sam.matches(BED_LINE));
    }

    #[test]
    fn test_unknown_format() {
        let err = detect_format("this is not an alignment").unwrap_err();
        match err {
            ReadError::UnknownFormat { line, known } => {
                assert_eq!(line, "this is not an alignment");
                assert_eq!(known, vec![AlignmentFormat::Bed, AlignmentFormat::Sam]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(detect_format("").is_err());
    }

    #[test]
    fn test_ambiguous_bed12_prefers_bed() {
        // Numeric name makes this BED12 record fit the SAM shape as well
        let line = "chr1\t100\t200\t7\t0\t+\t100\t200\t0\t1\t100,\t0,";
        assert!(AlignmentFormat::Bed.matches(line));
        assert!(AlignmentFormat::Sam.matches(line));
        assert_eq!(detect_format(line).unwrap(), AlignmentFormat::Bed);
    }
}
