//! CIGAR tokenization and expansion into reference positions.
//!
//! A CIGAR string is a run-length encoding of how a read's bases line up
//! against the reference. Expanding it walks a cursor along the reference and
//! records every position covered by an aligned base.

use nom::{
    character::complete::{anychar, digit1},
    combinator::map_res,
    multi::many0,
    sequence::pair,
    IResult,
};

use crate::error::{ReadError, Result};

/// Placeholder CIGAR meaning the read aligns without indels
pub const NO_INDELS: &str = "*";

/// CIGAR operation kinds (SAM v1 section 1.4.6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarKind {
    Match,            // M
    Insertion,        // I
    Deletion,         // D
    Skip,             // N
    SoftClip,         // S
    HardClip,         // H
    Padding,          // P
    SequenceMatch,    // =
    SequenceMismatch, // X
}

/// How an operation moves along the reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarEffect {
    /// Each unit of the operation covers a reference position
    pub consumes_positions: bool,
    /// Each unit of the operation moves the reference cursor
    pub advances_cursor: bool,
}

const fn effect(consumes_positions: bool, advances_cursor: bool) -> CigarEffect {
    CigarEffect {
        consumes_positions,
        advances_cursor,
    }
}

/// Operation code table
const CIGAR_TABLE: [(char, CigarKind, CigarEffect); 9] = [
    ('M', CigarKind::Match, effect(true, true)),
    ('I', CigarKind::Insertion, effect(false, false)),
    ('D', CigarKind::Deletion, effect(false, true)),
    ('N', CigarKind::Skip, effect(false, true)),
    ('S', CigarKind::SoftClip, effect(false, false)),
    ('H', CigarKind::HardClip, effect(false, false)),
    ('P', CigarKind::Padding, effect(false, true)),
    ('=', CigarKind::SequenceMatch, effect(true, true)),
    ('X', CigarKind::SequenceMismatch, effect(true, true)),
];

impl CigarKind {
    /// Look up the kind for a CIGAR code character
    pub fn from_code(code: char) -> Option<Self> {
        CIGAR_TABLE
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, kind, _)| *kind)
    }

    pub fn code(self) -> char {
        self.entry().0
    }

    pub fn effect(self) -> CigarEffect {
        self.entry().2
    }

    fn entry(self) -> &'static (char, CigarKind, CigarEffect) {
        let row = match self {
            CigarKind::Match => 0,
            CigarKind::Insertion => 1,
            CigarKind::Deletion => 2,
            CigarKind::Skip => 3,
            CigarKind::SoftClip => 4,
            CigarKind::HardClip => 5,
            CigarKind::Padding => 6,
            CigarKind::SequenceMatch => 7,
            CigarKind::SequenceMismatch => 8,
        };
        &CIGAR_TABLE[row]
    }
}

/// One run of a CIGAR string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarOp {
    pub kind: CigarKind,
    pub len: u64,
}

impl CigarOp {
    pub fn new(kind: CigarKind, len: u64) -> Self {
        CigarOp { kind, len }
    }
}

fn raw_op(input: &str) -> IResult<&str, (u64, char)> {
    pair(map_res(digit1, str::parse::<u64>), anychar)(input)
}

/// Split a CIGAR string into its operations.
///
/// Fails with [`ReadError::MalformedCigar`] on an unknown code, a code with no
/// count, a trailing count with no code, or a count that does not fit in u64.
pub fn parse_cigar(cigar: &str) -> Result<Vec<CigarOp>> {
    if cigar.is_empty() {
        return Err(ReadError::malformed_cigar(cigar, "empty CIGAR string"));
    }

    let (rest, raw) = many0(raw_op)(cigar)
        .map_err(|e| ReadError::malformed_cigar(cigar, format!("tokenizer failed: {e}")))?;

    if !rest.is_empty() {
        return Err(ReadError::malformed_cigar(
            cigar,
            format!("unexpected trailing input '{rest}'"),
        ));
    }

    raw.into_iter()
        .map(|(len, code)| {
            CigarKind::from_code(code)
                .map(|kind| CigarOp::new(kind, len))
                .ok_or_else(|| {
                    ReadError::malformed_cigar(cigar, format!("unknown operation '{code}'"))
                })
        })
        .collect()
}

/// Expand a CIGAR string into the ascending reference positions it covers.
///
/// `start` is the 0-based reference position of the first aligned base and
/// `query_len` is the length of the read sequence, used only for the
/// [`NO_INDELS`] placeholder. The result may be shorter or longer than
/// `query_len`: insertions and clips use read bases without covering the
/// reference, deletions and skips move along the reference without covering it.
pub fn expand_cigar(start: u64, query_len: u64, cigar: &str) -> Result<Vec<u64>> {
    if cigar == NO_INDELS {
        let end = start
            .checked_add(query_len)
            .ok_or_else(|| ReadError::malformed_cigar(cigar, "read runs past the coordinate range"))?;
        return Ok((start..end).collect());
    }

    let ops = parse_cigar(cigar)?;
    let overflow = || ReadError::malformed_cigar(cigar, "alignment runs past the coordinate range");

    let covered = ops
        .iter()
        .filter(|op| op.kind.effect().consumes_positions)
        .try_fold(0u64, |acc, op| acc.checked_add(op.len))
        .ok_or_else(overflow)?;

    let mut positions = Vec::with_capacity(covered as usize);
    let mut cursor = start;

    for op in &ops {
        let effect = op.kind.effect();
        let next = cursor.checked_add(op.len).ok_or_else(overflow)?;
        if effect.consumes_positions {
            positions.extend(cursor..next);
        }
        if effect.advances_cursor {
            cursor = next;
        }
    }

    Ok(positions)
}

/// Number of reference bases spanned by the operations, covered or not
pub fn reference_span(ops: &[CigarOp]) -> u64 {
    ops.iter()
        .filter(|op| op.kind.effect().advances_cursor)
        .map(|op| op.len)
        .sum()
}
