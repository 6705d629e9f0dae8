//! Reads oriented 5' to 3' and their BED renderings.

use std::fmt;

use crate::alignment::{AlignmentRecord, Strand};

/// Score column written for every read
pub const BED_SCORE: u8 = 0;

/// Outcome of parsing one alignment line that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Mapped read, ready to render
    Mapped(Read),
    /// SAM record flagged unmapped; callers skip it
    Unmapped { name: String },
}

/// Which interval of a read to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rendering {
    /// Only the 5'-most base
    #[default]
    FirstBase,
    /// From the 5'-most base to one past the 3'-most base
    FullSpan,
}

/// An aligned read.
///
/// `positions` run from the 5' end of the read to the 3' end, so
/// `positions[0]` is always the 5'-most aligned base. For reverse strand reads
/// this is the reverse of genome order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    chromosome: String,
    strand: Strand,
    name: String,
    positions: Vec<u64>,
}

impl Read {
    /// Build a read from positions given in genome order.
    ///
    /// Returns `None` if `positions` is empty.
    pub fn new(
        chromosome: impl Into<String>,
        strand: Strand,
        name: impl Into<String>,
        positions: Vec<u64>,
    ) -> Option<Self> {
        if positions.is_empty() {
            return None;
        }
        Some(Self::oriented(chromosome.into(), strand, name.into(), positions))
    }

    pub(crate) fn from_record(record: AlignmentRecord) -> Self {
        Self::oriented(
            record.chromosome,
            record.strand,
            record.name,
            record.positions,
        )
    }

    fn oriented(chromosome: String, strand: Strand, name: String, mut positions: Vec<u64>) -> Self {
        if strand.is_reverse() {
            positions.reverse();
        }
        Read {
            chromosome,
            strand,
            name,
            positions,
        }
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positions in 5' to 3' order
    pub fn positions(&self) -> &[u64] {
        &self.positions
    }

    /// Genome position of the 5'-most base
    pub fn five_prime(&self) -> u64 {
        self.positions[0]
    }

    /// Genome position of the 3'-most base
    pub fn three_prime(&self) -> u64 {
        self.positions[self.positions.len() - 1]
    }

    /// BED6 line for the full read: 5'-most base to one past the 3'-most base.
    ///
    /// For reverse strand reads the start column is greater than the end.
    pub fn full_span(&self) -> String {
        self.bed_line(self.five_prime(), self.three_prime() + 1)
    }

    /// BED6 line covering only the 5'-most base
    pub fn first_base(&self) -> String {
        let start = self.five_prime();
        self.bed_line(start, start + 1)
    }

    pub fn render(&self, rendering: Rendering) -> String {
        match rendering {
            Rendering::FirstBase => self.first_base(),
            Rendering::FullSpan => self.full_span(),
        }
    }

    fn bed_line(&self, start: u64, end: u64) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.chromosome, start, end, self.name, BED_SCORE, self.strand
        )
    }
}

impl fmt::Display for Read {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_span())
    }
}
