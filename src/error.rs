//! Error types for read extraction

use thiserror::Error;

use crate::format::AlignmentFormat;

/// Result type alias for read parsing operations
pub type Result<T> = std::result::Result<T, ReadError>;

/// Fatal conditions raised while turning an alignment line into a read.
///
/// Unmapped SAM records are not errors: they come back as
/// [`Parsed::Unmapped`](crate::read::Parsed::Unmapped) so that a caller can
/// never skip one of these by accident.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Line matches none of the known structural patterns
    #[error(
        "Could not determine the read format of line: {line}\nKnown formats are:\n{}",
        describe_patterns(.known)
    )]
    UnknownFormat {
        /// The offending line
        line: String,
        /// Formats that were tried, in detection order
        known: Vec<AlignmentFormat>,
    },

    /// Every detect/parse attempt for a line failed
    #[error("Could not parse line after {attempts} attempts ({reason}): {line}")]
    UnparseableLine {
        /// The offending line
        line: String,
        /// Number of parse attempts made
        attempts: usize,
        /// Failure reported by the last attempt
        reason: String,
    },

    /// CIGAR string uses an unknown operation or is not well formed
    #[error("Malformed CIGAR string '{cigar}': {reason}")]
    MalformedCigar {
        /// The CIGAR field as read
        cigar: String,
        /// What was wrong with it
        reason: String,
    },
}

impl ReadError {
    pub(crate) fn malformed_cigar(cigar: &str, reason: impl Into<String>) -> Self {
        ReadError::MalformedCigar {
            cigar: cigar.to_string(),
            reason: reason.into(),
        }
    }
}

fn describe_patterns(known: &[AlignmentFormat]) -> String {
    known
        .iter()
        .map(|format| format!("    {}: {}", format, format.pattern()))
        .collect::<Vec<_>>()
        .join("\n")
}
