/// Property-based tests for CIGAR expansion and read orientation
///
/// Uses proptest to check invariants that must hold for every well formed
/// CIGAR string, not just the handful of examples in the unit tests.
use fiveprime::cigar::{expand_cigar, parse_cigar, reference_span, CigarKind, CigarOp};
use fiveprime::{AlignmentParser, Parsed};
use proptest::prelude::*;

const CODES: [char; 9] = ['M', 'I', 'D', 'N', 'S', 'H', 'P', '=', 'X'];

fn cigar_ops() -> impl Strategy<Value = Vec<(u64, char)>> {
    prop::collection::vec((1u64..50, prop::sample::select(CODES.to_vec())), 1..12)
}

fn to_cigar(ops: &[(u64, char)]) -> String {
    ops.iter().map(|(len, code)| format!("{len}{code}")).collect()
}

/// Property: number of positions equals the summed length of covering operations
#[test]
fn prop_position_count_matches_covering_ops() {
    proptest!(|(start in 0u64..1_000_000, ops in cigar_ops())| {
        let cigar = to_cigar(&ops);
        let positions = expand_cigar(start, 0, &cigar).unwrap();

        let expected: u64 = ops
            .iter()
            .filter(|(_, code)| matches!(code, 'M' | '=' | 'X'))
            .map(|(len, _)| *len)
            .sum();

        prop_assert_eq!(positions.len() as u64, expected,
            "CIGAR {} produced {} positions", cigar, positions.len());
    });
}

/// Property: positions are strictly ascending and stay inside the reference span
#[test]
fn prop_positions_ascending_within_span() {
    proptest!(|(start in 0u64..1_000_000, ops in cigar_ops())| {
        let cigar = to_cigar(&ops);
        let positions = expand_cigar(start, 0, &cigar).unwrap();
        let span = reference_span(&parse_cigar(&cigar).unwrap());

        for pair in positions.windows(2) {
            prop_assert!(pair[0] < pair[1], "positions out of order for {}", cigar);
        }
        if let (Some(first), Some(last)) = (positions.first(), positions.last()) {
            prop_assert!(*first >= start);
            prop_assert!(*last < start + span);
        }
    });
}

/// Property: tokenizing recovers exactly the generated operations
#[test]
fn prop_tokenizer_preserves_operations() {
    proptest!(|(ops in cigar_ops())| {
        let parsed = parse_cigar(&to_cigar(&ops)).unwrap();
        let expected: Vec<CigarOp> = ops
            .iter()
            .map(|(len, code)| CigarOp::new(CigarKind::from_code(*code).unwrap(), *len))
            .collect();
        prop_assert_eq!(parsed, expected);
    });
}

/// Property: the placeholder CIGAR covers exactly the read length from the start
#[test]
fn prop_placeholder_is_read_length() {
    proptest!(|(start in 0u64..1_000_000, len in 0u64..500)| {
        let positions = expand_cigar(start, len, "*").unwrap();
        prop_assert_eq!(positions.len() as u64, len);
        prop_assert_eq!(positions.first().copied(), if len > 0 { Some(start) } else { None });
    });
}

/// Property: the first position of a read is its 5' end on both strands
#[test]
fn prop_first_position_is_five_prime() {
    proptest!(|(pos in 1u64..1_000_000, matched in 1u64..200, reverse in any::<bool>())| {
        let flag = if reverse { 16 } else { 0 };
        let seq = "A".repeat(matched as usize);
        let qual = "I".repeat(matched as usize);
        let line = format!("r\t{flag}\tchr1\t{pos}\t60\t{matched}M\t*\t0\t0\t{seq}\t{qual}");

        let mut parser = AlignmentParser::new();
        let read = match parser.parse_line(&line).unwrap() {
            Parsed::Mapped(read) => read,
            Parsed::Unmapped { .. } => panic!("read should be mapped"),
        };

        let leftmost = pos - 1;
        let rightmost = leftmost + matched - 1;
        if reverse {
            prop_assert_eq!(read.five_prime(), rightmost);
            prop_assert_eq!(read.three_prime(), leftmost);
        } else {
            prop_assert_eq!(read.five_prime(), leftmost);
            prop_assert_eq!(read.three_prime(), rightmost);
        }
        prop_assert_eq!(read.positions().len() as u64, matched);
    });
}
