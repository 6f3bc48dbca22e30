use crate::thresholds::ThresholdTable;

/// Outcome of searching for the overlap offset between two sequences.
///
/// `Ambiguous` means at least two offsets passed the acceptance thresholds.
/// It is a distinct variant so that callers can never mistake it for a
/// usable offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapResult {
    Found(usize),
    NoMatch,
    Ambiguous,
}

/// Find the offset at which `subject` best overlaps the leading portion of
/// `query`.
///
/// Candidate offsets are scanned from 0 (deepest overlap) towards shallower
/// ones. At each offset the suffix `subject[pos..]` is compared against
/// `query` position by position: a position is a match if the bases are
/// equal and both quality scores reach `qual_cutoff`, a mismatch if the
/// bases differ and both scores reach the cutoff, and is ignored otherwise.
/// The thresholds for the compared length decide acceptance.
///
/// With `check_unique` unset the first (deepest) accepted offset wins.
/// Otherwise the scan continues and a second acceptance yields
/// `Ambiguous`.
///
/// `qual_cutoff` is on the phred+33 scale, like all qualities in this crate.
#[allow(clippy::too_many_arguments)]
pub fn find_overlap(
    subject_seq: &[u8],
    subject_qual: &[u8],
    query_seq: &[u8],
    query_qual: &[u8],
    min_overlap: usize,
    table: &ThresholdTable,
    check_unique: bool,
    qual_cutoff: u8,
) -> OverlapResult {
    debug_assert_eq!(subject_seq.len(), subject_qual.len());
    debug_assert_eq!(query_seq.len(), query_qual.len());

    let subject_len = subject_seq.len();
    if query_seq.is_empty() || subject_len == 0 || min_overlap > subject_len {
        return OverlapResult::NoMatch;
    }
    // An empty suffix would trivially satisfy the zero-length thresholds.
    let min_overlap = min_overlap.max(1);

    let mut best = None;
    for pos in 0..=subject_len - min_overlap {
        let cmp_len = (subject_len - pos).min(query_seq.len());
        let accepted = accept(
            &subject_seq[pos..],
            &subject_qual[pos..],
            query_seq,
            query_qual,
            table.min_match(cmp_len),
            table.max_mismatch(cmp_len),
            qual_cutoff,
        );
        if accepted {
            if !check_unique {
                return OverlapResult::Found(pos);
            }
            if best.is_some() {
                return OverlapResult::Ambiguous;
            }
            best = Some(pos);
        }
    }
    match best {
        Some(pos) => OverlapResult::Found(pos),
        None => OverlapResult::NoMatch,
    }
}

/// Compare two sequences up to the end of the shorter one and decide
/// whether they pass the given thresholds. Aborts early once the mismatch
/// budget is exhausted.
fn accept(
    s1: &[u8],
    q1: &[u8],
    s2: &[u8],
    q2: &[u8],
    min_match: u16,
    max_mismatch: u16,
    qual_cutoff: u8,
) -> bool {
    let mut matches = 0u32;
    let mut mismatches = 0u32;
    for i in 0..s1.len().min(s2.len()) {
        if q1[i] < qual_cutoff || q2[i] < qual_cutoff {
            continue;
        }
        if s1[i] == s2[i] {
            matches += 1;
        } else {
            mismatches += 1;
            if mismatches > max_mismatch as u32 {
                return false;
            }
        }
    }
    matches >= min_match as u32
}
