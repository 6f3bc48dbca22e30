use crate::matcher::{find_overlap, OverlapResult};
use crate::pair::ReadPair;
use crate::thresholds::ThresholdTable;
use crate::MAX_QUAL;

/// A merged read assembled from both mates of a pair.
///
/// The buffers are reused across pairs; the pipeline owns a single slot.
#[derive(Debug, Default)]
pub struct MergedRead {
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
    /// Offset of the second sequence within the first at which the two
    /// were combined.
    pub offset: usize,
}

impl MergedRead {
    pub fn new() -> Self {
        MergedRead::default()
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    fn clear(&mut self) {
        self.seq.clear();
        self.qual.clear();
        self.offset = 0;
    }
}

/// Combined quality of two agreeing base calls, capped at [`MAX_QUAL`].
fn match_quality(qa: u8, qb: u8) -> u8 {
    let combined = qa as u16 + qb as u16 - 33;
    (combined.min(MAX_QUAL as u16)) as u8
}

/// Quality of the winning base call at a disagreeing position. The loser's
/// score is subtracted, so a close call comes out barely above zero.
fn mismatch_quality(hi: u8, lo: u8) -> u8 {
    hi - (lo - 33)
}

/// Consensus base and quality for one overlap position. The first call
/// wins quality ties.
fn consensus(base_a: u8, qual_a: u8, base_b: u8, qual_b: u8) -> (u8, u8) {
    if base_a == base_b {
        (base_a, match_quality(qual_a, qual_b))
    } else if qual_b > qual_a {
        (base_b, mismatch_quality(qual_b, qual_a))
    } else {
        (base_a, mismatch_quality(qual_a, qual_b))
    }
}

fn count_matches(s1: &[u8], s2: &[u8]) -> usize {
    s1.iter().zip(s2).filter(|(a, b)| a == b).count()
}

/// Combines the two mates of a pair into a single read.
///
/// Two entry points: [`ReadMerger::free_merge`] searches for a sufficient
/// overlap and only merges when it finds an unambiguous one, while
/// [`ReadMerger::forced_merge`] is used after adapter read-through was
/// already established and always produces a merged read.
pub struct ReadMerger {
    read_table: ThresholdTable,
    min_overlap: usize,
    qual_cutoff: u8,
    retain_overhang: bool,
}

impl ReadMerger {
    pub fn new(
        read_table: ThresholdTable,
        min_overlap: usize,
        qual_cutoff: u8,
        retain_overhang: bool,
    ) -> Self {
        ReadMerger {
            read_table,
            min_overlap,
            qual_cutoff,
            retain_overhang,
        }
    }

    /// Merge the pair if the reverse-complemented reverse read overlaps
    /// the forward read unambiguously. Returns whether a merge happened;
    /// `out` is only valid when it did.
    pub fn free_merge(&self, pair: &ReadPair, out: &mut MergedRead) -> bool {
        let subject = &pair.forward;
        let result = find_overlap(
            &subject.seq,
            &subject.qual,
            &pair.rc_seq,
            &pair.rc_qual,
            self.min_overlap,
            &self.read_table,
            true,
            self.qual_cutoff,
        );
        let mpos = match result {
            OverlapResult::Found(pos) => pos,
            OverlapResult::NoMatch | OverlapResult::Ambiguous => return false,
        };

        let slen = subject.len();
        let qlen = pair.rc_seq.len();
        out.clear();
        out.offset = mpos;
        // Forward-only 5' region, then the overlap consensus, then
        // whichever read extends past the other.
        out.seq.extend_from_slice(&subject.seq[..mpos]);
        out.qual.extend_from_slice(&subject.qual[..mpos]);
        let end = slen.min(qlen + mpos);
        for k in mpos..end {
            let (base, qual) = consensus(
                subject.seq[k],
                subject.qual[k],
                pair.rc_seq[k - mpos],
                pair.rc_qual[k - mpos],
            );
            out.seq.push(base);
            out.qual.push(qual);
        }
        if slen >= qlen + mpos {
            out.seq.extend_from_slice(&subject.seq[end..]);
            out.qual.extend_from_slice(&subject.qual[end..]);
        } else {
            out.seq.extend_from_slice(&pair.rc_seq[end - mpos..]);
            out.qual.extend_from_slice(&pair.rc_qual[end - mpos..]);
        }
        true
    }

    /// Merge a pair whose reads were already trimmed to the insert. No
    /// thresholds apply here; the best offset of the shorter read within
    /// the longer is taken by raw match count, with ties going to offset
    /// zero.
    pub fn forced_merge(&self, pair: &ReadPair, out: &mut MergedRead) {
        let flen = pair.forward.len();
        let rlen = pair.rc_seq.len();
        let forward_is_subject = flen >= rlen;
        let (sseq, squal, qseq, qqual) = if forward_is_subject {
            (
                &pair.forward.seq[..],
                &pair.forward.qual[..],
                &pair.rc_seq[..],
                &pair.rc_qual[..],
            )
        } else {
            (
                &pair.rc_seq[..],
                &pair.rc_qual[..],
                &pair.forward.seq[..],
                &pair.forward.qual[..],
            )
        };

        let diff = sseq.len() - qseq.len();
        let mut offset = 0;
        let mut best = count_matches(sseq, qseq);
        for cand in 1..=diff {
            let count = count_matches(&sseq[cand..], qseq);
            if count > best {
                best = count;
                offset = cand;
            }
        }

        out.clear();
        out.offset = offset;
        if self.retain_overhang {
            out.seq.extend_from_slice(&sseq[..offset]);
            out.qual.extend_from_slice(&squal[..offset]);
        }
        for k in 0..qseq.len() {
            // The forward read wins quality ties regardless of which
            // mate is longer.
            let (base, qual) = if forward_is_subject {
                consensus(sseq[offset + k], squal[offset + k], qseq[k], qqual[k])
            } else {
                consensus(qseq[k], qqual[k], sseq[offset + k], squal[offset + k])
            };
            out.seq.push(base);
            out.qual.push(qual);
        }
        if self.retain_overhang {
            out.seq.extend_from_slice(&sseq[offset + qseq.len()..]);
            out.qual.extend_from_slice(&squal[offset + qseq.len()..]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::record::SequenceRecord;
    use crate::revcomp::reverse_complement;

    const CUTOFF: u8 = 33 + 20;
    const INSERT: &[u8] = b"ACCTGAGATTCACCGGTGCATTGCAATGCACCGGTGA";

    fn merger(retain_overhang: bool) -> ReadMerger {
        let table = ThresholdTable::new(0.5, 0.1, 64).unwrap();
        ReadMerger::new(table, 10, CUTOFF, retain_overhang)
    }

    fn pair_from(fseq: &[u8], rseq: &[u8]) -> ReadPair {
        let mut pair = ReadPair::new();
        pair.fill(
            &SequenceRecord::new("m/1".into(), None, fseq.to_vec(), vec![b'I'; fseq.len()]),
            &SequenceRecord::new("m/2".into(), None, rseq.to_vec(), vec![b'I'; rseq.len()]),
        );
        pair
    }

    #[test]
    fn test_match_quality_adds_scores() {
        // 'I' is phred 40; two agreeing 40s give 113 ('q').
        assert_eq!(match_quality(b'I', b'I'), b'q');
        assert_eq!(match_quality(b'~', b'~'), MAX_QUAL);
    }

    #[test]
    fn test_mismatch_quality_subtracts_loser() {
        // Winner 'I' (40) against loser '+' (10) comes out at 30 ('?').
        assert_eq!(mismatch_quality(b'I', b'+'), b'?');
        // A loser at the minimum score leaves the winner untouched.
        assert_eq!(mismatch_quality(b'I', b'!'), b'I');
    }

    #[test]
    fn test_consensus_prefers_higher_quality() {
        let (base, qual) = consensus(b'A', b'I', b'C', b'+');
        assert_eq!(base, b'A');
        assert!(qual < b'I');
        let (base, _) = consensus(b'A', b'+', b'C', b'I');
        assert_eq!(base, b'C');
    }

    #[test]
    fn test_consensus_tie_takes_first_call() {
        let (base, _) = consensus(b'A', b'I', b'C', b'I');
        assert_eq!(base, b'A');
    }

    #[test]
    fn test_free_merge_identical_reads() {
        // Both mates cover the same 20-base insert exactly.
        let forward = &INSERT[..20];
        let reverse = reverse_complement(forward);
        let pair = pair_from(forward, &reverse);
        let mut out = MergedRead::new();
        assert!(merger(false).free_merge(&pair, &mut out));
        assert_eq!(out.offset, 0);
        assert_eq!(out.seq, forward);
        // Every position agrees at phred 40, so the merged scores rise.
        assert!(out.qual.iter().all(|&q| q == b'q'));
    }

    #[test]
    fn test_free_merge_partial_overlap() {
        // 30-base insert read as two 20-base mates overlapping by 10.
        let forward = &INSERT[..20];
        let reverse = reverse_complement(&INSERT[10..30]);
        let pair = pair_from(forward, &reverse);
        let mut out = MergedRead::new();
        assert!(merger(false).free_merge(&pair, &mut out));
        assert_eq!(out.offset, 10);
        assert_eq!(out.seq, &INSERT[..30]);
        assert_eq!(out.len(), 30);
    }

    #[test]
    fn test_free_merge_rejects_unrelated_reads() {
        let forward = &INSERT[..20];
        let reverse = b"GGGGGGGGGGGGGGGGGGGG";
        let pair = pair_from(forward, reverse);
        let mut out = MergedRead::new();
        assert!(!merger(false).free_merge(&pair, &mut out));
    }

    #[test]
    fn test_free_merge_rejects_ambiguous_overlap() {
        // A tandem repeat matches its own reverse complement at several
        // offsets; an ambiguous overlap must never be merged.
        let repeat = b"ACGTACGTTT".repeat(3);
        let reverse = reverse_complement(&repeat);
        let pair = pair_from(&repeat, &reverse);
        let mut out = MergedRead::new();
        assert!(!merger(false).free_merge(&pair, &mut out));
    }

    #[test]
    fn test_forced_merge_equal_lengths() {
        let forward = &INSERT[..20];
        let reverse = reverse_complement(forward);
        let pair = pair_from(forward, &reverse);
        let mut out = MergedRead::new();
        merger(false).forced_merge(&pair, &mut out);
        assert_eq!(out.offset, 0);
        assert_eq!(out.seq, forward);
        assert!(out.qual.iter().all(|&q| q == b'q'));
    }

    #[test]
    fn test_forced_merge_places_shorter_read_at_best_offset() {
        // The forward read matches the reverse-complemented reverse read
        // starting two bases in.
        let forward = &INSERT[2..20];
        let reverse = reverse_complement(&INSERT[..20]);
        let pair = pair_from(forward, &reverse);

        let mut out = MergedRead::new();
        merger(true).forced_merge(&pair, &mut out);
        assert_eq!(out.offset, 2);
        assert_eq!(out.seq, &INSERT[..20]);

        merger(false).forced_merge(&pair, &mut out);
        assert_eq!(out.seq, &INSERT[2..20]);
    }

    #[test]
    fn test_forced_merge_tie_takes_offset_zero() {
        let forward = b"AAAAAAAA";
        let reverse = b"TTTTTTTTTT";
        let pair = pair_from(forward, reverse);
        let mut out = MergedRead::new();
        merger(true).forced_merge(&pair, &mut out);
        assert_eq!(out.offset, 0);
        assert_eq!(out.len(), 10);
    }
}
