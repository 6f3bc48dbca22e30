use crate::io::record::SequenceRecord;
use crate::revcomp::{reverse_complement_into, reverse_into};

/// One read with its base calls and phred+33 quality scores.
///
/// `seq.len()` is the authoritative length and always equals `qual.len()`.
#[derive(Debug, Default, Clone)]
pub struct Read {
    pub name: String,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

impl Read {
    pub fn new(name: &str, seq: &[u8], qual: &[u8]) -> Self {
        assert_eq!(seq.len(), qual.len());
        Read {
            name: name.to_string(),
            seq: seq.to_vec(),
            qual: qual.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.seq.truncate(len);
        self.qual.truncate(len);
    }

    /// Keep only `self[start..end]`.
    pub fn keep_range(&mut self, start: usize, end: usize) {
        self.seq.truncate(end);
        self.qual.truncate(end);
        self.seq.drain(..start);
        self.qual.drain(..start);
    }

    fn fill(&mut self, record: &SequenceRecord) {
        self.name.clear();
        self.name.push_str(&record.name);
        self.seq.clear();
        self.seq.extend_from_slice(&record.sequence);
        self.qual.clear();
        self.qual.extend_from_slice(&record.qualities);
    }
}

/// A mate pair together with the reverse-complemented view of its reverse
/// read.
///
/// All buffers are owned by the pair and reused across iterations; the
/// pipeline holds a single `ReadPair` slot. `rc_seq`/`rc_qual` must be
/// recomputed via [`ReadPair::update_rc`] whenever `reverse` changes;
/// every mutating method here does so itself.
#[derive(Debug, Default, Clone)]
pub struct ReadPair {
    pub forward: Read,
    pub reverse: Read,
    pub rc_seq: Vec<u8>,
    pub rc_qual: Vec<u8>,
}

impl ReadPair {
    pub fn new() -> Self {
        ReadPair::default()
    }

    /// Load the next record pair into this slot, reusing all buffers.
    pub fn fill(&mut self, forward: &SequenceRecord, reverse: &SequenceRecord) {
        self.forward.fill(forward);
        self.reverse.fill(reverse);
        self.update_rc();
    }

    pub fn update_rc(&mut self) {
        reverse_complement_into(&self.reverse.seq, &mut self.rc_seq);
        reverse_into(&self.reverse.qual, &mut self.rc_qual);
    }

    /// Trim both mates to the given lengths (3' end trim).
    pub fn truncate(&mut self, forward_len: usize, reverse_len: usize) {
        self.forward.truncate(forward_len);
        self.reverse.truncate(reverse_len);
        self.update_rc();
    }

    /// Empty both mates (adapter found at or before the first base).
    pub fn clear(&mut self) {
        self.truncate(0, 0);
    }
}
