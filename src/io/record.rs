use std::fmt;

/// One FASTQ record with its name, base calls and phred+33 quality scores.
///
/// `sequence` and `qualities` always have equal length; the reader enforces
/// this before a record is handed out.
#[derive(Debug, Clone, Default)]
pub struct SequenceRecord {
    pub name: String,
    pub comment: Option<String>,
    pub sequence: Vec<u8>,
    pub qualities: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(name: String, comment: Option<String>, sequence: Vec<u8>, qualities: Vec<u8>) -> Self {
        SequenceRecord {
            name,
            comment,
            sequence,
            qualities,
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

impl fmt::Display for SequenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "name={}, length={}, sequence={}, qualities={}",
            self.name,
            self.len(),
            String::from_utf8_lossy(&self.sequence),
            String::from_utf8_lossy(&self.qualities),
        )
    }
}
