use std::io::BufRead;

use crate::io::record::SequenceRecord;
use crate::io::split_header;
use crate::io::SequenceIOError;

/// Iterator over the records of one FASTQ stream.
///
/// Bases are uppercased and `.` is mapped to `N`. Qualities leave this
/// boundary on the phred+33 scale: with `phred64` set, scores are rescaled
/// by subtracting 31, except for the Illumina `B` read-segment sentinel
/// which becomes `!` (phred 0).
#[derive(Debug)]
pub struct FastqReader<B: BufRead> {
    reader: B,
    phred64: bool,
    err: bool,
}

impl<B: BufRead> FastqReader<B> {
    pub fn new(reader: B) -> FastqReader<B> {
        FastqReader {
            reader,
            phred64: false,
            err: false,
        }
    }

    pub fn phred64(reader: B) -> FastqReader<B> {
        FastqReader {
            reader,
            phred64: true,
            err: false,
        }
    }
}

fn normalize_base(c: u8) -> u8 {
    match c.to_ascii_uppercase() {
        b'.' => b'N',
        b => b,
    }
}

impl<B: BufRead> Iterator for FastqReader<B> {
    type Item = Result<SequenceRecord, SequenceIOError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.err {
            return None;
        }
        let mut name = String::new();
        match self.reader.read_line(&mut name) {
            Ok(0) => {
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                self.err = true;
                return Some(Err(SequenceIOError::IO(e)));
            }
        }
        if !name.starts_with('@') {
            let start = name.bytes().next().unwrap() as char;
            let msg = format!("Record must start with '@', but found '{}'.", start);
            self.err = true;
            return Some(Err(SequenceIOError::Fastq(msg)));
        }
        let name = name[1..].trim_end();
        let (name, comment) = split_header(name);

        if name.is_empty() {
            self.err = true;
            return Some(Err(SequenceIOError::Fastq(
                "Record identifier is empty".to_string(),
            )));
        }

        let mut sequence = Vec::new();
        if let Err(e) = self.reader.read_until(b'\n', &mut sequence) {
            self.err = true;
            return Some(Err(SequenceIOError::IO(e)));
        }
        while sequence.last().is_some_and(|&c| c == b'\n' || c == b'\r') {
            sequence.pop();
        }

        let mut name2 = String::new();
        match self.reader.read_line(&mut name2) {
            Ok(_) if name2.starts_with('+') => {}
            Ok(_) => {
                self.err = true;
                return Some(Err(SequenceIOError::Fastq(format!(
                    "Record '{}' has no '+' separator line",
                    name
                ))));
            }
            Err(e) => {
                self.err = true;
                return Some(Err(SequenceIOError::IO(e)));
            }
        }

        let mut qualities = Vec::new();
        if let Err(e) = self.reader.read_until(b'\n', &mut qualities) {
            self.err = true;
            return Some(Err(SequenceIOError::IO(e)));
        }
        while qualities.last().is_some_and(|&c| c == b'\n' || c == b'\r') {
            qualities.pop();
        }
        if sequence.len() != qualities.len() {
            let msg = format!(
                "Found {} nucleotides but {} quality values in record '{}'",
                sequence.len(),
                qualities.len(),
                name
            );
            self.err = true;
            return Some(Err(SequenceIOError::Fastq(msg)));
        }

        for c in &mut sequence {
            *c = normalize_base(*c);
        }
        if self.phred64 {
            for q in &mut qualities {
                *q = if *q == b'B' { b'!' } else { *q - 31 };
            }
        }

        Some(Ok(SequenceRecord {
            name,
            comment,
            sequence,
            qualities,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{FastqReader, SequenceIOError, SequenceRecord};

    use std::io::Cursor;

    #[test]
    fn test_two_records() {
        let f = Cursor::new(b"@a\nacg.\n+\nIIII\n@b xyz\nTT\n+\n#J\n");
        let records = FastqReader::new(f)
            .collect::<Result<Vec<SequenceRecord>, SequenceIOError>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "a");
        assert_eq!(records[0].sequence, b"ACGN");
        assert_eq!(records[0].qualities, b"IIII");
        assert_eq!(records[1].name, "b");
        assert_eq!(records[1].comment.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_invalid_record_start() {
        let f = Cursor::new(b"@a\nA\n+\n#\n>b");
        let reader = FastqReader::new(f);
        let result = reader.collect::<Result<Vec<SequenceRecord>, SequenceIOError>>();

        assert!(matches!(result, Err(SequenceIOError::Fastq(_))));
    }

    #[test]
    fn test_too_few_quality_values() {
        let f = Cursor::new(b"@a\nACGT\n+\n##\n");
        let reader = FastqReader::new(f);
        let result = reader.collect::<Result<Vec<SequenceRecord>, SequenceIOError>>();

        assert!(matches!(result, Err(SequenceIOError::Fastq(_))));
    }

    #[test]
    fn test_phred64_rescaling() {
        // 'h' (104) is phred 40 on the +64 scale, 'I' (73) on +33.
        // 'B' is the Illumina bad-segment sentinel and becomes '!'.
        let f = Cursor::new(b"@a\nACG\n+\nhhB\n");
        let records = FastqReader::phred64(f)
            .collect::<Result<Vec<SequenceRecord>, SequenceIOError>>()
            .unwrap();

        assert_eq!(records[0].qualities, b"II!");
    }
}
