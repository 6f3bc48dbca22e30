use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::io::fastq::FastqReader;
use crate::io::record::SequenceRecord;
use crate::io::SequenceIOError;

#[derive(Error, Debug)]
pub enum PairError {
    /// The two input streams are out of step. Recoverable: the pair is
    /// skipped and reading continues.
    #[error("mate IDs do not match: '{0}' vs '{1}'")]
    Desync(String, String),

    #[error(transparent)]
    Sequence(#[from] SequenceIOError),
}

/// Do two mate names belong to the same fragment?
///
/// Names either match exactly or differ only in a fixed two-character
/// suffix such as `/1` and `/2`.
pub fn mates_match(fname: &str, rname: &str) -> bool {
    if fname == rname {
        return true;
    }
    let f = fname.as_bytes();
    let r = rname.as_bytes();
    if f.len() != r.len() || f.len() < 2 {
        return false;
    }
    f[..f.len() - 2] == r[..r.len() - 2]
}

/// Reads two synchronized FASTQ streams and yields one record pair at a
/// time. Iteration ends on end-of-stream of either side.
pub struct PairedFastqReader<B: BufRead> {
    reader1: FastqReader<B>,
    reader2: FastqReader<B>,
}

impl<B: BufRead> PairedFastqReader<B> {
    pub fn new(reader1: FastqReader<B>, reader2: FastqReader<B>) -> Self {
        PairedFastqReader { reader1, reader2 }
    }
}

impl<B: BufRead> Iterator for PairedFastqReader<B> {
    type Item = Result<(SequenceRecord, SequenceRecord), PairError>;

    fn next(&mut self) -> Option<Self::Item> {
        let r1 = match self.reader1.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        let r2 = match self.reader2.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        if !mates_match(&r1.name, &r2.name) {
            return Some(Err(PairError::Desync(r1.name, r2.name)));
        }
        Some(Ok((r1, r2)))
    }
}

/// FASTQ record writer over any byte sink (plain or gzip).
pub struct FastqWriter<W: Write> {
    writer: W,
}

impl<W: Write> FastqWriter<W> {
    pub fn new(writer: W) -> Self {
        FastqWriter { writer }
    }

    pub fn write(&mut self, name: &str, sequence: &[u8], qualities: &[u8]) -> io::Result<()> {
        debug_assert_eq!(sequence.len(), qualities.len());
        writeln!(self.writer, "@{}", name)?;
        self.writer.write_all(sequence)?;
        self.writer.write_all(b"\n+\n")?;
        self.writer.write_all(qualities)?;
        self.writer.write_all(b"\n")
    }
}
