use std::io::{self, Write};

use crate::aligner::AlignmentInfo;
use crate::merge::MergedRead;
use crate::pair::ReadPair;

/// Writes human-readable renderings of overlaps and adapter alignments,
/// capped at a fixed number of records so that a large run cannot fill
/// the disk with diagnostics.
pub struct DiagnosticsWriter<W: Write> {
    out: W,
    remaining: usize,
}

impl<W: Write> DiagnosticsWriter<W> {
    pub fn new(out: W, max_records: usize) -> Self {
        DiagnosticsWriter {
            out,
            remaining: max_records,
        }
    }

    fn take_slot(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    /// Render a read-vs-read overlap at the given offset: the forward
    /// read on top, markers for the compared region, the
    /// reverse-complemented reverse read below, and the merged sequence
    /// when one was produced.
    pub fn write_overlap(
        &mut self,
        pair: &ReadPair,
        offset: usize,
        qual_cutoff: u8,
        merged: Option<&MergedRead>,
    ) -> io::Result<()> {
        if !self.take_slot() {
            return Ok(());
        }
        let subject = &pair.forward;
        writeln!(self.out, "ID:\t{}", subject.name)?;
        writeln!(self.out, "SUBJ:\t{}", String::from_utf8_lossy(&subject.seq))?;

        let mut markers = String::new();
        for _ in 0..offset {
            markers.push(' ');
        }
        let cmp_len = (subject.len() - offset.min(subject.len())).min(pair.rc_seq.len());
        for k in 0..cmp_len {
            let good = subject.qual[offset + k] >= qual_cutoff && pair.rc_qual[k] >= qual_cutoff;
            let ch = if !good {
                ' '
            } else if subject.seq[offset + k] == pair.rc_seq[k] {
                '|'
            } else {
                '*'
            };
            markers.push(ch);
        }
        writeln!(self.out, "\t{markers}")?;

        let indent = " ".repeat(offset);
        writeln!(
            self.out,
            "QUER:\t{indent}{}",
            String::from_utf8_lossy(&pair.rc_seq)
        )?;
        if let Some(merged) = merged {
            writeln!(self.out, "MERG:\t{}", String::from_utf8_lossy(&merged.seq))?;
        }
        writeln!(self.out)
    }

    /// Render an adapter alignment as reported by the aligner.
    pub fn write_alignment(
        &mut self,
        name: &str,
        info: &AlignmentInfo,
        refseq: &[u8],
        query: &[u8],
    ) -> io::Result<()> {
        if !self.take_slot() {
            return Ok(());
        }
        let (top, mid, bottom) = info.rendered(refseq, query);
        writeln!(self.out, "ID:\t{name}")?;
        writeln!(
            self.out,
            "SCORE:\t{}\tSUB:\t{}\tREF:\t{}..{}",
            info.score, info.sub_score, info.ref_start, info.ref_end
        )?;
        writeln!(self.out, "READ:\t{top}")?;
        writeln!(self.out, "\t{mid}")?;
        writeln!(self.out, "ADPT:\t{bottom}")?;
        writeln!(self.out)
    }
}
