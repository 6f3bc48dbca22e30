use std::io::{self, BufRead, Write};

use log::{info, warn};

use crate::adapter::AdapterDetector;
use crate::diagnostics::DiagnosticsWriter;
use crate::io::pairs::{FastqWriter, PairError, PairedFastqReader};
use crate::merge::{MergedRead, ReadMerger};
use crate::pair::ReadPair;

/// Terminal state of one processed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    Merged,
    TrimmedUnmerged,
    PassThrough,
    Discarded,
}

#[derive(Debug, Default)]
pub struct RunStatistics {
    pub pairs_processed: u64,
    pub pairs_merged: u64,
    pub pairs_with_adapter: u64,
    pub pairs_discarded: u64,
}

impl RunStatistics {
    fn record(&mut self, outcome: PairOutcome, adapter_found: bool) {
        self.pairs_processed += 1;
        if adapter_found {
            self.pairs_with_adapter += 1;
        }
        match outcome {
            PairOutcome::Merged => self.pairs_merged += 1,
            PairOutcome::Discarded => self.pairs_discarded += 1,
            PairOutcome::TrimmedUnmerged | PairOutcome::PassThrough => {}
        }
    }

    pub fn log_summary(&self) {
        info!("Pairs processed:    {}", self.pairs_processed);
        info!("Pairs with adapter: {}", self.pairs_with_adapter);
        info!("Pairs merged:       {}", self.pairs_merged);
        info!("Pairs discarded:    {}", self.pairs_discarded);
    }
}

/// Merging is optional; when requested it comes with its own output file.
pub struct MergeSink<W: Write> {
    pub merger: ReadMerger,
    pub out: FastqWriter<W>,
}

/// Drives one pass over a pair of FASTQ streams: adapter detection and
/// trimming, optional merging, length filtering, and output routing.
///
/// The pipeline owns one `ReadPair` and one `MergedRead` slot; no per-pair
/// allocation happens in the steady state.
pub struct PairPipeline<W: Write> {
    detector: AdapterDetector,
    merge: Option<MergeSink<W>>,
    min_length: usize,
    qual_cutoff: u8,
    out1: FastqWriter<W>,
    out2: FastqWriter<W>,
    diagnostics: Option<DiagnosticsWriter<W>>,
    stats: RunStatistics,
    pair: ReadPair,
    merged: MergedRead,
}

impl<W: Write> PairPipeline<W> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        detector: AdapterDetector,
        merge: Option<MergeSink<W>>,
        min_length: usize,
        qual_cutoff: u8,
        out1: FastqWriter<W>,
        out2: FastqWriter<W>,
        diagnostics: Option<DiagnosticsWriter<W>>,
    ) -> Self {
        PairPipeline {
            detector,
            merge,
            min_length,
            qual_cutoff,
            out1,
            out2,
            diagnostics,
            stats: RunStatistics::default(),
            pair: ReadPair::new(),
            merged: MergedRead::new(),
        }
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.stats
    }

    /// Process every pair the reader yields. Desynchronized pairs are
    /// skipped with a warning; a malformed record ends the run cleanly
    /// after whatever was already written.
    pub fn run<B: BufRead>(&mut self, reader: PairedFastqReader<B>) -> io::Result<()> {
        for item in reader {
            match item {
                Ok((r1, r2)) => {
                    self.pair.fill(&r1, &r2);
                    self.process_pair()?;
                }
                Err(PairError::Desync(fname, rname)) => {
                    warn!("skipping desynchronized pair: '{fname}' vs '{rname}'");
                }
                Err(PairError::Sequence(e)) => {
                    warn!("stopping: {e}");
                    break;
                }
            }
        }
        self.stats.log_summary();
        Ok(())
    }

    fn process_pair(&mut self) -> io::Result<PairOutcome> {
        let adapter_found = self
            .detector
            .detect_and_trim(&mut self.pair, self.diagnostics.as_mut())?;
        let outcome = if adapter_found {
            if self.pair.forward.len() < self.min_length
                || self.pair.reverse.len() < self.min_length
            {
                PairOutcome::Discarded
            } else if let Some(merge) = &mut self.merge {
                merge.merger.forced_merge(&self.pair, &mut self.merged);
                merge
                    .out
                    .write(&self.pair.forward.name, &self.merged.seq, &self.merged.qual)?;
                if let Some(diag) = &mut self.diagnostics {
                    diag.write_overlap(
                        &self.pair,
                        self.merged.offset,
                        self.qual_cutoff,
                        Some(&self.merged),
                    )?;
                }
                PairOutcome::Merged
            } else {
                self.write_pair()?;
                PairOutcome::TrimmedUnmerged
            }
        } else if let Some(merge) = &mut self.merge {
            if merge.merger.free_merge(&self.pair, &mut self.merged) {
                merge
                    .out
                    .write(&self.pair.forward.name, &self.merged.seq, &self.merged.qual)?;
                if let Some(diag) = &mut self.diagnostics {
                    diag.write_overlap(
                        &self.pair,
                        self.merged.offset,
                        self.qual_cutoff,
                        Some(&self.merged),
                    )?;
                }
                PairOutcome::Merged
            } else {
                self.write_pair()?;
                PairOutcome::PassThrough
            }
        } else {
            self.write_pair()?;
            PairOutcome::PassThrough
        };
        self.stats.record(outcome, adapter_found);
        Ok(outcome)
    }

    fn write_pair(&mut self) -> io::Result<()> {
        self.out1.write(
            &self.pair.forward.name,
            &self.pair.forward.seq,
            &self.pair.forward.qual,
        )?;
        self.out2.write(
            &self.pair.reverse.name,
            &self.pair.reverse.seq,
            &self.pair.reverse.qual,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::fastq::FastqReader;
    use crate::revcomp::reverse_complement;
    use crate::thresholds::ThresholdTable;

    use std::io::Cursor;

    const FORWARD_PRIMER: &[u8] = b"AGATCGGAAGAGCGGTTCAG";
    const REVERSE_PRIMER: &[u8] = b"AGATCGGAAGAGCGTCGTGT";
    const CUTOFF: u8 = 33 + 20;
    const INSERT: &[u8] = b"ACCTGAGATTCACCGGTGCATTGCAATGCACCGGTGA";

    fn detector() -> AdapterDetector {
        AdapterDetector::new(
            FORWARD_PRIMER,
            REVERSE_PRIMER,
            ThresholdTable::new(0.5, 0.1, 64).unwrap(),
            ThresholdTable::new(0.5, 0.1, 64).unwrap(),
            10,
            CUTOFF,
            None,
        )
    }

    fn merge_sink(out: &mut Vec<u8>) -> MergeSink<&mut Vec<u8>> {
        MergeSink {
            merger: ReadMerger::new(ThresholdTable::new(0.5, 0.1, 64).unwrap(), 10, CUTOFF, false),
            out: FastqWriter::new(out),
        }
    }

    fn fastq(name: &str, seq: &[u8]) -> String {
        format!(
            "@{}\n{}\n+\n{}\n",
            name,
            String::from_utf8_lossy(seq),
            "I".repeat(seq.len())
        )
    }

    fn run_pipeline(
        r1: &str,
        r2: &str,
        merge: bool,
        min_length: usize,
    ) -> (String, String, String, RunStatistics) {
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        let mut bufm = Vec::new();
        let stats = {
            let merge = merge.then(|| merge_sink(&mut bufm));
            let mut pipeline = PairPipeline::new(
                detector(),
                merge,
                min_length,
                CUTOFF,
                FastqWriter::new(&mut buf1),
                FastqWriter::new(&mut buf2),
                None,
            );
            let reader = PairedFastqReader::new(
                FastqReader::new(Cursor::new(r1.as_bytes().to_vec())),
                FastqReader::new(Cursor::new(r2.as_bytes().to_vec())),
            );
            pipeline.run(reader).unwrap();
            std::mem::take(&mut pipeline.stats)
        };
        (
            String::from_utf8(buf1).unwrap(),
            String::from_utf8(buf2).unwrap(),
            String::from_utf8(bufm).unwrap(),
            stats,
        )
    }

    #[test]
    fn test_clean_pair_passes_through() {
        let forward = &INSERT[..30];
        let reverse = reverse_complement(&INSERT[7..37]);
        let r1 = fastq("a/1", forward);
        let r2 = fastq("a/2", &reverse);
        let (out1, out2, _, stats) = run_pipeline(&r1, &r2, false, 10);
        assert_eq!(out1, r1);
        assert_eq!(out2, r2);
        assert_eq!(stats.pairs_processed, 1);
        assert_eq!(stats.pairs_with_adapter, 0);
    }

    #[test]
    fn test_adapter_pair_is_trimmed() {
        let mut forward = INSERT[..15].to_vec();
        forward.extend_from_slice(&FORWARD_PRIMER[..15]);
        let reverse = reverse_complement(&INSERT[..30]);
        let r1 = fastq("a/1", &forward);
        let r2 = fastq("a/2", &reverse);
        let (out1, out2, _, stats) = run_pipeline(&r1, &r2, false, 10);
        assert!(out1.contains(&format!("\n{}\n", String::from_utf8_lossy(&INSERT[..15]))));
        assert!(!out2.is_empty());
        assert_eq!(stats.pairs_with_adapter, 1);
    }

    #[test]
    fn test_short_trimmed_pair_is_discarded() {
        let mut forward = INSERT[..15].to_vec();
        forward.extend_from_slice(&FORWARD_PRIMER[..15]);
        let reverse = reverse_complement(&INSERT[..30]);
        let r1 = fastq("a/1", &forward);
        let r2 = fastq("a/2", &reverse);
        let (out1, out2, _, stats) = run_pipeline(&r1, &r2, false, 30);
        assert!(out1.is_empty());
        assert!(out2.is_empty());
        assert_eq!(stats.pairs_discarded, 1);
    }

    #[test]
    fn test_overlapping_pair_is_merged() {
        let forward = &INSERT[..20];
        let reverse = reverse_complement(forward);
        let r1 = fastq("a/1", forward);
        let r2 = fastq("a/2", &reverse);
        let (out1, out2, merged, stats) = run_pipeline(&r1, &r2, true, 10);
        assert!(out1.is_empty());
        assert!(out2.is_empty());
        assert!(merged.starts_with("@a/1\n"));
        assert!(merged.contains(&format!("\n{}\n", String::from_utf8_lossy(forward))));
        assert_eq!(stats.pairs_merged, 1);
    }

    #[test]
    fn test_desynchronized_pair_is_skipped() {
        let r1 = fastq("a/1", &INSERT[..30]) + &fastq("c/1", &INSERT[..30]);
        let r2 = fastq("b/2", &reverse_complement(&INSERT[7..37]))
            + &fastq("c/2", &reverse_complement(&INSERT[7..37]));
        let (out1, _, _, stats) = run_pipeline(&r1, &r2, false, 10);
        assert_eq!(stats.pairs_processed, 1);
        assert!(out1.starts_with("@c/1\n"));
    }
}
