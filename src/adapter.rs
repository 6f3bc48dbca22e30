use std::io::{self, Write};

use crate::aligner::{Aligner, AlignmentInfo, Mode};
use crate::diagnostics::DiagnosticsWriter;
use crate::matcher::{find_overlap, OverlapResult};
use crate::pair::{Read, ReadPair};
use crate::thresholds::ThresholdTable;
use crate::MAX_QUAL;

/// Alignment-assisted detection, enabled on request.
pub struct AlignedDetection {
    pub aligner: Aligner,
    pub score_threshold: i32,
}

/// Finds adapter contamination in a read pair and trims it in place.
///
/// Three signals are reconciled: a direct match of the literal primer
/// against each read, a read-vs-read overlap deeper than the insert, and
/// (optionally) a local alignment of the primer against each read. When
/// several signals report a trim position for a mate, the smallest wins.
pub struct AdapterDetector {
    forward_primer: Vec<u8>,
    reverse_primer: Vec<u8>,
    /// Dummy qualities so primers pass any quality cutoff in the matcher.
    forward_primer_qual: Vec<u8>,
    reverse_primer_qual: Vec<u8>,
    adapter_table: ThresholdTable,
    read_table: ThresholdTable,
    min_overlap: usize,
    qual_cutoff: u8,
    aligned: Option<AlignedDetection>,
}

impl AdapterDetector {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        forward_primer: &[u8],
        reverse_primer: &[u8],
        adapter_table: ThresholdTable,
        read_table: ThresholdTable,
        min_overlap: usize,
        qual_cutoff: u8,
        aligned: Option<AlignedDetection>,
    ) -> Self {
        AdapterDetector {
            forward_primer: forward_primer.to_vec(),
            reverse_primer: reverse_primer.to_vec(),
            forward_primer_qual: vec![MAX_QUAL; forward_primer.len()],
            reverse_primer_qual: vec![MAX_QUAL; reverse_primer.len()],
            adapter_table,
            read_table,
            min_overlap,
            qual_cutoff,
            aligned,
        }
    }

    fn has_primers(&self) -> bool {
        !self.forward_primer.is_empty() && !self.reverse_primer.is_empty()
    }

    /// Detect adapter in either mate and trim both reads in place.
    /// Returns whether adapter was found. The caller decides whether the
    /// trimmed lengths are still worth keeping.
    ///
    /// When a diagnostics writer is given, any adapter alignment the
    /// aligner reported is rendered into it before the trim.
    pub fn detect_and_trim<W: Write>(
        &self,
        pair: &mut ReadPair,
        mut diagnostics: Option<&mut DiagnosticsWriter<W>>,
    ) -> io::Result<bool> {
        if self.has_primers() {
            if self.primer_leads_read(pair) {
                // Adapter at the very first base: nothing of the insert
                // was sequenced.
                pair.clear();
                return Ok(true);
            }

            let (ftrim, falign) = self.trim_candidate(
                &pair.forward,
                &self.forward_primer,
                &self.forward_primer_qual,
            );
            let (rtrim, ralign) = self.trim_candidate(
                &pair.reverse,
                &self.reverse_primer,
                &self.reverse_primer_qual,
            );
            if let Some(diag) = diagnostics.as_deref_mut() {
                if let Some(info) = &falign {
                    diag.write_alignment(
                        &pair.forward.name,
                        info,
                        &pair.forward.seq,
                        &self.forward_primer,
                    )?;
                }
                if let Some(info) = &ralign {
                    diag.write_alignment(
                        &pair.reverse.name,
                        info,
                        &pair.reverse.seq,
                        &self.reverse_primer,
                    )?;
                }
            }
            match (ftrim, rtrim) {
                (Some(f), Some(r)) => {
                    pair.truncate(f, r);
                    return Ok(true);
                }
                (Some(f), None) => {
                    pair.truncate(f, f.min(pair.reverse.len()));
                    return Ok(true);
                }
                (None, Some(r)) => {
                    pair.truncate(r.min(pair.forward.len()), r);
                    return Ok(true);
                }
                (None, None) => {}
            }
        }

        Ok(self.read_overlap_trim(pair))
    }

    /// Does a primer match the head of its read (insert size ~ 0)?
    /// The primer is the subject here, so the accepted overlap may start
    /// before the read's first base.
    fn primer_leads_read(&self, pair: &ReadPair) -> bool {
        for (primer, qual, read) in [
            (
                &self.forward_primer,
                &self.forward_primer_qual,
                &pair.forward,
            ),
            (
                &self.reverse_primer,
                &self.reverse_primer_qual,
                &pair.reverse,
            ),
        ] {
            let min_overlap = primer.len().min(read.len()).saturating_sub(5).max(1);
            let result = find_overlap(
                primer,
                qual,
                &read.seq,
                &read.qual,
                min_overlap,
                &self.adapter_table,
                false,
                self.qual_cutoff,
            );
            if matches!(result, OverlapResult::Found(_)) {
                return true;
            }
        }
        false
    }

    /// Smallest trim position reported for one mate by the direct primer
    /// match and, when enabled, the alignment signal. The alignment that
    /// fired, if any, is returned alongside for diagnostics.
    fn trim_candidate(
        &self,
        read: &Read,
        primer: &[u8],
        primer_qual: &[u8],
    ) -> (Option<usize>, Option<AlignmentInfo>) {
        let direct = match find_overlap(
            &read.seq,
            &read.qual,
            primer,
            primer_qual,
            self.min_overlap,
            &self.adapter_table,
            false,
            self.qual_cutoff,
        ) {
            OverlapResult::Found(pos) => Some(pos),
            _ => None,
        };
        let aligned = self.alignment_candidate(read, primer);
        let trim = match (direct, &aligned) {
            (Some(d), Some((a, _))) => Some(d.min(*a)),
            (Some(d), None) => Some(d),
            (None, Some((a, _))) => Some(*a),
            (None, None) => None,
        };
        (trim, aligned.map(|(_, info)| info))
    }

    /// Trim position derived from a local alignment of the primer against
    /// the read. The alignment start coordinates are converted to read
    /// space assuming no gaps between the read start and the alignment.
    fn alignment_candidate(&self, read: &Read, primer: &[u8]) -> Option<(usize, AlignmentInfo)> {
        let detection = self.aligned.as_ref()?;
        let info = detection.aligner.align(&read.seq, primer, Mode::Local)?;
        if info.score < detection.score_threshold {
            return None;
        }
        Some((info.ref_start.saturating_sub(info.query_start), info))
    }

    /// Adapter read-through detected from the mates alone: if the
    /// reverse-complemented reverse read overlaps the forward read deeper
    /// than either read is long, both 3' ends ran into adapter. The shift
    /// of the overlap gives the insert length.
    fn read_overlap_trim(&self, pair: &mut ReadPair) -> bool {
        let flen = pair.forward.len();
        let rlen = pair.reverse.len();
        if flen.min(rlen) <= self.min_overlap {
            return false;
        }
        let min_overlap = flen.min(rlen) - self.min_overlap;
        // check_unique: an ambiguous overlap must never trigger a trim
        let result = find_overlap(
            &pair.rc_seq,
            &pair.rc_qual,
            &pair.forward.seq,
            &pair.forward.qual,
            min_overlap,
            &self.read_table,
            true,
            self.qual_cutoff,
        );
        match result {
            OverlapResult::Found(0) | OverlapResult::NoMatch | OverlapResult::Ambiguous => false,
            OverlapResult::Found(shift) => {
                let insert = rlen - shift;
                let keep = insert.min(flen);
                pair.forward.truncate(keep);
                // The insert occupies rc[shift..shift+keep], which is
                // reverse[insert-keep..insert] in read coordinates.
                pair.reverse.keep_range(insert - keep, insert);
                pair.update_rc();
                true
            }
        }
    }
}
