/// Pairwise alignment collaborator.
///
/// The trimming core only consumes the score and start/end coordinates of
/// an alignment; the rendered form is used by the diagnostics writer.
/// Scores follow the usual convention that `match_` is a score and the
/// rest are penalties.
pub struct Scores {
    pub match_: u8,
    pub mismatch: u8,
    pub gap_open: u8,
    pub gap_extend: u8,
    /// Per-base penalty for gaps at the ends of a global alignment.
    pub gap_end: u8,
}

impl Default for Scores {
    fn default() -> Scores {
        Scores {
            match_: 2,
            mismatch: 4,
            gap_open: 6,
            gap_extend: 2,
            gap_end: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Local,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    /// Consume one base of both sequences (match or mismatch).
    Diag,
    /// Consume one reference base (gap in the query).
    Up,
    /// Consume one query base (gap in the reference).
    Left,
}

#[derive(Debug)]
pub struct AlignmentInfo {
    pub score: i32,
    /// Score of the best alignment ending well away from the optimal one;
    /// 0 if there is none.
    pub sub_score: i32,
    pub ref_start: usize,
    pub ref_end: usize,
    pub query_start: usize,
    pub query_end: usize,
    ops: Vec<Op>,
}

impl AlignmentInfo {
    /// Render the aligned region as three lines: reference, markers
    /// (`|` match, `*` mismatch, space at gaps), query.
    pub fn rendered(&self, refseq: &[u8], query: &[u8]) -> (String, String, String) {
        let mut top = String::new();
        let mut mid = String::new();
        let mut bottom = String::new();
        let mut i = self.ref_start;
        let mut j = self.query_start;
        for op in &self.ops {
            match op {
                Op::Diag => {
                    top.push(refseq[i] as char);
                    bottom.push(query[j] as char);
                    mid.push(if refseq[i] == query[j] { '|' } else { '*' });
                    i += 1;
                    j += 1;
                }
                Op::Up => {
                    top.push(refseq[i] as char);
                    bottom.push('-');
                    mid.push(' ');
                    i += 1;
                }
                Op::Left => {
                    top.push('-');
                    bottom.push(query[j] as char);
                    mid.push(' ');
                    j += 1;
                }
            }
        }
        (top, mid, bottom)
    }
}

const NEG_INF: i32 = i32::MIN / 2;

pub struct Aligner {
    scores: Scores,
    band_width: usize,
}

impl Aligner {
    pub fn new(scores: Scores, band_width: usize) -> Self {
        Aligner { scores, band_width }
    }

    fn substitution(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.scores.match_ as i32
        } else {
            -(self.scores.mismatch as i32)
        }
    }

    pub fn align(&self, refseq: &[u8], query: &[u8], mode: Mode) -> Option<AlignmentInfo> {
        if refseq.is_empty() || query.is_empty() {
            return None;
        }
        match mode {
            Mode::Local => self.align_local(refseq, query),
            Mode::Global => self.align_global(refseq, query),
        }
    }

    /// Smith-Waterman with affine gaps over the full matrix. The query is
    /// expected to be short (an adapter), so no banding is applied here.
    fn align_local(&self, refseq: &[u8], query: &[u8]) -> Option<AlignmentInfo> {
        let m = refseq.len();
        let n = query.len();
        let open = self.scores.gap_open as i32 + self.scores.gap_extend as i32;
        let extend = self.scores.gap_extend as i32;

        let cols = n + 1;
        let mut h = vec![0i32; (m + 1) * cols];
        let mut e = vec![NEG_INF; (m + 1) * cols];
        let mut f = vec![NEG_INF; (m + 1) * cols];

        let mut best = (0i32, 0usize, 0usize);
        for i in 1..=m {
            for j in 1..=n {
                let idx = i * cols + j;
                e[idx] = (h[idx - 1] - open).max(e[idx - 1] - extend);
                f[idx] = (h[idx - cols] - open).max(f[idx - cols] - extend);
                let diag = h[idx - cols - 1] + self.substitution(refseq[i - 1], query[j - 1]);
                h[idx] = diag.max(e[idx]).max(f[idx]).max(0);
                if h[idx] > best.0 {
                    best = (h[idx], i, j);
                }
            }
        }
        let (score, end_i, end_j) = best;
        if score <= 0 {
            return None;
        }

        // Second-best alignment ending at least half a query length away
        // from the optimal end, on the reference axis.
        let mask = (n / 2).max(1);
        let mut sub_score = 0;
        for i in 1..=m {
            if i.abs_diff(end_i) <= mask {
                continue;
            }
            for j in 1..=n {
                sub_score = sub_score.max(h[i * cols + j]);
            }
        }

        // Traceback from the best cell to the first zero.
        let mut ops = Vec::new();
        let mut i = end_i;
        let mut j = end_j;
        while i > 0 && j > 0 && h[i * cols + j] > 0 {
            let idx = i * cols + j;
            if h[idx] == h[idx - cols - 1] + self.substitution(refseq[i - 1], query[j - 1]) {
                ops.push(Op::Diag);
                i -= 1;
                j -= 1;
            } else if h[idx] == f[idx] {
                // Walk the whole gap run in the query.
                while i > 0 {
                    ops.push(Op::Up);
                    i -= 1;
                    let idx = (i + 1) * cols + j;
                    if f[idx] != f[idx - cols] - extend {
                        break;
                    }
                }
            } else {
                debug_assert_eq!(h[idx], e[idx]);
                while j > 0 {
                    ops.push(Op::Left);
                    j -= 1;
                    let idx = i * cols + j + 1;
                    if e[idx] != e[idx - 1] - extend {
                        break;
                    }
                }
            }
        }
        ops.reverse();

        Some(AlignmentInfo {
            score,
            sub_score,
            ref_start: i,
            ref_end: end_i,
            query_start: j,
            query_end: end_j,
            ops,
        })
    }

    /// Banded global alignment with per-base `gap_end` charged for
    /// terminal gaps on either sequence.
    fn align_global(&self, refseq: &[u8], query: &[u8]) -> Option<AlignmentInfo> {
        let m = refseq.len();
        let n = query.len();
        let open = self.scores.gap_open as i32 + self.scores.gap_extend as i32;
        let extend = self.scores.gap_extend as i32;
        let gap_end = self.scores.gap_end as i32;
        // The band must at least cover the length difference.
        let band = self.band_width.max(m.abs_diff(n) + 1);

        let cols = n + 1;
        let mut h = vec![NEG_INF; (m + 1) * cols];
        let mut e = vec![NEG_INF; (m + 1) * cols];
        let mut f = vec![NEG_INF; (m + 1) * cols];
        for j in 0..=n.min(band) {
            h[j] = -gap_end * j as i32;
        }
        for i in 0..=m.min(band) {
            h[i * cols] = -gap_end * i as i32;
        }

        for i in 1..=m {
            let lo = i.saturating_sub(band).max(1);
            let hi = (i + band).min(n);
            for j in lo..=hi {
                let idx = i * cols + j;
                e[idx] = (h[idx - 1] - open).max(e[idx - 1] - extend);
                f[idx] = (h[idx - cols] - open).max(f[idx - cols] - extend);
                let diag = h[idx - cols - 1] + self.substitution(refseq[i - 1], query[j - 1]);
                h[idx] = diag.max(e[idx]).max(f[idx]);
            }
        }

        // The best global score may end with a run of terminal gaps on
        // either sequence, charged at gap_end per base.
        let mut best = (h[m * cols + n], m, n);
        for i in 1..=m {
            let candidate = h[i * cols + n] - gap_end * (m - i) as i32;
            if candidate > best.0 {
                best = (candidate, i, n);
            }
        }
        for j in 1..=n {
            let candidate = h[m * cols + j] - gap_end * (n - j) as i32;
            if candidate > best.0 {
                best = (candidate, m, j);
            }
        }
        let (score, end_i, end_j) = best;
        if score <= NEG_INF / 2 {
            return None;
        }

        let mut ops = Vec::new();
        // Terminal gaps after the chosen end cell.
        for _ in end_i..m {
            ops.push(Op::Up);
        }
        for _ in end_j..n {
            ops.push(Op::Left);
        }
        ops.reverse();
        let mut tail = ops;
        let mut ops = Vec::new();

        let mut i = end_i;
        let mut j = end_j;
        while i > 0 && j > 0 {
            let idx = i * cols + j;
            if h[idx] == h[idx - cols - 1] + self.substitution(refseq[i - 1], query[j - 1]) {
                ops.push(Op::Diag);
                i -= 1;
                j -= 1;
            } else if h[idx] == f[idx] {
                while i > 0 && j > 0 {
                    ops.push(Op::Up);
                    i -= 1;
                    let idx = (i + 1) * cols + j;
                    if f[idx] != f[idx - cols] - extend {
                        break;
                    }
                }
            } else if h[idx] == e[idx] {
                while j > 0 && i > 0 {
                    ops.push(Op::Left);
                    j -= 1;
                    let idx = i * cols + j + 1;
                    if e[idx] != e[idx - 1] - extend {
                        break;
                    }
                }
            } else {
                // Boundary cell reached through initialization.
                break;
            }
        }
        // Leading terminal gaps.
        while i > 0 {
            ops.push(Op::Up);
            i -= 1;
        }
        while j > 0 {
            ops.push(Op::Left);
            j -= 1;
        }
        ops.reverse();
        ops.append(&mut tail);

        Some(AlignmentInfo {
            score,
            sub_score: 0,
            ref_start: 0,
            ref_end: m,
            query_start: 0,
            query_end: n,
            ops,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aligner() -> Aligner {
        Aligner::new(Scores::default(), 20)
    }

    #[test]
    fn test_local_exact_substring() {
        let refseq = b"TTTTTTACGTACGTACGTTTTT";
        let query = b"ACGTACGTACGT";
        let info = aligner().align(refseq, query, Mode::Local).unwrap();
        assert_eq!(info.score, 24);
        assert_eq!(info.ref_start, 6);
        assert_eq!(info.ref_end, 18);
        assert_eq!(info.query_start, 0);
        assert_eq!(info.query_end, 12);
    }

    #[test]
    fn test_local_with_mismatch() {
        let refseq = b"GGGGACGTACGTACGTGGGG";
        let query = b"ACGTATGTACGT";
        let info = aligner().align(refseq, query, Mode::Local).unwrap();
        // 11 matches, 1 mismatch
        assert_eq!(info.score, 11 * 2 - 4);
        assert_eq!(info.ref_start, 4);
    }

    #[test]
    fn test_local_no_similarity() {
        assert!(aligner()
            .align(b"AAAAAAAA", b"CCCCCCCC", Mode::Local)
            .is_none());
    }

    #[test]
    fn test_local_trim_point_coordinates() {
        // Adapter occupying the read's tail starting at position 30;
        // only its first 8 bases fit on the read.
        let insert = b"ACGGTTCAACGGTTCAACGGTTCAACGGTT";
        let adapter = b"AGATCGGAAGAGC";
        let mut read = insert.to_vec();
        read.extend_from_slice(&adapter[..8]);
        let info = aligner().align(&read, adapter, Mode::Local).unwrap();
        assert_eq!(info.ref_start - info.query_start, 30);
    }

    #[test]
    fn test_rendered_alignment() {
        let refseq = b"GGACGTACGG";
        let query = b"ACGAACG";
        let info = aligner().align(refseq, query, Mode::Local).unwrap();
        let (top, mid, bottom) = info.rendered(refseq, query);
        assert_eq!(top.len(), mid.len());
        assert_eq!(bottom.len(), mid.len());
        assert!(mid.contains('|'));
    }

    #[test]
    fn test_global_identical() {
        let info = aligner()
            .align(b"ACGTACGT", b"ACGTACGT", Mode::Global)
            .unwrap();
        assert_eq!(info.score, 16);
        let (top, mid, bottom) = info.rendered(b"ACGTACGT", b"ACGTACGT");
        assert_eq!(top, "ACGTACGT");
        assert_eq!(mid, "||||||||");
        assert_eq!(bottom, "ACGTACGT");
    }

    #[test]
    fn test_global_shifted_overhang() {
        // Query equals the last six reference bases; the cheapest global
        // path uses terminal gaps.
        let refseq = b"GGGGACGTAC";
        let query = b"ACGTAC";
        let info = aligner().align(refseq, query, Mode::Global).unwrap();
        assert_eq!(info.score, 6 * 2 - 4 * 2);
        let (top, _, bottom) = info.rendered(refseq, query);
        assert_eq!(top, "GGGGACGTAC");
        assert_eq!(bottom, "----ACGTAC");
    }
}
