// a, A -> T
// c, C -> G
// g, G -> C
// t, T, u, U -> A
// everything else -> N
const REVCOMP_TABLE: [u8; 256] = [
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'T', b'N', b'G',  b'N', b'N', b'N', b'C',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'A', b'A', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'T', b'N', b'G',  b'N', b'N', b'N', b'C',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'A', b'A', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',
    b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N',  b'N', b'N', b'N', b'N'
];

pub fn reverse_complement(s: &[u8]) -> Vec<u8> {
    let mut rc = Vec::with_capacity(s.len());

    for ch in s.iter().rev() {
        rc.push(REVCOMP_TABLE[*ch as usize]);
    }
    rc
}

/// Fill `rc` with the reverse complement of `s`, reusing its capacity.
pub fn reverse_complement_into(s: &[u8], rc: &mut Vec<u8>) {
    rc.clear();
    rc.extend(s.iter().rev().map(|&ch| REVCOMP_TABLE[ch as usize]));
}

/// Fill `out` with `q` reversed (the quality string that goes with a
/// reverse-complemented read).
pub fn reverse_into(q: &[u8], out: &mut Vec<u8>) {
    out.clear();
    out.extend(q.iter().rev());
}
