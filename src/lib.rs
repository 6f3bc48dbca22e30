pub mod adapter;
pub mod aligner;
pub mod diagnostics;
pub mod io;
pub mod logger;
pub mod matcher;
pub mod merge;
pub mod pair;
pub mod pipeline;
pub mod revcomp;
pub mod thresholds;

/// Highest quality value a merged base can be assigned (phred+33).
pub const MAX_QUAL: u8 = b'~';

/// Largest read length the threshold tables are sized for. Longer reads are
/// still processed; threshold lookups clamp to this length.
pub const MAX_READ_LEN: usize = 512;
