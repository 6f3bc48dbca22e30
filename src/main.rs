use std::error::Error;
use std::io::{BufReader, Read};
use std::process::exit;

use clap::Parser;
use log::{error, Level};

use seqmerge::adapter::{AdapterDetector, AlignedDetection};
use seqmerge::aligner::{Aligner, Scores};
use seqmerge::diagnostics::DiagnosticsWriter;
use seqmerge::io::fastq::FastqReader;
use seqmerge::io::pairs::{FastqWriter, PairedFastqReader};
use seqmerge::io::xopen::{xcreate, xopen};
use seqmerge::logger;
use seqmerge::merge::ReadMerger;
use seqmerge::pipeline::{MergeSink, PairPipeline};
use seqmerge::thresholds::{ConfigError, ThresholdTable};
use seqmerge::MAX_READ_LEN;

/// Adapter trimming and merging of paired-end FASTQ reads
#[derive(Parser)]
#[command(version, long_about = None)]
struct Args {
    /// Forward reads in FASTQ format, optionally gzip compressed
    r1_path: String,
    /// Reverse reads in FASTQ format, optionally gzip compressed
    r2_path: String,

    /// Output file for trimmed forward reads
    #[arg(long, value_name = "FILE")]
    out1: String,
    /// Output file for trimmed reverse reads
    #[arg(long, value_name = "FILE")]
    out2: String,
    /// Output file for merged reads; merging is only attempted when set
    #[arg(long, value_name = "FILE")]
    merged: Option<String>,

    /// Quality cutoff below which a base call is ignored when comparing
    /// sequences
    #[arg(long, default_value_t = 20)]
    qual_cutoff: u8,
    /// Discard the pair when either mate is shorter than this after
    /// trimming
    #[arg(long, default_value_t = 30, value_name = "LEN")]
    min_length: usize,

    /// Minimum overlap between a read and an adapter
    #[arg(long, default_value_t = 10, value_name = "LEN")]
    adapter_min_overlap: usize,
    /// Minimum overlap between the two reads of a pair
    #[arg(long, default_value_t = 10, value_name = "LEN")]
    read_min_overlap: usize,
    /// Fraction of an adapter overlap that must match
    #[arg(long, default_value_t = 0.5, value_name = "FRAC")]
    adapter_min_match: f64,
    /// Fraction of an adapter overlap allowed to mismatch
    #[arg(long, default_value_t = 0.1, value_name = "FRAC")]
    adapter_max_mismatch: f64,
    /// Fraction of a read overlap that must match
    #[arg(long, default_value_t = 0.5, value_name = "FRAC")]
    read_min_match: f64,
    /// Fraction of a read overlap allowed to mismatch
    #[arg(long, default_value_t = 0.1, value_name = "FRAC")]
    read_max_mismatch: f64,

    /// Adapter expected at the 3' end of forward reads
    #[arg(long, default_value = "AGATCGGAAGAGCGGTTCAG", value_name = "SEQ")]
    adapter1: String,
    /// Adapter expected at the 3' end of reverse reads
    #[arg(long, default_value = "AGATCGGAAGAGCGTCGTGT", value_name = "SEQ")]
    adapter2: String,

    /// Also search for adapter copies with a gapped local alignment
    #[arg(long)]
    use_aligner: bool,
    /// Minimum alignment score for the gapped adapter search
    #[arg(long, default_value_t = 26)]
    score_threshold: i32,
    /// Alignment band width
    #[arg(long, default_value_t = 20)]
    band_width: usize,
    #[arg(long, default_value_t = 6, hide_short_help = true)]
    gap_open: u8,
    #[arg(long, default_value_t = 2, hide_short_help = true)]
    gap_extend: u8,
    #[arg(long, default_value_t = 2, hide_short_help = true)]
    gap_end: u8,

    /// Keep overhanging bases when force-merging reads of unequal length
    #[arg(long)]
    retain_overhang: bool,
    /// Input qualities are phred+64 and are rescaled to phred+33
    #[arg(long)]
    phred64: bool,

    /// Write human-readable renderings of merged overlaps to FILE
    #[arg(long, value_name = "FILE")]
    pretty: Option<String>,
    /// Write at most N diagnostic records
    #[arg(long, default_value_t = 100, value_name = "N")]
    pretty_max: usize,

    /// Verbose output
    #[arg(short)]
    verbose: bool,
}

fn open_fastq(path: &str, phred64: bool) -> std::io::Result<FastqReader<BufReader<Box<dyn Read + Send>>>> {
    let reader = BufReader::new(xopen(path)?);
    Ok(if phred64 {
        FastqReader::phred64(reader)
    } else {
        FastqReader::new(reader)
    })
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.adapter1.is_empty() || args.adapter2.is_empty() {
        return Err(ConfigError::EmptyPrimer.into());
    }
    let qual_cutoff = args.qual_cutoff.saturating_add(33);
    let adapter_table = ThresholdTable::new(
        args.adapter_min_match,
        args.adapter_max_mismatch,
        MAX_READ_LEN,
    )?;
    let read_table = ThresholdTable::new(args.read_min_match, args.read_max_mismatch, MAX_READ_LEN)?;

    let aligned = args.use_aligner.then(|| AlignedDetection {
        aligner: Aligner::new(
            Scores {
                gap_open: args.gap_open,
                gap_extend: args.gap_extend,
                gap_end: args.gap_end,
                ..Scores::default()
            },
            args.band_width,
        ),
        score_threshold: args.score_threshold,
    });
    let detector = AdapterDetector::new(
        args.adapter1.as_bytes(),
        args.adapter2.as_bytes(),
        adapter_table,
        read_table.clone(),
        args.adapter_min_overlap,
        qual_cutoff,
        aligned,
    );

    let merge = match &args.merged {
        Some(path) => Some(MergeSink {
            merger: ReadMerger::new(
                read_table,
                args.read_min_overlap,
                qual_cutoff,
                args.retain_overhang,
            ),
            out: FastqWriter::new(xcreate(path)?),
        }),
        None => None,
    };
    let out1 = FastqWriter::new(xcreate(&args.out1)?);
    let out2 = FastqWriter::new(xcreate(&args.out2)?);
    let diagnostics = match &args.pretty {
        Some(path) => Some(DiagnosticsWriter::new(xcreate(path)?, args.pretty_max)),
        None => None,
    };

    let reader = PairedFastqReader::new(
        open_fastq(&args.r1_path, args.phred64)?,
        open_fastq(&args.r2_path, args.phred64)?,
    );
    let mut pipeline = PairPipeline::new(
        detector,
        merge,
        args.min_length,
        qual_cutoff,
        out1,
        out2,
        diagnostics,
    );
    pipeline.run(reader)?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose {
        Level::Debug
    } else {
        Level::Info
    };
    if logger::init(level).is_err() {
        eprintln!("failed to initialize logging");
    }
    if let Err(e) = run(args) {
        error!("seqmerge: {e}");
        exit(1);
    }
}
