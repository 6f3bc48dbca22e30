pub mod fastq;
pub mod pairs;
pub mod record;
pub mod xopen;

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SequenceIOError {
    #[error("IO")]
    IO(#[from] io::Error),

    #[error("FASTQ file cannot be parsed: {0}")]
    Fastq(String),
}

/// Split header into name and comment
pub fn split_header(header: &str) -> (String, Option<String>) {
    match header.split_once([' ', '\t']) {
        Some((name, comment)) => (name.to_string(), Some(comment.to_string())),
        None => (header.to_string(), None),
    }
}
