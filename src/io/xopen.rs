use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Open a file for reading, transparently decompressing gzip input.
/// Compression is detected from the magic bytes, not the file name.
pub fn xopen(path: &str) -> io::Result<Box<dyn Read + Send>> {
    let mut reader = BufReader::new(File::open(path)?);
    let start = reader.fill_buf()?;
    if start.starts_with(&[0x1f, 0x8b]) {
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Create a file for writing. Output is gzip-compressed if the file name
/// ends in `.gz`.
pub fn xcreate(path: &str) -> io::Result<Box<dyn Write + Send>> {
    let file = File::create(path)?;
    if path.ends_with(".gz") {
        Ok(Box::new(GzEncoder::new(
            BufWriter::new(file),
            Compression::default(),
        )))
    } else {
        Ok(Box::new(BufWriter::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_roundtrip_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fastq.gz");
        let path = path.to_str().unwrap();

        let mut w = xcreate(path).unwrap();
        w.write_all(b"@a\nACGT\n+\nIIII\n").unwrap();
        drop(w);

        let mut contents = String::new();
        xopen(path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "@a\nACGT\n+\nIIII\n");
    }

    #[test]
    fn test_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fastq");
        let path = path.to_str().unwrap();

        let mut w = xcreate(path).unwrap();
        w.write_all(b"hello\n").unwrap();
        drop(w);

        let mut contents = String::new();
        xopen(path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "hello\n");
    }
}
