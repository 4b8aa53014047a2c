//! Line-oriented VCF reading with transparent decompression.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::MultiGzDecoder;

use crate::Result;

use super::record::VcfLine;

/// A reader that yields [`VcfLine`] records from a VCF text stream.
///
/// Header and comment lines (starting with `#`) and empty lines are
/// skipped. End-of-stream is a normal terminal condition, reported as
/// `Ok(None)`. Input bytes are decoded lossily, so a stray non-UTF-8 byte
/// does not abort the stream.
pub struct VcfReader<R> {
    inner: R,
    line_no: u64,
    buf: Vec<u8>,
}

impl<R: BufRead> VcfReader<R> {
    /// Create a reader over any buffered source.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line_no: 0,
            buf: Vec::new(),
        }
    }

    /// The 1-based number of the last line read.
    pub fn line_number(&self) -> u64 {
        self.line_no
    }

    /// Read the next data line, or `Ok(None)` at end of stream.
    pub fn read_line(&mut self) -> Result<Option<VcfLine>> {
        loop {
            self.buf.clear();
            let n = self.inner.read_until(b'\n', &mut self.buf)?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = String::from_utf8_lossy(&self.buf);
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return VcfLine::parse(&line, self.line_no).map(Some);
        }
    }

    /// Consume the reader, iterating over all data lines.
    pub fn lines(self) -> VcfLineIterator<R> {
        VcfLineIterator {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over the data lines of a VCF stream.
pub struct VcfLineIterator<R> {
    reader: VcfReader<R>,
    done: bool,
}

impl<R: BufRead> Iterator for VcfLineIterator<R> {
    type Item = Result<VcfLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Open a VCF file, decompressing transparently by extension.
///
/// `.gz` files are read through a multi-member gzip decoder (the ClinVar
/// dump is bgzip-concatenated), `.bz2` through a bzip2 decoder (OpenHumans
/// 23andMe exports), and anything else as plain text.
pub fn open_vcf<P: AsRef<Path>>(path: P) -> Result<VcfReader<Box<dyn BufRead>>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let reader: Box<dyn BufRead> = match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        Some("bz2") => Box::new(BufReader::new(BzDecoder::new(file))),
        _ => Box::new(BufReader::new(file)),
    };

    Ok(VcfReader::new(reader))
}
