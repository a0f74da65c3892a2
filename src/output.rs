//! Buffered TSV output for query results.
//!
//! Integers are formatted with itoa to keep allocation out of the
//! per-match path.

use crate::annotation::LabeledMatch;
use std::io::{self, BufWriter, Write};

/// Buffer size for MatchWriter (1MB default).
const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Writes matches as `chrom <TAB> start <TAB> end <TAB> name <TAB> label`.
pub struct MatchWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
}

impl<W: Write> MatchWriter<W> {
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
        }
    }

    #[inline]
    fn write_int<I: itoa::Integer>(&mut self, n: I) -> io::Result<()> {
        self.writer.write_all(self.itoa_buf.format(n).as_bytes())
    }

    /// Write one match line.
    #[inline]
    pub fn write_match(&mut self, chrom: &str, m: &LabeledMatch<'_>) -> io::Result<()> {
        self.writer.write_all(chrom.as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.write_int(m.start)?;
        self.writer.write_all(b"\t")?;
        self.write_int(m.end)?;
        self.writer.write_all(b"\t")?;
        self.writer.write_all(m.name.as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer.write_all(m.label.as_bytes())?;
        self.writer.write_all(b"\n")
    }

    /// Write one match line prefixed by the index of the query that found it.
    #[inline]
    pub fn write_batch_match(
        &mut self,
        query: usize,
        chrom: &str,
        m: &LabeledMatch<'_>,
    ) -> io::Result<()> {
        self.write_int(query)?;
        self.writer.write_all(b"\t")?;
        self.write_match(chrom, m)
    }

    /// Write a full line as-is with newline.
    #[inline]
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
