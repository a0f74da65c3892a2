//! Reader for pre-validated entry tuples and query regions.
//!
//! Format detection and GTF/BED parsing happen upstream. This module only
//! reads the tuple stream they produce, one tuple per line:
//!
//! ```text
//! chrom <TAB> start <TAB> end <TAB> name <TAB> strand <TAB> group
//! ```
//!
//! `strand` is `+`, `-`, `.` or the numeric codes `0`, `1`, `3`. Blank lines
//! and lines starting with `#` are skipped.

use crate::annotation::AnnotationIndex;
use crate::error::IndexError;
use crate::forest::{IntervalForest, Query};
use crate::interval::Strand;
use crate::labels::LabelRegistry;
use memchr::{memchr, memrchr};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while reading tuples or building an index from them.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid region '{0}': expected chrom:start-end")]
    InvalidRegion(String),

    #[error(transparent)]
    Index(#[from] IndexError),
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// One `(chrom, start, end, name, strand, group)` tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub name: String,
    pub strand: Strand,
    pub group: u32,
}

/// A streaming tuple reader.
pub struct EntryReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: String,
}

impl EntryReader<File> {
    /// Open a tuple file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> EntryReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: String::with_capacity(256),
        }
    }

    /// Read the next tuple.
    pub fn read_record(&mut self) -> Result<Option<EntryRecord>> {
        let line = next_data_line(&mut self.reader, &mut self.buffer, &mut self.line_number)?;
        match line {
            Some(line) => {
                let fields: Vec<&str> = line.split('\t').collect();
                parse_entry_fields(&fields, self.line_number).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Get an iterator over all tuples.
    pub fn records(self) -> EntryRecordIter<R> {
        EntryRecordIter { reader: self }
    }
}

/// Iterator over entry tuples.
pub struct EntryRecordIter<R: Read> {
    reader: EntryReader<R>,
}

impl<R: Read> Iterator for EntryRecordIter<R> {
    type Item = Result<EntryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

/// Advance to the next non-blank, non-comment line and return it trimmed.
fn next_data_line<'b, R: BufRead>(
    reader: &mut R,
    buffer: &'b mut String,
    line_number: &mut usize,
) -> Result<Option<&'b str>> {
    loop {
        buffer.clear();
        if reader.read_line(buffer)? == 0 {
            return Ok(None);
        }
        *line_number += 1;

        let skip = {
            let line = buffer.trim();
            line.is_empty() || line.starts_with('#')
        };
        if !skip {
            return Ok(Some(buffer.trim_end_matches(['\n', '\r'])));
        }
    }
}

fn parse_error(line: usize, message: String) -> IngestError {
    IngestError::Parse { line, message }
}

fn parse_field<T: FromStr>(value: &str, field: &str, line: usize) -> Result<T> {
    value
        .parse()
        .map_err(|_| parse_error(line, format!("Invalid {}: '{}'", field, value)))
}

fn parse_strand(value: &str, line: usize) -> Result<Strand> {
    value
        .parse()
        .map_err(|e: IndexError| parse_error(line, e.to_string()))
}

fn parse_entry_fields(fields: &[&str], line: usize) -> Result<EntryRecord> {
    if fields.len() != 6 {
        return Err(parse_error(
            line,
            format!("Expected 6 fields, got {}", fields.len()),
        ));
    }

    Ok(EntryRecord {
        chrom: fields[0].to_string(),
        start: parse_field(fields[1], "start", line)?,
        end: parse_field(fields[2], "end", line)?,
        name: fields[3].to_string(),
        strand: parse_strand(fields[4], line)?,
        group: parse_field(fields[5], "group index", line)?,
    })
}

/// Read one label per line. Blank lines are kept as empty labels so that
/// line `n` is always group `n`.
pub fn read_labels<R: Read>(reader: R) -> Result<LabelRegistry> {
    let reader = BufReader::new(reader);
    let mut labels = LabelRegistry::new();
    for line in reader.lines() {
        let line = line?;
        labels.push(line.trim_end_matches('\r'));
    }
    Ok(labels)
}

/// Read labels from a path.
pub fn read_labels_path<P: AsRef<Path>>(path: P) -> Result<LabelRegistry> {
    read_labels(File::open(path)?)
}

/// Counts gathered while loading an index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: u64,
    pub skipped: u64,
    pub chromosomes: usize,
}

impl std::fmt::Display for LoadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} entries on {} chromosomes ({} skipped)",
            self.loaded, self.chromosomes, self.skipped
        )
    }
}

/// Build and finish an index from a tuple stream.
///
/// Tuples with empty or inverted bounds are skipped with a warning. When
/// `labels` is empty, every group index resolves to its own number.
pub fn load_index<R: Read>(
    entries: R,
    labels: LabelRegistry,
) -> Result<(AnnotationIndex, LoadStats)> {
    let mut forest = IntervalForest::new();
    let mut stats = LoadStats::default();
    let mut max_group: Option<u32> = None;

    for record in EntryReader::new(entries).records() {
        let record = record?;
        match forest.add_entry(
            &record.chrom,
            record.start,
            record.end,
            record.name,
            record.strand,
            record.group,
        ) {
            Ok(_) => {
                stats.loaded += 1;
                max_group = max_group.max(Some(record.group));
            }
            Err(IndexError::InvalidInterval { start, end }) => {
                log::warn!(
                    "{}:{}-{} is an invalid interval, skipping it",
                    record.chrom,
                    start,
                    end
                );
                stats.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let numbered_groups = labels.is_empty();
    if !numbered_groups {
        if let Some(max) = max_group.filter(|&g| g as usize >= labels.len()) {
            log::warn!(
                "group index {} has no label ({} labels given)",
                max,
                labels.len()
            );
        }
    }

    stats.chromosomes = forest.chromosomes().len();
    forest.finish()?;
    log::info!("Loaded {}", stats);

    let mut index = AnnotationIndex::from_parts(forest, labels);
    index.numbered_groups = numbered_groups;
    Ok((index, stats))
}

/// Build an index from a tuple file and an optional label file.
pub fn load_index_path<P: AsRef<Path>>(
    entries: P,
    labels: Option<P>,
) -> Result<(AnnotationIndex, LoadStats)> {
    let labels = match labels {
        Some(path) => read_labels_path(path)?,
        None => LabelRegistry::new(),
    };
    load_index(File::open(entries)?, labels)
}

/// A `chrom:start-end` query window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRegion {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl FromStr for QueryRegion {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || IngestError::InvalidRegion(s.to_string());
        let bytes = s.as_bytes();

        // Chromosome names may themselves contain ':', so split on the last one
        let colon = memrchr(b':', bytes).ok_or_else(invalid)?;
        let range = &s[colon + 1..];
        let dash = memchr(b'-', range.as_bytes()).ok_or_else(invalid)?;

        let chrom = &s[..colon];
        if chrom.is_empty() {
            return Err(invalid());
        }
        let start = range[..dash].replace(',', "").parse().map_err(|_| invalid())?;
        let end = range[dash + 1..].replace(',', "").parse().map_err(|_| invalid())?;

        Ok(Self {
            chrom: chrom.to_string(),
            start,
            end,
        })
    }
}

/// Read batch queries, one `chrom <TAB> start <TAB> end [<TAB> strand]` per line.
pub fn read_queries<R: Read>(reader: R) -> Result<Vec<Query>> {
    let mut reader = BufReader::new(reader);
    let mut buffer = String::new();
    let mut line_number = 0;
    let mut queries = Vec::new();

    while let Some(line) = next_data_line(&mut reader, &mut buffer, &mut line_number)? {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            return Err(parse_error(
                line_number,
                format!("Expected at least 3 fields, got {}", fields.len()),
            ));
        }
        let strand = match fields.get(3) {
            Some(s) => parse_strand(s, line_number)?,
            None => Strand::Unknown,
        };
        queries.push(Query::new(
            fields[0],
            parse_field(fields[1], "start", line_number)?,
            parse_field(fields[2], "end", line_number)?,
            strand,
        ));
    }

    Ok(queries)
}
