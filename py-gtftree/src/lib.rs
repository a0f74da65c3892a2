#![allow(clippy::too_many_arguments)]

//! Python bindings for gtftree.
//!
//! Exposes the annotation index as a `GTFtree` class: entries are appended
//! with integer strand codes (0 = +, 1 = -, 3 = unknown) and group indices,
//! balanced once with `finish()`, then queried many times.

use std::borrow::Cow;

use pyo3::prelude::*;
use pyo3::types::PyList;

use gtftree::ingest;
use gtftree::{AnnotationIndex, MatchType, Strand, StrandType};

mod errors;

use errors::{ingest_to_py_err, to_py_err};

/// One overlap as returned to Python: (start, end, name, label).
type OverlapTuple = (u64, u64, String, String);

/// Interval trees over feature annotations, one per chromosome.
///
/// Example:
///     >>> import pygtftree
///     >>> t = pygtftree.GTFtree()
///     >>> t.labels = ["genes"]
///     >>> t.add_entry("1", 11868, 14409, "ENST00000456328", 0, 0)
///     >>> t.finish()
///     >>> t.find_overlaps("1", 12000, 12100)
///     [(11868, 14409, 'ENST00000456328', 'genes')]
#[pyclass(name = "GTFtree")]
pub struct PyGtfTree {
    inner: AnnotationIndex,
}

#[pymethods]
impl PyGtfTree {
    #[new]
    fn new() -> Self {
        Self {
            inner: AnnotationIndex::new(),
        }
    }

    /// Build and finish a tree from an entries file and optional labels file.
    #[staticmethod]
    #[pyo3(signature = (entries, labels=None))]
    fn load(py: Python<'_>, entries: String, labels: Option<String>) -> PyResult<Self> {
        let (inner, _) = py
            .allow_threads(|| ingest::load_index_path(entries, labels))
            .map_err(ingest_to_py_err)?;
        Ok(Self { inner })
    }

    /// Append an entry. Strand is 0 (+), 1 (-) or 3 (unknown).
    fn add_entry(
        &mut self,
        chrom: &str,
        start: u64,
        end: u64,
        name: &str,
        strand: u8,
        group: u32,
    ) -> PyResult<()> {
        let strand = Strand::from_code(strand).map_err(to_py_err)?;
        self.inner
            .forest
            .add_entry(chrom, start, end, name, strand, group)
            .map_err(to_py_err)?;
        Ok(())
    }

    /// Append a label and return its group index.
    fn add_label(&mut self, label: String) -> u32 {
        self.inner.labels.push(label)
    }

    /// Balance every chromosome. No entries may be added afterwards.
    fn finish(&mut self, py: Python<'_>) -> PyResult<()> {
        let inner = &mut self.inner;
        py.allow_threads(|| inner.forest.finish()).map_err(to_py_err)
    }

    fn count_entries(&self) -> u64 {
        self.inner.forest.count_entries()
    }

    fn is_tree(&self) -> bool {
        self.inner.forest.is_tree()
    }

    /// Chromosome names, sorted.
    fn chromosomes(&self) -> Vec<String> {
        self.inner
            .forest
            .chromosomes()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Find entries overlapping [start, end) on `chrom`.
    ///
    /// match_type: 0 any, 1 exact, 2 contain, 3 within, 4 start, 5 end
    /// strand_type: 0 ignore, 1 same, 2 opposite, 3 exact-same
    #[pyo3(signature = (chrom, start, end, strand=3, match_type=0, strand_type=0))]
    fn find_overlaps<'py>(
        &self,
        py: Python<'py>,
        chrom: &str,
        start: u64,
        end: u64,
        strand: u8,
        match_type: u8,
        strand_type: u8,
    ) -> PyResult<Bound<'py, PyList>> {
        let strand = Strand::from_code(strand).map_err(to_py_err)?;
        let match_type = MatchType::try_from(match_type).map_err(to_py_err)?;
        let strand_type = StrandType::try_from(strand_type).map_err(to_py_err)?;

        let inner = &self.inner;
        let hits: Vec<OverlapTuple> = py
            .allow_threads(|| {
                inner
                    .find_overlaps(chrom, start, end, strand, match_type, strand_type)
                    .map(|hits| {
                        hits.into_iter()
                            .map(|m| (m.start, m.end, m.name.to_owned(), m.label.into_owned()))
                            .collect()
                    })
            })
            .map_err(to_py_err)?;

        PyList::new(py, hits)
    }

    /// Number of overlaps, without materializing them.
    #[pyo3(signature = (chrom, start, end, strand=3, match_type=0, strand_type=0))]
    fn count_overlaps(
        &self,
        chrom: &str,
        start: u64,
        end: u64,
        strand: u8,
        match_type: u8,
        strand_type: u8,
    ) -> PyResult<usize> {
        let strand = Strand::from_code(strand).map_err(to_py_err)?;
        let match_type = MatchType::try_from(match_type).map_err(to_py_err)?;
        let strand_type = StrandType::try_from(strand_type).map_err(to_py_err)?;
        self.inner
            .forest
            .count_overlaps(chrom, start, end, strand, match_type, strand_type)
            .map_err(to_py_err)
    }

    #[getter]
    fn get_labels(&self) -> Vec<String> {
        self.inner.labels.iter().map(str::to_owned).collect()
    }

    /// Set every label. Once labels exist, the count must stay the same.
    #[setter]
    fn set_labels(&mut self, labels: Vec<String>) -> PyResult<()> {
        if self.inner.labels.is_empty() {
            for label in labels {
                self.inner.labels.push(label);
            }
            return Ok(());
        }
        self.inner.replace_labels(labels).map_err(to_py_err)
    }

    fn resolve_label(&self, group: u32) -> PyResult<String> {
        self.inner
            .resolve_label(group)
            .map(Cow::into_owned)
            .map_err(to_py_err)
    }

    /// Height of one chromosome's tree, or None if the chromosome is absent.
    fn tree_height(&self, chrom: &str) -> PyResult<Option<usize>> {
        self.inner.forest.tree_height(chrom).map_err(to_py_err)
    }

    /// Print every chromosome's tree to stdout.
    fn print_tree(&self) -> PyResult<()> {
        let text = self.tree_string()?;
        print!("{}", text);
        Ok(())
    }

    /// The `print_tree` output as a string.
    fn tree_string(&self) -> PyResult<String> {
        let mut buf = Vec::new();
        self.inner
            .forest
            .write_tree(&mut buf)
            .map_err(|e| ingest_to_py_err(e.into()))?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn __len__(&self) -> usize {
        self.inner.forest.count_entries() as usize
    }

    fn __repr__(&self) -> String {
        format!(
            "GTFtree(entries={}, chromosomes={}, finished={})",
            self.inner.forest.count_entries(),
            self.inner.forest.chromosomes().len(),
            self.inner.forest.is_tree()
        )
    }
}

#[pymodule]
fn pygtftree(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyGtfTree>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
